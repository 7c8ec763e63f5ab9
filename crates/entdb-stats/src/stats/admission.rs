/*
 * Copyright 2026 EntDB Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use crate::dict::ModificationState;
use crate::stats::PersistenceMode;

pub const TRANSIENT_THRESHOLD_FLOOR: u64 = 16;
const TRANSIENT_ROWS_DIVISOR: u64 = 16;
const PERSISTENT_ROWS_DIVISOR: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPersistence {
    Transient,
    Persistent { auto_recalc: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdmissionPolicy {
    modified_counter_ceiling: Option<u64>,
}

impl AdmissionPolicy {
    pub fn new(modified_counter_ceiling: Option<u64>) -> Self {
        Self {
            modified_counter_ceiling,
        }
    }

    // `state.stat_modified_counter` is the pre-increment value
    pub fn decide(
        &self,
        state: &ModificationState,
        persistence: StatsPersistence,
        suppress: bool,
    ) -> Option<PersistenceMode> {
        if suppress {
            return None;
        }

        let counter = state.stat_modified_counter;
        match persistence {
            StatsPersistence::Persistent { auto_recalc } => {
                if state.temporary || !auto_recalc {
                    return None;
                }
                (counter > Self::persistent_threshold(state.row_count_estimate))
                    .then_some(PersistenceMode::Persistent)
            }
            StatsPersistence::Transient => (counter
                > self.transient_threshold(state.row_count_estimate))
            .then_some(PersistenceMode::Transient),
        }
    }

    pub fn persistent_threshold(n_rows: u64) -> u64 {
        n_rows / PERSISTENT_ROWS_DIVISOR
    }

    pub fn transient_threshold(&self, n_rows: u64) -> u64 {
        let threshold = TRANSIENT_THRESHOLD_FLOOR.saturating_add(n_rows / TRANSIENT_ROWS_DIVISOR);
        match self.modified_counter_ceiling {
            Some(ceiling) => ceiling.min(threshold),
            None => threshold,
        }
    }
}
