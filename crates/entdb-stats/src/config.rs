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

use crate::dict::{DictTable, TableStatsOption};
use crate::error::{Result, StatsError};
use crate::stats::admission::StatsPersistence;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_MIN_RECALC_INTERVAL_MS: u64 = 10_000;
const MAX_MIN_RECALC_INTERVAL_MS: u64 = 3_600_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsOptions {
    pub persistent_by_default: bool,
    pub auto_recalc_by_default: bool,
    // 0 = no ceiling
    pub modified_counter_ceiling: u64,
    pub min_recalc_interval_ms: u64,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            persistent_by_default: true,
            auto_recalc_by_default: true,
            modified_counter_ceiling: 0,
            min_recalc_interval_ms: DEFAULT_MIN_RECALC_INTERVAL_MS,
        }
    }
}

impl StatsOptions {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        let opts: StatsOptions = serde_json::from_slice(&bytes).map_err(|e| {
            StatsError::Config(format!(
                "invalid stats config '{}': {e}",
                path.as_ref().display()
            ))
        })?;
        Ok(opts.sanitize())
    }

    pub fn sanitize(self) -> Self {
        Self {
            min_recalc_interval_ms: self.min_recalc_interval_ms.min(MAX_MIN_RECALC_INTERVAL_MS),
            ..self
        }
    }

    pub fn min_recalc_interval(&self) -> Duration {
        Duration::from_millis(self.min_recalc_interval_ms)
    }

    pub fn modified_counter_ceiling(&self) -> Option<u64> {
        (self.modified_counter_ceiling > 0).then_some(self.modified_counter_ceiling)
    }

    pub fn persistence_for(&self, table: &DictTable) -> StatsPersistence {
        if !table.stats_persistent().resolve(self.persistent_by_default) {
            return StatsPersistence::Transient;
        }
        StatsPersistence::Persistent {
            auto_recalc: table
                .stats_auto_recalc()
                .resolve(self.auto_recalc_by_default),
        }
    }
}

impl TableStatsOption {
    pub fn resolve(self, global_default: bool) -> bool {
        match self {
            TableStatsOption::Default => global_default,
            TableStatsOption::On => true,
            TableStatsOption::Off => false,
        }
    }
}
