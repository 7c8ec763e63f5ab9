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


use crate::config::StatsOptions;
use crate::dict::{DictTable, Dictionary, TableId, TableOptions, TableStatsOption};
use crate::error::{Result, StatsError};
use crate::stats::{PersistenceMode, StatsBackground, StatsRecalculator};
use crate::timer::ManualTimerPool;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub(super) struct RecordingRecalculator {
    calls: Mutex<Vec<(TableId, PersistenceMode)>>,
    fail: AtomicBool,
}

impl RecordingRecalculator {
    pub(super) fn calls(&self) -> Vec<(TableId, PersistenceMode)> {
        self.calls.lock().clone()
    }

    pub(super) fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl StatsRecalculator for RecordingRecalculator {
    fn recompute(&self, table: &DictTable, mode: PersistenceMode) -> Result<()> {
        self.calls.lock().push((table.id(), mode));
        if self.fail.load(Ordering::SeqCst) {
            return Err(StatsError::Recalc {
                table: table.name().to_string(),
                reason: "injected".to_string(),
            });
        }
        Ok(())
    }
}

pub(super) struct Harness {
    pub dict: Arc<Dictionary>,
    pub timers: ManualTimerPool,
    pub recalc: Arc<RecordingRecalculator>,
    pub bg: StatsBackground,
}

pub(super) fn harness() -> Harness {
    harness_with(StatsOptions::default())
}

pub(super) fn harness_with(options: StatsOptions) -> Harness {
    let dict = Arc::new(Dictionary::new());
    let timers = ManualTimerPool::new();
    let recalc = Arc::new(RecordingRecalculator::default());
    let bg = StatsBackground::init(
        Arc::clone(&dict),
        Arc::new(timers.clone()),
        Arc::clone(&recalc) as Arc<dyn StatsRecalculator>,
        options,
    );
    Harness {
        dict,
        timers,
        recalc,
        bg,
    }
}

pub(super) fn loaded_table(
    dict: &Dictionary,
    name: &str,
    n_rows: u64,
    persistent: TableStatsOption,
) -> Arc<DictTable> {
    let table = dict
        .create_table(
            name,
            TableOptions {
                stats_persistent: persistent,
                n_rows,
                ..TableOptions::default()
            },
        )
        .expect("create table");
    table.set_stats_initialized(true);
    table
}

pub(super) fn modify_until_queued(bg: &StatsBackground, table: &DictTable) {
    for _ in 0..10_000 {
        if bg.on_table_modified(table) == Some(PersistenceMode::Persistent) {
            return;
        }
    }
    panic!("table {} was never queued", table.name());
}
