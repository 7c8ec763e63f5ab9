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

use crate::dict::{now_ms, BgStatus, DictTable};
use crate::error::{Result, StatsError};
use crate::fault;
use crate::stats::background::StatsShared;
use crate::stats::PersistenceMode;
use tracing::{debug, trace, warn};

impl StatsShared {
    pub(crate) fn run_worker_pass(&self) {
        let _single_worker = self.worker_lock.lock();
        self.metrics.on_worker_pass();
        while self.process_next_entry() {}
        self.maintenance.run_pending();
    }

    // false on an empty queue or a throttled entry; a pass that kept going
    // would spin on the entry it just put back.
    fn process_next_entry(&self) -> bool {
        loop {
            let Some(id) = self.queue.dequeue() else {
                return false;
            };

            let mut dict = self.dict.lock();
            let Some(table) = dict.open_table_by_id(id) else {
                drop(dict);
                self.metrics.on_missing_table();
                trace!(table_id = id, "queued table was dropped; skipping");
                continue;
            };
            self.metrics.on_table_opened();
            if !table.is_accessible() {
                dict.close_table(table);
                drop(dict);
                self.metrics.on_inaccessible_table();
                trace!(table_id = id, "queued table is not accessible; skipping");
                continue;
            }
            dict.set_bg_status(&table, BgStatus::InProgress);
            drop(dict);

            let since_last_ms = now_ms().saturating_sub(table.stats_last_recalc_ms());
            let processed = if since_last_ms < self.options.min_recalc_interval_ms {
                self.queue.requeue(id);
                if !self.timer.arm(self.options.min_recalc_interval()) {
                    self.metrics.on_arm_skipped();
                }
                self.metrics.on_throttled();
                debug!(
                    table = table.name(),
                    since_last_ms, "statistics are fresh; recalculation postponed"
                );
                false
            } else {
                self.recompute_logged(&table, PersistenceMode::Persistent);
                true
            };

            let mut dict = self.dict.lock();
            dict.set_bg_status(&table, BgStatus::None);
            dict.close_table(table);
            return processed;
        }
    }

    pub(crate) fn recompute(&self, table: &DictTable, mode: PersistenceMode) -> Result<()> {
        fault::check(fault::RECOMPUTE)?;
        self.recalculator.recompute(table, mode)?;
        table.note_recalculated(mode, now_ms());
        Ok(())
    }

    // failures are logged and counted, never propagated
    pub(crate) fn recompute_logged(&self, table: &DictTable, mode: PersistenceMode) -> bool {
        match self.recompute(table, mode) {
            Ok(()) => {
                self.metrics
                    .on_recalculated(mode == PersistenceMode::Persistent);
                debug!(table = table.name(), ?mode, "statistics recalculated");
                true
            }
            Err(StatsError::Interrupted(_)) => {
                self.metrics.on_recalc_interrupted();
                debug!(table = table.name(), ?mode, "statistics recalculation interrupted");
                false
            }
            Err(e) => {
                self.metrics.on_recalc_failed();
                warn!(table = table.name(), ?mode, error = %e, "statistics recalculation failed");
                false
            }
        }
    }
}
