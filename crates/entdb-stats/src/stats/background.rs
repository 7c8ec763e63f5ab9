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
use crate::dict::{DictGuard, DictTable, Dictionary, ModificationState, TableId};
use crate::error::Result;
use crate::stats::admission::AdmissionPolicy;
use crate::stats::debounce::DebounceTimer;
use crate::stats::metrics::{StatsMetrics, StatsMetricsSnapshot};
use crate::stats::queue::RecalcQueue;
use crate::stats::recalc::{
    BackgroundMaintenance, NeverSuppress, NoMaintenance, StatsRecalculator, SuppressionPolicy,
};
use crate::stats::PersistenceMode;
use crate::timer::{TimerCallback, TimerPool};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) struct StatsShared {
    pub(crate) dict: Arc<Dictionary>,
    pub(crate) queue: RecalcQueue,
    pub(crate) timer: DebounceTimer,
    pub(crate) policy: AdmissionPolicy,
    pub(crate) options: StatsOptions,
    pub(crate) recalculator: Arc<dyn StatsRecalculator>,
    pub(crate) maintenance: Arc<dyn BackgroundMaintenance>,
    pub(crate) suppression: Arc<dyn SuppressionPolicy>,
    pub(crate) metrics: StatsMetrics,
    pub(crate) worker_lock: Mutex<()>,
}

pub struct StatsBackgroundBuilder {
    dict: Arc<Dictionary>,
    timers: Arc<dyn TimerPool>,
    recalculator: Arc<dyn StatsRecalculator>,
    options: StatsOptions,
    maintenance: Arc<dyn BackgroundMaintenance>,
    suppression: Arc<dyn SuppressionPolicy>,
}

impl StatsBackgroundBuilder {
    pub fn options(mut self, options: StatsOptions) -> Self {
        self.options = options;
        self
    }

    pub fn maintenance(mut self, maintenance: Arc<dyn BackgroundMaintenance>) -> Self {
        self.maintenance = maintenance;
        self
    }

    pub fn suppression(mut self, suppression: Arc<dyn SuppressionPolicy>) -> Self {
        self.suppression = suppression;
        self
    }

    pub fn init(self) -> StatsBackground {
        let options = self.options.sanitize();
        let shared = StatsShared {
            dict: self.dict,
            queue: RecalcQueue::new(),
            timer: DebounceTimer::new(self.timers),
            policy: AdmissionPolicy::new(options.modified_counter_ceiling()),
            options,
            recalculator: self.recalculator,
            maintenance: self.maintenance,
            suppression: self.suppression,
            metrics: StatsMetrics::default(),
            worker_lock: Mutex::new(()),
        };
        debug!(?options, "background statistics initialised");
        StatsBackground {
            shared: Arc::new(shared),
        }
    }
}

pub struct StatsBackground {
    shared: Arc<StatsShared>,
}

impl StatsBackground {
    pub fn builder(
        dict: Arc<Dictionary>,
        timers: Arc<dyn TimerPool>,
        recalculator: Arc<dyn StatsRecalculator>,
    ) -> StatsBackgroundBuilder {
        StatsBackgroundBuilder {
            dict,
            timers,
            recalculator,
            options: StatsOptions::default(),
            maintenance: Arc::new(NoMaintenance),
            suppression: Arc::new(NeverSuppress),
        }
    }

    pub fn init(
        dict: Arc<Dictionary>,
        timers: Arc<dyn TimerPool>,
        recalculator: Arc<dyn StatsRecalculator>,
        options: StatsOptions,
    ) -> Self {
        Self::builder(dict, timers, recalculator)
            .options(options)
            .init()
    }

    pub fn start(&self) -> Result<()> {
        let weak = Arc::downgrade(&self.shared);
        let callback: TimerCallback = Arc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.run_worker_pass();
            }
        });
        self.shared.timer.start(callback)?;
        if !self.shared.queue.is_empty() && !self.shared.timer.arm_now() {
            self.shared.metrics.on_arm_skipped();
        }
        info!("background statistics started");
        Ok(())
    }

    // callers must stop reporting modifications first
    pub fn shutdown(&self) {
        self.shared.timer.stop();
        self.shared.queue.clear();
        info!("background statistics stopped");
    }

    pub fn set_disabled(&self, disabled: bool) -> Result<()> {
        if disabled {
            self.shutdown();
            Ok(())
        } else {
            self.start()
        }
    }

    pub fn on_table_modified(&self, table: &DictTable) -> Option<PersistenceMode> {
        let shared = &self.shared;
        // Not loaded by the SQL layer yet; stats get computed when it is.
        if !table.stats_initialized() {
            return None;
        }

        let counter = table.bump_modified_counter();
        let state = ModificationState {
            stat_modified_counter: counter,
            ..table.modification_state()
        };
        let suppress = shared.suppression.should_suppress(table);
        if suppress {
            shared.metrics.on_suppressed();
        }

        let mode = shared
            .policy
            .decide(&state, shared.options.persistence_for(table), suppress)?;
        match mode {
            PersistenceMode::Persistent => {
                let woke = shared.queue.enqueue(table.id());
                table.reset_modified_counter();
                shared.metrics.on_admitted(woke);
                debug!(table = table.name(), counter, "queued for background statistics");
                if woke && !shared.timer.arm_now() {
                    shared.metrics.on_arm_skipped();
                }
            }
            PersistenceMode::Transient => {
                shared.recompute_logged(table, PersistenceMode::Transient);
            }
        }
        Some(mode)
    }

    pub fn remove_table(&self, id: TableId) {
        self.shared.queue.remove(id);
    }

    // `dict` is released while waiting and held again on return; the worker
    // cannot pick the table up again until the caller drops it.
    pub fn wait_until_quiescent(&self, dict: &mut DictGuard<'_>, id: TableId) {
        // waiting on another dictionary's condvar would never be woken
        assert!(
            dict.is_latch_of(&self.shared.dict),
            "wait_until_quiescent called with the latch of another dictionary"
        );
        if let Some(table) = dict.table(id) {
            dict.wait_bg_released(&table);
        }
    }

    pub fn process_pending(&self) {
        self.shared.run_worker_pass();
    }

    pub fn is_started(&self) -> bool {
        self.shared.timer.is_started()
    }

    pub fn queue(&self) -> &RecalcQueue {
        &self.shared.queue
    }

    pub fn options(&self) -> &StatsOptions {
        &self.shared.options
    }

    pub fn metrics(&self) -> StatsMetricsSnapshot {
        self.shared.metrics.snapshot()
    }
}

impl Drop for StatsBackground {
    fn drop(&mut self) {
        self.shared.timer.stop();
    }
}
