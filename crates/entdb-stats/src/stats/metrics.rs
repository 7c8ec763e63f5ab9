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

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsMetricsSnapshot {
    pub admitted: u64,
    pub wakeups: u64,
    pub suppressed: u64,
    pub transient_recalcs: u64,
    pub persistent_recalcs: u64,
    pub recalc_failures: u64,
    pub recalc_interrupted: u64,
    pub throttled: u64,
    pub missing_tables: u64,
    pub inaccessible_tables: u64,
    pub tables_opened: u64,
    pub arm_skipped: u64,
    pub worker_passes: u64,
}

#[derive(Debug, Default)]
pub struct StatsMetrics {
    admitted: AtomicU64,
    wakeups: AtomicU64,
    suppressed: AtomicU64,
    transient_recalcs: AtomicU64,
    persistent_recalcs: AtomicU64,
    recalc_failures: AtomicU64,
    recalc_interrupted: AtomicU64,
    throttled: AtomicU64,
    missing_tables: AtomicU64,
    inaccessible_tables: AtomicU64,
    tables_opened: AtomicU64,
    arm_skipped: AtomicU64,
    worker_passes: AtomicU64,
}

impl StatsMetrics {
    // `woke`: this admission made the queue non-empty
    pub fn on_admitted(&self, woke: bool) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
        if woke {
            self.wakeups.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn on_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_recalculated(&self, persistent: bool) {
        if persistent {
            self.persistent_recalcs.fetch_add(1, Ordering::Relaxed);
        } else {
            self.transient_recalcs.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn on_recalc_failed(&self) {
        self.recalc_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_recalc_interrupted(&self) {
        self.recalc_interrupted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_throttled(&self) {
        self.throttled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_missing_table(&self) {
        self.missing_tables.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_inaccessible_table(&self) {
        self.inaccessible_tables.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_table_opened(&self) {
        self.tables_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_arm_skipped(&self) {
        self.arm_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_worker_pass(&self) {
        self.worker_passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsMetricsSnapshot {
        StatsMetricsSnapshot {
            admitted: self.admitted.load(Ordering::Relaxed),
            wakeups: self.wakeups.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            transient_recalcs: self.transient_recalcs.load(Ordering::Relaxed),
            persistent_recalcs: self.persistent_recalcs.load(Ordering::Relaxed),
            recalc_failures: self.recalc_failures.load(Ordering::Relaxed),
            recalc_interrupted: self.recalc_interrupted.load(Ordering::Relaxed),
            throttled: self.throttled.load(Ordering::Relaxed),
            missing_tables: self.missing_tables.load(Ordering::Relaxed),
            inaccessible_tables: self.inaccessible_tables.load(Ordering::Relaxed),
            tables_opened: self.tables_opened.load(Ordering::Relaxed),
            arm_skipped: self.arm_skipped.load(Ordering::Relaxed),
            worker_passes: self.worker_passes.load(Ordering::Relaxed),
        }
    }
}
