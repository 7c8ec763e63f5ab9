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

use crate::stats::PersistenceMode;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};

pub type TableId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableStatsOption {
    #[default]
    Default,
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BgStatus {
    None,
    InProgress,
}

impl BgStatus {
    fn to_raw(self) -> u8 {
        match self {
            BgStatus::None => 0,
            BgStatus::InProgress => 1,
        }
    }

    fn from_raw(raw: u8) -> Self {
        if raw == 0 {
            BgStatus::None
        } else {
            BgStatus::InProgress
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    pub temporary: bool,
    pub stats_persistent: TableStatsOption,
    pub stats_auto_recalc: TableStatsOption,
    pub n_rows: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModificationState {
    pub stat_modified_counter: u64,
    pub stats_last_recalc_ms: u64,
    pub row_count_estimate: u64,
    pub bg_status: BgStatus,
    pub temporary: bool,
}

// counters are updated racily; `bg_status` only under the dictionary latch
#[derive(Debug)]
pub struct DictTable {
    id: TableId,
    name: String,
    temporary: bool,
    stats_persistent: TableStatsOption,
    stats_auto_recalc: TableStatsOption,
    n_rows: AtomicU64,
    stat_modified_counter: AtomicU64,
    stats_last_recalc_ms: AtomicU64,
    stats_initialized: AtomicBool,
    accessible: AtomicBool,
    bg_status: AtomicU8,
    bg_stop_requested: AtomicBool,
    n_ref: AtomicU32,
}

impl DictTable {
    pub(crate) fn new(id: TableId, name: &str, opts: &TableOptions) -> Self {
        Self {
            id,
            name: name.to_string(),
            temporary: opts.temporary,
            stats_persistent: opts.stats_persistent,
            stats_auto_recalc: opts.stats_auto_recalc,
            n_rows: AtomicU64::new(opts.n_rows),
            stat_modified_counter: AtomicU64::new(0),
            stats_last_recalc_ms: AtomicU64::new(0),
            stats_initialized: AtomicBool::new(false),
            accessible: AtomicBool::new(true),
            bg_status: AtomicU8::new(BgStatus::None.to_raw()),
            bg_stop_requested: AtomicBool::new(false),
            n_ref: AtomicU32::new(0),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn stats_persistent(&self) -> TableStatsOption {
        self.stats_persistent
    }

    pub fn stats_auto_recalc(&self) -> TableStatsOption {
        self.stats_auto_recalc
    }

    pub fn n_rows(&self) -> u64 {
        self.n_rows.load(Ordering::Relaxed)
    }

    pub fn set_n_rows(&self, n_rows: u64) {
        self.n_rows.store(n_rows, Ordering::Relaxed);
    }

    pub fn stat_modified_counter(&self) -> u64 {
        self.stat_modified_counter.load(Ordering::Relaxed)
    }

    // returns the previous value
    pub fn bump_modified_counter(&self) -> u64 {
        self.stat_modified_counter.fetch_add(1, Ordering::Relaxed)
    }

    pub fn reset_modified_counter(&self) {
        self.stat_modified_counter.store(0, Ordering::Relaxed);
    }

    pub fn stats_last_recalc_ms(&self) -> u64 {
        self.stats_last_recalc_ms.load(Ordering::Acquire)
    }

    pub fn set_stats_last_recalc_ms(&self, at_ms: u64) {
        self.stats_last_recalc_ms.store(at_ms, Ordering::Release);
    }

    pub fn stats_initialized(&self) -> bool {
        self.stats_initialized.load(Ordering::Acquire)
    }

    pub fn set_stats_initialized(&self, initialized: bool) {
        self.stats_initialized.store(initialized, Ordering::Release);
    }

    pub fn note_recalculated(&self, mode: PersistenceMode, at_ms: u64) {
        self.reset_modified_counter();
        if mode == PersistenceMode::Persistent {
            self.set_stats_last_recalc_ms(at_ms);
        }
        self.set_stats_initialized(true);
    }

    pub fn is_accessible(&self) -> bool {
        self.accessible.load(Ordering::Acquire)
    }

    pub fn set_accessible(&self, accessible: bool) {
        self.accessible.store(accessible, Ordering::Release);
    }

    pub fn bg_status(&self) -> BgStatus {
        BgStatus::from_raw(self.bg_status.load(Ordering::Acquire))
    }

    pub(crate) fn store_bg_status(&self, status: BgStatus) {
        self.bg_status.store(status.to_raw(), Ordering::Release);
    }

    pub fn bg_stop_requested(&self) -> bool {
        self.bg_stop_requested.load(Ordering::Acquire)
    }

    pub(crate) fn set_bg_stop_requested(&self, requested: bool) {
        self.bg_stop_requested.store(requested, Ordering::Release);
    }

    pub fn ref_count(&self) -> u32 {
        self.n_ref.load(Ordering::Acquire)
    }

    pub(crate) fn acquire(&self) {
        self.n_ref.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn release(&self) {
        let prev = self.n_ref.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "table {} released more often than opened", self.id);
    }

    pub fn modification_state(&self) -> ModificationState {
        ModificationState {
            stat_modified_counter: self.stat_modified_counter(),
            stats_last_recalc_ms: self.stats_last_recalc_ms(),
            row_count_estimate: self.n_rows(),
            bg_status: self.bg_status(),
            temporary: self.temporary,
        }
    }
}

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
