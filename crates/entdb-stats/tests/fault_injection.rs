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

use entdb_stats::dict::{BgStatus, TableStatsOption};
use entdb_stats::fault;
use entdb_stats::timer::{ManualTimerPool, ThreadTimerPool};
use entdb_stats::{
    DictTable, Dictionary, PersistenceMode, Result, StatsBackground, StatsError, StatsOptions,
    StatsRecalculator, TableOptions,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::{Mutex, OnceLock};

fn failpoint_test_guard() -> std::sync::MutexGuard<'static, ()> {
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD
        .get_or_init(|| Mutex::new(()))
        .lock()
        .expect("failpoint test guard")
}

#[derive(Default)]
struct CountingRecalculator {
    calls: AtomicUsize,
}

impl StatsRecalculator for CountingRecalculator {
    fn recompute(&self, _table: &DictTable, _mode: PersistenceMode) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn loaded(dict: &Dictionary, name: &str, persistent: TableStatsOption) -> Arc<DictTable> {
    let table = dict
        .create_table(
            name,
            TableOptions {
                stats_persistent: persistent,
                ..TableOptions::default()
            },
        )
        .expect("create table");
    table.set_stats_initialized(true);
    table
}

#[test]
fn recompute_failpoint_is_logged_and_not_retried() {
    let _guard = failpoint_test_guard();
    fault::clear_all_failpoints();
    let dict = Arc::new(Dictionary::new());
    let recalc = Arc::new(CountingRecalculator::default());
    let bg = StatsBackground::init(
        Arc::clone(&dict),
        Arc::new(ManualTimerPool::new()),
        Arc::clone(&recalc) as Arc<dyn StatsRecalculator>,
        StatsOptions::default(),
    );
    let t = loaded(&dict, "t", TableStatsOption::On);

    fault::set_failpoint(fault::RECOMPUTE, 0);
    assert_eq!(bg.on_table_modified(&t), None);
    assert_eq!(
        bg.on_table_modified(&t),
        Some(PersistenceMode::Persistent)
    );
    bg.process_pending();

    assert_eq!(recalc.calls.load(Ordering::SeqCst), 0);
    assert!(bg.queue().is_empty());
    assert_eq!(t.stats_last_recalc_ms(), 0);
    assert_eq!(t.bg_status(), BgStatus::None);
    assert_eq!(t.ref_count(), 0);
    assert_eq!(bg.metrics().recalc_failures, 1);

    // one-shot: the next queueing succeeds
    assert_eq!(bg.on_table_modified(&t), None);
    assert_eq!(
        bg.on_table_modified(&t),
        Some(PersistenceMode::Persistent)
    );
    bg.process_pending();
    assert_eq!(recalc.calls.load(Ordering::SeqCst), 1);
    assert!(t.stats_last_recalc_ms() > 0);
    fault::clear_all_failpoints();
}

#[test]
fn transient_recompute_failure_keeps_counter() {
    let _guard = failpoint_test_guard();
    fault::clear_all_failpoints();
    let dict = Arc::new(Dictionary::new());
    let bg = StatsBackground::init(
        Arc::clone(&dict),
        Arc::new(ManualTimerPool::new()),
        Arc::new(CountingRecalculator::default()),
        StatsOptions::default(),
    );
    let t = loaded(&dict, "small", TableStatsOption::Off);

    fault::set_failpoint(fault::RECOMPUTE, 0);
    for _ in 0..17 {
        assert_eq!(bg.on_table_modified(&t), None);
    }
    assert_eq!(bg.on_table_modified(&t), Some(PersistenceMode::Transient));
    assert_eq!(t.stat_modified_counter(), 18);
    assert_eq!(bg.metrics().recalc_failures, 1);
    fault::clear_all_failpoints();
}

#[test]
fn timer_create_failpoint_fails_start() {
    let _guard = failpoint_test_guard();
    fault::clear_all_failpoints();
    let dict = Arc::new(Dictionary::new());
    let bg = StatsBackground::init(
        Arc::clone(&dict),
        Arc::new(ThreadTimerPool::default()),
        Arc::new(CountingRecalculator::default()),
        StatsOptions::default(),
    );

    fault::set_failpoint(fault::TIMER_CREATE, 0);
    let err = bg.start().expect_err("expected timer.create failpoint error");
    assert!(matches!(err, StatsError::Failpoint(name) if name == fault::TIMER_CREATE));
    assert!(err.to_string().contains("failpoint"));
    assert!(!bg.is_started());

    bg.start().expect("start after failpoint fired");
    assert!(bg.is_started());
    bg.shutdown();
    fault::clear_all_failpoints();
}

#[test]
fn recompute_failpoint_hits_only_the_requested_table() {
    let _guard = failpoint_test_guard();
    fault::clear_all_failpoints();
    let dict = Arc::new(Dictionary::new());
    let recalc = Arc::new(CountingRecalculator::default());
    let bg = StatsBackground::init(
        Arc::clone(&dict),
        Arc::new(ManualTimerPool::new()),
        Arc::clone(&recalc) as Arc<dyn StatsRecalculator>,
        StatsOptions::default(),
    );
    let first = loaded(&dict, "first", TableStatsOption::On);
    let second = loaded(&dict, "second", TableStatsOption::On);
    for t in [&first, &second] {
        bg.on_table_modified(t);
        assert_eq!(bg.on_table_modified(t), Some(PersistenceMode::Persistent));
    }

    fault::set_failpoint(fault::RECOMPUTE, 1);
    bg.process_pending();

    assert_eq!(recalc.calls.load(Ordering::SeqCst), 1);
    assert!(first.stats_last_recalc_ms() > 0);
    assert_eq!(second.stats_last_recalc_ms(), 0);
    let m = bg.metrics();
    assert_eq!(m.persistent_recalcs, 1);
    assert_eq!(m.recalc_failures, 1);
    assert!(bg.queue().is_empty());
    fault::clear_all_failpoints();
}
