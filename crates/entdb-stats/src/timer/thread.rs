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

use crate::error::Result;
use crate::fault;
use crate::timer::{Timer, TimerCallback, TimerPool};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug)]
pub struct ThreadTimerPool {
    name: String,
    next_timer: AtomicU64,
}

impl ThreadTimerPool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_timer: AtomicU64::new(0),
        }
    }
}

impl Default for ThreadTimerPool {
    fn default() -> Self {
        Self::new("entdb-timer")
    }
}

impl TimerPool for ThreadTimerPool {
    fn create_timer(&self, callback: TimerCallback) -> Result<Box<dyn Timer>> {
        fault::check(fault::TIMER_CREATE)?;
        let shared = Arc::new(TimerShared {
            state: Mutex::new(TimerState {
                deadline: None,
                period: None,
                shutdown: false,
            }),
            wakeup: Condvar::new(),
        });

        let seq = self.next_timer.fetch_add(1, Ordering::Relaxed);
        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(format!("{}-{seq}", self.name))
            .spawn(move || timer_loop(&thread_shared, &callback))?;

        Ok(Box::new(ThreadTimer {
            shared,
            handle: Some(handle),
        }))
    }
}

struct TimerState {
    deadline: Option<Instant>,
    period: Option<Duration>,
    shutdown: bool,
}

struct TimerShared {
    state: Mutex<TimerState>,
    wakeup: Condvar,
}

struct ThreadTimer {
    shared: Arc<TimerShared>,
    handle: Option<JoinHandle<()>>,
}

impl Timer for ThreadTimer {
    fn set_time(&self, delay: Duration, period: Option<Duration>) {
        let mut state = self.shared.state.lock();
        state.deadline = Some(Instant::now() + delay);
        state.period = period;
        self.shared.wakeup.notify_one();
    }

    fn disarm(&self) {
        let mut state = self.shared.state.lock();
        state.deadline = None;
        state.period = None;
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
            state.deadline = None;
            self.shared.wakeup.notify_one();
        }
        if let Some(handle) = self.handle.take() {
            // A callback destroying its own timer cannot wait for itself.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

fn timer_loop(shared: &TimerShared, callback: &TimerCallback) {
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            return;
        }
        match state.deadline {
            None => shared.wakeup.wait(&mut state),
            Some(deadline) => {
                let now = Instant::now();
                if now < deadline {
                    shared.wakeup.wait_until(&mut state, deadline);
                    continue;
                }
                state.deadline = state.period.map(|p| now + p);
                trace!("timer fired");
                MutexGuard::unlocked(&mut state, || callback());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_timer(pool: &ThreadTimerPool) -> (Box<dyn Timer>, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let timer = pool
            .create_timer(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .expect("create timer");
        (timer, fired)
    }

    fn wait_for(fired: &AtomicUsize, at_least: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if fired.load(Ordering::SeqCst) >= at_least {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn unarmed_timer_never_fires() {
        let pool = ThreadTimerPool::default();
        let (timer, fired) = counting_timer(&pool);
        thread::sleep(Duration::from_millis(50));
        drop(timer);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn one_shot_fires_once() {
        let pool = ThreadTimerPool::default();
        let (timer, fired) = counting_timer(&pool);
        timer.set_time(Duration::ZERO, None);
        assert!(wait_for(&fired, 1));
        thread::sleep(Duration::from_millis(50));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rearm_replaces_later_deadline() {
        let pool = ThreadTimerPool::default();
        let (timer, fired) = counting_timer(&pool);
        timer.set_time(Duration::from_secs(60), None);
        timer.set_time(Duration::ZERO, None);
        assert!(wait_for(&fired, 1));
    }

    #[test]
    fn disarm_cancels_pending_deadline() {
        let pool = ThreadTimerPool::default();
        let (timer, fired) = counting_timer(&pool);
        timer.set_time(Duration::from_millis(100), None);
        timer.disarm();
        thread::sleep(Duration::from_millis(200));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn periodic_timer_keeps_firing() {
        let pool = ThreadTimerPool::default();
        let (timer, fired) = counting_timer(&pool);
        timer.set_time(Duration::ZERO, Some(Duration::from_millis(5)));
        assert!(wait_for(&fired, 3));
    }

    #[test]
    fn drop_waits_for_running_callback() {
        let pool = ThreadTimerPool::default();
        let finished = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(AtomicUsize::new(0));
        let (f, s) = (Arc::clone(&finished), Arc::clone(&started));
        let timer = pool
            .create_timer(Arc::new(move || {
                s.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(100));
                f.fetch_add(1, Ordering::SeqCst);
            }))
            .expect("create timer");
        timer.set_time(Duration::ZERO, None);
        assert!(wait_for(&started, 1));

        drop(timer);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }
}
