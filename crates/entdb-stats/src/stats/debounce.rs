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
use crate::timer::{Timer, TimerCallback, TimerPool};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// `arm` only tries the slot lock while `stop` takes it. A rearm issued from
// inside the callback must never hold up a `stop` waiting on that callback.
pub struct DebounceTimer {
    pool: Arc<dyn TimerPool>,
    slot: Mutex<Option<Box<dyn Timer>>>,
    // mirrors `slot.is_some()`; only written with `slot` held
    started: AtomicBool,
}

impl DebounceTimer {
    pub fn new(pool: Arc<dyn TimerPool>) -> Self {
        Self {
            pool,
            slot: Mutex::new(None),
            started: AtomicBool::new(false),
        }
    }

    pub fn start(&self, callback: TimerCallback) -> Result<()> {
        let mut slot = self.slot.lock();
        if slot.is_none() {
            *slot = Some(self.pool.create_timer(callback)?);
            self.started.store(true, Ordering::Release);
        }
        Ok(())
    }

    pub fn arm(&self, delay: Duration) -> bool {
        let Some(slot) = self.slot.try_lock() else {
            return false;
        };
        match slot.as_ref() {
            Some(timer) => {
                timer.set_time(delay, None);
                true
            }
            None => false,
        }
    }

    pub fn arm_now(&self) -> bool {
        self.arm(Duration::ZERO)
    }

    pub fn stop(&self) {
        let mut slot = self.slot.lock();
        // dropped under the lock so no concurrent arm can reach it
        *slot = None;
        self.started.store(false, Ordering::Release);
    }

    // Must not touch `slot`: a blocking reader would make concurrent
    // `arm` calls fail their try_lock and lose the wake-up.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}
