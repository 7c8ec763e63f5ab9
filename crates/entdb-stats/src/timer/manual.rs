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
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct ManualState {
    callback: Option<TimerCallback>,
    armed: Option<Duration>,
    requests: Vec<Duration>,
    created: usize,
    live: bool,
}

#[derive(Default, Clone)]
pub struct ManualTimerPool {
    state: Arc<Mutex<ManualState>>,
}

impl ManualTimerPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) -> bool {
        let callback = {
            let mut state = self.state.lock();
            if !state.live || state.armed.take().is_none() {
                return false;
            }
            state.callback.clone()
        };
        match callback {
            Some(cb) => {
                cb();
                true
            }
            None => false,
        }
    }

    pub fn armed(&self) -> Option<Duration> {
        let state = self.state.lock();
        if state.live {
            state.armed
        } else {
            None
        }
    }

    pub fn requests(&self) -> Vec<Duration> {
        self.state.lock().requests.clone()
    }

    pub fn timers_created(&self) -> usize {
        self.state.lock().created
    }

    pub fn has_live_timer(&self) -> bool {
        self.state.lock().live
    }
}

impl TimerPool for ManualTimerPool {
    fn create_timer(&self, callback: TimerCallback) -> Result<Box<dyn Timer>> {
        let mut state = self.state.lock();
        state.callback = Some(callback);
        state.armed = None;
        state.created += 1;
        state.live = true;
        Ok(Box::new(ManualTimer {
            state: Arc::clone(&self.state),
        }))
    }
}

struct ManualTimer {
    state: Arc<Mutex<ManualState>>,
}

impl Timer for ManualTimer {
    fn set_time(&self, delay: Duration, _period: Option<Duration>) {
        let mut state = self.state.lock();
        state.armed = Some(delay);
        state.requests.push(delay);
    }

    fn disarm(&self) {
        self.state.lock().armed = None;
    }
}

impl Drop for ManualTimer {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.live = false;
        state.armed = None;
        state.callback = None;
    }
}
