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

pub mod manual;
pub mod thread;

use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;

pub use manual::ManualTimerPool;
pub use thread::ThreadTimerPool;

pub type TimerCallback = Arc<dyn Fn() + Send + Sync>;

// Dropping a timer destroys it: once drop returns the callback is not
// running and will not run again.
pub trait Timer: Send + Sync {
    fn set_time(&self, delay: Duration, period: Option<Duration>);

    fn disarm(&self);
}

pub trait TimerPool: Send + Sync {
    fn create_timer(&self, callback: TimerCallback) -> Result<Box<dyn Timer>>;
}
