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

use crate::error::{Result, StatsError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const RECOMPUTE: &str = "stats.recompute";
pub const TIMER_CREATE: &str = "timer.create";

// name -> hits left before the one-shot failure
type Registry = Mutex<HashMap<&'static str, usize>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::default)
}

pub fn set_failpoint(name: &'static str, hits_before_fail: usize) {
    registry().lock().insert(name, hits_before_fail);
}

pub fn clear_failpoint(name: &str) {
    registry().lock().remove(name);
}

pub fn clear_all_failpoints() {
    registry().lock().clear();
}

pub fn should_fail(name: &str) -> bool {
    let mut reg = registry().lock();
    match reg.get_mut(name) {
        None => false,
        Some(0) => {
            reg.remove(name);
            true
        }
        Some(left) => {
            *left -= 1;
            false
        }
    }
}

pub fn check(name: &'static str) -> Result<()> {
    if should_fail(name) {
        return Err(StatsError::Failpoint(name));
    }
    Ok(())
}
