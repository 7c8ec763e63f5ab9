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

pub mod admission;
pub mod background;
pub mod debounce;
pub mod metrics;
pub mod queue;
pub mod recalc;
mod worker;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

pub use admission::{AdmissionPolicy, StatsPersistence};
pub use background::{StatsBackground, StatsBackgroundBuilder};
pub use debounce::DebounceTimer;
pub use metrics::{StatsMetrics, StatsMetricsSnapshot};
pub use queue::RecalcQueue;
pub use recalc::{
    BackgroundMaintenance, NeverSuppress, NoMaintenance, StatsRecalculator, SuppressionPolicy,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersistenceMode {
    Transient,
    Persistent,
}
