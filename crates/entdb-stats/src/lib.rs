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

pub mod config;
pub mod dict;
pub mod error;
pub mod fault;
pub mod stats;
pub mod timer;

pub use config::StatsOptions;
pub use dict::{DictGuard, DictTable, Dictionary, TableId, TableOptions};
pub use error::{Result, StatsError};
pub use stats::{PersistenceMode, StatsBackground, StatsRecalculator};
