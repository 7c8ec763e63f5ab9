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

use crate::dict::TableId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("table {0} not found")]
    TableNotFound(TableId),

    #[error("table {0} is in use by background statistics")]
    TableInUse(TableId),

    #[error("invalid stats configuration: {0}")]
    Config(String),

    #[error("statistics recalculation failed for '{table}': {reason}")]
    Recalc { table: String, reason: String },

    #[error("statistics recalculation for table {0} was interrupted")]
    Interrupted(TableId),

    #[error("failpoint '{0}' fired")]
    Failpoint(&'static str),
}

pub type Result<T> = std::result::Result<T, StatsError>;
