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

use crate::dict::DictTable;
use crate::error::Result;
use crate::stats::PersistenceMode;

pub trait StatsRecalculator: Send + Sync {
    fn recompute(&self, table: &DictTable, mode: PersistenceMode) -> Result<()>;
}

pub trait BackgroundMaintenance: Send + Sync {
    fn run_pending(&self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoMaintenance;

impl BackgroundMaintenance for NoMaintenance {
    fn run_pending(&self) {}
}

pub trait SuppressionPolicy: Send + Sync {
    fn should_suppress(&self, table: &DictTable) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NeverSuppress;

impl SuppressionPolicy for NeverSuppress {
    fn should_suppress(&self, _table: &DictTable) -> bool {
        false
    }
}

impl<F> SuppressionPolicy for F
where
    F: Fn(&DictTable) -> bool + Send + Sync,
{
    fn should_suppress(&self, table: &DictTable) -> bool {
        self(table)
    }
}
