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

use crate::dict::table::{BgStatus, DictTable, TableId, TableOptions};
use crate::error::{Result, StatsError};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;

struct DictState {
    tables: HashMap<TableId, Arc<DictTable>>,
    names: HashMap<String, TableId>,
    next_table_id: TableId,
}

pub struct Dictionary {
    state: Mutex<DictState>,
    bg_released: Condvar,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DictState {
                tables: HashMap::new(),
                names: HashMap::new(),
                next_table_id: 1,
            }),
            bg_released: Condvar::new(),
        }
    }

    pub fn lock(&self) -> DictGuard<'_> {
        DictGuard {
            dict: self,
            state: self.state.lock(),
        }
    }

    pub fn create_table(&self, name: &str, opts: TableOptions) -> Result<Arc<DictTable>> {
        self.lock().create_table(name, opts)
    }

    pub fn table_by_name(&self, name: &str) -> Option<Arc<DictTable>> {
        self.lock().table_by_name(name)
    }

    pub fn len(&self) -> usize {
        self.state.lock().tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct DictGuard<'a> {
    dict: &'a Dictionary,
    state: MutexGuard<'a, DictState>,
}

impl DictGuard<'_> {
    pub fn is_latch_of(&self, dict: &Dictionary) -> bool {
        std::ptr::eq(self.dict, dict)
    }

    pub fn create_table(&mut self, name: &str, opts: TableOptions) -> Result<Arc<DictTable>> {
        if self.state.names.contains_key(name) {
            return Err(StatsError::TableExists(name.to_string()));
        }

        let id = self.state.next_table_id;
        self.state.next_table_id = id.saturating_add(1);

        let table = Arc::new(DictTable::new(id, name, &opts));
        self.state.tables.insert(id, Arc::clone(&table));
        self.state.names.insert(name.to_string(), id);
        Ok(table)
    }

    // caller must have waited for the background worker first
    pub fn drop_table(&mut self, id: TableId) -> Result<Arc<DictTable>> {
        let table = self
            .state
            .tables
            .get(&id)
            .cloned()
            .ok_or(StatsError::TableNotFound(id))?;
        if table.bg_status() == BgStatus::InProgress {
            return Err(StatsError::TableInUse(id));
        }
        self.state.tables.remove(&id);
        self.state.names.remove(table.name());
        Ok(table)
    }

    pub fn table(&self, id: TableId) -> Option<Arc<DictTable>> {
        self.state.tables.get(&id).cloned()
    }

    pub fn table_by_name(&self, name: &str) -> Option<Arc<DictTable>> {
        let id = self.state.names.get(name)?;
        self.state.tables.get(id).cloned()
    }

    pub fn open_table_by_id(&mut self, id: TableId) -> Option<Arc<DictTable>> {
        let table = self.state.tables.get(&id).cloned()?;
        table.acquire();
        Some(table)
    }

    pub fn close_table(&mut self, table: Arc<DictTable>) {
        table.release();
    }

    pub fn set_bg_status(&mut self, table: &DictTable, status: BgStatus) {
        table.store_bg_status(status);
        if status == BgStatus::None {
            table.set_bg_stop_requested(false);
            self.dict.bg_released.notify_all();
        }
    }

    pub fn wait_bg_released(&mut self, table: &DictTable) {
        while table.bg_status() == BgStatus::InProgress {
            table.set_bg_stop_requested(true);
            self.dict.bg_released.wait(&mut self.state);
        }
    }

    pub fn unlocked<R>(&mut self, f: impl FnOnce() -> R) -> R {
        MutexGuard::unlocked(&mut self.state, f)
    }
}
