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
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct RecalcQueue {
    entries: Mutex<VecDeque<TableId>>,
}

impl RecalcQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, id: TableId) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains(&id) {
            return false;
        }
        entries.push_back(id);
        entries.len() == 1
    }

    // never reports a wake-up; the worker arms its own delayed retry
    pub fn requeue(&self, id: TableId) {
        let mut entries = self.entries.lock();
        if !entries.contains(&id) {
            entries.push_back(id);
        }
    }

    pub fn dequeue(&self) -> Option<TableId> {
        self.entries.lock().pop_front()
    }

    pub fn remove(&self, id: TableId) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|e| *e == id) {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        entries.shrink_to_fit();
    }

    pub fn contains(&self, id: TableId) -> bool {
        self.entries.lock().contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<TableId> {
        self.entries.lock().iter().copied().collect()
    }
}
