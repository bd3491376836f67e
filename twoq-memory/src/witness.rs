//  Copyright 2026 twoq Project Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

use hashbrown::HashMap;
use twoq_common::code::Position;

use crate::list::{SlabList, Token};

/// A bounded set of positions seen while on probation.
///
/// Witnesses carry no payload. When the tracker is full, recording a new witness forgets the least recently
/// recorded or touched one. A tracker with zero capacity tracks nothing.
#[derive(Default)]
pub struct WitnessTracker {
    list: SlabList<Position>,
    index: HashMap<Position, Token>,
    capacity: usize,
}

impl std::fmt::Debug for WitnessTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WitnessTracker")
            .field("len", &self.list.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl WitnessTracker {
    /// Create an empty tracker that holds up to `capacity` witnesses.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: SlabList::new(),
            index: HashMap::new(),
            capacity,
        }
    }

    /// Returns `true` if the position is currently tracked.
    pub fn seen(&self, position: Position) -> bool {
        self.index.contains_key(&position)
    }

    /// Returns `true` if the position is currently tracked, and refreshes it if so.
    pub fn touch(&mut self, position: Position) -> bool {
        match self.index.get(&position) {
            Some(&token) => {
                self.list.move_to_back(token);
                true
            }
            None => false,
        }
    }

    /// Add or refresh the position as a witness.
    pub fn record(&mut self, position: Position) {
        if self.touch(position) {
            return;
        }
        if self.capacity == 0 {
            return;
        }
        self.shrink_to(self.capacity - 1);
        let token = self.list.push_back(position);
        self.index.insert(position, token);
    }

    /// Stop tracking the position.
    pub fn forget(&mut self, position: Position) {
        if let Some(token) = self.index.remove(&position) {
            self.list.remove(token);
        }
    }

    /// Forget all witnesses.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    /// Update the capacity, forgetting the oldest witnesses that no longer fit.
    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.shrink_to(capacity);
    }

    /// Count of tracked witnesses.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if no position is tracked.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Maximum count of tracked witnesses.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn shrink_to(&mut self, len: usize) {
        while self.list.len() > len {
            if let Some(position) = self.list.pop_front() {
                self.index.remove(&position);
            }
        }
    }
}
