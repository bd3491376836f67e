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

use serde::{Deserialize, Serialize};

/// Counters of a region or of the whole two-queue cache.
///
/// The counters are plain integers: the cache is driven by a single thread of control at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Lookups via `get` that found the object.
    pub hits: u64,
    /// Lookups via `get` that found nothing.
    pub misses: u64,
    /// Objects admitted by `insert`/`put`.
    pub insertions: u64,
    /// Objects moved from the probationary region to the protected region.
    pub promotions: u64,
    /// Objects discarded by eviction.
    pub evictions: u64,
    /// Successful writebacks of evicted changed objects.
    pub writebacks: u64,
    /// Failed writebacks. Each failure aborted an eviction.
    pub writeback_failures: u64,
}

impl Statistics {
    /// Sum two sets of counters.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
            insertions: self.insertions + other.insertions,
            promotions: self.promotions + other.promotions,
            evictions: self.evictions + other.evictions,
            writebacks: self.writebacks + other.writebacks,
            writeback_failures: self.writeback_failures + other.writeback_failures,
        }
    }

    /// Hit ratio of `get`, or `0.0` if there has been no lookup.
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / lookups as f64
    }
}
