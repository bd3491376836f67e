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

use std::{fmt::Debug, sync::Arc};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use twoq_common::{
    code::{CachedObject, Position, Writer},
    error::Result,
    metrics::Metrics,
    strict_assert, strict_assert_eq,
};

use crate::{
    list::{SlabList, Token},
    statistics::Statistics,
};

/// Ordering policy of a [`Region`], fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// Recency order. A touching lookup moves the entry to the most-recently-used end.
    Lru,
    /// Insertion order. Lookups never reorder entries.
    Fifo,
}

/// A capacity-bounded ordered collection of cached objects keyed by position.
///
/// The front of the region is the next eviction victim: the least recently used entry for [`Order::Lru`], the
/// oldest inserted entry for [`Order::Fifo`].
///
/// Changed objects are written back through the writer before they are discarded by eviction. Explicit removal,
/// replacement and [`Region::clear`] never write back.
pub struct Region<T>
where
    T: CachedObject,
{
    order: Order,

    list: SlabList<T>,
    index: HashMap<Position, Token>,

    usage: usize,
    capacity: usize,

    writer: Arc<dyn Writer<T>>,

    statistics: Statistics,
    metrics: Arc<Metrics>,
}

impl<T> Debug for Region<T>
where
    T: CachedObject,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("order", &self.order)
            .field("len", &self.list.len())
            .field("usage", &self.usage)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> Region<T>
where
    T: CachedObject,
{
    /// Create an empty region with the given ordering policy, capacity (KB) and writer.
    pub fn new(order: Order, capacity: usize, writer: Arc<dyn Writer<T>>) -> Self {
        Self {
            order,
            list: SlabList::new(),
            index: HashMap::new(),
            usage: 0,
            capacity,
            writer,
            statistics: Statistics::default(),
            metrics: Arc::new(Metrics::noop()),
        }
    }

    /// Report operations and usage through the metrics. [`Order::Lru`] regions report the protected usage,
    /// [`Order::Fifo`] regions the probationary usage.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self.report_usage();
        self
    }

    /// Get the object without altering the order.
    pub fn find(&self, position: Position) -> Option<&T> {
        let token = *self.index.get(&position)?;
        self.list.get(token)
    }

    /// Returns `true` if the region holds the position.
    pub fn contains(&self, position: Position) -> bool {
        self.index.contains_key(&position)
    }

    /// Get the object, moving it to the most-recently-used end if the region is [`Order::Lru`].
    pub fn touch_and_get(&mut self, position: Position) -> Option<&T> {
        let token = *self.index.get(&position)?;
        if self.order == Order::Lru {
            self.list.move_to_back(token);
        }
        self.list.get(token)
    }

    /// Insert the object at the most recent end, then evict from the front until the usage fits the capacity or
    /// only the inserted object is left.
    ///
    /// A resident object with the same position is dropped first without writeback.
    ///
    /// If the writeback of a victim fails, the victim stays resident and counted, evictions finished before it stay
    /// finished, and the error is returned. The inserted object stays resident either way.
    pub fn insert(&mut self, object: T) -> Result<()> {
        let position = object.position();

        if let Some(stale) = self.remove(position) {
            tracing::trace!(
                "[region]: drop stale object (position: {}) on re-insertion, order: {:?}",
                stale.position(),
                self.order
            );
        }

        self.usage += object.memory_cost();
        let token = self.list.push_back(object);
        self.index.insert(position, token);
        strict_assert_eq!(self.index.len(), self.list.len());
        self.statistics.insertions += 1;
        self.metrics.memory_insert.increase(1);
        self.report_usage();

        self.evict(self.capacity)
    }

    /// Remove the object without writeback. Returns the object if it was present.
    pub fn remove(&mut self, position: Position) -> Option<T> {
        let token = self.index.remove(&position)?;
        let object = self.list.remove(token);
        strict_assert!(object.is_some());
        if let Some(object) = object.as_ref() {
            self.usage -= object.memory_cost();
            self.report_usage();
        }
        object
    }

    /// Substitute the object of a resident position in place, keeping its place in the eviction order.
    ///
    /// Returns the previous object, or `None` without inserting anything if the position is not resident.
    ///
    /// An object whose own position differs from `position` is rejected: it is dropped, the resident object stays
    /// and `None` is returned.
    ///
    /// A replacement with a larger memory cost is not followed by an eviction: the usage catches up with the
    /// capacity on the next [`Region::insert`] or [`Region::set_capacity`].
    pub fn replace(&mut self, position: Position, object: T) -> Option<T> {
        if object.position() != position {
            tracing::warn!(
                "[region]: reject replacement of position {} with an object of position {}",
                position,
                object.position()
            );
            return None;
        }

        let token = *self.index.get(&position)?;
        let slot = self.list.get_mut(token)?;
        let cost = object.memory_cost();
        let old = std::mem::replace(slot, object);
        self.usage = self.usage - old.memory_cost() + cost;
        self.metrics.memory_replace.increase(1);
        self.report_usage();
        Some(old)
    }

    /// All resident changed objects, in eviction order. Nothing is removed.
    pub fn drain_changed(&self) -> Vec<&T> {
        self.list.iter().filter(|object| object.is_changed()).collect()
    }

    /// Total memory cost of the resident objects (KB).
    pub fn memory_used(&self) -> usize {
        self.usage
    }

    /// Capacity of the region (KB).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Update the capacity and evict until the usage fits it.
    ///
    /// Writeback failures are handled as in [`Region::insert`]; the new capacity is kept.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        tracing::debug!(
            "[region]: resize {:?} region, capacity: {} => {}, usage: {}",
            self.order,
            self.capacity,
            capacity,
            self.usage
        );
        self.capacity = capacity;
        self.evict(capacity)
    }

    /// Drop all objects without writeback.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
        self.usage = 0;
        self.report_usage();
    }

    /// Ordering policy of the region.
    pub fn order(&self) -> Order {
        self.order
    }

    /// Count of resident objects.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the region holds no object.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Iterate the resident objects in eviction order, next victim first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.list.iter()
    }

    /// Counters of the region.
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    fn report_usage(&self) {
        let gauge = match self.order {
            Order::Lru => &self.metrics.memory_protected_usage,
            Order::Fifo => &self.metrics.memory_probationary_usage,
        };
        gauge.absolute(self.usage as _);
    }

    fn evict(&mut self, target: usize) -> Result<()> {
        while self.usage > target && self.list.len() > 1 {
            let Some(victim) = self.list.front() else {
                break;
            };
            let position = victim.position();

            if victim.is_changed() {
                if let Err(e) = self.writer.write_back(victim) {
                    self.statistics.writeback_failures += 1;
                    self.metrics.memory_writeback_failure.increase(1);
                    tracing::warn!(
                        "[region]: write back evicted object (position: {}) failed, keep it resident: {}",
                        position,
                        e
                    );
                    return Err(e.with_context("position", position));
                }
                self.statistics.writebacks += 1;
                self.metrics.memory_writeback.increase(1);
            }

            // The index is keyed by the position reported on insertion.
            let Some(victim) = self.remove(position) else {
                tracing::error!("[region]: front object (position: {}) is not indexed, stop eviction", position);
                break;
            };
            self.statistics.evictions += 1;
            self.metrics.memory_evict.increase(1);
            tracing::debug!(
                "[region]: evict object (position: {}, cost: {}) from {:?} region, usage: {}, capacity: {}",
                position,
                victim.memory_cost(),
                self.order,
                self.usage,
                self.capacity
            );
        }
        Ok(())
    }
}
