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

use std::{borrow::Cow, fmt::Debug, sync::Arc};

use mixtrics::{metrics::BoxedRegistry, registry::noop::NoopMetricsRegistry};
use twoq_common::{
    code::{CachedObject, Position, Writer},
    error::Result,
    metrics::Metrics,
    strict_assert,
};

use crate::{
    config::{TwoQueueConfig, WitnessCapacity},
    region::{Order, Region},
    statistics::Statistics,
    witness::WitnessTracker,
};

/// Builder for [`TwoQueueCache`].
#[derive(Debug)]
pub struct TwoQueueCacheBuilder {
    name: Cow<'static, str>,
    config: TwoQueueConfig,
    registry: BoxedRegistry,
}

impl TwoQueueCacheBuilder {
    /// Start building a cache with the given total budget (KB).
    pub fn new(budget_kb: usize) -> Self {
        Self::with_config(TwoQueueConfig {
            budget_kb,
            ..Default::default()
        })
    }

    /// Start building from an existing config.
    pub fn with_config(config: TwoQueueConfig) -> Self {
        Self {
            name: Cow::Borrowed("twoq"),
            config,
            registry: Box::new(NoopMetricsRegistry),
        }
    }

    /// Set the name of the cache, used as the `name` label of its metrics.
    ///
    /// Default: `twoq`.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the metrics registry the cache reports to.
    ///
    /// Default: [`NoopMetricsRegistry`].
    pub fn with_metrics_registry(mut self, registry: BoxedRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the share of the budget given to the protected region.
    ///
    /// Default: `0.8`.
    pub fn with_protected_ratio(mut self, protected_ratio: f64) -> Self {
        self.config.protected_ratio = protected_ratio;
        self
    }

    /// Set the sizing policy of the witness tracker.
    ///
    /// Default: [`WitnessCapacity::PerKb(4)`](WitnessCapacity::PerKb).
    pub fn with_witness_capacity(mut self, witness_capacity: WitnessCapacity) -> Self {
        self.config.witness_capacity = witness_capacity;
        self
    }

    /// Build the cache with the writer used to persist evicted changed objects.
    pub fn build<T>(self, writer: Arc<dyn Writer<T>>) -> Result<TwoQueueCache<T>>
    where
        T: CachedObject,
    {
        self.config.validate()?;
        let metrics = Arc::new(Metrics::new(self.name, &self.registry));
        Ok(TwoQueueCache::with_valid_config(self.config, writer, metrics))
    }
}

/// A scan resistant object cache made of two regions.
///
/// New objects enter the insertion-ordered probationary region. An object that is looked up again after a
/// different position was touched, or that is re-admitted while its position is still remembered by the witness
/// tracker, moves to the recency-ordered protected region. Stream objects never leave the probationary region.
///
/// All operations run on the calling thread. Mutating operations take `&mut self`; wrap the cache in a lock to
/// share it.
pub struct TwoQueueCache<T>
where
    T: CachedObject,
{
    config: TwoQueueConfig,

    protected: Region<T>,
    probationary: Region<T>,
    witness: WitnessTracker,

    /// Width-1 access history that keeps an immediate repeat of the same lookup from promoting.
    last_touched: Option<Position>,

    statistics: Statistics,
    metrics: Arc<Metrics>,
}

impl<T> Debug for TwoQueueCache<T>
where
    T: CachedObject,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoQueueCache")
            .field("config", &self.config)
            .field("protected", &self.protected)
            .field("probationary", &self.probationary)
            .field("witness", &self.witness)
            .field("last_touched", &self.last_touched)
            .finish()
    }
}

impl<T> TwoQueueCache<T>
where
    T: CachedObject,
{
    /// Create a cache from the config. Metrics are not reported, use [`TwoQueueCacheBuilder`] to report them.
    pub fn new(config: TwoQueueConfig, writer: Arc<dyn Writer<T>>) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config, writer, Arc::new(Metrics::noop())))
    }

    /// Create a cache with the default split and witness policy.
    pub fn with_budget(budget_kb: usize, writer: Arc<dyn Writer<T>>) -> Self {
        let config = TwoQueueConfig {
            budget_kb,
            ..Default::default()
        };
        Self::with_valid_config(config, writer, Arc::new(Metrics::noop()))
    }

    fn with_valid_config(config: TwoQueueConfig, writer: Arc<dyn Writer<T>>, metrics: Arc<Metrics>) -> Self {
        let budget = config.budget_kb;
        let protected =
            Region::new(Order::Lru, config.protected_capacity(budget), writer.clone()).with_metrics(metrics.clone());
        let probationary =
            Region::new(Order::Fifo, config.probationary_capacity(budget), writer).with_metrics(metrics.clone());
        let witness = WitnessTracker::new(config.witness_capacity.entries(budget));

        tracing::debug!(
            "[two queue]: create cache, budget: {} KB, protected: {} KB, probationary: {} KB, witnesses: {}",
            budget,
            protected.capacity(),
            probationary.capacity(),
            witness.capacity()
        );

        Self {
            config,
            protected,
            probationary,
            witness,
            last_touched: None,
            statistics: Statistics::default(),
            metrics,
        }
    }

    /// Get the object without any side effect.
    pub fn find(&self, position: Position) -> Option<&T> {
        self.protected
            .find(position)
            .or_else(|| self.probationary.find(position))
    }

    /// Returns `true` if either region holds the position.
    pub fn contains(&self, position: Position) -> bool {
        self.protected.contains(position) || self.probationary.contains(position)
    }

    /// Get the object and update the promotion state.
    ///
    /// A hit in the protected region refreshes its recency. A hit on a non-stream object in the probationary region
    /// either records a first sighting, or promotes the object if its position was already seen and the previous
    /// touch was on another position.
    ///
    /// Fails only if the promotion evicts a changed object from the protected region and its writeback fails. The
    /// promoted object is resident in the protected region even then.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "twoq::memory::two_queue::get"))]
    pub fn get(&mut self, position: Position) -> Result<Option<&T>> {
        if self.protected.contains(position) {
            self.statistics.hits += 1;
            self.metrics.memory_hit.increase(1);
            return Ok(self.protected.touch_and_get(position));
        }

        let is_stream = match self.probationary.find(position) {
            Some(object) => object.is_stream(),
            None => {
                self.statistics.misses += 1;
                self.metrics.memory_miss.increase(1);
                return Ok(None);
            }
        };
        self.statistics.hits += 1;
        self.metrics.memory_hit.increase(1);

        if !is_stream {
            let repeated = self.last_touched == Some(position);
            self.last_touched = Some(position);

            if !self.witness.touch(position) {
                self.witness.record(position);
            } else if !repeated {
                self.promote(position)?;
            }
        }

        Ok(self.find(position))
    }

    /// Admit the object.
    ///
    /// Stream objects always go to the probationary region. Objects whose position is remembered by the witness
    /// tracker go straight to the protected region. Other objects go to the probationary region and become the last
    /// touched position.
    ///
    /// A resident copy of the same position is dropped without writeback, so a failed `put` can be retried.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "twoq::memory::two_queue::put"))]
    pub fn put(&mut self, object: T) -> Result<()> {
        let position = object.position();

        if object.is_stream() {
            self.protected.remove(position);
            tracing::trace!("[two queue]: admit stream object (position: {}) on probation", position);
            self.probationary.insert(object)
        } else if self.witness.touch(position) {
            self.probationary.remove(position);
            tracing::trace!("[two queue]: admit witnessed object (position: {}) as protected", position);
            self.protected.insert(object)
        } else {
            self.protected.remove(position);
            self.last_touched = Some(position);
            tracing::trace!("[two queue]: admit object (position: {}) on probation", position);
            self.probationary.insert(object)
        }
    }

    /// Remove the object and its witness without writeback. Returns the object if it was resident.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "twoq::memory::two_queue::remove"))]
    pub fn remove(&mut self, position: Position) -> Option<T> {
        let removed = match self.protected.remove(position) {
            Some(object) => Some(object),
            None => self.probationary.remove(position),
        };
        if removed.is_some() {
            self.metrics.memory_remove.increase(1);
        }
        self.witness.forget(position);
        removed
    }

    /// Substitute the object of a resident position in place, keeping its region and its place in the eviction
    /// order. Returns the previous object, or `None` without admitting anything if the position is not resident.
    pub fn replace(&mut self, position: Position, object: T) -> Option<T> {
        if self.protected.contains(position) {
            self.protected.replace(position, object)
        } else {
            self.probationary.replace(position, object)
        }
    }

    /// All resident changed objects of both regions, protected region first. Nothing is removed.
    pub fn drain_changed(&self) -> Vec<&T> {
        let mut changed = self.protected.drain_changed();
        changed.extend(self.probationary.drain_changed());
        changed
    }

    /// Total memory cost of the resident objects (KB).
    pub fn memory_used(&self) -> usize {
        self.protected.memory_used() + self.probationary.memory_used()
    }

    /// Total memory budget (KB).
    pub fn budget(&self) -> usize {
        self.config.budget_kb
    }

    /// Change the total budget, re-deriving the split and the witness capacity.
    ///
    /// Each region takes its new capacity and evicts until it fits, the protected region first. A writeback failure
    /// in the protected region does not stop the probationary region from being resized. The new budget is kept, the
    /// failed object stays resident and the first error is returned. The call can be retried.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "twoq::memory::two_queue::set_budget"))]
    pub fn set_budget(&mut self, budget_kb: usize) -> Result<()> {
        tracing::debug!(
            "[two queue]: set budget {} KB => {} KB, usage: {} KB",
            self.config.budget_kb,
            budget_kb,
            self.memory_used()
        );
        self.config.budget_kb = budget_kb;
        self.witness.resize(self.config.witness_capacity.entries(budget_kb));
        let protected = self.protected.set_capacity(self.config.protected_capacity(budget_kb));
        let probationary = self
            .probationary
            .set_capacity(self.config.probationary_capacity(budget_kb));
        protected.and(probationary)
    }

    /// Drop all objects and witnesses without writeback, and reset the access history.
    pub fn clear(&mut self) {
        self.protected.clear();
        self.probationary.clear();
        self.witness.clear();
        self.last_touched = None;
    }

    /// Count of resident objects.
    pub fn len(&self) -> usize {
        self.protected.len() + self.probationary.len()
    }

    /// Returns `true` if no object is resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The recency-ordered region of proven objects.
    pub fn protected(&self) -> &Region<T> {
        &self.protected
    }

    /// The insertion-ordered region of newly admitted objects.
    pub fn probationary(&self) -> &Region<T> {
        &self.probationary
    }

    /// The witness tracker.
    pub fn witness(&self) -> &WitnessTracker {
        &self.witness
    }

    /// Metrics the cache reports to.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Counters of the cache and both regions.
    pub fn statistics(&self) -> Statistics {
        self.statistics
            .merge(self.protected.statistics())
            .merge(self.probationary.statistics())
    }

    fn promote(&mut self, position: Position) -> Result<()> {
        let Some(object) = self.probationary.remove(position) else {
            return Ok(());
        };
        strict_assert!(!object.is_stream());

        tracing::trace!("[two queue]: promote object (position: {}) to protected", position);
        self.statistics.promotions += 1;
        self.metrics.memory_promote.increase(1);
        self.protected.insert(object)
    }
}
