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

use std::borrow::Cow;

use mixtrics::{
    metrics::{BoxedCounter, BoxedGauge, BoxedRegistry},
    registry::noop::NoopMetricsRegistry,
};

/// Metrics of a two-queue cache, registered under the cache name.
///
/// Counters are exported as `twoq_memory_op_total{name, op}`, region usage as `twoq_memory_usage{name, region}` (KB).
#[derive(Debug)]
pub struct Metrics {
    /// Objects admitted into a region, promotions included.
    pub memory_insert: BoxedCounter,
    /// Objects substituted in place.
    pub memory_replace: BoxedCounter,
    /// `get` found the object.
    pub memory_hit: BoxedCounter,
    /// `get` found nothing.
    pub memory_miss: BoxedCounter,
    /// Objects removed explicitly.
    pub memory_remove: BoxedCounter,
    /// Objects moved from the probationary region to the protected region.
    pub memory_promote: BoxedCounter,
    /// Objects discarded by eviction.
    pub memory_evict: BoxedCounter,
    /// Evicted changed objects written back.
    pub memory_writeback: BoxedCounter,
    /// Failed writebacks. Each one aborted an eviction.
    pub memory_writeback_failure: BoxedCounter,

    /// Usage of the protected region.
    pub memory_protected_usage: BoxedGauge,
    /// Usage of the probationary region.
    pub memory_probationary_usage: BoxedGauge,
}

impl Metrics {
    /// Register the metrics of the cache `name` to the registry.
    pub fn new(name: impl Into<Cow<'static, str>>, registry: &BoxedRegistry) -> Self {
        let name = name.into();

        let twoq_memory_op_total = registry.register_counter_vec(
            Cow::Borrowed("twoq_memory_op_total"),
            Cow::Borrowed("twoq in-memory cache operations"),
            &["name", "op"],
        );
        let twoq_memory_usage = registry.register_gauge_vec(
            Cow::Borrowed("twoq_memory_usage"),
            Cow::Borrowed("twoq in-memory cache usage (KB)"),
            &["name", "region"],
        );

        let op = |op: &'static str| twoq_memory_op_total.counter(&[name.clone(), Cow::Borrowed(op)]);
        let usage = |region: &'static str| twoq_memory_usage.gauge(&[name.clone(), Cow::Borrowed(region)]);

        Self {
            memory_insert: op("insert"),
            memory_replace: op("replace"),
            memory_hit: op("hit"),
            memory_miss: op("miss"),
            memory_remove: op("remove"),
            memory_promote: op("promote"),
            memory_evict: op("evict"),
            memory_writeback: op("writeback"),
            memory_writeback_failure: op("writeback_failure"),
            memory_protected_usage: usage("protected"),
            memory_probationary_usage: usage("probationary"),
        }
    }

    /// Metrics that record nothing.
    pub fn noop() -> Self {
        let registry: BoxedRegistry = Box::new(NoopMetricsRegistry);
        Self::new("noop", &registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_metrics() {
        let metrics = Metrics::noop();
        metrics.memory_hit.increase(1);
        metrics.memory_protected_usage.increase(4);
        metrics.memory_protected_usage.decrease(2);
        metrics.memory_probationary_usage.absolute(0);
    }
}
