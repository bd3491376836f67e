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

//! A scan resistant, bounded-memory object cache for storage blocks.
//!
//! [`TwoQueueCache`] admits new objects into an insertion-ordered probationary [`Region`] and promotes the ones
//! that prove reuse into a recency-ordered protected [`Region`]. A payload-free [`WitnessTracker`] remembers the
//! positions seen on probation. Changed objects are written back through an injected
//! [`Writer`](twoq_common::code::Writer) when they are evicted.

mod config;
mod list;
mod prelude;
mod region;
mod statistics;
mod two_queue;
mod witness;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use prelude::*;
