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

//! Shared components for the twoq cache: the cached object capability, the writer collaborator, errors, metrics
//! and assertion helpers.

/// Assertion helpers.
pub mod assert;
/// Cached object and writer abstractions.
pub mod code;
/// Error type and helpers.
pub mod error;
/// Metrics model of the cache.
pub mod metrics;
