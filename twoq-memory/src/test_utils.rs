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

//! Utilities for testing.

use std::sync::Arc;

use hashbrown::HashSet;
use parking_lot::Mutex;
use twoq_common::{
    code::{CachedObject, Position, Writer},
    error::{Error, Result},
};

/// A cached object for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestObject {
    /// Position.
    pub position: Position,
    /// Memory cost in KB.
    pub cost: usize,
    /// Stream flag.
    pub stream: bool,
    /// Dirty flag.
    pub changed: bool,
    /// Payload version, used to tell replaced objects apart.
    pub version: u64,
}

impl TestObject {
    /// A clean, non-stream object.
    pub fn new(position: Position, cost: usize) -> Self {
        Self {
            position,
            cost,
            stream: false,
            changed: false,
            version: 0,
        }
    }

    /// Mark the object dirty.
    pub fn changed(mut self) -> Self {
        self.changed = true;
        self
    }

    /// Mark the object as a stream.
    pub fn stream(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Set the payload version.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}

impl CachedObject for TestObject {
    fn position(&self) -> Position {
        self.position
    }

    fn memory_cost(&self) -> usize {
        self.cost
    }

    fn is_stream(&self) -> bool {
        self.stream
    }

    fn is_changed(&self) -> bool {
        self.changed
    }
}

/// A writer that records the positions of all written back objects.
///
/// Positions registered with [`RecordingWriter::fail_on`] make the writeback fail until recovered.
#[derive(Debug, Clone, Default)]
pub struct RecordingWriter {
    written: Arc<Mutex<Vec<Position>>>,
    failing: Arc<Mutex<HashSet<Position>>>,
}

impl RecordingWriter {
    /// Positions written back so far, in call order.
    pub fn written(&self) -> Vec<Position> {
        self.written.lock().clone()
    }

    /// Make the writeback of the position fail.
    pub fn fail_on(&self, position: Position) {
        self.failing.lock().insert(position);
    }

    /// Make the writeback of the position succeed again.
    pub fn recover(&self, position: Position) {
        self.failing.lock().remove(&position);
    }
}

impl Writer<TestObject> for RecordingWriter {
    fn write_back(&self, object: &TestObject) -> Result<()> {
        if self.failing.lock().contains(&object.position) {
            return Err(Error::writeback(std::io::Error::other("injected writeback failure")));
        }
        self.written.lock().push(object.position);
        Ok(())
    }
}
