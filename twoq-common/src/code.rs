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

use std::sync::Arc;

use crate::error::Result;

/// Position of a cached object, analogous to a storage block address.
pub type Position = u64;

/// The capability a value must provide to be held by the cache.
///
/// The position is the identity of the object. Two objects with the same position are considered the same object
/// with possibly different states.
pub trait CachedObject: Send + Sync + 'static {
    /// Stable key of the object.
    fn position(&self) -> Position;

    /// Memory cost of the object, in the same unit as the cache budget (KB).
    fn memory_cost(&self) -> usize;

    /// Large or sequential payload. Stream objects never enter the protected region.
    fn is_stream(&self) -> bool {
        false
    }

    /// Dirty bit. A changed object must be written back before it is discarded by eviction.
    fn is_changed(&self) -> bool;
}

impl<T> CachedObject for Arc<T>
where
    T: CachedObject,
{
    fn position(&self) -> Position {
        self.as_ref().position()
    }

    fn memory_cost(&self) -> usize {
        self.as_ref().memory_cost()
    }

    fn is_stream(&self) -> bool {
        self.as_ref().is_stream()
    }

    fn is_changed(&self) -> bool {
        self.as_ref().is_changed()
    }
}

impl<T> CachedObject for Box<T>
where
    T: CachedObject,
{
    fn position(&self) -> Position {
        self.as_ref().position()
    }

    fn memory_cost(&self) -> usize {
        self.as_ref().memory_cost()
    }

    fn is_stream(&self) -> bool {
        self.as_ref().is_stream()
    }

    fn is_changed(&self) -> bool {
        self.as_ref().is_changed()
    }
}

/// The persistence collaborator invoked when a dirty object is evicted.
///
/// `write_back` is called synchronously, exactly once per evicted changed object, before the object leaves the
/// cache bookkeeping. It may block on I/O.
///
/// The writer must not call back into the cache instance that invoked it.
pub trait Writer<T>: Send + Sync + 'static
where
    T: CachedObject,
{
    /// Persist the state of the object.
    ///
    /// Returning an error aborts the eviction and keeps the object resident.
    fn write_back(&self, object: &T) -> Result<()>;
}

impl<T, F> Writer<T> for F
where
    T: CachedObject,
    F: Fn(&T) -> Result<()> + Send + Sync + 'static,
{
    fn write_back(&self, object: &T) -> Result<()> {
        self(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Page {
        pos: Position,
        dirty: bool,
    }

    impl CachedObject for Page {
        fn position(&self) -> Position {
            self.pos
        }

        fn memory_cost(&self) -> usize {
            4
        }

        fn is_changed(&self) -> bool {
            self.dirty
        }
    }

    #[test]
    fn test_shared_object_delegates() {
        let page = Arc::new(Page { pos: 7, dirty: true });
        assert_eq!(page.position(), 7);
        assert_eq!(page.memory_cost(), 4);
        assert!(!page.is_stream());
        assert!(page.is_changed());

        let page = Box::new(Page { pos: 8, dirty: false });
        assert_eq!(CachedObject::position(&page), 8);
        assert!(!page.is_changed());
    }

    #[test]
    fn test_closure_writer() {
        let writer: Arc<dyn Writer<Page>> = Arc::new(|page: &Page| {
            assert_eq!(page.pos, 3);
            Ok(())
        });
        writer.write_back(&Page { pos: 3, dirty: true }).unwrap();
    }
}
