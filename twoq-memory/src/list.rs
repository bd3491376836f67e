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

//! A doubly linked list whose nodes live in a slab, addressed by stable tokens.
//!
//! Tokens stay valid until the node is removed, so an index can map keys to tokens and reorder or unlink nodes in
//! O(1) without touching any raw pointer.

use std::mem;

use twoq_common::strict_assert;

/// Stable handle of a node in a [`SlabList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Token(usize);

struct Node<T> {
    val: T,

    prev: Option<usize>,
    next: Option<usize>,
}

enum Slot<T> {
    Occupied(Node<T>),
    Vacant,
}

/// Slab-backed doubly linked list. The front is the oldest node, the back is the newest.
pub(crate) struct SlabList<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,

    head: Option<usize>,
    tail: Option<usize>,

    len: usize,
}

impl<T> Default for SlabList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlabList<T> {
    /// Create an empty list.
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// The oldest node.
    pub(crate) fn front(&self) -> Option<&T> {
        self.head.map(|index| &self.node(index).val)
    }

    pub(crate) fn get(&self, token: Token) -> Option<&T> {
        match self.slots.get(token.0) {
            Some(Slot::Occupied(node)) => Some(&node.val),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, token: Token) -> Option<&mut T> {
        match self.slots.get_mut(token.0) {
            Some(Slot::Occupied(node)) => Some(&mut node.val),
            _ => None,
        }
    }

    /// Append a node at the back and return its token.
    pub(crate) fn push_back(&mut self, val: T) -> Token {
        let node = Node {
            val,
            prev: None,
            next: None,
        };
        let index = match self.free.pop() {
            Some(index) => {
                strict_assert!(matches!(self.slots[index], Slot::Vacant));
                self.slots[index] = Slot::Occupied(node);
                index
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        };
        self.link_back(index);
        self.len += 1;
        Token(index)
    }

    /// Unlink the oldest node.
    pub(crate) fn pop_front(&mut self) -> Option<T> {
        let index = self.head?;
        self.remove(Token(index))
    }

    /// Unlink the node of the token. Returns `None` if the token does not address a live node.
    pub(crate) fn remove(&mut self, token: Token) -> Option<T> {
        if !matches!(self.slots.get(token.0), Some(Slot::Occupied(_))) {
            return None;
        }
        self.unlink(token.0);
        let slot = mem::replace(&mut self.slots[token.0], Slot::Vacant);
        self.free.push(token.0);
        self.len -= 1;
        match slot {
            Slot::Occupied(node) => Some(node.val),
            Slot::Vacant => unreachable!("slot {} checked occupied", token.0),
        }
    }

    /// Move the node of the token to the back. The token stays valid.
    pub(crate) fn move_to_back(&mut self, token: Token) {
        if !matches!(self.slots.get(token.0), Some(Slot::Occupied(_))) || self.tail == Some(token.0) {
            return;
        }
        self.unlink(token.0);
        self.link_back(token.0);
    }

    /// Drop all nodes. Outstanding tokens become invalid.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterate from front to back.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head,
            list: self,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, index: usize) -> &Node<T> {
        match &self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant => unreachable!("linked slot {index} is vacant"),
        }
    }

    fn node_mut(&mut self, index: usize) -> &mut Node<T> {
        match &mut self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant => unreachable!("linked slot {index} is vacant"),
        }
    }

    fn link_back(&mut self, index: usize) {
        let prev = self.tail;
        {
            let node = self.node_mut(index);
            node.prev = prev;
            node.next = None;
        }
        match prev {
            Some(prev) => self.node_mut(prev).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let node = self.node_mut(index);
            (node.prev.take(), node.next.take())
        };
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }
}

/// Front to back iterator of a [`SlabList`].
pub(crate) struct Iter<'a, T> {
    next: Option<usize>,
    list: &'a SlabList<T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.next?);
        self.next = node.next;
        Some(&node.val)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn dump(list: &SlabList<u64>) -> Vec<u64> {
        list.iter().copied().collect_vec()
    }

    #[test]
    fn test_basic() {
        let mut l = SlabList::new();
        assert_eq!(l.pop_front(), None);
        assert!(l.is_empty());

        l.push_back(1);
        assert_eq!(l.pop_front(), Some(1));

        l.push_back(2);
        l.push_back(3);
        assert_eq!(l.len(), 2);
        assert_eq!(l.front(), Some(&2));
        assert_eq!(l.pop_front(), Some(2));
        assert_eq!(l.pop_front(), Some(3));
        assert_eq!(l.len(), 0);
        assert_eq!(l.pop_front(), None);
        assert_eq!(l.front(), None);
    }

    #[test]
    fn test_move_to_back() {
        let mut l = SlabList::new();
        let tokens = (0..4).map(|i| l.push_back(i)).collect_vec();
        assert_eq!(dump(&l), vec![0, 1, 2, 3]);

        l.move_to_back(tokens[0]);
        assert_eq!(dump(&l), vec![1, 2, 3, 0]);
        l.move_to_back(tokens[2]);
        assert_eq!(dump(&l), vec![1, 3, 0, 2]);
        // Already at the back.
        l.move_to_back(tokens[2]);
        assert_eq!(dump(&l), vec![1, 3, 0, 2]);

        assert_eq!(l.get(tokens[0]), Some(&0));
        assert_eq!(l.front(), Some(&1));
    }

    #[test]
    fn test_remove_and_reuse() {
        let mut l = SlabList::new();
        let tokens = (0..5).map(|i| l.push_back(i)).collect_vec();

        assert_eq!(l.remove(tokens[2]), Some(2));
        assert_eq!(l.remove(tokens[2]), None);
        assert_eq!(l.remove(tokens[0]), Some(0));
        assert_eq!(l.remove(tokens[4]), Some(4));
        assert_eq!(dump(&l), vec![1, 3]);

        let t = l.push_back(5);
        assert!(tokens.contains(&t));
        assert_eq!(dump(&l), vec![1, 3, 5]);

        *l.get_mut(t).unwrap() = 6;
        assert_eq!(dump(&l), vec![1, 3, 6]);

        l.clear();
        assert!(l.is_empty());
        assert_eq!(dump(&l), Vec::<u64>::new());
    }
}
