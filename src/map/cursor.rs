//! Bidirectional cursors over an [`AvlTreeMap`].
//!
//! A cursor rests on a live entry or on one of two sentinels: `start`, before
//! the first entry, and `end`, past the last one. There is no header node,
//! so a sentinel cursor keeps the boundary node it parked at (the minimum
//! for `start`, the maximum for `end`) together with a flag.
//!
//! Walking forward goes `start -> first -> ... -> last -> end`, walking
//! backward the reverse. Stepping past a sentinel leaves the cursor where it is.

use std::fmt;
use std::marker::PhantomData;

use tracing::trace;

use super::AvlTreeMap;
use crate::node::{self, Link, NodePtr};

struct Position<K, V> {
    node: Link<K, V>,
    start: bool,
    end: bool,
}

impl<K, V> Clone for Position<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Position<K, V> {}

// Same node and same `end` flag: tells the end sentinel apart from the maximum node.
impl<K, V> PartialEq for Position<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.end == other.end
    }
}

impl<K, V> Position<K, V> {
    fn at(node_ptr: NodePtr<K, V>) -> Self {
        Self {
            node: Some(node_ptr),
            start: false,
            end: false,
        }
    }

    fn front(root: Link<K, V>) -> Self {
        match root {
            Some(root_ptr) => Self::at(node::min_node(root_ptr)),
            None => Self::end(None),
        }
    }

    fn back(root: Link<K, V>) -> Self {
        match root {
            Some(root_ptr) => Self::at(node::max_node(root_ptr)),
            None => Self::end(None),
        }
    }

    fn start(root: Link<K, V>) -> Self {
        Self {
            node: root.map(node::min_node),
            start: true,
            end: false,
        }
    }

    fn end(root: Link<K, V>) -> Self {
        Self {
            node: root.map(node::max_node),
            start: false,
            end: true,
        }
    }

    fn live(&self) -> Link<K, V> {
        if self.start || self.end {
            None
        } else {
            self.node
        }
    }

    fn advance(&mut self) {
        if self.end {
            return;
        }
        if self.start {
            self.start = false;
            // An empty map has nothing between its sentinels
            self.end = self.node.is_none();
            return;
        }
        if let Some(node_ptr) = self.node {
            match node::successor(node_ptr) {
                Some(next_ptr) => self.node = Some(next_ptr),
                None => self.end = true,
            }
        }
    }

    fn retreat(&mut self) {
        if self.start {
            return;
        }
        if self.end {
            self.end = false;
            self.start = self.node.is_none();
            return;
        }
        if let Some(node_ptr) = self.node {
            match node::predecessor(node_ptr) {
                Some(prev_ptr) => self.node = Some(prev_ptr),
                None => self.start = true,
            }
        }
    }

    fn entry<'a>(&self) -> Option<(&'a K, &'a V)> {
        self.live().map(|node_ptr| {
            let node = unsafe { &*node_ptr.as_ptr() };
            (&node.key, &node.value)
        })
    }

    fn entry_mut<'a>(&self) -> Option<(&'a K, &'a mut V)> {
        self.live().map(|node_ptr| {
            let node = node_ptr.as_ptr();
            unsafe { (&(*node).key, &mut (*node).value) }
        })
    }

    fn fmt_with(&self, name: &str, f: &mut fmt::Formatter) -> fmt::Result
    where
        K: fmt::Debug,
        V: fmt::Debug,
    {
        if self.start {
            write!(f, "{}(start)", name)
        } else if self.end {
            write!(f, "{}(end)", name)
        } else {
            f.debug_tuple(name).field(&self.entry()).finish()
        }
    }
}

/// A read-only cursor over the entries of an [`AvlTreeMap`].
///
/// Two cursors are equal when they rest on the same node and agree on
/// whether they are the end sentinel. The start sentinel parks on the
/// first entry, so on a non-empty map `cursor_start() == cursor_front()`
/// even though only the latter yields an entry. Walk backward with
/// `while !cursor.is_start()` rather than comparing against `cursor_start()`.
pub struct Cursor<'a, K, V> {
    position: Position<K, V>,
    marker: PhantomData<&'a (K, V)>,
}

unsafe impl<K: Sync, V: Sync> Send for Cursor<'_, K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for Cursor<'_, K, V> {}

impl<'a, K, V> Cursor<'a, K, V> {
    fn new(position: Position<K, V>) -> Self {
        Self {
            position,
            marker: PhantomData,
        }
    }

    pub(super) fn at(node_ptr: NodePtr<K, V>) -> Self {
        Self::new(Position::at(node_ptr))
    }

    pub(super) fn front(root: Link<K, V>) -> Self {
        Self::new(Position::front(root))
    }

    pub(super) fn back(root: Link<K, V>) -> Self {
        Self::new(Position::back(root))
    }

    pub(super) fn start(root: Link<K, V>) -> Self {
        Self::new(Position::start(root))
    }

    pub(super) fn end(root: Link<K, V>) -> Self {
        Self::new(Position::end(root))
    }

    /// Returns the entry under the cursor, or `None` on a sentinel.
    pub fn get(&self) -> Option<(&'a K, &'a V)> {
        self.position.entry()
    }

    /// Returns the key under the cursor, or `None` on a sentinel.
    pub fn key(&self) -> Option<&'a K> {
        self.get().map(|(key, _)| key)
    }

    /// Returns the value under the cursor, or `None` on a sentinel.
    pub fn value(&self) -> Option<&'a V> {
        self.get().map(|(_, value)| value)
    }

    /// Moves to the in-order successor, or onto the end sentinel after the last entry.
    pub fn move_next(&mut self) {
        self.position.advance();
    }

    /// Moves to the in-order predecessor, or onto the start sentinel before the first entry.
    pub fn move_prev(&mut self) {
        self.position.retreat();
    }

    /// Returns true if the cursor is parked before the first entry.
    pub fn is_start(&self) -> bool {
        self.position.start
    }

    /// Returns true if the cursor is parked past the last entry.
    pub fn is_end(&self) -> bool {
        self.position.end
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.position.fmt_with("Cursor", f)
    }
}

/// A cursor over an [`AvlTreeMap`] that can edit values and remove entries.
pub struct CursorMut<'a, K, V, C> {
    map: &'a mut AvlTreeMap<K, V, C>,
    position: Position<K, V>,
}

unsafe impl<K: Send, V: Send, C: Send> Send for CursorMut<'_, K, V, C> {}
unsafe impl<K: Sync, V: Sync, C: Sync> Sync for CursorMut<'_, K, V, C> {}

impl<'a, K, V, C> CursorMut<'a, K, V, C> {
    pub(super) fn at(map: &'a mut AvlTreeMap<K, V, C>, node_ptr: NodePtr<K, V>) -> Self {
        Self {
            map,
            position: Position::at(node_ptr),
        }
    }

    pub(super) fn front(map: &'a mut AvlTreeMap<K, V, C>) -> Self {
        let position = Position::front(map.root);
        Self { map, position }
    }

    pub(super) fn back(map: &'a mut AvlTreeMap<K, V, C>) -> Self {
        let position = Position::back(map.root);
        Self { map, position }
    }

    pub(super) fn end(map: &'a mut AvlTreeMap<K, V, C>) -> Self {
        let position = Position::end(map.root);
        Self { map, position }
    }

    /// Returns the entry under the cursor, or `None` on a sentinel.
    pub fn get(&self) -> Option<(&K, &V)> {
        self.position.entry()
    }

    /// Returns the entry under the cursor with a mutable value, or `None` on a sentinel.
    pub fn get_mut(&mut self) -> Option<(&K, &mut V)> {
        self.position.entry_mut()
    }

    /// Returns the key under the cursor, or `None` on a sentinel.
    pub fn key(&self) -> Option<&K> {
        self.get().map(|(key, _)| key)
    }

    /// Returns the value under the cursor, or `None` on a sentinel.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.get_mut().map(|(_, value)| value)
    }

    /// Converts the cursor into a mutable reference to the value under it,
    /// borrowed for as long as the map was.
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        self.position.entry_mut().map(|(_, value)| value)
    }

    /// Moves to the in-order successor, or onto the end sentinel after the last entry.
    pub fn move_next(&mut self) {
        self.position.advance();
    }

    /// Moves to the in-order predecessor, or onto the start sentinel before the first entry.
    pub fn move_prev(&mut self) {
        self.position.retreat();
    }

    /// Returns true if the cursor is parked before the first entry.
    pub fn is_start(&self) -> bool {
        self.position.start
    }

    /// Returns true if the cursor is parked past the last entry.
    pub fn is_end(&self) -> bool {
        self.position.end
    }

    /// Returns a read-only cursor at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.position)
    }

    /// Removes the entry under the cursor and moves the cursor to its successor
    /// (the end sentinel if it was the last entry).
    ///
    /// Returns `None` and does nothing if the cursor is on a sentinel.
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        let node_ptr = self.position.live()?;

        // The successor must be taken before the node is freed.
        let mut next = self.position;
        next.advance();

        let entry = self.map.remove_node(node_ptr);
        if next.end {
            // The parked maximum may have been the removed node
            next = Position::end(self.map.root);
        }
        self.position = next;
        trace!(remaining = self.map.len(), "removed entry under cursor");
        Some(entry)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for CursorMut<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.position.fmt_with("CursorMut", f)
    }
}
