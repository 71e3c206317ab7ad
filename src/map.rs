//! An ordered map implemented with an AVL tree.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{Error, Result};
use crate::node::{self, Link, Node, NodePtr, Side};

mod cursor;
mod dump;
mod iter;

pub use cursor::{Cursor, CursorMut};
pub use iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};

/// An ordered map implemented with an AVL tree.
///
/// Every node keeps a back-pointer to its parent, so cursors and iterators
/// step through the map in key order without an auxiliary stack.
///
/// ```
/// use avlmap::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// map.insert(0, "zero");
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.get(&1), Some(&"one"));
/// map.remove(&1);
/// assert!(map.get(&1).is_none());
/// ```
pub struct AvlTreeMap<K, V, C = NaturalOrder> {
    root: Link<K, V>,
    num_nodes: usize,
    comparator: C,
    marker: PhantomData<Box<Node<K, V>>>,
}

enum Search<K, V> {
    Found(NodePtr<K, V>),
    Vacant(Link<K, V>, Side),
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

// The map exclusively owns its nodes; raw pointers never escape a borrow of the map.
unsafe impl<K: Send, V: Send, C: Send> Send for AvlTreeMap<K, V, C> {}
unsafe impl<K: Sync, V: Sync, C: Sync> Sync for AvlTreeMap<K, V, C> {}

impl<K, V> AvlTreeMap<K, V> {
    /// Creates an empty map ordered by `K`'s [`Ord`] implementation.
    /// No memory is allocated until the first item is inserted.
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Creates a map holding a single entry.
    pub fn from_pair(key: K, value: V) -> Self
    where
        K: Ord,
    {
        let mut map = Self::new();
        map.insert(key, value);
        map
    }
}

impl<K, V, C> AvlTreeMap<K, V, C> {
    /// Creates an empty map ordered by the given comparator.
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            root: None,
            num_nodes: 0,
            comparator,
            marker: PhantomData,
        }
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree, 0 for an empty map.
    pub fn height(&self) -> usize {
        node::height(self.root)
    }

    /// Returns the comparator the map was built with.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        if self.root.is_some() {
            debug!(nodes = self.num_nodes, "clearing map");
        }
        self.postorder(|node_ptr| unsafe {
            Node::destroy(node_ptr);
        });
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns the first key-value pair in the map.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.root.map(|root_ptr| {
            let node = unsafe { &*node::min_node(root_ptr).as_ptr() };
            (&node.key, &node.value)
        })
    }

    /// Returns the last key-value pair in the map.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.root.map(|root_ptr| {
            let node = unsafe { &*node::max_node(root_ptr).as_ptr() };
            (&node.key, &node.value)
        })
    }

    /// Removes and returns the first element in the map.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let node_ptr = node::min_node(self.root?);
        Some(self.remove_node(node_ptr))
    }

    /// Removes and returns the last element in the map.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let node_ptr = node::max_node(self.root?);
        Some(self.remove_node(node_ptr))
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root, self.num_nodes)
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.root, self.num_nodes)
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    /// Returns a cursor on the first element, or the end cursor if the map is empty.
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        Cursor::front(self.root)
    }

    /// Returns a cursor on the last element, or the end cursor if the map is empty.
    pub fn cursor_back(&self) -> Cursor<'_, K, V> {
        Cursor::back(self.root)
    }

    /// Returns a cursor parked before the first element.
    pub fn cursor_start(&self) -> Cursor<'_, K, V> {
        Cursor::start(self.root)
    }

    /// Returns a cursor parked past the last element.
    pub fn cursor_end(&self) -> Cursor<'_, K, V> {
        Cursor::end(self.root)
    }

    /// Returns a mutable cursor on the first element, or the end cursor if the map is empty.
    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, K, V, C> {
        CursorMut::front(self)
    }

    /// Returns a mutable cursor on the last element, or the end cursor if the map is empty.
    pub fn cursor_back_mut(&mut self) -> CursorMut<'_, K, V, C> {
        CursorMut::back(self)
    }

    #[cfg(test)]
    pub(crate) fn root_ptr(&self) -> Link<K, V> {
        self.root
    }

    fn attach(&mut self, parent: Link<K, V>, side: Side, key: K, value: V) -> NodePtr<K, V> {
        let node_ptr = Node::create(parent, side, key, value);
        self.link_child(parent, side, Some(node_ptr));
        self.num_nodes += 1;
        self.rebalance(parent);
        node_ptr
    }

    fn remove_node(&mut self, node_ptr: NodePtr<K, V>) -> (K, V) {
        debug_assert!(self.num_nodes >= 1);
        self.unlink_node(node_ptr);
        self.num_nodes -= 1;
        unsafe { Node::destroy(node_ptr) }
    }

    /// Puts `child` into the `side` slot of `parent` (the root slot if `parent` is `None`)
    /// and points the child's back-reference and side tag at that slot.
    fn link_child(&mut self, parent: Link<K, V>, side: Side, child: Link<K, V>) {
        unsafe {
            match parent {
                None => {
                    debug_assert_eq!(side, Side::Root);
                    self.root = child;
                }
                Some(mut parent_ptr) if side == Side::Left => parent_ptr.as_mut().left = child,
                Some(mut parent_ptr) => {
                    debug_assert_eq!(side, Side::Right);
                    parent_ptr.as_mut().right = child;
                }
            }
            if let Some(mut child_ptr) = child {
                child_ptr.as_mut().parent = parent;
                child_ptr.as_mut().side = side;
            }
        }
    }

    fn unlink_node(&mut self, node_ptr: NodePtr<K, V>) {
        unsafe {
            let parent = node_ptr.as_ref().parent;
            let side = node_ptr.as_ref().side;

            // Check if node to-unlink has right sub tree
            if let Some(right_ptr) = node_ptr.as_ref().right {
                // Smallest node of the right sub tree is the in-order successor
                let min_child_ptr = node::min_node(right_ptr);
                let min_child_parent = min_child_ptr.as_ref().parent;
                debug_assert!(min_child_ptr.as_ref().left.is_none());

                // Close the gap left by the successor with its right sub tree
                let min_child_right = min_child_ptr.as_ref().right;
                self.link_child(min_child_parent, min_child_ptr.as_ref().side, min_child_right);

                // Lift the successor into the place of the node to-unlink
                self.link_child(Some(min_child_ptr), Side::Left, node_ptr.as_ref().left);
                self.link_child(Some(min_child_ptr), Side::Right, node_ptr.as_ref().right);
                self.link_child(parent, side, Some(min_child_ptr));

                // Parent of the successor might be out of balance now
                let rebalance_from = if min_child_parent == Some(node_ptr) {
                    // Successor was the right child and took its parent's place
                    min_child_ptr
                } else {
                    min_child_parent.unwrap_or(min_child_ptr)
                };
                self.rebalance(Some(rebalance_from));
            } else {
                // Node to-unlink is stem or leaf, its left sub tree takes its place
                self.link_child(parent, side, node_ptr.as_ref().left);
                self.rebalance(parent);
            }
        }
    }

    fn rotate_left(&mut self, node_ptr: NodePtr<K, V>) {
        unsafe {
            if let Some(right_ptr) = node_ptr.as_ref().right {
                let parent = node_ptr.as_ref().parent;
                let side = node_ptr.as_ref().side;
                self.link_child(Some(node_ptr), Side::Right, right_ptr.as_ref().left);
                self.link_child(parent, side, Some(right_ptr));
                self.link_child(Some(right_ptr), Side::Left, Some(node_ptr));

                node::adjust_height(node_ptr);
                node::adjust_height(right_ptr);
                trace!(height = right_ptr.as_ref().height, "rotated left");
            }
        }
    }

    fn rotate_right(&mut self, node_ptr: NodePtr<K, V>) {
        unsafe {
            if let Some(left_ptr) = node_ptr.as_ref().left {
                let parent = node_ptr.as_ref().parent;
                let side = node_ptr.as_ref().side;
                self.link_child(Some(node_ptr), Side::Left, left_ptr.as_ref().right);
                self.link_child(parent, side, Some(left_ptr));
                self.link_child(Some(left_ptr), Side::Right, Some(node_ptr));

                node::adjust_height(node_ptr);
                node::adjust_height(left_ptr);
                trace!(height = left_ptr.as_ref().height, "rotated right");
            }
        }
    }

    /// Rebalances nodes starting from given position up to the root node.
    fn rebalance(&mut self, start_from: Link<K, V>) {
        let mut current = start_from;
        while let Some(node_ptr) = current {
            // Captured before rotating: the pivot takes over this parent.
            let parent = unsafe { node_ptr.as_ref().parent };
            self.rebalance_node(node_ptr);
            current = parent;
        }
    }

    /// Adjusts the height of the given node and restores the AVL condition there,
    /// using a double rotation when the heavy child leans the other way.
    fn rebalance_node(&mut self, node_ptr: NodePtr<K, V>) {
        node::adjust_height(node_ptr);
        let balance = node::balance_factor(node_ptr);
        debug_assert!((-2..=2).contains(&balance));
        if balance > 1 {
            // Right heavy
            if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                if node::balance_factor(right_ptr) < 0 {
                    self.rotate_right(right_ptr);
                }
            }
            self.rotate_left(node_ptr);
        } else if balance < -1 {
            // Left heavy
            if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                if node::balance_factor(left_ptr) > 0 {
                    self.rotate_left(left_ptr);
                }
            }
            self.rotate_right(node_ptr);
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn preorder<F: FnMut(NodePtr<K, V>)>(&self, f: F) {
        self.traverse(f, |_| {}, |_| {});
    }

    fn postorder<F: FnMut(NodePtr<K, V>)>(&self, f: F) {
        self.traverse(|_| {}, |_| {}, f);
    }

    fn traverse<Pre, In, Post>(&self, mut preorder: Pre, mut inorder: In, mut postorder: Post)
    where
        Pre: FnMut(NodePtr<K, V>),
        In: FnMut(NodePtr<K, V>),
        Post: FnMut(NodePtr<K, V>),
    {
        if let Some(mut node_ptr) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                match dir {
                    Direction::FromParent => {
                        preorder(node_ptr);
                        if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                            node_ptr = left_ptr;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        inorder(node_ptr);
                        if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                            node_ptr = right_ptr;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        // Post order traversal is used for node deletion,
                        // so make sure not to use node pointer after postorder call.
                        let (parent, side) = unsafe { (node_ptr.as_ref().parent, node_ptr.as_ref().side) };
                        postorder(node_ptr);
                        match parent {
                            None => break,
                            Some(parent_ptr) => {
                                dir = if side == Side::Left {
                                    Direction::FromLeft
                                } else {
                                    Direction::FromRight
                                };
                                node_ptr = parent_ptr;
                            }
                        }
                    }
                }
            }
        }
    }
}

impl<K, V, C: Comparator<K>> AvlTreeMap<K, V, C> {
    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_node(key)
            .map(|node_ptr| &unsafe { &*node_ptr.as_ptr() }.value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.find_node(key)
            .map(|node_ptr| &mut unsafe { &mut *node_ptr.as_ptr() }.value)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find_node(key).map(|node_ptr| {
            let node = unsafe { &*node_ptr.as_ptr() };
            (&node.key, &node.value)
        })
    }

    /// Returns true if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Returns a reference to the value corresponding to the key,
    /// or [`Error::KeyNotFound`] if the key is absent.
    pub fn at(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns a mutable reference to the value corresponding to the key,
    /// or [`Error::KeyNotFound`] if the key is absent.
    pub fn at_mut(&mut self, key: &K) -> Result<&mut V> {
        self.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Returns a cursor on the entry with the given key,
    /// or the end cursor if the key is absent.
    pub fn find(&self, key: &K) -> Cursor<'_, K, V> {
        match self.find_node(key) {
            Some(node_ptr) => Cursor::at(node_ptr),
            None => self.cursor_end(),
        }
    }

    /// Returns a mutable cursor on the entry with the given key,
    /// or the end cursor if the key is absent.
    pub fn find_mut(&mut self, key: &K) -> CursorMut<'_, K, V, C> {
        match self.find_node(key) {
            Some(node_ptr) => CursorMut::at(self, node_ptr),
            None => CursorMut::end(self),
        }
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Returns a cursor on the entry holding `key` and whether a new entry was created.
    /// If the key was already present the map is left untouched and `value` is dropped.
    pub fn insert(&mut self, key: K, value: V) -> (CursorMut<'_, K, V, C>, bool) {
        match self.search(&key) {
            Search::Found(node_ptr) => (CursorMut::at(self, node_ptr), false),
            Search::Vacant(parent, side) => {
                let node_ptr = self.attach(parent, side, key, value);
                (CursorMut::at(self, node_ptr), true)
            }
        }
    }

    /// Returns a mutable reference to the value for `key`,
    /// inserting the value computed by `default` first if the key is absent.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, default: F) -> &mut V {
        let node_ptr = match self.search(&key) {
            Search::Found(node_ptr) => node_ptr,
            Search::Vacant(parent, side) => self.attach(parent, side, key, default()),
        };
        &mut unsafe { &mut *node_ptr.as_ptr() }.value
    }

    /// Returns a mutable reference to the value for `key`,
    /// inserting `V::default()` first if the key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Removes a key from the map.
    /// Returns the value at the key if the key was previously in the map.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map.
    /// Returns the stored key and value if the key was previously in the map.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let node_ptr = self.find_node(key)?;
        let entry = self.remove_node(node_ptr);
        debug_assert!(self.find_node(&entry.0).is_none());
        Some(entry)
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        unsafe {
            // Check root link
            if let Some(root_node_ptr) = self.root {
                assert!(root_node_ptr.as_ref().parent.is_none());
                assert_eq!(root_node_ptr.as_ref().side, Side::Root);
            }

            // Check tree nodes
            let mut num_nodes = 0;
            self.preorder(|node_ptr| {
                let node = node_ptr.as_ref();

                // Check link for left child node
                if let Some(left_ptr) = node.left {
                    assert!(left_ptr.as_ref().parent == Some(node_ptr));
                    assert_eq!(left_ptr.as_ref().side, Side::Left);
                    assert_eq!(
                        self.comparator.compare(&left_ptr.as_ref().key, &node.key),
                        Ordering::Less
                    );
                }

                // Check link for right child node
                if let Some(right_ptr) = node.right {
                    assert!(right_ptr.as_ref().parent == Some(node_ptr));
                    assert_eq!(right_ptr.as_ref().side, Side::Right);
                    assert_eq!(
                        self.comparator.compare(&right_ptr.as_ref().key, &node.key),
                        Ordering::Greater
                    );
                }

                // Check height
                let left_height = node::height(node.left);
                let right_height = node::height(node.right);
                assert_eq!(node.height, 1 + left_height.max(right_height));

                // Check AVL condition (nearly balance)
                assert!(left_height <= right_height + 1);
                assert!(right_height <= left_height + 1);

                num_nodes += 1;
            });

            // Check number of nodes
            assert_eq!(num_nodes, self.num_nodes);

            // Check global ordering, which parent-child checks alone do not cover
            let mut prev: Option<&K> = None;
            for (key, _) in self.iter() {
                if let Some(prev_key) = prev {
                    assert_eq!(self.comparator.compare(prev_key, key), Ordering::Less);
                }
                prev = Some(key);
            }
        }
    }

    fn find_node(&self, key: &K) -> Link<K, V> {
        match self.search(key) {
            Search::Found(node_ptr) => Some(node_ptr),
            Search::Vacant(..) => None,
        }
    }

    /// Descends from the root to the node holding `key`,
    /// or to the empty slot where it would be attached.
    fn search(&self, key: &K) -> Search<K, V> {
        let mut parent: Link<K, V> = None;
        let mut side = Side::Root;
        let mut current = self.root;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            side = match self.comparator.compare(key, &node.key) {
                Ordering::Equal => return Search::Found(node_ptr),
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            parent = current;
            current = if side == Side::Left { node.left } else { node.right };
        }
        Search::Vacant(parent, side)
    }
}

impl<K, V, C> Drop for AvlTreeMap<K, V, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V, C: Default> Default for AvlTreeMap<K, V, C> {
    /// Creates an empty map.
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for AvlTreeMap<K, V, C> {
    /// Makes a deep copy with the same shape; no node is shared with `self`.
    fn clone(&self) -> Self {
        let mut cloned = Self::with_comparator(self.comparator.clone());
        let mut stack: Vec<(NodePtr<K, V>, Link<K, V>, Side)> = Vec::new();
        if let Some(root_ptr) = self.root {
            stack.push((root_ptr, None, Side::Root));
        }
        while let Some((source_ptr, parent, side)) = stack.pop() {
            let source = unsafe { source_ptr.as_ref() };
            let node_ptr = Node::create(parent, side, source.key.clone(), source.value.clone());
            unsafe { (*node_ptr.as_ptr()).height = source.height };
            cloned.link_child(parent, side, Some(node_ptr));
            cloned.num_nodes += 1;
            if let Some(left_ptr) = source.left {
                stack.push((left_ptr, Some(node_ptr), Side::Left));
            }
            if let Some(right_ptr) = source.right {
                stack.push((right_ptr, Some(node_ptr), Side::Right));
            }
        }
        cloned
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for AvlTreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for AvlTreeMap<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for AvlTreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for AvlTreeMap<K, V, C> {
    /// Builds a map by inserting the pairs in order; for repeated keys the first pair wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlTreeMap<K, V> {
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_iter(pairs)
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for AvlTreeMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a AvlTreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut AvlTreeMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, C> IntoIterator for AvlTreeMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, C>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
