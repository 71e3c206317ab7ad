use std::cmp;
use std::ptr::NonNull;

pub(crate) type NodePtr<K, V> = NonNull<Node<K, V>>;
pub(crate) type Link<K, V> = Option<NodePtr<K, V>>;

/// Which slot of its parent a node occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Root,
    Left,
    Right,
}

pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
    pub(crate) parent: Link<K, V>,
    pub(crate) side: Side,
    pub(crate) height: usize,
}

impl<K, V> Node<K, V> {
    pub(crate) fn create(parent: Link<K, V>, side: Side, key: K, value: V) -> NodePtr<K, V> {
        let boxed = Box::new(Node {
            key,
            value,
            left: None,
            right: None,
            parent,
            side,
            height: 1,
        });
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    /// Frees a node that is no longer linked into any tree.
    pub(crate) unsafe fn destroy(node_ptr: NodePtr<K, V>) -> (K, V) {
        let boxed = Box::from_raw(node_ptr.as_ptr());
        (boxed.key, boxed.value)
    }
}

// Nodes compare by their pairs, not by identity.
impl<K: PartialEq, V: PartialEq> PartialEq for Node<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

// Link and height reads go through raw field places, never through a
// `&Node`, so `&mut V` handed out by `IterMut` stays valid while we walk.

pub(crate) fn height<K, V>(link: Link<K, V>) -> usize {
    match link {
        None => 0,
        Some(node_ptr) => unsafe { (*node_ptr.as_ptr()).height },
    }
}

pub(crate) fn adjust_height<K, V>(node_ptr: NodePtr<K, V>) {
    unsafe {
        let node = node_ptr.as_ptr();
        (*node).height = 1 + cmp::max(height((*node).left), height((*node).right));
    }
}

/// Height of the right subtree minus height of the left subtree.
pub(crate) fn balance_factor<K, V>(node_ptr: NodePtr<K, V>) -> isize {
    let node = node_ptr.as_ptr();
    unsafe { height((*node).right) as isize - height((*node).left) as isize }
}

pub(crate) fn min_node<K, V>(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
    while let Some(left_ptr) = unsafe { (*node_ptr.as_ptr()).left } {
        node_ptr = left_ptr;
    }
    node_ptr
}

pub(crate) fn max_node<K, V>(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
    while let Some(right_ptr) = unsafe { (*node_ptr.as_ptr()).right } {
        node_ptr = right_ptr;
    }
    node_ptr
}

/// In-order successor, found from node links alone.
pub(crate) fn successor<K, V>(node_ptr: NodePtr<K, V>) -> Link<K, V> {
    unsafe {
        if let Some(right_ptr) = (*node_ptr.as_ptr()).right {
            return Some(min_node(right_ptr));
        }
        // Climb while we are a right child; the first ancestor reached
        // from its left side is the successor.
        let mut current = node_ptr.as_ptr();
        loop {
            match (*current).side {
                Side::Root => return None,
                Side::Left => return (*current).parent,
                Side::Right => current = (*current).parent?.as_ptr(),
            }
        }
    }
}

/// In-order predecessor, found from node links alone.
pub(crate) fn predecessor<K, V>(node_ptr: NodePtr<K, V>) -> Link<K, V> {
    unsafe {
        if let Some(left_ptr) = (*node_ptr.as_ptr()).left {
            return Some(max_node(left_ptr));
        }
        let mut current = node_ptr.as_ptr();
        loop {
            match (*current).side {
                Side::Root => return None,
                Side::Right => return (*current).parent,
                Side::Left => current = (*current).parent?.as_ptr(),
            }
        }
    }
}
