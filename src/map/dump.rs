use std::fmt::{self, Write};

use super::AvlTreeMap;
use crate::node::NodePtr;

impl<K: fmt::Display, V: fmt::Display, C> AvlTreeMap<K, V, C> {
    /// Writes the tree shape to `out`, one `key : value` line per node.
    ///
    /// Nodes are visited in pre-order, right subtree before left subtree,
    /// each line indented by one tab per level of depth. Read sideways, the
    /// output shows the tree with its root on the left.
    ///
    /// ```
    /// use avlmap::AvlTreeMap;
    /// let map = AvlTreeMap::from([(2, "b"), (1, "a"), (3, "c")]);
    /// let mut out = String::new();
    /// map.dump(&mut out).unwrap();
    /// assert_eq!(out, "2 : b\n\t3 : c\n\t1 : a\n");
    /// ```
    pub fn dump<W: Write>(&self, out: &mut W) -> fmt::Result {
        let mut stack: Vec<(NodePtr<K, V>, usize)> = Vec::new();
        if let Some(root_ptr) = self.root {
            stack.push((root_ptr, 0));
        }
        while let Some((node_ptr, depth)) = stack.pop() {
            let node = unsafe { node_ptr.as_ref() };
            for _ in 0..depth {
                out.write_char('\t')?;
            }
            writeln!(out, "{} : {}", node.key, node.value)?;
            // Pushed last, popped first
            if let Some(left_ptr) = node.left {
                stack.push((left_ptr, depth + 1));
            }
            if let Some(right_ptr) = node.right {
                stack.push((right_ptr, depth + 1));
            }
        }
        Ok(())
    }
}

impl<K: fmt::Display, V: fmt::Display, C> fmt::Display for AvlTreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.dump(f)
    }
}
