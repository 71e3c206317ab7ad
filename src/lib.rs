//! An ordered map implemented with an AVL tree.
//!
//! [`AvlTreeMap`] keeps its entries in a height-balanced binary search tree
//! whose nodes carry parent back-pointers. Lookups, insertions and removals
//! take `O(log n)` steps; [`Cursor`]s and iterators walk the map in key order
//! in both directions using only the node links.
//!
//! ```
//! use avlmap::AvlTreeMap;
//!
//! let mut map = AvlTreeMap::from([(5, "five"), (3, "three"), (8, "eight")]);
//! *map.get_or_insert_default(4) = "four";
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), [3, 4, 5, 8]);
//!
//! let mut cursor = map.find_mut(&4);
//! cursor.remove_current();
//! assert_eq!(cursor.key(), Some(&5));
//! ```

pub mod comparator;
mod error;
pub mod map;
mod node;

pub use comparator::{Comparator, LessThan, NaturalOrder, ReverseOrder};
pub use error::{Error, Result};
pub use map::{AvlTreeMap, Cursor, CursorMut};
