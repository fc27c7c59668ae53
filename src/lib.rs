//! This crate provides a doubly-linked list with owned nodes, implemented as a
//! cyclic list, and a queue of owned strings built on it.
//!
//! The [`List`] allows inserting and removing elements at both ends in
//! constant time, and reorders its nodes in place: reversing, swapping pairs,
//! reversing groups, merging sorted lists and sorting never allocate or move an
//! element, they only relink nodes.
//!
//! The [`Queue`] keeps [`Element`]s, NUL-free owned copies of the inserted
//! text, ordered by byte-wise comparison.
//!
//! Here is a quick example showing how the queue works.
//!
//! ```
//! use cyclic_queue::Queue;
//!
//! let mut queue = Queue::new();
//! for text in &["banana", "apple", "cherry", "apple"] {
//!     queue.insert_tail(text)?;
//! }
//!
//! queue.sort(false);
//! assert_eq!(queue.iter().collect::<Vec<_>>(), ["apple", "apple", "banana", "cherry"]);
//!
//! queue.delete_duplicates(); // every "apple" goes away
//! queue.reverse();
//! assert_eq!(queue.iter().collect::<Vec<_>>(), ["cherry", "banana"]);
//!
//! let head = queue.remove_head(None).unwrap();
//! assert_eq!(head.value(), "cherry");
//! assert_eq!(queue.size(), 1);
//! # Ok::<(), cyclic_queue::QueueError>(())
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the list is like the following graph:
//! ```text
//!          ┌─────────────────────────────────────────────────────────────────────┐
//!          ↓                                                     (Ghost) Node N  │
//!    ╔═══════════╗           ╔═══════════╗                        ┌───────────┐  │
//!    ║   next    ║ ────────→ ║   next    ║ ────────→ ┄┄ ────────→ │   next    │ ─┘
//!    ╟───────────╢           ╟───────────╢     Node 2, 3, ...     ├───────────┤
//! ┌─ ║   prev    ║ ←──────── ║   prev    ║ ←──────── ┄┄ ←──────── │   prev    │
//! │  ╟───────────╢           ╟───────────╢                        ├───────────┤
//! │  ║ payload T ║           ║ payload T ║                        ┊No payload ┊
//! │  ╚═══════════╝           ╚═══════════╝                        └╌╌╌╌╌╌╌╌╌╌╌┘
//! │      Node 0                  Node 1                               ↑   ↑
//! └───────────────────────────────────────────────────────────────────┘   │
//! ╔═══════════╗                                                           │
//! ║   ghost   ║ ──────────────────────────────────────────────────────────┘
//! ╚═══════════╝
//!     List
//! ```
//! The `List` contains a single pointer `ghost` to the ghost node, which
//! separates the back of the list from its front. An empty list is a ghost
//! node linked to itself. There is no cached length.
//!
//! # Sorting
//!
//! [`List::sort`] is a top-down merge sort. [`List::timsort`] detects the
//! existing runs and merges them on a balanced stack, which is much faster on
//! partially ordered input. Both are stable, and both leave a valid list with
//! all of its elements if the comparison panics.
//!
//! # Errors
//!
//! Operations that allocate come in two flavours: `try_*` constructors and
//! insertions that return a [`QueueError`] and leave the container untouched,
//! and the plain ones that abort on allocation failure like std collections.

pub use error::QueueError;
pub use list::iterator::{IntoIter, Iter, IterMut};
pub use list::List;
pub use queue::{Element, Queue};

mod error;
pub mod list;
pub mod queue;
