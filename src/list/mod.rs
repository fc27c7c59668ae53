use std::alloc::{self, Layout};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::error::QueueError;
use crate::{IntoIter, Iter, IterMut};

pub mod iterator;

mod algorithms;

/// The `List` is a doubly-linked list with owned nodes, implemented as a cyclic list.
/// It allows inserting, removing elements at both ends in constant time.
/// In compromise, accessing or mutating elements at any position take *O*(*n*) time.
///
/// The `List` only holds a pointer `ghost` to the ghost node. There is no cached
/// length: [`List::len`] walks the ring, so no mutation ever has to keep a
/// counter in sync.
///
/// Each element lives inside its node, right after the `next` and `prev` links,
/// so a link and the element it belongs to are found from each other by a fixed
/// field offset.
///
/// # Naming Conventions
///
/// - `front..=back`: a closed range of list nodes, both inclusive;
/// - `start..end`: a half-open range of list nodes, left inclusive and right
///   exclusive (probably the ghost node).
pub struct List<T> {
    ghost: NonNull<Node<T>>,
    _marker: PhantomData<Box<Node<T>>>,
}

/// A list node. The ghost node shares the layout, but its `element` is never
/// initialized, so it must only be touched through the link helpers below.
#[repr(C)]
pub(crate) struct Node<T> {
    pub(crate) next: NonNull<Node<T>>,
    pub(crate) prev: NonNull<Node<T>>,
    pub(crate) element: T,
}

/// Nodes fragment detached from a list, used in list appending.
///
/// When detached from a list, reading of `front.prev` and `back.next`
/// is invalid.
pub(crate) struct DetachedNodes<T> {
    pub(crate) front: NonNull<Node<T>>,
    pub(crate) back: NonNull<Node<T>>,
    _marker: PhantomData<Box<Node<T>>>,
}

/// Reads `node.next`. Valid on the ghost node as well.
#[inline]
pub(crate) unsafe fn next_of<T>(node: NonNull<Node<T>>) -> NonNull<Node<T>> {
    (*node.as_ptr()).next
}

/// Reads `node.prev`. Valid on the ghost node as well.
#[inline]
pub(crate) unsafe fn prev_of<T>(node: NonNull<Node<T>>) -> NonNull<Node<T>> {
    (*node.as_ptr()).prev
}

#[inline]
pub(crate) unsafe fn set_next<T>(node: NonNull<Node<T>>, next: NonNull<Node<T>>) {
    (*node.as_ptr()).next = next;
}

#[inline]
pub(crate) unsafe fn set_prev<T>(node: NonNull<Node<T>>, prev: NonNull<Node<T>>) {
    (*node.as_ptr()).prev = prev;
}

/// Links `prev -> next` and `prev <- next`.
#[inline]
pub(crate) unsafe fn connect<T>(prev: NonNull<Node<T>>, next: NonNull<Node<T>>) {
    set_next(prev, next);
    set_prev(next, prev);
}

/// Swaps the `next` and `prev` links of a node.
#[inline]
pub(crate) unsafe fn flip<T>(node: NonNull<Node<T>>) {
    let next = next_of(node);
    set_next(node, prev_of(node));
    set_prev(node, next);
}

/// It is unsafe because `node` must not be the ghost node.
#[inline]
pub(crate) unsafe fn element<'a, T>(node: NonNull<Node<T>>) -> &'a T {
    &(*node.as_ptr()).element
}

/// It is unsafe because `node` must not be the ghost node.
#[inline]
pub(crate) unsafe fn element_mut<'a, T>(node: NonNull<Node<T>>) -> &'a mut T {
    &mut (*node.as_ptr()).element
}

// private methods
impl<T> List<T> {
    pub(crate) fn ghost_node(&self) -> NonNull<Node<T>> {
        self.ghost
    }
    pub(crate) fn front_node(&self) -> NonNull<Node<T>> {
        // SAFETY: `ghost.next` is always valid (either `ghost` itself, or the first element
        // in the list).
        unsafe { next_of(self.ghost) }
    }
    pub(crate) fn back_node(&self) -> NonNull<Node<T>> {
        // SAFETY: `ghost.prev` is always valid (either `ghost` itself, or the last element
        // in the list).
        unsafe { prev_of(self.ghost) }
    }

    /// Detach a single node `node` from the list, and return its element.
    ///
    /// It is unsafe because it does not check whether `node` belongs to the list,
    /// or whether it is the ghost node.
    pub(crate) unsafe fn detach_node(&mut self, node: NonNull<Node<T>>) -> T {
        connect(prev_of(node), next_of(node));
        Node::into_element(node)
    }

    /// Attach a single node `node` to the list, between `prev` and `next`.
    ///
    /// It is unsafe because it does not check whether `prev` and `next` belongs
    /// to the list, or whether the `prev` and `next` is adjacent (only in
    /// `#[cfg(debug_assertions)]`).
    pub(crate) unsafe fn attach_node(
        &mut self,
        prev: NonNull<Node<T>>,
        next: NonNull<Node<T>>,
        node: NonNull<Node<T>>,
    ) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        connect(prev, node);
        connect(node, next);
    }

    /// Attach a range of detached nodes to the list, between `prev` and `next`.
    ///
    /// It is unsafe because it does not check whether `prev` and `next` belongs
    /// to the list, or whether the `prev` and `next` is adjacent (only in
    /// `#[cfg(debug_assertions)]`).
    pub(crate) unsafe fn attach_nodes(
        &mut self,
        prev: NonNull<Node<T>>,
        next: NonNull<Node<T>>,
        detached: DetachedNodes<T>,
    ) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        connect(prev, detached.front);
        connect(detached.back, next);
    }

    /// Detach all nodes from the list, and return the detached nodes, or return
    /// `None` if the list is empty.
    pub(crate) fn detach_all_nodes(&mut self) -> Option<DetachedNodes<T>> {
        if self.is_empty() {
            return None;
        }
        let (front, back) = (self.front_node(), self.back_node());
        // SAFETY: `front..=back` is the whole list, and the ghost node is
        // re-linked to itself.
        unsafe {
            connect(self.ghost, self.ghost);
        }
        Some(DetachedNodes {
            front,
            back,
            _marker: PhantomData,
        })
    }
}

impl<T> List<T> {
    /// Create an empty `List`, aborting on allocation failure of the ghost node.
    ///
    /// # Examples
    /// ```
    /// use cyclic_queue::List;
    /// let list: List<u32> = List::new();
    /// assert!(list.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::try_new().unwrap_or_else(|_| alloc::handle_alloc_error(Layout::new::<Node<T>>()))
    }

    /// Create an empty `List`, or return an error if the ghost node cannot be
    /// allocated.
    pub fn try_new() -> Result<Self, QueueError> {
        let ghost = allocate_node::<T>()?;
        // SAFETY: only the links of the ghost node are written; its element
        // stays uninitialized and is never read.
        unsafe { connect(ghost, ghost) };
        Ok(Self {
            ghost,
            _marker: PhantomData,
        })
    }

    /// Returns `true` if the `List` is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.front_node() == self.ghost_node()
    }

    /// Returns the length of the `List` by walking it.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.len(), 0);
    ///
    /// list.push_front(2);
    /// list.push_back(3);
    /// assert_eq!(list.len(), 2);
    /// ```
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Removes all elements from the `List`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    #[inline]
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// Provides a reference to the front element, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.front(), None);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front(), Some(&1));
    /// ```
    #[inline]
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, so the front node is not the ghost node.
        Some(unsafe { element(self.front_node()) })
    }

    /// Provides a reference to the back element, or `None` if the list is
    /// empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, so the back node is not the ghost node.
        Some(unsafe { element(self.back_node()) })
    }

    /// Adds an element first in the list, aborting on allocation failure.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    pub fn push_front(&mut self, elt: T) {
        if self.try_push_front(elt).is_err() {
            alloc::handle_alloc_error(Layout::new::<Node<T>>());
        }
    }

    /// Appends an element to the back of a list, aborting on allocation failure.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    pub fn push_back(&mut self, elt: T) {
        if self.try_push_back(elt).is_err() {
            alloc::handle_alloc_error(Layout::new::<Node<T>>());
        }
    }

    /// Adds an element first in the list. If the node cannot be allocated,
    /// the element is dropped and the list is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    /// list.try_push_front("b")?;
    /// list.try_push_front("a")?;
    /// assert_eq!(list.front(), Some(&"a"));
    /// # Ok::<(), cyclic_queue::QueueError>(())
    /// ```
    pub fn try_push_front(&mut self, elt: T) -> Result<(), QueueError> {
        let node = Node::try_new_detached(elt)?;
        // SAFETY: the ghost node and the front node are adjacent nodes of this list.
        unsafe { self.attach_node(self.ghost_node(), self.front_node(), node) };
        Ok(())
    }

    /// Appends an element to the back of the list. If the node cannot be
    /// allocated, the element is dropped and the list is left untouched.
    pub fn try_push_back(&mut self, elt: T) -> Result<(), QueueError> {
        let node = Node::try_new_detached(elt)?;
        // SAFETY: the back node and the ghost node are adjacent nodes of this list.
        unsafe { self.attach_node(self.back_node(), self.ghost_node(), node) };
        Ok(())
    }

    /// Removes the first element and returns it, or `None` if the list is
    /// empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.pop_front(), None);
    ///
    /// list.push_front(1);
    /// list.push_front(3);
    /// assert_eq!(list.pop_front(), Some(3));
    /// assert_eq!(list.pop_front(), Some(1));
    /// assert_eq!(list.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the front node belongs to the list and is not the ghost node.
        Some(unsafe { self.detach_node(self.front_node()) })
    }

    /// Removes the last element from a list and returns it, or `None` if
    /// it is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the back node belongs to the list and is not the ghost node.
        Some(unsafe { self.detach_node(self.back_node()) })
    }

    /// Provides a forward iterator.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Provides a forward iterator with mutable references.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self)
    }

    /// Moves all elements from `other` to the end of the list.
    ///
    /// This reuses all the nodes from `other` and moves them into `self`. After
    /// this operation, `other` becomes empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list1 = List::from_iter(vec!['a']);
    /// let mut list2 = List::from_iter(vec!['b', 'c']);
    ///
    /// list1.append(&mut list2);
    ///
    /// assert_eq!(list1, List::from_iter(vec!['a', 'b', 'c']));
    /// assert!(list2.is_empty());
    /// ```
    pub fn append(&mut self, other: &mut Self) {
        if let Some(detached) = other.detach_all_nodes() {
            // `self.back_node()` and `self.ghost_node()` are valid
            // nodes in the list and they are adjacent, so it is safe.
            unsafe { self.attach_nodes(self.back_node(), self.ghost_node(), detached) }
        }
    }

    /// Asserts that every node reachable from the ghost node is linked both
    /// ways: `n.next.prev == n` and `n.prev.next == n`.
    ///
    /// # Panics
    ///
    /// Panics if the ring is inconsistent.
    pub fn assert_valid(&self) {
        let ghost = self.ghost_node();
        let mut node = ghost;
        loop {
            // SAFETY: every link reachable from the ghost node points to a live
            // node of this list, unless the list is already corrupted, which is
            // what this function reports.
            unsafe {
                let next = next_of(node);
                assert_eq!(prev_of(next), node, "`next.prev` does not point back");
                assert_eq!(next_of(prev_of(node)), node, "`prev.next` does not point back");
                node = next;
            }
            if node == ghost {
                break;
            }
        }
    }
}

impl<T: Debug> Debug for List<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Node<T> {
    /// Create a detached node with given element, or return an error if it
    /// cannot be allocated. The links of the new node point to itself.
    pub(crate) fn try_new_detached(element: T) -> Result<NonNull<Node<T>>, QueueError> {
        let node = allocate_node::<T>()?;
        // SAFETY: `node` is freshly allocated with the layout of `Node<T>`.
        unsafe {
            node.as_ptr().write(Node {
                next: node,
                prev: node,
                element,
            })
        };
        Ok(node)
    }

    /// Free a detached node and return its element.
    ///
    /// It is unsafe because `node` must be a fully initialized node created by
    /// [`Node::try_new_detached`], and no longer linked from any list.
    pub(crate) unsafe fn into_element(node: NonNull<Node<T>>) -> T {
        Box::from_raw(node.as_ptr()).element
    }
}

/// Allocates uninitialized storage for one node, in the same way `Box` would,
/// but reports failure instead of aborting.
fn allocate_node<T>() -> Result<NonNull<Node<T>>, QueueError> {
    let layout = Layout::new::<Node<T>>();
    // SAFETY: `Node<T>` always holds two pointers, so the layout is never zero-sized.
    let ptr = unsafe { alloc::alloc(layout) };
    NonNull::new(ptr.cast()).ok_or(QueueError::OutOfMemory {
        bytes: layout.size(),
    })
}

#[cfg(debug_assertions)]
fn assert_adjacent<T>(prev: NonNull<Node<T>>, next: NonNull<Node<T>>) {
    unsafe {
        assert_eq!(next_of(prev), next);
        assert_eq!(prev_of(next), prev);
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: the ghost node was allocated by `allocate_node` and its
        // element was never initialized, so only the storage is released.
        unsafe { alloc::dealloc(self.ghost.as_ptr().cast(), Layout::new::<Node<T>>()) };
    }
}

unsafe impl<T: Send> Send for List<T> {}

unsafe impl<T: Sync> Sync for List<T> {}

// Ensure that `List` and its read-only iterators are covariant in their type parameters.
#[allow(dead_code)]
fn assert_covariance() {
    fn a<'a>(x: List<&'static str>) -> List<&'a str> {
        x
    }
    fn b<'i, 'a>(x: Iter<'i, &'static str>) -> Iter<'i, &'a str> {
        x
    }
    fn c<'a>(x: IntoIter<&'static str>) -> IntoIter<&'a str> {
        x
    }
}
