//! TimSort over the nodes of a [`List`].
//!
//! While sorting, the list is used as a set of forward chains: only the `next`
//! links are meaningful and every chain is terminated by the ghost node. The
//! ghost node also serves as the scratch head of each merge. Pending runs live
//! on an explicit stack of `(head, len)` pairs. The `prev` links are rebuilt
//! once, during the final merge or when the run stack is dropped, which closes
//! the ring again.
//!
//! The comparator may panic. Every chain is owned by either the run stack or a
//! merge in progress at each call, and both close the ring when dropped, so an
//! unwinding sort leaves a valid list with all of its elements.

use crate::list::{connect, element, next_of, set_next, List, Node};
use std::ptr::NonNull;

/// A sorted forward chain of `len` nodes, terminated by the ghost node.
struct Run<T> {
    head: NonNull<Node<T>>,
    len: usize,
}

/// Pending runs, bottom of the stack first. Adjacent entries are adjacent
/// ranges of the input.
///
/// `partial` is the reversed part of a descending run being scanned, and
/// `rest` is the input not scanned yet. Both are ghost-terminated chains, or
/// the ghost node itself when empty.
struct RunStack<T> {
    runs: Vec<Run<T>>,
    partial: NonNull<Node<T>>,
    rest: NonNull<Node<T>>,
    ghost: NonNull<Node<T>>,
}

pub(crate) fn timsort<T, F>(list: &mut List<T>, mut less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    let (front, ghost) = (list.front_node(), list.ghost_node());
    if front == ghost {
        return;
    }
    // The back node already points at the ghost node, so the whole list is a
    // ghost-terminated chain from here on.
    let mut stack = RunStack {
        runs: Vec::with_capacity(32),
        partial: ghost,
        rest: front,
        ghost,
    };
    // SAFETY: all nodes visited below belong to `list`, which is exclusively
    // borrowed for the whole sort. Dropping `stack` closes the ring.
    unsafe {
        while stack.rest != ghost {
            stack.push_run(&mut less);
            stack.collapse(&mut less);
        }
        stack.force_collapse(&mut less);
        stack.merge_last_two(&mut less);
    }
}

/// Appends the chain `list` after `tail`, rebuilding its `prev` links, and
/// returns the new tail. An empty chain (`list == ghost`) appends nothing.
unsafe fn link_back<T>(
    mut tail: NonNull<Node<T>>,
    mut list: NonNull<Node<T>>,
    ghost: NonNull<Node<T>>,
) -> NonNull<Node<T>> {
    while list != ghost {
        connect(tail, list);
        tail = list;
        list = next_of(list);
    }
    tail
}

unsafe fn last_of<T>(mut list: NonNull<Node<T>>, ghost: NonNull<Node<T>>) -> NonNull<Node<T>> {
    while next_of(list) != ghost {
        list = next_of(list);
    }
    list
}

/// A forward merge in progress: the output runs from `ghost.next` to `tail`,
/// `a` and `b` are what is left of the inputs.
///
/// When dropped, appends `a` and then `b` after `tail` and stores the head of
/// the merged chain. After a normal merge one of them is empty, after a panic
/// both may be left, unsorted.
struct MergeHole<'a, T> {
    ghost: NonNull<Node<T>>,
    tail: NonNull<Node<T>>,
    a: NonNull<Node<T>>,
    b: NonNull<Node<T>>,
    head: &'a mut NonNull<Node<T>>,
}

impl<T> Drop for MergeHole<'_, T> {
    fn drop(&mut self) {
        // SAFETY: `a` and `b` are disjoint ghost-terminated chains that are
        // not part of the output yet.
        unsafe {
            if self.a == self.ghost {
                set_next(self.tail, self.b);
            } else {
                set_next(self.tail, self.a);
                if self.b != self.ghost {
                    set_next(last_of(self.a, self.ghost), self.b);
                }
            }
            *self.head = next_of(self.ghost);
        }
    }
}

/// Merges the chain at `*head` with the chain `b` and stores the head of the
/// result back into `*head`. On ties the node from `*head` is taken first.
unsafe fn merge<T, F>(
    ghost: NonNull<Node<T>>,
    head: &mut NonNull<Node<T>>,
    b: NonNull<Node<T>>,
    less: &mut F,
) where
    F: FnMut(&T, &T) -> bool,
{
    let mut hole = MergeHole {
        ghost,
        tail: ghost,
        a: *head,
        b,
        head,
    };
    loop {
        if !less(element(hole.b), element(hole.a)) {
            set_next(hole.tail, hole.a);
            hole.tail = hole.a;
            hole.a = next_of(hole.a);
            if hole.a == ghost {
                break;
            }
        } else {
            set_next(hole.tail, hole.b);
            hole.tail = hole.b;
            hole.b = next_of(hole.b);
            if hole.b == ghost {
                break;
            }
        }
    }
}

/// Like [`MergeHole`], for the last merge: the output is already a doubly
/// linked range `ghost.next..=tail`. When dropped, links `a` and then `b`
/// after it and closes the ring around `ghost`.
struct FinalMergeHole<T> {
    ghost: NonNull<Node<T>>,
    tail: NonNull<Node<T>>,
    a: NonNull<Node<T>>,
    b: NonNull<Node<T>>,
}

impl<T> Drop for FinalMergeHole<T> {
    fn drop(&mut self) {
        // SAFETY: `a` and `b` are disjoint ghost-terminated chains that are
        // not part of the output yet.
        unsafe {
            let tail = link_back(self.tail, self.a, self.ghost);
            let tail = link_back(tail, self.b, self.ghost);
            connect(tail, self.ghost);
        }
    }
}

/// Like [`merge`], but links the `prev` of every node on the way and closes
/// the ring around `ghost`.
unsafe fn merge_final<T, F>(
    ghost: NonNull<Node<T>>,
    a: NonNull<Node<T>>,
    b: NonNull<Node<T>>,
    less: &mut F,
) where
    F: FnMut(&T, &T) -> bool,
{
    let mut hole = FinalMergeHole {
        ghost,
        tail: ghost,
        a,
        b,
    };
    loop {
        if !less(element(hole.b), element(hole.a)) {
            connect(hole.tail, hole.a);
            hole.tail = hole.a;
            hole.a = next_of(hole.a);
            if hole.a == ghost {
                break;
            }
        } else {
            connect(hole.tail, hole.b);
            hole.tail = hole.b;
            hole.b = next_of(hole.b);
            if hole.b == ghost {
                break;
            }
        }
    }
}

impl<T> RunStack<T> {
    fn run_len(&self, at: usize) -> usize {
        self.runs[at].len
    }

    /// Consumes the longest run at the front of `rest` and pushes it.
    ///
    /// A strictly descending run is reversed while it is consumed. Equal
    /// neighbours never belong to a descending run, so the reversal keeps the
    /// sort stable.
    unsafe fn push_run<F>(&mut self, less: &mut F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        let ghost = self.ghost;
        let start = self.rest;
        let mut list = start;
        let mut next = next_of(list);
        let mut len = 1;
        let head;

        if next == ghost {
            head = list;
        } else if less(element(next), element(list)) {
            let mut prev = ghost;
            loop {
                len += 1;
                set_next(list, prev);
                prev = list;
                list = next;
                self.partial = prev;
                self.rest = list;
                next = next_of(list);
                if next == ghost || !less(element(next), element(list)) {
                    break;
                }
            }
            set_next(list, prev);
            head = list;
        } else {
            loop {
                len += 1;
                list = next;
                next = next_of(list);
                if next == ghost || less(element(next), element(list)) {
                    break;
                }
            }
            set_next(list, ghost);
            head = start;
        }
        self.partial = ghost;
        self.rest = next;
        tracing::trace!(len, pending = self.runs.len(), "timsort: push run");
        self.runs.push(Run { head, len });
    }

    /// Merges the runs at `at` and `at + 1`.
    unsafe fn merge_at<F>(&mut self, at: usize, less: &mut F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        let right = self.runs.remove(at + 1);
        let ghost = self.ghost;
        let left = &mut self.runs[at];
        left.len += right.len;
        tracing::trace!(at, len = left.len, "timsort: merge runs");
        merge(ghost, &mut left.head, right.head, less);
    }

    /// Merges runs until, from the top, every run is longer than the next
    /// one up and longer than the two above it together.
    unsafe fn collapse<F>(&mut self, less: &mut F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        while self.runs.len() >= 2 {
            let n = self.runs.len();
            if (n >= 3 && self.run_len(n - 3) <= self.run_len(n - 2) + self.run_len(n - 1))
                || (n >= 4 && self.run_len(n - 4) <= self.run_len(n - 3) + self.run_len(n - 2))
            {
                if self.run_len(n - 3) < self.run_len(n - 1) {
                    self.merge_at(n - 3, less);
                } else {
                    self.merge_at(n - 2, less);
                }
            } else if self.run_len(n - 2) <= self.run_len(n - 1) {
                self.merge_at(n - 2, less);
            } else {
                break;
            }
        }
    }

    /// Merges until at most two runs are left, smaller neighbour first.
    unsafe fn force_collapse<F>(&mut self, less: &mut F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        while self.runs.len() >= 3 {
            let n = self.runs.len();
            if self.run_len(n - 3) < self.run_len(n - 1) {
                self.merge_at(n - 3, less);
            } else {
                self.merge_at(n - 2, less);
            }
        }
    }

    /// Merges the last two runs into the cyclic list. A single run is left on
    /// the stack and linked back when the stack is dropped.
    unsafe fn merge_last_two<F>(&mut self, less: &mut F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        debug_assert!(self.runs.len() <= 2, "final merge before force collapse");
        if self.runs.len() == 2 {
            if let (Some(second), Some(first)) = (self.runs.pop(), self.runs.pop()) {
                merge_final(self.ghost, first.head, second.head, less);
            }
        }
    }
}

impl<T> Drop for RunStack<T> {
    /// Links every chain still owned by the stack back into the ring, in stack
    /// order followed by `partial` and `rest`.
    fn drop(&mut self) {
        let ghost = self.ghost;
        if self.runs.is_empty() && self.partial == ghost && self.rest == ghost {
            // the final merge closed the ring already
            return;
        }
        if std::thread::panicking() {
            tracing::debug!(
                runs = self.runs.len(),
                "timsort: comparator panicked, relinking unsorted runs"
            );
        }
        // SAFETY: the runs, `partial` and `rest` are disjoint ghost-terminated
        // chains holding every node of the list.
        unsafe {
            let mut tail = ghost;
            for run in &self.runs {
                tail = link_back(tail, run.head, ghost);
            }
            tail = link_back(tail, self.partial, ghost);
            tail = link_back(tail, self.rest, ghost);
            connect(tail, ghost);
        }
    }
}
