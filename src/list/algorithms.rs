use crate::list::{connect, element, flip, next_of, prev_of, List};
use std::cmp::Ordering;

mod sort;
mod timsort;

use sort::merge_adjacent;

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other)
    }
}

impl<T: Eq> Eq for List<T> {}

impl<T: Clone> Clone for List<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

// Structural transforms. None of them allocates or moves an element; they
// only relink nodes.
impl<T> List<T> {
    /// Reverses the order of the list in place.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter(vec![1, 2, 3]);
    /// list.reverse();
    /// assert_eq!(list, List::from_iter(vec![3, 2, 1]));
    /// ```
    pub fn reverse(&mut self) {
        let ghost = self.ghost_node();
        let mut node = ghost;
        loop {
            // SAFETY: flipping the links of every node of the ring, the ghost
            // node included, reverses the ring as a whole.
            unsafe {
                let next = next_of(node);
                flip(node);
                node = next;
            }
            if node == ghost {
                break;
            }
        }
    }

    /// Swaps the positions of every two adjacent elements: `(1, 2)`, `(3, 4)`,
    /// and so on. A trailing unpaired element stays where it is.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter(vec![1, 2, 3, 4, 5]);
    /// list.swap_pairs();
    /// assert_eq!(list, List::from_iter(vec![2, 1, 4, 3, 5]));
    /// ```
    pub fn swap_pairs(&mut self) {
        let ghost = self.ghost_node();
        let mut first = self.front_node();
        // SAFETY: `first` and `second` are nodes of this list, neither is the
        // ghost node.
        unsafe {
            while first != ghost {
                let second = next_of(first);
                if second == ghost {
                    break;
                }
                let (before, after) = (prev_of(first), next_of(second));
                connect(before, second);
                connect(second, first);
                connect(first, after);
                first = after;
            }
        }
    }

    /// Reverses the elements within each consecutive group of `k`. A last
    /// group shorter than `k` keeps its order. `k < 2` leaves the list as is.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter(1..=8);
    /// list.reverse_chunks(3);
    /// assert_eq!(list, List::from_iter(vec![3, 2, 1, 6, 5, 4, 7, 8]));
    /// ```
    pub fn reverse_chunks(&mut self, k: usize) {
        if k < 2 {
            return;
        }
        let ghost = self.ghost_node();
        let mut before = ghost;
        // SAFETY: every group `first..=last` is a range of this list that does
        // not contain the ghost node.
        unsafe {
            loop {
                let first = next_of(before);
                let mut last = first;
                for _ in 1..k {
                    if last == ghost {
                        break;
                    }
                    last = next_of(last);
                }
                if first == ghost || last == ghost {
                    break;
                }
                let after = next_of(last);
                let mut node = first;
                while node != after {
                    let next = next_of(node);
                    flip(node);
                    node = next;
                }
                connect(before, last);
                connect(first, after);
                before = first;
            }
        }
    }

    /// Removes the middle element and returns it, or `None` if the list is
    /// empty.
    ///
    /// For a list of length *n* the removed element is the ⌈*n*/2⌉-th one,
    /// counting from 1: the exact middle when *n* is odd, the lower of the two
    /// middles when *n* is even.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter(1..=4);
    /// assert_eq!(list.remove_middle(), Some(2));
    /// assert_eq!(list.remove_middle(), Some(3));
    /// ```
    pub fn remove_middle(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let ghost = self.ghost_node();
        let (mut slow, mut fast) = (self.front_node(), self.front_node());
        // SAFETY: `fast` only moves two steps when neither step reaches the
        // ghost node, and `slow` stays behind it.
        unsafe {
            while next_of(fast) != ghost && next_of(next_of(fast)) != ghost {
                slow = next_of(slow);
                fast = next_of(next_of(fast));
            }
            Some(self.detach_node(slow))
        }
    }

    /// Removes every element that is equal to one of its neighbours, so that
    /// no value that appeared more than once survives. Returns the number of
    /// removed elements.
    ///
    /// The list must already be sorted; otherwise only adjacent equal elements
    /// are found.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter(vec![1, 2, 2, 3, 4, 4, 4, 5]);
    /// assert_eq!(list.remove_all_duplicates(), 5);
    /// assert_eq!(list, List::from_iter(vec![1, 3, 5]));
    /// ```
    pub fn remove_all_duplicates(&mut self) -> usize
    where
        T: PartialEq,
    {
        let ghost = self.ghost_node();
        let mut removed = 0;
        let mut node = self.front_node();
        // SAFETY: `node` and `next` are never the ghost node when an element
        // is read, and a node is only detached after its successor is known.
        unsafe {
            while node != ghost {
                let mut next = next_of(node);
                let mut duplicated = false;
                while next != ghost && element(next) == element(node) {
                    let after = next_of(next);
                    drop(self.detach_node(next));
                    removed += 1;
                    duplicated = true;
                    next = after;
                }
                if duplicated {
                    drop(self.detach_node(node));
                    removed += 1;
                }
                node = next;
            }
        }
        removed
    }

    /// Removes every element that has a strictly smaller element anywhere
    /// after it, and returns the remaining length. What is left is
    /// non-decreasing.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter(vec![3, 1, 4, 1, 5]);
    /// assert_eq!(list.retain_suffix_minima(), 3);
    /// assert_eq!(list, List::from_iter(vec![1, 1, 5]));
    /// ```
    pub fn retain_suffix_minima(&mut self) -> usize
    where
        T: Ord,
    {
        self.retain_suffix_by(|kept, before| kept < before)
    }

    /// Removes every element that has a strictly greater element anywhere
    /// after it, and returns the remaining length. What is left is
    /// non-increasing.
    pub fn retain_suffix_maxima(&mut self) -> usize
    where
        T: Ord,
    {
        self.retain_suffix_by(|kept, before| kept > before)
    }

    /// Walks from the back to the front. `kept` is the last element kept so
    /// far, and the element right before it is removed when
    /// `discard(kept, before)` holds.
    fn retain_suffix_by<F>(&mut self, mut discard: F) -> usize
    where
        F: FnMut(&T, &T) -> bool,
    {
        let ghost = self.ghost_node();
        let mut kept = self.back_node();
        // SAFETY: `kept` and `before` are checked against the ghost node
        // before their elements are read.
        unsafe {
            while kept != ghost {
                let before = prev_of(kept);
                if before == ghost {
                    break;
                }
                if discard(element(kept), element(before)) {
                    drop(self.detach_node(before));
                } else {
                    kept = before;
                }
            }
        }
        self.len()
    }
}

// Sorting and merging.
impl<T> List<T> {
    /// Merges the sorted list `other` into this sorted list. After this
    /// operation, `other` becomes empty.
    ///
    /// This merge is stable: on equal elements, those from `self` come first.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* + *m*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut odd = List::from_iter(vec![1, 3, 5]);
    /// let mut even = List::from_iter(vec![2, 4, 6, 8]);
    /// odd.merge(&mut even);
    /// assert_eq!(odd, List::from_iter(vec![1, 2, 3, 4, 5, 6, 8]));
    /// assert!(even.is_empty());
    /// ```
    pub fn merge(&mut self, other: &mut Self)
    where
        T: Ord,
    {
        self.merge_by(other, T::cmp)
    }

    /// Like [`List::merge`], with a comparator function. Both lists must be
    /// sorted by the same comparator.
    pub fn merge_by<F>(&mut self, other: &mut Self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if other.is_empty() {
            return;
        }
        let was_empty = self.is_empty();
        let mid = other.front_node();
        self.append(other);
        if was_empty {
            return;
        }
        // SAFETY: `front..mid` and `mid..ghost` are the two non-empty halves
        // of this list.
        unsafe {
            merge_adjacent(self.front_node(), mid, self.ghost_node(), &mut |a: &T, b: &T| {
                compare(a, b) == Ordering::Less
            });
        }
    }

    /// Merges all sorted `lists` into the first one and returns its length.
    /// The other lists become empty.
    ///
    /// This merge is stable: on equal elements, those from a list earlier in
    /// `lists` come first. Lists are merged pairwise, so the work is
    /// *O*(*n* log *k*) for *k* lists holding *n* elements in total.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut lists = vec![
    ///     List::from_iter(vec![9, 5, 1]),
    ///     List::from_iter(vec![8, 2]),
    ///     List::from_iter(vec![7, 6, 3]),
    /// ];
    /// assert_eq!(List::merge_all_by(&mut lists, |a, b| b.cmp(a)), 8);
    /// assert_eq!(lists[0], List::from_iter(vec![9, 8, 7, 6, 5, 3, 2, 1]));
    /// assert!(lists[1].is_empty() && lists[2].is_empty());
    /// ```
    pub fn merge_all_by<F>(lists: &mut [Self], compare: F) -> usize
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        Self::merge_all_with(lists, |list| list, compare)
    }

    /// The pairwise merge behind [`List::merge_all_by`], over any slice whose
    /// items own a list. `list_of` picks the list out of an item.
    ///
    /// Round `r` merges item `i + 2^r` into item `i` for every `i` that is a
    /// multiple of `2^(r+1)`. The receiving item always precedes the merged
    /// one, so every stable two-list merge keeps earlier items first.
    pub(crate) fn merge_all_with<S, F>(
        items: &mut [S],
        list_of: fn(&mut S) -> &mut List<T>,
        mut compare: F,
    ) -> usize
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut step = 1;
        while step < items.len() {
            let mut at = 0;
            while at + step < items.len() {
                let (left, right) = items.split_at_mut(at + step);
                list_of(&mut left[at]).merge_by(list_of(&mut right[0]), &mut compare);
                at += 2 * step;
            }
            step *= 2;
        }
        items.first_mut().map_or(0, |first| list_of(first).len())
    }

    /// Sort the list.
    ///
    /// This sort is stable (i.e., does not reorder equal elements).
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* * log(*n*)) time and
    /// *O*(log(*n*)) stack depth.
    ///
    /// # Current Implementation
    ///
    /// The current algorithm is a top-down merge sort which splits each range
    /// at its middle node, found by a slow/fast walk, down to single nodes.
    /// Halves are merged with the same relinking merge as [`List::merge_by`],
    /// so there is no extra temporary storage.
    ///
    /// If the comparison panics, the list keeps all of its elements in an
    /// unspecified order.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    /// let mut list = List::from_iter(vec![5, 2, 4, 3, 1]);
    ///
    /// list.sort();
    ///
    /// assert_eq!(Vec::from_iter(list), vec![1, 2, 3, 4, 5]);
    /// ```
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        sort::merge_sort(self, |a, b| a.lt(b));
    }

    /// Sort the list with a comparator function.
    ///
    /// This sort is stable (i.e., does not reorder equal elements).
    ///
    /// The comparator function must define a total ordering for the
    /// elements in the list. If the ordering is not total, the order
    /// of the elements is unspecified.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    /// let mut v = List::from_iter(vec![5, 4, 1, 3, 2]);
    /// v.sort_by(|a, b| b.cmp(a));
    /// assert_eq!(Vec::from_iter(v), vec![5, 4, 3, 2, 1]);
    /// ```
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        sort::merge_sort(self, |a, b| compare(a, b) == Ordering::Less)
    }

    /// Sorts the list with a key extraction function.
    ///
    /// This sort is stable (i.e., does not reorder equal elements)
    /// and *O*(*m* \* *n* \* log(*n*)) worst-case, where the
    /// key function is *O*(*m*).
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    /// let mut v = List::from_iter(vec![-5i32, 4, 1, -3, 2]);
    ///
    /// v.sort_by_key(|k| k.abs());
    /// assert_eq!(Vec::from_iter(v), vec![1, 2, -3, 4, -5]);
    /// ```
    pub fn sort_by_key<K, F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> K,
        K: Ord,
    {
        sort::merge_sort(self, |a, b| f(a).lt(&f(b)));
    }

    /// Sort the list with TimSort.
    ///
    /// This sort is stable, and produces the same order as [`List::sort`].
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* * log(*n*)) time, and in
    /// *O*(*n*) time when the list consists of a few monotonic runs.
    ///
    /// # Current Implementation
    ///
    /// Maximal runs are detected in a single pass (strictly descending runs
    /// are reversed on the fly) and kept on a stack that is collapsed whenever
    /// the run lengths stop shrinking geometrically. Merging relinks nodes, and
    /// the `prev` links are restored during the last merge only.
    ///
    /// If the comparison panics, the list keeps all of its elements in an
    /// unspecified order.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    /// let mut list = List::from_iter(vec![9, 7, 5, 1, 2, 3, 8]);
    ///
    /// list.timsort();
    ///
    /// assert_eq!(Vec::from_iter(list), vec![1, 2, 3, 5, 7, 8, 9]);
    /// ```
    pub fn timsort(&mut self)
    where
        T: Ord,
    {
        timsort::timsort(self, |a, b| a.lt(b));
    }

    /// Sort the list with TimSort and a comparator function. See
    /// [`List::timsort`].
    pub fn timsort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        timsort::timsort(self, |a, b| compare(a, b) == Ordering::Less);
    }
}
