use crate::list::{connect, element, next_of, prev_of, List, Node};
use std::ptr::NonNull;

/// Recursive merge sort over the whole list. Stable.
///
/// Each range is split at the node found by a slow/fast walk, both halves are
/// sorted down to single nodes and then merged with [`merge_adjacent`]. The
/// ring stays consistent between any two comparisons.
pub(crate) fn merge_sort<T, F>(list: &mut List<T>, mut less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    // SAFETY: `front..ghost` is the whole list.
    unsafe {
        sort_range(list.front_node(), list.ghost_node(), &mut less);
    }
}

/// Returns the first node of the second half of `start..end`, which holds at
/// least two nodes. The first half gets the extra node of an odd range.
unsafe fn split_point<T>(start: NonNull<Node<T>>, end: NonNull<Node<T>>) -> NonNull<Node<T>> {
    let (mut slow, mut fast) = (start, next_of(start));
    while fast != end && next_of(fast) != end {
        slow = next_of(slow);
        fast = next_of(next_of(fast));
    }
    next_of(slow)
}

/// Sorts `start..end` and returns its new first node.
unsafe fn sort_range<T, F>(
    start: NonNull<Node<T>>,
    end: NonNull<Node<T>>,
    less: &mut F,
) -> NonNull<Node<T>>
where
    F: FnMut(&T, &T) -> bool,
{
    if start == end || next_of(start) == end {
        return start;
    }
    let mid = split_point(start, end);
    // Sorting the left half never moves `mid`, and sorting the right half
    // keeps its nodes right after the left half.
    let start = sort_range(start, mid, less);
    let mid = sort_range(mid, end, less);
    merge_adjacent(start, mid, end, less)
}

/// Merges the sorted ranges `start..mid` and `mid..end` and returns the new
/// first node of `start..end`. On ties the node from `start..mid` stays first.
///
/// `left` walks the left range while `right` is the first node not merged yet.
/// A right node smaller than `*left` is unlinked and relinked right before
/// `left`, so the left range left to merge is always `left..right`.
pub(crate) unsafe fn merge_adjacent<T, F>(
    start: NonNull<Node<T>>,
    mid: NonNull<Node<T>>,
    end: NonNull<Node<T>>,
    less: &mut F,
) -> NonNull<Node<T>>
where
    F: FnMut(&T, &T) -> bool,
{
    let mut first = start;
    let (mut left, mut right) = (start, mid);
    while left != right && right != end {
        if less(element(right), element(left)) {
            let next = next_of(right);
            connect(prev_of(right), next);
            connect(prev_of(left), right);
            connect(right, left);
            if left == first {
                first = right;
            }
            right = next;
        } else {
            left = next_of(left);
        }
    }
    first
}

#[cfg(test)]
mod tests {
    use super::merge_sort;
    use crate::List;
    use std::iter::FromIterator;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn merge_sort_small_and_large() {
        for len in [0usize, 1, 2, 3, 8, 9, 17, 64, 257].iter().copied() {
            let input: Vec<u32> = (0..len as u32).map(|i| (i * 7919) % 97).collect();
            let mut list = List::from_iter(input.clone());
            merge_sort(&mut list, |a, b| a < b);
            list.assert_valid();
            let mut expected = input;
            expected.sort();
            assert_eq!(Vec::from_iter(list), expected, "len = {}", len);
        }
    }

    #[test]
    fn merge_sort_is_stable() {
        let input: Vec<(u8, usize)> = (0..40).map(|i| ((i % 3) as u8, i)).collect();
        let mut list = List::from_iter(input.clone());
        merge_sort(&mut list, |a, b| a.0 < b.0);
        let mut expected = input;
        expected.sort_by_key(|&(key, _)| key);
        assert_eq!(Vec::from_iter(list), expected);
    }

    #[test]
    fn merge_sort_keeps_ring_when_comparator_panics() {
        let input: Vec<u32> = (0..40).map(|i| (i * 13) % 17).collect();
        for panic_at in [0usize, 1, 7, 30, 100].iter().copied() {
            let mut list = List::from_iter(input.clone());
            let mut calls = 0;
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                merge_sort(&mut list, |a, b| {
                    calls += 1;
                    if calls > panic_at {
                        panic!("comparator gave up");
                    }
                    a < b
                })
            }));
            assert!(result.is_err(), "panic_at = {}", panic_at);
            list.assert_valid();
            let mut left = Vec::from_iter(list);
            left.sort();
            let mut expected = input.clone();
            expected.sort();
            assert_eq!(left, expected, "panic_at = {}", panic_at);
        }
    }
}
