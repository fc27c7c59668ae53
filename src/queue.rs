//! A queue of owned strings on top of [`List`].
//!
//! Every record of a [`Queue`] is an [`Element`] holding a NUL-free copy of
//! the text it was created from. Queues order their elements by plain
//! byte-wise comparison of that text.

use std::cmp::Ordering;
use std::fmt;

use crate::error::QueueError;
use crate::list::List;

/// One record of a [`Queue`]: an owned text value without NUL bytes.
///
/// Elements compare by the bytes of their text, so `"B" < "a"` and
/// `"apple" < "apples"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Element {
    value: String,
}

impl Element {
    /// Copies `text` into a new element.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InteriorNul`] if `text` contains a NUL byte, and
    /// [`QueueError::OutOfMemory`] if its copy cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::{Element, QueueError};
    ///
    /// assert_eq!(Element::try_new("pear")?.value(), "pear");
    /// assert_eq!(
    ///     Element::try_new("pe\0ar"),
    ///     Err(QueueError::InteriorNul { position: 2 })
    /// );
    /// # Ok::<(), QueueError>(())
    /// ```
    pub fn try_new(text: &str) -> Result<Self, QueueError> {
        if let Some(position) = text.bytes().position(|b| b == 0) {
            return Err(QueueError::InteriorNul { position });
        }
        let mut value = String::new();
        value
            .try_reserve_exact(text.len())
            .map_err(|_| QueueError::OutOfMemory { bytes: text.len() })?;
        value.push_str(text);
        Ok(Self { value })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_value(self) -> String {
        self.value
    }

    /// Copies the text into `buf` as a NUL-terminated byte string, truncating
    /// it to `buf.len() - 1` bytes if it is longer. Returns the number of text
    /// bytes copied, the terminator not included.
    ///
    /// An empty `buf` is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Element;
    ///
    /// let element = Element::try_new("banana")?;
    /// let mut buf = [0xffu8; 4];
    /// assert_eq!(element.copy_to(&mut buf), 3);
    /// assert_eq!(&buf, b"ban\0");
    /// # Ok::<(), cyclic_queue::QueueError>(())
    /// ```
    pub fn copy_to(&self, buf: &mut [u8]) -> usize {
        let capacity = match buf.len().checked_sub(1) {
            Some(capacity) => capacity,
            None => return 0,
        };
        let copied = self.value.len().min(capacity);
        buf[..copied].copy_from_slice(&self.value.as_bytes()[..copied]);
        buf[copied] = 0;
        copied
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A queue of [`Element`]s kept in a cyclic doubly-linked list.
///
/// Insertion and removal at both ends take *O*(1) time. [`Queue::size`]
/// walks the queue, there is no cached count.
///
/// # Examples
///
/// ```
/// use cyclic_queue::Queue;
///
/// let mut queue = Queue::new();
/// queue.insert_tail("banana")?;
/// queue.insert_tail("apple")?;
/// queue.insert_head("cherry")?;
/// queue.sort(false);
///
/// let mut buf = [0u8; 8];
/// let removed = queue.remove_head(Some(&mut buf[..])).unwrap();
/// assert_eq!(removed.value(), "apple");
/// assert_eq!(&buf[..6], b"apple\0");
/// assert_eq!(queue.size(), 2);
/// # Ok::<(), cyclic_queue::QueueError>(())
/// ```
#[derive(Default)]
pub struct Queue {
    list: List<Element>,
}

impl Queue {
    /// Creates an empty queue, aborting if its sentinel cannot be allocated.
    pub fn new() -> Self {
        Self { list: List::new() }
    }

    /// Creates an empty queue, or returns an error if its sentinel cannot be
    /// allocated.
    pub fn try_new() -> Result<Self, QueueError> {
        Ok(Self {
            list: List::try_new()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns the number of elements by walking the whole queue.
    pub fn size(&self) -> usize {
        self.list.len()
    }

    /// Inserts a copy of `text` at the head of the queue.
    ///
    /// On failure the queue is left unmodified.
    pub fn insert_head(&mut self, text: &str) -> Result<(), QueueError> {
        tracing::trace!(text, "insert head");
        Element::try_new(text)
            .and_then(|element| self.list.try_push_front(element))
            .map_err(|err| {
                tracing::debug!(%err, "insert head failed");
                err
            })
    }

    /// Inserts a copy of `text` at the tail of the queue.
    ///
    /// On failure the queue is left unmodified.
    pub fn insert_tail(&mut self, text: &str) -> Result<(), QueueError> {
        tracing::trace!(text, "insert tail");
        Element::try_new(text)
            .and_then(|element| self.list.try_push_back(element))
            .map_err(|err| {
                tracing::debug!(%err, "insert tail failed");
                err
            })
    }

    /// Removes the head element and hands it over, or returns `None` if the
    /// queue is empty. If `buf` is given, the text is also copied into it, see
    /// [`Element::copy_to`].
    pub fn remove_head(&mut self, buf: Option<&mut [u8]>) -> Option<Element> {
        let element = self.list.pop_front()?;
        tracing::trace!(text = element.value(), "remove head");
        if let Some(buf) = buf {
            element.copy_to(buf);
        }
        Some(element)
    }

    /// Removes the tail element and hands it over, or returns `None` if the
    /// queue is empty. If `buf` is given, the text is also copied into it, see
    /// [`Element::copy_to`].
    pub fn remove_tail(&mut self, buf: Option<&mut [u8]>) -> Option<Element> {
        let element = self.list.pop_back()?;
        tracing::trace!(text = element.value(), "remove tail");
        if let Some(buf) = buf {
            element.copy_to(buf);
        }
        Some(element)
    }

    /// Deletes the middle element, the ⌈*n*/2⌉-th one counting from 1.
    /// Returns `false` if the queue is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// for text in &["a", "b", "c", "d"] {
    ///     queue.insert_tail(text)?;
    /// }
    /// assert!(queue.delete_middle());
    /// assert_eq!(queue.iter().collect::<Vec<_>>(), ["a", "c", "d"]);
    /// # Ok::<(), cyclic_queue::QueueError>(())
    /// ```
    pub fn delete_middle(&mut self) -> bool {
        self.list.remove_middle().is_some()
    }

    /// Deletes every element whose text occurs more than once, all of its
    /// copies included. The queue must be sorted. Returns `false` if the queue
    /// is empty.
    pub fn delete_duplicates(&mut self) -> bool {
        if self.list.is_empty() {
            return false;
        }
        let removed = self.list.remove_all_duplicates();
        tracing::trace!(removed, "delete duplicates");
        true
    }

    /// Swaps every two adjacent elements.
    pub fn swap_pairs(&mut self) {
        self.list.swap_pairs();
    }

    pub fn reverse(&mut self) {
        self.list.reverse();
    }

    /// Reverses each consecutive group of `k` elements. A last group shorter
    /// than `k` keeps its order.
    pub fn reverse_in_groups(&mut self, k: usize) {
        self.list.reverse_chunks(k);
    }

    /// Sorts the queue ascending with a stable merge sort, then reverses it if
    /// `descend` is set.
    ///
    /// Note that with `descend` elements with equal text end up in the reverse
    /// of their original order.
    pub fn sort(&mut self, descend: bool) {
        tracing::debug!(descend, "merge sort");
        self.list.sort();
        if descend {
            self.list.reverse();
        }
    }

    /// Sorts the queue ascending with TimSort. The result is the same as
    /// `sort(false)`.
    pub fn timsort(&mut self) {
        tracing::debug!("timsort");
        self.list.timsort();
    }

    /// Merges the ascending queue `other` into this ascending queue. On equal
    /// text the elements of `self` come first. `other` becomes empty.
    pub fn merge_sorted(&mut self, other: &mut Queue) {
        self.list.merge(&mut other.list);
    }

    /// Merges all `queues` into the first one and returns its size. Every
    /// queue must be sorted ascending, or descending if `descend` is set, and
    /// the result is sorted the same way. On equal text the elements of an
    /// earlier queue come first. All the other queues become empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queues = vec![Queue::new(), Queue::new(), Queue::new()];
    /// for (queue, texts) in queues.iter_mut().zip(&[["e", "a"], ["d", "c"], ["f", "b"]]) {
    ///     for text in texts {
    ///         queue.insert_tail(text)?;
    ///     }
    /// }
    /// assert_eq!(Queue::merge_all(&mut queues, true), 6);
    /// assert_eq!(queues[0].iter().collect::<String>(), "fedcba");
    /// # Ok::<(), cyclic_queue::QueueError>(())
    /// ```
    pub fn merge_all(queues: &mut [Queue], descend: bool) -> usize {
        tracing::debug!(queues = queues.len(), descend, "merge all");
        let compare = |a: &Element, b: &Element| -> Ordering {
            if descend {
                b.cmp(a)
            } else {
                a.cmp(b)
            }
        };
        List::merge_all_with(queues, |queue| &mut queue.list, compare)
    }

    /// Keeps only the elements that are not greater than any later element,
    /// and returns the new size.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// for text in &["3", "1", "4", "1", "5"] {
    ///     queue.insert_tail(text)?;
    /// }
    /// assert_eq!(queue.ascend(), 3);
    /// assert_eq!(queue.iter().collect::<Vec<_>>(), ["1", "1", "5"]);
    /// # Ok::<(), cyclic_queue::QueueError>(())
    /// ```
    pub fn ascend(&mut self) -> usize {
        self.list.retain_suffix_minima()
    }

    /// Keeps only the elements that are not less than any later element, and
    /// returns the new size.
    pub fn descend(&mut self) -> usize {
        self.list.retain_suffix_maxima()
    }

    /// Iterates over the texts from head to tail.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        self.list.iter().map(Element::value)
    }

    pub fn as_list(&self) -> &List<Element> {
        &self.list
    }

    /// Panics if the links of the queue are inconsistent, see
    /// [`List::assert_valid`].
    pub fn assert_valid(&self) {
        self.list.assert_valid();
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Element, Queue};
    use crate::error::QueueError;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    fn trace_init() -> tracing::dispatcher::DefaultGuard {
        use tracing_subscriber::prelude::*;
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .with_target(false)
            .with_timer(())
            .set_default()
    }

    fn queue_of(texts: &[&str]) -> Queue {
        let mut queue = Queue::new();
        for text in texts {
            queue.insert_tail(text).unwrap();
        }
        queue
    }

    fn contents(queue: &Queue) -> Vec<&str> {
        queue.iter().collect()
    }

    #[test]
    fn sort_then_remove_in_order() {
        let _trace = trace_init();
        let mut queue = queue_of(&["banana", "apple", "cherry"]);
        queue.sort(false);
        let removed: Vec<String> = std::iter::from_fn(|| queue.remove_head(None))
            .map(Element::into_value)
            .collect();
        assert_eq!(removed, ["apple", "banana", "cherry"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn sort_descending() {
        let mut queue = queue_of(&["b", "c", "a", "b"]);
        queue.sort(true);
        queue.assert_valid();
        assert_eq!(contents(&queue), ["c", "b", "b", "a"]);
    }

    #[test]
    fn ascend_keeps_suffix_minima() {
        let _trace = trace_init();
        let mut queue = queue_of(&["3", "1", "4", "1", "5"]);
        assert_eq!(queue.ascend(), 3);
        queue.assert_valid();
        assert_eq!(contents(&queue), ["1", "1", "5"]);
    }

    #[test]
    fn descend_keeps_suffix_maxima() {
        let mut queue = queue_of(&["3", "1", "4", "1", "5"]);
        assert_eq!(queue.descend(), 1);
        assert_eq!(contents(&queue), ["5"]);

        let mut queue = queue_of(&["5", "2", "13", "3", "8"]);
        // byte-wise, "8" is greater than every earlier text
        assert_eq!(queue.descend(), 1);
        assert_eq!(contents(&queue), ["8"]);
    }

    #[test]
    fn empty_queue() {
        let _trace = trace_init();
        let mut queue = Queue::try_new().unwrap();
        assert_eq!(queue.remove_head(None), None);
        assert_eq!(queue.remove_tail(None), None);
        assert_eq!(queue.size(), 0);
        assert!(!queue.delete_middle());
        assert!(!queue.delete_duplicates());
        assert_eq!(queue.ascend(), 0);
        assert_eq!(queue.descend(), 0);
        queue.reverse();
        queue.swap_pairs();
        queue.reverse_in_groups(3);
        queue.sort(true);
        queue.assert_valid();
        assert!(queue.is_empty());
    }

    #[test]
    fn swap_pairs_leaves_trailing_element() {
        let mut queue = queue_of(&["1", "2", "3", "4", "5"]);
        queue.swap_pairs();
        queue.assert_valid();
        assert_eq!(contents(&queue), ["2", "1", "4", "3", "5"]);
    }

    #[test]
    fn timsort_agrees_with_merge_sort() {
        let _trace = trace_init();
        let input = ["g", "e", "c", "a", "b", "d", "f"];
        let mut by_timsort = queue_of(&input);
        let mut by_merge_sort = queue_of(&input);
        by_timsort.timsort();
        by_merge_sort.sort(false);
        by_timsort.assert_valid();
        assert_eq!(contents(&by_timsort), contents(&by_merge_sort));
        assert_eq!(contents(&by_timsort), ["a", "b", "c", "d", "e", "f", "g"]);
    }

    #[test]
    fn delete_middle_of_even_and_odd() {
        let mut queue = queue_of(&["1", "2", "3", "4", "5"]);
        assert!(queue.delete_middle());
        assert_eq!(contents(&queue), ["1", "2", "4", "5"]);
        assert!(queue.delete_middle());
        assert_eq!(contents(&queue), ["1", "4", "5"]);
        queue.assert_valid();
    }

    #[test]
    fn delete_duplicates_drops_every_copy() {
        let mut queue = queue_of(&["a", "a", "b", "c", "c", "c", "d"]);
        assert!(queue.delete_duplicates());
        queue.assert_valid();
        assert_eq!(contents(&queue), ["b", "d"]);

        let mut queue = queue_of(&["x", "x"]);
        assert!(queue.delete_duplicates());
        assert!(queue.is_empty());
    }

    #[test]
    fn reverse_in_groups_keeps_short_tail() {
        let mut queue = queue_of(&["1", "2", "3", "4", "5", "6", "7"]);
        queue.reverse_in_groups(3);
        queue.assert_valid();
        assert_eq!(contents(&queue), ["3", "2", "1", "6", "5", "4", "7"]);
    }

    #[test]
    fn merge_sorted_is_stable_and_empties_other() {
        let mut left = queue_of(&["a", "c", "e"]);
        let mut right = queue_of(&["b", "c", "f"]);
        let first_c = left.as_list().iter().nth(1).map(|c| c as *const Element);
        left.merge_sorted(&mut right);
        left.assert_valid();
        right.assert_valid();
        assert!(right.is_empty());
        assert_eq!(contents(&left), ["a", "b", "c", "c", "e", "f"]);
        // the "c" from `left` stays ahead of the one from `right`
        let merged_c = left.as_list().iter().nth(2).map(|c| c as *const Element);
        assert_eq!(merged_c, first_c);
    }

    #[test]
    fn merge_all_ascending() {
        let _trace = trace_init();
        let mut queues = vec![
            queue_of(&["b", "d"]),
            queue_of(&[]),
            queue_of(&["a", "d", "e"]),
            queue_of(&["c"]),
        ];
        assert_eq!(Queue::merge_all(&mut queues, false), 6);
        assert_eq!(contents(&queues[0]), ["a", "b", "c", "d", "d", "e"]);
        assert!(queues[1..].iter().all(Queue::is_empty));
        assert_eq!(Queue::merge_all(&mut [], false), 0);
    }

    #[test]
    fn merge_all_keeps_earlier_queues_first() {
        let mut queues = vec![
            queue_of(&["x", "y"]),
            queue_of(&["x"]),
            queue_of(&["w", "x"]),
            queue_of(&["x", "z"]),
            queue_of(&["x"]),
        ];
        let order: Vec<*const Element> = queues
            .iter()
            .flat_map(|queue| queue.as_list().iter())
            .filter(|element| element.value() == "x")
            .map(|element| element as *const Element)
            .collect();
        assert_eq!(Queue::merge_all(&mut queues, false), 8);
        queues[0].assert_valid();
        assert_eq!(contents(&queues[0]), ["w", "x", "x", "x", "x", "x", "y", "z"]);
        let merged: Vec<*const Element> = queues[0]
            .as_list()
            .iter()
            .filter(|element| element.value() == "x")
            .map(|element| element as *const Element)
            .collect();
        assert_eq!(merged, order);
    }

    #[test]
    fn remove_copies_into_buffer() {
        let mut queue = queue_of(&["head", "tail"]);
        let mut buf = [0xffu8; 3];
        let removed = queue.remove_tail(Some(&mut buf[..])).unwrap();
        assert_eq!(removed.value(), "tail");
        assert_eq!(&buf, b"ta\0");

        let mut empty: [u8; 0] = [];
        assert_eq!(queue.remove_head(Some(&mut empty[..])).unwrap().value(), "head");

        let mut roomy = [0xffu8; 8];
        queue.insert_head("x").unwrap();
        queue.remove_head(Some(&mut roomy[..]));
        assert_eq!(&roomy[..3], b"x\0\xff");
    }

    #[test]
    fn insert_rejects_nul() {
        let mut queue = queue_of(&["a"]);
        assert_eq!(
            queue.insert_tail("b\0"),
            Err(QueueError::InteriorNul { position: 1 })
        );
        assert_eq!(
            queue.insert_head("\0"),
            Err(QueueError::InteriorNul { position: 0 })
        );
        assert_eq!(contents(&queue), ["a"]);
    }

    #[test]
    fn elements_compare_bytewise() {
        let upper = Element::try_new("B").unwrap();
        let lower = Element::try_new("a").unwrap();
        assert!(upper < lower);
        assert!(Element::try_new("apple").unwrap() < Element::try_new("apples").unwrap());
        assert_eq!(lower.to_string(), "a");
    }

    #[derive(Debug, Clone)]
    enum Op {
        InsertHead(String),
        InsertTail(String),
        RemoveHead,
        RemoveTail,
        DeleteMiddle,
        SortAndDedup,
        SwapPairs,
        Reverse,
        ReverseInGroups(usize),
        Sort(bool),
        Ascend,
        Descend,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => "[a-d]{0,2}".prop_map(Op::InsertHead),
            3 => "[a-d]{0,2}".prop_map(Op::InsertTail),
            2 => Just(Op::RemoveHead),
            2 => Just(Op::RemoveTail),
            1 => Just(Op::DeleteMiddle),
            1 => Just(Op::SortAndDedup),
            1 => Just(Op::SwapPairs),
            1 => Just(Op::Reverse),
            1 => (0usize..5).prop_map(Op::ReverseInGroups),
            1 => any::<bool>().prop_map(Op::Sort),
            1 => Just(Op::Ascend),
            1 => Just(Op::Descend),
        ]
    }

    fn keep_running_extrema(model: &mut VecDeque<String>, keep: impl Fn(&String, &String) -> bool) {
        let items: Vec<String> = model.drain(..).collect();
        for (i, item) in items.iter().enumerate() {
            if items[i + 1..].iter().all(|later| keep(item, later)) {
                model.push_back(item.clone());
            }
        }
    }

    fn run_ops(ops: Vec<Op>) -> Result<(), TestCaseError> {
        let _trace = trace_init();
        let mut queue = Queue::new();
        let mut model: VecDeque<String> = VecDeque::new();

        for op in ops {
            match op {
                Op::InsertHead(text) => {
                    queue.insert_head(&text).unwrap();
                    model.push_front(text);
                }
                Op::InsertTail(text) => {
                    queue.insert_tail(&text).unwrap();
                    model.push_back(text);
                }
                Op::RemoveHead => {
                    let removed = queue.remove_head(None).map(Element::into_value);
                    prop_assert_eq!(removed, model.pop_front());
                }
                Op::RemoveTail => {
                    let removed = queue.remove_tail(None).map(Element::into_value);
                    prop_assert_eq!(removed, model.pop_back());
                }
                Op::DeleteMiddle => {
                    prop_assert_eq!(queue.delete_middle(), !model.is_empty());
                    if !model.is_empty() {
                        model.remove((model.len() - 1) / 2);
                    }
                }
                Op::SortAndDedup => {
                    queue.sort(false);
                    prop_assert_eq!(queue.delete_duplicates(), !model.is_empty());
                    let mut sorted: Vec<String> = model.drain(..).collect();
                    sorted.sort();
                    for item in &sorted {
                        if sorted.iter().filter(|other| *other == item).count() == 1 {
                            model.push_back(item.clone());
                        }
                    }
                }
                Op::SwapPairs => {
                    queue.swap_pairs();
                    let mut items: Vec<String> = model.drain(..).collect();
                    items.chunks_mut(2).for_each(|pair| pair.reverse());
                    model.extend(items);
                }
                Op::Reverse => {
                    queue.reverse();
                    let items: Vec<String> = model.drain(..).rev().collect();
                    model.extend(items);
                }
                Op::ReverseInGroups(k) => {
                    queue.reverse_in_groups(k);
                    let mut items: Vec<String> = model.drain(..).collect();
                    if k >= 2 {
                        items
                            .chunks_mut(k)
                            .filter(|group| group.len() == k)
                            .for_each(|group| group.reverse());
                    }
                    model.extend(items);
                }
                Op::Sort(descend) => {
                    queue.sort(descend);
                    model.make_contiguous().sort();
                    if descend {
                        model.make_contiguous().reverse();
                    }
                }
                Op::Ascend => {
                    let size = queue.ascend();
                    keep_running_extrema(&mut model, |item, later| item <= later);
                    prop_assert_eq!(size, model.len());
                }
                Op::Descend => {
                    let size = queue.descend();
                    keep_running_extrema(&mut model, |item, later| item >= later);
                    prop_assert_eq!(size, model.len());
                }
            }
            queue.assert_valid();
            prop_assert_eq!(queue.size(), model.len());
            prop_assert!(queue.iter().eq(model.iter().map(String::as_str)));
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn queue_matches_vecdeque(ops in proptest::collection::vec(op(), 0..64)) {
            run_ops(ops)?;
        }
    }
}
