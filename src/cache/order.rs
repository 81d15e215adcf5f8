//! Eviction Order Module
//!
//! Doubly-linked list of keys stored in a slab, used to decide which key
//! `set` evicts when the cache is full.

// == Node Handle ==
/// Position of a key inside an [`EvictionOrder`].
///
/// Handles stay valid until the key is removed; the slot may then be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

#[derive(Debug)]
struct Node {
    key: String,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Eviction Order ==
/// Ordered set of keys with O(1) push, move, removal and head eviction.
///
/// - Front = next eviction candidate (oldest / least recently used)
/// - Back = most recently inserted or touched
#[derive(Debug, Default)]
pub(crate) struct EvictionOrder {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl EvictionOrder {
    // == Constructor ==
    /// Creates an empty order with room for `capacity` keys.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    // == Push Back ==
    /// Appends `key` at the most-recent end and returns its handle.
    pub(crate) fn push_back(&mut self, key: String) -> NodeId {
        let node = Node {
            key,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.link_back(idx);
        self.len += 1;
        NodeId(idx)
    }

    // == Move To Back ==
    /// Marks the key at `id` as most recent.
    pub(crate) fn move_to_back(&mut self, id: NodeId) {
        if self.tail == Some(id.0) || self.node(id.0).is_none() {
            return;
        }
        self.unlink(id.0);
        self.link_back(id.0);
    }

    // == Remove ==
    /// Removes the key at `id`, returning it.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<String> {
        self.node(id.0)?;
        self.unlink(id.0);
        let node = self.slots[id.0].take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(node.key)
    }

    // == Pop Front ==
    /// Removes and returns the eviction candidate.
    ///
    /// Returns None if the order is empty.
    pub(crate) fn pop_front(&mut self) -> Option<String> {
        let head = self.head?;
        self.remove(NodeId(head))
    }

    // == Iter ==
    /// Iterates keys from the front (next to evict) to the back.
    pub(crate) fn iter(&self) -> Iter<'_> {
        Iter {
            order: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    // == Linking ==
    fn node(&self, idx: usize) -> Option<&Node> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn unlink(&mut self, idx: usize) {
        let Some(node) = self.node_mut(idx) else {
            return;
        };
        let (prev, next) = (node.prev.take(), node.next.take());

        match prev.and_then(|p| self.node_mut(p)) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.node_mut(n)) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }
    }

    fn link_back(&mut self, idx: usize) {
        let old_tail = self.tail;
        if let Some(node) = self.node_mut(idx) {
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail.and_then(|t| self.node_mut(t)) {
            Some(tail_node) => tail_node.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }
}

// == Iterator ==
/// Front-to-back iterator over the keys of an [`EvictionOrder`].
pub(crate) struct Iter<'a> {
    order: &'a EvictionOrder,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.order.node(self.cursor?)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(node.key.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(order: &EvictionOrder) -> Vec<&str> {
        order.iter().collect()
    }

    #[test]
    fn test_order_new() {
        let order = EvictionOrder::default();
        assert_eq!(order.len, 0);
        assert_eq!(order.iter().next(), None);
    }

    #[test]
    fn test_push_back_keeps_insertion_order() {
        let mut order = EvictionOrder::default();

        order.push_back("key1".to_string());
        order.push_back("key2".to_string());
        order.push_back("key3".to_string());

        assert_eq!(order.len, 3);
        assert_eq!(keys(&order), vec!["key1", "key2", "key3"]);
    }

    #[test]
    fn test_move_to_back() {
        let mut order = EvictionOrder::default();

        let a = order.push_back("a".to_string());
        order.push_back("b".to_string());
        order.push_back("c".to_string());

        order.move_to_back(a);

        assert_eq!(keys(&order), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_to_back_middle_and_tail() {
        let mut order = EvictionOrder::default();

        order.push_back("a".to_string());
        let b = order.push_back("b".to_string());
        let c = order.push_back("c".to_string());

        order.move_to_back(b);
        assert_eq!(keys(&order), vec!["a", "c", "b"]);

        order.move_to_back(b);
        assert_eq!(keys(&order), vec!["a", "c", "b"]);

        order.move_to_back(c);
        assert_eq!(keys(&order), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pop_front() {
        let mut order = EvictionOrder::default();

        order.push_back("key1".to_string());
        order.push_back("key2".to_string());

        assert_eq!(order.pop_front(), Some("key1".to_string()));
        assert_eq!(order.len, 1);
        assert_eq!(order.pop_front(), Some("key2".to_string()));
        assert_eq!(order.len, 0);
        assert_eq!(order.pop_front(), None);
    }

    #[test]
    fn test_remove_middle() {
        let mut order = EvictionOrder::default();

        order.push_back("key1".to_string());
        let key2 = order.push_back("key2".to_string());
        order.push_back("key3".to_string());

        assert_eq!(order.remove(key2), Some("key2".to_string()));
        assert_eq!(order.remove(key2), None);

        assert_eq!(order.len, 2);
        assert_eq!(keys(&order), vec!["key1", "key3"]);
    }

    #[test]
    fn test_remove_only_element() {
        let mut order = EvictionOrder::default();
        let only = order.push_back("only".to_string());

        assert_eq!(order.remove(only), Some("only".to_string()));
        assert_eq!(order.len, 0);
        assert_eq!(order.head, None);
        assert_eq!(order.tail, None);
        assert_eq!(keys(&order), Vec::<&str>::new());
    }

    #[test]
    fn test_slots_are_reused() {
        let mut order = EvictionOrder::with_capacity(2);

        order.push_back("a".to_string());
        order.push_back("b".to_string());
        order.pop_front();
        order.push_back("c".to_string());

        assert_eq!(order.slots.len(), 2);
        assert_eq!(keys(&order), vec!["b", "c"]);
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut order = EvictionOrder::default();

        let a = order.push_back("a".to_string());
        let b = order.push_back("b".to_string());
        let c = order.push_back("c".to_string());

        order.move_to_back(a);
        order.move_to_back(c);
        order.move_to_back(b);

        // a, then c, then b were touched last in that order
        assert_eq!(order.pop_front(), Some("a".to_string()));
        assert_eq!(order.pop_front(), Some("c".to_string()));
        assert_eq!(order.pop_front(), Some("b".to_string()));
    }

    #[test]
    fn test_iter_size_hint() {
        let mut order = EvictionOrder::default();
        order.push_back("a".to_string());
        order.push_back("b".to_string());

        let mut iter = order.iter();
        assert_eq!(iter.size_hint(), (2, Some(2)));
        iter.next();
        assert_eq!(iter.size_hint(), (1, Some(1)));
    }
}
