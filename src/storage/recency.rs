// ============================================================================
// Recency Sequence
// ============================================================================
//
// Slab-backed doubly-linked list. Front is the most recently inserted node,
// back is the oldest and the next eviction victim. Links are slot indices,
// vacated slots are recycled through a free list.

/// Most nodes a list can address; slot positions are `u32`.
pub const MAX_SLOTS: usize = u32::MAX as usize;

/// Position of a node inside the slab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotIdx(u32);

struct Node<T> {
    value: T,
    prev: Option<SlotIdx>,
    next: Option<SlotIdx>,
}

pub struct RecencyList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<u32>,
    head: Option<SlotIdx>,
    tail: Option<SlotIdx>,
    len: usize,
}

impl<T> RecencyList<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Newest node.
    pub fn front(&self) -> Option<SlotIdx> {
        self.head
    }

    /// Oldest node.
    pub fn back(&self) -> Option<SlotIdx> {
        self.tail
    }

    /// Insert at the front and return the new node's slot.
    ///
    /// Callers keep the list at or below [`MAX_SLOTS`] nodes.
    pub fn push_front(&mut self, value: T) -> SlotIdx {
        let idx = self.alloc(value);
        self.link_front(idx);
        self.len += 1;
        idx
    }

    /// Unlink a node and hand back its value. Returns `None` for a vacant slot.
    pub fn remove(&mut self, idx: SlotIdx) -> Option<T> {
        let node = self.slots.get_mut(idx.0 as usize)?.take()?;
        self.relink_neighbours(node.prev, node.next);
        self.free.push(idx.0);
        self.len -= 1;
        Some(node.value)
    }

    pub fn move_to_front(&mut self, idx: SlotIdx) {
        if self.head == Some(idx) {
            return;
        }
        let Some(node) = self.node(idx) else {
            return;
        };
        let (prev, next) = (node.prev, node.next);
        self.relink_neighbours(prev, next);
        self.link_front(idx);
    }

    /// Swap in a new payload, returning the old one.
    pub fn replace(&mut self, idx: SlotIdx, value: T) -> Option<T> {
        let node = self.node_mut(idx)?;
        Some(std::mem::replace(&mut node.value, value))
    }

    pub fn get(&self, idx: SlotIdx) -> Option<&T> {
        self.node(idx).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, idx: SlotIdx) -> Option<&mut T> {
        self.node_mut(idx).map(|n| &mut n.value)
    }

    /// Walk from the oldest node to the newest.
    pub fn iter_oldest(&self) -> OldestFirst<'_, T> {
        OldestFirst {
            list: self,
            current: self.tail,
        }
    }

    /// Walk from the newest node to the oldest.
    pub fn iter_newest(&self) -> NewestFirst<'_, T> {
        NewestFirst {
            list: self,
            current: self.head,
        }
    }

    fn alloc(&mut self, value: T) -> SlotIdx {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        if let Some(free) = self.free.pop() {
            self.slots[free as usize] = Some(node);
            SlotIdx(free)
        } else {
            // free slots are reused first, so `slots.len() < MAX_SLOTS` here
            debug_assert!(self.slots.len() < MAX_SLOTS);
            let raw = self.slots.len() as u32;
            self.slots.push(Some(node));
            SlotIdx(raw)
        }
    }

    fn link_front(&mut self, idx: SlotIdx) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(head) = self.node_mut(h) {
                    head.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn relink_neighbours(&mut self, prev: Option<SlotIdx>, next: Option<SlotIdx>) {
        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    #[inline]
    fn node(&self, idx: SlotIdx) -> Option<&Node<T>> {
        self.slots.get(idx.0 as usize)?.as_ref()
    }

    #[inline]
    fn node_mut(&mut self, idx: SlotIdx) -> Option<&mut Node<T>> {
        self.slots.get_mut(idx.0 as usize)?.as_mut()
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct OldestFirst<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<SlotIdx>,
}

impl<'a, T> Iterator for OldestFirst<'a, T> {
    type Item = (SlotIdx, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.current?;
        let node = self.list.node(idx)?;
        self.current = node.prev;
        Some((idx, &node.value))
    }
}

pub struct NewestFirst<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<SlotIdx>,
}

impl<'a, T> Iterator for NewestFirst<'a, T> {
    type Item = (SlotIdx, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.current?;
        let node = self.list.node(idx)?;
        self.current = node.next;
        Some((idx, &node.value))
    }
}
