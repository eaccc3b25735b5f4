//! A doubly linked list that flattens all its nodes onto a Vec for storage.
//! Each bucket of the hash table owns one of these as its collision chain.

use crate::error::TableError;

/// Alias for the index of a node in the linked list's storage vec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeHandle(usize);

/// A node that lives in a linked list.
#[derive(Copy, Clone)]
struct Node<T>
where
    T: Copy,
{
    /// The value being stored.
    value: T,

    /// The node towards the head, if this isn't the head.
    prev: Option<NodeHandle>,

    /// The node towards the tail, if this isn't the tail.
    next: Option<NodeHandle>,
}

/// A linked list whose nodes live in a single contiguous Vec and are addressed
/// by their position in it. Removed slots go on a freelist and are reused by
/// later pushes; there is no compaction, the table rebuilds its chains from
/// scratch on every resize instead.
///
/// Handing a NodeHandle out of the list is what makes removal O(1): the table
/// finds the node once and then unlinks it without walking the chain again.
pub(crate) struct LinkedList<T>
where
    T: Copy,
{
    /// The nodes in the list, live and freed alike.
    store: Vec<Node<T>>,

    /// Slots in the store which aren't in use anymore. These will be reused.
    free: Vec<NodeHandle>,

    /// The first node in the list.
    head: Option<NodeHandle>,

    /// The last node in the list.
    tail: Option<NodeHandle>,
}

/// Walks a list from head to tail.
#[derive(Clone)]
pub(crate) struct Iter<'a, T>
where
    T: Copy,
{
    list: &'a LinkedList<T>,
    cursor: Option<NodeHandle>,
}

/// Walks a list from tail to head.
#[cfg(test)]
#[derive(Clone)]
pub(crate) struct RevIter<'a, T>
where
    T: Copy,
{
    list: &'a LinkedList<T>,
    cursor: Option<NodeHandle>,
}

impl<T> LinkedList<T>
where
    T: Copy,
{
    /// Creates an empty list. Nothing is allocated until the first push.
    pub(crate) fn new() -> Self {
        Self {
            store: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// The length of this linked list.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.store.len() - self.free.len()
    }

    /// Gets an element from the list.
    pub(crate) fn get(&self, node: NodeHandle) -> Option<&T> {
        self.store.get(node.0).map(|node| &node.value)
    }

    /// Gets a mutable reference to an element in the list.
    pub(crate) fn get_mut(&mut self, node: NodeHandle) -> Option<&mut T> {
        self.store.get_mut(node.0).map(|node| &mut node.value)
    }

    /// Pushes t onto the front of the list and returns a handle to the node.
    pub(crate) fn push(&mut self, t: T) -> Result<NodeHandle, TableError> {
        // use the first available location in the storage vec, or grow it by
        // one slot if nothing is on the freelist.
        let idx = match self.free.pop() {
            Some(idx) => idx,
            None => {
                self.store.try_reserve(1)?;
                // the freelist must be able to hold every slot so that
                // remove_node never has to allocate
                let wanted = self.store.len() + 1;
                self.free.try_reserve(wanted - self.free.len())?;
                NodeHandle(self.store.len())
            }
        };

        let n = Node {
            value: t,
            prev: None,
            next: self.head,
        };

        match self.head {
            Some(head) => self.store[head.0].prev = Some(idx),
            None => self.tail = Some(idx),
        }

        self.head = Some(idx);

        if self.store.len() <= idx.0 {
            self.store.push(n);
        } else {
            self.store[idx.0] = n;
        }

        Ok(idx)
    }

    /// Remove an arbitrary node from the list, returning its value. The handle
    /// must belong to this list and must not have been removed already.
    pub(crate) fn remove_node(&mut self, node: NodeHandle) -> T {
        let Node { value, prev, next } = self.store[node.0];

        match (prev, next) {
            // the only node: the list becomes empty
            (None, None) => {
                self.head = None;
                self.tail = None;
            }
            // the head: its successor takes over
            (None, Some(next)) => {
                self.store[next.0].prev = None;
                self.head = Some(next);
            }
            // the tail: its predecessor takes over
            (Some(prev), None) => {
                self.store[prev.0].next = None;
                self.tail = Some(prev);
            }
            (Some(prev), Some(next)) => {
                self.store[prev.0].next = Some(next);
                self.store[next.0].prev = Some(prev);
            }
        }

        // the slot gets overwritten at some later push
        self.free.push(node);

        value
    }

    /// Finds the first node from the head whose value satisfies `pred`.
    pub(crate) fn find<P>(&self, pred: P) -> Option<NodeHandle>
    where
        P: Fn(&T) -> bool,
    {
        let mut cursor = self.head;

        while let Some(idx) = cursor {
            let node = &self.store[idx.0];
            if pred(&node.value) {
                return Some(idx);
            }
            cursor = node.next;
        }

        None
    }

    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    #[cfg(test)]
    pub(crate) fn iter_rev(&self) -> RevIter<'_, T> {
        RevIter {
            list: self,
            cursor: self.tail,
        }
    }

    /// Clears this linked list. Does not free the underlying buffers.
    pub(crate) fn clear(&mut self) {
        self.store.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    /// Walks the list in both directions and checks both walks agree with
    /// each other and with len().
    #[cfg(test)]
    pub(crate) fn continuity_test(&self) {
        let mut forward = Vec::new();
        let mut cursor = self.head;
        let mut last = None;

        while let Some(idx) = cursor {
            assert!(forward.len() < self.len(), "forward walk runs past len");
            assert_eq!(last, self.store[idx.0].prev, "back-link mismatch");
            forward.push(idx);
            last = Some(idx);
            cursor = self.store[idx.0].next;
        }

        assert_eq!(self.len(), forward.len());
        assert_eq!(self.tail, last);

        let mut backward = Vec::new();
        cursor = self.tail;

        while let Some(idx) = cursor {
            assert!(backward.len() < self.len(), "reverse walk runs past len");
            backward.push(idx);
            cursor = self.store[idx.0].prev;
        }

        backward.reverse();
        assert_eq!(forward, backward);
    }
}

impl<'a, T> Iterator for Iter<'a, T>
where
    T: Copy,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = &self.list.store[idx.0];
        self.cursor = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
impl<'a, T> Iterator for RevIter<'a, T>
where
    T: Copy,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = &self.list.store[idx.0];
        self.cursor = node.prev;
        Some(&node.value)
    }
}
