//! Component F: interval heap, a double-ended priority queue.
//!
//! Grounded on `original_source/proj2/interval_heap.hpp`: elements are
//! grouped into nodes of two, each holding a `(min, max)` interval, with
//! the heap invariant that a child node's interval nests inside its
//! parent's. That gives O(1) peek-min/peek-max and O(log n)
//! push/pop-min/pop-max, which replacement selection (component G) needs
//! to hold the in-RAM run while popping the smallest eligible element and
//! comparing candidates against the largest element already emitted.
//!
//! Storage: node `n` occupies `data[2n]` (its min slot) and, if present,
//! `data[2n + 1]` (its max slot); a node with only a min slot is the last
//! node when the heap holds an odd number of elements.

use crate::element::Element;

fn node_of(data_index: usize) -> usize {
    data_index / 2
}

fn min_slot(node: usize) -> usize {
    node * 2
}

fn max_slot(node: usize) -> usize {
    node * 2 + 1
}

fn parent_node(node: usize) -> Option<usize> {
    if node == 0 {
        None
    } else {
        Some((node - 1) / 2)
    }
}

fn left_child_node(node: usize) -> usize {
    2 * node + 1
}

fn right_child_node(node: usize) -> usize {
    2 * node + 2
}

pub struct IntervalHeap<T: Element> {
    data: Vec<T>,
}

impl<T: Element> IntervalHeap<T> {
    pub fn new() -> Self {
        IntervalHeap { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        IntervalHeap {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn peek_min(&self) -> Option<T> {
        self.data.first().copied()
    }

    pub fn peek_max(&self) -> Option<T> {
        match self.data.len() {
            0 => None,
            1 => Some(self.data[0]),
            _ => Some(self.data[1]),
        }
    }

    fn lt(&self, a: T, b: T) -> bool {
        a.key_cmp(&b) == std::cmp::Ordering::Less
    }

    fn has(&self, slot: usize) -> bool {
        slot < self.data.len()
    }

    pub fn push(&mut self, x: T) {
        self.data.push(x);
        let idx = self.data.len() - 1;
        let node = node_of(idx);

        if idx == min_slot(node) && !self.has(max_slot(node)) {
            // Lone min slot of a brand-new node: settle against the parent
            // node's interval in whichever direction it lands.
            self.settle_new_node_single(node);
            return;
        }

        // idx is the max slot of an existing node; restore min <= max
        // within the node, then bubble whichever end moved.
        let min_idx = min_slot(node);
        if self.lt(self.data[idx], self.data[min_idx]) {
            self.data.swap(idx, min_idx);
        }
        self.bubble_min(node);
        self.bubble_max(node);
    }

    fn settle_new_node_single(&mut self, node: usize) {
        let Some(parent) = parent_node(node) else {
            return;
        };
        let idx = min_slot(node);
        if self.has(max_slot(parent)) {
            if self.lt(self.data[idx], self.data[min_slot(parent)]) {
                self.data.swap(idx, min_slot(parent));
                self.bubble_min(parent);
            } else if self.lt(self.data[max_slot(parent)], self.data[idx]) {
                self.data.swap(idx, max_slot(parent));
                self.bubble_max(parent);
            }
        } else if self.lt(self.data[idx], self.data[min_slot(parent)]) {
            self.data.swap(idx, min_slot(parent));
            self.bubble_min(parent);
        }
    }

    fn bubble_min(&mut self, mut node: usize) {
        while let Some(parent) = parent_node(node) {
            if self.lt(self.data[min_slot(node)], self.data[min_slot(parent)]) {
                self.data.swap(min_slot(node), min_slot(parent));
                node = parent;
            } else {
                break;
            }
        }
    }

    fn bubble_max(&mut self, mut node: usize) {
        while let Some(parent) = parent_node(node) {
            if !self.has(max_slot(node)) {
                break;
            }
            let parent_max = if self.has(max_slot(parent)) {
                max_slot(parent)
            } else {
                min_slot(parent)
            };
            if self.lt(self.data[parent_max], self.data[max_slot(node)]) {
                self.data.swap(max_slot(node), parent_max);
                node = parent;
            } else {
                break;
            }
        }
    }

    pub fn pop_min(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }
        let result = self.data[0];
        let last = self.data.pop().unwrap();
        if !self.data.is_empty() {
            self.data[0] = last;
            self.trickle_down_min(0);
        }
        Some(result)
    }

    pub fn pop_max(&mut self) -> Option<T> {
        if self.data.len() <= 1 {
            return self.pop_min();
        }
        let result = self.data[1];
        let last_idx = self.data.len() - 1;
        let last = self.data.pop().unwrap();
        if last_idx != 1 {
            self.data[1] = last;
            self.fixup_after_max_replace(0);
            self.trickle_down_max(0);
        }
        Some(result)
    }

    /// After overwriting a node's max slot with an arbitrary value, restore
    /// the node-local `min <= max` invariant before trickling down.
    fn fixup_after_max_replace(&mut self, node: usize) {
        if self.has(max_slot(node)) && self.lt(self.data[max_slot(node)], self.data[min_slot(node)]) {
            self.data.swap(min_slot(node), max_slot(node));
        }
    }

    fn trickle_down_min(&mut self, mut node: usize) {
        loop {
            let l = left_child_node(node);
            let r = right_child_node(node);
            let mut smallest_node = node;
            if self.has(min_slot(l)) && self.lt(self.data[min_slot(l)], self.data[min_slot(smallest_node)]) {
                smallest_node = l;
            }
            if self.has(min_slot(r)) && self.lt(self.data[min_slot(r)], self.data[min_slot(smallest_node)]) {
                smallest_node = r;
            }
            if smallest_node == node {
                break;
            }
            self.data.swap(min_slot(node), min_slot(smallest_node));
            if self.has(max_slot(smallest_node))
                && self.lt(self.data[max_slot(smallest_node)], self.data[min_slot(smallest_node)])
            {
                self.data.swap(min_slot(smallest_node), max_slot(smallest_node));
            }
            node = smallest_node;
        }
    }

    fn trickle_down_max(&mut self, mut node: usize) {
        loop {
            let l = left_child_node(node);
            let r = right_child_node(node);
            let mut largest_node = node;
            let cur = if self.has(max_slot(largest_node)) {
                max_slot(largest_node)
            } else {
                min_slot(largest_node)
            };
            let mut largest_slot = cur;

            if self.has(max_slot(l)) && self.lt(self.data[largest_slot], self.data[max_slot(l)]) {
                largest_node = l;
                largest_slot = max_slot(l);
            } else if !self.has(max_slot(l)) && self.has(min_slot(l)) && self.lt(self.data[largest_slot], self.data[min_slot(l)]) {
                largest_node = l;
                largest_slot = min_slot(l);
            }
            if self.has(max_slot(r)) && self.lt(self.data[largest_slot], self.data[max_slot(r)]) {
                largest_node = r;
                largest_slot = max_slot(r);
            } else if !self.has(max_slot(r)) && self.has(min_slot(r)) && self.lt(self.data[largest_slot], self.data[min_slot(r)]) {
                largest_node = r;
                largest_slot = min_slot(r);
            }

            if largest_node == node {
                break;
            }
            self.data.swap(cur, largest_slot);
            self.fixup_after_max_replace(largest_node);
            node = largest_node;
        }
    }
}

impl<T: Element> Default for IntervalHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}
