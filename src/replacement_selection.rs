//! Component G: k-way replacement-selection merge's run-forming half.
//!
//! Grounded on `original_source/include/sort/replacement_selection.hpp`.
//! Replacement selection holds `M` elements in RAM (an
//! [`crate::interval_heap::IntervalHeap`]) and repeatedly emits the
//! smallest of them, replacing it with the next input element. If that new
//! element is smaller than the one just emitted, it cannot belong to the
//! run being built -- it is tagged for the *next* run instead, and stays in
//! the heap without being compared against the current run's watermark
//! again. On average this produces runs roughly twice the size of the
//! in-RAM heap, which is what lets the k-way merge (component I) start from
//! fewer, longer runs than a plain in-RAM-sort-and-flush would.

use crate::element::Element;
use crate::error::Result;
use crate::interval_heap::IntervalHeap;
use crate::log_sink::LogSink;

/// An element tagged with which run it belongs to. Only ever lives in RAM;
/// the `Element` impl exists so it can sit in an `IntervalHeap`, not so it
/// can be written to disk (`to_le_bytes_into`/`from_le_bytes` drop the tag).
#[derive(Clone, Copy, Debug)]
struct Tagged<T: Element> {
    run: u64,
    key: T,
}

impl<T: Element> Default for Tagged<T> {
    fn default() -> Self {
        Tagged {
            run: 0,
            key: T::default(),
        }
    }
}

impl<T: Element> Element for Tagged<T> {
    const SIZE: usize = T::SIZE;

    fn from_le_bytes(bytes: &[u8]) -> Self {
        Tagged {
            run: 0,
            key: T::from_le_bytes(bytes),
        }
    }

    fn to_le_bytes_into(&self, bytes: &mut [u8]) {
        self.key.to_le_bytes_into(bytes);
    }

    fn key_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.run.cmp(&other.run).then_with(|| self.key.key_cmp(&other.key))
    }
}

/// One emitted element, paired with whether it closes out the run it came
/// from (the heap's next-smallest element belongs to a later run, or the
/// input and heap are both exhausted).
pub struct Emitted<T: Element> {
    pub value: T,
    pub run_ends: bool,
}

pub struct ReplacementSelection<T: Element> {
    heap: IntervalHeap<Tagged<T>>,
    capacity: usize,
    current_run: u64,
    last_emitted: Option<T>,
    input_exhausted: bool,
}

impl<T: Element> ReplacementSelection<T> {
    pub fn new(capacity: usize) -> Self {
        ReplacementSelection {
            heap: IntervalHeap::with_capacity(capacity),
            capacity,
            current_run: 0,
            last_emitted: None,
            input_exhausted: false,
        }
    }

    /// Feed one more input element before the heap is full. Used only
    /// during the initial fill.
    pub fn prime(&mut self, x: T) {
        self.heap.push(Tagged { run: self.current_run, key: x });
    }

    pub fn is_primed(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    fn accept(&mut self, x: T) {
        let belongs_to_current = match self.last_emitted {
            None => true,
            Some(last) => x.key_cmp(&last) != std::cmp::Ordering::Less,
        };
        let run = if belongs_to_current {
            self.current_run
        } else {
            self.current_run + 1
        };
        self.heap.push(Tagged { run, key: x });
    }

    /// Pop the next element to emit, pulling one more element from `next_input`
    /// (a closure the caller provides, typically an [`crate::stream::input`]
    /// stream's `next()`) to replace it. Returns `None` once both the heap
    /// and the input are exhausted.
    pub fn step<F>(&mut self, mut next_input: F, sink: &dyn LogSink) -> Result<Option<Emitted<T>>>
    where
        F: FnMut() -> Result<Option<T>>,
    {
        let Some(popped) = self.heap.pop_min() else {
            return Ok(None);
        };
        self.last_emitted = Some(popped.key);

        if !self.input_exhausted {
            match next_input()? {
                Some(x) => self.accept(x),
                None => {
                    self.input_exhausted = true;
                    sink.counter("replacement_selection.input_exhausted", 1);
                }
            }
        }

        let run_ends = match self.heap.peek_min() {
            Some(next) => next.run != popped.run,
            None => true,
        };
        if run_ends {
            sink.counter("replacement_selection.runs", 1);
            self.current_run = popped.run + 1;
        }

        Ok(Some(Emitted {
            value: popped.key,
            run_ends,
        }))
    }
}
