//! Buffered I/O layer (components B, C, D).
//!
//! Three layers sit on top of [`crate::shared_file`]:
//!
//! - [`input`] / [`output`]: a basic synchronous buffered stream, and an
//!   async variant that keeps a second buffer filling (or draining) in the
//!   background one step ahead of the consumer.
//! - [`combined`]: one stream object covering simultaneous forward reads and
//!   backward writes into the *same* file at disjoint offsets, used by
//!   external quicksort's in-place partitioning.
//! - [`pooled`]: a set of k async input streams sharing one aggregate buffer
//!   budget and one background task slot, used by the k-way merge.

pub mod arraybuf;
pub mod combined;
pub mod input;
pub mod output;
pub mod pooled;

/// Default number of elements held in one I/O buffer when a caller doesn't
/// size it explicitly. Matches the teacher's default chunk granularity
/// order of magnitude, translated from bytes to elements at the call site.
pub const DEFAULT_BUFFER_ELEMENTS: usize = 16 * 1024;
