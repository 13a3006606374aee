//! External-memory sort for large binary arrays of fixed-width numeric
//! elements.
//!
//! ```no_run
//! use array_ext_sort::{Sort, Strategy};
//!
//! # fn main() -> Result<(), array_ext_sort::Error> {
//! let report = Sort::<i64>::new("unsorted.bin", "sorted.bin")
//!     .with_buffer_elements(1 << 16)
//!     .with_strategy(Strategy::KWayMerge { heap_elements: 1 << 20 })
//!     .with_tmp_dir(std::env::temp_dir())
//!     .sort()?;
//! println!("formed {} runs", report.runs_formed);
//! # Ok(())
//! # }
//! ```
//!
//! Three strategies are available through [`Strategy`]: an in-place
//! external quicksort, a replacement-selection-plus-k-way-merge, and a
//! replacement-selection-plus-two-way-Huffman-merge. All three read and
//! write arrays of a fixed-width [`Element`] type directly, with no framing
//! or delimiters -- the file is just the elements, packed little-endian.

pub(crate) mod background;
pub mod element;
pub mod error;
pub mod interval_heap;
pub mod log_sink;
pub mod loser_tree;
pub mod merge;
pub mod quicksort;
pub mod replacement_selection;
pub mod shared_file;
pub mod sort;
pub mod stream;

pub use element::Element;
pub use error::{Error, Result};
pub use sort::{Sort, SortReport, Strategy};
