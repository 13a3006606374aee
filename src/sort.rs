//! Top-level entry point: `Sort<T>`, a builder mirroring the teacher's
//! `Sort` struct in shape (`Sort::new(..).with_*(..).sort()`), generalized
//! from sorting lines of text to sorting a binary array of fixed-width `T`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::element::Element;
use crate::error::Result;
use crate::log_sink::{LogSink, MemoryLogSink, NullLogSink};
use crate::merge::{huffman, kway, Run};
use crate::replacement_selection::ReplacementSelection;
use crate::shared_file::{SharedInputFile, SharedOutputFile};
use crate::stream::input::InputStream;
use crate::stream::output::OutputStream;
use crate::quicksort;

/// Which algorithm `sort()` runs, and the in-RAM budget it gets.
pub enum Strategy {
    /// Partition in place, recursing down to an in-RAM base case.
    Quicksort { heap_elements: usize },
    /// Form runs with replacement selection, then merge all runs at once
    /// through a loser tree over a shared buffer pool.
    KWayMerge { heap_elements: usize },
    /// Form runs with replacement selection, then merge pairwise in
    /// Huffman-optimal order.
    TwoWayMerge { heap_elements: usize },
}

/// Counters pulled from the log sink after a run, giving the caller the
/// same visibility the teacher's benchmark harness gets from its JSON
/// result row, without this crate owning a CSV/JSON writer itself.
#[derive(Debug, Default, Clone)]
pub struct SortReport {
    pub runs_formed: i64,
    pub elements_written: i64,
    pub in_ram_sorts: i64,
}

pub struct Sort<T: Element> {
    input: PathBuf,
    output: PathBuf,
    buffer_elements: usize,
    strategy: Strategy,
    tmp_dir: PathBuf,
    sink: Option<Arc<dyn LogSink>>,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Element + Send + Sync + 'static> Sort<T> {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Sort {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            buffer_elements: crate::stream::DEFAULT_BUFFER_ELEMENTS,
            strategy: Strategy::KWayMerge {
                heap_elements: crate::stream::DEFAULT_BUFFER_ELEMENTS,
            },
            tmp_dir: std::env::temp_dir(),
            sink: None,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn with_buffer_elements(mut self, buffer_elements: usize) -> Self {
        self.buffer_elements = buffer_elements;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_tmp_dir(mut self, tmp_dir: impl AsRef<Path>) -> Self {
        self.tmp_dir = tmp_dir.as_ref().to_path_buf();
        self
    }

    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn sort(self) -> Result<SortReport> {
        log::info!(
            "sorting {} -> {} with buffer_elements={}",
            self.input.display(),
            self.output.display(),
            self.buffer_elements
        );
        let memory_sink = MemoryLogSink::new();
        let sink: &dyn LogSink = match &self.sink {
            Some(s) => s.as_ref(),
            None => &memory_sink,
        };

        match self.strategy {
            Strategy::Quicksort { heap_elements } => {
                self.run_quicksort(heap_elements, sink)?;
            }
            Strategy::KWayMerge { heap_elements } => {
                self.run_run_then_merge(heap_elements, sink, true)?;
            }
            Strategy::TwoWayMerge { heap_elements } => {
                self.run_run_then_merge(heap_elements, sink, false)?;
            }
        }

        Ok(SortReport {
            runs_formed: memory_sink.get_counter("replacement_selection.runs"),
            elements_written: memory_sink.get_counter("kway_merge.elements_written")
                + memory_sink.get_counter("huffman_merge.elements_moved"),
            in_ram_sorts: memory_sink.get_counter("quicksort.in_ram_sorts"),
        })
    }

    fn run_quicksort(&self, heap_elements: usize, sink: &dyn LogSink) -> Result<()> {
        // Quicksort partitions in place: copy the input into the output
        // file up front, then read and rewrite that same file throughout
        // so every recursive call sees the previous pass's partitioning.
        std::fs::copy(&self.input, &self.output).map_err(|source| crate::error::Error::IoOpen {
            path: self.output.clone(),
            source,
        })?;
        let ifile = Arc::new(SharedInputFile::open::<T>(&self.output)?);
        let ofile = Arc::new(SharedOutputFile::open_existing(&self.output)?);
        let len = ifile.file_size();
        quicksort::sort::<T>(&ifile, &ofile, 0, len, heap_elements, sink)
    }

    fn run_run_then_merge(&self, heap_elements: usize, sink: &dyn LogSink, kway_not_huffman: bool) -> Result<()> {
        let runs = self.form_runs(heap_elements, sink)?;
        if kway_not_huffman {
            kway::merge::<T>(&runs, &self.output, self.buffer_elements, sink)?;
        } else {
            huffman::merge::<T>(&runs, &self.output, self.buffer_elements, &self.tmp_dir, sink)?;
        }
        for run in &runs {
            let _ = std::fs::remove_file(&run.path);
        }
        Ok(())
    }

    fn form_runs(&self, heap_elements: usize, sink: &dyn LogSink) -> Result<Vec<Run>> {
        let ifile = Arc::new(SharedInputFile::open::<T>(&self.input)?);
        let mut input = InputStream::<T>::new(Arc::clone(&ifile), self.buffer_elements);

        let mut rs = ReplacementSelection::<T>::new(heap_elements);
        for _ in 0..heap_elements {
            match input.next()? {
                Some(x) => rs.prime(x),
                None => break,
            }
        }

        let mut runs = Vec::new();
        let mut run_seq = 0u64;
        let mut current_path = self.tmp_dir.join(format!("array-ext-sort-run-{}-{}.bin", std::process::id(), run_seq));
        let mut current_out = OutputStream::<T>::new(Arc::new(SharedOutputFile::create(&current_path)?), self.buffer_elements);
        let mut current_len = 0u64;

        loop {
            let emitted = rs.step(|| input.next(), sink)?;
            match emitted {
                None => break,
                Some(e) => {
                    current_out.push(e.value)?;
                    current_len += 1;
                    if e.run_ends {
                        current_out.flush()?;
                        runs.push(Run {
                            path: current_path.clone(),
                            len: current_len,
                        });
                        run_seq += 1;
                        current_path = self.tmp_dir.join(format!(
                            "array-ext-sort-run-{}-{}.bin",
                            std::process::id(),
                            run_seq
                        ));
                        current_out = OutputStream::<T>::new(Arc::new(SharedOutputFile::create(&current_path)?), self.buffer_elements);
                        current_len = 0;
                    }
                }
            }
        }
        if current_len == 0 {
            let _ = std::fs::remove_file(&current_path);
        }
        log::debug!("formed {} runs from {}", runs.len(), self.input.display());
        Ok(runs)
    }
}
