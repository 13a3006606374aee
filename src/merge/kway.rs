//! Component I: k-way merge.
//!
//! Grounded on `original_source/include/sort/external_multiway_merge_sort.hpp`
//! and the teacher's own `internal_merge` in `sort.rs`, which drains a
//! `BinaryHeap` of per-run heads into one output file. This version drives
//! the same shape of merge but through a [`crate::loser_tree::LoserTree`]
//! over a [`crate::stream::pooled::PooledInputStreams`] pool, so all `k`
//! runs share one read-ahead buffer budget instead of each run owning its
//! own double buffer.

use std::sync::Arc;

use crate::element::Element;
use crate::error::Result;
use crate::loser_tree::LoserTree;
use crate::log_sink::LogSink;
use crate::merge::Run;
use crate::shared_file::{SharedInputFile, SharedOutputFile};
use crate::stream::output::OutputStream;
use crate::stream::pooled::PooledInputStreams;

/// Merge every run in `runs` into one ascending-order file at `output_path`.
pub fn merge<T: Element + Send + Sync + 'static>(
    runs: &[Run],
    output_path: &std::path::Path,
    buffer_elements: usize,
    sink: &dyn LogSink,
) -> Result<u64> {
    let files: Vec<Arc<SharedInputFile>> = runs
        .iter()
        .map(|r| SharedInputFile::open::<T>(&r.path).map(Arc::new))
        .collect::<Result<_>>()?;
    let pool_buffers = files.len() + 1;
    let mut pool = PooledInputStreams::<T>::new(files, buffer_elements, pool_buffers)?;

    let mut initial = Vec::with_capacity(runs.len());
    for way in 0..runs.len() {
        initial.push(pool.peek(way)?);
    }
    let mut tree = LoserTree::new(initial);

    let out_file = Arc::new(SharedOutputFile::create(output_path)?);
    let mut out = OutputStream::<T>::new(out_file, buffer_elements);

    let mut written = 0u64;
    while let Some(way) = tree.winner_way() {
        let x = tree.winner_key().expect("winner_way implies a key");
        out.push(x)?;
        written += 1;
        pool.next(way)?;
        let next = pool.peek(way)?;
        tree.replace_winner(next);
    }
    out.flush()?;
    sink.counter("kway_merge.elements_written", written as i64);
    sink.counter("kway_merge.ways", runs.len() as i64);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::NullLogSink;
    use std::path::PathBuf;

    fn tmp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("array-ext-sort-kway-{}-{}", std::process::id(), name));
        p
    }

    fn write_run(path: &std::path::Path, data: &[i32]) {
        let out = SharedOutputFile::create(path).unwrap();
        out.write_at(data, 0, data.len()).unwrap();
    }

    #[test]
    fn merges_several_sorted_runs_into_one_sorted_file() {
        let p1 = tmp_path("r1");
        let p2 = tmp_path("r2");
        let p3 = tmp_path("r3");
        write_run(&p1, &[1, 4, 8, 20]);
        write_run(&p2, &[2, 3, 9]);
        write_run(&p3, &[0, 5, 6, 7, 100]);
        let runs = vec![
            Run { path: p1.clone(), len: 4 },
            Run { path: p2.clone(), len: 3 },
            Run { path: p3.clone(), len: 5 },
        ];
        let out_path = tmp_path("out");
        let sink = NullLogSink;
        let written = merge::<i32>(&runs, &out_path, 4, &sink).unwrap();
        assert_eq!(written, 12);

        let out_file = SharedInputFile::open::<i32>(&out_path).unwrap();
        let mut buf = vec![0i32; 12];
        out_file.read_at(&mut buf, 0).unwrap();
        let mut expected = vec![1, 4, 8, 20, 2, 3, 9, 0, 5, 6, 7, 100];
        expected.sort();
        assert_eq!(buf, expected);

        for p in [p1, p2, p3, out_path] {
            std::fs::remove_file(p).unwrap();
        }
    }
}
