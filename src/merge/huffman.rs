//! Component H: two-way Huffman-optimal merge.
//!
//! Grounded on `original_source/include/sort/external_twoway_merge_sort.hpp`.
//! Merging is always pairwise, but *which* pairs merge first is chosen the
//! way Huffman coding picks which symbols to combine first: the two
//! shortest runs are merged, the result is fed back in as one run of
//! combined length, and this repeats until one run is left. That minimizes
//! total bytes moved across all merge passes, the same optimality argument
//! that makes Huffman coding produce a minimum-redundancy prefix code.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::element::Element;
use crate::error::Result;
use crate::log_sink::LogSink;
use crate::merge::Run;
use crate::shared_file::{SharedInputFile, SharedOutputFile};
use crate::stream::input::InputStream;
use crate::stream::output::OutputStream;

fn merge_two<T: Element>(
    a_path: &Path,
    b_path: &Path,
    out_path: &Path,
    buffer_elements: usize,
) -> Result<u64> {
    let a_file = Arc::new(SharedInputFile::open::<T>(a_path)?);
    let b_file = Arc::new(SharedInputFile::open::<T>(b_path)?);
    let mut a = InputStream::<T>::new(a_file, buffer_elements);
    let mut b = InputStream::<T>::new(b_file, buffer_elements);

    let out_file = Arc::new(SharedOutputFile::create(out_path)?);
    let mut out = OutputStream::<T>::new(out_file, buffer_elements);

    let mut head_a = a.next()?;
    let mut head_b = b.next()?;
    let mut written = 0u64;
    loop {
        match (head_a, head_b) {
            (Some(x), Some(y)) => {
                if x.key_cmp(&y) != std::cmp::Ordering::Greater {
                    out.push(x)?;
                    head_a = a.next()?;
                } else {
                    out.push(y)?;
                    head_b = b.next()?;
                }
                written += 1;
            }
            (Some(x), None) => {
                out.push(x)?;
                written += 1;
                head_a = a.next()?;
            }
            (None, Some(y)) => {
                out.push(y)?;
                written += 1;
                head_b = b.next()?;
            }
            (None, None) => break,
        }
    }
    out.flush()?;
    Ok(written)
}

/// Merge every run in `runs` into one ascending-order file at `output_path`,
/// using `tmp_dir` to hold intermediate pairwise-merge results.
pub fn merge<T: Element>(
    runs: &[Run],
    output_path: &Path,
    buffer_elements: usize,
    tmp_dir: &Path,
    sink: &dyn LogSink,
) -> Result<u64> {
    assert!(!runs.is_empty(), "huffman merge needs at least one run");

    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();
    let mut paths: Vec<PathBuf> = Vec::with_capacity(runs.len());
    for (i, r) in runs.iter().enumerate() {
        heap.push(Reverse((r.len, i)));
        paths.push(r.path.clone());
    }

    if runs.len() == 1 {
        std::fs::copy(&paths[0], output_path).map_err(|source| crate::error::Error::IoOpen {
            path: output_path.to_path_buf(),
            source,
        })?;
        return Ok(runs[0].len);
    }

    let mut scratch_seq = 0u64;
    let mut owned_scratch: Vec<PathBuf> = Vec::new();

    while heap.len() > 1 {
        let Reverse((len_a, ia)) = heap.pop().unwrap();
        let Reverse((len_b, ib)) = heap.pop().unwrap();

        let is_final = heap.is_empty();
        let dest = if is_final {
            output_path.to_path_buf()
        } else {
            scratch_seq += 1;
            let p = tmp_dir.join(format!("huffman-merge-{}-{}.bin", std::process::id(), scratch_seq));
            owned_scratch.push(p.clone());
            p
        };

        let written = merge_two::<T>(&paths[ia], &paths[ib], &dest, buffer_elements)?;
        sink.counter("huffman_merge.pairwise_merges", 1);
        sink.counter("huffman_merge.elements_moved", written as i64);

        let new_index = paths.len();
        paths.push(dest);
        heap.push(Reverse((len_a + len_b, new_index)));
    }

    for p in owned_scratch {
        let _ = std::fs::remove_file(p);
    }

    let total = runs.iter().map(|r| r.len).sum();
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::NullLogSink;

    fn tmp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("array-ext-sort-huffman-{}-{}", std::process::id(), name));
        p
    }

    fn write_run(path: &Path, data: &[i32]) {
        let out = SharedOutputFile::create(path).unwrap();
        out.write_at(data, 0, data.len()).unwrap();
    }

    #[test]
    fn merges_several_runs_of_different_lengths() {
        let tmp_dir = std::env::temp_dir();
        let p1 = tmp_path("r1");
        let p2 = tmp_path("r2");
        let p3 = tmp_path("r3");
        let p4 = tmp_path("r4");
        write_run(&p1, &[1, 9]);
        write_run(&p2, &[2, 3, 5, 11, 13]);
        write_run(&p3, &[0, 4]);
        write_run(&p4, &[6, 7, 8, 10, 12, 20]);
        let runs = vec![
            Run { path: p1.clone(), len: 2 },
            Run { path: p2.clone(), len: 5 },
            Run { path: p3.clone(), len: 2 },
            Run { path: p4.clone(), len: 6 },
        ];
        let out_path = tmp_path("out");
        let sink = NullLogSink;
        let total = merge::<i32>(&runs, &out_path, 4, &tmp_dir, &sink).unwrap();
        assert_eq!(total, 15);

        let out_file = SharedInputFile::open::<i32>(&out_path).unwrap();
        let mut buf = vec![0i32; 15];
        out_file.read_at(&mut buf, 0).unwrap();
        assert_eq!(buf, (0..=13).chain(std::iter::once(20)).collect::<Vec<_>>());

        for p in [p1, p2, p3, p4, out_path] {
            std::fs::remove_file(p).unwrap();
        }
    }

    #[test]
    fn single_run_is_copied_verbatim() {
        let p1 = tmp_path("single");
        write_run(&p1, &[3, 1, 4]);
        let runs = vec![Run { path: p1.clone(), len: 3 }];
        let out_path = tmp_path("single-out");
        let sink = NullLogSink;
        let total = merge::<i32>(&runs, &out_path, 4, &std::env::temp_dir(), &sink).unwrap();
        assert_eq!(total, 3);
        let out_file = SharedInputFile::open::<i32>(&out_path).unwrap();
        let mut buf = vec![0i32; 3];
        out_file.read_at(&mut buf, 0).unwrap();
        assert_eq!(buf, vec![3, 1, 4]);
        std::fs::remove_file(p1).unwrap();
        std::fs::remove_file(out_path).unwrap();
    }
}
