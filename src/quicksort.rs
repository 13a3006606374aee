//! Component J: external quicksort.
//!
//! Grounded on `original_source/include/sort/external_quick_sort.hpp`.
//! Partitioning happens in place over one file region, three-way (Dutch
//! national flag) rather than two-way, since fixed-width numeric keys often
//! repeat: elements less than the pivot are rewritten forward from the
//! front of the region, elements greater are rewritten backward from the
//! tail (via [`crate::stream::combined::CombinedStream`]'s low/high
//! buffers), and elements equal to the pivot sit in RAM in an
//! [`crate::interval_heap::IntervalHeap`] until the low/high boundary is
//! known, at which point they fill the gap between the two groups
//! directly. Once a sub-region is small enough to fit one buffer, it is
//! loaded into an [`crate::stream::arraybuf::ArrayBuf`], sorted in RAM, and
//! written back -- the recursion's base case.

use std::sync::Arc;

use crate::element::Element;
use crate::error::Result;
use crate::log_sink::LogSink;
use crate::shared_file::{SharedInputFile, SharedOutputFile};
use crate::stream::arraybuf::ArrayBuf;
use crate::stream::combined::CombinedStream;
use crate::interval_heap::IntervalHeap;

/// Sort the element range `[start, end)` of a file in place.
pub fn sort<T: Element>(
    ifile: &Arc<SharedInputFile>,
    ofile: &Arc<SharedOutputFile>,
    start: u64,
    end: u64,
    buffer_elements: usize,
    sink: &dyn LogSink,
) -> Result<()> {
    if end <= start + 1 {
        return Ok(());
    }
    let len = (end - start) as usize;
    if len <= buffer_elements {
        sort_in_ram(ifile, ofile, start, len, sink)?;
        return Ok(());
    }

    let pivot = sample_pivot(ifile, start, end)?;
    let mut stream = CombinedStream::<T>::new(
        Arc::clone(ifile),
        Arc::clone(ofile),
        buffer_elements,
        start,
        end,
    );
    let mut middle: IntervalHeap<T> = IntervalHeap::new();

    while let Some(x) = stream.read_forward()? {
        match x.key_cmp(&pivot) {
            std::cmp::Ordering::Less => stream.write_low(x)?,
            std::cmp::Ordering::Greater => stream.write_backward(x)?,
            std::cmp::Ordering::Equal => middle.push(x),
        }
    }
    stream.finish_low()?;
    stream.finish_backward()?;

    let low_end = stream.low_end();
    let high_start = stream.high_start();
    sink.counter("quicksort.partitions", 1);
    sink.counter("quicksort.middle_group_size", middle.len() as i64);

    // Fill the gap between the two groups with the pivot-equal elements;
    // their relative order doesn't matter, they all compare equal.
    let mut offset = low_end;
    let mut fill_buf = Vec::with_capacity(middle.len());
    while let Some(x) = middle.pop_min() {
        fill_buf.push(x);
    }
    if !fill_buf.is_empty() {
        ofile.write_at(&fill_buf, offset, fill_buf.len())?;
        offset += fill_buf.len() as u64;
    }
    debug_assert_eq!(offset, high_start);

    sort::<T>(ifile, ofile, start, low_end, buffer_elements, sink)?;
    sort::<T>(ifile, ofile, high_start, end, buffer_elements, sink)?;
    Ok(())
}

fn sample_pivot<T: Element>(ifile: &Arc<SharedInputFile>, start: u64, end: u64) -> Result<T> {
    let mid = start + (end - start) / 2;
    let mut one = vec![T::default(); 1];
    ifile.read_at(&mut one, start)?;
    let a = one[0];
    ifile.read_at(&mut one, mid)?;
    let b = one[0];
    ifile.read_at(&mut one, end - 1)?;
    let c = one[0];
    Ok(median_of_three(a, b, c))
}

fn median_of_three<T: Element>(a: T, b: T, c: T) -> T {
    use std::cmp::Ordering::*;
    match (a.key_cmp(&b), b.key_cmp(&c), a.key_cmp(&c)) {
        (Less, Less, _) | (Greater, Greater, _) => b,
        (Less, _, Less) | (Greater, _, Greater) => c,
        _ => a,
    }
}

fn sort_in_ram<T: Element>(
    ifile: &Arc<SharedInputFile>,
    ofile: &Arc<SharedOutputFile>,
    start: u64,
    len: usize,
    sink: &dyn LogSink,
) -> Result<()> {
    let mut buf = vec![T::default(); len];
    ifile.read_at(&mut buf, start)?;
    let mut array = ArrayBuf::from_vec(buf);
    array
        .as_mut_slice()
        .sort_unstable_by(|a, b| a.key_cmp(b));
    ofile.write_at(array.as_slice(), start, len)?;
    sink.counter("quicksort.in_ram_sorts", 1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::NullLogSink;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use std::path::PathBuf;

    fn tmp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("array-ext-sort-quicksort-{}-{}", std::process::id(), name));
        p
    }

    #[test]
    fn sorts_a_chunk_larger_than_the_buffer() {
        let path = tmp_path("basic");
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let mut data: Vec<i32> = (0..500).collect();
        data.shuffle(&mut rng);
        {
            let out = SharedOutputFile::create(&path).unwrap();
            out.write_at(&data, 0, data.len()).unwrap();
        }
        let ifile = Arc::new(SharedInputFile::open::<i32>(&path).unwrap());
        let ofile = Arc::new(SharedOutputFile::open_existing(&path).unwrap());
        let sink = NullLogSink;
        sort::<i32>(&ifile, &ofile, 0, data.len() as u64, 32, &sink).unwrap();

        let mut buf = vec![0i32; data.len()];
        ifile.read_at(&mut buf, 0).unwrap();
        assert_eq!(buf, (0..500).collect::<Vec<_>>());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn sorts_data_with_many_repeated_keys() {
        let path = tmp_path("dupes");
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut data: Vec<i32> = (0..300).map(|x| x % 5).collect();
        data.shuffle(&mut rng);
        {
            let out = SharedOutputFile::create(&path).unwrap();
            out.write_at(&data, 0, data.len()).unwrap();
        }
        let ifile = Arc::new(SharedInputFile::open::<i32>(&path).unwrap());
        let ofile = Arc::new(SharedOutputFile::open_existing(&path).unwrap());
        let sink = NullLogSink;
        sort::<i32>(&ifile, &ofile, 0, data.len() as u64, 16, &sink).unwrap();

        let mut buf = vec![0i32; data.len()];
        ifile.read_at(&mut buf, 0).unwrap();
        let mut expected = data;
        expected.sort();
        assert_eq!(buf, expected);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn chunk_smaller_than_buffer_goes_through_the_in_ram_base_case() {
        let path = tmp_path("small");
        let data: Vec<i32> = vec![3, 1, 4, 1, 5, 9, 2, 6];
        {
            let out = SharedOutputFile::create(&path).unwrap();
            out.write_at(&data, 0, data.len()).unwrap();
        }
        let ifile = Arc::new(SharedInputFile::open::<i32>(&path).unwrap());
        let ofile = Arc::new(SharedOutputFile::open_existing(&path).unwrap());
        let sink = NullLogSink;
        sort::<i32>(&ifile, &ofile, 0, data.len() as u64, 64, &sink).unwrap();

        let mut buf = vec![0i32; data.len()];
        ifile.read_at(&mut buf, 0).unwrap();
        let mut expected = data;
        expected.sort();
        assert_eq!(buf, expected);
        std::fs::remove_file(&path).unwrap();
    }
}
