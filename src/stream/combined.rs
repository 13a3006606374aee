//! Component C: combined I/O stream.
//!
//! External quicksort partitions a chunk in place: the low group is read
//! and rewritten forward from the front of the chunk, the high group is
//! read forward but rewritten backward from the tail, and the middle group
//! (elements equal to the pivot) sits in RAM in an interval heap
//! ([`crate::interval_heap`]) until the high/low boundary is known. A single
//! stream object covers all of that over one file, at disjoint,
//! non-overlapping offsets, with four buffers:
//!
//! - `ibuf`: sequential forward reads, advancing `read_offset`.
//! - `lowbuf`: sequential forward writes of the low group, advancing
//!   `low_write_offset`, which always trails `read_offset`.
//! - `obuf`: sequential *backward* writes of the high group, filled
//!   back-to-front and flushed once full, decrementing `write_offset`.
//! - `main`: a single-element scratch buffer used for direct
//!   element-at-a-time reads/writes that don't fit the sequential access
//!   pattern above (e.g. sampling a pivot candidate).
//!
//! Because reads and writes never target overlapping byte ranges at the
//! same time, both buffers can be in flight without synchronizing with each
//! other -- only [`crate::shared_file::SharedInputFile`] /
//! [`crate::shared_file::SharedOutputFile`]'s own positional locking is
//! needed.

use std::sync::Arc;

use crate::element::Element;
use crate::error::Result;
use crate::shared_file::{SharedInputFile, SharedOutputFile};

pub struct CombinedStream<T: Element> {
    ifile: Arc<SharedInputFile>,
    ofile: Arc<SharedOutputFile>,

    start: u64,
    end: u64,

    ibuf: Vec<T>,
    ibuf_pos: usize,
    ibuf_filled: usize,
    read_offset: u64,

    obuf: Vec<T>,
    obuf_pos: usize,
    write_offset: u64,

    lowbuf: Vec<T>,
    lowbuf_filled: usize,
    low_write_offset: u64,

    main: Vec<T>,
}

impl<T: Element> CombinedStream<T> {
    /// `start`/`end` are element offsets delimiting the chunk this stream
    /// partitions; forward reads and low-group writes start at `start`,
    /// high-group writes start at `end` and grow backward.
    pub fn new(
        ifile: Arc<SharedInputFile>,
        ofile: Arc<SharedOutputFile>,
        buffer_elements: usize,
        start: u64,
        end: u64,
    ) -> Self {
        CombinedStream {
            ifile,
            ofile,
            start,
            end,
            ibuf: vec![T::default(); buffer_elements],
            ibuf_pos: 0,
            ibuf_filled: 0,
            read_offset: start,
            obuf: vec![T::default(); buffer_elements],
            obuf_pos: buffer_elements,
            write_offset: end,
            lowbuf: vec![T::default(); buffer_elements],
            lowbuf_filled: 0,
            low_write_offset: start,
            main: vec![T::default(); 1],
        }
    }

    /// Next element reading forward from the front of the chunk.
    pub fn read_forward(&mut self) -> Result<Option<T>> {
        if self.ibuf_pos >= self.ibuf_filled {
            let n = self.ifile.read_at(&mut self.ibuf, self.read_offset)?;
            if n == 0 {
                return Ok(None);
            }
            self.ibuf_filled = n;
            self.ibuf_pos = 0;
            self.read_offset += n as u64;
        }
        let x = self.ibuf[self.ibuf_pos];
        self.ibuf_pos += 1;
        Ok(Some(x))
    }

    /// Queue `x` to be written immediately before the last element written
    /// backward (or the end of the chunk, for the first call).
    pub fn write_backward(&mut self, x: T) -> Result<()> {
        if self.obuf_pos == 0 {
            self.flush_backward()?;
        }
        self.obuf_pos -= 1;
        self.obuf[self.obuf_pos] = x;
        Ok(())
    }

    fn flush_backward(&mut self) -> Result<()> {
        let count = self.obuf.len() - self.obuf_pos;
        if count > 0 {
            self.write_offset -= count as u64;
            self.ofile
                .write_at(&self.obuf[self.obuf_pos..], self.write_offset, count)?;
        }
        self.obuf_pos = self.obuf.len();
        Ok(())
    }

    /// Flush whatever remains buffered backward. Must be called once
    /// partitioning finishes and before the low/middle groups are written
    /// into the space this reclaims.
    pub fn finish_backward(&mut self) -> Result<()> {
        self.flush_backward()
    }

    /// Queue `x` to be written next into the low group, growing forward
    /// from `start`. Safe to interleave with `read_forward` because the
    /// low-write cursor only ever trails the read cursor.
    pub fn write_low(&mut self, x: T) -> Result<()> {
        if self.lowbuf_filled == self.lowbuf.len() {
            self.flush_low()?;
        }
        self.lowbuf[self.lowbuf_filled] = x;
        self.lowbuf_filled += 1;
        Ok(())
    }

    fn flush_low(&mut self) -> Result<()> {
        if self.lowbuf_filled > 0 {
            self.ofile
                .write_at(&self.lowbuf, self.low_write_offset, self.lowbuf_filled)?;
            self.low_write_offset += self.lowbuf_filled as u64;
            self.lowbuf_filled = 0;
        }
        Ok(())
    }

    pub fn finish_low(&mut self) -> Result<()> {
        self.flush_low()
    }

    /// Offset immediately after the last element written into the low
    /// group. Valid only after [`Self::finish_low`].
    pub fn low_end(&self) -> u64 {
        self.low_write_offset
    }

    /// Offset of the first element written into the high group. Valid only
    /// after [`Self::finish_backward`].
    pub fn high_start(&self) -> u64 {
        self.write_offset
    }

    pub fn chunk_bounds(&self) -> (u64, u64) {
        (self.start, self.end)
    }

    /// Read a single element directly at `offset`, bypassing `ibuf`.
    pub fn read_at(&mut self, offset: u64) -> Result<T> {
        let n = self.ifile.read_at(&mut self.main, offset)?;
        debug_assert_eq!(n, 1);
        Ok(self.main[0])
    }

    /// Write a single element directly at `offset`, bypassing `obuf`.
    pub fn write_at(&mut self, offset: u64, x: T) -> Result<()> {
        self.main[0] = x;
        self.ofile.write_at(&self.main, offset, 1)
    }

    /// Offset the next forward read will return.
    pub fn read_offset(&self) -> u64 {
        self.read_offset - (self.ibuf_filled - self.ibuf_pos) as u64
    }

    /// Offset immediately after the last element written backward so far.
    pub fn write_offset(&self) -> u64 {
        self.write_offset - (self.obuf.len() - self.obuf_pos) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tmp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("array-ext-sort-combined-{}-{}", std::process::id(), name));
        p
    }

    #[test]
    fn forward_read_and_backward_write_share_one_file_without_colliding() {
        let path = tmp_path("basic");
        let data: Vec<i32> = (0..40).collect();
        {
            let out = SharedOutputFile::create(&path).unwrap();
            out.write_at(&data, 0, data.len()).unwrap();
        }
        let ifile = Arc::new(SharedInputFile::open::<i32>(&path).unwrap());
        let ofile = Arc::new(SharedOutputFile::open_existing(&path).unwrap());
        let mut stream = CombinedStream::new(Arc::clone(&ifile), Arc::clone(&ofile), 8, 0, 40);

        // Read the first half forward, rewrite the second half backward,
        // negated, without the two ranges ever overlapping.
        let mut front = Vec::new();
        for _ in 0..20 {
            front.push(stream.read_forward().unwrap().unwrap());
        }
        for i in (20..40).rev() {
            stream.write_backward(-(i as i32)).unwrap();
        }
        stream.finish_backward().unwrap();

        assert_eq!(front, (0..20).collect::<Vec<_>>());

        let mut buf = vec![0i32; 20];
        ifile.read_at(&mut buf, 20).unwrap();
        assert_eq!(buf, (20..40).map(|i| -i).collect::<Vec<_>>());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn low_and_high_groups_partition_a_chunk_without_overlapping() {
        let path = tmp_path("three-way");
        let data: Vec<i32> = vec![5, 1, 5, 9, 1, 5, 8, 1];
        {
            let out = SharedOutputFile::create(&path).unwrap();
            out.write_at(&data, 0, data.len()).unwrap();
        }
        let ifile = Arc::new(SharedInputFile::open::<i32>(&path).unwrap());
        let ofile = Arc::new(SharedOutputFile::open_existing(&path).unwrap());
        let mut stream = CombinedStream::new(Arc::clone(&ifile), Arc::clone(&ofile), 4, 0, data.len() as u64);

        let pivot = 5;
        let mut middle_count = 0;
        while let Some(x) = stream.read_forward().unwrap() {
            if x < pivot {
                stream.write_low(x).unwrap();
            } else if x > pivot {
                stream.write_backward(x).unwrap();
            } else {
                middle_count += 1;
            }
        }
        stream.finish_low().unwrap();
        stream.finish_backward().unwrap();

        assert_eq!(middle_count, 3);
        assert!(stream.low_end() <= stream.high_start());
        std::fs::remove_file(&path).unwrap();
    }
}
