//! Component B: buffered input streams.

use std::sync::Arc;

use crate::background::Task;
use crate::element::Element;
use crate::error::Result;
use crate::shared_file::SharedInputFile;

/// A synchronous, single-buffer sequential reader over a [`SharedInputFile`].
/// Refills happen on the caller's thread, at the point `next()` finds the
/// buffer empty.
pub struct InputStream<T: Element> {
    file: Arc<SharedInputFile>,
    buffer: Vec<T>,
    pos: usize,
    filled: usize,
    next_offset: u64,
    exhausted: bool,
}

impl<T: Element> InputStream<T> {
    pub fn new(file: Arc<SharedInputFile>, buffer_elements: usize) -> Self {
        InputStream {
            file,
            buffer: vec![T::default(); buffer_elements],
            pos: 0,
            filled: 0,
            next_offset: 0,
            exhausted: false,
        }
    }

    /// Open a stream starting at a given element offset, e.g. one way of a
    /// chunked quicksort partition.
    pub fn with_offset(file: Arc<SharedInputFile>, buffer_elements: usize, offset: u64) -> Self {
        let mut stream = Self::new(file, buffer_elements);
        stream.next_offset = offset;
        stream
    }

    fn refill(&mut self) -> Result<()> {
        let n = self.file.read_at(&mut self.buffer, self.next_offset)?;
        self.pos = 0;
        self.filled = n;
        self.next_offset += n as u64;
        if n == 0 {
            self.exhausted = true;
        }
        Ok(())
    }

    /// Pull the next element, or `None` once the underlying file is
    /// exhausted. This is the `Exhausted` control-flow signal from spec.md
    /// §7 -- a normal end of iteration, not an error.
    pub fn next(&mut self) -> Result<Option<T>> {
        if self.pos >= self.filled {
            if self.exhausted {
                return Ok(None);
            }
            self.refill()?;
            if self.filled == 0 {
                return Ok(None);
            }
        }
        let x = self.buffer[self.pos];
        self.pos += 1;
        Ok(Some(x))
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.pos >= self.filled
    }
}

/// A double-buffered input stream: while the consumer drains buffer A, a
/// background task reads buffer B's worth of data ahead, so refilling never
/// blocks on disk I/O except on the very first read. At most one background
/// task is outstanding at a time, and it owns the spare buffer outright
/// while it runs (moved in, moved back out on join).
pub struct AsyncInputStream<T: Element> {
    file: Arc<SharedInputFile>,
    buffer_elements: usize,
    current: Vec<T>,
    pos: usize,
    filled: usize,
    next_offset: u64,
    pending: Option<Task<(Vec<T>, usize, u64)>>,
    exhausted: bool,
}

impl<T: Element> AsyncInputStream<T> {
    pub fn new(file: Arc<SharedInputFile>, buffer_elements: usize) -> Self
    where
        T: Send + Sync + 'static,
    {
        let mut stream = AsyncInputStream {
            file: Arc::clone(&file),
            buffer_elements,
            current: vec![T::default(); buffer_elements],
            pos: 0,
            filled: 0,
            next_offset: 0,
            pending: None,
            exhausted: false,
        };
        stream.kick_off(0);
        stream
    }

    fn kick_off(&mut self, offset: u64)
    where
        T: Send + Sync + 'static,
    {
        let file = Arc::clone(&self.file);
        let n = self.buffer_elements;
        self.pending = Some(Task::spawn(move || {
            let mut buf = vec![T::default(); n];
            let read = file.read_at(&mut buf, offset).unwrap_or(0);
            (buf, read, offset + read as u64)
        }));
    }

    fn refill(&mut self) -> Result<()>
    where
        T: Send + Sync + 'static,
    {
        let task = self
            .pending
            .take()
            .expect("async input stream always has an outstanding task while not exhausted");
        let (buf, n, next_offset) = task.join()?;
        self.current = buf;
        self.pos = 0;
        self.filled = n;
        self.next_offset = next_offset;
        if n == 0 {
            self.exhausted = true;
        } else {
            self.kick_off(next_offset);
        }
        Ok(())
    }

    pub fn next(&mut self) -> Result<Option<T>>
    where
        T: Send + Sync + 'static,
    {
        if self.pos >= self.filled {
            if self.exhausted {
                return Ok(None);
            }
            self.refill()?;
            if self.filled == 0 {
                return Ok(None);
            }
        }
        let x = self.current[self.pos];
        self.pos += 1;
        Ok(Some(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_file::SharedOutputFile;
    use std::path::PathBuf;

    fn tmp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("array-ext-sort-input-stream-{}-{}", std::process::id(), name));
        p
    }

    #[test]
    fn synchronous_stream_reads_every_element_in_order() {
        let path = tmp_path("sync");
        let data: Vec<i32> = (0..1000).collect();
        {
            let out = SharedOutputFile::create(&path).unwrap();
            out.write_at(&data, 0, data.len()).unwrap();
        }
        let file = Arc::new(SharedInputFile::open::<i32>(&path).unwrap());
        let mut stream = InputStream::new(file, 64);
        let mut seen = Vec::new();
        while let Some(x) = stream.next().unwrap() {
            seen.push(x);
        }
        assert_eq!(seen, data);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn async_stream_reads_every_element_in_order() {
        let path = tmp_path("async");
        let data: Vec<i64> = (0..2000).map(|x| x * 3).collect();
        {
            let out = SharedOutputFile::create(&path).unwrap();
            out.write_at(&data, 0, data.len()).unwrap();
        }
        let file = Arc::new(SharedInputFile::open::<i64>(&path).unwrap());
        let mut stream = AsyncInputStream::new(file, 128);
        let mut seen = Vec::new();
        while let Some(x) = stream.next().unwrap() {
            seen.push(x);
        }
        assert_eq!(seen, data);
        std::fs::remove_file(&path).unwrap();
    }
}
