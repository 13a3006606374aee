//! Component B: buffered output streams.

use std::sync::Arc;

use crate::background::Task;
use crate::element::Element;
use crate::error::Result;
use crate::shared_file::SharedOutputFile;

/// A synchronous, single-buffer sequential writer.
pub struct OutputStream<T: Element> {
    file: Arc<SharedOutputFile>,
    buffer: Vec<T>,
    filled: usize,
    next_offset: u64,
}

impl<T: Element> OutputStream<T> {
    pub fn new(file: Arc<SharedOutputFile>, buffer_elements: usize) -> Self {
        OutputStream {
            file,
            buffer: vec![T::default(); buffer_elements],
            filled: 0,
            next_offset: 0,
        }
    }

    pub fn push(&mut self, x: T) -> Result<()> {
        self.buffer[self.filled] = x;
        self.filled += 1;
        if self.filled == self.buffer.len() {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if self.filled > 0 {
            self.file.write_at(&self.buffer, self.next_offset, self.filled)?;
            self.next_offset += self.filled as u64;
            self.filled = 0;
        }
        Ok(())
    }
}

/// A double-buffered output stream: the caller fills `current` while a
/// background task flushes the previous buffer. At most one flush is
/// outstanding; `push` blocks on it only if the caller fills a second
/// buffer before the first flush has finished.
pub struct AsyncOutputStream<T: Element> {
    file: Arc<SharedOutputFile>,
    current: Vec<T>,
    filled: usize,
    next_offset: u64,
    pending: Option<Task<Result<()>>>,
}

impl<T: Element> AsyncOutputStream<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(file: Arc<SharedOutputFile>, buffer_elements: usize) -> Self {
        AsyncOutputStream {
            file,
            current: vec![T::default(); buffer_elements],
            filled: 0,
            next_offset: 0,
            pending: None,
        }
    }

    fn wait_for_pending(&mut self) -> Result<()> {
        if let Some(task) = self.pending.take() {
            task.join()??;
        }
        Ok(())
    }

    pub fn push(&mut self, x: T) -> Result<()> {
        self.current[self.filled] = x;
        self.filled += 1;
        if self.filled == self.current.len() {
            self.flush()?;
        }
        Ok(())
    }

    /// Hand the full buffer to a background writer and swap in a fresh one,
    /// waiting first for any previous flush to land.
    pub fn flush(&mut self) -> Result<()> {
        if self.filled == 0 {
            return Ok(());
        }
        self.wait_for_pending()?;
        let to_write = std::mem::replace(&mut self.current, vec![T::default(); self.filled.max(1)]);
        let count = self.filled;
        let offset = self.next_offset;
        let file = Arc::clone(&self.file);
        self.pending = Some(Task::spawn(move || file.write_at(&to_write, offset, count)));
        self.next_offset += count as u64;
        self.filled = 0;
        Ok(())
    }

    /// Flush any partial buffer and wait for the last background write to
    /// complete. Must be called before the stream (and its file) are
    /// dropped.
    pub fn close(&mut self) -> Result<()> {
        self.flush()?;
        self.wait_for_pending()
    }
}
