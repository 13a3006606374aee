//! Component D: a pool of input streams sharing one buffer budget and at
//! most one outstanding background read across the whole pool.
//!
//! The k-way merge ([`crate::merge::kway`]) holds one way per run being
//! merged. Giving each way its own double buffer would need `2k` buffers in
//! RAM; instead all ways draw from one free list sized independently of
//! `k`, and only the way judged most likely to run out next gets the single
//! background refill slot. This mirrors
//! `original_source/include/bufio/pooled_ifbufsteam.hpp`'s `collect_allocate`:
//! a single linear scan over the ways that still have a queued buffer,
//! tracking the running minimum of "the last element of that way's back
//! buffer" -- the way with the smallest such value is the one the merge
//! will drain first, so it is refilled first.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::background::Task;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::shared_file::SharedInputFile;

struct Way<T: Element> {
    file: Arc<SharedInputFile>,
    queue: VecDeque<(Vec<T>, usize)>,
    pos: usize,
    next_offset: u64,
    eof: bool,
}

impl<T: Element> Way<T> {
    fn last_buffered_element(&self) -> Option<T> {
        let (buf, filled) = self.queue.back()?;
        if *filled == 0 {
            None
        } else {
            Some(buf[*filled - 1])
        }
    }

    fn needs_refill(&self) -> bool {
        !self.eof && self.queue.len() < 2
    }
}

pub struct PooledInputStreams<T: Element> {
    ways: Vec<Way<T>>,
    free: Vec<Vec<T>>,
    buffer_elements: usize,
    pending: Option<(usize, Task<(Vec<T>, usize, u64)>)>,
}

impl<T: Element> PooledInputStreams<T>
where
    T: Send + Sync + 'static,
{
    /// `pool_buffers` is the total number of buffers shared across all
    /// ways; it is typically `ways.len() + 1` so that every way can have
    /// one buffer in hand plus one way can be mid-refill.
    pub fn new(files: Vec<Arc<SharedInputFile>>, buffer_elements: usize, pool_buffers: usize) -> Result<Self> {
        let ways = files
            .into_iter()
            .map(|file| Way {
                file,
                queue: VecDeque::new(),
                pos: 0,
                next_offset: 0,
                eof: false,
            })
            .collect::<Vec<_>>();
        let free = (0..pool_buffers).map(|_| vec![T::default(); buffer_elements]).collect();
        let mut pool = PooledInputStreams {
            ways,
            free,
            buffer_elements,
            pending: None,
        };
        // Prime every way with one buffer synchronously so the merge can
        // compare heads immediately.
        for i in 0..pool.ways.len() {
            pool.fill_one(i)?;
        }
        pool.pump()?;
        Ok(pool)
    }

    fn fill_one(&mut self, way: usize) -> Result<()> {
        let mut buf = self.free.pop().ok_or(Error::NoFreeBuffer)?;
        let n = self.ways[way].file.read_at(&mut buf, self.ways[way].next_offset)?;
        self.ways[way].next_offset += n as u64;
        if n == 0 {
            self.ways[way].eof = true;
            self.free.push(buf);
        } else {
            self.ways[way].queue.push_back((buf, n));
        }
        Ok(())
    }

    /// Pick the way most in need of a refill: among ways lacking a
    /// readahead buffer and not at EOF, the one whose back buffer ends in
    /// the smallest element (the one the merge will exhaust soonest).
    fn collect_allocate(&self) -> Option<usize> {
        let mut best: Option<(usize, T)> = None;
        for (i, way) in self.ways.iter().enumerate() {
            if !way.needs_refill() {
                continue;
            }
            let Some(last) = way.last_buffered_element() else {
                return Some(i);
            };
            match &best {
                None => best = Some((i, last)),
                Some((_, best_last)) => {
                    if last.key_cmp(best_last) == std::cmp::Ordering::Less {
                        best = Some((i, last));
                    }
                }
            }
        }
        best.map(|(i, _)| i)
    }

    fn pump(&mut self) -> Result<()> {
        if self.pending.is_some() {
            return Ok(());
        }
        let Some(way) = self.collect_allocate() else {
            return Ok(());
        };
        let Some(buf) = self.free.pop() else {
            return Ok(());
        };
        let file = Arc::clone(&self.ways[way].file);
        let offset = self.ways[way].next_offset;
        self.pending = Some((
            way,
            Task::spawn(move || {
                let mut buf = buf;
                let n = file.read_at(&mut buf, offset).unwrap_or(0);
                (buf, n, offset + n as u64)
            }),
        ));
        Ok(())
    }

    fn settle_pending_for(&mut self, way: usize) -> Result<()> {
        if matches!(&self.pending, Some((w, _)) if *w == way) {
            let (_, task) = self.pending.take().unwrap();
            let (buf, n, next_offset) = task.join()?;
            self.ways[way].next_offset = next_offset;
            if n == 0 {
                self.ways[way].eof = true;
                self.free.push(buf);
            } else {
                self.ways[way].queue.push_back((buf, n));
            }
        }
        Ok(())
    }

    /// Peek the next element of `way` without consuming it.
    pub fn peek(&mut self, way: usize) -> Result<Option<T>> {
        self.ensure_front(way)?;
        let w = &self.ways[way];
        match w.queue.front() {
            Some((buf, filled)) if w.pos < *filled => Ok(Some(buf[w.pos])),
            _ => Ok(None),
        }
    }

    /// Consume and return the next element of `way`.
    pub fn next(&mut self, way: usize) -> Result<Option<T>> {
        self.ensure_front(way)?;
        let w = &mut self.ways[way];
        let ready = matches!(w.queue.front(), Some((_, filled)) if w.pos < *filled);
        if !ready {
            return Ok(None);
        }
        let x = {
            let (buf, _) = w.queue.front().unwrap();
            buf[w.pos]
        };
        w.pos += 1;
        let exhausted_front = matches!(w.queue.front(), Some((_, filled)) if w.pos >= *filled);
        if exhausted_front {
            let (buf, _) = w.queue.pop_front().unwrap();
            self.free.push(buf);
            w.pos = 0;
        }
        self.pump()?;
        Ok(Some(x))
    }

    fn ensure_front(&mut self, way: usize) -> Result<()> {
        self.settle_pending_for(way)?;
        if self.ways[way].queue.is_empty() && !self.ways[way].eof {
            self.fill_one(way)?;
        }
        self.pump()
    }
}
