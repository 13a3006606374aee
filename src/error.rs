use std::path::PathBuf;

/// Errors surfaced by the sort engine. Every variant maps to a row in the
/// error table of the design document; there is no local retry, failures
/// are always handed back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("input file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to open {path}: {source}")]
    IoOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("short or failed read at {path}, element offset {offset}: {source}")]
    IoRead {
        path: PathBuf,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("short or failed write at {path}, element offset {offset}: {source}")]
    IoWrite {
        path: PathBuf,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("operation on an empty interval heap")]
    Empty,

    #[error("pooled input stream needs a refill but the free list is empty")]
    NoFreeBuffer,

    #[error("background I/O worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
