//! Thread-safe positional file access (component A).
//!
//! Modeled on `original_source/common/shared_file.hpp`'s `shared_ifile` /
//! `shared_ofile`: a single underlying file guarded by a mutex so that
//! concurrent positional reads (or writes) from multiple streams pointing
//! at the same file never race the file's cursor.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::element::Element;
use crate::error::{Error, Result};

/// Read-only, thread-safe handle over one file, interpreted as a packed
/// array of `T`.
pub struct SharedInputFile {
    path: PathBuf,
    file: Mutex<File>,
    len_elements: u64,
}

impl SharedInputFile {
    pub fn open<T: Element>(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::NotFound(path));
        }
        let file = File::open(&path).map_err(|source| Error::IoOpen {
            path: path.clone(),
            source,
        })?;
        let byte_len = file
            .metadata()
            .map_err(|source| Error::IoOpen {
                path: path.clone(),
                source,
            })?
            .len();
        Ok(SharedInputFile {
            path,
            file: Mutex::new(file),
            len_elements: byte_len / T::SIZE as u64,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File length, in elements.
    pub fn file_size(&self) -> u64 {
        self.len_elements
    }

    /// Read up to `buf.len()` elements starting at `element_offset`,
    /// returning the number of elements actually read. Short reads are
    /// expected at end-of-file and are not an error.
    pub fn read_at<T: Element>(&self, buf: &mut [T], element_offset: u64) -> Result<usize> {
        let mut raw = vec![0u8; buf.len() * T::SIZE];
        let bytes_read = {
            let mut file = self.file.lock().unwrap();
            file.seek(SeekFrom::Start(element_offset * T::SIZE as u64))
                .map_err(|source| Error::IoRead {
                    path: self.path.clone(),
                    offset: element_offset,
                    source,
                })?;
            read_best_effort(&mut file, &mut raw).map_err(|source| Error::IoRead {
                path: self.path.clone(),
                offset: element_offset,
                source,
            })?
        };
        let n = bytes_read / T::SIZE;
        for (i, chunk) in raw[..n * T::SIZE].chunks_exact(T::SIZE).enumerate() {
            buf[i] = T::from_le_bytes(chunk);
        }
        Ok(n)
    }
}

/// Write-only, thread-safe handle over one file.
pub struct SharedOutputFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl SharedOutputFile {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| Error::IoOpen {
                path: path.clone(),
                source,
            })?;
        Ok(SharedOutputFile {
            path,
            file: Mutex::new(file),
        })
    }

    /// Open an existing file for positional writes without truncating it
    /// -- used when a stream writes back into the file it is also reading
    /// from (the combined I/O stream's precondition).
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .open(&path)
            .map_err(|source| Error::IoOpen {
                path: path.clone(),
                source,
            })?;
        Ok(SharedOutputFile {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_at<T: Element>(&self, buf: &[T], element_offset: u64, count: usize) -> Result<()> {
        let mut raw = vec![0u8; count * T::SIZE];
        for (i, x) in buf[..count].iter().enumerate() {
            x.to_le_bytes_into(&mut raw[i * T::SIZE..(i + 1) * T::SIZE]);
        }
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start(element_offset * T::SIZE as u64))
            .map_err(|source| Error::IoWrite {
                path: self.path.clone(),
                offset: element_offset,
                source,
            })?;
        file.write_all(&raw).map_err(|source| Error::IoWrite {
            path: self.path.clone(),
            offset: element_offset,
            source,
        })
    }
}

fn read_best_effort(file: &mut File, raw: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < raw.len() {
        let n = file.read(&mut raw[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("array-ext-sort-shared-file-{}-{}", std::process::id(), name));
        p
    }

    #[test]
    fn write_then_read_roundtrip() {
        let path = tmp_path("roundtrip");
        {
            let out = SharedOutputFile::create(&path).unwrap();
            let data: Vec<i32> = (0..10).collect();
            out.write_at(&data, 0, data.len()).unwrap();
        }
        let input = SharedInputFile::open::<i32>(&path).unwrap();
        assert_eq!(input.file_size(), 10);
        let mut buf = vec![0i32; 10];
        let n = input.read_at(&mut buf, 0).unwrap();
        assert_eq!(n, 10);
        assert_eq!(buf, (0..10).collect::<Vec<_>>());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn short_read_at_eof_is_not_an_error() {
        let path = tmp_path("short-read");
        {
            let out = SharedOutputFile::create(&path).unwrap();
            out.write_at(&[1i32, 2, 3], 0, 3).unwrap();
        }
        let input = SharedInputFile::open::<i32>(&path).unwrap();
        let mut buf = vec![0i32; 8];
        let n = input.read_at(&mut buf, 0).unwrap();
        assert_eq!(n, 3);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_not_found() {
        let path = tmp_path("does-not-exist");
        let err = SharedInputFile::open::<i32>(&path).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
