//! Data/hole enumeration with `SEEK_DATA` / `SEEK_HOLE`.

use std::fs::File;
use std::io;
use std::path::Path;

/// One data region of a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtentInfo {
    pub logical: u64,
    pub length: u64,
}

impl ExtentInfo {
    pub fn new(logical: u64, length: u64) -> Self {
        Self { logical, length }
    }

    /// One past the last byte.
    pub fn end(&self) -> u64 {
        self.logical + self.length
    }
}

#[cfg(target_os = "linux")]
mod probe {
    use std::fs::File;
    use std::io;
    use std::os::fd::AsRawFd;

    /// `lseek` with `whence`; `Ok(None)` on ENXIO (no more data, or offset at/after EOF).
    fn seek(file: &File, offset: u64, whence: libc::c_int) -> io::Result<Option<u64>> {
        let off = libc::off_t::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset out of range"))?;
        // SAFETY: the descriptor is owned by `file` and stays open for the call.
        let r = unsafe { libc::lseek(file.as_raw_fd(), off, whence) };
        if r < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::ENXIO) {
                return Ok(None);
            }
            return Err(err);
        }
        Ok(Some(r as u64))
    }

    pub fn next_data(file: &File, offset: u64) -> io::Result<Option<u64>> {
        seek(file, offset, libc::SEEK_DATA)
    }

    pub fn next_hole(file: &File, offset: u64) -> io::Result<Option<u64>> {
        seek(file, offset, libc::SEEK_HOLE)
    }
}

#[cfg(not(target_os = "linux"))]
mod probe {
    use std::fs::File;
    use std::io;

    fn unsupported() -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            "hole probing is only implemented on Linux",
        )
    }

    pub fn next_data(_file: &File, _offset: u64) -> io::Result<Option<u64>> {
        Err(unsupported())
    }

    pub fn next_hole(_file: &File, _offset: u64) -> io::Result<Option<u64>> {
        Err(unsupported())
    }
}

pub use probe::{next_data, next_hole};

/// True when the first hole starts before EOF. Empty files are never sparse.
pub fn is_sparse(file: &File) -> io::Result<bool> {
    let end = file.metadata()?.len();
    if end == 0 {
        return Ok(false);
    }
    let hole = next_hole(file, 0)?.unwrap_or(end);
    Ok(hole < end)
}

pub fn is_sparse_file(path: &Path) -> io::Result<bool> {
    is_sparse(&File::open(path)?)
}

/// Start offsets of every hole, in order. A trailing hole counts.
pub fn holes(file: &File) -> io::Result<Vec<u64>> {
    let end = file.metadata()?.len();
    let mut out = Vec::new();
    let mut hole = next_hole(file, 0)?.unwrap_or(end);
    while hole < end {
        out.push(hole);
        match next_data(file, hole)? {
            Some(data) if data < end => hole = next_hole(file, data)?.unwrap_or(end),
            _ => break,
        }
    }
    Ok(out)
}

/// Data regions in order, alternating `SEEK_DATA` / `SEEK_HOLE` from offset 0.
pub fn extents(file: &File) -> io::Result<Vec<ExtentInfo>> {
    let end = file.metadata()?.len();
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < end {
        let data = match next_data(file, pos)? {
            Some(d) if d < end => d,
            _ => break,
        };
        let hole = next_hole(file, data)?.unwrap_or(end).min(end);
        out.push(ExtentInfo::new(data, hole - data));
        pos = hole;
    }
    Ok(out)
}

pub fn scan_holes(path: &Path) -> io::Result<Vec<u64>> {
    holes(&File::open(path)?)
}

pub fn scan_extents(path: &Path) -> io::Result<Vec<ExtentInfo>> {
    extents(&File::open(path)?)
}
