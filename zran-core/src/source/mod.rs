//! Abstracts "where compressed bytes come from" behind a uniform interface,
//! the way `inflate-safe`'s FFI layer abstracts "how bytes get inflated".
//!
//! Two backends: [`SeekableSource`] (a file handle, memory map, or any
//! `Read + Seek`, with an optional lazy-reopen "drop handles" mode) and
//! [`CallbackSource`] (an opaque caller-provided `Read + Seek`, boxed so the
//! driver can hold it across calls).

mod callback;
mod seekable;

pub use callback::CallbackSource;
pub use seekable::{ReopenFn, SeekableSource};

use std::fmt;
use std::io;

/// Wraps an I/O error that occurred while re-opening a handle closed by
/// `drop_handles` mode, after the retry budget was exhausted. `crate::error`
/// downcasts this out of an `io::Error`'s inner source to surface
/// `Error::NoHandle` distinctly from an ordinary `Error::Io`.
#[derive(Debug)]
pub(crate) struct HandleUnavailable(pub io::Error);

impl fmt::Display for HandleUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no usable file handle: {}", self.0)
    }
}

impl std::error::Error for HandleUnavailable {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Uniform view over a compressed byte source, seekable or not.
///
/// All random-access resumption (seeking to an access point) requires
/// seekability; see `driver::Driver` for how `build_full_index` tolerates a
/// forward-only source while `pread` does not.
pub trait SourceAdapter: Send {
    /// Read up to `buf.len()` bytes, returning the number actually read (0
    /// at EOF, matching `std::io::Read`).
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Reposition the source to an absolute compressed byte offset.
    fn seek(&mut self, pos: u64) -> io::Result<()>;

    /// The source's current absolute byte offset.
    fn tell(&mut self) -> io::Result<u64>;

    /// Total size of the source, if known up front.
    fn size_hint(&self) -> Option<u64>;

    /// Whether this source can seek to arbitrary previously-visited offsets
    /// cheaply enough to be used for `pread`/random-access resumption.
    fn is_seekable(&self) -> bool {
        true
    }
}
