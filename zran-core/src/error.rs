//! Error types for the indexed gzip random-access engine.

use thiserror::Error;

/// Specialized `Result` type for `zran-core` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`crate::driver::Driver`] and the index it maintains.
///
/// Once a driver returns [`Error::CorruptData`], [`Error::CrcMismatch`], or
/// [`Error::SizeMismatch`], it transitions to its `Failed` state and every
/// subsequent call returns the same error (see `driver::State`).
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying zlib inflater reported a format or allocation error.
    #[error("corrupt deflate/gzip data: {0}")]
    CorruptData(#[source] inflate_safe::Error),

    /// A gzip member's trailing CRC32 did not match the decoded data.
    #[error("CRC32 mismatch: expected {expected:#010x}, computed {actual:#010x}")]
    CrcMismatch {
        /// CRC32 recorded in the member trailer.
        expected: u32,
        /// CRC32 computed over the decoded member.
        actual: u32,
    },

    /// A gzip member's trailing ISIZE did not match the decoded length mod 2^32.
    #[error("ISIZE mismatch: expected {expected:#010x}, computed {actual:#010x}")]
    SizeMismatch {
        /// ISIZE recorded in the member trailer.
        expected: u32,
        /// Decoded length of the member, mod 2^32.
        actual: u32,
    },

    /// I/O failure from the compressed-byte source.
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// The requested range is not covered by the index and index growth is
    /// disallowed (`Options::auto_build` is `false` and no full build ran).
    #[error("requested range is not covered by the index")]
    NotCovered,

    /// No usable OS handle was available and re-opening it failed
    /// (`drop_handles` mode).
    #[error("no usable file handle: {0}")]
    NoHandle(#[source] std::io::Error),

    /// The on-disk index format is not recognised or violates an invariant
    /// on import (bad magic, out-of-order points, oversized window, ...).
    #[error("invalid index format: {0}")]
    InvalidIndex(String),

    /// The driver has already failed; every subsequent call returns this,
    /// carrying the rendered message of the error that poisoned it (stored
    /// as text since the poisoning error may wrap a non-`Clone` `io::Error`).
    #[error("driver is in a failed state: {0}")]
    Poisoned(String),
}

impl Error {
    /// Whether this error transitions the driver to its terminal `Failed`
    /// state. Only [`Error::NotCovered`] is purely advisory and leaves the
    /// driver usable.
    pub(crate) fn poisons_driver(&self) -> bool {
        !matches!(self, Error::NotCovered)
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        let kind = match &err {
            Error::Io(e) => e.kind(),
            Error::NoHandle(e) => e.kind(),
            Error::NotCovered => std::io::ErrorKind::Unsupported,
            Error::CorruptData(_) | Error::CrcMismatch { .. } | Error::SizeMismatch { .. } => {
                std::io::ErrorKind::InvalidData
            }
            Error::InvalidIndex(_) => std::io::ErrorKind::InvalidInput,
            Error::Poisoned(_) => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}

impl From<inflate_safe::Error> for Error {
    fn from(err: inflate_safe::Error) -> Self {
        Error::CorruptData(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(mut err: std::io::Error) -> Self {
        let is_handle_unavailable = err
            .get_ref()
            .is_some_and(|e| e.is::<crate::source::HandleUnavailable>());
        if is_handle_unavailable {
            if let Some(marker) = err
                .get_mut()
                .and_then(|e| e.downcast_mut::<crate::source::HandleUnavailable>())
            {
                let inner = std::mem::replace(
                    &mut marker.0,
                    std::io::Error::from(std::io::ErrorKind::Other),
                );
                return Error::NoHandle(inner);
            }
        }
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::HandleUnavailable;

    #[test]
    fn handle_unavailable_io_error_converts_to_no_handle() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, HandleUnavailable(source));

        match Error::from(io_err) {
            Error::NoHandle(inner) => assert_eq!(inner.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected Error::NoHandle, got {other:?}"),
        }
    }

    #[test]
    fn ordinary_io_error_stays_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        assert!(matches!(Error::from(io_err), Error::Io(_)));
    }
}
