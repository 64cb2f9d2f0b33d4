//! Error types used by the safe zlib inflate wrapper.

use std::fmt;

/// Type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Error values returned by inflater operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Stream reached `Z_STREAM_END`; treated as success by callers.
    StreamEnd,

    /// A preset dictionary is required before inflation can continue (`Z_NEED_DICT`).
    NeedDict,

    /// Memory allocation failed (`Z_MEM_ERROR`).
    MemError,

    /// Input is corrupt or the gzip/zlib header is invalid (`Z_DATA_ERROR`).
    DataError,

    /// No progress was possible with the current input/output buffers (`Z_BUF_ERROR`).
    BufError,

    /// Invalid arguments or inconsistent stream state (`Z_STREAM_ERROR`).
    StreamError,

    /// The underlying zlib library version is incompatible with the headers used here.
    VersionError,

    /// Fallback for return codes not known to this wrapper.
    Unknown(i32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::StreamEnd => write!(f, "end of stream reached"),
            Error::NeedDict => write!(f, "a preset dictionary is required"),
            Error::MemError => write!(f, "memory allocation failed"),
            Error::DataError => write!(f, "input data is corrupt or has an invalid header"),
            Error::BufError => write!(f, "no progress is possible with the current buffers"),
            Error::StreamError => write!(f, "invalid arguments or inconsistent stream state"),
            Error::VersionError => write!(f, "incompatible zlib library version"),
            Error::Unknown(code) => write!(f, "unknown zlib return code: {code}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Translate a raw zlib return code into an `Error`, given that `Z_OK` has
    /// already been handled by the caller as success.
    pub(crate) fn from_raw(code: i32) -> Error {
        match code {
            libz_sys::Z_STREAM_END => Error::StreamEnd,
            libz_sys::Z_NEED_DICT => Error::NeedDict,
            libz_sys::Z_MEM_ERROR => Error::MemError,
            libz_sys::Z_DATA_ERROR => Error::DataError,
            libz_sys::Z_BUF_ERROR => Error::BufError,
            libz_sys::Z_STREAM_ERROR => Error::StreamError,
            libz_sys::Z_VERSION_ERROR => Error::VersionError,
            other => Error::Unknown(other),
        }
    }

    /// Return the raw zlib return code for this variant.
    pub fn to_raw(self) -> i32 {
        match self {
            Error::StreamEnd => libz_sys::Z_STREAM_END,
            Error::NeedDict => libz_sys::Z_NEED_DICT,
            Error::MemError => libz_sys::Z_MEM_ERROR,
            Error::DataError => libz_sys::Z_DATA_ERROR,
            Error::BufError => libz_sys::Z_BUF_ERROR,
            Error::StreamError => libz_sys::Z_STREAM_ERROR,
            Error::VersionError => libz_sys::Z_VERSION_ERROR,
            Error::Unknown(code) => code,
        }
    }
}

/// Translate a raw zlib return code into a `Result`, treating `Z_OK` (and
/// optionally `Z_STREAM_END`/`Z_BUF_ERROR` via `ok_codes`) as success.
pub(crate) fn result_from_zlib_ret<T>(code: i32, value: T) -> Result<T> {
    if code == libz_sys::Z_OK {
        Ok(value)
    } else {
        Err(Error::from_raw(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_maps_known_codes() {
        let cases = [
            (libz_sys::Z_STREAM_END, Error::StreamEnd),
            (libz_sys::Z_NEED_DICT, Error::NeedDict),
            (libz_sys::Z_MEM_ERROR, Error::MemError),
            (libz_sys::Z_DATA_ERROR, Error::DataError),
            (libz_sys::Z_BUF_ERROR, Error::BufError),
            (libz_sys::Z_STREAM_ERROR, Error::StreamError),
            (libz_sys::Z_VERSION_ERROR, Error::VersionError),
        ];

        for (code, expected) in cases {
            assert_eq!(Error::from_raw(code), expected);
        }
    }

    #[test]
    fn unknown_code_round_trips() {
        let err = Error::from_raw(-12345);
        assert_eq!(err, Error::Unknown(-12345));
        assert_eq!(err.to_raw(), -12345);
    }

    #[test]
    fn result_from_zlib_ret_behavior() {
        assert_eq!(result_from_zlib_ret(libz_sys::Z_OK, 7), Ok(7));
        assert_eq!(
            result_from_zlib_ret::<i32>(libz_sys::Z_DATA_ERROR, 7),
            Err(Error::DataError)
        );
    }
}
