//! Thin wrappers around the raw zlib FFI calls used by the safe API.

use std::ffi::CStr;
use std::os::raw::c_int;

use crate::error::{result_from_zlib_ret, Result};
use crate::stream::Stream;

/// `ZLIB_VERSION` as a NUL-terminated C string, required by `inflateInit2_`'s
/// ABI-versioning parameter.
fn zlib_version() -> *const std::os::raw::c_char {
    // SAFETY: zlibVersion() returns a pointer to a static, NUL-terminated string
    // owned by the zlib library; it is valid for the lifetime of the process.
    unsafe { libz_sys::zlibVersion() }
}

/// Initialise a raw inflate stream with `inflateInit2_`.
///
/// `window_bits` follows zlib's convention: 8..=15 for a raw zlib/deflate
/// stream, or `window_bits + 16` for gzip auto-detection/decoding.
pub(crate) fn inflate_init2(stream: &mut Stream, window_bits: i32) -> Result<()> {
    // SAFETY: `stream` points to a zeroed, valid `z_stream`; `zlib_version()`
    // and `size_of::<z_stream>()` satisfy inflateInit2_'s ABI check.
    let ret = unsafe {
        libz_sys::inflateInit2_(
            stream.raw_mut(),
            window_bits as c_int,
            zlib_version(),
            std::mem::size_of::<libz_sys::z_stream>() as c_int,
        )
    };
    result_from_zlib_ret(ret, ())
}

/// Call `inflate` with the given flush mode.
pub(crate) fn inflate(stream: &mut Stream, flush: i32) -> c_int {
    // SAFETY: `stream` was initialised by `inflate_init2` and is not yet ended.
    unsafe { libz_sys::inflate(stream.raw_mut(), flush) }
}

/// Finalise a stream with `inflateEnd`.
pub(crate) fn inflate_end(stream: &mut Stream) {
    // SAFETY: `stream` was initialised by `inflate_init2`; `inflateEnd` is
    // idempotent-safe to call once per initialised stream.
    unsafe {
        libz_sys::inflateEnd(stream.raw_mut());
    }
}

/// Reset a stream for a new member/window-bits via `inflateReset2`.
pub(crate) fn inflate_reset2(stream: &mut Stream, window_bits: i32) -> Result<()> {
    // SAFETY: `stream` was initialised by `inflate_init2`.
    let ret = unsafe { libz_sys::inflateReset2(stream.raw_mut(), window_bits as c_int) };
    result_from_zlib_ret(ret, ())
}

/// Prime the low `bits` bits of the stream's bit buffer with `value`, via
/// `inflatePrime`. Used to resume mid-byte at a captured `bit_offset`.
pub(crate) fn inflate_prime(stream: &mut Stream, bits: i32, value: i32) -> Result<()> {
    // SAFETY: `stream` was initialised by `inflate_init2`.
    let ret = unsafe { libz_sys::inflatePrime(stream.raw_mut(), bits as c_int, value as c_int) };
    result_from_zlib_ret(ret, ())
}

/// Install a preset dictionary (sliding window) via `inflateSetDictionary`.
pub(crate) fn inflate_set_dictionary(stream: &mut Stream, dictionary: &[u8]) -> Result<()> {
    // SAFETY: `dictionary` is a valid slice for the duration of this call;
    // zlib copies it internally and keeps no reference afterwards.
    let ret = unsafe {
        libz_sys::inflateSetDictionary(
            stream.raw_mut(),
            dictionary.as_ptr(),
            dictionary.len() as u32,
        )
    };
    result_from_zlib_ret(ret, ())
}

/// Read back the current sliding window via `inflateGetDictionary`.
///
/// Returns the number of bytes written into `out`, which must be at least
/// 32 KiB to hold the full DEFLATE window.
pub(crate) fn inflate_get_dictionary(stream: &mut Stream, out: &mut [u8]) -> Result<usize> {
    let mut len: u32 = 0;
    // SAFETY: `out` is valid for `out.len()` bytes; zlib writes at most that
    // many bytes and stores the actual length in `len`.
    let ret = unsafe { libz_sys::inflateGetDictionary(stream.raw_mut(), out.as_mut_ptr(), &mut len) };
    result_from_zlib_ret(ret, len as usize)
}

/// Returns the NUL-terminated zlib version string as a UTF-8 `&str`, for
/// diagnostics. Falls back to a placeholder if zlib reports non-UTF8.
#[allow(dead_code)]
pub(crate) fn zlib_version_str() -> &'static str {
    // SAFETY: the returned pointer is valid and NUL-terminated for the
    // lifetime of the process, per zlibVersion()'s contract.
    unsafe { CStr::from_ptr(zlib_version()) }
        .to_str()
        .unwrap_or("unknown")
}
