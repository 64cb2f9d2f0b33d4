//! Safe, block-boundary-aware wrapper around raw zlib inflate.
//!
//! This is the "inflater adapter" primitive an indexed-gzip engine is built
//! on: it can report exactly where a DEFLATE block ends (`inflate`'s
//! `Z_BLOCK` flush mode), report the decoder's bit-level position within the
//! compressed stream, snapshot/restore the 32 KiB sliding window, and prime
//! a fresh decoder with residual bits left over from a previous byte. None
//! of this is exposed by the high-level `flate2`/`miniz_oxide` APIs, which
//! is why this crate talks to zlib directly through `libz-sys`.

mod mode;

#[cfg(test)]
mod tests;

pub use mode::Mode;

use crate::error::{Error, Result};
use crate::ffi;
use crate::stream::Stream;

/// The DEFLATE sliding window is fixed at 32 KiB by the format.
pub const WINDOW_SIZE: usize = 32 * 1024;

/// Outcome of a single [`Inflater::inflate`] call, beyond the byte count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateStatus {
    /// The input buffer was fully consumed; feed more with [`Inflater::set_input`].
    NeedInput,
    /// Inflation stopped exactly at a deflate block boundary.
    ///
    /// This is the only point at which the current decoder state (bit
    /// position + sliding window) may be captured for later resumption.
    BlockEnd,
    /// The current gzip/zlib member's data has been fully decoded.
    StreamEnd,
    /// Progress was made but neither a block boundary nor the stream end was
    /// reached (typically because the output buffer filled up mid-block).
    Continue,
}

/// Result of a single [`Inflater::inflate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InflateStep {
    /// Number of bytes written into the caller's output buffer this call.
    pub produced: usize,
    /// Status signalled by this call.
    pub status: InflateStatus,
}

/// A resumable DEFLATE inflater, limited to sampling and resuming state at
/// block boundaries (no in-block resumption; see the module's crate docs).
pub struct Inflater {
    stream: Stream,
    mode: Mode,
    /// True once `inflateInit2_` has run; guards `Drop` from calling
    /// `inflateEnd` on a stream that was never initialised.
    initialised: bool,
}

impl Inflater {
    /// Initialise a new inflater in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemError`] if zlib cannot allocate its internal
    /// state, or [`Error::VersionError`] if the linked zlib is ABI
    /// incompatible with the headers `libz-sys` was built against.
    pub fn init(mode: Mode) -> Result<Self> {
        let mut stream = Stream::zeroed();
        ffi::inflate_init2(&mut stream, mode.window_bits())?;
        Ok(Self {
            stream,
            mode,
            initialised: true,
        })
    }

    /// Feed more compressed bytes to the inflater.
    ///
    /// `input` must remain valid (the inflater only reads from it during
    /// [`Inflater::inflate`] calls made before the next `set_input`).
    pub fn set_input(&mut self, input: &[u8]) {
        self.stream.set_next_input(input);
    }

    /// Bytes of the last input buffer not yet consumed.
    pub fn avail_in(&self) -> usize {
        self.stream.avail_in()
    }

    /// Decode into `out`, stopping at the next block boundary, stream end,
    /// input exhaustion, or output exhaustion — whichever comes first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataError`] on corrupt input, [`Error::NeedDict`] if
    /// a preset dictionary must be installed via [`Inflater::set_dictionary`]
    /// before inflation can continue, or other zlib error codes.
    pub fn inflate(&mut self, out: &mut [u8]) -> Result<InflateStep> {
        let out_len = out.len();
        self.stream.set_next_out(out);

        let avail_in_before = self.stream.avail_in();
        let avail_out_before = self.stream.avail_out();

        let ret = ffi::inflate(&mut self.stream, libz_sys::Z_BLOCK);
        let produced = avail_out_before - self.stream.avail_out();
        debug_assert!(produced <= out_len);

        match ret {
            libz_sys::Z_OK => {
                let status = if self.at_block_boundary() {
                    InflateStatus::BlockEnd
                } else if self.stream.avail_in() == 0 && avail_in_before > 0 {
                    InflateStatus::NeedInput
                } else {
                    InflateStatus::Continue
                };
                Ok(InflateStep { produced, status })
            }
            libz_sys::Z_STREAM_END => Ok(InflateStep {
                produced,
                status: InflateStatus::StreamEnd,
            }),
            libz_sys::Z_BUF_ERROR => {
                // No progress was possible: either input or output was
                // exhausted before any bytes could be produced or consumed.
                if self.stream.avail_in() == 0 {
                    Ok(InflateStep {
                        produced,
                        status: InflateStatus::NeedInput,
                    })
                } else {
                    Ok(InflateStep {
                        produced,
                        status: InflateStatus::Continue,
                    })
                }
            }
            other => Err(Error::from_raw(other)),
        }
    }

    /// True if the last `inflate` call stopped exactly at a deflate block
    /// boundary (zlib's `data_type & 0x80`, excluding the "last block" bit
    /// combination that instead means stream end was also reached).
    fn at_block_boundary(&self) -> bool {
        self.stream.data_type() & 0x80 != 0
    }

    /// The decoder's current position in the compressed input: the number of
    /// input bytes fully consumed, and the count of bits from the byte just
    /// before that position which belong to the next (partially decoded)
    /// code. Only meaningful immediately after a [`InflateStatus::BlockEnd`].
    pub fn stream_position_bits(&self) -> (u64, u8) {
        let bits = (self.stream.data_type() & 0x07) as u8;
        (self.stream.total_in(), bits)
    }

    /// Total compressed bytes consumed so far in this member.
    pub fn total_in(&self) -> u64 {
        self.stream.total_in()
    }

    /// Total uncompressed bytes produced so far in this member.
    pub fn total_out(&self) -> u64 {
        self.stream.total_out()
    }

    /// Read back the current 32 KiB sliding window.
    ///
    /// Returns fewer than [`WINDOW_SIZE`] bytes if fewer than that have been
    /// produced since the stream (or the last dictionary reset) began.
    pub fn get_window(&mut self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; WINDOW_SIZE];
        let len = ffi::inflate_get_dictionary(&mut self.stream, &mut buf)?;
        buf.truncate(len);
        Ok(buf)
    }

    /// Feed the residual `bit_offset` low bits of `prev_byte` into the bit
    /// buffer, so that inflation can resume mid-byte at a captured access
    /// point. `bit_offset` must be in `0..=7`; a value of 0 is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StreamError`] if called with `bit_offset > 7` (after
    /// zlib itself rejects the call) or on any other misuse.
    pub fn prime(&mut self, bit_offset: u8, prev_byte: u8) -> Result<()> {
        if bit_offset == 0 {
            return Ok(());
        }
        // DEFLATE reads bits LSB-first within a byte, so the unconsumed
        // `bit_offset` bits are the *high* bits of `prev_byte`; shift them
        // down to the low end, matching zlib's own zran.c resume recipe.
        let value = i32::from(prev_byte >> (8 - bit_offset));
        ffi::inflate_prime(&mut self.stream, i32::from(bit_offset), value)
    }

    /// Install a sliding window to resume decoding from an access point.
    /// `window` should be exactly [`WINDOW_SIZE`] bytes, except when
    /// resuming from the very first access point, where it may be shorter.
    pub fn set_dictionary(&mut self, window: &[u8]) -> Result<()> {
        ffi::inflate_set_dictionary(&mut self.stream, window)
    }

    /// Reset the decoder to start a new gzip member, discarding any
    /// in-progress bit buffer and sliding window state.
    pub fn reset_for_new_member(&mut self) -> Result<()> {
        ffi::inflate_reset2(&mut self.stream, self.mode.window_bits())
    }

    /// The mode this inflater was initialised (or last reset) with.
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

impl Drop for Inflater {
    fn drop(&mut self) {
        if self.initialised {
            ffi::inflate_end(&mut self.stream);
        }
    }
}
