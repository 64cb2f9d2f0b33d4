//! A single resumable decoder snapshot, keyed by uncompressed offset.

use inflate_safe::WINDOW_SIZE;

/// An immutable snapshot of decoder state from which inflation can resume.
///
/// Captured only at DEFLATE block boundaries (see `inflate_safe::InflateStatus::BlockEnd`),
/// since the inflater cannot be serialised mid-block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    /// Position in the decoded stream at which this point applies.
    pub uncompressed_offset: u64,
    /// Byte position in the compressed stream the source must seek to.
    pub compressed_offset: u64,
    /// Extra bits, from the byte preceding `compressed_offset`, that belong
    /// to the code unit starting the next block. Always `0..=7`.
    pub bit_offset: u8,
    /// The last up-to-32 KiB of uncompressed data produced immediately
    /// before this point (the DEFLATE sliding window).
    pub window: Vec<u8>,
    /// True if this point is the first byte of a gzip member.
    pub is_stream_start: bool,
}

impl AccessPoint {
    /// Build the access point that opens a fresh gzip member: no residual
    /// bits, empty window, `compressed_offset` at the member's first byte.
    pub(crate) fn stream_start(uncompressed_offset: u64, compressed_offset: u64) -> Self {
        Self {
            uncompressed_offset,
            compressed_offset,
            bit_offset: 0,
            window: Vec::new(),
            is_stream_start: true,
        }
    }

    /// Build an ordinary mid-stream access point at a block boundary.
    ///
    /// `window` is truncated/left as-is: callers pass the inflater's current
    /// window, which is already at most [`WINDOW_SIZE`] bytes and shorter
    /// only when fewer bytes have been produced since the stream began.
    pub(crate) fn block_boundary(
        uncompressed_offset: u64,
        compressed_offset: u64,
        bit_offset: u8,
        window: Vec<u8>,
    ) -> Self {
        debug_assert!(bit_offset <= 7);
        debug_assert!(window.len() <= WINDOW_SIZE);
        Self {
            uncompressed_offset,
            compressed_offset,
            bit_offset,
            window,
            is_stream_start: false,
        }
    }

    /// Whether this point's window is the full 32 KiB DEFLATE window (true
    /// for every point except possibly the very first one in the index).
    pub fn has_full_window(&self) -> bool {
        self.window.len() == WINDOW_SIZE
    }
}
