//! Inflater initialisation modes.

/// Which container format the inflater expects at the start of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A bare DEFLATE block stream with no header (zlib `windowBits` 8..=15,
    /// positive).
    Raw,
    /// A gzip member: parse and validate the gzip header, then decode the
    /// embedded DEFLATE stream (zlib `windowBits` 8..=15 plus 16, or 32 for
    /// gzip/zlib auto-detection).
    Gzip,
}

impl Mode {
    /// The zlib `windowBits` value `inflateInit2_`/`inflateReset2` expect for
    /// this mode, using the maximum 32 KiB window in both cases.
    ///
    /// `Raw` is negative per zlib's convention for a headerless DEFLATE
    /// stream (no zlib/gzip wrapper, no trailer); this is what the stream
    /// driver uses so it can parse gzip headers and trailers itself and
    /// track CRC/ISIZE independently (needed for `skip_crc_check` and for
    /// locating member boundaries under null padding). `Gzip` lets zlib
    /// parse its own gzip header/trailer, for standalone single-member use.
    pub(crate) fn window_bits(self) -> i32 {
        match self {
            Mode::Raw => -15,
            Mode::Gzip => 15 + 16,
        }
    }
}
