//! Configuration surface for opening an indexed gzip [`crate::driver::Driver`].

/// Minimum uncompressed distance between adjacent access points, in bytes.
pub const DEFAULT_SPACING: u64 = 1024 * 1024;

/// Nominal default size of the compressed read-ahead buffer. `Options`
/// always clamps the effective value up to [`MIN_READBUF_SIZE`].
pub const DEFAULT_READBUF_SIZE: usize = 16 * 1024;

/// The read-ahead buffer must be large enough to hold one full sliding
/// window plus at least one zlib input chunk.
pub const MIN_READBUF_SIZE: usize = 32 * 1024;

/// Configuration for opening a [`crate::driver::Driver`], built with the
/// same consuming-setter style as other compression/decompression option
/// structs in this workspace.
#[derive(Debug, Clone)]
pub struct Options {
    spacing: u64,
    readbuf_size: usize,
    use_mmap: bool,
    drop_handles: bool,
    skip_crc_check: bool,
    auto_build: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_SPACING,
            readbuf_size: DEFAULT_READBUF_SIZE.max(MIN_READBUF_SIZE),
            use_mmap: false,
            drop_handles: false,
            skip_crc_check: false,
            auto_build: true,
        }
    }
}

impl Options {
    /// Minimum uncompressed distance between adjacent access points.
    /// `0` means "only at gzip member starts".
    #[must_use]
    pub fn with_spacing(mut self, spacing: u64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Size of the compressed read-ahead buffer. Clamped up to
    /// [`MIN_READBUF_SIZE`] so a full sliding window always fits.
    #[must_use]
    pub fn with_readbuf_size(mut self, readbuf_size: usize) -> Self {
        self.readbuf_size = readbuf_size.max(MIN_READBUF_SIZE);
        self
    }

    /// If `true` and the source is file-backed, back the read-ahead buffer
    /// with a read-only memory mapping instead of a heap buffer.
    #[must_use]
    pub fn with_use_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// If `true`, close the OS handle between top-level operations and
    /// reopen it lazily on next access.
    #[must_use]
    pub fn with_drop_handles(mut self, drop_handles: bool) -> Self {
        self.drop_handles = drop_handles;
        self
    }

    /// If `true`, decode without verifying per-member CRC32/ISIZE.
    #[must_use]
    pub fn with_skip_crc_check(mut self, skip_crc_check: bool) -> Self {
        self.skip_crc_check = skip_crc_check;
        self
    }

    /// If `false`, ordinary `read`/`seek` calls never append access points;
    /// only an explicit [`crate::driver::Driver::build_full_index`] call
    /// grows the index. Attempting to read/seek outside covered territory
    /// without a prior full build then fails with [`crate::Error::NotCovered`].
    #[must_use]
    pub fn with_auto_build(mut self, auto_build: bool) -> Self {
        self.auto_build = auto_build;
        self
    }

    /// Minimum uncompressed distance between adjacent access points.
    pub fn spacing(&self) -> u64 {
        self.spacing
    }

    /// Size of the compressed read-ahead buffer.
    pub fn readbuf_size(&self) -> usize {
        self.readbuf_size
    }

    /// Whether the read-ahead buffer should be backed by a memory mapping
    /// when the source is file-backed. Callers opening their own
    /// [`crate::source::SourceAdapter`] (rather than going through a
    /// file-opening helper) are responsible for honoring this themselves,
    /// e.g. by constructing a [`crate::buffer::ReadAheadBuffer::mmap`] and
    /// passing it to [`crate::driver::Driver::from_parts`].
    pub fn use_mmap(&self) -> bool {
        self.use_mmap
    }

    /// Whether the source's OS handle should be closed between top-level
    /// operations and reopened lazily. Like [`Self::use_mmap`], this only
    /// takes effect if the caller constructs its source accordingly (e.g.
    /// via [`crate::source::SeekableSource::with_drop_handles`]).
    pub fn drop_handles(&self) -> bool {
        self.drop_handles
    }

    /// Whether per-member CRC32/ISIZE validation is skipped.
    pub fn skip_crc_check(&self) -> bool {
        self.skip_crc_check
    }

    /// Whether ordinary reads/seeks are allowed to grow the index.
    pub fn auto_build(&self) -> bool {
        self.auto_build
    }
}
