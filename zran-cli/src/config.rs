//! Command-line argument parsing for the `zran` front-end.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use zran_core::Options;

/// Default suffix used for a sibling index file when `--index` is not given
/// an explicit path (mirrors `gzip-utils`'s `GZIP_EXTENSION` convention of a
/// fixed, well-known suffix rather than inventing one per invocation).
pub const INDEX_SUFFIX: &str = "zidx";

/// Indexed, random-access reading of gzip streams.
#[derive(Debug, Parser)]
#[command(
    name = "zran",
    version,
    about = "Build and query a random-access index over a gzip stream",
    long_about = "zran builds a sparse access-point index over a gzip (DEFLATE) \
                 stream and uses it to serve byte-range reads without \
                 re-decoding the stream from the start."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands exercising the engine's public surface.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode the whole stream once, building (and optionally exporting) its
    /// access-point index.
    BuildIndex {
        /// Path to the gzip file to index.
        input: PathBuf,

        /// Where to write the exported index. If
        /// omitted, the index is built and discarded after reporting stats.
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        index_opts: IndexOpts,
    },

    /// Print the `(compressed_offset, uncompressed_offset)` table of access
    /// points, one per line, tab-separated.
    SeekPoints {
        /// Path to the gzip file.
        input: PathBuf,

        /// Read access points from a previously exported index file instead
        /// of rebuilding from scratch.
        #[arg(long = "index", value_name = "FILE")]
        index: Option<PathBuf>,

        #[command(flatten)]
        index_opts: IndexOpts,
    },

    /// Read `length` bytes of uncompressed data starting at `offset` and
    /// write them to stdout.
    Pread {
        /// Path to the gzip file.
        input: PathBuf,

        /// Absolute uncompressed byte offset to start reading from.
        #[arg(long, value_name = "BYTES")]
        offset: u64,

        /// Number of uncompressed bytes to read.
        #[arg(long, value_name = "BYTES")]
        length: usize,

        /// Read access points from a previously exported index file instead
        /// of building one on demand.
        #[arg(long = "index", value_name = "FILE")]
        index: Option<PathBuf>,

        #[command(flatten)]
        index_opts: IndexOpts,
    },

    /// Decompress the whole stream to stdout, like `zcat`, but driven by the
    /// engine's stream driver (exercises multi-member handling and CRC
    /// validation along the way).
    Cat {
        /// Path to the gzip file.
        input: PathBuf,

        #[command(flatten)]
        index_opts: IndexOpts,
    },
}

/// Options shared by every subcommand that opens a fresh [`Driver`], mapped
/// 1:1 onto [`zran_core::config::Options`]'s recognised configuration
/// options.
///
/// [`Driver`]: zran_core::Driver
#[derive(Debug, Clone, clap::Args)]
pub struct IndexOpts {
    /// Minimum uncompressed distance between adjacent access points. `0`
    /// means "only at gzip member starts".
    #[arg(long, value_name = "BYTES", default_value_t = zran_core::config::DEFAULT_SPACING)]
    pub spacing: u64,

    /// Size of the compressed read-ahead buffer (clamped up to 32 KiB).
    #[arg(long, value_name = "BYTES", default_value_t = zran_core::config::DEFAULT_READBUF_SIZE)]
    pub readbuf_size: usize,

    /// Back the read-ahead buffer with a read-only memory mapping of the
    /// input file instead of a heap buffer.
    #[arg(long)]
    pub mmap: bool,

    /// Close the OS file handle between top-level operations and reopen it
    /// lazily on next access.
    #[arg(long)]
    pub drop_handles: bool,

    /// Decode without verifying each gzip member's trailing CRC32/ISIZE.
    #[arg(long)]
    pub skip_crc_check: bool,
}

impl IndexOpts {
    /// Build a [`zran_core::config::Options`] from the parsed flags.
    pub fn to_engine_options(&self) -> Options {
        Options::default()
            .with_spacing(self.spacing)
            .with_readbuf_size(self.readbuf_size)
            .with_use_mmap(self.mmap)
            .with_drop_handles(self.drop_handles)
            .with_skip_crc_check(self.skip_crc_check)
    }
}
