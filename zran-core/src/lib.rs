//! Indexed, random-access reading of gzip streams.
//!
//! This crate turns a sequential gzip (DEFLATE) bytestream into a seekable
//! byte source by building a sparse **access-point index**: a table mapping
//! uncompressed offsets to resumable DEFLATE decoder snapshots. Given that
//! index, an arbitrary byte range can be reconstructed by locating the
//! nearest preceding access point, restoring the decoder state it captured,
//! and decoding forward the residual distance — without re-decoding the
//! stream from the start.
//!
//! The pieces, leaves first:
//!
//! - [`source`] — where compressed bytes come from (a seekable handle or an
//!   opaque caller-supplied reader).
//! - [`buffer`] — the read-ahead buffer between a source and the inflater.
//! - [`access_point`] / [`index`] — a single resumable snapshot, and the
//!   ordered table of them.
//! - [`driver`] — the state machine that drives inflation, grows the index,
//!   and answers seek/read requests. [`Driver`] is the main entry point for
//!   single-threaded use.
//! - [`facade`] — a `Mutex`-wrapped [`Driver`] for callers that issue
//!   concurrent `pread`s from multiple threads (or, with the `async`
//!   feature, from async tasks).
//! - [`serialize`] — portable export/import of an [`Index`].

pub mod access_point;
pub mod buffer;
pub mod config;
pub mod driver;
pub mod error;
pub mod facade;
pub mod index;
pub mod serialize;
pub mod source;

pub use access_point::AccessPoint;
pub use config::Options;
pub use driver::{Driver, State};
pub use error::{Error, Result};
pub use facade::Facade;
pub use index::Index;
pub use source::{CallbackSource, ReopenFn, SeekableSource, SourceAdapter};

#[cfg(feature = "async")]
pub use facade::AsyncFacade;
