//! Safe FFI bindings to zlib's raw inflate API.
//!
//! This crate provides a safe, idiomatic Rust wrapper around the subset of
//! zlib needed to build a resumable, random-access DEFLATE/gzip decoder: it
//! exposes block-boundary detection, bit-level stream position, sliding
//! window capture/restore, and residual-bit priming — primitives that exist
//! in zlib (`inflatePrime`, `inflateSetDictionary`, `inflateGetDictionary`,
//! the `Z_BLOCK` flush mode) but that higher-level crates such as `flate2`
//! do not surface.

mod error;
mod ffi;
mod inflater;
mod stream;

pub use error::{Error, Result};
pub use inflater::{InflateStatus, InflateStep, Inflater, Mode, WINDOW_SIZE};
