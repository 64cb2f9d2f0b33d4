//! Portable binary export/import of an [`Index`].
//!
//! Wire format (all integers little-endian):
//!
//! ```text
//! magic              7 bytes   "ZRAN_v1"
//! version            u8        1 (readers also accept 0, which omits window_size)
//! flags              u32       bit0 = multi_member, bit1 = total_uncompressed_known
//! compressed_size    u64       0 if unknown
//! uncompressed_size  u64       0 unless flags bit1 set
//! spacing            u64
//! window_size        u32       only present when version >= 1
//! n_points           u64
//! points             n_points * point record
//! ```
//!
//! Per-point record: `uncompressed_offset u64`, `compressed_offset u64`,
//! `bit_offset u8`, `window_length u16`, `window_bytes [u8; window_length]`.

use std::io::{self, Read, Write};

use crate::access_point::AccessPoint;
use crate::error::{Error, Result};
use crate::index::{Index, WINDOW_SIZE};

const MAGIC: &[u8; 7] = b"ZRAN_v1";
const CURRENT_VERSION: u8 = 1;

const FLAG_MULTI_MEMBER: u32 = 1 << 0;
const FLAG_TOTAL_UNCOMPRESSED_KNOWN: u32 = 1 << 1;

/// Write `index` to `writer` in the portable binary format described above.
///
/// `compressed_size` is the source's size at export time, if known; it lets
/// [`import_index`] validate that every point's `compressed_offset` still
/// lies within the source it is re-attached to.
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails.
pub fn export_index(index: &Index, writer: &mut impl Write, compressed_size: Option<u64>) -> Result<()> {
    writer.write_all(MAGIC)?;
    writer.write_all(&[CURRENT_VERSION])?;

    let mut flags = 0u32;
    if index.multi_member_seen() {
        flags |= FLAG_MULTI_MEMBER;
    }
    if index.total_uncompressed().is_some() {
        flags |= FLAG_TOTAL_UNCOMPRESSED_KNOWN;
    }
    writer.write_all(&flags.to_le_bytes())?;

    writer.write_all(&compressed_size.unwrap_or(0).to_le_bytes())?;
    writer.write_all(&index.total_uncompressed().unwrap_or(0).to_le_bytes())?;
    writer.write_all(&index.spacing().to_le_bytes())?;
    writer.write_all(&WINDOW_SIZE.to_le_bytes())?;
    writer.write_all(&(index.len() as u64).to_le_bytes())?;

    for point in index.iter() {
        writer.write_all(&point.uncompressed_offset.to_le_bytes())?;
        writer.write_all(&point.compressed_offset.to_le_bytes())?;
        writer.write_all(&[point.bit_offset])?;
        writer.write_all(&(point.window.len() as u16).to_le_bytes())?;
        writer.write_all(&point.window)?;
    }

    Ok(())
}

/// Read an [`Index`] previously written by [`export_index`].
///
/// `source_size` is the known size of the compressed source, if any; when
/// `Some`, every point's `compressed_offset` is validated to lie within it.
///
/// # Errors
///
/// Returns [`Error::Io`] on read failure, or [`Error::InvalidIndex`] if the
/// magic is wrong, the version is unsupported, a record is malformed
/// (`bit_offset > 7`, `window_length > 32768`), offsets are out of order, or
/// a compressed offset exceeds `source_size`.
pub fn import_index(reader: &mut impl Read, source_size: Option<u64>) -> Result<Index> {
    let mut magic = [0u8; 7];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(Error::InvalidIndex("bad magic".to_string()));
    }

    let version = read_u8(reader)?;
    if version > CURRENT_VERSION {
        return Err(Error::InvalidIndex(format!(
            "unsupported index format version {version}"
        )));
    }

    let _flags = read_u32(reader)?;
    let _compressed_size = read_u64(reader)?;
    let uncompressed_size = read_u64(reader)?;
    let spacing = read_u64(reader)?;

    // Version 0 omits window_size; it is implicitly 32768.
    if version >= 1 {
        let window_size = read_u32(reader)?;
        if window_size != WINDOW_SIZE {
            return Err(Error::InvalidIndex(format!(
                "unexpected window size {window_size}, expected {WINDOW_SIZE}"
            )));
        }
    }

    let n_points = read_u64(reader)?;
    let mut points = Vec::with_capacity(n_points.min(1 << 20) as usize);

    let mut prev_uncompressed: Option<u64> = None;
    let mut prev_compressed: Option<u64> = None;

    for _ in 0..n_points {
        let uncompressed_offset = read_u64(reader)?;
        let compressed_offset = read_u64(reader)?;
        let bit_offset = read_u8(reader)?;
        let window_length = read_u16(reader)? as usize;

        if bit_offset > 7 {
            return Err(Error::InvalidIndex(format!(
                "bit_offset {bit_offset} out of range"
            )));
        }
        if window_length > WINDOW_SIZE as usize {
            return Err(Error::InvalidIndex(format!(
                "window_length {window_length} exceeds {WINDOW_SIZE}"
            )));
        }
        if let Some(prev) = prev_uncompressed {
            if uncompressed_offset <= prev {
                return Err(Error::InvalidIndex(
                    "uncompressed_offset out of order".to_string(),
                ));
            }
        }
        if let Some(prev) = prev_compressed {
            if compressed_offset < prev {
                return Err(Error::InvalidIndex(
                    "compressed_offset out of order".to_string(),
                ));
            }
        }
        if let Some(size) = source_size {
            if compressed_offset > size {
                return Err(Error::InvalidIndex(
                    "compressed_offset exceeds source size".to_string(),
                ));
            }
        }

        let mut window = vec![0u8; window_length];
        reader.read_exact(&mut window)?;

        let is_stream_start = bit_offset == 0 && window.is_empty();
        let point = AccessPoint {
            uncompressed_offset,
            compressed_offset,
            bit_offset,
            window,
            is_stream_start,
        };

        prev_uncompressed = Some(uncompressed_offset);
        prev_compressed = Some(compressed_offset);
        points.push(point);
    }

    let mut index = Index::from_points(points, spacing);
    if uncompressed_size > 0 {
        index.set_total_uncompressed(uncompressed_size);
    }
    Ok(index)
}

fn read_u8(r: &mut impl Read) -> io::Result<u8> {
    let mut b = [0u8; 1];
    r.read_exact(&mut b)?;
    Ok(b[0])
}

fn read_u16(r: &mut impl Read) -> io::Result<u16> {
    let mut b = [0u8; 2];
    r.read_exact(&mut b)?;
    Ok(u16::from_le_bytes(b))
}

fn read_u32(r: &mut impl Read) -> io::Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

fn read_u64(r: &mut impl Read) -> io::Result<u64> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)?;
    Ok(u64::from_le_bytes(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn export_import_round_trips_with_no_points() {
        let index = Index::new(1024 * 1024);
        let mut buf = Vec::new();
        export_index(&index, &mut buf, None).unwrap();

        let imported = import_index(&mut Cursor::new(buf), None).unwrap();
        assert_eq!(imported.len(), 0);
        assert_eq!(imported.spacing(), 1024 * 1024);
    }

    #[test]
    fn export_import_round_trips_with_points() {
        let mut index = Index::new(4096);
        index.append(AccessPoint::stream_start(0, 0));
        index.append(AccessPoint::block_boundary(5000, 400, 3, vec![9u8; 32 * 1024]));
        index.set_total_uncompressed(10_000);

        let mut buf = Vec::new();
        export_index(&index, &mut buf, None).unwrap();

        let imported = import_index(&mut Cursor::new(buf), None).unwrap();
        assert_eq!(imported.len(), 2);
        assert_eq!(imported.total_uncompressed(), Some(10_000));
        assert_eq!(imported.iter().nth(1).unwrap().bit_offset, 3);
    }

    #[test]
    fn import_rejects_bad_magic() {
        let buf = b"NOT_ZRAN".to_vec();
        let err = import_index(&mut Cursor::new(buf), None).unwrap_err();
        assert!(matches!(err, Error::InvalidIndex(_)));
    }

    #[test]
    fn import_accepts_version_0_without_window_size_field() {
        // Hand-build a version-0 blob (no window_size field, no points).
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.push(0); // version
        buf.extend_from_slice(&0u32.to_le_bytes()); // flags
        buf.extend_from_slice(&0u64.to_le_bytes()); // compressed_size
        buf.extend_from_slice(&0u64.to_le_bytes()); // uncompressed_size
        buf.extend_from_slice(&(1024u64).to_le_bytes()); // spacing
        buf.extend_from_slice(&0u64.to_le_bytes()); // n_points

        let imported = import_index(&mut Cursor::new(buf), None).unwrap();
        assert_eq!(imported.len(), 0);
        assert_eq!(imported.spacing(), 1024);
    }

    #[test]
    fn import_rejects_out_of_order_points() {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.push(1);
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.extend_from_slice(&1024u64.to_le_bytes());
        buf.extend_from_slice(&WINDOW_SIZE.to_le_bytes());
        buf.extend_from_slice(&2u64.to_le_bytes()); // n_points

        // first point
        buf.extend_from_slice(&1000u64.to_le_bytes());
        buf.extend_from_slice(&100u64.to_le_bytes());
        buf.push(0);
        buf.extend_from_slice(&0u16.to_le_bytes());

        // second point, uncompressed_offset does not increase
        buf.extend_from_slice(&500u64.to_le_bytes());
        buf.extend_from_slice(&200u64.to_le_bytes());
        buf.push(0);
        buf.extend_from_slice(&0u16.to_le_bytes());

        let err = import_index(&mut Cursor::new(buf), None).unwrap_err();
        assert!(matches!(err, Error::InvalidIndex(_)));
    }
}
