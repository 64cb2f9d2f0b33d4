//! Read-ahead buffer: the intermediate compressed-byte buffer between the
//! [`crate::source::SourceAdapter`] and the inflater.
//!
//! Two backings, selected by `Options::use_mmap`: a heap `Vec<u8>` refilled
//! from the source in `readbuf_size` chunks, or (when the source is
//! file-backed and mmap is requested) a read-only `memmap2::Mmap` of the
//! whole compressed file, which needs no refilling at all.

use std::io;

use memmap2::Mmap;

use crate::source::SourceAdapter;

enum Backing {
    Heap(Vec<u8>),
    Mmap(Mmap),
}

/// Tracks `(base_compressed_offset, valid_length, consumed)` over a backing
/// store: `base_compressed_offset` is the
/// compressed position of byte 0 of the valid region; `consumed` bytes of
/// that region have already been handed to the inflater.
pub struct ReadAheadBuffer {
    backing: Backing,
    base_compressed_offset: u64,
    valid_length: usize,
    consumed: usize,
}

impl ReadAheadBuffer {
    /// A heap-backed buffer of `capacity` bytes, initially empty.
    pub fn heap(capacity: usize) -> Self {
        Self {
            backing: Backing::Heap(vec![0u8; capacity]),
            base_compressed_offset: 0,
            valid_length: 0,
            consumed: 0,
        }
    }

    /// A buffer backed by a read-only mapping of the whole compressed file.
    /// The entire mapping is immediately "valid"; no refill ever occurs.
    pub fn mmap(mapping: Mmap) -> Self {
        let valid_length = mapping.len();
        Self {
            backing: Backing::Mmap(mapping),
            base_compressed_offset: 0,
            valid_length,
            consumed: 0,
        }
    }

    /// Bytes available to feed the inflater without a fresh read.
    pub fn remaining(&self) -> usize {
        self.valid_length - self.consumed
    }

    /// The unconsumed portion of the valid region.
    pub fn pending(&self) -> &[u8] {
        let slice = match &self.backing {
            Backing::Heap(buf) => &buf[..self.valid_length],
            Backing::Mmap(map) => &map[..],
        };
        &slice[self.consumed..self.valid_length]
    }

    /// Mark `n` bytes of the pending region as handed to the inflater.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.consumed + n <= self.valid_length);
        self.consumed += n;
    }

    /// Compressed offset of the first byte still pending.
    pub fn position(&self) -> u64 {
        self.base_compressed_offset + self.consumed as u64
    }

    /// Whether this buffer is mmap-backed (never needs refilling).
    pub fn is_mmap(&self) -> bool {
        matches!(self.backing, Backing::Mmap(_))
    }

    /// Pull more compressed bytes from `src`, starting at its current
    /// position. A no-op for mmap-backed buffers, which already cover the
    /// whole file. Returns the number of fresh bytes made available.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `src`.
    pub fn refill(&mut self, src: &mut dyn SourceAdapter) -> io::Result<usize> {
        match &mut self.backing {
            Backing::Heap(buf) => {
                let base = src.tell()?;
                let n = src.read(buf.as_mut_slice())?;
                self.base_compressed_offset = base;
                self.valid_length = n;
                self.consumed = 0;
                Ok(n)
            }
            Backing::Mmap(_) => Ok(0),
        }
    }

    /// Reposition the buffer ahead of a seek on the underlying source.
    ///
    /// Heap-backed buffers are invalidated (emptied); the caller must also
    /// seek the source and call [`Self::refill`] before reading again.
    /// Mmap-backed buffers reposition in place since the whole file is
    /// already resident.
    pub fn reset_to(&mut self, compressed_offset: u64) {
        match &self.backing {
            Backing::Heap(_) => {
                self.base_compressed_offset = compressed_offset;
                self.valid_length = 0;
                self.consumed = 0;
            }
            Backing::Mmap(map) => {
                self.base_compressed_offset = 0;
                self.valid_length = map.len();
                self.consumed = compressed_offset as usize;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SeekableSource;
    use std::io::Cursor;

    #[test]
    fn heap_buffer_refills_from_source() {
        let data: Vec<u8> = (0u8..200).collect();
        let mut src = SeekableSource::new(Cursor::new(data.clone()), Some(200));
        let mut buf = ReadAheadBuffer::heap(64);

        let n = buf.refill(&mut src).unwrap();
        assert_eq!(n, 64);
        assert_eq!(buf.pending(), &data[..64]);
        assert_eq!(buf.position(), 0);

        buf.advance(64);
        assert_eq!(buf.remaining(), 0);

        buf.refill(&mut src).unwrap();
        assert_eq!(buf.pending(), &data[64..128]);
        assert_eq!(buf.position(), 64);
    }

    #[test]
    fn reset_to_invalidates_heap_buffer() {
        let data: Vec<u8> = (0u8..200).collect();
        let mut src = SeekableSource::new(Cursor::new(data), Some(200));
        let mut buf = ReadAheadBuffer::heap(64);
        buf.refill(&mut src).unwrap();
        buf.reset_to(500);
        assert_eq!(buf.remaining(), 0);
        assert_eq!(buf.position(), 500);
    }
}
