//! A boxed, caller-supplied `Read + Seek` source.

use std::io::{self, Read, Seek, SeekFrom};

use super::SourceAdapter;

/// Wraps an opaque caller-provided reader/seeker. The driver must never
/// assume O(1) seeks on this variant — seeks may be expensive — but still
/// relies on seekability to resume from access points; a
/// genuinely forward-only reader is only usable for
/// `Driver::build_full_index` starting at position zero, never for `pread`.
pub struct CallbackSource {
    inner: Box<dyn ReadSeek>,
    position: u64,
    size_hint: Option<u64>,
}

/// Blanket trait bundling `Read + Seek` for trait-object storage.
pub trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

impl CallbackSource {
    /// Wrap a boxed reader/seeker. `size_hint` may be `None` if the caller
    /// does not know the stream's total length up front.
    pub fn new(inner: Box<dyn ReadSeek>, size_hint: Option<u64>) -> Self {
        Self {
            inner,
            position: 0,
            size_hint,
        }
    }
}

impl SourceAdapter for CallbackSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        self.position = pos;
        Ok(())
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }

    fn size_hint(&self) -> Option<u64> {
        self.size_hint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn wraps_any_read_seek_behind_a_box() {
        let data = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut src = CallbackSource::new(Box::new(Cursor::new(data)), None);

        let mut buf = [0u8; 4];
        assert_eq!(src.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(src.tell().unwrap(), 4);

        src.seek(2).unwrap();
        let mut buf2 = [0u8; 2];
        src.read(&mut buf2).unwrap();
        assert_eq!(buf2, [3, 4]);
    }
}
