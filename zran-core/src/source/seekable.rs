//! A seekable source backed by a file handle, memory map, or any `Read + Seek`.

use std::io::{self, Read, Seek, SeekFrom};

use super::{HandleUnavailable, SourceAdapter};

/// Either an open handle or a remembered "closed" state, used by
/// [`SeekableSource`]'s `drop_handles` mode.
enum Handle<R> {
    Open(R),
    Closed,
}

/// A function that (re)opens the underlying resource from scratch.
pub type ReopenFn<R> = Box<dyn FnMut() -> io::Result<R> + Send>;

/// Wraps anything `Read + Seek` (a `File`, a `Cursor<Vec<u8>>`, a
/// `Cursor<&[u8]>` over a `memmap2::Mmap`, ...) as a compressed source.
///
/// In `drop_handles` mode, the handle is closed after every top-level
/// operation and reopened lazily on next access via a caller-supplied
/// `reopen` factory; the current byte offset is remembered independently of
/// the handle so reopening is idempotent. This supports using many indexed
/// streams concurrently without exhausting file descriptors.
pub struct SeekableSource<R: Read + Seek> {
    handle: Handle<R>,
    reopen: Option<ReopenFn<R>>,
    position: u64,
    size_hint: Option<u64>,
}

impl<R: Read + Seek> SeekableSource<R> {
    /// Wrap an already-open handle, never closing it between operations.
    pub fn new(inner: R, size_hint: Option<u64>) -> Self {
        Self {
            handle: Handle::Open(inner),
            reopen: None,
            position: 0,
            size_hint,
        }
    }

    /// Wrap a handle in `drop_handles` mode: after the handle is dropped, a
    /// subsequent access reopens it via `reopen` and seeks to the remembered
    /// position before continuing.
    pub fn with_drop_handles(inner: R, reopen: ReopenFn<R>, size_hint: Option<u64>) -> Self {
        Self {
            handle: Handle::Open(inner),
            reopen: Some(reopen),
            position: 0,
            size_hint,
        }
    }

    /// Close the underlying handle, retaining `position` for a later reopen.
    /// A no-op unless this source was constructed with [`Self::with_drop_handles`].
    pub fn release(&mut self) {
        if self.reopen.is_some() {
            self.handle = Handle::Closed;
        }
    }

    /// Re-establish an open handle if currently closed, retried once before
    /// surfacing the underlying I/O error (callers map this to
    /// `Error::NoHandle`).
    fn ensure_open(&mut self) -> io::Result<&mut R> {
        if matches!(self.handle, Handle::Closed) {
            let reopen = self
                .reopen
                .as_mut()
                .expect("Handle::Closed only reachable when reopen is Some");
            let mut last_err = None;
            for _ in 0..2 {
                match reopen() {
                    Ok(mut inner) => {
                        inner.seek(SeekFrom::Start(self.position))?;
                        self.handle = Handle::Open(inner);
                        break;
                    }
                    Err(e) => last_err = Some(e),
                }
            }
            if matches!(self.handle, Handle::Closed) {
                let source = last_err
                    .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "handle never opened"));
                return Err(io::Error::new(io::ErrorKind::NotFound, HandleUnavailable(source)));
            }
        }
        match &mut self.handle {
            Handle::Open(inner) => Ok(inner),
            Handle::Closed => unreachable!(),
        }
    }
}

impl<R: Read + Seek + Send> SourceAdapter for SeekableSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.ensure_open()?.read(buf)?;
        self.position += n as u64;
        if self.reopen.is_some() {
            self.release();
        }
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.ensure_open()?.seek(SeekFrom::Start(pos))?;
        self.position = pos;
        if self.reopen.is_some() {
            self.release();
        }
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

    fn data() -> Vec<u8> {
        (0u8..=255).cycle().take(10_000).collect()
    }

    #[test]
    fn read_and_seek_track_position() {
        let mut src = SeekableSource::new(Cursor::new(data()), Some(10_000));
        let mut buf = [0u8; 16];
        src.read(&mut buf).unwrap();
        assert_eq!(src.tell().unwrap(), 16);

        src.seek(100).unwrap();
        assert_eq!(src.tell().unwrap(), 100);
        src.read(&mut buf).unwrap();
        assert_eq!(buf[0], data()[100]);
    }

    #[test]
    fn drop_handles_mode_reopens_and_restores_position() {
        let d = data();
        let reopen: ReopenFn<Cursor<Vec<u8>>> = Box::new(move || Ok(Cursor::new(d.clone())));
        let mut src =
            SeekableSource::with_drop_handles(Cursor::new(data()), reopen, Some(10_000));

        src.seek(500).unwrap();
        assert!(matches!(src.handle, Handle::Closed));

        let mut buf = [0u8; 8];
        let n = src.read(&mut buf).unwrap();
        assert_eq!(n, 8);
        assert_eq!(&buf[..], &data()[500..508]);
        assert!(matches!(src.handle, Handle::Closed));
    }

    #[test]
    fn reopen_failure_surfaces_io_error() {
        let reopen: ReopenFn<Cursor<Vec<u8>>> =
            Box::new(|| Err(io::Error::new(io::ErrorKind::NotFound, "gone")));
        let mut src = SeekableSource::with_drop_handles(Cursor::new(data()), reopen, None);
        src.release();
        let mut buf = [0u8; 4];
        assert!(src.read(&mut buf).is_err());
    }
}
