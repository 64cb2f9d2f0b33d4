//! Thread-safe façade over a [`Driver`]: a single exclusive lock serialising
//! concurrent `pread`/`read` calls so the one underlying cursor stays
//! race-free.

use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Mutex;

use crate::config::Options;
use crate::driver::{Driver, State};
use crate::error::Result;
use crate::index::Index;
use crate::source::SourceAdapter;

/// Wraps a [`Driver`] behind a `Mutex`, so many threads can each issue
/// independent `pread` calls safely while only one ever touches the
/// underlying cursor at a time.
///
/// Every public method here acquires the lock, performs one driver
/// operation, and releases it: seek, read, release. Share a `Facade`
/// across threads the usual way, by wrapping it in an `Arc`.
pub struct Facade<S: SourceAdapter> {
    driver: Mutex<Driver<S>>,
}

impl<S: SourceAdapter> Facade<S> {
    /// Open a driver over `src` and wrap it behind the façade's lock.
    pub fn open(src: S, options: Options) -> Self {
        Self::new(Driver::open(src, options))
    }

    /// Wrap an already-constructed driver.
    pub fn new(driver: Driver<S>) -> Self {
        Self {
            driver: Mutex::new(driver),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.lock().state()
    }

    /// Logical position in the uncompressed stream, as of the last
    /// completed operation (another thread may move it immediately after
    /// this returns).
    pub fn tell(&self) -> u64 {
        self.lock().tell()
    }

    /// `(compressed_offset, uncompressed_offset)` for every recorded point.
    pub fn seek_points(&self) -> Vec<(u64, u64)> {
        self.lock().seek_points()
    }

    /// Read up to `buf.len()` bytes at the driver's current position.
    ///
    /// # Errors
    ///
    /// See [`Driver::read`].
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.lock().read(buf)
    }

    /// Atomic seek + read: the one operation this façade exists for. Two
    /// threads calling `pread` concurrently each see their own seek
    /// immediately followed by their own read, with no interleaving.
    ///
    /// # Errors
    ///
    /// See [`Driver::pread`].
    pub fn pread(&self, buf: &mut [u8], abs: u64) -> Result<usize> {
        self.lock().pread(buf, abs)
    }

    /// Reposition the logical cursor.
    ///
    /// # Errors
    ///
    /// See [`Driver::seek`].
    pub fn seek(&self, pos: SeekFrom) -> Result<u64> {
        self.lock().seek(pos)
    }

    /// Decode the entire stream once, recording access points at the
    /// configured spacing.
    ///
    /// # Errors
    ///
    /// See [`Driver::build_full_index`].
    pub fn build_full_index(&self) -> Result<()> {
        self.lock().build_full_index()
    }

    /// Export the index in the portable binary format.
    ///
    /// # Errors
    ///
    /// See [`Driver::export_index`].
    pub fn export_index(&self, writer: &mut impl Write) -> Result<()> {
        self.lock().export_index(writer)
    }

    /// Replace the wrapped driver's index with one previously exported for
    /// the same compressed source.
    ///
    /// # Errors
    ///
    /// See [`Driver::import_index`].
    pub fn import_index(&self, reader: &mut impl Read) -> Result<()> {
        self.lock().import_index(reader)
    }

    /// Run `f` with exclusive access to the wrapped driver, for callers
    /// needing operations this façade does not wrap individually (e.g.
    /// reading [`Driver::index`] alongside a seek, atomically).
    pub fn with_driver<T>(&self, f: impl FnOnce(&mut Driver<S>) -> T) -> T {
        f(&mut self.lock())
    }

    /// A snapshot copy of the access-point index built so far.
    pub fn index(&self) -> Index {
        self.lock().index().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Driver<S>> {
        self.driver.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// An async-friendly variant of [`Facade`] for callers driving the engine
/// from Tokio tasks. The underlying driver is synchronous, so this wrapper's
/// job is only to keep blocking work off the async runtime's worker threads;
/// the single-cursor invariant is still the façade's `Mutex`, not a redesign
/// of the driver itself.
#[cfg(feature = "async")]
pub struct AsyncFacade<S: SourceAdapter + 'static> {
    inner: std::sync::Arc<Mutex<Driver<S>>>,
}

#[cfg(feature = "async")]
impl<S: SourceAdapter + 'static> AsyncFacade<S> {
    /// Open a driver over `src` and wrap it for use from async tasks.
    pub fn open(src: S, options: Options) -> Self {
        Self {
            inner: std::sync::Arc::new(Mutex::new(Driver::open(src, options))),
        }
    }

    /// Atomic seek + read, run on a blocking-pool thread via
    /// [`tokio::task::spawn_blocking`].
    ///
    /// # Errors
    ///
    /// See [`Driver::pread`]. Also returns the underlying error if the
    /// blocking task itself panics.
    pub async fn pread(&self, len: usize, abs: u64) -> Result<Vec<u8>> {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut driver = inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            let mut buf = vec![0u8; len];
            let n = driver.pread(&mut buf, abs)?;
            buf.truncate(n);
            Ok(buf)
        })
        .await
        .expect("zran-core: blocking pread task panicked")
    }

    /// Decode the entire stream once, recording access points at the
    /// configured spacing, run on a blocking-pool thread.
    ///
    /// # Errors
    ///
    /// See [`Driver::build_full_index`]. Also returns the underlying error
    /// if the blocking task itself panics.
    pub async fn build_full_index(&self) -> Result<()> {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut driver = inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            driver.build_full_index()
        })
        .await
        .expect("zran-core: blocking build_full_index task panicked")
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .state()
    }

    /// `(compressed_offset, uncompressed_offset)` for every recorded point.
    pub fn seek_points(&self) -> Vec<(u64, u64)> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .seek_points()
    }
}
