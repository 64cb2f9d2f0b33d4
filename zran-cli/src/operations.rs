//! Implements each `zran` subcommand on top of `zran-core`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zran_core::buffer::ReadAheadBuffer;
use zran_core::{Driver, Options, SeekableSource};

use crate::error::{Error, Result};

/// Open `input` honoring `options`'s `use_mmap`/`drop_handles` flags: this is
/// the one place in the CLI that turns those two booleans into an actual
/// memory mapping or a reopen-on-demand [`SeekableSource`], since `Options`
/// itself carries no file handles or paths to build either from.
fn open_driver(input: &Path, options: Options) -> Result<Driver<SeekableSource<File>>> {
    let to_open_err = |source: std::io::Error| Error::OpenInput {
        path: input.to_path_buf(),
        source,
    };

    let file = File::open(input).map_err(to_open_err)?;
    let size_hint = file.metadata().ok().map(|m| m.len());

    let src = if options.drop_handles() {
        let reopen_path = input.to_path_buf();
        SeekableSource::with_drop_handles(file, Box::new(move || File::open(&reopen_path)), size_hint)
    } else {
        SeekableSource::new(file, size_hint)
    };

    let buf = if options.use_mmap() {
        // The handle above may already have been handed to `src` (and, in
        // `drop_handles` mode, possibly closed again); mmap its own
        // independent handle rather than reach back into `src` for one.
        let mmap_file = File::open(input).map_err(to_open_err)?;
        // Safe in the sense zlib/`memmap2` itself documents: the file is
        // assumed not to be concurrently truncated/modified by another
        // process while mapped, the same assumption this CLI's plain file
        // reads already make for a local, caller-supplied input path.
        let mapping = unsafe { memmap2::Mmap::map(&mmap_file) }.map_err(to_open_err)?;
        ReadAheadBuffer::mmap(mapping)
    } else {
        ReadAheadBuffer::heap(options.readbuf_size())
    };

    Ok(Driver::from_parts(src, buf, options))
}

/// `zran build-index`: decode the whole stream, optionally writing the
/// resulting index to `output`. Returns a human-readable summary line.
pub fn build_index(input: &Path, output: Option<&Path>, options: Options) -> Result<String> {
    let mut driver = open_driver(input, options)?;
    driver.build_full_index()?;

    if let Some(output) = output {
        let mut file = File::create(output).map_err(|source| Error::IndexFile {
            path: output.to_path_buf(),
            source,
        })?;
        driver.export_index(&mut file)?;
    }

    let index = driver.index();
    Ok(format!(
        "{} points, {} bytes uncompressed, spacing {}",
        index.len(),
        index.total_uncompressed().unwrap_or_default(),
        index.spacing(),
    ))
}

/// `zran seek-points`: resolve the access-point table either by importing
/// `index_path` or by building a fresh index, then return it as
/// `(compressed_offset, uncompressed_offset)` pairs in order.
pub fn seek_points(input: &Path, index_path: Option<&Path>, options: Options) -> Result<Vec<(u64, u64)>> {
    let mut driver = open_driver(input, options)?;
    match index_path {
        Some(path) => {
            let mut file = File::open(path).map_err(|source| Error::IndexFile {
                path: path.to_path_buf(),
                source,
            })?;
            driver.import_index(&mut file)?;
        }
        None => driver.build_full_index()?,
    }
    Ok(driver.seek_points())
}

/// `zran pread`: read `length` uncompressed bytes starting at `offset` and
/// write them verbatim to `out`.
pub fn pread(
    input: &Path,
    offset: u64,
    length: usize,
    index_path: Option<&Path>,
    options: Options,
    out: &mut impl Write,
) -> Result<usize> {
    let mut driver = open_driver(input, options)?;
    if let Some(path) = index_path {
        let mut file = File::open(path).map_err(|source| Error::IndexFile {
            path: path.to_path_buf(),
            source,
        })?;
        driver.import_index(&mut file)?;
    }

    let mut buf = vec![0u8; length];
    let n = driver.pread(&mut buf, offset)?;
    out.write_all(&buf[..n]).map_err(Error::WriteOutput)?;
    Ok(n)
}

/// `zran cat`: decompress the whole stream to `out`, driving the engine's
/// ordinary forward `read` loop.
pub fn cat(input: &Path, options: Options, out: &mut impl Write) -> Result<u64> {
    let mut driver = open_driver(input, options)?;
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = driver.read(&mut buf)?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n]).map_err(Error::WriteOutput)?;
        total += n as u64;
    }
    Ok(total)
}
