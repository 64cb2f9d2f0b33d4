//! The stream driver: a state machine around the inflater that builds the
//! access-point index incrementally, resumes from any point, handles
//! multi-member gzip streams, and exposes byte-granular seek+read.
//!
//! Modeled on the driving loop shape of a synchronous codec pipeline (refill
//! a buffer, hand slices to the backend, react to exhaustion/completion) —
//! here adapted from a one-shot copy loop into a stateful, resumable
//! seek/read surface, since unlike a one-shot compress/decompress pass this
//! loop must also pause to capture decoder state at block boundaries.

use std::io::{self, Read, Seek, SeekFrom, Write};

use inflate_safe::{InflateStatus, InflateStep, Inflater, Mode};

use crate::access_point::AccessPoint;
use crate::buffer::ReadAheadBuffer;
use crate::config::Options;
use crate::error::{Error, Result};
use crate::index::Index;
use crate::serialize;
use crate::source::SourceAdapter;

/// Driver lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No read/seek has been issued yet; no gzip header has been parsed.
    Fresh,
    /// Decoding within a gzip member's DEFLATE data.
    Streaming,
    /// Between a member's trailer and the next member's header.
    AtMemberBoundary,
    /// No further members remain; reads return zero bytes.
    Eof,
    /// An unrecoverable error occurred; every call returns the same error.
    Failed,
}

/// Result of a single [`Driver::step`] call.
enum StepOutcome {
    Progress(InflateStep),
    /// The source had no further bytes even though the inflater had not
    /// reached a block/stream boundary — a truncated/corrupt stream.
    SourceExhausted,
}

/// Drives inflation of a (possibly multi-member) gzip stream, maintaining an
/// [`Index`] of resumption points as it goes.
pub struct Driver<S: SourceAdapter> {
    src: S,
    buf: ReadAheadBuffer,
    inflater: Inflater,
    index: Index,
    options: Options,
    state: State,
    failure_reason: Option<String>,
    /// Whether ordinary (non-`build_full_index`) decoding is allowed to
    /// append mid-stream access points; gated by `Options::auto_build` and
    /// temporarily forced on for the duration of `build_full_index`.
    indexing_enabled: bool,
    cursor_uncompressed: u64,
    /// Raw compressed bytes read ahead of the current position and not yet
    /// re-delivered, in read order. Used only to peek at the next member's
    /// magic bytes without losing them if they turn out not to be a header.
    pushback: Vec<u8>,
    member_crc: crc32fast::Hasher,
    member_uncompressed_len: u64,
    /// False when the current member was entered via a random-access resume
    /// into its middle (rather than its true header), so its CRC/ISIZE
    /// cannot be validated: see DESIGN.md's note on this open question.
    member_crc_trackable: bool,
}

impl<S: SourceAdapter> Driver<S> {
    /// Open a driver over `src` with the given options, using a heap-backed
    /// read-ahead buffer. No bytes are read and no gzip header is parsed
    /// until the first `read`/`seek`/`pread`/`build_full_index` call.
    pub fn open(src: S, options: Options) -> Self {
        let buf = ReadAheadBuffer::heap(options.readbuf_size());
        Self::from_parts(src, buf, options)
    }

    /// Open a driver with a caller-supplied read-ahead buffer (used by
    /// mmap-backed callers; see `zran-cli`'s file-opening helper).
    pub fn from_parts(src: S, buf: ReadAheadBuffer, options: Options) -> Self {
        let spacing = options.spacing();
        let indexing_enabled = options.auto_build();
        Self {
            src,
            buf,
            inflater: Inflater::init(Mode::Raw).expect("zlib inflateInit2_ never fails for a valid mode"),
            index: Index::new(spacing),
            options,
            state: State::Fresh,
            failure_reason: None,
            indexing_enabled,
            cursor_uncompressed: 0,
            pushback: Vec::new(),
            member_crc: crc32fast::Hasher::new(),
            member_uncompressed_len: 0,
            member_crc_trackable: true,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// The access-point index built so far.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Logical position in the uncompressed stream.
    pub fn tell(&self) -> u64 {
        self.cursor_uncompressed
    }

    /// `(compressed_offset, uncompressed_offset)` for every recorded point.
    pub fn seek_points(&self) -> Vec<(u64, u64)> {
        self.index.seek_points()
    }

    /// Export the index in the portable binary format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if writing fails.
    pub fn export_index(&self, writer: &mut impl Write) -> Result<()> {
        serialize::export_index(&self.index, writer, self.src.size_hint())
    }

    /// Replace this driver's index with one previously exported for the
    /// *same* compressed source. Re-validates compressed offsets against
    /// the source's size when known.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIndex`] if the format is malformed or a
    /// point's `compressed_offset`/`window_length` is inconsistent.
    pub fn import_index(&mut self, reader: &mut impl Read) -> Result<()> {
        let imported = serialize::import_index(reader, self.src.size_hint())?;
        self.index = imported;
        Ok(())
    }

    /// Decode the entire stream once, recording access points at the
    /// configured spacing regardless of `Options::auto_build`.
    ///
    /// # Errors
    ///
    /// Propagates any decode error encountered while walking the stream.
    pub fn build_full_index(&mut self) -> Result<()> {
        self.check_not_failed()?;
        let was_enabled = self.indexing_enabled;
        self.indexing_enabled = true;
        let result = self.build_full_index_inner();
        self.indexing_enabled = was_enabled;
        result.map_err(|e| self.poison(e))
    }

    fn build_full_index_inner(&mut self) -> Result<()> {
        self.goto(0)?;
        let mut scratch = [0u8; 64 * 1024];
        loop {
            let n = self.fill(&mut scratch)?;
            if n == 0 {
                break;
            }
        }
        self.index.set_total_uncompressed(self.cursor_uncompressed);
        self.index.set_built_complete(true);
        Ok(())
    }

    /// Read up to `buf.len()` bytes, returning the number actually read (0
    /// at end of stream — a benign short read, not an error).
    ///
    /// # Errors
    ///
    /// Returns `Ok(0)` at end of stream; propagates decode and I/O errors.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.check_not_failed()?;
        self.fill(buf).map_err(|e| self.poison(e))
    }

    /// Atomic seek + read, for callers that want a single absolute-offset
    /// request (the façade in `crate::facade` additionally makes this safe
    /// across threads).
    ///
    /// # Errors
    ///
    /// Seeks to `abs` first, so it can resume from or add access points
    /// along the way.
    pub fn pread(&mut self, buf: &mut [u8], abs: u64) -> Result<usize> {
        self.seek(SeekFrom::Start(abs))?;
        self.read(buf)
    }

    /// Reposition the logical cursor. `SeekFrom::End` forces a full index
    /// build first if the total uncompressed size is not yet known.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCovered`] if the target lies past what has
    /// been indexed and automatic indexing is disabled.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.check_not_failed()?;
        match self.seek_inner(pos) {
            Ok(v) => Ok(v),
            Err(e) => Err(self.poison(e)),
        }
    }

    fn seek_inner(&mut self, pos: SeekFrom) -> Result<u64> {
        self.ensure_started()?;
        let target = match pos {
            SeekFrom::Start(abs) => abs,
            SeekFrom::Current(delta) => add_signed(self.cursor_uncompressed, delta),
            SeekFrom::End(delta) => {
                let total = match self.index.total_uncompressed() {
                    Some(t) => t,
                    None => {
                        self.build_full_index_inner()?;
                        self.index.total_uncompressed().expect("just computed")
                    }
                };
                add_signed(total, delta)
            }
        };
        self.goto(target)?;
        Ok(self.cursor_uncompressed)
    }

    /// Bring `cursor_uncompressed` to exactly `target`, resuming from the
    /// nearest preceding access point when a backward seek or a forward
    /// jump larger than one `spacing` is requested.
    fn goto(&mut self, target: u64) -> Result<()> {
        let gap = target.checked_sub(self.cursor_uncompressed);
        let needs_resume = match gap {
            None => true,
            Some(g) => g > self.index.spacing().max(1),
        };

        if needs_resume {
            if !self.src.is_seekable() {
                return Err(Error::NotCovered);
            }
            if !self.indexing_enabled && !self.index.built_complete() {
                let frontier = self.index.iter().last().map_or(0, |p| p.uncompressed_offset);
                if target > frontier {
                    return Err(Error::NotCovered);
                }
            }
            self.resume_from_index(target)?;
        }

        let mut scratch = [0u8; 64 * 1024];
        while self.cursor_uncompressed < target {
            if self.state == State::Eof {
                break;
            }
            let remaining = (target - self.cursor_uncompressed) as usize;
            let want = remaining.min(scratch.len());
            let n = self.fill(&mut scratch[..want])?;
            if n == 0 {
                break;
            }
        }
        Ok(())
    }

    /// Reposition the source and reinitialise the inflater from the access
    /// point nearest (but not after) `target`.
    fn resume_from_index(&mut self, target: u64) -> Result<()> {
        let point = self
            .index
            .find_by_uncompressed(target)
            .cloned()
            .unwrap_or_else(|| AccessPoint::stream_start(0, 0));

        let seek_pos = if point.bit_offset > 0 {
            point.compressed_offset - 1
        } else {
            point.compressed_offset
        };

        self.src.seek(seek_pos)?;
        self.buf.reset_to(seek_pos);
        self.inflater = Inflater::init(Mode::Raw)?;

        if point.bit_offset > 0 {
            let prev = self.take_raw_bytes(1)?;
            let prev_byte = *prev.first().ok_or_else(Self::corrupt_truncated)?;
            self.inflater.prime(point.bit_offset, prev_byte)?;
        }
        if !point.window.is_empty() {
            self.inflater.set_dictionary(&point.window)?;
        }

        self.cursor_uncompressed = point.uncompressed_offset;
        self.member_crc = crc32fast::Hasher::new();
        self.member_uncompressed_len = 0;
        self.member_crc_trackable = point.is_stream_start;
        self.state = State::Streaming;
        Ok(())
    }

    /// Parse the first gzip member's header if nothing has been decoded
    /// yet. A no-op once the driver has left `State::Fresh`.
    fn ensure_started(&mut self) -> Result<()> {
        if self.state != State::Fresh {
            return Ok(());
        }
        self.read_gzip_header()?;
        self.index.append(AccessPoint::stream_start(0, self.buf.position()));
        self.state = State::Streaming;
        Ok(())
    }

    /// Fill as much of `out` as decoding will yield before end of stream.
    /// Updates CRC/length accumulators and the access-point index as it
    /// goes, regardless of whether the caller ultimately keeps the bytes
    /// (seek's forward-discard reuses this exact path).
    fn fill(&mut self, mut out: &mut [u8]) -> Result<usize> {
        self.ensure_started()?;
        let mut written = 0usize;

        while !out.is_empty() && self.state != State::Eof {
            let outcome = self.step(out)?;
            let step = match outcome {
                StepOutcome::Progress(step) => step,
                StepOutcome::SourceExhausted => return Err(Self::corrupt_truncated()),
            };

            if step.produced > 0 {
                self.member_crc.update(&out[..step.produced]);
                self.member_uncompressed_len += step.produced as u64;
                self.cursor_uncompressed += step.produced as u64;
            }
            written += step.produced;
            out = &mut out[step.produced..];

            match step.status {
                InflateStatus::BlockEnd => self.maybe_add_access_point()?,
                InflateStatus::StreamEnd => {
                    self.finalize_member()?;
                    if !self.try_start_next_member()? {
                        self.state = State::Eof;
                        break;
                    }
                }
                InflateStatus::NeedInput | InflateStatus::Continue => {}
            }
        }

        Ok(written)
    }

    /// Drive the inflater by exactly one `inflate()` call, refilling the
    /// read-ahead buffer from the source first if it is empty.
    fn step(&mut self, out: &mut [u8]) -> Result<StepOutcome> {
        if self.inflater.avail_in() == 0 {
            if self.buf.remaining() == 0 {
                let got = self.buf.refill(&mut self.src)?;
                if got == 0 {
                    return Ok(StepOutcome::SourceExhausted);
                }
            }
            self.inflater.set_input(self.buf.pending());
        }

        let avail_before = self.inflater.avail_in();
        let step = self.inflater.inflate(out)?;
        let consumed = avail_before - self.inflater.avail_in();
        self.buf.advance(consumed);
        Ok(StepOutcome::Progress(step))
    }

    /// Placement policy: append a mid-stream point when
    /// indexing is enabled and the last point is at least `spacing` behind.
    fn maybe_add_access_point(&mut self) -> Result<()> {
        if !self.indexing_enabled || self.index.spacing() == 0 {
            return Ok(());
        }
        let should_add = match self.index.iter().next_back() {
            None => true,
            Some(last) => {
                self.cursor_uncompressed.saturating_sub(last.uncompressed_offset) >= self.index.spacing()
            }
        };
        if should_add {
            let (_, bit_offset) = self.inflater.stream_position_bits();
            let window = self.inflater.get_window()?;
            self.index.append(AccessPoint::block_boundary(
                self.cursor_uncompressed,
                self.buf.position(),
                bit_offset,
                window,
            ));
        }
        Ok(())
    }

    /// Validate the just-finished member's trailing CRC32/ISIZE, unless
    /// `skip_crc_check` is set or this member was entered mid-stream via a
    /// random-access resume (see `member_crc_trackable`).
    fn finalize_member(&mut self) -> Result<()> {
        let trailer = self.take_raw_bytes(8)?;
        if trailer.len() < 8 {
            return Err(Self::corrupt_truncated());
        }
        let expected_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        let expected_isize = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

        if !self.options.skip_crc_check() && self.member_crc_trackable {
            let hasher = std::mem::replace(&mut self.member_crc, crc32fast::Hasher::new());
            let actual_crc = hasher.finalize();
            if actual_crc != expected_crc {
                return Err(Error::CrcMismatch {
                    expected: expected_crc,
                    actual: actual_crc,
                });
            }
            let actual_isize = (self.member_uncompressed_len & 0xFFFF_FFFF) as u32;
            if actual_isize != expected_isize {
                return Err(Error::SizeMismatch {
                    expected: expected_isize,
                    actual: actual_isize,
                });
            }
        }
        Ok(())
    }

    /// Skip null padding, then parse and attach the next member if the
    /// remaining bytes begin with a valid gzip header; otherwise the stream
    /// has ended.
    fn try_start_next_member(&mut self) -> Result<bool> {
        self.skip_null_padding()?;
        let magic = self.take_raw_bytes(2)?;
        if magic.len() < 2 || magic[0] != 0x1f || magic[1] != 0x8b {
            self.unread(magic);
            return Ok(false);
        }
        self.unread(magic);

        self.read_gzip_header()?;
        self.inflater.reset_for_new_member()?;
        // `inflateReset2` doesn't clear `next_in`/`avail_in`; without this the
        // next `step()` sees leftover input from the previous member's trailer
        // and skips refilling from `buf` at the new member's actual position.
        self.inflater.set_input(&[]);
        self.member_crc = crc32fast::Hasher::new();
        self.member_uncompressed_len = 0;
        self.member_crc_trackable = true;
        self.index
            .append(AccessPoint::stream_start(self.cursor_uncompressed, self.buf.position()));
        self.state = State::Streaming;
        Ok(true)
    }

    fn skip_null_padding(&mut self) -> Result<()> {
        loop {
            let b = self.take_raw_bytes(1)?;
            match b.first() {
                None => break,
                Some(0) => continue,
                Some(_) => {
                    self.unread(b);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Parse and consume one RFC 1952 gzip member header (fixed 10 bytes
    /// plus any optional FEXTRA/FNAME/FCOMMENT/FHCRC fields).
    fn read_gzip_header(&mut self) -> Result<()> {
        let fixed = self.take_raw_bytes(10)?;
        if fixed.len() < 10 || fixed[0] != 0x1f || fixed[1] != 0x8b || fixed[2] != 8 {
            return Err(Self::corrupt_truncated());
        }
        let flags = fixed[3];

        if flags & 0x04 != 0 {
            // FEXTRA
            let xlen_bytes = self.take_raw_bytes(2)?;
            if xlen_bytes.len() < 2 {
                return Err(Self::corrupt_truncated());
            }
            let xlen = u16::from_le_bytes([xlen_bytes[0], xlen_bytes[1]]) as usize;
            self.take_raw_bytes(xlen)?;
        }
        if flags & 0x08 != 0 {
            // FNAME
            self.read_cstring()?;
        }
        if flags & 0x10 != 0 {
            // FCOMMENT
            self.read_cstring()?;
        }
        if flags & 0x02 != 0 {
            // FHCRC
            self.take_raw_bytes(2)?;
        }
        Ok(())
    }

    fn read_cstring(&mut self) -> Result<()> {
        loop {
            let b = self.take_raw_bytes(1)?;
            if b.is_empty() || b[0] == 0 {
                break;
            }
        }
        Ok(())
    }

    /// Pull exactly (or fewer, at true source EOF) `n` raw compressed bytes
    /// directly from the read-ahead buffer/source, bypassing the inflater.
    /// Used for gzip headers, trailers, and padding. Drains any bytes
    /// stashed by [`Self::unread`] first, then refills the buffer as many
    /// times as needed if `n` spans a chunk boundary.
    fn take_raw_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n);
        if !self.pushback.is_empty() {
            let take = self.pushback.len().min(n);
            out.extend(self.pushback.drain(..take));
        }
        while out.len() < n {
            if self.buf.remaining() == 0 {
                let got = self.buf.refill(&mut self.src)?;
                if got == 0 {
                    break;
                }
            }
            let take = self.buf.remaining().min(n - out.len());
            out.extend_from_slice(&self.buf.pending()[..take]);
            self.buf.advance(take);
        }
        Ok(out)
    }

    /// Stash bytes previously obtained from [`Self::take_raw_bytes`] so the
    /// next call returns them again, for lookahead that turns out not to
    /// match what was expected (gzip magic, null padding).
    fn unread(&mut self, bytes: Vec<u8>) {
        if bytes.is_empty() {
            return;
        }
        let mut combined = bytes;
        combined.extend(std::mem::take(&mut self.pushback));
        self.pushback = combined;
    }

    fn corrupt_truncated() -> Error {
        Error::CorruptData(inflate_safe::Error::DataError)
    }

    fn check_not_failed(&self) -> Result<()> {
        if self.state == State::Failed {
            return Err(Error::Poisoned(
                self.failure_reason.clone().unwrap_or_default(),
            ));
        }
        Ok(())
    }

    fn poison(&mut self, err: Error) -> Error {
        if err.poisons_driver() {
            self.state = State::Failed;
            self.failure_reason = Some(err.to_string());
        }
        err
    }
}

/// Add a signed delta to an unsigned offset, saturating at 0 (seeking
/// lands beyond EOF for `start`/`current` whence without error; it does not
/// sanction going negative).
fn add_signed(base: u64, delta: i64) -> u64 {
    if delta >= 0 {
        base.saturating_add(delta as u64)
    } else {
        base.saturating_sub(delta.unsigned_abs())
    }
}

impl<S: SourceAdapter> Read for Driver<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Driver::read(self, buf).map_err(io::Error::from)
    }
}

impl<S: SourceAdapter> Seek for Driver<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Driver::seek(self, pos).map_err(io::Error::from)
    }
}
