//! Safe wrapper around the raw `libz_sys::z_stream` buffer-pointer bookkeeping.

use std::ptr;

/// Owns a zeroed `z_stream` and the small amount of pointer juggling every
/// zlib call needs. Does not call `inflateInit2_`/`inflateEnd` itself; that
/// lifecycle belongs to [`crate::Inflater`], which is the only thing that
/// knows which mode the stream was initialised for.
pub(crate) struct Stream {
    inner: libz_sys::z_stream,
}

impl Stream {
    /// Build a zeroed `z_stream` ready to be passed to `inflateInit2_`.
    pub(crate) fn zeroed() -> Self {
        // SAFETY: z_stream is a POD struct; zlib requires zalloc/zfree/opaque
        // to be zeroed so it installs its own allocator.
        let inner = unsafe { std::mem::zeroed::<libz_sys::z_stream>() };
        Self { inner }
    }

    pub(crate) fn raw_mut(&mut self) -> &mut libz_sys::z_stream {
        &mut self.inner
    }

    pub(crate) fn set_next_input(&mut self, input: &[u8]) {
        let next_in = if input.is_empty() {
            ptr::null()
        } else {
            input.as_ptr()
        };

        self.inner.next_in = next_in;
        // libz-sys targets zlib's default (non-`Z_LARGE64`) uInt type for avail_in/out.
        self.inner.avail_in = u32::try_from(input.len()).unwrap_or(u32::MAX);
    }

    pub(crate) fn set_next_out(&mut self, output: &mut [u8]) {
        let next_out = if output.is_empty() {
            ptr::null_mut()
        } else {
            output.as_mut_ptr()
        };

        self.inner.next_out = next_out;
        self.inner.avail_out = u32::try_from(output.len()).unwrap_or(u32::MAX);
    }

    pub(crate) fn avail_in(&self) -> usize {
        self.inner.avail_in as usize
    }

    pub(crate) fn avail_out(&self) -> usize {
        self.inner.avail_out as usize
    }

    pub(crate) fn total_in(&self) -> u64 {
        self.inner.total_in
    }

    pub(crate) fn total_out(&self) -> u64 {
        self.inner.total_out
    }

    /// Raw `data_type` out-field zlib sets on every `inflate` call. Its low
    /// three bits are the number of unused bits left in the last consumed
    /// input byte; bit 0x80 marks that `inflate` just stopped exactly at a
    /// deflate block boundary; bit 0x40 marks "this was the last block".
    pub(crate) fn data_type(&self) -> i32 {
        self.inner.data_type
    }
}
