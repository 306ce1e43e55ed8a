use std::path::Path;

use crate::format::Format;

/// Core streaming compression abstraction.
///
/// A `Codec` is a stateless selector for one [`Format`]. It is chosen once per
/// run and shared read-only by every worker; each file gets its own live
/// [`Decoder`] and [`Encoder`] opened from it.
pub trait Codec: Send + Sync {
    fn format(&self) -> Format;

    /// Human-readable codec name for CLI display.
    fn name(&self) -> &'static str {
        self.format().name()
    }

    /// Open `path` for streaming decode.
    fn open_decoder(&self, path: &Path) -> anyhow::Result<Box<dyn Decoder>>;

    /// Create (or truncate) `path` for streaming encode.
    fn open_encoder(&self, path: &Path) -> anyhow::Result<Box<dyn Encoder>>;
}

/// Live decode state for one input stream.
pub trait Decoder {
    /// Fill `buf` with up to `buf.len()` decoded bytes.
    ///
    /// Returns `Ok(0)` at end of stream. Any codec error is returned as-is and
    /// ends the transfer.
    fn read_chunk(&mut self, buf: &mut [u8]) -> anyhow::Result<usize>;

    /// Release the underlying handle.
    fn close(self: Box<Self>) -> anyhow::Result<()>;
}

/// Live encode state for one output stream.
pub trait Encoder {
    /// Encode exactly `data`.
    fn write_chunk(&mut self, data: &[u8]) -> anyhow::Result<()>;

    /// Finalize the stream (trailers, checksums, buffered blocks), flush it to
    /// the sink and release the handle. Until this returns `Ok` the output is
    /// not guaranteed to be a complete, valid stream.
    fn close(self: Box<Self>) -> anyhow::Result<()>;
}
