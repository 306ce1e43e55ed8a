//! Shared adapter plumbing: every bundled codec decodes through a `Read` and
//! encodes through a `Write` that knows how to finish its stream.

use std::fs::File;
use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use anyhow::Context;
use transpress_core::{Decoder, Encoder};

/// Open `path` for decoding.
///
/// Returns `None` for a zero-length file, which every codec treats as an
/// empty payload rather than a truncated stream.
pub(crate) fn open_input(path: &Path) -> anyhow::Result<Option<File>> {
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    let len = file.metadata().with_context(|| format!("stat {:?}", path))?.len();
    Ok(if len == 0 { None } else { Some(file) })
}

/// Create or truncate `path` for encoding.
pub(crate) fn create_output(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    Ok(BufWriter::new(file))
}

/// Flush a buffered file sink and drop the handle.
pub(crate) fn flush_file(sink: BufWriter<File>) -> io::Result<()> {
    sink.into_inner().map_err(|e| e.into_error())?;
    Ok(())
}

// ── Decoding ───────────────────────────────────────────────────────────────

/// Adapts any `Read` into a [`Decoder`].
pub(crate) struct StreamDecoder<R> {
    codec: &'static str,
    reader: R,
}

impl<R: Read> StreamDecoder<R> {
    pub(crate) fn boxed(codec: &'static str, reader: R) -> Box<dyn Decoder>
    where
        R: 'static,
    {
        Box::new(Self { codec, reader })
    }
}

impl<R: Read> Decoder for StreamDecoder<R> {
    fn read_chunk(&mut self, buf: &mut [u8]) -> anyhow::Result<usize> {
        loop {
            match self.reader.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(anyhow::Error::new(e).context(format!("{} decode error", self.codec))),
            }
        }
    }

    fn close(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Decoder for a zero-length source.
pub(crate) struct EmptyDecoder;

impl Decoder for EmptyDecoder {
    fn read_chunk(&mut self, _buf: &mut [u8]) -> anyhow::Result<usize> {
        Ok(0)
    }

    fn close(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Open `path` and wrap it with `wrap` unless it is empty.
pub(crate) fn decoder_for<R, F>(codec: &'static str, path: &Path, wrap: F) -> anyhow::Result<Box<dyn Decoder>>
where
    R: Read + 'static,
    F: FnOnce(File) -> anyhow::Result<R>,
{
    match open_input(path)? {
        Some(file) => Ok(StreamDecoder::boxed(codec, wrap(file)?)),
        None => Ok(Box::new(EmptyDecoder)),
    }
}

// ── Encoding ───────────────────────────────────────────────────────────────

/// A writer whose stream needs an explicit end step: trailers, checksums,
/// final frame. `finish_stream` also flushes the file underneath.
pub(crate) trait FinishWrite: Write {
    fn finish_stream(self) -> io::Result<()>;
}

impl FinishWrite for BufWriter<File> {
    fn finish_stream(self) -> io::Result<()> {
        flush_file(self)
    }
}

/// Adapts any [`FinishWrite`] into an [`Encoder`].
pub(crate) struct StreamEncoder<W> {
    codec: &'static str,
    writer: W,
}

impl<W: FinishWrite + 'static> StreamEncoder<W> {
    pub(crate) fn boxed(codec: &'static str, writer: W) -> Box<dyn Encoder> {
        Box::new(Self { codec, writer })
    }
}

impl<W: FinishWrite> Encoder for StreamEncoder<W> {
    fn write_chunk(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.writer
            .write_all(data)
            .with_context(|| format!("{} encode error", self.codec))
    }

    fn close(self: Box<Self>) -> anyhow::Result<()> {
        let codec = self.codec;
        self.writer
            .finish_stream()
            .with_context(|| format!("{} finish error", codec))
    }
}
