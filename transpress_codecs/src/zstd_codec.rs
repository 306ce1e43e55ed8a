use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use transpress_core::{Codec, Decoder, Encoder, Format};
use zstd::stream::read::Decoder as ZstdDecoder;
use zstd::stream::write::Encoder as ZstdEncoder;

use crate::stream::{create_output, decoder_for, flush_file, FinishWrite, StreamEncoder};

/// Zstandard streaming frames.
///
/// Decoding reads every frame in the file, so concatenated `.zst` files work.
pub struct ZstdCodec {
    /// Compression level (1 = fast / larger, 22 = slow / smallest).
    pub level: i32,
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self { level: 19 }
    }
}

impl ZstdCodec {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Codec for ZstdCodec {
    fn format(&self) -> Format {
        Format::Zstd
    }

    fn open_decoder(&self, path: &Path) -> anyhow::Result<Box<dyn Decoder>> {
        decoder_for("zstd", path, |file| Ok(ZstdDecoder::new(file)?))
    }

    fn open_encoder(&self, path: &Path) -> anyhow::Result<Box<dyn Encoder>> {
        let sink = create_output(path)?;
        let encoder = ZstdEncoder::new(sink, self.level)?;
        Ok(StreamEncoder::boxed("zstd", encoder))
    }
}

impl FinishWrite for ZstdEncoder<'static, BufWriter<File>> {
    fn finish_stream(self) -> io::Result<()> {
        flush_file(self.finish()?)
    }
}
