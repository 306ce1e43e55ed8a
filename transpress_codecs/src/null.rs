use std::path::Path;

use transpress_core::{Codec, Decoder, Encoder, Format};

use crate::stream::decoder_for;

/// Benchmark sink.
///
/// Decoding reads the file like [`RawCodec`](crate::RawCodec); encoding
/// discards every byte and never creates the output file, so a `bz2 -> null`
/// run measures decode throughput alone.
pub struct NullCodec;

impl Codec for NullCodec {
    fn format(&self) -> Format {
        Format::Null
    }

    fn open_decoder(&self, path: &Path) -> anyhow::Result<Box<dyn Decoder>> {
        decoder_for("null", path, Ok)
    }

    fn open_encoder(&self, _path: &Path) -> anyhow::Result<Box<dyn Encoder>> {
        Ok(Box::new(NullEncoder { discarded: 0 }))
    }
}

struct NullEncoder {
    discarded: u64,
}

impl Encoder for NullEncoder {
    fn write_chunk(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.discarded += data.len() as u64;
        Ok(())
    }

    fn close(self: Box<Self>) -> anyhow::Result<()> {
        tracing::trace!("null sink discarded {} bytes", self.discarded);
        Ok(())
    }
}
