use std::path::Path;

use transpress_core::{Codec, Decoder, Encoder, Format};

use crate::stream::{create_output, decoder_for, StreamEncoder};

/// Uncompressed files, read and written verbatim.
pub struct RawCodec;

impl Codec for RawCodec {
    fn format(&self) -> Format {
        Format::Raw
    }

    fn open_decoder(&self, path: &Path) -> anyhow::Result<Box<dyn Decoder>> {
        decoder_for("raw", path, Ok)
    }

    fn open_encoder(&self, path: &Path) -> anyhow::Result<Box<dyn Encoder>> {
        Ok(StreamEncoder::boxed("raw", create_output(path)?))
    }
}
