use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use transpress_core::{Codec, Decoder, Encoder, Format};

use crate::stream::{create_output, decoder_for, flush_file, FinishWrite, StreamEncoder};

/// gzip via flate2.
///
/// Always writes at maximum compression (level 9). Decoding follows every
/// member of a multi-member file, as `gzip -d` does.
pub struct GzipCodec;

impl Codec for GzipCodec {
    fn format(&self) -> Format {
        Format::Gzip
    }

    fn open_decoder(&self, path: &Path) -> anyhow::Result<Box<dyn Decoder>> {
        decoder_for("gzip", path, |file| Ok(MultiGzDecoder::new(BufReader::new(file))))
    }

    fn open_encoder(&self, path: &Path) -> anyhow::Result<Box<dyn Encoder>> {
        let sink = create_output(path)?;
        Ok(StreamEncoder::boxed("gzip", GzEncoder::new(sink, Compression::best())))
    }
}

impl FinishWrite for GzEncoder<BufWriter<File>> {
    fn finish_stream(self) -> io::Result<()> {
        flush_file(self.finish()?)
    }
}
