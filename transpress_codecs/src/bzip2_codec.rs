use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use transpress_core::{Codec, Decoder, Encoder, Format};

use crate::stream::{create_output, decoder_for, flush_file, FinishWrite, StreamEncoder};

/// bzip2 with 900k blocks (level 9).
///
/// The decoder continues past a stream-end marker into any following stream,
/// so files produced by parallel compressors (`pbzip2`, `lbzip2`) decode in
/// full. Any other libbz2 status surfaces as a decode error.
pub struct Bzip2Codec;

impl Codec for Bzip2Codec {
    fn format(&self) -> Format {
        Format::Bzip2
    }

    fn open_decoder(&self, path: &Path) -> anyhow::Result<Box<dyn Decoder>> {
        decoder_for("bzip2", path, |file| Ok(MultiBzDecoder::new(BufReader::new(file))))
    }

    fn open_encoder(&self, path: &Path) -> anyhow::Result<Box<dyn Encoder>> {
        let sink = create_output(path)?;
        Ok(StreamEncoder::boxed("bzip2", BzEncoder::new(sink, Compression::best())))
    }
}

impl FinishWrite for BzEncoder<BufWriter<File>> {
    fn finish_stream(self) -> io::Result<()> {
        flush_file(self.finish()?)
    }
}
