use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use transpress_core::{Codec, Decoder, Encoder, Format};
use xz2::read::XzDecoder;
use xz2::stream::{Action, Check, Status, Stream};

use crate::stream::{create_output, decoder_for, flush_file};

/// Output chunk handed to liblzma per `process_vec` call.
const OUT_CHUNK: usize = 64 * 1024;

/// xz container (LZMA2 filter, CRC64 check).
///
/// Encoding drives a raw liblzma stream: chunks go through `Action::Run`, and
/// `close` keeps calling with empty input and `Action::Finish` until the
/// stream reports its end, writing each piece of trailer output to the file
/// the same way ordinary chunks are written.
pub struct XzCodec {
    /// liblzma preset, 0..=9.
    pub preset: u32,
}

impl Default for XzCodec {
    fn default() -> Self {
        // Preset 9 needs ~670 MiB per encoder; with one encoder per worker that
        // adds up fast.
        Self { preset: 6 }
    }
}

impl XzCodec {
    pub fn new(preset: u32) -> Self {
        Self { preset }
    }
}

impl Codec for XzCodec {
    fn format(&self) -> Format {
        Format::Xz
    }

    fn open_decoder(&self, path: &Path) -> anyhow::Result<Box<dyn Decoder>> {
        decoder_for("xz", path, |file| Ok(XzDecoder::new_multi_decoder(BufReader::new(file))))
    }

    fn open_encoder(&self, path: &Path) -> anyhow::Result<Box<dyn Encoder>> {
        let stream = Stream::new_easy_encoder(self.preset, Check::Crc64)
            .with_context(|| format!("initializing xz encoder (preset {})", self.preset))?;
        let sink = create_output(path)?;
        Ok(Box::new(XzStreamEncoder {
            stream,
            sink,
            out: Vec::with_capacity(OUT_CHUNK),
        }))
    }
}

struct XzStreamEncoder {
    stream: Stream,
    sink: BufWriter<File>,
    out: Vec<u8>,
}

impl XzStreamEncoder {
    /// Run one `process_vec` step and write whatever it produced.
    /// Returns the number of input bytes consumed and the stream status.
    fn step(&mut self, input: &[u8], action: Action) -> anyhow::Result<(usize, Status)> {
        self.out.clear();
        let before = self.stream.total_in();
        let status = self
            .stream
            .process_vec(input, &mut self.out, action)
            .context("xz encode error")?;
        let consumed = (self.stream.total_in() - before) as usize;
        self.sink.write_all(&self.out).context("writing xz output")?;
        Ok((consumed, status))
    }
}

impl Encoder for XzStreamEncoder {
    fn write_chunk(&mut self, data: &[u8]) -> anyhow::Result<()> {
        let mut input = data;
        while !input.is_empty() {
            let (consumed, _) = self.step(input, Action::Run)?;
            input = &input[consumed..];
        }
        Ok(())
    }

    fn close(mut self: Box<Self>) -> anyhow::Result<()> {
        loop {
            let (_, status) = self.step(&[], Action::Finish)?;
            if matches!(status, Status::StreamEnd) {
                break;
            }
        }
        let XzStreamEncoder { sink, .. } = *self;
        flush_file(sink).context("xz finish error")
    }
}
