use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Read};
use std::path::Path;

use lz4_flex::frame::{FrameDecoder, FrameEncoder};
use transpress_core::{Codec, Decoder, Encoder, Format};

use crate::stream::{create_output, decoder_for, flush_file, FinishWrite, StreamEncoder};

/// LZ4 frame magic, little-endian on disk.
const LZ4_MAGIC: [u8; 4] = 0x184D_2204u32.to_le_bytes();
/// FLG bit: a 4-byte content checksum follows the end mark.
const FLG_CONTENT_CHECKSUM: u8 = 0x04;

/// LZ4 frame format, compatible with the `lz4` command line tool.
///
/// Fastest decode of the bundled codecs; the size reduction is the weakest.
/// Decoding reads every frame in the file and rejects anything after the last
/// frame that is not itself a frame.
pub struct Lz4Codec;

impl Codec for Lz4Codec {
    fn format(&self) -> Format {
        Format::Lz4
    }

    fn open_decoder(&self, path: &Path) -> anyhow::Result<Box<dyn Decoder>> {
        decoder_for("lz4", path, |file| Ok(MultiFrameDecoder::new(BufReader::new(file))))
    }

    fn open_encoder(&self, path: &Path) -> anyhow::Result<Box<dyn Encoder>> {
        Ok(StreamEncoder::boxed("lz4", FrameEncoder::new(create_output(path)?)))
    }
}

impl FinishWrite for FrameEncoder<BufWriter<File>> {
    fn finish_stream(self) -> io::Result<()> {
        let sink = self.finish().map_err(io::Error::other)?;
        flush_file(sink)
    }
}

// ── Multi-frame decoding ───────────────────────────────────────────────────

/// Decodes frame after frame until the source is exhausted.
///
/// `FrameDecoder` reports end of stream at the end of each frame, and also
/// when the source runs dry right before a block header. The frame bytes are
/// tracked so a frame that stops without its end mark is an error.
struct MultiFrameDecoder<R: Read> {
    frame: Option<FrameDecoder<FrameTracker<R>>>,
}

impl<R: BufRead> MultiFrameDecoder<R> {
    fn new(reader: R) -> Self {
        Self {
            frame: Some(FrameDecoder::new(FrameTracker::new(reader))),
        }
    }
}

impl<R: BufRead> Read for MultiFrameDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let Some(frame) = self.frame.as_mut() else {
                return Ok(0);
            };
            let n = frame.read(buf)?;
            if n > 0 || buf.is_empty() {
                return Ok(n);
            }

            let tracker = frame.get_mut();
            if !tracker.frame_complete() {
                return Err(io::Error::new(ErrorKind::UnexpectedEof, "lz4 frame ends without an end mark"));
            }
            if tracker.inner.fill_buf()?.is_empty() {
                return Ok(0);
            }

            // More bytes follow: they must parse as another frame.
            if let Some(done) = self.frame.take() {
                let mut tracker = done.into_inner();
                tracker.reset();
                self.frame = Some(FrameDecoder::new(tracker));
            }
        }
    }
}

/// Pass-through reader remembering the head and tail bytes of the current
/// frame.
struct FrameTracker<R> {
    inner: R,
    /// Magic plus FLG byte.
    head: Vec<u8>,
    tail: [u8; 8],
    seen: u64,
}

impl<R> FrameTracker<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            head: Vec::with_capacity(5),
            tail: [0xff; 8],
            seen: 0,
        }
    }

    fn reset(&mut self) {
        self.head.clear();
        self.tail = [0xff; 8];
        self.seen = 0;
    }

    /// True when the bytes consumed so far form a finished frame, or when the
    /// frame is not a standard LZ4 frame (skippable frames are checked by the
    /// decoder itself).
    fn frame_complete(&self) -> bool {
        if self.seen == 0 {
            return true;
        }
        if self.head.len() < 5 || self.head[..4] != LZ4_MAGIC[..] {
            return true;
        }
        if self.seen < 8 {
            return false;
        }
        let end_mark = if self.head[4] & FLG_CONTENT_CHECKSUM != 0 {
            &self.tail[..4]
        } else {
            &self.tail[4..]
        };
        end_mark.iter().all(|&b| b == 0)
    }
}

impl<R: Read> Read for FrameTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        let data = &buf[..n];

        let missing = 5usize.saturating_sub(self.head.len()).min(n);
        self.head.extend_from_slice(&data[..missing]);

        let keep = n.min(self.tail.len());
        self.tail.rotate_left(keep);
        let start = self.tail.len() - keep;
        self.tail[start..].copy_from_slice(&data[n - keep..]);

        self.seen += n as u64;
        Ok(n)
    }
}
