use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use xxhash_rust::xxh3::Xxh3;

use crate::codec::{Codec, Decoder, Encoder};
use crate::format::Format;
use crate::task::FileTask;

/// Outcome of one successful file transcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeResult {
    /// Decoded bytes moved from input to output.
    pub bytes: u64,
    /// Wall time of the open, transfer and close sequence.
    pub elapsed: Duration,
    /// xxh3-64 of the decoded payload; only computed when verifying.
    pub digest: Option<u64>,
}

impl TranscodeResult {
    /// Bytes per elapsed microsecond, reported as MiB/s on the progress line.
    pub fn throughput(&self) -> u64 {
        let usec = (self.elapsed.as_micros() as u64).max(1);
        self.bytes / usec
    }
}

/// Drives one input codec into one output codec, one file at a time.
///
/// The codec pair is selected once and shared read-only; every call to
/// [`Transcoder::transcode`] opens its own adapters and buffer.
pub struct Transcoder {
    input: Arc<dyn Codec>,
    output: Arc<dyn Codec>,
    buffer_size: usize,
    verify: bool,
}

impl Transcoder {
    pub fn new(input: Arc<dyn Codec>, output: Arc<dyn Codec>, buffer_size: usize) -> anyhow::Result<Self> {
        if buffer_size == 0 {
            anyhow::bail!("transfer buffer size must be greater than zero");
        }
        if input.format() == output.format() {
            anyhow::bail!("input and output codecs are both {}", input.name());
        }
        Ok(Self {
            input,
            output,
            buffer_size,
            verify: false,
        })
    }

    /// Re-decode every produced file and compare it with what was written.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Convert `task.input` into `task.output` and print one progress line.
    ///
    /// On any failure the adapters that were opened are still closed before
    /// the error is returned; the first error wins.
    pub fn transcode(&self, task: &FileTask) -> anyhow::Result<TranscodeResult> {
        if task.from != self.input.format() || task.to != self.output.format() {
            anyhow::bail!(
                "task {:?} is {} -> {} but transcoder is {} -> {}",
                task.input,
                task.from,
                task.to,
                self.input.format(),
                self.output.format()
            );
        }

        let t0 = Instant::now();

        let mut decoder = self
            .input
            .open_decoder(&task.input)
            .with_context(|| format!("opening {} input {:?}", self.input.name(), task.input))?;

        let mut encoder = match self.output.open_encoder(&task.output) {
            Ok(encoder) => encoder,
            Err(e) => {
                if let Err(close_err) = decoder.close() {
                    tracing::debug!("closing {:?} after failed output open: {:#}", task.input, close_err);
                }
                return Err(e.context(format!("creating {} output {:?}", self.output.name(), task.output)));
            }
        };

        let mut buf = vec![0u8; self.buffer_size];
        // Null output leaves nothing to read back.
        let verifying = self.verify && self.output.format() != Format::Null;
        let mut hasher = verifying.then(Xxh3::new);
        let transfer = copy_stream(decoder.as_mut(), encoder.as_mut(), &mut buf, hasher.as_mut());

        // Input first, then output: the encoder finalizes last.
        let input_closed = decoder.close();
        let output_closed = encoder.close();

        let bytes = match transfer {
            Ok(bytes) => bytes,
            Err(e) => {
                for closed in [input_closed, output_closed] {
                    if let Err(close_err) = closed {
                        tracing::debug!("close after failed transfer of {:?}: {:#}", task.input, close_err);
                    }
                }
                return Err(e.context(format!("transcoding {:?}", task.input)));
            }
        };
        input_closed.with_context(|| format!("closing input {:?}", task.input))?;
        output_closed.with_context(|| format!("finalizing output {:?}", task.output))?;

        let elapsed = t0.elapsed();
        let result = TranscodeResult {
            bytes,
            elapsed,
            digest: hasher.map(|h| h.digest()),
        };

        if verifying {
            self.verify_output(task, &result)?;
        }

        println!(
            "{} -> {} [{} bytes; {} MiB/s]",
            task.input.display(),
            task.output.display(),
            result.bytes,
            result.throughput()
        );

        Ok(result)
    }

    /// Decode the produced file again and check length and digest.
    fn verify_output(&self, task: &FileTask, expected: &TranscodeResult) -> anyhow::Result<()> {
        let mut decoder = self
            .output
            .open_decoder(&task.output)
            .with_context(|| format!("reopening {:?} for verification", task.output))?;

        let mut buf = vec![0u8; self.buffer_size];
        let counted = digest_stream(decoder.as_mut(), &mut buf);
        decoder.close()?;
        let (bytes, digest) = counted.with_context(|| format!("verifying {:?}", task.output))?;

        let written = expected.digest.context("no digest recorded for verification")?;
        if bytes != expected.bytes || digest != written {
            anyhow::bail!(
                "verification of {:?} failed: wrote {} bytes (xxh3 {:016x}), read back {} bytes (xxh3 {:016x})",
                task.output,
                expected.bytes,
                written,
                bytes,
                digest
            );
        }
        tracing::debug!("verified {:?} ({} bytes, xxh3 {:016x})", task.output, bytes, digest);
        Ok(())
    }
}

/// Move chunks from `decoder` to `encoder` until end of stream, feeding
/// `hasher` when given. Returns the byte count.
fn copy_stream(
    decoder: &mut dyn Decoder,
    encoder: &mut dyn Encoder,
    buf: &mut [u8],
    mut hasher: Option<&mut Xxh3>,
) -> anyhow::Result<u64> {
    let mut total = 0u64;
    loop {
        let n = decoder.read_chunk(buf)?;
        if n == 0 {
            break;
        }
        encoder.write_chunk(&buf[..n])?;
        if let Some(h) = hasher.as_deref_mut() {
            h.update(&buf[..n]);
        }
        total += n as u64;
    }
    Ok(total)
}

fn digest_stream(decoder: &mut dyn Decoder, buf: &mut [u8]) -> anyhow::Result<(u64, u64)> {
    let mut hasher = Xxh3::new();
    let mut total = 0u64;
    loop {
        let n = decoder.read_chunk(buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    Ok((total, hasher.digest()))
}
