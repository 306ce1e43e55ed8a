/// Adapter-level tests: every bundled codec is driven only through the
/// `Codec` / `Decoder` / `Encoder` traits, then cross-checked against the
/// reference decoders of the underlying libraries where it matters.
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use tempfile::TempDir;
use transpress_codecs::{codec_for, GzipCodec, Lz4Codec, NullCodec, XzCodec, ZstdCodec};
use transpress_core::{Codec, Format};

/// Generate `len` highly compressible bytes (repeating pattern).
fn compressible_bytes(len: usize) -> Vec<u8> {
    let pattern = b"2010-01-01T00:00:00Z GET /index.html 200 5120\n";
    (0..len).map(|i| pattern[i % pattern.len()]).collect()
}

/// Generate `len` deterministic bytes using a simple LCG.
fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = seed;
    (0..len)
        .map(|_| {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (rng >> 56) as u8
        })
        .collect()
}

fn encode(codec: &dyn Codec, path: &Path, data: &[u8], chunk: usize) {
    let mut enc = codec.open_encoder(path).unwrap();
    for piece in data.chunks(chunk) {
        enc.write_chunk(piece).unwrap();
    }
    enc.close().unwrap();
}

fn decode(codec: &dyn Codec, path: &Path, chunk: usize) -> Vec<u8> {
    let mut dec = codec.open_decoder(path).unwrap();
    let mut buf = vec![0u8; chunk];
    let mut out = Vec::new();
    loop {
        let n = dec.read_chunk(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    dec.close().unwrap();
    out
}

fn real_formats() -> impl Iterator<Item = Format> {
    Format::ALL.into_iter().filter(|f| *f != Format::Null)
}

// ── tests ──────────────────────────────────────────────────────────────────

#[test]
fn every_codec_streams_back_its_input() {
    let dir = TempDir::new().unwrap();
    let mut data = compressible_bytes(300 * 1024);
    data.extend(pseudo_random_bytes(70 * 1024, 7));

    for format in real_formats() {
        let codec = codec_for(format);
        assert_eq!(codec.format(), format);
        let path = dir.path().join(format!("payload.{}", format.default_suffix()));

        // Odd chunk sizes on both sides so no boundary lines up.
        encode(codec.as_ref(), &path, &data, 10_007);
        let back = decode(codec.as_ref(), &path, 4_093);
        assert_eq!(back, data, "{} round trip", format);
    }
}

#[test]
fn compressing_codecs_shrink_repetitive_data() {
    let dir = TempDir::new().unwrap();
    let data = compressible_bytes(512 * 1024);

    for format in [Format::Gzip, Format::Bzip2, Format::Xz, Format::Zstd, Format::Lz4] {
        let path = dir.path().join(format!("shrink.{}", format.default_suffix()));
        encode(codec_for(format).as_ref(), &path, &data, 64 * 1024);
        let size = fs::metadata(&path).unwrap().len();
        assert!(size < data.len() as u64 / 4, "{} wrote {} bytes", format, size);
    }
}

#[test]
fn xz_finish_step_writes_a_complete_stream() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trailer.xz");
    let data = pseudo_random_bytes(200 * 1024, 42);

    encode(&XzCodec::default(), &path, &data, 64 * 1024);

    let raw = fs::read(&path).unwrap();
    // Stream footer magic "YZ" closes every finished xz stream.
    assert_eq!(&raw[raw.len() - 2..], b"YZ");

    let mut reference = xz2::read::XzDecoder::new(raw.as_slice());
    let mut back = Vec::new();
    reference.read_to_end(&mut back).unwrap();
    assert_eq!(back, data);
}

#[test]
fn xz_presets_and_zstd_levels_round_trip() {
    let dir = TempDir::new().unwrap();
    let data = compressible_bytes(256 * 1024);

    for preset in [0, 3] {
        let codec = XzCodec::new(preset);
        let path = dir.path().join(format!("p{preset}.xz"));
        encode(&codec, &path, &data, 64 * 1024);
        assert_eq!(decode(&codec, &path, 4096), data, "xz preset {preset}");
    }
    for level in [1, 22] {
        let codec = ZstdCodec::new(level);
        let path = dir.path().join(format!("l{level}.zst"));
        encode(&codec, &path, &data, 64 * 1024);
        assert_eq!(decode(&codec, &path, 4096), data, "zstd level {level}");
    }
}

#[test]
fn gzip_is_written_at_maximum_compression() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("best.gz");
    encode(&GzipCodec, &path, &compressible_bytes(8192), 1024);

    let raw = fs::read(&path).unwrap();
    assert_eq!(&raw[..2], &[0x1f, 0x8b]);
    // XFL = 2: compressor used maximum compression.
    assert_eq!(raw[8], 2);

    let mut reference = flate2::read::GzDecoder::new(raw.as_slice());
    let mut back = Vec::new();
    reference.read_to_end(&mut back).unwrap();
    assert_eq!(back, compressible_bytes(8192));
}

#[test]
fn gzip_decodes_every_member() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("multi.gz");

    let mut file = fs::File::create(&path).unwrap();
    for part in [&b"first member\n"[..], &b"second member\n"[..]] {
        let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
        enc.write_all(part).unwrap();
        file.write_all(&enc.finish().unwrap()).unwrap();
    }
    drop(file);

    let back = decode(&GzipCodec, &path, 5);
    assert_eq!(back, b"first member\nsecond member\n");
}

#[test]
fn bzip2_decodes_concatenated_streams() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("multi.bz2");

    let mut file = fs::File::create(&path).unwrap();
    for part in [&b"block one\n"[..], &b"block two\n"[..]] {
        let mut enc = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::fast());
        enc.write_all(part).unwrap();
        file.write_all(&enc.finish().unwrap()).unwrap();
    }
    drop(file);

    let back = decode(codec_for(Format::Bzip2).as_ref(), &path, 64 * 1024);
    assert_eq!(back, b"block one\nblock two\n");
}

#[test]
fn xz_decodes_concatenated_streams() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("multi.xz");

    let mut file = fs::File::create(&path).unwrap();
    for part in [&b"one\n"[..], &b"two\n"[..]] {
        let mut enc = xz2::write::XzEncoder::new(Vec::new(), 1);
        enc.write_all(part).unwrap();
        file.write_all(&enc.finish().unwrap()).unwrap();
    }
    drop(file);

    let back = decode(&XzCodec::default(), &path, 3);
    assert_eq!(back, b"one\ntwo\n");
}

#[test]
fn zstd_decodes_every_frame() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("multi.zst");

    let mut bytes = zstd::encode_all(&b"one\n"[..], 3).unwrap();
    bytes.extend(zstd::encode_all(&b"two\n"[..], 3).unwrap());
    fs::write(&path, bytes).unwrap();

    let back = decode(codec_for(Format::Zstd).as_ref(), &path, 64 * 1024);
    assert_eq!(back, b"one\ntwo\n");
}

fn lz4_frame(payload: &[u8]) -> Vec<u8> {
    let mut enc = lz4_flex::frame::FrameEncoder::new(Vec::new());
    enc.write_all(payload).unwrap();
    enc.finish().unwrap()
}

#[test]
fn lz4_decodes_concatenated_frames() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("multi.lz4");

    let mut bytes = lz4_frame(b"one\n");
    bytes.extend(lz4_frame(b"two\n"));
    fs::write(&path, bytes).unwrap();

    let back = decode(&Lz4Codec, &path, 64 * 1024);
    assert_eq!(back, b"one\ntwo\n");
}

/// Read until end of stream; true if any chunk failed to decode.
fn decode_fails(codec: &dyn Codec, path: &Path) -> bool {
    let mut dec = codec.open_decoder(path).unwrap();
    let mut buf = vec![0u8; 4096];
    let failed = loop {
        match dec.read_chunk(&mut buf) {
            Ok(0) => break false,
            Ok(_) => continue,
            Err(_) => break true,
        }
    };
    dec.close().unwrap();
    failed
}

#[test]
fn lz4_trailing_garbage_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tail.lz4");

    let mut bytes = lz4_frame(b"payload\n");
    bytes.extend_from_slice(b"\x13\x37 not an lz4 frame at all");
    fs::write(&path, bytes).unwrap();

    assert!(decode_fails(&Lz4Codec, &path));
}

#[test]
fn truncated_streams_are_errors() {
    let dir = TempDir::new().unwrap();
    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();

    for format in [Format::Gzip, Format::Bzip2, Format::Xz, Format::Zstd, Format::Lz4] {
        let codec = codec_for(format);
        let path = dir.path().join(format!("cut.{}", format.default_suffix()));
        encode(codec.as_ref(), &path, &payload, 64 * 1024);

        let whole = fs::read(&path).unwrap();
        fs::write(&path, &whole[..whole.len() - 4]).unwrap();
        assert!(decode_fails(codec.as_ref(), &path), "{} accepted a truncated file", format);
    }
}

#[test]
fn zero_byte_files_decode_as_empty() {
    let dir = TempDir::new().unwrap();
    for format in Format::ALL {
        let path = dir.path().join(format!("empty.{}", format.default_suffix()));
        fs::File::create(&path).unwrap();
        let back = decode(codec_for(format).as_ref(), &path, 1024);
        assert!(back.is_empty(), "{} decoded {} bytes from an empty file", format, back.len());
    }
}

#[test]
fn empty_payload_encodes_to_a_valid_stream() {
    let dir = TempDir::new().unwrap();
    for format in [Format::Gzip, Format::Bzip2, Format::Xz, Format::Zstd, Format::Lz4] {
        let codec = codec_for(format);
        let path = dir.path().join(format!("nothing.{}", format.default_suffix()));
        encode(codec.as_ref(), &path, &[], 1);

        assert!(fs::metadata(&path).unwrap().len() > 0, "{} wrote no header", format);
        assert!(decode(codec.as_ref(), &path, 1024).is_empty());
    }
}

#[test]
fn corrupt_input_is_a_decode_error() {
    let dir = TempDir::new().unwrap();
    for format in [Format::Gzip, Format::Bzip2, Format::Xz, Format::Zstd, Format::Lz4] {
        let path = dir.path().join(format!("garbage.{}", format.default_suffix()));
        fs::write(&path, pseudo_random_bytes(4096, 99)).unwrap();

        let mut dec = codec_for(format).open_decoder(&path).unwrap();
        let mut buf = vec![0u8; 1024];
        let mut failed = false;
        for _ in 0..64 {
            match dec.read_chunk(&mut buf) {
                Ok(0) => break,
                Ok(_) => continue,
                Err(_) => {
                    failed = true;
                    break;
                }
            }
        }
        dec.close().unwrap();
        assert!(failed, "{} accepted random bytes", format);
    }
}

#[test]
fn null_encoder_creates_no_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sink.null");
    encode(&NullCodec, &path, &compressible_bytes(100_000), 4096);
    assert!(!path.exists());
}

#[test]
fn missing_input_fails_to_open() {
    let dir = TempDir::new().unwrap();
    for format in Format::ALL {
        let path = dir.path().join("absent");
        assert!(codec_for(format).open_decoder(&path).is_err(), "{}", format);
    }
}
