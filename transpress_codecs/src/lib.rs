mod bzip2_codec;
mod gzip_codec;
mod lz4_codec;
mod null;
mod passthrough;
mod stream;
mod xz_codec;
mod zstd_codec;

pub use bzip2_codec::Bzip2Codec;
pub use gzip_codec::GzipCodec;
pub use lz4_codec::Lz4Codec;
pub use null::NullCodec;
pub use passthrough::RawCodec;
pub use xz_codec::XzCodec;
pub use zstd_codec::ZstdCodec;

use std::sync::Arc;

use transpress_core::{Codec, Format};

/// Resolve the bundled codec for `format` with its default settings.
///
/// Called once per run by the CLI; the returned codec is shared by every
/// worker and opens a fresh adapter per file.
pub fn codec_for(format: Format) -> Arc<dyn Codec> {
    match format {
        Format::Raw => Arc::new(RawCodec),
        Format::Gzip => Arc::new(GzipCodec),
        Format::Bzip2 => Arc::new(Bzip2Codec),
        Format::Xz => Arc::new(XzCodec::default()),
        Format::Null => Arc::new(NullCodec),
        Format::Zstd => Arc::new(ZstdCodec::default()),
        Format::Lz4 => Arc::new(Lz4Codec),
    }
}
