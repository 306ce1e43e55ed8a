pub mod codec;
pub mod dispatch;
pub mod fileset;
pub mod format;
pub mod pipeline;
pub mod task;

pub use codec::{Codec, Decoder, Encoder};
pub use dispatch::{dispatch, partition, DispatchConfig, DispatchReport, Schedule, WorkerReport};
pub use fileset::build_file_set;
pub use format::{Conversion, Format, DEFAULT_BUFFER_SIZE};
pub use pipeline::{TranscodeResult, Transcoder};
pub use task::{derive_output_path, FileTask};
