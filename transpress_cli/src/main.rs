use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, ValueEnum};

use transpress_codecs::{codec_for, XzCodec, ZstdCodec};
use transpress_core::{
    build_file_set, dispatch, Codec, Conversion, DispatchConfig, Format, Schedule, Transcoder, DEFAULT_BUFFER_SIZE,
};

/// Exit status for configuration and resource errors (the classic `-1`).
const EXIT_FATAL: u8 = 255;
/// Exit status under `--strict` when any file failed.
const EXIT_FILES_FAILED: u8 = 2;

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "transpress",
    about = "Convert every <dir>/*.<infmt> file to <outfmt>, in parallel",
    long_about = "Convert every <dir>/*.<infmt> file to <outfmt>, in parallel.\n\n\
                  Format tokens: bz2, gz, xz, zst, lz4, null (decode only, writes nothing). \
                  Any other token names uncompressed files, e.g. `log` or `txt`.",
    version
)]
struct Cli {
    /// Directory holding the input files
    dir: PathBuf,
    /// Input file suffix, without the leading dot (e.g. bz2)
    infmt: String,
    /// Output file suffix, without the leading dot (e.g. gz)
    outfmt: String,
    /// Number of workers (default: available CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Transfer buffer size in bytes
    #[arg(short, long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,
    /// How files are assigned to workers
    #[arg(long, value_enum, default_value_t = ScheduleArg::Strided)]
    schedule: ScheduleArg,
    /// Zstd compression level (1–22, only used when writing zst)
    #[arg(long, default_value_t = 19, value_parser = clap::value_parser!(i32).range(1..=22))]
    zstd_level: i32,
    /// xz preset (0–9, only used when writing xz)
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=9))]
    xz_preset: u32,
    /// Decode each produced file again and compare it with what was written
    #[arg(long)]
    verify: bool,
    /// Exit with status 2 if any file failed to convert
    #[arg(long)]
    strict: bool,
    /// Debug-level diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScheduleArg {
    /// Fixed stride: worker i takes files i, i+N, i+2N, …
    Strided,
    /// Workers pull the next file from a shared sorted queue
    Queue,
}

impl From<ScheduleArg> for Schedule {
    fn from(arg: ScheduleArg) -> Self {
        match arg {
            ScheduleArg::Strided => Schedule::Strided,
            ScheduleArg::Queue => Schedule::Queue,
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────

/// Output codec with the levels given on the command line.
fn output_codec(format: Format, zstd_level: i32, xz_preset: u32) -> Arc<dyn Codec> {
    match format {
        Format::Zstd => Arc::new(ZstdCodec::new(zstd_level)),
        Format::Xz => Arc::new(XzCodec::new(xz_preset)),
        other => codec_for(other),
    }
}

// ── Run ────────────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    // RUST_LOG wins when set.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "transpress=debug,transpress_core=debug,transpress_codecs=debug".to_string()
        } else {
            "transpress=info,transpress_core=info,transpress_codecs=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    tracing::info!("transpress: {:?} {} -> {}", cli.dir, cli.infmt, cli.outfmt);

    let conversion = Conversion::parse(&cli.infmt, &cli.outfmt)?;
    let mut config = DispatchConfig {
        schedule: cli.schedule.into(),
        ..DispatchConfig::default()
    };
    match cli.jobs {
        Some(0) => anyhow::bail!("--jobs must be at least 1"),
        Some(jobs) => config.workers = jobs,
        None => tracing::info!("detected {} CPUs", config.workers),
    }

    let output = output_codec(conversion.to, cli.zstd_level, cli.xz_preset);
    let transcoder = Transcoder::new(codec_for(conversion.from), output, cli.buffer_size)?.with_verify(cli.verify);

    let tasks = build_file_set(&cli.dir, &conversion)?;
    tracing::info!("processing {} files..", tasks.len());

    let t0 = Instant::now();
    let report = dispatch(tasks, &transcoder, &config)?;
    let elapsed = t0.elapsed();

    tracing::info!(
        "{} files, {} bytes decoded in {:.3}s",
        report.files(),
        report.bytes(),
        elapsed.as_secs_f64()
    );
    if !report.is_clean() {
        tracing::warn!(
            "{} files failed, {} skipped, {} workers not spawned, {} workers panicked",
            report.failures(),
            report.skipped_files,
            report.spawn_failures,
            report.panicked
        );
        if cli.strict {
            return Ok(ExitCode::from(EXIT_FILES_FAILED));
        }
    }

    Ok(ExitCode::SUCCESS)
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors exit 1; --help and --version exit 0.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
