use std::fmt;

/// Default transfer buffer size: 64 KB.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

// ── Suffix tokens ──────────────────────────────────────────────────────────

pub const SUFFIX_GZIP: &str = "gz";
pub const SUFFIX_BZIP2: &str = "bz2";
pub const SUFFIX_XZ: &str = "xz";
pub const SUFFIX_NULL: &str = "null";
pub const SUFFIX_ZSTD: &str = "zst";
pub const SUFFIX_LZ4: &str = "lz4";

// ── Format ─────────────────────────────────────────────────────────────────

/// Compression format of one side of a conversion.
///
/// Formats are identified by the file suffix token given on the command line.
/// Tokens that name no known codec map to [`Format::Raw`], so `log` or `txt`
/// select uncompressed files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Raw,
    Gzip,
    Bzip2,
    Xz,
    /// Reads like `Raw`, discards everything written. Used to benchmark decode.
    Null,
    Zstd,
    Lz4,
}

impl Format {
    pub const ALL: [Format; 7] = [
        Format::Raw,
        Format::Gzip,
        Format::Bzip2,
        Format::Xz,
        Format::Null,
        Format::Zstd,
        Format::Lz4,
    ];

    /// Map a suffix token (without the leading dot) to its format.
    pub fn from_suffix(token: &str) -> anyhow::Result<Self> {
        if token.is_empty() {
            anyhow::bail!("format suffix cannot be empty");
        }
        Ok(match token {
            SUFFIX_BZIP2 => Format::Bzip2,
            SUFFIX_GZIP => Format::Gzip,
            SUFFIX_XZ => Format::Xz,
            SUFFIX_NULL => Format::Null,
            SUFFIX_ZSTD => Format::Zstd,
            SUFFIX_LZ4 => Format::Lz4,
            _ => Format::Raw,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Raw => "raw",
            Format::Gzip => "gzip",
            Format::Bzip2 => "bzip2",
            Format::Xz => "xz",
            Format::Null => "null",
            Format::Zstd => "zstd",
            Format::Lz4 => "lz4",
        }
    }

    /// Canonical file suffix for this format. `Raw` has no token of its own
    /// (any unknown token selects it), so `raw` stands in.
    pub fn default_suffix(&self) -> &'static str {
        match self {
            Format::Raw => "raw",
            Format::Gzip => SUFFIX_GZIP,
            Format::Bzip2 => SUFFIX_BZIP2,
            Format::Xz => SUFFIX_XZ,
            Format::Null => SUFFIX_NULL,
            Format::Zstd => SUFFIX_ZSTD,
            Format::Lz4 => SUFFIX_LZ4,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────

/// The run-wide conversion: input suffix/format to output suffix/format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub in_suffix: String,
    pub out_suffix: String,
    pub from: Format,
    pub to: Format,
}

impl Conversion {
    /// Validate a pair of suffix tokens.
    ///
    /// Fails on empty tokens, tokens containing a path separator or dot, and
    /// pairs that resolve to the same format (`gz gz`, or `txt log` which are
    /// both raw).
    pub fn parse(in_suffix: &str, out_suffix: &str) -> anyhow::Result<Self> {
        for token in [in_suffix, out_suffix] {
            if token.contains(['/', '\\', '.']) {
                anyhow::bail!("invalid format suffix {:?}: give the bare token, e.g. \"gz\"", token);
            }
        }
        let from = Format::from_suffix(in_suffix)?;
        let to = Format::from_suffix(out_suffix)?;
        if from == to {
            anyhow::bail!(
                "input and output formats are both {} ({} -> {}); nothing to convert",
                from,
                in_suffix,
                out_suffix
            );
        }
        Ok(Self {
            in_suffix: in_suffix.to_string(),
            out_suffix: out_suffix.to_string(),
            from,
            to,
        })
    }
}
