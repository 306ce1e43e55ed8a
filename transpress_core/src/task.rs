use std::path::{Path, PathBuf};

use crate::format::{Conversion, Format};

/// One input-to-output conversion unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub input: PathBuf,
    pub output: PathBuf,
    pub from: Format,
    pub to: Format,
}

impl FileTask {
    /// Build the task for `input` under `conversion`, deriving the sibling
    /// output path.
    pub fn new(input: impl Into<PathBuf>, conversion: &Conversion) -> anyhow::Result<Self> {
        let input = input.into();
        if conversion.from == conversion.to {
            anyhow::bail!("refusing to convert {:?} from {} to itself", input, conversion.from);
        }
        let output = derive_output_path(&input, &conversion.in_suffix, &conversion.out_suffix)?;
        Ok(Self {
            input,
            output,
            from: conversion.from,
            to: conversion.to,
        })
    }
}

/// Replace the trailing `.<in_suffix>` of the file name with `.<out_suffix>`.
///
/// Only the end of the name is considered, so `bz2-report.bz2` becomes
/// `bz2-report.gz`. The directory part is kept as-is.
pub fn derive_output_path(input: &Path, in_suffix: &str, out_suffix: &str) -> anyhow::Result<PathBuf> {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("input path {:?} has no UTF-8 file name", input))?;

    let base = name
        .strip_suffix(in_suffix)
        .and_then(|rest| rest.strip_suffix('.'))
        .filter(|base| !base.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!("file name {:?} does not end in \".{}\" after a base name", name, in_suffix)
        })?;

    Ok(input.with_file_name(format!("{}.{}", base, out_suffix)))
}
