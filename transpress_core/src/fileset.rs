use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::format::Conversion;
use crate::task::FileTask;

/// Collect every file directly under `dir` named `<base>.<in_suffix>`, sorted
/// by name.
///
/// Directory order is filesystem-dependent; sorting recovers chronological
/// order for zero-padded names like `2010-01-01-00.bz2` and makes the
/// worker-to-file assignment reproducible across runs.
pub fn build_file_set(dir: &Path, conversion: &Conversion) -> anyhow::Result<Vec<FileTask>> {
    let names = matching_names(dir, &conversion.in_suffix)?;
    names
        .into_iter()
        .map(|name| FileTask::new(dir.join(name), conversion))
        .collect()
}

/// Sorted names of entries under `dir` ending in `.<suffix>` with a non-empty
/// base name. Directories are skipped; anything else (files, symlinks to
/// files) is kept.
pub fn matching_names(dir: &Path, suffix: &str) -> anyhow::Result<Vec<String>> {
    if suffix.is_empty() {
        anyhow::bail!("input format suffix cannot be empty");
    }
    let dotted = format!(".{}", suffix);

    let entries = fs::read_dir(dir).with_context(|| format!("opening directory {:?}", dir))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("reading directory {:?}", dir))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            tracing::warn!("skipping non UTF-8 file name {:?}", file_name);
            continue;
        };
        if name.len() <= dotted.len() || !name.ends_with(&dotted) {
            continue;
        }
        // Follows symlinks; an unreadable entry is left for the pipeline to report.
        if fs::metadata(entry.path()).map(|m| m.is_dir()).unwrap_or(false) {
            tracing::debug!("skipping directory {:?}", entry.path());
            continue;
        }
        names.push(name.to_string());
    }

    names.sort();
    Ok(names)
}
