use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::corpus::{Corpus, Sample};

/// Manifest column header, in `Sample` field order
pub const MANIFEST_HEADER: [&str; 7] = [
    "file_path",
    "label",
    "speaker",
    "gender",
    "age",
    "birth_year",
    "transcription",
];

/// Serialize the corpus as an ordered manifest.
///
/// Writing is all-or-nothing: rows go to a temporary sibling file which is
/// renamed over the destination, so an interrupted run leaves the previous
/// manifest (or none) in place, never a truncated one.
pub fn write(corpus: &Corpus, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
    }

    // Atomic write: write to temp file, then rename
    let temp_path = output_path.with_extension("csv.tmp");
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&temp_path)
            .with_context(|| format!("Failed to create temp file {:?}", temp_path))?;
        writer
            .write_record(MANIFEST_HEADER)
            .with_context(|| format!("Failed to write header to {:?}", temp_path))?;
        for sample in corpus.samples() {
            writer
                .serialize(sample)
                .with_context(|| format!("Failed to serialize row for {}", sample.file_path))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {:?}", temp_path))?;
    }

    std::fs::rename(&temp_path, output_path)
        .with_context(|| format!("Failed to rename temp file to {:?}", output_path))?;

    info!("Wrote manifest with {} samples to {:?}", corpus.len(), output_path);
    Ok(())
}

/// Read a manifest back into sample records
pub fn read(path: &Path) -> Result<Vec<Sample>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open manifest {:?}", path))?;

    let mut samples = Vec::new();
    for row in reader.deserialize() {
        let sample: Sample =
            row.with_context(|| format!("Failed to parse manifest row in {:?}", path))?;
        samples.push(sample);
    }
    Ok(samples)
}
