use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;

use super::rules::ExtractionRule;
use super::sample::{Corpus, Sample};
use super::validate::Violation;

/// Result of one scan pass: the discovered corpus plus every per-file
/// derivation failure, collected so validation can report them all at once
#[derive(Debug)]
pub struct Scanned {
    pub corpus: Corpus,
    pub violations: Vec<Violation>,
}

/// Walk the source tree and derive one sample per discovered audio file.
///
/// Discovered paths are sorted before extraction, so the sample order (and
/// with it the manifest) is deterministic across runs on an unchanged tree.
pub fn scan(root: &Path, rule: &dyn ExtractionRule, config: &Config) -> Result<Scanned> {
    if !root.is_dir() {
        bail!("Source directory not found: {:?}", root);
    }

    // Paths are recorded relative to the root's parent, so rows read
    // "data/G_1991_M_26_st.WAV" rather than an absolute path
    let base = root.parent().unwrap_or_else(|| Path::new(""));

    let mut audio_files: Vec<(String, PathBuf)> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map_or(false, |ext| config.is_audio_extension(ext))
        })
        .map(|e| {
            let path = e.into_path();
            let rel = path
                .strip_prefix(base)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned();
            (rel, path)
        })
        .collect();

    audio_files.sort_by(|a, b| a.0.cmp(&b.0));

    info!("Found {} audio files under {:?}", audio_files.len(), root);
    if audio_files.is_empty() {
        warn!("No audio files found under {:?}", root);
    }

    let mut corpus = Corpus::new();
    let mut violations = Vec::new();

    for (rel, path) in audio_files {
        let meta = match rule.extract(&path) {
            Ok(meta) => meta,
            Err(e) => {
                violations.push(Violation::MissingMetadata {
                    path: rel,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let label = match meta.label {
            Some(label) => label,
            None => {
                violations.push(Violation::MissingMetadata {
                    path: rel,
                    reason: "no label derived from filename or configuration".to_string(),
                });
                continue;
            }
        };

        let transcription = read_transcription(&path, config);

        debug!("Sample {}: label={}, speaker={:?}", rel, label, meta.speaker);

        corpus.push(Sample {
            file_path: rel,
            label,
            speaker: meta.speaker.unwrap_or_default(),
            gender: meta.gender,
            age: meta.age,
            birth_year: meta.birth_year,
            transcription,
        });
    }

    Ok(Scanned { corpus, violations })
}

/// Read the adjacent transcription sidecar, if the corpus has them.
///
/// A missing or unreadable sidecar is a warning, not a validation failure;
/// the transcription feeds only the linguistic stage.
fn read_transcription(audio_path: &Path, config: &Config) -> Option<String> {
    let ext = config.transcription_extension.as_ref()?;
    let txt_path = audio_path.with_extension(ext);

    if !txt_path.exists() {
        warn!("No transcription file found for {:?}", audio_path);
        return None;
    }

    match std::fs::read_to_string(&txt_path) {
        Ok(content) => Some(content.trim().to_string()),
        Err(e) => {
            warn!("Could not read {:?}: {}", txt_path, e);
            None
        }
    }
}
