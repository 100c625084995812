use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::sample::Corpus;
use super::scanner::Scanned;

/// A single integrity violation found during scan or validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("{path}: cannot derive metadata ({reason})")]
    MissingMetadata { path: String, reason: String },

    #[error("{path}: label `{label}` is not in the label vocabulary")]
    UnknownLabel { path: String, label: String },

    #[error("{path}: duplicate file path")]
    DuplicatePath { path: String },

    #[error("{path}: empty speaker identifier")]
    EmptySpeaker { path: String },
}

/// Aggregate of every violation found in one run.
///
/// Raised once after the full pass, so one run reports every problem
/// instead of requiring repeated fix-and-rerun cycles.
#[derive(Debug)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "corpus validation failed with {} violation(s):",
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Assert the corpus invariants: path uniqueness, label-vocabulary
/// membership, non-empty speaker identifiers.
///
/// Returns the corpus unchanged on success. On failure, the error carries
/// every violation found, including those collected during the scan.
pub fn validate(scanned: Scanned, vocabulary: &[String]) -> Result<Corpus, ValidationError> {
    let Scanned {
        corpus,
        mut violations,
    } = scanned;

    let vocab: HashSet<&str> = vocabulary.iter().map(|s| s.as_str()).collect();
    let mut seen: HashSet<String> = HashSet::new();

    for sample in corpus.samples() {
        if !seen.insert(sample.file_path.clone()) {
            violations.push(Violation::DuplicatePath {
                path: sample.file_path.clone(),
            });
        }

        if !vocab.contains(sample.label.as_str()) {
            violations.push(Violation::UnknownLabel {
                path: sample.file_path.clone(),
                label: sample.label.clone(),
            });
        }

        if sample.speaker.trim().is_empty() {
            violations.push(Violation::EmptySpeaker {
                path: sample.file_path.clone(),
            });
        }
    }

    if violations.is_empty() {
        Ok(corpus)
    } else {
        Err(ValidationError { violations })
    }
}
