use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One audio file plus its derived metadata.
///
/// Field order is the manifest column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub file_path: String,
    pub label: String,
    pub speaker: String,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub birth_year: Option<u32>,
    pub transcription: Option<String>,
}

impl Sample {
    pub fn new(file_path: String, label: String, speaker: String) -> Self {
        Self {
            file_path,
            label,
            speaker,
            gender: None,
            age: None,
            birth_year: None,
            transcription: None,
        }
    }
}

/// The in-memory collection of all samples discovered from one source tree
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    samples: Vec<Sample>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample count per label, in label order
    pub fn label_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for sample in &self.samples {
            *counts.entry(sample.label.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Sample count per speaker, in speaker order
    pub fn speaker_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for sample in &self.samples {
            *counts.entry(sample.speaker.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

impl FromIterator<Sample> for Corpus {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}
