use regex::Regex;
use std::path::Path;
use thiserror::Error;

/// Errors raised while deriving metadata for a single audio file
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("filename does not match the corpus pattern")]
    PatternMismatch,

    #[error("annotation sidecar not found: {0}")]
    SidecarMissing(String),

    #[error("annotation sidecar could not be read: {0}")]
    SidecarUnreadable(String),

    #[error("annotation sidecar is empty: {0}")]
    SidecarEmpty(String),
}

/// Metadata derived for one audio file, before validation
#[derive(Debug, Clone, Default)]
pub struct SampleMeta {
    pub label: Option<String>,
    pub speaker: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub birth_year: Option<u32>,
}

/// Per-corpus strategy for deriving label and speaker from an audio file.
///
/// Corpora differ in where they keep their annotations (structured filename
/// segments, adjacent sidecar files), so extraction is pluggable rather
/// than one hardcoded parser.
pub trait ExtractionRule {
    fn extract(&self, audio_path: &Path) -> Result<SampleMeta, ExtractError>;
}

/// Parse the recognized named captures out of a file stem
fn parse_stem(pattern: &Regex, reference_year: u32, stem: &str) -> Option<SampleMeta> {
    let caps = pattern.captures(stem)?;
    let get = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

    let gender_code = get("gender");
    let id = get("id");
    let birth_year = get("birth_year").and_then(|y| y.parse::<u32>().ok());

    // Speaker is either captured directly or composed as <gender>_<id>,
    // e.g. M_26 from G_1991_M_26_st
    let speaker = get("speaker").or_else(|| match (&gender_code, &id) {
        (Some(gender), Some(id)) => Some(format!("{}_{}", gender, id)),
        _ => None,
    });

    let gender = gender_code.map(|code| {
        if code.eq_ignore_ascii_case("m") {
            "male".to_string()
        } else {
            "female".to_string()
        }
    });

    let age = birth_year.map(|year| reference_year.saturating_sub(year));

    Some(SampleMeta {
        label: get("label"),
        speaker,
        gender,
        age,
        birth_year,
    })
}

/// Extraction rule reading everything from the audio filename.
///
/// Corpora without per-file emotion annotations get `fixed_label`
/// applied to every sample instead of a `label` capture.
pub struct FilenameRule {
    pattern: Regex,
    fixed_label: Option<String>,
    reference_year: u32,
}

impl FilenameRule {
    pub fn new(pattern: Regex, fixed_label: Option<String>, reference_year: u32) -> Self {
        Self {
            pattern,
            fixed_label,
            reference_year,
        }
    }
}

impl ExtractionRule for FilenameRule {
    fn extract(&self, audio_path: &Path) -> Result<SampleMeta, ExtractError> {
        let stem = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or(ExtractError::PatternMismatch)?;

        let mut meta = parse_stem(&self.pattern, self.reference_year, stem)
            .ok_or(ExtractError::PatternMismatch)?;

        if meta.label.is_none() {
            meta.label = self.fixed_label.clone();
        }

        Ok(meta)
    }
}

/// Extraction rule reading the label from an adjacent annotation file
/// (same stem, configured extension). Speaker and the remaining metadata
/// still come from the filename pattern.
pub struct SidecarRule {
    pattern: Regex,
    extension: String,
    reference_year: u32,
}

impl SidecarRule {
    pub fn new(pattern: Regex, extension: String, reference_year: u32) -> Self {
        Self {
            pattern,
            extension,
            reference_year,
        }
    }
}

impl ExtractionRule for SidecarRule {
    fn extract(&self, audio_path: &Path) -> Result<SampleMeta, ExtractError> {
        let sidecar = audio_path.with_extension(&self.extension);
        if !sidecar.exists() {
            return Err(ExtractError::SidecarMissing(sidecar.display().to_string()));
        }

        let content = std::fs::read_to_string(&sidecar)
            .map_err(|_| ExtractError::SidecarUnreadable(sidecar.display().to_string()))?;
        let label = content.trim().to_string();
        if label.is_empty() {
            return Err(ExtractError::SidecarEmpty(sidecar.display().to_string()));
        }

        let stem = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or(ExtractError::PatternMismatch)?;

        let mut meta = parse_stem(&self.pattern, self.reference_year, stem)
            .ok_or(ExtractError::PatternMismatch)?;
        meta.label = Some(label);

        Ok(meta)
    }
}
