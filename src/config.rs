use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::corpus::{ExtractionRule, FilenameRule, SidecarRule};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub schema_version: u32,
    pub rule: RuleKind,

    /// Regex over the audio file stem. Recognized named captures:
    /// `label`, `speaker`, `gender` (M/F code), `birth_year`, `id`.
    pub filename_pattern: String,

    /// Label applied to every sample when the corpus carries no
    /// per-file emotion annotation
    pub fixed_label: Option<String>,

    /// Sidecar extension holding the label (sidecar rule only)
    pub label_extension: String,

    /// Sidecar extension holding the transcription, if the corpus has one
    pub transcription_extension: Option<String>,

    /// Closed label vocabulary; any other derived label is rejected
    pub labels: Vec<String>,

    /// Audio file extensions to pick up (case-insensitive)
    pub audio_extensions: Vec<String>,

    /// Year used to derive age from a captured birth year
    pub reference_year: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: 1,
            rule: RuleKind::Filename,
            filename_pattern: r"^G_(?P<birth_year>\d{4})_(?P<gender>[MF])_(?P<id>\d+)_st$"
                .to_string(),
            fixed_label: Some("unknown".to_string()),
            label_extension: "lab".to_string(),
            transcription_extension: Some("txt".to_string()),
            labels: vec![
                "angry".to_string(),
                "happy".to_string(),
                "neutral".to_string(),
                "sad".to_string(),
                "scared".to_string(),
                "unknown".to_string(),
            ],
            audio_extensions: vec!["wav".to_string()],
            reference_year: 2025,
        }
    }
}

impl Config {
    /// Load config from file, or create default
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .context("Failed to read config file")?;
            serde_json::from_str(&content)
                .context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .context("Failed to write config file")
    }

    /// Get the default config directory
    pub fn default_config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Failed to get home directory")?;
        Ok(home.join(".corpus-cli"))
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.json"))
    }

    /// Build the configured extraction rule
    pub fn build_rule(&self) -> Result<Box<dyn ExtractionRule>> {
        let pattern = Regex::new(&self.filename_pattern).with_context(|| {
            format!("Invalid filename pattern: {}", self.filename_pattern)
        })?;

        match self.rule {
            RuleKind::Filename => Ok(Box::new(FilenameRule::new(
                pattern,
                self.fixed_label.clone(),
                self.reference_year,
            ))),
            RuleKind::Sidecar => Ok(Box::new(SidecarRule::new(
                pattern,
                self.label_extension.clone(),
                self.reference_year,
            ))),
        }
    }

    /// Check whether a file extension selects an audio file
    pub fn is_audio_extension(&self, ext: &str) -> bool {
        self.audio_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Which extraction rule derives label and speaker for this corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Filename,
    Sidecar,
}

impl Default for RuleKind {
    fn default() -> Self {
        Self::Filename
    }
}

impl std::str::FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "filename" => Ok(Self::Filename),
            "sidecar" => Ok(Self::Sidecar),
            _ => Err(format!("Unknown rule kind: {}", s)),
        }
    }
}
