mod config;
mod corpus;
mod manifest;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use config::{Config, RuleKind};

/// Headless CLI for normalizing speech emotion corpora into tabular manifests
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a corpus tree and write the canonical manifest
    Normalize {
        /// Source root directory containing audio and annotation files
        root: PathBuf,

        /// Output manifest path
        #[arg(short, long, default_value = "metadata.csv")]
        output: PathBuf,

        /// Corpus config file (JSON; defaults to ~/.corpus-cli/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured extraction rule ("filename" or "sidecar")
        #[arg(long)]
        rule: Option<RuleKind>,

        /// Override the fixed label applied to every sample
        #[arg(long)]
        label: Option<String>,
    },

    /// Merge two prediction tables column-wise on their shared columns
    Merge {
        /// Left prediction table (CSV)
        left: PathBuf,

        /// Right prediction table (CSV)
        right: PathBuf,

        /// Output path for the combined table
        #[arg(short, long, default_value = "combined.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match args.command {
        Command::Normalize {
            root,
            output,
            config,
            rule,
            label,
        } => {
            let mut config = match config {
                Some(path) => Config::load(&path)?,
                None => Config::load(&Config::default_config_path()?)?,
            };
            if let Some(rule) = rule {
                config.rule = rule;
            }
            if let Some(label) = label {
                config.fixed_label = Some(label);
            }
            run_normalize(&root, &output, &config)
        }
        Command::Merge {
            left,
            right,
            output,
        } => manifest::merge(&left, &right, &output),
    }
}

/// Scan, validate, and write in strict sequence.
///
/// Validation must be exhaustive before any side effect: the manifest is
/// only written once the whole corpus has passed, so a failing run leaves
/// a previous manifest untouched.
fn run_normalize(root: &Path, output: &Path, config: &Config) -> Result<()> {
    let rule = config.build_rule()?;

    info!("Scanning corpus at {:?}", root);
    let scanned = corpus::scan(root, rule.as_ref(), config)?;
    let validated = corpus::validate(scanned, &config.labels)?;

    manifest::write(&validated, output)?;

    println!("\n--- Corpus Summary ---");
    println!("Samples: {}", validated.len());
    println!("Speakers: {}", validated.speaker_counts().len());
    println!("Labels:");
    for (label, count) in validated.label_counts() {
        println!("  {:<10} {}", label, count);
    }
    println!("\nManifest written to {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn emotion_config() -> Config {
        let mut config = Config::default();
        config.filename_pattern = r"^(?P<speaker>[a-z0-9]+)_(?P<label>[A-Za-z]+)$".to_string();
        config.fixed_label = None;
        config.labels = ["happy", "angry", "sad", "scared", "neutral"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        config.transcription_extension = None;
        config
    }

    #[test]
    fn test_normalize_writes_path_sorted_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("s02_angry.wav"), b"").unwrap();
        fs::write(data.join("s01_happy.wav"), b"").unwrap();

        let output = dir.path().join("metadata.csv");
        run_normalize(&data, &output, &emotion_config()).unwrap();

        let content = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("data/s01_happy.wav,happy,s01"));
        assert!(lines[2].starts_with("data/s02_angry.wav,angry,s02"));
    }

    #[test]
    fn test_normalize_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("s01_happy.wav"), b"").unwrap();
        fs::write(data.join("s02_sad.wav"), b"").unwrap();

        let config = emotion_config();
        let output = dir.path().join("metadata.csv");
        run_normalize(&data, &output, &config).unwrap();

        let rule = config.build_rule().unwrap();
        let scanned = corpus::scan(&data, rule.as_ref(), &config).unwrap();
        let direct = corpus::validate(scanned, &config.labels).unwrap();

        let from_manifest = manifest::read(&output).unwrap();
        assert_eq!(from_manifest, direct.samples());
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("s01_happy.wav"), b"").unwrap();
        fs::write(data.join("s02_angry.wav"), b"").unwrap();
        fs::write(data.join("s03_neutral.wav"), b"").unwrap();

        let config = emotion_config();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        run_normalize(&data, &first, &config).unwrap();
        run_normalize(&data, &second, &config).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_out_of_vocabulary_label_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("s01_happy.wav"), b"").unwrap();
        fs::write(data.join("s02_angry.wav"), b"").unwrap();
        fs::write(data.join("s03_XYZ.wav"), b"").unwrap();

        let output = dir.path().join("metadata.csv");
        fs::write(&output, "previous manifest").unwrap();

        let err = run_normalize(&data, &output, &emotion_config()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("data/s03_XYZ.wav"));
        assert!(message.contains("`XYZ`"));

        // The failing run must leave the previous manifest untouched
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "previous manifest"
        );
    }

    #[test]
    fn test_stress_corpus_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("G_1991_M_26_st.WAV"), b"").unwrap();
        fs::write(data.join("G_1991_M_26_st.txt"), "guten tag\n").unwrap();

        let output = dir.path().join("metadata.csv");
        run_normalize(&data, &output, &Config::default()).unwrap();

        let samples = manifest::read(&output).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].label, "unknown");
        assert_eq!(samples[0].speaker, "M_26");
        assert_eq!(samples[0].gender.as_deref(), Some("male"));
        assert_eq!(samples[0].age, Some(34));
        assert_eq!(samples[0].birth_year, Some(1991));
        assert_eq!(samples[0].transcription.as_deref(), Some("guten tag"));
    }
}
