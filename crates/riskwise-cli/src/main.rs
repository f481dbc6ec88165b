use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ml::{artifact, ForestParams, PatientRecord, TrainingConfig};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "riskwise-cli", about = "Train and score patient risk models offline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Model artifact to write or read
    #[arg(long, global = true, default_value = artifact::DEFAULT_ARTIFACT_PATH)]
    artifact: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a model on a JSON file of patients and write the artifact
    Train {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 100)]
        n_trees: usize,
        #[arg(long, default_value_t = 10)]
        max_depth: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Score a JSON file of patients with a stored artifact
    Predict {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the statistics stored with an artifact
    Info,
}

/// Accepts either a bare array or the `{"patients": [...]}` request body.
#[derive(Deserialize)]
#[serde(untagged)]
enum PatientFile {
    Batch { patients: Vec<PatientRecord> },
    List(Vec<PatientRecord>),
}

impl From<PatientFile> for Vec<PatientRecord> {
    fn from(file: PatientFile) -> Self {
        match file {
            PatientFile::Batch { patients } | PatientFile::List(patients) => patients,
        }
    }
}

fn read_patients(path: &Path) -> Result<Vec<PatientRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let parsed: PatientFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse patients from {}", path.display()))?;
    Ok(parsed.into())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Train { input, n_trees, max_depth, seed } => {
            let patients = read_patients(&input)?;
            let config = TrainingConfig {
                forest: ForestParams { n_trees, max_depth, seed },
                split_seed: seed,
                ..TrainingConfig::default()
            };
            let model = ml::train(&patients, &config)?;
            artifact::save(&model, &cli.artifact)
                .with_context(|| format!("Failed to write {}", cli.artifact.display()))?;
            info!(artifact = %cli.artifact.display(), "model saved");
            print_json(&model.statistics)?;
        }
        Commands::Predict { input } => {
            let model = artifact::load(&cli.artifact)
                .with_context(|| format!("Failed to load {}", cli.artifact.display()))?;
            let patients = read_patients(&input)?;
            print_json(&model.predict(&patients)?)?;
        }
        Commands::Info => {
            let model = artifact::load(&cli.artifact)
                .with_context(|| format!("Failed to load {}", cli.artifact.display()))?;
            print_json(&model.statistics)?;
        }
    }
    Ok(())
}
