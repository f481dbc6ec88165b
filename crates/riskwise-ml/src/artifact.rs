//! On-disk model artifact.
//!
//! The artifact is the JSON encoding of a [`TrainedModel`]. It is private to
//! this crate's classifier and carries no compatibility promise.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::training::TrainedModel;

pub const DEFAULT_ARTIFACT_PATH: &str = "patient_risk_model.json";

/// Writes next to the target and renames over it, so a reader never sees a
/// partially written artifact.
pub fn save(model: &TrainedModel, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let staging = staging_path(path);

    let mut writer = BufWriter::new(File::create(&staging)?);
    serde_json::to_writer(&mut writer, model)?;
    writer.flush()?;
    drop(writer);

    fs::rename(&staging, path)?;
    debug!(path = %path.display(), "wrote model artifact");
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<TrainedModel> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}
