use std::path::{Path, PathBuf};

use ml::{artifact, MlError, TrainedModel};

/// Where freshly trained models are persisted.
#[cfg_attr(test, mockall::automock)]
pub trait ModelStore: Send + Sync {
    fn save(&self, model: &TrainedModel) -> Result<(), MlError>;
}

/// Overwrites a single artifact file on every save.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelStore for FileModelStore {
    fn save(&self, model: &TrainedModel) -> Result<(), MlError> {
        artifact::save(model, &self.path)
    }
}
