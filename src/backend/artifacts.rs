//! Emitted artifacts and writing them to an output directory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use golly_core::lang::conventions;

use super::errors::EmitError;

/// One emitted JavaScript file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// The package path (or bundle entry package) this artifact was emitted for.
    pub name: String,
    /// Complete JavaScript source.
    pub source: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// `<sanitized name>.js`
    pub fn file_name(&self) -> String {
        format!("{}.js", conventions::sanitize_path(&self.name))
    }

    /// Write the artifact into `dir`, creating the directory if needed. Returns the written path.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        fs::write(&path, &self.source)?;
        Ok(path)
    }
}

/// Fail if two artifacts would be written to the same file.
pub fn ensure_distinct_files(artifacts: &[Artifact]) -> Result<(), EmitError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for artifact in artifacts {
        let file = artifact.file_name();
        if let Some(first) = seen.insert(file.clone(), &artifact.name) {
            return Err(EmitError::NameCollision {
                name: file,
                first: first.to_string(),
                second: artifact.name.clone(),
            });
        }
    }
    Ok(())
}
