//! Local profile persistence with file locking.
//!
//! The CLI collects a profile once and reuses it for every later command.
//! Engines never read this file; they receive the profile as a parameter.

use crate::{Error, Result, UserProfile};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const PROFILE_FILE_NAME: &str = "profile.json";

/// Default profile location inside a data directory
pub fn profile_path(data_dir: &Path) -> PathBuf {
    data_dir.join(PROFILE_FILE_NAME)
}

impl UserProfile {
    /// Load a profile from a file with shared locking
    ///
    /// Returns `Ok(None)` if the file doesn't exist. A file that exists but
    /// cannot be parsed is an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::info!("No profile found at {:?}", path);
            return Ok(None);
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let profile = serde_json::from_str::<UserProfile>(&contents).map_err(|e| {
            Error::Profile(format!("Failed to parse profile {:?}: {}", path, e))
        })?;

        tracing::debug!("Loaded profile from {:?}", path);
        Ok(Some(profile))
    }

    /// Save the profile with exclusive locking
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Profile(format!("Profile path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Saved profile to {:?}", path);
        Ok(())
    }

    /// Range checks applied before a profile is stored
    ///
    /// Engines never call this.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(20..=600).contains(&self.current_bg) {
            errors.push(format!(
                "Blood glucose {} mg/dL outside 20-600",
                self.current_bg
            ));
        }
        if !(20.0..=300.0).contains(&self.weight_kg) {
            errors.push(format!("Weight {} kg outside 20-300", self.weight_kg));
        }
        if self.age == 0 {
            errors.push("Age must be positive".to_string());
        }
        if let Some(stress) = self.stress_level {
            if !(0.0..=10.0).contains(&stress) {
                errors.push(format!("Stress level {} outside 0-10", stress));
            }
        }

        errors
    }
}
