//! JSON-file profile persistence (whole-record overwrite)

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{ProfileError, StoredProfile, UserProfile};

#[derive(Error, Debug)]
pub enum ProfileStoreError {
  #[error("Failed to write profile: {0}")]
  Io(#[from] std::io::Error),

  #[error("Failed to serialize profile: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("Refusing to save invalid profile: {0}")]
  Invalid(#[from] ProfileError),
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
  path: PathBuf,
}

impl ProfileStore {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }

  pub fn path(&self) -> &PathBuf {
    &self.path
  }

  /// Load the stored profile. A missing file yields the defaults and missing
  /// fields are filled from the defaults. Unreadable values are kept out of
  /// the profile and listed in `invalid_fields`.
  pub fn load(&self) -> StoredProfile {
    if !self.path.exists() {
      debug!(path = %self.path.display(), "No profile on disk, using defaults");
      return StoredProfile::default();
    }

    let stored = match fs::read_to_string(&self.path) {
      Ok(json) => StoredProfile::from_json(&json),
      Err(e) => {
        warn!(path = %self.path.display(), error = %e, "Failed to read profile");
        StoredProfile::unreadable()
      }
    };
    if !stored.invalid_fields.is_empty() {
      warn!(
        path = %self.path.display(),
        fields = ?stored.invalid_fields,
        "Stored profile has unusable fields"
      );
    }
    stored
  }

  pub fn save(&self, profile: &UserProfile) -> Result<StoredProfile, ProfileStoreError> {
    profile.validate()?;

    let stored = StoredProfile {
      profile: profile.clone(),
      last_updated: Some(Utc::now()),
      invalid_fields: Vec::new(),
    };
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;

    info!(path = %self.path.display(), "Profile saved");
    Ok(stored)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Phase, TrainingMode};

  #[test]
  fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProfileStore::new(dir.path().join("user_profile.json"));

    let stored = store.load();
    assert_eq!(stored.profile, UserProfile::default());
    assert!(stored.last_updated.is_none());
  }

  #[test]
  fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProfileStore::new(dir.path().join("nested").join("user_profile.json"));
    let profile = UserProfile {
      weight_kg: 88.0,
      phase: Phase::Cutting,
      mode: TrainingMode::General,
      ..UserProfile::default()
    };

    let saved = store.save(&profile).unwrap();
    let loaded = store.load();

    assert_eq!(loaded.profile, profile);
    assert_eq!(loaded.last_updated, saved.last_updated);
    assert!(loaded.last_updated.is_some());
  }

  #[test]
  fn test_corrupt_file_is_flagged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user_profile.json");
    fs::write(&path, "{ weight: heavy").unwrap();

    let stored = ProfileStore::new(path).load();
    assert_eq!(stored.invalid_fields, vec![StoredProfile::UNREADABLE.to_string()]);
    assert!(stored.check().is_err());
  }

  #[test]
  fn test_bad_field_keeps_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user_profile.json");
    fs::write(&path, r#"{"weight_kg": "seventy", "phase": "Bulking"}"#).unwrap();

    let stored = ProfileStore::new(path).load();
    assert_eq!(stored.profile.phase, Phase::Bulking);
    assert_eq!(stored.invalid_fields, vec!["weight_kg".to_string()]);
  }

  #[test]
  fn test_invalid_profile_is_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user_profile.json");
    let store = ProfileStore::new(path.clone());
    let profile = UserProfile {
      height_cm: 0.0,
      ..UserProfile::default()
    };

    assert!(matches!(store.save(&profile), Err(ProfileStoreError::Invalid(_))));
    assert!(!path.exists());
  }
}
