//! Application configuration from the environment (`.env` is honoured)

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::targets::{MacroSplit, NutritionProtocol, ProtocolError};

pub const DATA_DIR_VAR: &str = "GYMRAT_DATA_DIR";
pub const FOOD_DB_VAR: &str = "GYMRAT_FOOD_DB";
pub const MACRO_SPLIT_VAR: &str = "GYMRAT_MACRO_SPLIT";
pub const PROTEIN_PER_KG_VAR: &str = "GYMRAT_PROTEIN_PER_KG";
pub const LOG_VAR: &str = "GYMRAT_LOG";

const DEFAULT_DATA_DIR: &str = "data";
const DB_FILE: &str = "gymrat.db";
const PROFILE_FILE: &str = "user_profile.json";
const FOOD_DB_FILE: &str = "food_database.json";

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("{var}: {source}")]
  Protocol {
    var: &'static str,
    #[source]
    source: ProtocolError,
  },

  #[error("{var} must be a number, got '{value}'")]
  NotANumber { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub data_dir: PathBuf,
  pub food_db_path: PathBuf,
  pub protocol: NutritionProtocol,
  pub log_filter: String,
}

impl AppConfig {
  /// Build from environment variables, after loading `.env` if present
  pub fn load() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_env()
  }

  pub fn from_env() -> Result<Self, ConfigError> {
    let data_dir = env::var(DATA_DIR_VAR)
      .map(PathBuf::from)
      .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
    let food_db_path = env::var(FOOD_DB_VAR)
      .map(PathBuf::from)
      .unwrap_or_else(|_| data_dir.join(FOOD_DB_FILE));

    let split = match env::var(MACRO_SPLIT_VAR) {
      Ok(value) => value.parse::<MacroSplit>().map_err(|source| ConfigError::Protocol {
        var: MACRO_SPLIT_VAR,
        source,
      })?,
      Err(_) => MacroSplit::default(),
    };
    let protein_per_kg = match env::var(PROTEIN_PER_KG_VAR) {
      Ok(value) => value.trim().parse::<f64>().map_err(|_| ConfigError::NotANumber {
        var: PROTEIN_PER_KG_VAR,
        value,
      })?,
      Err(_) => NutritionProtocol::default().protein_per_kg,
    };
    let protocol = NutritionProtocol::new(split, protein_per_kg).map_err(|source| {
      ConfigError::Protocol {
        var: PROTEIN_PER_KG_VAR,
        source,
      }
    })?;

    let log_filter = env::var(LOG_VAR).unwrap_or_else(|_| "info".to_string());

    Ok(Self {
      data_dir,
      food_db_path,
      protocol,
      log_filter,
    })
  }

  /// Point at a different data directory. The food database follows unless
  /// it was set explicitly.
  pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
    if self.food_db_path == self.data_dir.join(FOOD_DB_FILE) {
      self.food_db_path = data_dir.join(FOOD_DB_FILE);
    }
    self.data_dir = data_dir;
    self
  }

  pub fn db_path(&self) -> PathBuf {
    self.data_dir.join(DB_FILE)
  }

  pub fn profile_path(&self) -> PathBuf {
    self.data_dir.join(PROFILE_FILE)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn test_defaults() {
    temp_env::with_vars_unset(
      [DATA_DIR_VAR, FOOD_DB_VAR, MACRO_SPLIT_VAR, PROTEIN_PER_KG_VAR, LOG_VAR],
      || {
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.food_db_path, PathBuf::from("data/food_database.json"));
        assert_eq!(config.db_path(), PathBuf::from("data/gymrat.db"));
        assert_eq!(config.profile_path(), PathBuf::from("data/user_profile.json"));
        assert_eq!(config.protocol, NutritionProtocol::default());
        assert_eq!(config.log_filter, "info");
      },
    );
  }

  #[test]
  #[serial]
  fn test_overrides() {
    temp_env::with_vars(
      [
        (DATA_DIR_VAR, Some("/tmp/gym")),
        (FOOD_DB_VAR, None),
        (MACRO_SPLIT_VAR, Some("50/30/20")),
        (PROTEIN_PER_KG_VAR, Some("2.0")),
        (LOG_VAR, Some("debug")),
      ],
      || {
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/gym"));
        assert_eq!(config.food_db_path, PathBuf::from("/tmp/gym/food_database.json"));
        assert_eq!(config.protocol.split, MacroSplit::new(50.0, 30.0, 20.0).unwrap());
        assert_eq!(config.protocol.protein_per_kg, 2.0);
        assert_eq!(config.log_filter, "debug");
      },
    );
  }

  #[test]
  #[serial]
  fn test_invalid_split_is_rejected() {
    temp_env::with_vars(
      [(MACRO_SPLIT_VAR, Some("60/30/30")), (PROTEIN_PER_KG_VAR, None)],
      || {
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(MACRO_SPLIT_VAR));
      },
    );
  }

  #[test]
  #[serial]
  fn test_invalid_protein_per_kg_is_rejected() {
    temp_env::with_vars(
      [(MACRO_SPLIT_VAR, None), (PROTEIN_PER_KG_VAR, Some("lots"))],
      || {
        assert!(matches!(
          AppConfig::from_env(),
          Err(ConfigError::NotANumber { .. })
        ));
      },
    );
    temp_env::with_vars(
      [(MACRO_SPLIT_VAR, None), (PROTEIN_PER_KG_VAR, Some("-1"))],
      || {
        assert!(matches!(AppConfig::from_env(), Err(ConfigError::Protocol { .. })));
      },
    );
  }

  #[test]
  #[serial]
  fn test_with_data_dir_moves_default_food_db() {
    temp_env::with_vars_unset([DATA_DIR_VAR, FOOD_DB_VAR], || {
      let config = AppConfig::from_env().unwrap().with_data_dir(PathBuf::from("elsewhere"));
      assert_eq!(config.food_db_path, PathBuf::from("elsewhere/food_database.json"));
    });
    temp_env::with_vars(
      [(DATA_DIR_VAR, None), (FOOD_DB_VAR, Some("/srv/foods.json"))],
      || {
        let config = AppConfig::from_env().unwrap().with_data_dir(PathBuf::from("elsewhere"));
        assert_eq!(config.food_db_path, PathBuf::from("/srv/foods.json"));
      },
    );
  }
}
