//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Date helpers

use chrono::{NaiveDate, NaiveTime};
use sqlx::SqlitePool;
use std::path::Path;

use crate::config::AppConfig;
use crate::db::AppState;
use crate::food::FoodDatabase;
use crate::models::{
  MacroTotals, MealType, NutritionEntry, ProfileForm, SetRecord, TrainingGoal, TrainingMode,
  UserProfile, WorkoutEntry,
};
use crate::profile_store::ProfileStore;
use crate::targets::NutritionProtocol;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Full application state over an in-memory database, with the profile file
/// under `dir` and the built-in food database
pub async fn setup_test_state(dir: &Path) -> AppState {
  let config = AppConfig {
    data_dir: dir.to_path_buf(),
    food_db_path: dir.join("food_database.json"),
    protocol: NutritionProtocol::default(),
    log_filter: "info".to_string(),
  };
  AppState {
    db: setup_test_db().await,
    profiles: ProfileStore::new(config.profile_path()),
    foods: FoodDatabase::builtin(),
    config,
  }
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Reference profile: 70kg, 175cm, 25y male, moderate activity, maintenance
pub fn mock_profile() -> UserProfile {
  UserProfile {
    height_cm: 175.0,
    ..UserProfile::default()
  }
}

/// The reference profile as raw form input
pub fn mock_profile_form() -> ProfileForm {
  ProfileForm {
    weight: Some("70".to_string()),
    height: Some("175".to_string()),
    age: Some("25".to_string()),
    sex: Some("Male".to_string()),
    activity_level: Some("Moderate".to_string()),
    phase: Some("Maintenance".to_string()),
    ..ProfileForm::default()
  }
}

/// A 100g lunch item with the given macros
pub fn mock_nutrition_entry(
  date: NaiveDate,
  food: &str,
  calories: f64,
  protein: f64,
  carbs: f64,
  fat: f64,
) -> NutritionEntry {
  NutritionEntry::new(
    date,
    NaiveTime::from_hms_opt(12, 0, 0).expect("valid time"),
    food,
    100.0,
    MacroTotals {
      calories,
      protein,
      carbs,
      fat,
    },
    MealType::Lunch,
  )
  .expect("valid nutrition entry")
}

/// A Heavy Duty hypertrophy exercise with `n_sets` sets of 8x100 @ RPE 10,
/// in a 45 minute session
pub fn mock_workout_entry(date: NaiveDate, exercise: &str, n_sets: usize) -> WorkoutEntry {
  let set = SetRecord::new(8, 100.0, 10).expect("valid set");
  WorkoutEntry::new(
    date,
    exercise,
    vec![set; n_sets],
    TrainingGoal::Hypertrophy,
    TrainingMode::HeavyDuty,
    45,
  )
  .expect("valid workout entry")
}

/// ---------------------------------------------------------------------------
/// Date Helpers
/// ---------------------------------------------------------------------------

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('nutrition_log', 'workout_log')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 2, "Expected both log tables, got {:?}", tables);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    assert!(mock_profile().validate().is_ok());
    assert_eq!(mock_profile_form().parse().unwrap(), mock_profile());

    let entry = mock_nutrition_entry(date(2024, 3, 1), "Oats", 389.0, 16.9, 66.3, 6.9);
    assert_eq!(entry.quantity_g, 100.0);

    let workout = mock_workout_entry(date(2024, 3, 1), "Squats", 3);
    assert_eq!(workout.sets.len(), 3);
    assert_eq!(workout.volume(), 2400.0);
  }
}
