pub mod nutrition;
pub mod profile;
pub mod workout;

use thiserror::Error;

pub use nutrition::{MacroTotals, MealType, NutritionEntry};
pub use profile::{
  ActivityLevel, ExperienceLevel, Phase, ProfileError, ProfileForm, Sex, StoredProfile,
  TrainingGoal, TrainingMode, UserProfile,
};
pub use workout::{SetRecord, WorkoutEntry};

/// Validation errors for logged entries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntryError {
  #[error("Missing field: {0}")]
  Missing(&'static str),

  #[error("Invalid {field}: {value}")]
  Invalid { field: &'static str, value: String },
}
