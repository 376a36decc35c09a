//! Workout logging commands

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::AppState;
use crate::log_store;
use crate::models::{EntryError, SetRecord, TrainingGoal, TrainingMode, WorkoutEntry};
use crate::training::{TrainingGuide, TrainingParameters};

/// One exercise as entered: `Name:8x100@10,6x100@10`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExerciseInput {
  pub name: String,
  pub sets: Vec<SetRecord>,
}

impl std::str::FromStr for ExerciseInput {
  type Err = EntryError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (name, sets) = s.rsplit_once(':').ok_or_else(|| EntryError::Invalid {
      field: "exercise",
      value: s.to_string(),
    })?;
    let sets = sets
      .split(',')
      .filter(|set| !set.trim().is_empty())
      .map(|set| set.trim().parse::<SetRecord>())
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self {
      name: name.trim().to_string(),
      sets,
    })
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogWorkoutRequest {
  pub exercises: Vec<ExerciseInput>,
  /// Defaults to the current local date
  pub date: Option<NaiveDate>,
  /// Goal and mode default to the profile's
  pub goal: Option<String>,
  pub mode: Option<String>,
  pub duration_minutes: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggedWorkout {
  pub session_id: i64,
  pub exercises: Vec<WorkoutEntry>,
  /// Sets or reps outside the goal's suggested ranges
  pub notes: Vec<String>,
}

/// Save a session: every exercise shares the date, goal, mode and duration
pub async fn log_workout(state: &AppState, request: LogWorkoutRequest) -> Result<LoggedWorkout, String> {
  if request.exercises.is_empty() {
    return Err("Failed to log workout: no exercises given".to_string());
  }

  let profile = state.profiles.load().profile;
  let goal = match request.goal.as_deref() {
    Some(text) => text
      .parse::<TrainingGoal>()
      .map_err(|e| format!("Failed to log workout: {}", e))?,
    None => profile.goal,
  };
  let mode = match request.mode.as_deref() {
    Some(text) => text
      .parse::<TrainingMode>()
      .map_err(|e| format!("Failed to log workout: {}", e))?,
    None => profile.mode,
  };
  let date = request.date.unwrap_or_else(|| Local::now().date_naive());

  let exercises = request
    .exercises
    .into_iter()
    .map(|input| {
      WorkoutEntry::new(date, input.name, input.sets, goal, mode, request.duration_minutes)
    })
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| format!("Failed to log workout: {}", e))?;

  let session_id = log_store::append_workout(&state.db, &exercises)
    .await
    .map_err(|e| format!("Failed to log workout: {}", e))?;

  let parameters = TrainingParameters::for_goal(goal);
  let notes: Vec<String> = exercises.iter().flat_map(|e| parameters.deviations(e)).collect();
  if !notes.is_empty() {
    warn!(session_id, deviations = notes.len(), "Workout outside suggested ranges");
  }

  info!(session_id, exercises = exercises.len(), %goal, "Workout logged");
  Ok(LoggedWorkout {
    session_id,
    exercises,
    notes,
  })
}

/// Suggested parameters and exercises for the profile's mode and goal
pub async fn get_training_guide(state: &AppState) -> Result<TrainingGuide, String> {
  let profile = state.profiles.load().profile;
  Ok(TrainingGuide::new(profile.mode, profile.goal))
}
