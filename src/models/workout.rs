use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::profile::{TrainingGoal, TrainingMode};
use super::EntryError;

/// A single set: reps x weight at a given effort
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
  pub reps: u32,
  pub weight: f64,
  /// Rate of perceived exertion, 0-10 (0 = not recorded)
  pub rpe: u8,
}

impl SetRecord {
  pub fn new(reps: u32, weight: f64, rpe: u8) -> Result<Self, EntryError> {
    if !(weight.is_finite() && weight >= 0.0) {
      return Err(EntryError::Invalid {
        field: "weight",
        value: weight.to_string(),
      });
    }
    if rpe > 10 {
      return Err(EntryError::Invalid {
        field: "rpe",
        value: rpe.to_string(),
      });
    }
    Ok(Self { reps, weight, rpe })
  }

  pub fn volume(&self) -> f64 {
    self.reps as f64 * self.weight
  }
}

/// One exercise performed in a session, with its ordered sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
  pub date: NaiveDate,
  pub exercise: String,
  pub sets: Vec<SetRecord>,
  pub goal: TrainingGoal,
  pub mode: TrainingMode,
  pub duration_minutes: u32,
}

impl WorkoutEntry {
  pub fn new(
    date: NaiveDate,
    exercise: impl Into<String>,
    sets: Vec<SetRecord>,
    goal: TrainingGoal,
    mode: TrainingMode,
    duration_minutes: u32,
  ) -> Result<Self, EntryError> {
    let exercise = exercise.into();
    if exercise.trim().is_empty() {
      return Err(EntryError::Missing("exercise"));
    }
    if sets.is_empty() {
      return Err(EntryError::Missing("sets"));
    }
    Ok(Self {
      date,
      exercise,
      sets,
      goal,
      mode,
      duration_minutes,
    })
  }

  pub fn volume(&self) -> f64 {
    self.sets.iter().map(SetRecord::volume).sum()
  }
}

/// Parse a set written as `REPSxWEIGHT[@RPE]`, e.g. `8x100@9` or `12x40`
impl std::str::FromStr for SetRecord {
  type Err = EntryError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || EntryError::Invalid {
      field: "set",
      value: s.to_string(),
    };

    let (body, rpe) = match s.split_once('@') {
      Some((body, rpe)) => (body, rpe.trim().parse::<u8>().map_err(|_| invalid())?),
      None => (s, 0),
    };
    let (reps, weight) = body.split_once(|c: char| c == 'x' || c == 'X').ok_or_else(invalid)?;
    let reps = reps.trim().parse::<u32>().map_err(|_| invalid())?;
    let weight = weight.trim().parse::<f64>().map_err(|_| invalid())?;

    SetRecord::new(reps, weight, rpe)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_set_validation() {
    assert!(SetRecord::new(8, 100.0, 9).is_ok());
    assert!(SetRecord::new(8, -1.0, 9).is_err());
    assert!(SetRecord::new(8, 100.0, 11).is_err());
    assert!(SetRecord::new(0, 0.0, 0).is_ok());
  }

  #[test]
  fn test_set_parsing() {
    let set: SetRecord = "8x100@9".parse().unwrap();
    assert_eq!(set, SetRecord { reps: 8, weight: 100.0, rpe: 9 });

    let set: SetRecord = "12X42.5".parse().unwrap();
    assert_eq!(set, SetRecord { reps: 12, weight: 42.5, rpe: 0 });

    assert!("eight x 100".parse::<SetRecord>().is_err());
    assert!("8x100@12".parse::<SetRecord>().is_err());
  }

  #[test]
  fn test_workout_volume() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let entry = WorkoutEntry::new(
      date,
      "Dumbbell Press",
      vec![
        SetRecord::new(8, 30.0, 10).unwrap(),
        SetRecord::new(6, 30.0, 10).unwrap(),
      ],
      TrainingGoal::Hypertrophy,
      TrainingMode::HeavyDuty,
      25,
    )
    .unwrap();

    assert_eq!(entry.volume(), 420.0);
  }

  #[test]
  fn test_workout_requires_exercise_and_sets() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let set = SetRecord::new(5, 100.0, 8).unwrap();

    assert!(WorkoutEntry::new(date, "", vec![set], TrainingGoal::Strength, TrainingMode::General, 30).is_err());
    assert!(WorkoutEntry::new(date, "Squat", vec![], TrainingGoal::Strength, TrainingMode::General, 30).is_err());
  }
}
