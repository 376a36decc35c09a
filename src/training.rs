//! Training parameters per goal and suggested exercises
//!
//! Heavy Duty sessions are built from pre-exhaust pairs: an isolation movement
//! taken to failure, immediately followed by a compound movement for the same
//! muscle group. General sessions pick from a short list per goal.

use serde::Serialize;

use crate::models::{TrainingGoal, TrainingMode, WorkoutEntry};

/// Inclusive integer range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
  pub min: u32,
  pub max: u32,
}

impl Span {
  const fn new(min: u32, max: u32) -> Self {
    Self { min, max }
  }

  pub fn contains(&self, value: u32) -> bool {
    (self.min..=self.max).contains(&value)
  }
}

impl std::fmt::Display for Span {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}-{}", self.min, self.max)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrainingParameters {
  pub rep_range: Span,
  pub rest_seconds: Span,
  pub sets: Span,
  pub focus: &'static str,
}

impl TrainingParameters {
  pub fn for_goal(goal: TrainingGoal) -> Self {
    match goal {
      TrainingGoal::Strength => Self {
        rep_range: Span::new(1, 5),
        rest_seconds: Span::new(180, 300),
        sets: Span::new(3, 5),
        focus: "Maximum load, perfect form",
      },
      TrainingGoal::Hypertrophy => Self {
        rep_range: Span::new(6, 12),
        rest_seconds: Span::new(60, 120),
        sets: Span::new(1, 3),
        focus: "Time under tension, failure",
      },
      TrainingGoal::Power => Self {
        rep_range: Span::new(3, 6),
        rest_seconds: Span::new(120, 240),
        sets: Span::new(3, 6),
        focus: "Explosive movement, speed",
      },
      TrainingGoal::Endurance => Self {
        rep_range: Span::new(12, 20),
        rest_seconds: Span::new(30, 60),
        sets: Span::new(2, 4),
        focus: "Metabolic stress, volume",
      },
    }
  }

  /// Human-readable notes for an exercise whose set count or reps fall
  /// outside these parameters. Empty when it fits.
  pub fn deviations(&self, entry: &WorkoutEntry) -> Vec<String> {
    let mut notes = Vec::new();
    let set_count = entry.sets.len() as u32;
    if !self.sets.contains(set_count) {
      notes.push(format!(
        "{}: {} sets (suggested {})",
        entry.exercise, set_count, self.sets
      ));
    }
    for (i, set) in entry.sets.iter().enumerate() {
      if !self.rep_range.contains(set.reps) {
        notes.push(format!(
          "{} set {}: {} reps (suggested {})",
          entry.exercise,
          i + 1,
          set.reps,
          self.rep_range
        ));
      }
    }
    notes
  }
}

/// ---------------------------------------------------------------------------
/// Exercise Suggestions
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreExhaustPair {
  pub muscle_group: &'static str,
  pub isolation: &'static str,
  pub compound: &'static str,
  pub cue: &'static str,
}

pub const PRE_EXHAUST_PAIRS: [PreExhaustPair; 4] = [
  PreExhaustPair {
    muscle_group: "Chest",
    isolation: "Dumbbell Flyes",
    compound: "Dumbbell Press",
    cue: "Perform to failure, then immediately do Dumbbell Press.",
  },
  PreExhaustPair {
    muscle_group: "Back",
    isolation: "Dumbbell Pullovers",
    compound: "Dumbbell Rows",
    cue: "Pre-exhaust the lats, then do Dumbbell Rows.",
  },
  PreExhaustPair {
    muscle_group: "Shoulders",
    isolation: "Lateral Raises",
    compound: "Shoulder Press",
    cue: "Pre-exhaust delts, then do Shoulder Press.",
  },
  PreExhaustPair {
    muscle_group: "Arms",
    isolation: "Dumbbell Curls",
    compound: "Tricep Extensions",
    cue: "Follow with Tricep Extensions for complete arm training.",
  },
];

pub fn suggested_exercises(goal: TrainingGoal) -> &'static [&'static str] {
  match goal {
    TrainingGoal::Strength => &["Squat", "Deadlift", "Bench Press", "Overhead Press"],
    TrainingGoal::Power => &[
      "Power Clean",
      "Jump Squat",
      "Medicine Ball Throw",
      "Explosive Push-up",
    ],
    TrainingGoal::Endurance => &[
      "Circuit Training",
      "High Rep Squats",
      "Burpees",
      "Mountain Climbers",
    ],
    TrainingGoal::Hypertrophy => &["Dumbbell Press", "Dumbbell Rows", "Squats", "Pull-ups"],
  }
}

/// What to train for a mode/goal combination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingGuide {
  pub mode: TrainingMode,
  pub goal: TrainingGoal,
  pub parameters: TrainingParameters,
  pub pre_exhaust: Vec<PreExhaustPair>,
  pub exercises: Vec<&'static str>,
}

impl TrainingGuide {
  pub fn new(mode: TrainingMode, goal: TrainingGoal) -> Self {
    let (pre_exhaust, exercises) = match mode {
      TrainingMode::HeavyDuty => (PRE_EXHAUST_PAIRS.to_vec(), Vec::new()),
      TrainingMode::General => (Vec::new(), suggested_exercises(goal).to_vec()),
    };
    Self {
      mode,
      goal,
      parameters: TrainingParameters::for_goal(goal),
      pre_exhaust,
      exercises,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::SetRecord;
  use crate::test_utils::{date, mock_workout_entry};

  #[test]
  fn test_parameters_per_goal() {
    let strength = TrainingParameters::for_goal(TrainingGoal::Strength);
    assert_eq!(strength.rep_range, Span::new(1, 5));
    assert_eq!(strength.rest_seconds, Span::new(180, 300));

    let hypertrophy = TrainingParameters::for_goal(TrainingGoal::Hypertrophy);
    assert_eq!(hypertrophy.sets, Span::new(1, 3));
    assert_eq!(hypertrophy.focus, "Time under tension, failure");

    assert_eq!(
      TrainingParameters::for_goal(TrainingGoal::Endurance).rep_range.to_string(),
      "12-20"
    );
  }

  #[test]
  fn test_span_is_inclusive() {
    let span = Span::new(6, 12);
    assert!(span.contains(6));
    assert!(span.contains(12));
    assert!(!span.contains(5));
    assert!(!span.contains(13));
  }

  #[test]
  fn test_deviations() {
    let params = TrainingParameters::for_goal(TrainingGoal::Hypertrophy);

    // 2 sets of 8 reps fits 6-12 reps, 1-3 sets
    let fits = mock_workout_entry(date(2024, 3, 1), "Dumbbell Press", 2);
    assert!(params.deviations(&fits).is_empty());

    let mut off = mock_workout_entry(date(2024, 3, 1), "Dumbbell Press", 4);
    off.sets[3] = SetRecord::new(20, 40.0, 0).unwrap();
    let notes = params.deviations(&off);
    assert_eq!(notes.len(), 2);
    assert!(notes[0].contains("4 sets"));
    assert!(notes[1].contains("set 4: 20 reps"));
  }

  #[test]
  fn test_guide_by_mode() {
    let heavy = TrainingGuide::new(TrainingMode::HeavyDuty, TrainingGoal::Hypertrophy);
    assert_eq!(heavy.pre_exhaust.len(), 4);
    assert_eq!(heavy.pre_exhaust[0].isolation, "Dumbbell Flyes");
    assert_eq!(heavy.pre_exhaust[0].compound, "Dumbbell Press");
    assert!(heavy.exercises.is_empty());

    let power = TrainingGuide::new(TrainingMode::General, TrainingGoal::Power);
    assert!(power.pre_exhaust.is_empty());
    assert_eq!(power.exercises[0], "Power Clean");
    assert_eq!(power.parameters, TrainingParameters::for_goal(TrainingGoal::Power));
  }
}
