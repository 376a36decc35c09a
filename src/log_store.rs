//! Append-only nutrition and workout logs backed by SQLite
//!
//! Nutrition: one row per food item. Workouts: one row per set, grouped back
//! into exercises on read by (session, exercise).

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, warn};

use crate::adherence::ReportWindow;
use crate::models::{
  EntryError, MacroTotals, MealType, NutritionEntry, SetRecord, TrainingGoal, TrainingMode, WorkoutEntry,
};

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Invalid entry: {0}")]
  Entry(#[from] EntryError),
}

/// ---------------------------------------------------------------------------
/// Nutrition Log
/// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct NutritionRow {
  date: NaiveDate,
  time: NaiveTime,
  food: String,
  quantity_g: f64,
  calories: f64,
  protein: f64,
  carbs: f64,
  fat: f64,
  meal_type: String,
}

impl TryFrom<NutritionRow> for NutritionEntry {
  type Error = EntryError;

  fn try_from(row: NutritionRow) -> Result<Self, Self::Error> {
    let meal_type = row.meal_type.parse::<MealType>()?;
    NutritionEntry::new(
      row.date,
      row.time,
      row.food,
      row.quantity_g,
      MacroTotals {
        calories: row.calories,
        protein: row.protein,
        carbs: row.carbs,
        fat: row.fat,
      },
      meal_type,
    )
  }
}

pub async fn append_nutrition(pool: &SqlitePool, entry: &NutritionEntry) -> Result<i64, StoreError> {
  let result = sqlx::query(
    r#"
    INSERT INTO nutrition_log (
      date, time, food, quantity_g, calories, protein, carbs, fat, meal_type
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    "#,
  )
  .bind(entry.date)
  .bind(entry.time)
  .bind(&entry.food)
  .bind(entry.quantity_g)
  .bind(entry.calories)
  .bind(entry.protein)
  .bind(entry.carbs)
  .bind(entry.fat)
  .bind(entry.meal_type.to_string())
  .execute(pool)
  .await?;

  debug!(food = %entry.food, date = %entry.date, "Logged food");
  Ok(result.last_insert_rowid())
}

/// Nutrition entries with `from <= date <= to` (either bound optional), in
/// logging order
pub async fn load_nutrition(
  pool: &SqlitePool,
  from: Option<NaiveDate>,
  to: Option<NaiveDate>,
) -> Result<Vec<NutritionEntry>, StoreError> {
  let rows: Vec<NutritionRow> = sqlx::query_as(
    r#"
    SELECT date, time, food, quantity_g, calories, protein, carbs, fat, meal_type
    FROM nutrition_log
    WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2)
    ORDER BY date, time, id
    "#,
  )
  .bind(from)
  .bind(to)
  .fetch_all(pool)
  .await?;

  let total = rows.len();
  let entries: Vec<NutritionEntry> = rows
    .into_iter()
    .filter_map(|row| match NutritionEntry::try_from(row) {
      Ok(entry) => Some(entry),
      Err(e) => {
        warn!(error = %e, "Skipping malformed nutrition row");
        None
      }
    })
    .collect();

  debug!(rows = total, kept = entries.len(), "Loaded nutrition log");
  Ok(entries)
}

/// ---------------------------------------------------------------------------
/// Workout Log
/// ---------------------------------------------------------------------------

/// Append one session (all exercises share a session id). Returns the id.
pub async fn append_workout(pool: &SqlitePool, exercises: &[WorkoutEntry]) -> Result<i64, StoreError> {
  if exercises.is_empty() {
    return Err(EntryError::Missing("exercises").into());
  }

  let mut tx = pool.begin().await?;

  let session_id: i64 = sqlx::query("SELECT COALESCE(MAX(session_id), 0) + 1 FROM workout_log")
    .fetch_one(&mut *tx)
    .await?
    .try_get(0)?;

  for exercise in exercises {
    for (i, set) in exercise.sets.iter().enumerate() {
      sqlx::query(
        r#"
        INSERT INTO workout_log (
          session_id, date, exercise, set_number, reps, weight, rpe,
          mode, goal, duration_minutes
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
      )
      .bind(session_id)
      .bind(exercise.date)
      .bind(&exercise.exercise)
      .bind(i as i64 + 1)
      .bind(set.reps as i64)
      .bind(set.weight)
      .bind(set.rpe as i64)
      .bind(exercise.mode.to_string())
      .bind(exercise.goal.to_string())
      .bind(exercise.duration_minutes as i64)
      .execute(&mut *tx)
      .await?;
    }
  }

  tx.commit().await?;

  debug!(session_id, exercises = exercises.len(), "Logged workout");
  Ok(session_id)
}

#[derive(Debug, sqlx::FromRow)]
struct WorkoutSetRow {
  session_id: i64,
  date: NaiveDate,
  exercise: String,
  reps: i64,
  weight: f64,
  rpe: i64,
  mode: String,
  goal: String,
  duration_minutes: i64,
}

impl WorkoutSetRow {
  fn set(&self) -> Result<SetRecord, EntryError> {
    let reps = u32::try_from(self.reps).map_err(|_| EntryError::Invalid {
      field: "reps",
      value: self.reps.to_string(),
    })?;
    let rpe = u8::try_from(self.rpe).map_err(|_| EntryError::Invalid {
      field: "rpe",
      value: self.rpe.to_string(),
    })?;
    SetRecord::new(reps, self.weight, rpe)
  }

  fn entry(&self, sets: Vec<SetRecord>) -> Result<WorkoutEntry, EntryError> {
    let goal = self.goal.parse::<TrainingGoal>().unwrap_or_default();
    let mode = self.mode.parse::<TrainingMode>().unwrap_or_default();
    let duration = u32::try_from(self.duration_minutes).unwrap_or(0);
    WorkoutEntry::new(self.date, self.exercise.clone(), sets, goal, mode, duration)
  }
}

fn push_entry(entries: &mut Vec<WorkoutEntry>, head: &WorkoutSetRow, sets: Vec<SetRecord>) {
  match head.entry(sets) {
    Ok(entry) => entries.push(entry),
    Err(e) => warn!(error = %e, session_id = head.session_id, "Skipping malformed workout entry"),
  }
}

/// Workout entries with `from <= date <= to`, one per exercise per session
pub async fn load_workouts(
  pool: &SqlitePool,
  from: Option<NaiveDate>,
  to: Option<NaiveDate>,
) -> Result<Vec<WorkoutEntry>, StoreError> {
  let rows: Vec<WorkoutSetRow> = sqlx::query_as(
    r#"
    SELECT session_id, date, exercise, reps, weight, rpe, mode, goal, duration_minutes
    FROM workout_log
    WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2)
    ORDER BY session_id, id
    "#,
  )
  .bind(from)
  .bind(to)
  .fetch_all(pool)
  .await?;

  let mut entries = Vec::new();
  let mut current: Option<(&WorkoutSetRow, Vec<SetRecord>)> = None;

  for row in &rows {
    let set = match row.set() {
      Ok(set) => set,
      Err(e) => {
        warn!(error = %e, session_id = row.session_id, "Skipping malformed workout set");
        continue;
      }
    };

    let same_exercise = matches!(
      &current,
      Some((head, _)) if head.session_id == row.session_id && head.exercise == row.exercise
    );
    if same_exercise {
      if let Some((_, sets)) = current.as_mut() {
        sets.push(set);
      }
    } else {
      if let Some((head, sets)) = current.take() {
        push_entry(&mut entries, head, sets);
      }
      current = Some((row, vec![set]));
    }
  }
  if let Some((head, sets)) = current {
    push_entry(&mut entries, head, sets);
  }

  debug!(rows = rows.len(), exercises = entries.len(), "Loaded workout log");
  Ok(entries)
}

/// ---------------------------------------------------------------------------
/// Report Windows
/// ---------------------------------------------------------------------------

/// Both logs for a report window. Storage failures are logged and reported
/// as an empty window.
pub async fn load_window(
  pool: &SqlitePool,
  window: ReportWindow,
  as_of: NaiveDate,
) -> (Vec<NutritionEntry>, Vec<WorkoutEntry>) {
  let from = window.start(as_of);
  let to = Some(as_of);

  let nutrition = load_nutrition(pool, from, to).await.unwrap_or_else(|e| {
    warn!(error = %e, "Failed to load nutrition log, treating window as empty");
    Vec::new()
  });
  let workouts = load_workouts(pool, from, to).await.unwrap_or_else(|e| {
    warn!(error = %e, "Failed to load workout log, treating window as empty");
    Vec::new()
  });

  (nutrition, workouts)
}
