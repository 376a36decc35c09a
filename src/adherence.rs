//! Adherence reporting over a window of logged entries
//!
//! Everything here is a pure function of its inputs: the profile, the target,
//! the entries, the window and the "as of" date. Entries outside the window
//! are ignored, so callers may pass a wider slice than they report on.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
  ExperienceLevel, MacroTotals, MealType, NutritionEntry, TrainingGoal, TrainingMode, UserProfile,
  WorkoutEntry,
};
use crate::targets::{MacroSplit, NutritionProtocol, NutritionTarget};

const HOURS_PER_WEEK: f64 = 168.0;
const TOP_FOODS: usize = 10;

/// ---------------------------------------------------------------------------
/// Report Window
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportWindow {
  Week,
  Month,
  Quarter,
  Year,
  AllTime,
}

impl ReportWindow {
  pub fn days(&self) -> Option<i64> {
    match self {
      Self::Week => Some(7),
      Self::Month => Some(30),
      Self::Quarter => Some(90),
      Self::Year => Some(365),
      Self::AllTime => None,
    }
  }

  /// First date included in the window; `None` when unbounded
  pub fn start(&self, as_of: NaiveDate) -> Option<NaiveDate> {
    self.days().map(|d| as_of - Duration::days(d - 1))
  }

  pub fn contains(&self, date: NaiveDate, as_of: NaiveDate) -> bool {
    date <= as_of && self.start(as_of).map_or(true, |start| date >= start)
  }
}

impl std::fmt::Display for ReportWindow {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.days() {
      Some(d) => write!(f, "{} days", d),
      None => write!(f, "all time"),
    }
  }
}

impl std::str::FromStr for ReportWindow {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().trim_end_matches(" days").trim_end_matches('d') {
      "7" | "week" => Ok(Self::Week),
      "30" | "month" => Ok(Self::Month),
      "90" | "quarter" => Ok(Self::Quarter),
      "365" | "year" => Ok(Self::Year),
      "all" | "all time" | "alltime" => Ok(Self::AllTime),
      _ => Err(format!("Unknown report window: {} (use 7, 30, 90, 365 or all)", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Percent of Target
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdherenceVerdict {
  #[serde(rename = "Excellent")]
  Excellent,
  #[serde(rename = "Good")]
  Good,
  #[serde(rename = "Keep going")]
  KeepGoing,
  #[serde(rename = "Just getting started")]
  JustGettingStarted,
}

impl AdherenceVerdict {
  /// Lower bound of each band is inclusive
  pub fn from_score(score: f64) -> Self {
    match score {
      s if s >= 90.0 => Self::Excellent,
      s if s >= 70.0 => Self::Good,
      s if s >= 50.0 => Self::KeepGoing,
      _ => Self::JustGettingStarted,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Excellent => "Excellent",
      Self::Good => "Good",
      Self::KeepGoing => "Keep going",
      Self::JustGettingStarted => "Just getting started",
    }
  }
}

/// Percent of target reached per metric
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetProgress {
  pub calories_pct: f64,
  pub protein_pct: f64,
  pub carbs_pct: f64,
  pub fat_pct: f64,
}

fn percent_of(actual: f64, target: f64) -> f64 {
  if target > 0.0 {
    actual / target * 100.0
  } else {
    0.0
  }
}

impl TargetProgress {
  pub fn compute(actual: &MacroTotals, target: &NutritionTarget) -> Self {
    Self {
      calories_pct: percent_of(actual.calories, target.calories as f64),
      protein_pct: percent_of(actual.protein, target.protein),
      carbs_pct: percent_of(actual.carbs, target.carbs),
      fat_pct: percent_of(actual.fat, target.fat),
    }
  }

  /// Mean of the four percentages
  pub fn overall(&self) -> f64 {
    (self.calories_pct + self.protein_pct + self.carbs_pct + self.fat_pct) / 4.0
  }

  pub fn verdict(&self) -> AdherenceVerdict {
    AdherenceVerdict::from_score(self.overall())
  }
}

/// ---------------------------------------------------------------------------
/// Macro Ratio Check
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatioVerdict {
  #[serde(rename = "Excellent adherence")]
  Excellent,
  #[serde(rename = "Good adherence")]
  Good,
  #[serde(rename = "Work on hitting ratios")]
  NeedsWork,
}

impl RatioVerdict {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Excellent => "Excellent adherence",
      Self::Good => "Good adherence",
      Self::NeedsWork => "Work on hitting ratios",
    }
  }
}

/// Share of macro calories actually eaten vs the protocol split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroRatioCheck {
  pub carbs_pct: f64,
  pub protein_pct: f64,
  pub fat_pct: f64,
  pub target: MacroSplit,
  pub verdict: RatioVerdict,
}

impl MacroRatioCheck {
  /// `None` when the intake carries no macro calories
  pub fn compute(intake: &MacroTotals, target: &MacroSplit) -> Option<Self> {
    let total = intake.macro_kcal();
    if total <= 0.0 {
      return None;
    }
    let carbs_pct = intake.carbs * 4.0 / total * 100.0;
    let protein_pct = intake.protein * 4.0 / total * 100.0;
    let fat_pct = intake.fat * 9.0 / total * 100.0;

    let worst = (carbs_pct - target.carbs_pct)
      .abs()
      .max((protein_pct - target.protein_pct).abs())
      .max((fat_pct - target.fat_pct).abs());
    let verdict = if worst < 5.0 {
      RatioVerdict::Excellent
    } else if worst < 10.0 {
      RatioVerdict::Good
    } else {
      RatioVerdict::NeedsWork
    };

    Some(Self {
      carbs_pct,
      protein_pct,
      fat_pct,
      target: *target,
      verdict,
    })
  }
}

/// ---------------------------------------------------------------------------
/// Recovery Compliance
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoveryCompliance {
  pub experience_level: ExperienceLevel,
  pub recommended_rest_hours: u32,
  pub max_weekly_frequency: f64,
  pub actual_weekly_frequency: f64,
  pub compliant: bool,
}

impl RecoveryCompliance {
  pub fn compute(experience_level: ExperienceLevel, workout_days: usize, window_days: f64) -> Self {
    let recommended_rest_hours = experience_level.recovery_hours();
    let max_weekly_frequency = HOURS_PER_WEEK / recommended_rest_hours as f64;
    let actual_weekly_frequency = weekly_frequency(workout_days, window_days);

    Self {
      experience_level,
      recommended_rest_hours,
      max_weekly_frequency,
      actual_weekly_frequency,
      compliant: actual_weekly_frequency <= max_weekly_frequency,
    }
  }
}

fn weekly_frequency(workout_days: usize, window_days: f64) -> f64 {
  if window_days > 0.0 {
    workout_days as f64 / (window_days / 7.0)
  } else {
    0.0
  }
}

/// ---------------------------------------------------------------------------
/// Descriptive Statistics
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStats {
  /// Distinct training dates
  pub workout_days: usize,
  pub total_sets: usize,
  /// Sum of reps x weight over all sets
  pub total_volume: f64,
  /// Mean RPE over all logged sets; 0 is a recorded value
  pub average_rpe: Option<f64>,
  pub exercise_variety: usize,
  pub most_common_exercise: Option<String>,
  pub average_duration_minutes: f64,
  /// Sessions (distinct date + goal) per training goal
  pub sessions_by_goal: BTreeMap<TrainingGoal, usize>,
  pub weekly_frequency: f64,
}

impl WorkoutStats {
  pub fn compute(workouts: &[&WorkoutEntry], window_days: f64) -> Self {
    let mut dates = BTreeSet::new();
    let mut sets_by_exercise: BTreeMap<&str, usize> = BTreeMap::new();
    let mut goal_sessions = BTreeSet::new();
    let mut total_sets = 0;
    let mut total_volume = 0.0;
    let mut rpe_sum = 0.0;
    let mut duration_sum = 0.0;

    for w in workouts {
      dates.insert(w.date);
      *sets_by_exercise.entry(w.exercise.as_str()).or_insert(0) += w.sets.len();
      goal_sessions.insert((w.date, w.goal));

      for set in &w.sets {
        total_sets += 1;
        total_volume += set.volume();
        rpe_sum += set.rpe as f64;
        duration_sum += w.duration_minutes as f64;
      }
    }

    let mut sessions_by_goal = BTreeMap::new();
    for (_, goal) in &goal_sessions {
      *sessions_by_goal.entry(*goal).or_insert(0) += 1;
    }

    // Highest set count wins; ties go to the alphabetically first exercise
    let most_common_exercise = sets_by_exercise
      .iter()
      .fold(None::<(&str, usize)>, |best, (name, count)| match best {
        Some((_, best_count)) if best_count >= *count => best,
        _ => Some((*name, *count)),
      })
      .map(|(name, _)| name.to_string());

    // Both means are per logged set, matching the one-row-per-set log
    let per_set = |sum: f64| (total_sets > 0).then(|| sum / total_sets as f64);

    Self {
      workout_days: dates.len(),
      total_sets,
      total_volume,
      average_rpe: per_set(rpe_sum),
      exercise_variety: sets_by_exercise.len(),
      most_common_exercise,
      average_duration_minutes: per_set(duration_sum).unwrap_or(0.0),
      sessions_by_goal,
      weekly_frequency: weekly_frequency(dates.len(), window_days),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCalories {
  pub date: NaiveDate,
  pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodCalories {
  pub food: String,
  pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionStats {
  pub days_logged: usize,
  /// Mean of per-day totals over days with at least one entry
  pub daily_average: MacroTotals,
  pub daily_calories: Vec<DailyCalories>,
  pub top_foods: Vec<FoodCalories>,
  pub calories_by_meal: BTreeMap<MealType, f64>,
}

impl NutritionStats {
  pub fn compute(entries: &[&NutritionEntry]) -> Self {
    let by_day = daily_totals(entries);

    let days_logged = by_day.len();
    let daily_average = if days_logged == 0 {
      MacroTotals::default()
    } else {
      by_day.values().copied().sum::<MacroTotals>().scale(1.0 / days_logged as f64)
    };

    let daily_calories = by_day
      .iter()
      .map(|(date, totals)| DailyCalories {
        date: *date,
        calories: totals.calories,
      })
      .collect();

    let mut food_calories: BTreeMap<&str, f64> = BTreeMap::new();
    let mut calories_by_meal = BTreeMap::new();
    for e in entries {
      *food_calories.entry(e.food.as_str()).or_insert(0.0) += e.calories;
      *calories_by_meal.entry(e.meal_type).or_insert(0.0) += e.calories;
    }
    let mut top_foods: Vec<FoodCalories> = food_calories
      .into_iter()
      .map(|(food, calories)| FoodCalories {
        food: food.to_string(),
        calories,
      })
      .collect();
    // Stable sort keeps alphabetical order among equal totals
    top_foods.sort_by(|a, b| b.calories.total_cmp(&a.calories));
    top_foods.truncate(TOP_FOODS);

    Self {
      days_logged,
      daily_average,
      daily_calories,
      top_foods,
      calories_by_meal,
    }
  }
}

fn daily_totals(entries: &[&NutritionEntry]) -> BTreeMap<NaiveDate, MacroTotals> {
  let mut by_day: BTreeMap<NaiveDate, MacroTotals> = BTreeMap::new();
  for e in entries {
    *by_day.entry(e.date).or_default() += e.totals();
  }
  by_day
}

/// ---------------------------------------------------------------------------
/// Report
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCoverage {
  NoData,
  NutritionOnly,
  WorkoutsOnly,
  Complete,
}

impl DataCoverage {
  pub fn message(&self) -> &'static str {
    match self {
      Self::NoData => "No data available for analysis. Start logging workouts and nutrition to see progress!",
      Self::NutritionOnly => "Good nutrition tracking! Add workout logging for complete analysis.",
      Self::WorkoutsOnly => "Great workout consistency! Add nutrition tracking to optimize results.",
      Self::Complete => "Excellent data tracking! You're on the path to achieving your goals.",
    }
  }
}

/// Single-day view: that day's totals against the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
  pub date: NaiveDate,
  pub entries: usize,
  pub totals: MacroTotals,
  pub progress: TargetProgress,
  pub overall_score: f64,
  pub verdict: AdherenceVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceReport {
  pub window: ReportWindow,
  pub as_of: NaiveDate,
  /// Days used as the frequency denominator
  pub window_days: f64,
  pub mode: TrainingMode,
  pub target: NutritionTarget,
  pub progress: TargetProgress,
  pub overall_score: f64,
  pub verdict: AdherenceVerdict,
  /// Heavy Duty mode with macro calories logged
  pub macro_ratios: Option<MacroRatioCheck>,
  /// Heavy Duty mode with workouts logged
  pub recovery: Option<RecoveryCompliance>,
  pub workouts: Option<WorkoutStats>,
  pub nutrition: Option<NutritionStats>,
  pub coverage: DataCoverage,
}

impl AdherenceReport {
  pub fn ratio_verdict(&self) -> Option<&'static str> {
    self.macro_ratios.as_ref().map(|r| r.verdict.as_str())
  }

  pub fn recovery_compliant(&self) -> Option<bool> {
    self.recovery.as_ref().map(|r| r.compliant)
  }
}

/// ---------------------------------------------------------------------------
/// Analyzer
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct AdherenceAnalyzer {
  split: MacroSplit,
}

impl AdherenceAnalyzer {
  pub fn new(protocol: &NutritionProtocol) -> Self {
    Self {
      split: protocol.split,
    }
  }

  pub fn daily_progress(
    &self,
    target: &NutritionTarget,
    entries: &[NutritionEntry],
    date: NaiveDate,
  ) -> DailyProgress {
    let todays: Vec<_> = entries.iter().filter(|e| e.date == date).collect();
    let totals: MacroTotals = todays.iter().map(|e| e.totals()).sum();
    let progress = TargetProgress::compute(&totals, target);

    DailyProgress {
      date,
      entries: todays.len(),
      totals,
      progress,
      overall_score: progress.overall(),
      verdict: progress.verdict(),
    }
  }

  pub fn analyze(
    &self,
    profile: &UserProfile,
    target: &NutritionTarget,
    nutrition: &[NutritionEntry],
    workouts: &[WorkoutEntry],
    window: ReportWindow,
    as_of: NaiveDate,
  ) -> AdherenceReport {
    let nutrition: Vec<&NutritionEntry> = nutrition
      .iter()
      .filter(|e| window.contains(e.date, as_of))
      .collect();
    let workouts: Vec<&WorkoutEntry> = workouts
      .iter()
      .filter(|w| window.contains(w.date, as_of))
      .collect();

    let window_days = Self::window_days(window, &workouts, &nutrition, as_of);

    let nutrition_stats = (!nutrition.is_empty()).then(|| NutritionStats::compute(&nutrition));
    let workout_stats = (!workouts.is_empty()).then(|| WorkoutStats::compute(&workouts, window_days));

    let daily_average = nutrition_stats
      .as_ref()
      .map(|n| n.daily_average)
      .unwrap_or_default();
    let progress = TargetProgress::compute(&daily_average, target);

    let heavy_duty = profile.mode == TrainingMode::HeavyDuty;
    let macro_ratios = if heavy_duty {
      MacroRatioCheck::compute(&daily_average, &self.split)
    } else {
      None
    };
    let recovery = match (&workout_stats, heavy_duty) {
      (Some(stats), true) => Some(RecoveryCompliance::compute(
        profile.experience_level,
        stats.workout_days,
        window_days,
      )),
      _ => None,
    };

    let coverage = match (nutrition.is_empty(), workouts.is_empty()) {
      (true, true) => DataCoverage::NoData,
      (false, true) => DataCoverage::NutritionOnly,
      (true, false) => DataCoverage::WorkoutsOnly,
      (false, false) => DataCoverage::Complete,
    };

    AdherenceReport {
      window,
      as_of,
      window_days,
      mode: profile.mode,
      target: *target,
      progress,
      overall_score: progress.overall(),
      verdict: progress.verdict(),
      macro_ratios,
      recovery,
      workouts: workout_stats,
      nutrition: nutrition_stats,
      coverage,
    }
  }

  /// Fixed windows use their length. All-time spans from the earliest entry
  /// to `as_of`, never less than a week.
  fn window_days(
    window: ReportWindow,
    workouts: &[&WorkoutEntry],
    nutrition: &[&NutritionEntry],
    as_of: NaiveDate,
  ) -> f64 {
    match window.days() {
      Some(days) => days as f64,
      None => {
        let earliest = workouts
          .iter()
          .map(|w| w.date)
          .chain(nutrition.iter().map(|e| e.date))
          .min();
        let span = earliest.map_or(0, |first| (as_of - first).num_days() + 1);
        span.max(7) as f64
      }
    }
  }
}
