//! Adherence report command

use chrono::NaiveDate;
use tracing::info;

use crate::adherence::{AdherenceAnalyzer, AdherenceReport, ReportWindow};
use crate::db::AppState;
use crate::log_store;

use super::current_target;

/// Adherence over `window` ending at `as_of`. Storage failures show up as an
/// empty window rather than an error.
pub async fn get_report(
  state: &AppState,
  window: ReportWindow,
  as_of: NaiveDate,
) -> Result<AdherenceReport, String> {
  let (stored, target) = current_target(state);
  let (nutrition, workouts) = log_store::load_window(&state.db, window, as_of).await;

  let report = AdherenceAnalyzer::new(&state.config.protocol).analyze(
    &stored.profile,
    &target,
    &nutrition,
    &workouts,
    window,
    as_of,
  );

  info!(
    %window,
    score = report.overall_score,
    verdict = report.verdict.as_str(),
    "Report generated"
  );
  Ok(report)
}

/// Short plain-text rendering of a report
pub fn summarize(report: &AdherenceReport) -> String {
  let p = &report.progress;
  let mut lines = vec![
    format!("Adherence, {} to {}", report.window, report.as_of),
    format!(
      "  Target: {} kcal, {:.1}g carbs, {:.1}g protein, {:.1}g fat",
      report.target.calories, report.target.carbs, report.target.protein, report.target.fat
    ),
    format!(
      "  Calories {:.0}%  Protein {:.0}%  Carbs {:.0}%  Fat {:.0}%",
      p.calories_pct, p.protein_pct, p.carbs_pct, p.fat_pct
    ),
    format!(
      "  Overall {:.1}%: {}",
      report.overall_score,
      report.verdict.as_str()
    ),
  ];

  if let Some(ratios) = &report.macro_ratios {
    lines.push(format!(
      "  Macro ratios C/P/F {:.0}/{:.0}/{:.0} vs {}: {}",
      ratios.carbs_pct,
      ratios.protein_pct,
      ratios.fat_pct,
      ratios.target,
      ratios.verdict.as_str()
    ));
  }
  if let Some(recovery) = &report.recovery {
    lines.push(format!(
      "  Recovery: {:.1}/week (max {:.1} at {}h rest), {}",
      recovery.actual_weekly_frequency,
      recovery.max_weekly_frequency,
      recovery.recommended_rest_hours,
      if recovery.compliant { "compliant" } else { "training too often" }
    ));
  }
  if let Some(workouts) = &report.workouts {
    lines.push(format!(
      "  Workouts: {} days, {} sets, {:.0} volume",
      workouts.workout_days, workouts.total_sets, workouts.total_volume
    ));
  }
  if let Some(nutrition) = &report.nutrition {
    lines.push(format!(
      "  Nutrition: {} days logged, {:.0} kcal/day",
      nutrition.days_logged, nutrition.daily_average.calories
    ));
  }
  lines.push(format!("  {}", report.coverage.message()));

  lines.join("\n")
}
