pub mod nutrition;
pub mod profile;
pub mod progress;
pub mod workout;

use crate::db::AppState;
use crate::models::StoredProfile;
use crate::targets::{NutritionTarget, TargetCalculator};

/// Stored profile and its target. An unusable stored profile yields the
/// fallback target.
pub(crate) fn current_target(state: &AppState) -> (StoredProfile, NutritionTarget) {
  let stored = state.profiles.load();
  let target = TargetCalculator::new(state.config.protocol).calculate_stored(&stored);
  (stored, target)
}
