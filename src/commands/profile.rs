//! Profile and target commands

use serde::Serialize;
use tracing::{info, warn};

use crate::db::AppState;
use crate::models::{ProfileForm, StoredProfile};
use crate::targets::{NutritionProtocol, NutritionTarget, TargetBreakdown, TargetCalculator};
use crate::training::TrainingGuide;

#[derive(Debug, Clone, Serialize)]
pub struct TargetsView {
  pub profile: StoredProfile,
  pub protocol: NutritionProtocol,
  /// Absent when the stored profile is unusable and the fallback applies
  pub breakdown: Option<TargetBreakdown>,
  pub target: NutritionTarget,
  pub training: TrainingGuide,
}

pub async fn get_profile(state: &AppState) -> Result<StoredProfile, String> {
  Ok(state.profiles.load())
}

/// Overlay the given fields on the stored profile and save it. A stored
/// record with unreadable fields is only overwritten when the form supplies
/// every one of them.
pub async fn update_profile(state: &AppState, form: ProfileForm) -> Result<StoredProfile, String> {
  let current = state.profiles.load();
  let unresolved: Vec<&str> = current
    .invalid_fields
    .iter()
    .map(String::as_str)
    .filter(|key| !form.provides(key))
    .collect();
  if !unresolved.is_empty() {
    return Err(format!(
      "Stored profile at {} has unusable fields ({}); supply them or fix the file",
      state.profiles.path().display(),
      unresolved.join(", ")
    ));
  }

  let updated = form
    .merge_into(&current.profile)
    .map_err(|e| format!("Invalid profile: {}", e))?;

  let saved = state
    .profiles
    .save(&updated)
    .map_err(|e| format!("Failed to save profile: {}", e))?;

  info!(
    weight_kg = saved.profile.weight_kg,
    phase = %saved.profile.phase,
    "Profile updated"
  );
  Ok(saved)
}

pub async fn get_targets(state: &AppState) -> Result<TargetsView, String> {
  let stored = state.profiles.load();
  let calculator = TargetCalculator::new(state.config.protocol);

  let breakdown = match stored.check().and_then(|p| calculator.checked_breakdown(p)) {
    Ok(breakdown) => Some(breakdown),
    Err(e) => {
      warn!(error = %e, "Stored profile unusable, showing fallback targets");
      None
    }
  };
  let target = breakdown
    .as_ref()
    .map_or(NutritionTarget::FALLBACK, |b| b.target);
  let training = TrainingGuide::new(stored.profile.mode, stored.profile.goal);

  Ok(TargetsView {
    protocol: *calculator.protocol(),
    breakdown,
    target,
    training,
    profile: stored,
  })
}

/// Targets for unsaved form input; unusable input yields the fallback target
pub async fn preview_targets(state: &AppState, form: &ProfileForm) -> Result<NutritionTarget, String> {
  Ok(TargetCalculator::new(state.config.protocol).calculate_or_fallback(form))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Phase, UserProfile};
  use crate::test_utils::*;

  #[tokio::test]
  async fn test_get_profile_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let state = setup_test_state(dir.path()).await;

    let stored = get_profile(&state).await.unwrap();
    assert_eq!(stored.profile, UserProfile::default());
    assert!(stored.last_updated.is_none());
  }

  #[tokio::test]
  async fn test_update_profile_merges_fields() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let state = setup_test_state(dir.path()).await;
    update_profile(&state, mock_profile_form()).await.unwrap();

    // Act
    let form = ProfileForm {
      phase: Some("Bulking".to_string()),
      ..ProfileForm::default()
    };
    let saved = update_profile(&state, form).await.unwrap();

    // Assert
    assert_eq!(saved.profile.phase, Phase::Bulking);
    assert_eq!(saved.profile.height_cm, 175.0);
    assert!(saved.last_updated.is_some());
    assert_eq!(get_profile(&state).await.unwrap().profile, saved.profile);
  }

  #[tokio::test]
  async fn test_update_profile_rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let state = setup_test_state(dir.path()).await;
    let form = ProfileForm {
      weight: Some("heavy".to_string()),
      ..ProfileForm::default()
    };

    let err = update_profile(&state, form).await.unwrap_err();
    assert!(err.contains("weight"), "unexpected error: {}", err);
    assert!(!state.profiles.path().exists());
  }

  #[tokio::test]
  async fn test_get_targets_for_stored_profile() {
    let dir = tempfile::tempdir().unwrap();
    let state = setup_test_state(dir.path()).await;
    update_profile(&state, mock_profile_form()).await.unwrap();

    let view = get_targets(&state).await.unwrap();
    assert_eq!(view.target.calories, 2594);
    assert_eq!(view.target.protein, 70.0);
    let breakdown = view.breakdown.unwrap();
    assert!(breakdown.protein_capped);
    assert_eq!(view.training.pre_exhaust.len(), 4);
  }

  #[tokio::test]
  async fn test_get_targets_reports_configured_protocol() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = setup_test_state(dir.path()).await;
    let protocol = NutritionProtocol::new("40/30/30".parse().unwrap(), 2.2).unwrap();
    state.config.protocol = protocol;
    update_profile(&state, mock_profile_form()).await.unwrap();

    let view = get_targets(&state).await.unwrap();
    assert_eq!(view.protocol, protocol);
    // 2594 * 0.30 / 4 = 194.55, ceiling 70kg x 2.2 = 154g binds
    assert_eq!(view.target.protein, 154.0);
  }

  #[tokio::test]
  async fn test_get_targets_with_unusable_stored_profile() {
    let dir = tempfile::tempdir().unwrap();
    let state = setup_test_state(dir.path()).await;
    std::fs::write(state.profiles.path(), r#"{"weight_kg": -5.0}"#).unwrap();

    let view = get_targets(&state).await.unwrap();
    assert!(view.breakdown.is_none());
    assert_eq!(view.target, NutritionTarget::FALLBACK);
  }

  #[tokio::test]
  async fn test_get_targets_with_malformed_stored_field() {
    let dir = tempfile::tempdir().unwrap();
    let state = setup_test_state(dir.path()).await;
    std::fs::write(state.profiles.path(), r#"{"weight_kg": "seventy", "phase": "Bulking"}"#).unwrap();

    let view = get_targets(&state).await.unwrap();
    assert!(view.breakdown.is_none());
    assert_eq!(view.target, NutritionTarget::FALLBACK);
    assert_eq!(view.profile.profile.phase, Phase::Bulking);
    assert_eq!(view.profile.invalid_fields, vec!["weight_kg".to_string()]);
  }

  #[tokio::test]
  async fn test_get_targets_with_non_positive_calories() {
    let dir = tempfile::tempdir().unwrap();
    let state = setup_test_state(dir.path()).await;
    std::fs::write(
      state.profiles.path(),
      r#"{"weight_kg": 1.0, "height_cm": 1.0, "age": 100}"#,
    )
    .unwrap();

    let view = get_targets(&state).await.unwrap();
    assert!(view.breakdown.is_none());
    assert_eq!(view.target, NutritionTarget::FALLBACK);
  }

  #[tokio::test]
  async fn test_update_refuses_to_drop_unreadable_fields() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let state = setup_test_state(dir.path()).await;
    let on_disk = r#"{"weight_kg": "seventy", "phase": "Bulking"}"#;
    std::fs::write(state.profiles.path(), on_disk).unwrap();

    // Act
    let form = ProfileForm {
      age: Some("30".to_string()),
      ..ProfileForm::default()
    };
    let err = update_profile(&state, form).await.unwrap_err();

    // Assert
    assert!(err.contains("weight_kg"), "unexpected error: {}", err);
    assert_eq!(std::fs::read_to_string(state.profiles.path()).unwrap(), on_disk);

    // Supplying the unreadable field repairs the record and keeps the rest
    let form = ProfileForm {
      weight: Some("82".to_string()),
      ..ProfileForm::default()
    };
    let saved = update_profile(&state, form).await.unwrap();
    assert_eq!(saved.profile.weight_kg, 82.0);
    assert_eq!(saved.profile.phase, Phase::Bulking);
    assert!(get_profile(&state).await.unwrap().invalid_fields.is_empty());
  }

  #[tokio::test]
  async fn test_update_refuses_to_overwrite_unparseable_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = setup_test_state(dir.path()).await;
    std::fs::write(state.profiles.path(), "{ weight: heavy").unwrap();

    let err = update_profile(&state, mock_profile_form()).await.unwrap_err();
    assert!(err.contains(StoredProfile::UNREADABLE), "unexpected error: {}", err);
    assert_eq!(
      std::fs::read_to_string(state.profiles.path()).unwrap(),
      "{ weight: heavy"
    );
  }

  #[tokio::test]
  async fn test_preview_targets() {
    let dir = tempfile::tempdir().unwrap();
    let state = setup_test_state(dir.path()).await;

    let target = preview_targets(&state, &mock_profile_form()).await.unwrap();
    assert_eq!(target.calories, 2594);

    let mut form = mock_profile_form();
    form.weight = Some("seventy".to_string());
    assert_eq!(
      preview_targets(&state, &form).await.unwrap(),
      NutritionTarget::FALLBACK
    );
  }
}
