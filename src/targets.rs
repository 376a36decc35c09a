//! Daily calorie and macro targets
//!
//! Mifflin-St Jeor BMR, activity-scaled TDEE, a phase adjustment, then a fixed
//! carbs/protein/fat split with a per-kg protein ceiling. Protein removed by the
//! ceiling is handed back to carbohydrate, never to fat.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::{ProfileError, ProfileForm, Sex, StoredProfile, UserProfile};

/// kcal per gram
const KCAL_PER_G_CARB: f64 = 4.0;
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

/// ---------------------------------------------------------------------------
/// Protocol (macro split + protein ceiling)
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
  #[error("Macro split must sum to 100%, got {0}%")]
  SplitSum(f64),

  #[error("Macro percentages must be non-negative")]
  NegativeSplit,

  #[error("Protein per kg must be positive, got {0}")]
  ProteinPerKg(f64),

  #[error("Invalid macro split: {0}")]
  Parse(String),
}

/// Percent of calories assigned to each macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroSplit {
  pub carbs_pct: f64,
  pub protein_pct: f64,
  pub fat_pct: f64,
}

impl Default for MacroSplit {
  fn default() -> Self {
    Self {
      carbs_pct: 60.0,
      protein_pct: 25.0,
      fat_pct: 15.0,
    }
  }
}

impl MacroSplit {
  pub fn new(carbs_pct: f64, protein_pct: f64, fat_pct: f64) -> Result<Self, ProtocolError> {
    if [carbs_pct, protein_pct, fat_pct]
      .iter()
      .any(|p| !p.is_finite() || *p < 0.0)
    {
      return Err(ProtocolError::NegativeSplit);
    }
    let sum = carbs_pct + protein_pct + fat_pct;
    if (sum - 100.0).abs() > 1e-6 {
      return Err(ProtocolError::SplitSum(sum));
    }
    Ok(Self {
      carbs_pct,
      protein_pct,
      fat_pct,
    })
  }
}

/// Parses `carbs/protein/fat`, e.g. `60/25/15`
impl std::str::FromStr for MacroSplit {
  type Err = ProtocolError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let parts: Vec<f64> = s
      .split('/')
      .map(|p| p.trim().parse::<f64>())
      .collect::<Result<_, _>>()
      .map_err(|_| ProtocolError::Parse(s.to_string()))?;
    match parts.as_slice() {
      [c, p, f] => Self::new(*c, *p, *f),
      _ => Err(ProtocolError::Parse(s.to_string())),
    }
  }
}

impl std::fmt::Display for MacroSplit {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}/{}/{}", self.carbs_pct, self.protein_pct, self.fat_pct)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionProtocol {
  pub split: MacroSplit,
  /// Protein ceiling in grams per kg of body weight
  pub protein_per_kg: f64,
}

impl Default for NutritionProtocol {
  fn default() -> Self {
    Self {
      split: MacroSplit::default(),
      protein_per_kg: 1.0,
    }
  }
}

impl NutritionProtocol {
  pub fn new(split: MacroSplit, protein_per_kg: f64) -> Result<Self, ProtocolError> {
    if !(protein_per_kg.is_finite() && protein_per_kg > 0.0) {
      return Err(ProtocolError::ProteinPerKg(protein_per_kg));
    }
    Ok(Self {
      split,
      protein_per_kg,
    })
  }
}

/// ---------------------------------------------------------------------------
/// Targets
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionTarget {
  pub calories: i64,
  pub carbs: f64,
  pub protein: f64,
  pub fat: f64,
}

impl NutritionTarget {
  /// Shown when the profile cannot be used
  pub const FALLBACK: NutritionTarget = NutritionTarget {
    calories: 2000,
    carbs: 300.0,
    protein: 125.0,
    fat: 67.0,
  };
}

/// Intermediate values behind a target, for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetBreakdown {
  pub bmr: f64,
  pub tdee: f64,
  pub carbs_raw: f64,
  pub protein_raw: f64,
  /// weight_kg x protein_per_kg
  pub protein_ceiling: f64,
  pub protein_capped: bool,
  pub target: NutritionTarget,
}

/// Round to one decimal place, ties to even on the exact binary value
fn round1(value: f64) -> f64 {
  format!("{:.1}", value).parse().unwrap_or(value)
}

#[derive(Debug, Clone, Default)]
pub struct TargetCalculator {
  protocol: NutritionProtocol,
}

impl TargetCalculator {
  pub fn new(protocol: NutritionProtocol) -> Self {
    Self { protocol }
  }

  pub fn protocol(&self) -> &NutritionProtocol {
    &self.protocol
  }

  /// Mifflin-St Jeor basal metabolic rate (kcal/day)
  pub fn bmr(profile: &UserProfile) -> f64 {
    let base = 10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * profile.age as f64;
    match profile.sex {
      Sex::Male => base + 5.0,
      Sex::Female => base - 161.0,
    }
  }

  pub fn tdee(profile: &UserProfile) -> f64 {
    Self::bmr(profile) * profile.activity_level.multiplier()
  }

  /// Phase-adjusted calories, truncated toward zero
  pub fn calorie_target(profile: &UserProfile) -> i64 {
    (Self::tdee(profile) * profile.phase.calorie_factor()) as i64
  }

  pub fn calculate(&self, profile: &UserProfile) -> NutritionTarget {
    self.breakdown(profile).target
  }

  pub fn breakdown(&self, profile: &UserProfile) -> TargetBreakdown {
    let bmr = Self::bmr(profile);
    let tdee = Self::tdee(profile);
    let calories = Self::calorie_target(profile);
    let split = &self.protocol.split;
    let kcal = calories as f64;

    let carbs_raw = kcal * (split.carbs_pct / 100.0) / KCAL_PER_G_CARB;
    let protein_raw = kcal * (split.protein_pct / 100.0) / KCAL_PER_G_PROTEIN;
    let fat = kcal * (split.fat_pct / 100.0) / KCAL_PER_G_FAT;

    let protein_ceiling = profile.weight_kg * self.protocol.protein_per_kg;
    let protein = protein_raw.min(protein_ceiling);

    let mut carbs = carbs_raw;
    let protein_capped = protein < protein_raw;
    if protein_capped {
      let freed_kcal = (protein_raw - protein) * KCAL_PER_G_PROTEIN;
      carbs += freed_kcal / KCAL_PER_G_CARB;
    }

    TargetBreakdown {
      bmr,
      tdee,
      carbs_raw,
      protein_raw,
      protein_ceiling,
      protein_capped,
      target: NutritionTarget {
        calories,
        carbs: round1(carbs),
        protein: round1(protein),
        fat: round1(fat),
      },
    }
  }

  /// Breakdown for a profile that may not have passed validation (e.g. loaded
  /// from disk). Profiles whose calorie target is not positive are rejected.
  pub fn checked_breakdown(&self, profile: &UserProfile) -> Result<TargetBreakdown, ProfileError> {
    profile.validate()?;
    let breakdown = self.breakdown(profile);
    if breakdown.target.calories <= 0 {
      return Err(ProfileError::NoEnergy(breakdown.target.calories));
    }
    Ok(breakdown)
  }

  /// Targets for the stored profile record. Malformed fields or an unusable
  /// profile yield [`NutritionTarget::FALLBACK`].
  pub fn calculate_stored(&self, stored: &StoredProfile) -> NutritionTarget {
    let checked = stored.check().and_then(|profile| self.checked_breakdown(profile));
    Self::target_or_fallback(checked)
  }

  /// Targets for unvalidated input. Anything unusable yields
  /// [`NutritionTarget::FALLBACK`] instead of an error.
  pub fn calculate_or_fallback(&self, form: &ProfileForm) -> NutritionTarget {
    let checked = form.parse().and_then(|profile| self.checked_breakdown(&profile));
    Self::target_or_fallback(checked)
  }

  fn target_or_fallback(checked: Result<TargetBreakdown, ProfileError>) -> NutritionTarget {
    match checked {
      Ok(breakdown) => breakdown.target,
      Err(e) => {
        warn!(error = %e, "Profile unusable, falling back to default targets");
        NutritionTarget::FALLBACK
      }
    }
  }
}
