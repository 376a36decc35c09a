use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
  #[error("Missing field: {0}")]
  Missing(&'static str),

  #[error("Invalid {field}: {value}")]
  Invalid { field: &'static str, value: String },

  #[error("Stored profile has unusable fields: {0}")]
  Malformed(String),

  #[error("Profile yields a non-positive calorie target ({0} kcal)")]
  NoEnergy(i64),
}

/// ---------------------------------------------------------------------------
/// Profile Enums
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
  Male,
  Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ActivityLevel {
  Sedentary,
  Light,
  #[default]
  Moderate,
  VeryActive,
}

impl ActivityLevel {
  /// TDEE multiplier applied to BMR
  pub fn multiplier(&self) -> f64 {
    match self {
      Self::Sedentary => 1.2,
      Self::Light => 1.375,
      Self::Moderate => 1.55,
      Self::VeryActive => 1.725,
    }
  }

  /// Lenient parse: anything unrecognised is treated as Moderate
  pub fn parse_or_default(s: &str) -> Self {
    s.parse().unwrap_or_default()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Phase {
  #[default]
  Maintenance,
  Bulking,
  Cutting,
}

impl Phase {
  /// Calorie factor applied to TDEE
  pub fn calorie_factor(&self) -> f64 {
    match self {
      Self::Bulking => 1.15,
      Self::Cutting => 0.85,
      Self::Maintenance => 1.0,
    }
  }

  /// Lenient parse: anything unrecognised is treated as Maintenance
  pub fn parse_or_default(s: &str) -> Self {
    s.parse().unwrap_or_default()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExperienceLevel {
  #[default]
  Beginner,
  Intermediate,
  Advanced,
}

impl ExperienceLevel {
  /// Minimum rest between Heavy Duty sessions, in hours
  pub fn recovery_hours(&self) -> u32 {
    match self {
      Self::Beginner => 72,
      Self::Intermediate => 96,
      Self::Advanced => 168,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum TrainingGoal {
  Strength,
  #[default]
  Hypertrophy,
  Power,
  Endurance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TrainingMode {
  #[default]
  HeavyDuty,
  General,
}

/// Normalise free text for enum parsing: lowercase, no spaces/dashes/underscores
fn normalize(s: &str) -> String {
  s.chars()
    .filter(|c| !matches!(c, ' ' | '-' | '_'))
    .flat_map(char::to_lowercase)
    .collect()
}

macro_rules! text_enum {
  ($ty:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
    impl std::fmt::Display for $ty {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
          $(Self::$variant => write!(f, $text),)+
        }
      }
    }

    impl std::str::FromStr for $ty {
      type Err = ProfileError;
      fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        $(
          if key == normalize($text) {
            return Ok(Self::$variant);
          }
        )+
        Err(ProfileError::Invalid { field: $label, value: s.to_string() })
      }
    }
  };
}

text_enum!(Sex, "sex", { Male => "Male", Female => "Female" });
text_enum!(ActivityLevel, "activity level", {
  Sedentary => "Sedentary",
  Light => "Light",
  Moderate => "Moderate",
  VeryActive => "Very Active",
});
text_enum!(Phase, "phase", { Maintenance => "Maintenance", Bulking => "Bulking", Cutting => "Cutting" });
text_enum!(ExperienceLevel, "experience level", {
  Beginner => "Beginner",
  Intermediate => "Intermediate",
  Advanced => "Advanced",
});
text_enum!(TrainingGoal, "training goal", {
  Strength => "Strength",
  Hypertrophy => "Hypertrophy",
  Power => "Power",
  Endurance => "Endurance",
});
text_enum!(TrainingMode, "training mode", { HeavyDuty => "Heavy Duty", General => "General" });

/// ---------------------------------------------------------------------------
/// User Profile
/// ---------------------------------------------------------------------------

/// Validated biometric profile. Construct through [`UserProfile::new`] or
/// [`ProfileForm::parse`]; deserialized profiles should be checked with
/// [`UserProfile::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
  pub weight_kg: f64,
  pub height_cm: f64,
  pub age: u32,
  pub sex: Sex,
  pub activity_level: ActivityLevel,
  pub phase: Phase,
  pub experience_level: ExperienceLevel,
  pub goal: TrainingGoal,
  pub mode: TrainingMode,
}

impl Default for UserProfile {
  fn default() -> Self {
    Self {
      weight_kg: 70.0,
      height_cm: 170.0,
      age: 25,
      sex: Sex::Male,
      activity_level: ActivityLevel::Moderate,
      phase: Phase::Maintenance,
      experience_level: ExperienceLevel::Beginner,
      goal: TrainingGoal::Hypertrophy,
      mode: TrainingMode::HeavyDuty,
    }
  }
}

impl UserProfile {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    sex: Sex,
    activity_level: ActivityLevel,
    phase: Phase,
    experience_level: ExperienceLevel,
    goal: TrainingGoal,
    mode: TrainingMode,
  ) -> Result<Self, ProfileError> {
    let profile = Self {
      weight_kg,
      height_cm,
      age,
      sex,
      activity_level,
      phase,
      experience_level,
      goal,
      mode,
    };
    profile.validate()?;
    Ok(profile)
  }

  pub fn validate(&self) -> Result<(), ProfileError> {
    positive("weight", self.weight_kg)?;
    positive("height", self.height_cm)?;
    if self.age == 0 {
      return Err(ProfileError::Invalid {
        field: "age",
        value: self.age.to_string(),
      });
    }
    Ok(())
  }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ProfileError> {
  if value.is_finite() && value > 0.0 {
    Ok(value)
  } else {
    Err(ProfileError::Invalid {
      field,
      value: value.to_string(),
    })
  }
}

/// ---------------------------------------------------------------------------
/// Profile Form (raw text as entered by the user)
/// ---------------------------------------------------------------------------

/// Unvalidated profile fields, as they arrive from an input form or flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
  pub weight: Option<String>,
  pub height: Option<String>,
  pub age: Option<String>,
  pub sex: Option<String>,
  pub activity_level: Option<String>,
  pub phase: Option<String>,
  pub experience_level: Option<String>,
  pub goal: Option<String>,
  pub mode: Option<String>,
}

impl ProfileForm {
  /// Parse into a validated profile.
  ///
  /// Weight, height, age and sex are required. Activity level and phase fall
  /// back to Moderate/Maintenance when missing or unrecognised; the remaining
  /// fields fall back to their defaults when missing.
  pub fn parse(&self) -> Result<UserProfile, ProfileError> {
    let weight_kg = number(&self.weight, "weight")?;
    let height_cm = number(&self.height, "height")?;
    let age_text = required(&self.age, "age")?;
    let age = age_text.trim().parse::<u32>().map_err(|_| ProfileError::Invalid {
      field: "age",
      value: age_text.to_string(),
    })?;
    let sex: Sex = required(&self.sex, "sex")?.parse()?;

    let activity_level = self
      .activity_level
      .as_deref()
      .map(ActivityLevel::parse_or_default)
      .unwrap_or_default();
    let phase = self
      .phase
      .as_deref()
      .map(Phase::parse_or_default)
      .unwrap_or_default();
    let experience_level = optional(&self.experience_level)?.unwrap_or_default();
    let goal = optional(&self.goal)?.unwrap_or_default();
    let mode = optional(&self.mode)?.unwrap_or_default();

    UserProfile::new(
      weight_kg,
      height_cm,
      age,
      sex,
      activity_level,
      phase,
      experience_level,
      goal,
      mode,
    )
  }

  /// Apply the fields present in this form on top of an existing profile
  pub fn merge_into(&self, base: &UserProfile) -> Result<UserProfile, ProfileError> {
    let filled = ProfileForm {
      weight: self.weight.clone().or_else(|| Some(base.weight_kg.to_string())),
      height: self.height.clone().or_else(|| Some(base.height_cm.to_string())),
      age: self.age.clone().or_else(|| Some(base.age.to_string())),
      sex: self.sex.clone().or_else(|| Some(base.sex.to_string())),
      activity_level: self
        .activity_level
        .clone()
        .or_else(|| Some(base.activity_level.to_string())),
      phase: self.phase.clone().or_else(|| Some(base.phase.to_string())),
      experience_level: self
        .experience_level
        .clone()
        .or_else(|| Some(base.experience_level.to_string())),
      goal: self.goal.clone().or_else(|| Some(base.goal.to_string())),
      mode: self.mode.clone().or_else(|| Some(base.mode.to_string())),
    };
    filled.parse()
  }

  /// Whether this form supplies a value for the given stored-profile key
  pub fn provides(&self, stored_key: &str) -> bool {
    let value = match stored_key {
      "weight_kg" => &self.weight,
      "height_cm" => &self.height,
      "age" => &self.age,
      "sex" => &self.sex,
      "activity_level" => &self.activity_level,
      "phase" => &self.phase,
      "experience_level" => &self.experience_level,
      "goal" => &self.goal,
      "mode" => &self.mode,
      // Rewritten on every save
      "last_updated" => return true,
      _ => return false,
    };
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
  }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ProfileError> {
  match value.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v),
    _ => Err(ProfileError::Missing(field)),
  }
}

fn number(value: &Option<String>, field: &'static str) -> Result<f64, ProfileError> {
  let text = required(value, field)?;
  text.parse::<f64>().map_err(|_| ProfileError::Invalid {
    field,
    value: text.to_string(),
  })
}

fn optional<T>(value: &Option<String>) -> Result<Option<T>, ProfileError>
where
  T: std::str::FromStr<Err = ProfileError>,
{
  match value.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() => v.parse().map(Some),
    _ => Ok(None),
  }
}

/// ---------------------------------------------------------------------------
/// Stored Profile (JSON record)
/// ---------------------------------------------------------------------------

/// On-disk profile record. Every field has a default so partial files load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredProfile {
  #[serde(flatten)]
  pub profile: UserProfile,
  pub last_updated: Option<DateTime<Utc>>,
  /// Keys present on disk whose values could not be read. These hold their
  /// defaults in `profile` and make the record unusable for targets.
  #[serde(skip_deserializing, skip_serializing_if = "Vec::is_empty")]
  pub invalid_fields: Vec<String>,
}

impl StoredProfile {
  /// Marker for a file that is not a JSON object at all
  pub const UNREADABLE: &'static str = "(unreadable file)";

  pub fn unreadable() -> Self {
    Self {
      invalid_fields: vec![Self::UNREADABLE.to_string()],
      ..Self::default()
    }
  }

  /// Read a stored record field by field. Missing keys take their defaults,
  /// unknown keys are ignored, and keys with unusable values are recorded in
  /// `invalid_fields` without discarding the rest.
  pub fn from_json(text: &str) -> Self {
    let fields = match serde_json::from_str::<Value>(text) {
      Ok(Value::Object(fields)) => fields,
      _ => return Self::unreadable(),
    };
    let mut merged = match serde_json::to_value(Self::default()) {
      Ok(Value::Object(defaults)) => defaults,
      _ => return Self::unreadable(),
    };

    let mut invalid_fields = Vec::new();
    for (key, value) in fields {
      if !merged.contains_key(&key) {
        continue;
      }
      let mut candidate = merged.clone();
      candidate.insert(key.clone(), value);
      if serde_json::from_value::<Self>(Value::Object(candidate.clone())).is_ok() {
        merged = candidate;
      } else {
        invalid_fields.push(key);
      }
    }

    match serde_json::from_value::<Self>(Value::Object(merged)) {
      Ok(stored) => Self {
        invalid_fields,
        ..stored
      },
      Err(_) => Self::unreadable(),
    }
  }

  /// The profile, if every stored field was readable and it validates
  pub fn check(&self) -> Result<&UserProfile, ProfileError> {
    if !self.invalid_fields.is_empty() {
      return Err(ProfileError::Malformed(self.invalid_fields.join(", ")));
    }
    self.profile.validate()?;
    Ok(&self.profile)
  }
}
