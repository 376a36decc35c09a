use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

use super::EntryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum MealType {
  Breakfast,
  Lunch,
  Dinner,
  Snack,
  PreWorkout,
  PostWorkout,
  #[default]
  Other,
}

impl std::fmt::Display for MealType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Breakfast => write!(f, "Breakfast"),
      Self::Lunch => write!(f, "Lunch"),
      Self::Dinner => write!(f, "Dinner"),
      Self::Snack => write!(f, "Snack"),
      Self::PreWorkout => write!(f, "Pre-Workout"),
      Self::PostWorkout => write!(f, "Post-Workout"),
      Self::Other => write!(f, "Other"),
    }
  }
}

impl std::str::FromStr for MealType {
  type Err = EntryError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let key: String = s
      .chars()
      .filter(|c| c.is_ascii_alphanumeric())
      .map(|c| c.to_ascii_lowercase())
      .collect();
    match key.as_str() {
      "breakfast" => Ok(Self::Breakfast),
      "lunch" => Ok(Self::Lunch),
      "dinner" => Ok(Self::Dinner),
      "snack" => Ok(Self::Snack),
      "preworkout" => Ok(Self::PreWorkout),
      "postworkout" => Ok(Self::PostWorkout),
      "other" => Ok(Self::Other),
      _ => Err(EntryError::Invalid {
        field: "meal type",
        value: s.to_string(),
      }),
    }
  }
}

/// Calories and macronutrient grams for some amount of food
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroTotals {
  pub calories: f64,
  pub protein: f64,
  pub carbs: f64,
  pub fat: f64,
}

impl MacroTotals {
  /// Energy implied by the macros (4/4/9 kcal per gram)
  pub fn macro_kcal(&self) -> f64 {
    self.protein * 4.0 + self.carbs * 4.0 + self.fat * 9.0
  }

  pub fn scale(&self, factor: f64) -> Self {
    Self {
      calories: self.calories * factor,
      protein: self.protein * factor,
      carbs: self.carbs * factor,
      fat: self.fat * factor,
    }
  }
}

impl Add for MacroTotals {
  type Output = Self;
  fn add(self, rhs: Self) -> Self {
    Self {
      calories: self.calories + rhs.calories,
      protein: self.protein + rhs.protein,
      carbs: self.carbs + rhs.carbs,
      fat: self.fat + rhs.fat,
    }
  }
}

impl AddAssign for MacroTotals {
  fn add_assign(&mut self, rhs: Self) {
    *self = *self + rhs;
  }
}

impl std::iter::Sum for MacroTotals {
  fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
    iter.fold(Self::default(), Add::add)
  }
}

/// One logged food item. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEntry {
  pub date: NaiveDate,
  pub time: NaiveTime,
  pub food: String,
  pub quantity_g: f64,
  pub calories: f64,
  pub protein: f64,
  pub carbs: f64,
  pub fat: f64,
  pub meal_type: MealType,
}

impl NutritionEntry {
  pub fn new(
    date: NaiveDate,
    time: NaiveTime,
    food: impl Into<String>,
    quantity_g: f64,
    totals: MacroTotals,
    meal_type: MealType,
  ) -> Result<Self, EntryError> {
    let food = food.into();
    if food.trim().is_empty() {
      return Err(EntryError::Missing("food"));
    }
    if !(quantity_g.is_finite() && quantity_g > 0.0) {
      return Err(EntryError::Invalid {
        field: "quantity",
        value: quantity_g.to_string(),
      });
    }
    for (field, value) in [
      ("calories", totals.calories),
      ("protein", totals.protein),
      ("carbs", totals.carbs),
      ("fat", totals.fat),
    ] {
      if !(value.is_finite() && value >= 0.0) {
        return Err(EntryError::Invalid {
          field,
          value: value.to_string(),
        });
      }
    }

    Ok(Self {
      date,
      time,
      food,
      quantity_g,
      calories: totals.calories,
      protein: totals.protein,
      carbs: totals.carbs,
      fat: totals.fat,
      meal_type,
    })
  }

  pub fn totals(&self) -> MacroTotals {
    MacroTotals {
      calories: self.calories,
      protein: self.protein,
      carbs: self.carbs,
      fat: self.fat,
    }
  }
}
