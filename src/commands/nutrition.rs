//! Food database and nutrition logging commands

use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adherence::{AdherenceAnalyzer, DailyProgress};
use crate::db::AppState;
use crate::food::FoodMacros;
use crate::log_store;
use crate::models::{MealType, NutritionEntry};
use crate::targets::NutritionTarget;

use super::current_target;

#[derive(Debug, Clone, Serialize)]
pub struct FoodListing {
  pub category: String,
  pub food: String,
  pub per_gram: FoodMacros,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFoodRequest {
  pub food: String,
  /// Searched across all categories when absent
  pub category: Option<String>,
  pub quantity_g: f64,
  pub meal_type: Option<String>,
  /// Defaults to the current local date/time
  pub date: Option<NaiveDate>,
  pub time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayView {
  pub target: NutritionTarget,
  pub entries: Vec<NutritionEntry>,
  pub progress: DailyProgress,
}

pub async fn list_foods(state: &AppState, category: Option<&str>) -> Result<Vec<FoodListing>, String> {
  let categories: Vec<&str> = match category {
    Some(c) => vec![c],
    None => state.foods.categories().collect(),
  };

  let mut listings = Vec::new();
  for category in categories {
    let foods = state
      .foods
      .foods(category)
      .map_err(|e| format!("Failed to list foods: {}", e))?;
    for food in foods {
      let per_gram = *state
        .foods
        .lookup(category, food)
        .map_err(|e| format!("Failed to list foods: {}", e))?;
      listings.push(FoodListing {
        category: category.to_string(),
        food: food.to_string(),
        per_gram,
      });
    }
  }
  Ok(listings)
}

/// Look the food up, scale its per-gram macros by quantity, append the entry
pub async fn log_food(state: &AppState, request: LogFoodRequest) -> Result<NutritionEntry, String> {
  let per_gram = match request.category.as_deref() {
    Some(category) => *state
      .foods
      .lookup(category, &request.food)
      .map_err(|e| format!("Failed to log food: {}", e))?,
    None => state
      .foods
      .find(&request.food)
      .map(|(_, macros)| *macros)
      .ok_or_else(|| format!("Failed to log food: unknown food '{}'", request.food))?,
  };

  let meal_type = match request.meal_type.as_deref() {
    Some(text) => text
      .parse::<MealType>()
      .map_err(|e| format!("Failed to log food: {}", e))?,
    None => MealType::default(),
  };

  let now = Local::now().naive_local();
  let entry = NutritionEntry::new(
    request.date.unwrap_or(now.date()),
    request.time.unwrap_or(now.time()),
    request.food,
    request.quantity_g,
    per_gram.for_quantity(request.quantity_g),
    meal_type,
  )
  .map_err(|e| format!("Failed to log food: {}", e))?;

  log_store::append_nutrition(&state.db, &entry)
    .await
    .map_err(|e| format!("Failed to log food: {}", e))?;

  info!(food = %entry.food, calories = entry.calories, "Food logged");
  Ok(entry)
}

/// One day's entries and progress against the current target
pub async fn get_today(state: &AppState, date: NaiveDate) -> Result<TodayView, String> {
  let (_, target) = current_target(state);
  let entries = log_store::load_nutrition(&state.db, Some(date), Some(date))
    .await
    .map_err(|e| format!("Failed to load today's log: {}", e))?;

  let progress = AdherenceAnalyzer::new(&state.config.protocol).daily_progress(&target, &entries, date);

  Ok(TodayView {
    target,
    entries,
    progress,
  })
}
