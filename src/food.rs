//! Food database: category -> item -> per-gram macros

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::MacroTotals;

#[derive(Error, Debug)]
pub enum FoodDbError {
  #[error("Failed to read food database: {0}")]
  Io(#[from] std::io::Error),

  #[error("Failed to parse food database: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("Unknown category: {0}")]
  UnknownCategory(String),

  #[error("Unknown food '{food}' in category '{category}'")]
  UnknownFood { category: String, food: String },
}

/// Macros for one gram of a food
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodMacros {
  pub calories: f64,
  pub protein: f64,
  pub carbs: f64,
  pub fat: f64,
}

impl FoodMacros {
  pub fn for_quantity(&self, grams: f64) -> MacroTotals {
    MacroTotals {
      calories: self.calories,
      protein: self.protein,
      carbs: self.carbs,
      fat: self.fat,
    }
    .scale(grams)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodDatabase {
  categories: BTreeMap<String, BTreeMap<String, FoodMacros>>,
}

impl FoodDatabase {
  pub fn from_json(json: &str) -> Result<Self, FoodDbError> {
    Ok(serde_json::from_str(json)?)
  }

  pub fn load(path: &Path) -> Result<Self, FoodDbError> {
    let json = fs::read_to_string(path)?;
    let db = Self::from_json(&json)?;
    debug!(path = %path.display(), foods = db.len(), "Loaded food database");
    Ok(db)
  }

  /// Load from disk, falling back to the built-in list when the file is
  /// missing or unreadable
  pub fn load_or_builtin(path: &Path) -> Self {
    match Self::load(path) {
      Ok(db) => db,
      Err(e) => {
        warn!(path = %path.display(), error = %e, "Using built-in food database");
        Self::builtin()
      }
    }
  }

  pub fn builtin() -> Self {
    let mut protein_foods = BTreeMap::new();
    protein_foods.insert(
      "Chicken Breast".to_string(),
      FoodMacros { calories: 1.65, protein: 0.31, carbs: 0.0, fat: 0.036 },
    );
    protein_foods.insert(
      "Greek Yogurt".to_string(),
      FoodMacros { calories: 1.3, protein: 0.17, carbs: 0.095, fat: 0.05 },
    );
    protein_foods.insert(
      "Eggs".to_string(),
      FoodMacros { calories: 1.55, protein: 0.13, carbs: 0.011, fat: 0.11 },
    );

    let mut categories = BTreeMap::new();
    categories.insert("High-Protein Foods".to_string(), protein_foods);
    Self { categories }
  }

  pub fn categories(&self) -> impl Iterator<Item = &str> {
    self.categories.keys().map(String::as_str)
  }

  pub fn foods(&self, category: &str) -> Result<impl Iterator<Item = &str>, FoodDbError> {
    self
      .categories
      .get(category)
      .map(|foods| foods.keys().map(String::as_str))
      .ok_or_else(|| FoodDbError::UnknownCategory(category.to_string()))
  }

  pub fn lookup(&self, category: &str, food: &str) -> Result<&FoodMacros, FoodDbError> {
    let foods = self
      .categories
      .get(category)
      .ok_or_else(|| FoodDbError::UnknownCategory(category.to_string()))?;
    foods.get(food).ok_or_else(|| FoodDbError::UnknownFood {
      category: category.to_string(),
      food: food.to_string(),
    })
  }

  /// Find a food by name in any category (first match in category order)
  pub fn find(&self, food: &str) -> Option<(&str, &FoodMacros)> {
    self
      .categories
      .iter()
      .find_map(|(category, foods)| foods.get(food).map(|m| (category.as_str(), m)))
  }

  pub fn len(&self) -> usize {
    self.categories.values().map(BTreeMap::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  const SAMPLE: &str = r#"{
    "Carbohydrates": {
      "White Rice": {"calories": 1.3, "protein": 0.027, "carbs": 0.28, "fat": 0.003}
    },
    "High-Protein Foods": {
      "Tuna": {"calories": 1.16, "protein": 0.26, "carbs": 0.0, "fat": 0.01}
    }
  }"#;

  #[test]
  fn test_lookup_and_scale() {
    let db = FoodDatabase::from_json(SAMPLE).unwrap();
    let rice = db.lookup("Carbohydrates", "White Rice").unwrap();
    let totals = rice.for_quantity(200.0);

    assert!((totals.calories - 260.0).abs() < 1e-9);
    assert!((totals.carbs - 56.0).abs() < 1e-9);
    assert_eq!(db.len(), 2);
  }

  #[test]
  fn test_unknown_lookups() {
    let db = FoodDatabase::from_json(SAMPLE).unwrap();
    assert!(matches!(
      db.lookup("Sweets", "Cake"),
      Err(FoodDbError::UnknownCategory(_))
    ));
    assert!(matches!(
      db.lookup("Carbohydrates", "Cake"),
      Err(FoodDbError::UnknownFood { .. })
    ));
    assert!(db.foods("Sweets").is_err());
  }

  #[test]
  fn test_find_across_categories() {
    let db = FoodDatabase::from_json(SAMPLE).unwrap();
    let (category, tuna) = db.find("Tuna").unwrap();
    assert_eq!(category, "High-Protein Foods");
    assert_eq!(tuna.protein, 0.26);
    assert!(db.find("Pizza").is_none());
  }

  #[test]
  fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();

    let db = FoodDatabase::load(file.path()).unwrap();
    let categories: Vec<_> = db.categories().collect();
    assert_eq!(categories, vec!["Carbohydrates", "High-Protein Foods"]);
  }

  #[test]
  fn test_missing_or_corrupt_file_uses_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    assert_eq!(FoodDatabase::load_or_builtin(&missing), FoodDatabase::builtin());

    let corrupt = dir.path().join("corrupt.json");
    std::fs::write(&corrupt, "{ not json").unwrap();
    assert_eq!(FoodDatabase::load_or_builtin(&corrupt), FoodDatabase::builtin());

    assert!(FoodDatabase::builtin().lookup("High-Protein Foods", "Eggs").is_ok());
  }
}
