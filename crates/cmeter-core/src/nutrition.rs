//! Nutrition facts — shared, immutable product definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Energy and macros per unit of a product. Never owned, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionFact {
  pub fact_id:    Uuid,
  pub name:       String,
  /// Kilocalories per unit.
  pub energy:     i64,
  pub protein:    i64,
  pub fat:        i64,
  pub carbs:      i64,
  pub created_at: DateTime<Utc>,
}

impl NutritionFact {
  /// Energy for `quantity` units.
  pub fn energy_for(&self, quantity: i64) -> i64 { self.energy.saturating_mul(quantity) }
}

/// Input to [`IntakeStore::record_fact`](crate::store::IntakeStore::record_fact).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFact {
  pub name:    String,
  pub energy:  i64,
  #[serde(default)]
  pub protein: i64,
  #[serde(default)]
  pub fat:     i64,
  #[serde(default)]
  pub carbs:   i64,
}

impl NewFact {
  pub fn new(name: impl Into<String>, energy: i64) -> Self {
    Self { name: name.into(), energy, protein: 0, fat: 0, carbs: 0 }
  }

  pub fn with_macros(mut self, protein: i64, fat: i64, carbs: i64) -> Self {
    self.protein = protein;
    self.fat = fat;
    self.carbs = carbs;
    self
  }

  /// Energy must be positive, macros non-negative, the name non-blank.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::InvalidNutrition("name must not be empty".into()));
    }
    if self.energy <= 0 {
      return Err(Error::InvalidNutrition("calories must be a positive number".into()));
    }
    for (label, value) in [("proteins", self.protein), ("fats", self.fat), ("carbs", self.carbs)] {
      if value < 0 {
        return Err(Error::InvalidNutrition(format!(
          "{label} must be a non-negative number"
        )));
      }
    }
    Ok(())
  }
}
