//! Macronutrient split from a calorie target
//!
//! Protein and fat are set per kilogram of body weight. Carbohydrates take
//! whatever is left of the calorie budget and never go below zero. Protein
//! and fat are not reduced when they alone exceed the budget.

use crate::units::round_half_up;
use serde::{Deserialize, Serialize};

/// Protein target in grams per kg of body weight
pub const PROTEIN_G_PER_KG: f64 = 2.0;

/// Fat target in grams per kg of body weight
pub const FAT_G_PER_KG: f64 = 0.8;

pub const KCAL_PER_G_PROTEIN: i32 = 4;
pub const KCAL_PER_G_FAT: i32 = 9;
pub const KCAL_PER_G_CARBS: i32 = 4;

/// Daily macro targets in grams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein_g: i32,
    pub fat_g: i32,
    pub carbs_g: i32,
}

impl MacroSplit {
    pub fn protein_kcal(&self) -> i32 {
        self.protein_g * KCAL_PER_G_PROTEIN
    }

    pub fn fat_kcal(&self) -> i32 {
        self.fat_g * KCAL_PER_G_FAT
    }

    pub fn carbs_kcal(&self) -> i32 {
        self.carbs_g * KCAL_PER_G_CARBS
    }

    /// Calories covered by the split (may exceed the goal when carbs are clamped)
    pub fn total_kcal(&self) -> i32 {
        self.protein_kcal() + self.fat_kcal() + self.carbs_kcal()
    }
}

/// Derive protein/fat/carb grams from a goal calorie count and body weight
pub fn allocate_macros(goal_calories: i32, weight_kg: f64) -> MacroSplit {
    let protein_g = round_half_up(PROTEIN_G_PER_KG * weight_kg) as i32;
    let fat_g = round_half_up(FAT_G_PER_KG * weight_kg) as i32;

    let protein_kcal = protein_g * KCAL_PER_G_PROTEIN;
    let fat_kcal = fat_g * KCAL_PER_G_FAT;
    let carb_kcal = (goal_calories - protein_kcal - fat_kcal).max(0);
    let carbs_g = round_half_up(carb_kcal as f64 / KCAL_PER_G_CARBS as f64) as i32;

    MacroSplit {
        protein_g,
        fat_g,
        carbs_g,
    }
}
