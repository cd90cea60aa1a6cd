//! Health metrics calculations module
//!
//! BMI, BMR (Mifflin-St Jeor) and TDEE, plus the maintain/lose/gain calorie
//! targets derived from TDEE.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: All calculations are pure, no side effects
//! 2. **Metric Only**: inputs are kg, cm and m; convert with [`crate::units`] first
//! 3. **Total**: degenerate input yields a sentinel, never a panic
//!
//! Formulas accept any input. Range checks live in [`crate::validation`].

use crate::macros::{allocate_macros, MacroSplit};
use crate::units::round_half_up;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Daily deficit applied for the "lose" target (kcal)
pub const LOSE_OFFSET_KCAL: i32 = -500;

/// Daily surplus applied for the "gain" target (kcal)
pub const GAIN_OFFSET_KCAL: i32 = 300;

// ============================================================================
// Profile Types
// ============================================================================

/// Biological sex for the BMR equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            _ => Err(format!("Unknown sex: {}", s)),
        }
    }
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    #[default]
    Sedentary,
    /// Light exercise 1-3 days/week
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    /// Very hard exercise, physical job
    ExtraActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    /// Get the activity multiplier for TDEE calculation
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::LightlyActive => "Light exercise 1-3 days/week",
            ActivityLevel::ModeratelyActive => "Moderate exercise 3-5 days/week",
            ActivityLevel::VeryActive => "Hard exercise 6-7 days/week",
            ActivityLevel::ExtraActive => "Very hard exercise or physical job",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::ExtraActive => "extra_active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    /// Accepts both the form option values (`light`, `moderate`, `very`, ...)
    /// and the serialized names (`lightly_active`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" | "lightly_active" => Ok(ActivityLevel::LightlyActive),
            "moderate" | "moderately_active" => Ok(ActivityLevel::ModeratelyActive),
            "very" | "very_active" => Ok(ActivityLevel::VeryActive),
            "extra" | "extra_active" => Ok(ActivityLevel::ExtraActive),
            _ => Err(format!("Unknown activity level: {}", s)),
        }
    }
}

/// Calorie goal chosen on the energy form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    #[default]
    Maintain,
    Lose,
    Gain,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Maintain => "maintain",
            Goal::Lose => "lose",
            Goal::Gain => "gain",
        }
    }
}

impl FromStr for Goal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "maintain" => Ok(Goal::Maintain),
            "lose" => Ok(Goal::Lose),
            "gain" => Ok(Goal::Gain),
            _ => Err(format!("Unknown goal: {}", s)),
        }
    }
}

/// Normalized metric profile that the energy formulas consume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonProfile {
    pub sex: Sex,
    /// Age in whole years
    pub age_years: i32,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Height in centimeters
    pub height_cm: f64,
}

// ============================================================================
// BMI Calculations
// ============================================================================

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// BMI calculation result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BmiResult {
    /// BMI value, `0.0` when input is missing
    pub value: f64,
    /// `None` when input is missing or non-positive
    pub category: Option<BmiCategory>,
}

impl BmiResult {
    /// The "no result" sentinel
    pub const EMPTY: BmiResult = BmiResult {
        value: 0.0,
        category: None,
    };

    pub fn from_value(value: f64) -> Self {
        Self {
            value,
            category: classify_bmi(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none()
    }

    /// Category label, empty string for the sentinel
    pub fn category_label(&self) -> &'static str {
        self.category.map(|c| c.label()).unwrap_or("")
    }

    /// BMI with one decimal, `--` for the sentinel
    pub fn display_value(&self) -> String {
        if self.value > 0.0 && self.value.is_finite() {
            format!("{:.1}", self.value)
        } else {
            "--".to_string()
        }
    }
}

/// Calculate BMI from weight and height
///
/// Formula: BMI = weight(kg) / height(m)²
///
/// Returns `0.0` unless both inputs are strictly positive. Zero is never a
/// legitimate BMI.
pub fn calculate_bmi(weight_kg: f64, height_m: f64) -> f64 {
    if !(weight_kg > 0.0 && height_m > 0.0) {
        return 0.0;
    }
    weight_kg / (height_m * height_m)
}

/// Classify BMI into a category
///
/// Bands are closed on the lower end and open on the upper end.
pub fn classify_bmi(bmi: f64) -> Option<BmiCategory> {
    if !bmi.is_finite() || bmi <= 0.0 {
        return None;
    }
    let category = if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    };
    Some(category)
}

/// Calculate a complete BMI result
pub fn calculate_bmi_result(weight_kg: f64, height_m: f64) -> BmiResult {
    BmiResult::from_value(calculate_bmi(weight_kg, height_m))
}

// ============================================================================
// BMR and TDEE Calculations
// ============================================================================

/// Calculate Basal Metabolic Rate using the Mifflin-St Jeor equation
///
/// Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// Women: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
pub fn calculate_bmr(sex: Sex, weight_kg: f64, height_cm: f64, age_years: i32) -> i32 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64;
    let bmr = match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    };
    round_half_up(bmr) as i32
}

/// Calculate Total Daily Energy Expenditure
///
/// TDEE = BMR × Activity Multiplier
pub fn calculate_tdee(bmr: i32, activity: ActivityLevel) -> i32 {
    round_half_up(bmr as f64 * activity.multiplier()) as i32
}

/// Maintain/lose/gain calorie targets derived from TDEE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalorieTargets {
    pub maintain: i32,
    pub lose: i32,
    pub gain: i32,
}

impl CalorieTargets {
    pub fn from_tdee(tdee: i32) -> Self {
        Self {
            maintain: tdee,
            lose: (tdee + LOSE_OFFSET_KCAL).max(0),
            gain: (tdee + GAIN_OFFSET_KCAL).max(0),
        }
    }

    /// Calories for the chosen goal
    pub fn for_goal(&self, goal: Goal) -> i32 {
        match goal {
            Goal::Maintain => self.maintain,
            Goal::Lose => self.lose,
            Goal::Gain => self.gain,
        }
    }
}

/// Energy calculator result, recomputed on every submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyResult {
    pub bmr: i32,
    pub tdee: i32,
    pub maintain: i32,
    pub lose: i32,
    pub gain: i32,
    /// Calories for the selected goal
    pub goal_calories: i32,
    pub protein_g: i32,
    pub fat_g: i32,
    pub carbs_g: i32,
}

impl EnergyResult {
    pub fn macros(&self) -> MacroSplit {
        MacroSplit {
            protein_g: self.protein_g,
            fat_g: self.fat_g,
            carbs_g: self.carbs_g,
        }
    }
}

/// Calculate the complete energy result for an already validated profile
pub fn calculate_energy_result(
    profile: &PersonProfile,
    activity: ActivityLevel,
    goal: Goal,
) -> EnergyResult {
    let bmr = calculate_bmr(
        profile.sex,
        profile.weight_kg,
        profile.height_cm,
        profile.age_years,
    );
    let tdee = calculate_tdee(bmr, activity);
    let targets = CalorieTargets::from_tdee(tdee);
    let goal_calories = targets.for_goal(goal);
    let macros = allocate_macros(goal_calories, profile.weight_kg);

    EnergyResult {
        bmr,
        tdee,
        maintain: targets.maintain,
        lose: targets.lose,
        gain: targets.gain,
        goal_calories,
        protein_g: macros.protein_g,
        fat_g: macros.fat_g,
        carbs_g: macros.carbs_g,
    }
}
