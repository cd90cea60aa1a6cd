//! Input validation functions
//!
//! Raw form fields arrive as strings that may be empty or garbage. They are
//! parsed leniently (anything unparseable counts as zero) and then checked
//! against realistic ranges. All rules run; every failure is collected.

use crate::config::FormDefaults;
use crate::errors::ValidationErrors;
use crate::health_metrics::{ActivityLevel, Goal, PersonProfile, Sex};
use crate::units::{cm_from_feet_inches, kg_from_lbs, HeightUnit, WeightUnit};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const MIN_AGE_YEARS: i32 = 13;
pub const MAX_AGE_YEARS: i32 = 90;

/// Exclusive height bounds in cm
pub const MIN_HEIGHT_CM: f64 = 90.0;
pub const MAX_HEIGHT_CM: f64 = 250.0;

/// Exclusive weight bounds in kg
pub const MIN_WEIGHT_KG: f64 = 30.0;
pub const MAX_WEIGHT_KG: f64 = 300.0;

// ============================================================================
// Field Parsing
// ============================================================================

/// Parse a numeric form field; empty, non-numeric and non-finite input is `0.0`
pub fn parse_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse a select field; an empty value is the pre-selected `default`
///
/// `expected` lists the accepted options for the violation message.
pub fn parse_choice<T: FromStr>(raw: &str, default: T, expected: &str) -> Result<T, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse().map_err(|_| format!("must be {}", expected))
}

// ============================================================================
// Range Validation
// ============================================================================

/// Validate age: a whole number of years in [13, 90]
pub fn validate_age(age: f64) -> Result<i32, String> {
    if age.fract() != 0.0 || age < MIN_AGE_YEARS as f64 || age > MAX_AGE_YEARS as f64 {
        return Err(format!(
            "must be a whole number between {} and {}",
            MIN_AGE_YEARS, MAX_AGE_YEARS
        ));
    }
    Ok(age as i32)
}

/// Validate height in cm, exclusive range (90, 250)
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if height_cm.is_nan() || height_cm <= MIN_HEIGHT_CM || height_cm >= MAX_HEIGHT_CM {
        return Err(format!(
            "must be between {} and {} cm",
            MIN_HEIGHT_CM, MAX_HEIGHT_CM
        ));
    }
    Ok(())
}

/// Validate weight in kg, exclusive range (30, 300)
pub fn validate_weight_kg(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg <= MIN_WEIGHT_KG || weight_kg >= MAX_WEIGHT_KG {
        return Err(format!(
            "must be between {} and {} kg",
            MIN_WEIGHT_KG, MAX_WEIGHT_KG
        ));
    }
    Ok(())
}

pub fn validate_sex(raw: &str, default: Sex) -> Result<Sex, String> {
    parse_choice(raw, default, "male or female")
}

pub fn validate_activity(raw: &str, default: ActivityLevel) -> Result<ActivityLevel, String> {
    parse_choice(raw, default, "sedentary, light, moderate, very or extra")
}

pub fn validate_goal(raw: &str, default: Goal) -> Result<Goal, String> {
    parse_choice(raw, default, "maintain, lose or gain")
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map form field names to display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "sex" => "Sex",
        "age" => "Age",
        "weight_unit" => "Weight Unit",
        "height_unit" => "Height Unit",
        "weight" | "weight_kg" => "Weight",
        "height" | "height_cm" => "Height",
        "activity" => "Activity Level",
        "goal" => "Goal",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}

// ============================================================================
// Form Validation
// ============================================================================

/// Raw profile fields as typed into a form
///
/// Weight and height have independent unit toggles, so lb with cm is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub sex: String,
    pub age: String,
    /// `kg` or `lb`
    pub weight_unit: String,
    /// Weight in the selected unit
    pub weight: String,
    /// `cm` or `ft`
    pub height_unit: String,
    pub height_cm: String,
    pub height_ft: String,
    pub height_in: String,
}

/// Raw energy calculator fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyForm {
    #[serde(flatten)]
    pub profile: ProfileForm,
    pub activity: String,
    pub goal: String,
}

/// Validator output: the normalized metric values plus every violation
#[derive(Debug, Clone)]
pub struct ProfileValidation {
    pub weight_unit: WeightUnit,
    pub height_unit: HeightUnit,
    pub sex: Option<Sex>,
    pub age_years: i32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub violations: ValidationErrors,
}

impl ProfileValidation {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// The profile when every rule passed
    pub fn into_profile(self) -> Result<PersonProfile, ValidationErrors> {
        match self.sex {
            Some(sex) if self.violations.is_empty() => Ok(PersonProfile {
                sex,
                age_years: self.age_years,
                weight_kg: self.weight_kg,
                height_cm: self.height_cm,
            }),
            _ => Err(self.violations),
        }
    }
}

fn record<T>(violations: &mut ValidationErrors, field: &str, result: Result<T, String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            violations.push(ValidationError::new(field, &message).user_message());
            None
        }
    }
}

/// Validate and normalize profile fields to metric
///
/// Weight in lb goes through [`kg_from_lbs`] and height in ft/in through
/// [`cm_from_feet_inches`]; the ranges apply to the converted values. Empty
/// selects take their value from `defaults`.
pub fn validate_profile(form: &ProfileForm, defaults: &FormDefaults) -> ProfileValidation {
    let mut violations = ValidationErrors::new();

    let weight_unit = record(
        &mut violations,
        "weight_unit",
        parse_choice(&form.weight_unit, defaults.unit_system.weight_unit(), "kg or lb"),
    )
    .unwrap_or_else(|| defaults.unit_system.weight_unit());
    let height_unit = record(
        &mut violations,
        "height_unit",
        parse_choice(&form.height_unit, defaults.unit_system.height_unit(), "cm or ft"),
    )
    .unwrap_or_else(|| defaults.unit_system.height_unit());
    let sex = record(&mut violations, "sex", validate_sex(&form.sex, defaults.sex));

    let age = parse_number(&form.age);
    let age_years = record(&mut violations, "age", validate_age(age)).unwrap_or(age as i32);

    let weight = parse_number(&form.weight);
    let weight_kg = match weight_unit {
        WeightUnit::Kg => weight,
        WeightUnit::Lbs => kg_from_lbs(weight),
    };
    record(&mut violations, "weight", validate_weight_kg(weight_kg));

    let height_cm = match height_unit {
        HeightUnit::Cm => parse_number(&form.height_cm),
        HeightUnit::FeetInches => cm_from_feet_inches(
            parse_number(&form.height_ft),
            parse_number(&form.height_in),
        ) as f64,
    };
    record(&mut violations, "height", validate_height_cm(height_cm));

    ProfileValidation {
        weight_unit,
        height_unit,
        sex,
        age_years,
        weight_kg,
        height_cm,
        violations,
    }
}

/// Validate the full energy form
pub fn validate_energy_form(
    form: &EnergyForm,
    defaults: &FormDefaults,
) -> Result<(PersonProfile, ActivityLevel, Goal), ValidationErrors> {
    let mut validation = validate_profile(&form.profile, defaults);
    let activity = record(
        &mut validation.violations,
        "activity",
        validate_activity(&form.activity, defaults.activity),
    );
    let goal = record(
        &mut validation.violations,
        "goal",
        validate_goal(&form.goal, defaults.goal),
    );

    // a failed choice has already left a violation, so into_profile errors first
    let profile = validation.into_profile()?;
    Ok((
        profile,
        activity.unwrap_or(defaults.activity),
        goal.unwrap_or(defaults.goal),
    ))
}
