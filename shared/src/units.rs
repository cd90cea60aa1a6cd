//! Unit conversion and normalization module
//!
//! Form input arrives in either metric or imperial units. Everything is
//! normalized to kilograms and centimeters before a formula sees it.
//!
//! # Design Principles
//!
//! 1. **Metric Internally**: formulas only ever consume kg, cm and m
//! 2. **Total Functions**: conversions accept any real and never fail
//! 3. **Conversion at Boundaries**: convert on form input, not in formulas

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kilograms per international avoirdupois pound
pub const KG_PER_LB: f64 = 0.45359237;

/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;

/// Meters per inch
pub const METERS_PER_INCH: f64 = 0.0254;

/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Round half up (`floor(x + 0.5)`), the rounding used by every calculator.
///
/// Differs from [`f64::round`] only for negative ties: `-2.5` becomes `-2`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to two decimal places using [`round_half_up`] on the scaled value
pub fn round_to_hundredths(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

// ============================================================================
// Form-level conversions
// ============================================================================

/// Pounds to kilograms, rounded to 2 decimals
pub fn kg_from_lbs(lbs: f64) -> f64 {
    round_to_hundredths(lbs * KG_PER_LB)
}

/// Kilograms to pounds, rounded to 2 decimals
pub fn lbs_from_kg(kg: f64) -> f64 {
    round_to_hundredths(kg / KG_PER_LB)
}

/// Feet and inches to whole centimeters
pub fn cm_from_feet_inches(feet: f64, inches: f64) -> i32 {
    round_half_up((feet * INCHES_PER_FOOT + inches) * CM_PER_INCH) as i32
}

/// Centimeters to meters
pub fn meters_from_cm(cm: f64) -> f64 {
    cm / 100.0
}

/// Feet and inches to meters, unrounded
pub fn meters_from_feet_inches(feet: f64, inches: f64) -> f64 {
    (feet * INCHES_PER_FOOT + inches) * METERS_PER_INCH
}

// ============================================================================
// Weight Units
// ============================================================================

/// Weight unit of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl WeightUnit {
    /// Convert from this unit to kilograms (exact, no rounding)
    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lbs => value * KG_PER_LB,
        }
    }

    /// Get the unit abbreviation
    pub fn abbreviation(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lb",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Lbs),
            _ => Err(format!("Unknown weight unit: {}", s)),
        }
    }
}

// ============================================================================
// Height Units
// ============================================================================

/// Height unit of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeightUnit {
    #[default]
    Cm,
    FeetInches, // entered as two fields, converted as total inches
}

impl HeightUnit {
    /// Get the unit abbreviation
    pub fn abbreviation(&self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::FeetInches => "ft/in",
        }
    }
}

impl fmt::Display for HeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for HeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" => Ok(HeightUnit::Cm),
            "ft" | "feet" | "ft/in" | "feet/inches" => Ok(HeightUnit::FeetInches),
            _ => Err(format!("Unknown height unit: {}", s)),
        }
    }
}

// ============================================================================
// Unit System (the form's metric/imperial toggle)
// ============================================================================

/// Unit system selected on a calculator form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn weight_unit(&self) -> WeightUnit {
        match self {
            UnitSystem::Metric => WeightUnit::Kg,
            UnitSystem::Imperial => WeightUnit::Lbs,
        }
    }

    pub fn height_unit(&self) -> HeightUnit {
        match self {
            UnitSystem::Metric => HeightUnit::Cm,
            UnitSystem::Imperial => HeightUnit::FeetInches,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(format!("Unknown unit system: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // =========================================================================
    // Rounding Tests
    // =========================================================================

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.4999), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(0.0), 0.0);
    }

    // =========================================================================
    // Weight Tests
    // =========================================================================

    #[test]
    fn test_known_weight_conversions() {
        // 176 lb = 79.832... kg
        assert_eq!(kg_from_lbs(176.0), 79.83);
        // 100 lb = 45.359237 kg
        assert_eq!(kg_from_lbs(100.0), 45.36);
        // 80 kg = 176.3698 lb
        assert_eq!(lbs_from_kg(80.0), 176.37);
    }

    #[test]
    fn test_weight_conversions_accept_degenerate_input() {
        assert_eq!(kg_from_lbs(0.0), 0.0);
        assert!(kg_from_lbs(-10.0) < 0.0);
        assert_eq!(lbs_from_kg(0.0), 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: rounded round-trip stays within 2-decimal tolerance
        #[test]
        fn prop_weight_roundtrip_kg(kg in 30.0f64..300.0) {
            let lbs = lbs_from_kg(kg);
            let back_to_kg = kg_from_lbs(lbs);
            prop_assert!((kg - back_to_kg).abs() <= 0.01,
                "Round-trip failed: {} -> {} -> {}", kg, lbs, back_to_kg);
        }

        #[test]
        fn prop_kg_identity(kg in 30.0f64..300.0) {
            prop_assert_eq!(WeightUnit::Kg.to_kg(kg), kg);
        }
    }

    // =========================================================================
    // Height Tests
    // =========================================================================

    #[test]
    fn test_cm_from_feet_inches() {
        // 5'11" = 71 in = 180.34 cm
        assert_eq!(cm_from_feet_inches(5.0, 11.0), 180);
        // 6'0" = 182.88 cm
        assert_eq!(cm_from_feet_inches(6.0, 0.0), 183);
        assert_eq!(cm_from_feet_inches(0.0, 0.0), 0);
    }

    #[test]
    fn test_meters_conversions() {
        assert!((meters_from_cm(180.0) - 1.8).abs() < 1e-12);
        assert!((meters_from_feet_inches(5.0, 11.0) - 1.8034).abs() < 1e-9);
        assert_eq!(meters_from_feet_inches(0.0, 0.0), 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: whole-cm conversion is within half a cm of the exact value
        #[test]
        fn prop_cm_from_feet_inches_close_to_exact(ft in 3u32..=8, inch in 0u32..12) {
            let exact = meters_from_feet_inches(ft as f64, inch as f64) * 100.0;
            let whole = cm_from_feet_inches(ft as f64, inch as f64) as f64;
            prop_assert!((exact - whole).abs() <= 0.5 + 1e-9);
        }
    }

    // =========================================================================
    // Unit System Tests
    // =========================================================================

    #[test]
    fn test_unit_system_units() {
        assert_eq!(UnitSystem::Metric.weight_unit(), WeightUnit::Kg);
        assert_eq!(UnitSystem::Metric.height_unit(), HeightUnit::Cm);
        assert_eq!(UnitSystem::Imperial.weight_unit(), WeightUnit::Lbs);
        assert_eq!(UnitSystem::Imperial.height_unit(), HeightUnit::FeetInches);
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("kg".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert_eq!("lbs".parse::<WeightUnit>().unwrap(), WeightUnit::Lbs);
        assert_eq!("pounds".parse::<WeightUnit>().unwrap(), WeightUnit::Lbs);
        assert!("stone".parse::<WeightUnit>().is_err());
        assert_eq!("ft".parse::<HeightUnit>().unwrap(), HeightUnit::FeetInches);
        // Display output parses back, which is how the form writes a unit
        assert_eq!(WeightUnit::Lbs.to_string().parse::<WeightUnit>(), Ok(WeightUnit::Lbs));
        assert_eq!(HeightUnit::FeetInches.to_string().parse::<HeightUnit>(), Ok(HeightUnit::FeetInches));
        assert_eq!("Imperial".parse::<UnitSystem>().unwrap(), UnitSystem::Imperial);
        assert!("nautical".parse::<UnitSystem>().is_err());
    }

    #[test]
    fn test_unit_system_serde() {
        let json = serde_json::to_string(&UnitSystem::Imperial).unwrap();
        assert_eq!(json, "\"imperial\"");
    }
}
