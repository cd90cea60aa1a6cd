//! Calculator form flows
//!
//! Two entry points, both computed on demand with nothing cached internally:
//! - [`submit_energy`]: validate, normalize, then BMR/TDEE/targets and macros
//! - [`preview_bmi`]: the BMI page's live preview, recomputed on every keystroke
//!
//! [`Calculator`] binds both to the configured defaults and last-inputs cache.

use crate::cache::{KeyValueStore, LastInputs, LastInputsCache};
use crate::config::FormDefaults;
use crate::errors::CalcError;
use crate::health_metrics::{calculate_bmi_result, calculate_energy_result, BmiResult, EnergyResult};
use crate::units::{meters_from_cm, meters_from_feet_inches, HeightUnit, UnitSystem, WeightUnit};
use crate::validation::{validate_energy_form, EnergyForm, ProfileForm};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

// ============================================================================
// Energy Calculator
// ============================================================================

/// Validate the energy form and compute the full result
///
/// Empty selects take their value from `defaults`. Any violation withholds
/// the whole result; there is no partial output.
pub fn submit_energy(form: &EnergyForm, defaults: &FormDefaults) -> Result<EnergyResult, CalcError> {
    let (profile, activity, goal) = validate_energy_form(form, defaults).map_err(|errors| {
        debug!(violations = errors.len(), "Energy form rejected");
        CalcError::from(errors)
    })?;

    let result = calculate_energy_result(&profile, activity, goal);
    trace!(?profile, ?activity, ?goal, ?result, "Energy result computed");
    Ok(result)
}

/// A numeric field worth remembering; empty or unparseable is unset
fn saved_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl EnergyForm {
    /// A fresh form showing the pre-selected choices
    pub fn with_defaults(defaults: &FormDefaults) -> Self {
        Self {
            profile: ProfileForm {
                sex: defaults.sex.to_string(),
                weight_unit: defaults.unit_system.weight_unit().to_string(),
                height_unit: defaults.unit_system.height_unit().to_string(),
                ..Default::default()
            },
            activity: defaults.activity.as_str().to_string(),
            goal: defaults.goal.as_str().to_string(),
        }
    }

    /// Pre-fill profile fields from the last-inputs record
    ///
    /// Unit toggles saved by this form win over the BMI form's unit system.
    /// Fields the record lacks keep their current value.
    pub fn prefill(&mut self, saved: &LastInputs) {
        let fill = |slot: &mut String, value: Option<f64>| {
            if let Some(value) = value {
                *slot = value.to_string();
            }
        };

        let profile = &mut self.profile;
        if let Some(sex) = saved.sex {
            profile.sex = sex.to_string();
        }
        fill(&mut profile.age, saved.age);

        let weight_unit = saved
            .weight_unit
            .or(saved.units.map(|units| units.weight_unit()))
            .or_else(|| profile.weight_unit.parse().ok());
        if let Some(unit) = weight_unit {
            profile.weight_unit = unit.to_string();
            match unit {
                WeightUnit::Kg => fill(&mut profile.weight, saved.kg),
                WeightUnit::Lbs => fill(&mut profile.weight, saved.lbs),
            }
        }

        let height_unit = saved
            .height_unit
            .or(saved.units.map(|units| units.height_unit()))
            .or_else(|| profile.height_unit.parse().ok());
        if let Some(unit) = height_unit {
            profile.height_unit = unit.to_string();
            match unit {
                HeightUnit::Cm => fill(&mut profile.height_cm, saved.cm),
                HeightUnit::FeetInches => {
                    fill(&mut profile.height_ft, saved.ft);
                    fill(&mut profile.height_in, saved.inch);
                }
            }
        }
    }

    /// Record this form's values, leaving the BMI form's unit system alone
    ///
    /// Only the fields of the selected units are written; a toggle that does
    /// not parse writes nothing for its measurement.
    pub fn write_to(&self, record: &mut LastInputs) {
        let profile = &self.profile;
        record.sex = profile.sex.parse().ok();
        record.age = saved_number(&profile.age);

        record.weight_unit = profile.weight_unit.parse().ok();
        match record.weight_unit {
            Some(WeightUnit::Kg) => record.kg = saved_number(&profile.weight),
            Some(WeightUnit::Lbs) => record.lbs = saved_number(&profile.weight),
            None => {}
        }

        record.height_unit = profile.height_unit.parse().ok();
        match record.height_unit {
            Some(HeightUnit::Cm) => record.cm = saved_number(&profile.height_cm),
            Some(HeightUnit::FeetInches) => {
                record.ft = saved_number(&profile.height_ft);
                record.inch = saved_number(&profile.height_in);
            }
            None => {}
        }
    }

    /// Snapshot for an empty last-inputs record
    pub fn to_last_inputs(&self) -> LastInputs {
        let mut record = LastInputs::default();
        self.write_to(&mut record);
        record
    }
}

// ============================================================================
// BMI Calculator
// ============================================================================

/// BMI form state; `None` is an empty field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BmiForm {
    pub units: UnitSystem,
    pub kg: Option<f64>,
    pub cm: Option<f64>,
    pub lbs: Option<f64>,
    pub ft: Option<f64>,
    pub inch: Option<f64>,
}

impl BmiForm {
    /// Restore a form from the last-inputs record
    pub fn from_last_inputs(saved: &LastInputs, default_units: UnitSystem) -> Self {
        Self {
            units: saved.units.unwrap_or(default_units),
            kg: saved.kg,
            cm: saved.cm,
            lbs: saved.lbs,
            ft: saved.ft,
            inch: saved.inch,
        }
    }

    /// Record this form's fields; fields of both unit systems are kept
    pub fn write_to(&self, record: &mut LastInputs) {
        record.units = Some(self.units);
        record.kg = self.kg;
        record.cm = self.cm;
        record.lbs = self.lbs;
        record.ft = self.ft;
        record.inch = self.inch;
    }

    /// Snapshot for an empty last-inputs record
    pub fn to_last_inputs(&self) -> LastInputs {
        let mut record = LastInputs::default();
        self.write_to(&mut record);
        record
    }

    /// Weight in kg and height in meters, empty fields counting as zero
    pub fn normalized(&self) -> (f64, f64) {
        match self.units {
            UnitSystem::Metric => (
                self.kg.unwrap_or(0.0),
                self.cm.map(meters_from_cm).unwrap_or(0.0),
            ),
            UnitSystem::Imperial => (
                self.lbs.map(|lbs| WeightUnit::Lbs.to_kg(lbs)).unwrap_or(0.0),
                meters_from_feet_inches(self.ft.unwrap_or(0.0), self.inch.unwrap_or(0.0)),
            ),
        }
    }
}

/// Live BMI preview; incomplete input gives [`BmiResult::EMPTY`]
pub fn preview_bmi(form: &BmiForm) -> BmiResult {
    let (weight_kg, height_m) = form.normalized();
    calculate_bmi_result(weight_kg, height_m)
}

// ============================================================================
// Calculator
// ============================================================================

/// Both calculator forms over one set of defaults and one last-inputs cache
#[derive(Debug)]
pub struct Calculator<S> {
    defaults: FormDefaults,
    cache: LastInputsCache<S>,
}

impl<S: KeyValueStore> Calculator<S> {
    pub fn new(defaults: FormDefaults, cache: LastInputsCache<S>) -> Self {
        Self { defaults, cache }
    }

    pub fn defaults(&self) -> &FormDefaults {
        &self.defaults
    }

    pub fn cache(&self) -> &LastInputsCache<S> {
        &self.cache
    }

    /// Energy form as first shown: pre-selected choices, then saved values
    pub fn energy_form(&self) -> EnergyForm {
        let mut form = EnergyForm::with_defaults(&self.defaults);
        form.prefill(&self.cache.load());
        form
    }

    /// Save the form's inputs, then validate and compute
    ///
    /// Inputs are remembered even when they fail validation.
    pub fn submit_energy(&self, form: &EnergyForm) -> Result<EnergyResult, CalcError> {
        self.cache.update(|record| form.write_to(record));
        submit_energy(form, &self.defaults)
    }

    /// BMI form as first shown
    pub fn bmi_form(&self) -> BmiForm {
        BmiForm::from_last_inputs(&self.cache.load(), self.defaults.unit_system)
    }

    /// Save a changed BMI form and return its preview
    pub fn update_bmi(&self, form: &BmiForm) -> BmiResult {
        self.cache.update(|record| form.write_to(record));
        preview_bmi(form)
    }
}

// ============================================================================
// Output Formatting
// ============================================================================

/// Integer with comma thousands separators, e.g. `2,775`
pub fn format_thousands(value: i32) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::health_metrics::{ActivityLevel, BmiCategory, Sex};

    fn energy_form(sex: &str, age: &str, weight: &str, height: &str, activity: &str, goal: &str) -> EnergyForm {
        EnergyForm {
            profile: ProfileForm {
                sex: sex.to_string(),
                age: age.to_string(),
                weight_unit: "kg".to_string(),
                weight: weight.to_string(),
                height_unit: "cm".to_string(),
                height_cm: height.to_string(),
                ..Default::default()
            },
            activity: activity.to_string(),
            goal: goal.to_string(),
        }
    }

    #[test]
    fn test_submit_energy_male_moderate() {
        let form = energy_form("male", "28", "80", "180", "moderate", "maintain");
        let result = submit_energy(&form, &FormDefaults::default()).unwrap();
        assert_eq!(result.bmr, 1790);
        // 1790 * 1.55 = 2774.5
        assert_eq!(result.tdee, 2775);
        assert_eq!(result.goal_calories, 2775);
        assert_eq!(result.protein_g, 160);
        assert_eq!(result.fat_g, 64);
        // (2775 - 640 - 576) / 4 = 389.75
        assert_eq!(result.carbs_g, 390);
    }

    #[test]
    fn test_submit_energy_very_active() {
        let form = energy_form("male", "28", "80", "180", "very", "maintain");
        let result = submit_energy(&form, &FormDefaults::default()).unwrap();
        // 1790 * 1.725 = 3087.75
        assert_eq!(result.tdee, 3088);
    }

    #[test]
    fn test_submit_energy_empty_selects_use_preselected_values() {
        let form = energy_form("", "28", "80", "180", "", "");
        let result = submit_energy(&form, &FormDefaults::default()).unwrap();
        // male, moderate, maintain
        assert_eq!(result.bmr, 1790);
        assert_eq!(result.tdee, 2775);
        assert_eq!(result.goal_calories, 2775);
    }

    #[test]
    fn test_submit_energy_withholds_result_on_violation() {
        let form = energy_form("male", "12", "80", "180", "moderate", "maintain");
        match submit_energy(&form, &FormDefaults::default()) {
            Err(CalcError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.messages()[0].starts_with("Age:"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_energy_form_with_defaults() {
        let form = EnergyForm::with_defaults(&FormDefaults::default());
        assert_eq!(form.profile.sex, "male");
        assert_eq!(form.profile.weight_unit, "kg");
        assert_eq!(form.profile.height_unit, "cm");
        assert_eq!(form.activity, "moderately_active");
        assert_eq!(form.goal, "maintain");
        assert!(form.profile.age.is_empty());

        let imperial = EnergyForm::with_defaults(&FormDefaults {
            unit_system: UnitSystem::Imperial,
            ..Default::default()
        });
        assert_eq!(imperial.profile.weight_unit, "lb");
        assert_eq!(imperial.profile.height_unit, "ft/in");
    }

    #[test]
    fn test_prefill_energy_form() {
        let saved = LastInputs {
            units: Some(UnitSystem::Imperial),
            lbs: Some(176.0),
            ft: Some(5.0),
            inch: Some(11.0),
            sex: Some(Sex::Male),
            age: Some(28.0),
            kg: Some(99.0),
            ..Default::default()
        };
        let mut form = EnergyForm::default();
        form.prefill(&saved);

        assert_eq!(form.profile.weight_unit, "lb");
        assert_eq!(form.profile.height_unit, "ft/in");
        assert_eq!(form.profile.sex, "male");
        assert_eq!(form.profile.age, "28");
        assert_eq!(form.profile.weight, "176");
        assert_eq!(form.profile.height_ft, "5");
        assert_eq!(form.profile.height_in, "11");
    }

    #[test]
    fn test_energy_form_saves_and_prefills() {
        let form = EnergyForm {
            profile: ProfileForm {
                sex: "female".to_string(),
                age: "30".to_string(),
                weight_unit: "lb".to_string(),
                weight: "132".to_string(),
                height_unit: "cm".to_string(),
                height_cm: "165".to_string(),
                ..Default::default()
            },
            activity: "light".to_string(),
            goal: "lose".to_string(),
        };
        let record = form.to_last_inputs();
        assert_eq!(record.sex, Some(Sex::Female));
        assert_eq!(record.age, Some(30.0));
        assert_eq!(record.weight_unit, Some(WeightUnit::Lbs));
        assert_eq!(record.lbs, Some(132.0));
        assert_eq!(record.kg, None);
        assert_eq!(record.height_unit, Some(HeightUnit::Cm));
        assert_eq!(record.cm, Some(165.0));
        assert_eq!(record.units, None);

        let mut restored = EnergyForm::with_defaults(&FormDefaults::default());
        restored.prefill(&record);
        assert_eq!(restored.profile.sex, "female");
        assert_eq!(restored.profile.age, "30");
        assert_eq!(restored.profile.weight_unit, "lb");
        assert_eq!(restored.profile.weight, "132");
        assert_eq!(restored.profile.height_unit, "cm");
        assert_eq!(restored.profile.height_cm, "165");
        // choices are not remembered
        assert_eq!(restored.activity, "moderately_active");
    }

    #[test]
    fn test_saves_from_both_forms_keep_each_other() {
        let calculator = Calculator::new(FormDefaults::default(), LastInputsCache::new(MemoryStore::new()));

        let form = energy_form("female", "30", "60", "165", "sedentary", "lose");
        let result = calculator.submit_energy(&form).unwrap();
        assert_eq!(result.lose, 1084);

        let mut bmi = calculator.bmi_form();
        assert_eq!(bmi.kg, Some(60.0));
        assert_eq!(bmi.cm, Some(165.0));
        bmi.kg = Some(62.0);
        assert_eq!(calculator.update_bmi(&bmi).category, Some(BmiCategory::Normal));

        // the BMI save kept sex and age, and its weight carries over
        let energy = calculator.energy_form();
        assert_eq!(energy.profile.sex, "female");
        assert_eq!(energy.profile.age, "30");
        assert_eq!(energy.profile.weight, "62");
        assert_eq!(energy.profile.height_cm, "165");
    }

    #[test]
    fn test_rejected_submit_still_remembers_inputs() {
        let calculator = Calculator::new(FormDefaults::default(), LastInputsCache::new(MemoryStore::new()));
        let form = energy_form("male", "12", "80", "180", "extra", "gain");
        assert!(calculator.submit_energy(&form).is_err());

        let saved = calculator.cache().load();
        assert_eq!(saved.age, Some(12.0));
        assert_eq!(saved.kg, Some(80.0));
        assert_eq!(calculator.defaults().activity, ActivityLevel::ModeratelyActive);
    }

    #[test]
    fn test_preview_bmi_metric() {
        let form = BmiForm {
            kg: Some(80.0),
            cm: Some(179.0),
            ..Default::default()
        };
        let result = preview_bmi(&form);
        assert!((result.value - 24.97).abs() < 0.01);
        assert_eq!(result.category, Some(BmiCategory::Normal));
    }

    #[test]
    fn test_preview_bmi_imperial() {
        // 176 lb, 5'11": 79.83 kg / 1.8034 m^2
        let form = BmiForm {
            units: UnitSystem::Imperial,
            lbs: Some(176.0),
            ft: Some(5.0),
            inch: Some(11.0),
            ..Default::default()
        };
        let result = preview_bmi(&form);
        assert_eq!(result.display_value(), "24.5");
        assert_eq!(result.category_label(), "Normal");
    }

    #[test]
    fn test_preview_bmi_incomplete_input() {
        let form = BmiForm {
            kg: Some(80.0),
            ..Default::default()
        };
        assert_eq!(preview_bmi(&form), BmiResult::EMPTY);

        // inches alone still make a height
        let form = BmiForm {
            units: UnitSystem::Imperial,
            lbs: Some(150.0),
            inch: Some(60.0),
            ..Default::default()
        };
        assert!(!preview_bmi(&form).is_empty());
    }

    #[test]
    fn test_preview_ignores_other_unit_fields() {
        let form = BmiForm {
            units: UnitSystem::Metric,
            lbs: Some(176.0),
            ft: Some(5.0),
            inch: Some(11.0),
            ..Default::default()
        };
        assert!(preview_bmi(&form).is_empty());
    }

    #[test]
    fn test_bmi_form_last_inputs_roundtrip() {
        let form = BmiForm {
            units: UnitSystem::Imperial,
            kg: Some(80.0),
            lbs: Some(176.0),
            ..Default::default()
        };
        let restored = BmiForm::from_last_inputs(&form.to_last_inputs(), UnitSystem::Metric);
        assert_eq!(restored, form);

        let fresh = BmiForm::from_last_inputs(&LastInputs::default(), UnitSystem::Imperial);
        assert_eq!(fresh.units, UnitSystem::Imperial);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(2775), "2,775");
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_thousands(-1500), "-1,500");
    }
}
