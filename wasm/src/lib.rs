//! FitCalc WASM Module
//!
//! WebAssembly bindings the calculator pages call into. The page owns markup
//! and storage I/O; everything numeric happens here.

use fitcalc_shared::config::FormDefaults;
use fitcalc_shared::{
    format_thousands, BmiForm, CalcError, EnergyForm, EnergyResult, LastInputs, UnitSystem,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ============================================================================
// BMI Calculator
// ============================================================================

/// BMI page state: restored from the saved blob, updated per keystroke
#[wasm_bindgen]
pub struct BmiFormState {
    form: BmiForm,
    saved: LastInputs,
}

#[wasm_bindgen]
impl BmiFormState {
    /// Restore from the blob saved by a previous visit, if any
    #[wasm_bindgen(constructor)]
    pub fn new(saved: Option<String>, default_units: &str) -> BmiFormState {
        let saved = saved
            .as_deref()
            .map(LastInputs::from_blob)
            .unwrap_or_default();
        let default_units = default_units.parse().unwrap_or(UnitSystem::Metric);
        BmiFormState {
            form: BmiForm::from_last_inputs(&saved, default_units),
            saved,
        }
    }

    pub fn units(&self) -> String {
        self.form.units.to_string()
    }

    /// Switch unit system; unknown values are ignored
    pub fn set_units(&mut self, units: &str) {
        if let Ok(units) = units.parse::<UnitSystem>() {
            self.form.units = units;
        }
    }

    pub fn set_kg(&mut self, value: Option<f64>) {
        self.form.kg = value;
    }

    pub fn set_cm(&mut self, value: Option<f64>) {
        self.form.cm = value;
    }

    pub fn set_lbs(&mut self, value: Option<f64>) {
        self.form.lbs = value;
    }

    pub fn set_ft(&mut self, value: Option<f64>) {
        self.form.ft = value;
    }

    pub fn set_inch(&mut self, value: Option<f64>) {
        self.form.inch = value;
    }

    pub fn kg(&self) -> Option<f64> {
        self.form.kg
    }

    pub fn cm(&self) -> Option<f64> {
        self.form.cm
    }

    pub fn lbs(&self) -> Option<f64> {
        self.form.lbs
    }

    pub fn ft(&self) -> Option<f64> {
        self.form.ft
    }

    pub fn inch(&self) -> Option<f64> {
        self.form.inch
    }

    /// BMI value, `0` when the form is incomplete
    pub fn bmi(&self) -> f64 {
        fitcalc_shared::preview_bmi(&self.form).value
    }

    /// BMI to one decimal, `--` when the form is incomplete
    pub fn bmi_display(&self) -> String {
        fitcalc_shared::preview_bmi(&self.form).display_value()
    }

    /// Category label, empty when the form is incomplete
    pub fn category(&self) -> String {
        fitcalc_shared::preview_bmi(&self.form)
            .category_label()
            .to_string()
    }

    /// Blob for the page to persist; empty string if it could not be built
    ///
    /// Energy form fields from the restored blob are carried along.
    pub fn snapshot(&self) -> String {
        let mut record = self.saved.clone();
        self.form.write_to(&mut record);
        record.to_blob().unwrap_or_default()
    }
}

// ============================================================================
// Energy Calculator
// ============================================================================

#[derive(Debug, Serialize)]
struct EnergyView {
    #[serde(flatten)]
    result: EnergyResult,
    bmr_display: String,
    tdee_display: String,
    maintain_display: String,
    lose_display: String,
    gain_display: String,
    goal_calories_display: String,
}

impl From<EnergyResult> for EnergyView {
    fn from(result: EnergyResult) -> Self {
        Self {
            bmr_display: format_thousands(result.bmr),
            tdee_display: format_thousands(result.tdee),
            maintain_display: format_thousands(result.maintain),
            lose_display: format_thousands(result.lose),
            gain_display: format_thousands(result.gain),
            goal_calories_display: format_thousands(result.goal_calories),
            result,
        }
    }
}

#[derive(Debug, Serialize)]
struct EnergyResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<EnergyView>,
    errors: Vec<String>,
}

fn energy_response(form_json: &str) -> EnergyResponse {
    // unreadable form data is treated as an empty form and fails validation
    let form: EnergyForm = serde_json::from_str(form_json).unwrap_or_default();
    match fitcalc_shared::submit_energy(&form, &FormDefaults::default()) {
        Ok(result) => EnergyResponse {
            result: Some(result.into()),
            errors: Vec::new(),
        },
        Err(CalcError::Validation(errors)) => EnergyResponse {
            result: None,
            errors: errors.into_messages(),
        },
        Err(other) => EnergyResponse {
            result: None,
            errors: vec![other.to_string()],
        },
    }
}

/// Submit the energy form (JSON of raw field strings)
///
/// Returns JSON with either `result` or a non-empty `errors` list.
#[wasm_bindgen]
pub fn submit_energy(form_json: &str) -> String {
    serde_json::to_string(&energy_response(form_json))
        .unwrap_or_else(|_| r#"{"errors":["Result could not be encoded"]}"#.to_string())
}

/// Initial energy form JSON: pre-selected choices, then the saved blob's values
#[wasm_bindgen]
pub fn energy_form(saved: Option<String>) -> String {
    let mut form = EnergyForm::with_defaults(&FormDefaults::default());
    if let Some(saved) = saved.as_deref() {
        form.prefill(&LastInputs::from_blob(saved));
    }
    serde_json::to_string(&form).unwrap_or_default()
}

/// Blob for the page to persist after an energy submit
///
/// BMI form fields from `saved` are carried along. Returns `saved` unchanged
/// if the form JSON is unreadable.
#[wasm_bindgen]
pub fn energy_snapshot(form_json: &str, saved: Option<String>) -> String {
    let saved = saved.unwrap_or_default();
    let Ok(form) = serde_json::from_str::<EnergyForm>(form_json) else {
        return saved;
    };
    let mut record = LastInputs::from_blob(&saved);
    form.write_to(&mut record);
    record.to_blob().unwrap_or(saved)
}

/// Macro grams `[protein, fat, carbs]` for a calorie target and weight
#[wasm_bindgen]
pub fn allocate_macros(goal_calories: i32, weight_kg: f64) -> Vec<i32> {
    let split = fitcalc_shared::allocate_macros(goal_calories, weight_kg);
    vec![split.protein_g, split.fat_g, split.carbs_g]
}

// ============================================================================
// Unit Conversion
// ============================================================================

#[wasm_bindgen]
pub fn kg_from_lbs(lbs: f64) -> f64 {
    fitcalc_shared::kg_from_lbs(lbs)
}

#[wasm_bindgen]
pub fn lbs_from_kg(kg: f64) -> f64 {
    fitcalc_shared::lbs_from_kg(kg)
}

#[wasm_bindgen]
pub fn cm_from_feet_inches(feet: f64, inches: f64) -> i32 {
    fitcalc_shared::cm_from_feet_inches(feet, inches)
}
