//! FitCalc Shared Library
//!
//! The computation core behind the BMI, BMR/TDEE and macro split calculators:
//! unit conversion, the formulas, form validation, and the best-effort
//! last-inputs cache. Used directly by native hosts and through the WASM
//! bindings in the browser.

pub mod cache;
pub mod config;
pub mod errors;
pub mod forms;
pub mod health_metrics;
pub mod macros;
#[cfg(not(target_arch = "wasm32"))]
pub mod telemetry;
pub mod units;
pub mod validation;

// Re-export commonly used items
pub use cache::{FileStore, KeyValueStore, LastInputs, LastInputsCache, MemoryStore};
pub use errors::*;
pub use forms::*;
pub use health_metrics::*;
pub use macros::*;
pub use units::*;
pub use validation::{EnergyForm, ProfileForm, ProfileValidation};
