//! Common test utilities for integration tests

use fitcalc_shared::telemetry;
use fitcalc_shared::{EnergyForm, ProfileForm};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-captured subscriber once per test binary
pub fn init() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| telemetry::default_filter().into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Metric energy form from field values as a user would type them
pub fn metric_energy_form(
    sex: &str,
    age: &str,
    weight_kg: &str,
    height_cm: &str,
    activity: &str,
    goal: &str,
) -> EnergyForm {
    EnergyForm {
        profile: ProfileForm {
            sex: sex.to_string(),
            age: age.to_string(),
            weight_unit: "kg".to_string(),
            weight: weight_kg.to_string(),
            height_unit: "cm".to_string(),
            height_cm: height_cm.to_string(),
            ..Default::default()
        },
        activity: activity.to_string(),
        goal: goal.to_string(),
    }
}
