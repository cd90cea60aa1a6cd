//! Tracing setup for native hosts

use crate::config::CalculatorConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub fn default_filter() -> &'static str {
    if CalculatorConfig::is_production() {
        "fitcalc_shared=info"
    } else {
        "fitcalc_shared=debug"
    }
}

/// Install the global subscriber: JSON in production, pretty otherwise
///
/// Returns `false` if a global subscriber was already set.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter().into());
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if CalculatorConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .is_ok()
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()
            .is_ok()
    }
}
