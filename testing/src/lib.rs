//! # Todolists Testing
//!
//! Testing utilities for the todolists state layer.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - [`effects`]: running effects without a store
//! - [`assertions`]: effect assertions
//! - [`init_test_tracing`]: log output captured per test

use tracing_subscriber::EnvFilter;

pub mod effects;
pub mod reducer_test;

pub use effects::{execute, run_to_completion};
pub use reducer_test::{ReducerTest, assertions};

/// Install a tracing subscriber that writes through the test harness
///
/// Honors `RUST_LOG`, defaulting to `warn`. Safe to call from every test;
/// only the first call installs anything.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_test_tracing_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
        tracing::warn!("captured by the test writer");
    }
}
