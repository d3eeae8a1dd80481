//! Fuzz target for analysis configuration parsing.
//!
//! Tests that JSON and TOML analysis configurations parse and validate
//! without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use snc_config::{validate_analysis, AnalysisConfig};

fuzz_target!(|data: &str| {
    if let Ok(config) = serde_json::from_str::<AnalysisConfig>(data) {
        let _ = validate_analysis(&config);
    }
    if let Ok(config) = toml::from_str::<AnalysisConfig>(data) {
        let _ = validate_analysis(&config);
    }
});
