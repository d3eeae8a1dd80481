//! Fuzz target for scenario file parsing.
//!
//! Parsing, validation and setting construction must reject malformed
//! scenarios with an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use snc_config::{validate_scenario, ScenarioSpec};
use snc_core::topology::build_setting;

fuzz_target!(|data: &str| {
    let Ok(scenario) = ScenarioSpec::from_json_str(data) else {
        return;
    };
    if validate_scenario(&scenario).is_ok() {
        assert!(
            build_setting(&scenario).is_ok(),
            "validated scenario failed to build: {scenario:?}"
        );
    }
});
