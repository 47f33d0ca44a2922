//! Fuzz target: `SystemConfig::from_json`
//!
//! Arbitrary bytes must never panic the parser, and anything it accepts
//! must pass validation and yield a SysTick reload.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use maquina::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = SystemConfig::from_json(text) {
        assert!(config.validate().is_ok());
        assert!(config.systick_reload().is_ok());
    }
});
