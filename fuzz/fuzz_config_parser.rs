//! Fuzz target for the TOML configuration parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser
//!
//! Feeds arbitrary text through `AppConfig::parse()`, which also runs
//! validation, and checks the derived durations of anything accepted.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = smdash_config::AppConfig::parse(s) {
            assert!(config.request_timeout() < config.poll_interval());
            let _ = config.flash_duration();
        }
    }
});
