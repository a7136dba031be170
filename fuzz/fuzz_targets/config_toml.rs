#![no_main]

use libfuzzer_sys::fuzz_target;
use latconv::config::ConvergenceConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(config) = ConvergenceConfig::from_toml_str(input) {
            let _ = config.validate();
        }
    }
});
