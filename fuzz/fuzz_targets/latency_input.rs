#![no_main]

use libfuzzer_sys::fuzz_target;
use latconv::input::parse_latencies;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes, including invalid UTF-8, must produce Ok or Err, never a panic
    let _ = parse_latencies(data);
});
