#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let src = String::from_utf8_lossy(data);
    let (file, diags) = tempo::parse_source(Path::new("fuzz.tempo"), &src);
    if !diags.is_empty() {
        return;
    }
    // Accepted inputs must reach a print fixpoint after one cycle.
    let printed = tempo::print_source(&file);
    let (reparsed, diags) = tempo::parse_source(Path::new("fuzz.tempo"), &printed);
    if diags.is_empty() {
        assert_eq!(printed, tempo::print_source(&reparsed));
    }
});
