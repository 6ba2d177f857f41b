//! Decoder fuzz target: compile arbitrary description text, and decode arbitrary
//! record text against the capture description.
//! Neither step may panic; both return Ok or a typed error.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
const PROTOCOL: &str = include_str!("../../data/protocol_conditional.xml");

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let _ = csvevent::compile_source(s);
    if let Ok(program) = csvevent::compile_source(PROTOCOL) {
        let _ = csvevent::decode_line(&program, s, &csvevent::Dialect::default());
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
