//! Binding tag fuzz target: feed arbitrary strings to the tag parser.
//! The parser must not panic, and accepted tags must have a name and min <= max.
//! Build with: cargo fuzz run tag_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    if let Ok(desc) = ippcodec::parse_tag(s) {
        assert!(!desc.name.is_empty());
        assert!(desc.min <= desc.max);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run tag_fuzz");
}
