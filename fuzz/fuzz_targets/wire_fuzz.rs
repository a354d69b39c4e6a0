//! Wire fuzz target: decode arbitrary bytes as an attribute list.
//! Decoding must not panic; whatever decodes must encode again and decode
//! to the same attributes.
//! Build with: cargo fuzz run wire_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let attrs = match ippcodec::decode_attributes(data) {
        Ok(a) => a,
        Err(_) => return,
    };
    if let Ok(bytes) = ippcodec::encode_attributes(&attrs) {
        let again = ippcodec::decode_attributes(&bytes).expect("re-decode");
        assert_eq!(again, attrs);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run wire_fuzz");
}
