//! Feed arbitrary text to the layout parser and resolver, then decode every resolved
//! layout from the input bytes themselves.
//! Build with: cargo fuzz run layout_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let source = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };
    let schema = match binshape::Schema::from_source(source) {
        Ok(s) => s,
        Err(_) => return,
    };
    let options = binshape::DecoderOptions::default();
    for layout in schema.layouts() {
        let _ = binshape::decode_layout(&schema, &layout.name, data, &options);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run layout_fuzz");
}
