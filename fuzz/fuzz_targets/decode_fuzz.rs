//! Decode arbitrary bytes against a fixed layout schema in both byte orders.
//! Every decode must return Ok or a DecodeError; none may panic.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use binshape::{decode_layout, DecoderOptions, Endianness, Schema};
#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
const LAYOUTS: &str = r#"
keyed Header { kind: u8 @0; name: cstring @1; scale: f64 @6; }
single Tag { skip(1); value: u16; }
sequence Item { id: u16; label: string(3); tag: Tag(3); flags: [bool; 2]; }
sequence Frame { header: Header(14); items: [Item]; }
sequence Nested { inner: Nested; }
"#;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let schema = match Schema::from_source(LAYOUTS) {
        Ok(s) => s,
        Err(_) => return,
    };
    for endianness in [Endianness::Big, Endianness::Little] {
        let options = DecoderOptions::new(endianness);
        for layout in ["Header", "Frame", "Nested"] {
            let _ = decode_layout(&schema, layout, data, &options);
        }
    }
    let _ = binshape::decode::<Vec<String>>(data);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
