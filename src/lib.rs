//! # binshape: shape-driven binary decoding
//!
//! Materializes typed values out of a flat byte buffer according to a caller-declared
//! shape. The wire data carries no schema and no length prefixes: nested values are
//! decoded in sub-sessions that report how many bytes they consumed, so the fields that
//! follow them start at the right offset.
//!
//! ## Pieces
//!
//! - [`byte_order`]: fixed-width integers and floats from big/little-endian bytes
//! - [`cursor`]: the monotonic read position of a container
//! - [`container`]: keyed (key = byte offset), sequential and single-value containers
//! - [`decoder`]: sessions, options and the [`Decode`] trait
//! - [`ast`], [`parser`], [`materialize`]: a layout language and a decoder that
//!   builds [`Value`] trees from it
//!
//! ## Typed decoding
//!
//! ```
//! use binshape::{BinaryDecoder, Decode, DecodeError, Decoder, Endianness};
//!
//! struct Record { id: u8, label: String, scale: f64 }
//!
//! impl Decode for Record {
//!     fn decode(decoder: &mut Decoder<'_>) -> Result<Self, DecodeError> {
//!         let mut fields = decoder.sequential();
//!         Ok(Record {
//!             id: fields.decode()?,
//!             label: fields.decode_fixed_string(4)?,
//!             scale: fields.decode()?,
//!         })
//!     }
//! }
//!
//! let bytes = [0xf3, 0x24, 0x56, 0x56, 0x57, 0x40, 0x20, 0, 0, 0, 0, 0, 0];
//! let record: Record = BinaryDecoder::new()
//!     .with_endianness(Endianness::Big)
//!     .decode(&bytes)
//!     .unwrap();
//! assert_eq!(record.id, 243);
//! assert_eq!(record.label, "$VVW");
//! assert_eq!(record.scale, 8.0);
//! ```
//!
//! ## Layout language
//!
//! ```text
//! keyed Header {
//!   kind: u8 @0;
//!   name: cstring @1;
//!   scale: f64 @6;
//! }
//!
//! sequence Packet {
//!   id: u16;
//!   skip(2);
//!   header: Header(14);
//!   payload: [u8];
//! }
//! ```

pub mod ast;
pub mod byte_order;
pub mod container;
pub mod cursor;
pub mod decoder;
pub mod dump;
pub mod error;
pub mod key;
pub mod materialize;
pub mod parser;
pub mod value;

pub use ast::{LayoutFile, Schema};
pub use byte_order::{Endianness, Primitive};
pub use container::{KeyedContainer, SequentialContainer, SingleValueContainer};
pub use cursor::Cursor;
pub use decoder::{decode, BinaryDecoder, Decode, Decoder, DecoderOptions, UserInfo};
pub use error::{DecodeError, StringError};
pub use key::{Key, KeyPath};
pub use materialize::{decode_layout, decode_layout_with_extent};
pub use parser::parse;
pub use value::Value;
