//! Decoding sessions, decoder options and the [`Decode`] materializer contract.

use crate::byte_order::Endianness;
use crate::container::{Container, KeyedContainer, SequentialContainer, SingleValueContainer};
use crate::error::DecodeError;
use crate::key::{Key, KeyPath};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Opaque contextual values forwarded unchanged to every nested session.
pub type UserInfo = HashMap<String, Box<dyn Any + Send + Sync>>;

/// Options shared by a root session and all of its sub-sessions.
#[derive(Default)]
pub struct DecoderOptions {
    pub endianness: Endianness,
    pub user_info: UserInfo,
}

impl DecoderOptions {
    pub fn new(endianness: Endianness) -> Self {
        DecoderOptions { endianness, user_info: UserInfo::new() }
    }
}

impl fmt::Debug for DecoderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.user_info.keys().collect();
        keys.sort();
        f.debug_struct("DecoderOptions")
            .field("endianness", &self.endianness)
            .field("user_info", &keys)
            .finish()
    }
}

/// A type that can materialize itself from a decoding session.
///
/// Implementations pick the container matching their layout and pull fields from it:
///
/// ```
/// use binshape::{Decode, DecodeError, Decoder};
///
/// struct Sample { id: u8, name: String, scale: f64 }
///
/// impl Decode for Sample {
///     fn decode(decoder: &mut Decoder<'_>) -> Result<Self, DecodeError> {
///         let mut fields = decoder.keyed();
///         Ok(Sample {
///             id: fields.decode(("id", 0))?,
///             name: fields.decode_string(("name", 1))?,
///             scale: fields.decode(("scale", 6))?,
///         })
///     }
/// }
/// ```
pub trait Decode: Sized {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, DecodeError>;
}

/// One decoding session over a region of bytes.
///
/// A session hands out any of the three containers, each starting at offset 0. It
/// tracks the furthest offset they reach; a parent container reads that extent when
/// the nested decode returns and commits past it.
pub struct Decoder<'a> {
    data: &'a [u8],
    path: KeyPath,
    options: &'a DecoderOptions,
    consumed: usize,
}

impl<'a> Decoder<'a> {
    /// Root session over `data`.
    pub fn new(data: &'a [u8], options: &'a DecoderOptions) -> Self {
        Decoder { data, path: KeyPath::new(), options, consumed: 0 }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn options(&self) -> &'a DecoderOptions {
        self.options
    }

    pub fn endianness(&self) -> Endianness {
        self.options.endianness
    }

    /// Typed lookup into the user info map.
    pub fn user_info<T: Any>(&self, key: &str) -> Option<&'a T> {
        self.options.user_info.get(key).and_then(|v| (**v).downcast_ref::<T>())
    }

    /// Furthest offset any container of this session has reached.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Field-indexed container: keys are byte offsets.
    pub fn keyed(&mut self) -> KeyedContainer<'_, 'a> {
        Container::new(self)
    }

    /// Order-only container.
    pub fn sequential(&mut self) -> SequentialContainer<'_, 'a> {
        Container::new(self)
    }

    /// Container for exactly one logical value.
    pub fn single_value(&mut self) -> SingleValueContainer<'_, 'a> {
        Container::new(self)
    }

    /// Materializer-side error tagged with this session's path.
    pub fn corrupted(&self, message: impl Into<String>) -> DecodeError {
        DecodeError::DataCorrupted { path: self.path.clone(), message: message.into() }
    }

    pub(crate) fn report(&mut self, position: usize) {
        self.consumed = self.consumed.max(position);
    }

    pub(crate) fn child(&self, data: &'a [u8], key: Key) -> Decoder<'a> {
        Decoder {
            data,
            path: self.path.child(key),
            options: self.options,
            consumed: 0,
        }
    }
}

/// Entry point: wraps a byte buffer and produces a root value.
#[derive(Debug, Default)]
pub struct BinaryDecoder {
    options: DecoderOptions,
}

impl BinaryDecoder {
    /// Little-endian decoder with no user info.
    pub fn new() -> Self {
        BinaryDecoder::default()
    }

    pub fn with_options(options: DecoderOptions) -> Self {
        BinaryDecoder { options }
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.options.endianness = endianness;
        self
    }

    pub fn with_user_info<V: Any + Send + Sync>(mut self, key: impl Into<String>, value: V) -> Self {
        self.options.user_info.insert(key.into(), Box::new(value));
        self
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub fn decode<T: Decode>(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        let mut decoder = Decoder::new(bytes, &self.options);
        let value = T::decode(&mut decoder)?;
        log::debug!(
            "decoded {} ({} of {} bytes consumed)",
            std::any::type_name::<T>(),
            decoder.consumed(),
            bytes.len()
        );
        Ok(value)
    }
}

/// Decode a `T` from `bytes` with default options (little endian).
pub fn decode<T: Decode>(bytes: &[u8]) -> Result<T, DecodeError> {
    BinaryDecoder::new().decode(bytes)
}

macro_rules! primitive_decode {
    ($($t:ty),*) => {$(
        impl Decode for $t {
            fn decode(decoder: &mut Decoder<'_>) -> Result<Self, DecodeError> {
                decoder.single_value().decode()
            }
        }
    )*};
}

primitive_decode!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64, bool);

/// Null-terminated UTF-8.
impl Decode for String {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        decoder.single_value().decode_string()
    }
}

/// Elements decoded in order until the region is exhausted.
impl<T: Decode> Decode for Vec<T> {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let mut items = Vec::new();
        let mut elements = decoder.sequential();
        while !elements.is_at_end() {
            let before = elements.position();
            items.push(elements.decode_value::<T>()?);
            if elements.position() == before {
                return Err(DecodeError::DataCorrupted {
                    path: elements.path().child(Key::Index(before)),
                    message: "list element consumed no bytes".to_string(),
                });
            }
        }
        Ok(items)
    }
}
