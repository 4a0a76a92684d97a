//! Decode [`Value`] trees from layouts.
//!
//! The layout schema plays the part of a hand-written [`Decode`](crate::Decode)
//! implementation: a keyed layout reads its fields through a keyed container, a sequence
//! layout through a sequential one, a single layout through a single-value container.
//! Nested layouts and lists run in their own sub-sessions, so siblings that follow them
//! start exactly where the nested value stopped.

use crate::ast::*;
use crate::byte_order::Primitive;
use crate::container::{Container, KeyedContainer, SequentialContainer, SingleValueContainer};
use crate::decoder::{Decoder, DecoderOptions};
use crate::error::DecodeError;
use crate::key::Key;
use crate::value::Value;

/// Deepest key path a layout decode may reach.
pub const MAX_NESTING: usize = 128;

/// Decode the layout `name` from `bytes`.
pub fn decode_layout(
    schema: &Schema,
    name: &str,
    bytes: &[u8],
    options: &DecoderOptions,
) -> Result<Value, DecodeError> {
    decode_layout_with_extent(schema, name, bytes, options).map(|(v, _)| v)
}

/// Decode the layout `name` from `bytes`; also returns the number of bytes consumed.
pub fn decode_layout_with_extent(
    schema: &Schema,
    name: &str,
    bytes: &[u8],
    options: &DecoderOptions,
) -> Result<(Value, usize), DecodeError> {
    let layout = schema
        .get(name)
        .ok_or_else(|| DecodeError::UnknownLayout(name.to_string()))?;
    let mut decoder = Decoder::new(bytes, options);
    let value = decode_in(schema, layout, &mut decoder)?;
    let consumed = decoder.consumed();
    log::debug!("decoded layout {} ({} of {} bytes consumed)", name, consumed, bytes.len());
    Ok((value, consumed))
}

/// The container operations a layout field needs. Sequential containers ignore the key.
trait FieldSource<'a> {
    fn primitive<T: Primitive>(&mut self, key: &Key) -> Result<T, DecodeError>;
    fn cstring(&mut self, key: &Key) -> Result<String, DecodeError>;
    fn fixed_string(&mut self, key: &Key, length: usize) -> Result<String, DecodeError>;
    fn nested<T, F>(&mut self, key: &Key, length: Option<usize>, f: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&mut Decoder<'a>) -> Result<T, DecodeError>;
    fn skip(&mut self, length: usize) -> Result<(), DecodeError>;
}

impl<'d, 'a> FieldSource<'a> for KeyedContainer<'d, 'a> {
    fn primitive<T: Primitive>(&mut self, key: &Key) -> Result<T, DecodeError> {
        self.decode(key.clone())
    }
    fn cstring(&mut self, key: &Key) -> Result<String, DecodeError> {
        self.decode_string(key.clone())
    }
    fn fixed_string(&mut self, key: &Key, length: usize) -> Result<String, DecodeError> {
        self.decode_fixed_string(key.clone(), length)
    }
    fn nested<T, F>(&mut self, key: &Key, length: Option<usize>, f: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&mut Decoder<'a>) -> Result<T, DecodeError>,
    {
        self.decode_nested(key.clone(), length, f)
    }
    fn skip(&mut self, length: usize) -> Result<(), DecodeError> {
        Container::skip(self, length)
    }
}

macro_rules! ordered_source {
    ($($container:ident),*) => {$(
        impl<'d, 'a> FieldSource<'a> for $container<'d, 'a> {
            fn primitive<T: Primitive>(&mut self, _: &Key) -> Result<T, DecodeError> {
                self.decode()
            }
            fn cstring(&mut self, _: &Key) -> Result<String, DecodeError> {
                self.decode_string()
            }
            fn fixed_string(&mut self, _: &Key, length: usize) -> Result<String, DecodeError> {
                self.decode_fixed_string(length)
            }
            fn nested<T, F>(&mut self, _: &Key, length: Option<usize>, f: F) -> Result<T, DecodeError>
            where
                F: FnOnce(&mut Decoder<'a>) -> Result<T, DecodeError>,
            {
                self.decode_nested(length, f)
            }
            fn skip(&mut self, length: usize) -> Result<(), DecodeError> {
                Container::skip(self, length)
            }
        }
    )*};
}

ordered_source!(SequentialContainer, SingleValueContainer);

fn decode_in(schema: &Schema, layout: &Layout, decoder: &mut Decoder<'_>) -> Result<Value, DecodeError> {
    if decoder.path().len() > MAX_NESTING {
        return Err(decoder.corrupted(format!(
            "layout {} nested deeper than {} levels",
            layout.name, MAX_NESTING
        )));
    }
    match layout.kind {
        LayoutKind::Keyed => decode_record(schema, layout, &mut decoder.keyed()),
        LayoutKind::Sequence => decode_record(schema, layout, &mut decoder.sequential()),
        LayoutKind::Single => {
            let mut container = decoder.single_value();
            let mut value = None;
            for member in &layout.members {
                match member {
                    Member::Skip(n) => container.skip(*n)?,
                    Member::Field(f) => {
                        value = Some(decode_shape(schema, &mut container, &field_key(f), &f.shape)?);
                    }
                }
            }
            value.ok_or_else(|| DecodeError::DataCorrupted {
                path: container.path().clone(),
                message: format!("single layout {} has no field", layout.name),
            })
        }
    }
}

fn decode_record<'a, S: FieldSource<'a>>(
    schema: &Schema,
    layout: &Layout,
    source: &mut S,
) -> Result<Value, DecodeError> {
    let mut fields = Vec::new();
    for member in &layout.members {
        match member {
            Member::Skip(n) => source.skip(*n)?,
            Member::Field(f) => {
                let v = decode_shape(schema, source, &field_key(f), &f.shape)?;
                fields.push((f.name.clone(), v));
            }
        }
    }
    Ok(Value::Record(fields))
}

fn field_key(f: &FieldDef) -> Key {
    match f.offset {
        Some(offset) => Key::Field(f.name.clone(), offset),
        None => Key::Name(f.name.clone()),
    }
}

fn decode_shape<'a, S: FieldSource<'a>>(
    schema: &Schema,
    source: &mut S,
    key: &Key,
    shape: &Shape,
) -> Result<Value, DecodeError> {
    Ok(match shape {
        Shape::Primitive(p) => decode_primitive(source, key, *p)?,
        Shape::CString => Value::String(source.cstring(key)?),
        Shape::FixedString(n) => Value::String(source.fixed_string(key, *n)?),
        Shape::Layout { name, length } => {
            let layout = schema
                .get(name)
                .ok_or_else(|| DecodeError::UnknownLayout(name.clone()))?;
            source.nested(key, *length, |d| decode_in(schema, layout, d))?
        }
        Shape::List { element, count } => {
            source.nested(key, None, |d| decode_list(schema, element, *count, d))?
        }
    })
}

fn decode_list(
    schema: &Schema,
    element: &Shape,
    count: Option<usize>,
    decoder: &mut Decoder<'_>,
) -> Result<Value, DecodeError> {
    let mut items = Vec::new();
    let mut elements = decoder.sequential();
    loop {
        match count {
            Some(n) if items.len() >= n => break,
            None if elements.is_at_end() => break,
            _ => {}
        }
        let before = elements.position();
        let key = Key::Index(items.len());
        items.push(decode_shape(schema, &mut elements, &key, element)?);
        if elements.position() == before {
            return Err(DecodeError::DataCorrupted {
                path: elements.path().child(Key::Index(before)),
                message: "list element consumed no bytes".to_string(),
            });
        }
    }
    Ok(Value::List(items))
}

fn decode_primitive<'a, S: FieldSource<'a>>(
    source: &mut S,
    key: &Key,
    primitive: PrimitiveType,
) -> Result<Value, DecodeError> {
    Ok(match primitive {
        PrimitiveType::U8 => Value::U8(source.primitive(key)?),
        PrimitiveType::U16 => Value::U16(source.primitive(key)?),
        PrimitiveType::U32 => Value::U32(source.primitive(key)?),
        PrimitiveType::U64 => Value::U64(source.primitive(key)?),
        PrimitiveType::I8 => Value::I8(source.primitive(key)?),
        PrimitiveType::I16 => Value::I16(source.primitive(key)?),
        PrimitiveType::I32 => Value::I32(source.primitive(key)?),
        PrimitiveType::I64 => Value::I64(source.primitive(key)?),
        PrimitiveType::Bool => Value::Bool(source.primitive(key)?),
        PrimitiveType::F32 => Value::Float(source.primitive(key)?),
        PrimitiveType::F64 => Value::Double(source.primitive(key)?),
    })
}
