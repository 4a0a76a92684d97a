//! Decoding containers: bounded views over a session's region that consume bytes and
//! advance a [`Cursor`].
//!
//! All three variants share one decode routine; they differ only in the [`Addressing`]
//! policy that computes where the next value starts and how the cursor moves past it:
//!
//! | Container | Offset of next value | Cursor after a value at `i` of length `L` |
//! |-----------|----------------------|-------------------------------------------|
//! | [`KeyedContainer`] | integer value of the key | `max(cursor, i + L)` |
//! | [`SequentialContainer`] | cursor | `cursor + L` |
//! | [`SingleValueContainer`] | cursor | `cursor + L` |
//!
//! A nested value commits like any other decode, with `L` being the number of bytes its
//! sub-session consumed.

use crate::byte_order::Primitive;
use crate::cursor::Cursor;
use crate::decoder::{Decode, Decoder};
use crate::error::{DecodeError, StringError};
use crate::key::{Key, KeyPath};
use std::marker::PhantomData;

/// How a container locates values and moves its cursor.
pub trait Addressing {
    /// What a caller passes to address one value.
    type Key;

    /// Offset within the region where the value addressed by `key` begins.
    fn offset(key: &Self::Key, cursor: &Cursor, path: &KeyPath) -> Result<usize, DecodeError>;

    /// Move the cursor past `len` bytes decoded at `offset`.
    fn commit(cursor: &mut Cursor, offset: usize, len: usize);

    /// Key recorded in diagnostics and child key paths for a value at `offset`.
    fn path_entry(key: &Self::Key, offset: usize) -> Key;
}

/// Field-indexed addressing: the key is the byte offset.
#[derive(Debug)]
pub enum Indexed {}

/// Arrival-order addressing.
#[derive(Debug)]
pub enum Sequential {}

/// Arrival-order addressing for a single logical value.
#[derive(Debug)]
pub enum Single {}

impl Addressing for Indexed {
    type Key = Key;

    fn offset(key: &Key, _: &Cursor, path: &KeyPath) -> Result<usize, DecodeError> {
        key.int_value().ok_or_else(|| DecodeError::KeyNotFound {
            key: key.clone(),
            path: path.clone(),
        })
    }

    fn commit(cursor: &mut Cursor, offset: usize, len: usize) {
        cursor.advance_to(offset + len);
    }

    fn path_entry(key: &Key, _: usize) -> Key {
        key.clone()
    }
}

impl Addressing for Sequential {
    type Key = ();

    fn offset(_: &(), cursor: &Cursor, _: &KeyPath) -> Result<usize, DecodeError> {
        Ok(cursor.position())
    }

    fn commit(cursor: &mut Cursor, _: usize, len: usize) {
        cursor.advance(len);
    }

    fn path_entry(_: &(), offset: usize) -> Key {
        Key::Index(offset)
    }
}

impl Addressing for Single {
    type Key = ();

    fn offset(key: &(), cursor: &Cursor, path: &KeyPath) -> Result<usize, DecodeError> {
        Sequential::offset(key, cursor, path)
    }

    fn commit(cursor: &mut Cursor, offset: usize, len: usize) {
        Sequential::commit(cursor, offset, len);
    }

    fn path_entry(key: &(), offset: usize) -> Key {
        Sequential::path_entry(key, offset)
    }
}

/// A container over the region of one [`Decoder`] session.
///
/// The container owns its cursor; after every move the new position is reported to the
/// session, which keeps the furthest one as the number of bytes it consumed.
pub struct Container<'d, 'a, A: Addressing> {
    decoder: &'d mut Decoder<'a>,
    cursor: Cursor,
    _addressing: PhantomData<A>,
}

pub type KeyedContainer<'d, 'a> = Container<'d, 'a, Indexed>;
pub type SequentialContainer<'d, 'a> = Container<'d, 'a, Sequential>;
pub type SingleValueContainer<'d, 'a> = Container<'d, 'a, Single>;

impl<'d, 'a, A: Addressing> Container<'d, 'a, A> {
    pub(crate) fn new(decoder: &'d mut Decoder<'a>) -> Self {
        Container {
            decoder,
            cursor: Cursor::new(),
            _addressing: PhantomData,
        }
    }

    /// Key path of the session this container reads from.
    pub fn path(&self) -> &KeyPath {
        self.decoder.path()
    }

    /// Index of the next byte to be decoded.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Length of the region in bytes.
    pub fn count(&self) -> usize {
        self.decoder.data().len()
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor.position() >= self.count()
    }

    /// Bytes between the cursor and the end of the region.
    pub fn remaining(&self) -> usize {
        self.count().saturating_sub(self.cursor.position())
    }

    /// Advance the cursor by `length` bytes without decoding them.
    pub fn skip(&mut self, length: usize) -> Result<(), DecodeError> {
        let position = self.cursor.position();
        if length > 0 {
            self.window(position, length, Key::Index(position))?;
        }
        self.cursor.advance(length);
        self.decoder.report(self.cursor.position());
        Ok(())
    }

    fn window(&self, offset: usize, length: usize, entry: Key) -> Result<&'a [u8], DecodeError> {
        let data = self.decoder.data();
        match offset.checked_add(length) {
            Some(end) if end <= data.len() => Ok(&data[offset..end]),
            _ => Err(DecodeError::OutOfBounds {
                path: self.decoder.path().child(entry),
                offset,
                needed: length,
                available: data.len(),
            }),
        }
    }

    fn commit(&mut self, offset: usize, length: usize) {
        A::commit(&mut self.cursor, offset, length);
        self.decoder.report(self.cursor.position());
    }

    fn locate(&self, key: &A::Key) -> Result<usize, DecodeError> {
        A::offset(key, &self.cursor, self.decoder.path())
    }

    fn read<T: Primitive>(&mut self, key: &A::Key) -> Result<T, DecodeError> {
        let offset = self.locate(key)?;
        let bytes = self.window(offset, T::WIDTH, A::path_entry(key, offset))?;
        let value = T::from_bytes(bytes, self.decoder.endianness());
        self.commit(offset, T::WIDTH);
        Ok(value)
    }

    fn read_nil(&mut self, key: &A::Key) -> Result<bool, DecodeError> {
        let offset = self.locate(key)?;
        let bytes = self.window(offset, 1, A::path_entry(key, offset))?;
        let is_nil = bytes[0] == 0;
        self.commit(offset, 1);
        Ok(is_nil)
    }

    fn read_string(&mut self, key: &A::Key) -> Result<String, DecodeError> {
        let offset = self.locate(key)?;
        let entry = A::path_entry(key, offset);
        let rest = self.window(offset, self.count().saturating_sub(offset), entry.clone())?;
        match null_terminated(rest) {
            Ok((string, used)) => {
                self.commit(offset, used);
                Ok(string)
            }
            Err(reason) => Err(DecodeError::MalformedString {
                path: self.decoder.path().child(entry),
                reason,
            }),
        }
    }

    fn read_fixed_string(&mut self, key: &A::Key, length: usize) -> Result<String, DecodeError> {
        let offset = self.locate(key)?;
        let entry = A::path_entry(key, offset);
        let bytes = self.window(offset, length, entry.clone())?;
        let string = std::str::from_utf8(bytes)
            .map_err(|e| DecodeError::MalformedString {
                path: self.decoder.path().child(entry),
                reason: StringError::InvalidUtf8 { valid_up_to: e.valid_up_to() },
            })?
            .to_string();
        self.commit(offset, length);
        Ok(string)
    }

    fn read_nested<T, F>(&mut self, key: &A::Key, length: Option<usize>, f: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&mut Decoder<'a>) -> Result<T, DecodeError>,
    {
        let offset = self.locate(key)?;
        let entry = A::path_entry(key, offset);
        let length = length.unwrap_or_else(|| self.count().saturating_sub(offset));
        let data = self.window(offset, length, entry.clone())?;
        let mut child = self.decoder.child(data, entry);
        let value = f(&mut child)?;
        let consumed = child.consumed();
        log::trace!("nested decode at {}: consumed {} of {} bytes", child.path(), consumed, length);
        self.commit(offset, consumed);
        Ok(value)
    }
}

impl<'d, 'a> Container<'d, 'a, Indexed> {
    /// Every key this container can address: one per byte of the region.
    pub fn all_keys(&self) -> impl Iterator<Item = Key> {
        (0..self.count()).map(Key::Int)
    }

    pub fn contains(&self, key: &Key) -> bool {
        key.int_value().is_some_and(|i| i < self.count())
    }

    pub fn decode<T: Primitive>(&mut self, key: impl Into<Key>) -> Result<T, DecodeError> {
        self.read(&key.into())
    }

    /// Consume one byte at `key`; true when it is zero.
    pub fn decode_nil(&mut self, key: impl Into<Key>) -> Result<bool, DecodeError> {
        self.read_nil(&key.into())
    }

    /// Null-terminated UTF-8 string starting at `key`.
    pub fn decode_string(&mut self, key: impl Into<Key>) -> Result<String, DecodeError> {
        self.read_string(&key.into())
    }

    /// Exactly `length` bytes of UTF-8 starting at `key`.
    pub fn decode_fixed_string(&mut self, key: impl Into<Key>, length: usize) -> Result<String, DecodeError> {
        self.read_fixed_string(&key.into(), length)
    }

    /// Decode a nested value from the rest of the region starting at `key`.
    pub fn decode_value<T: Decode>(&mut self, key: impl Into<Key>) -> Result<T, DecodeError> {
        self.read_nested(&key.into(), None, |d| T::decode(d))
    }

    /// Decode a nested value confined to `length` bytes starting at `key`.
    pub fn decode_value_with_length<T: Decode>(&mut self, key: impl Into<Key>, length: usize) -> Result<T, DecodeError> {
        self.read_nested(&key.into(), Some(length), |d| T::decode(d))
    }

    /// Run `f` on a sub-session starting at `key`, confined to `length` bytes when given
    /// and to the rest of the region otherwise.
    pub fn decode_nested<T, F>(&mut self, key: impl Into<Key>, length: Option<usize>, f: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&mut Decoder<'a>) -> Result<T, DecodeError>,
    {
        self.read_nested(&key.into(), length, f)
    }
}

macro_rules! ordered_container {
    ($($addressing:ty),*) => {$(
        impl<'d, 'a> Container<'d, 'a, $addressing> {
            pub fn decode<T: Primitive>(&mut self) -> Result<T, DecodeError> {
                self.read(&())
            }

            /// Consume one byte; true when it is zero.
            pub fn decode_nil(&mut self) -> Result<bool, DecodeError> {
                self.read_nil(&())
            }

            /// Null-terminated UTF-8 string at the cursor.
            pub fn decode_string(&mut self) -> Result<String, DecodeError> {
                self.read_string(&())
            }

            /// Exactly `length` bytes of UTF-8 at the cursor.
            pub fn decode_fixed_string(&mut self, length: usize) -> Result<String, DecodeError> {
                self.read_fixed_string(&(), length)
            }

            /// Decode a nested value from the rest of the region.
            pub fn decode_value<T: Decode>(&mut self) -> Result<T, DecodeError> {
                self.read_nested(&(), None, |d| T::decode(d))
            }

            /// Decode a nested value confined to the next `length` bytes.
            pub fn decode_value_with_length<T: Decode>(&mut self, length: usize) -> Result<T, DecodeError> {
                self.read_nested(&(), Some(length), |d| T::decode(d))
            }

            /// Run `f` on a sub-session at the cursor, confined to `length` bytes when
            /// given and to the rest of the region otherwise.
            pub fn decode_nested<T, F>(&mut self, length: Option<usize>, f: F) -> Result<T, DecodeError>
            where
                F: FnOnce(&mut Decoder<'a>) -> Result<T, DecodeError>,
            {
                self.read_nested(&(), length, f)
            }
        }
    )*};
}

ordered_container!(Sequential, Single);

/// Decode UTF-8 up to the first NUL. Returns the string and the bytes used including
/// the terminator.
fn null_terminated(bytes: &[u8]) -> Result<(String, usize), StringError> {
    let end = bytes.iter().position(|&b| b == 0);
    let text = &bytes[..end.unwrap_or(bytes.len())];
    let string = std::str::from_utf8(text).map_err(|e| StringError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    match end {
        Some(n) => Ok((string.to_string(), n + 1)),
        None => Err(StringError::Unterminated),
    }
}
