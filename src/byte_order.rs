//! Byte-order integer codec.
//!
//! Converts fixed-size runs of bytes into integers of width 1, 2, 4 or 8, honouring
//! big- or little-endian layout. Signed integers reuse the unsigned path and reinterpret
//! the bit pattern; floats reinterpret the bits of the unsigned integer of matching width.
//! `usize` and `isize` use the target's pointer width. Callers must hand in exactly
//! [`Primitive::WIDTH`] bytes.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order for multi-byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    #[default]
    Little,
}

impl Endianness {
    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Endianness::Big => BigEndian::read_u16(buf),
            Endianness::Little => LittleEndian::read_u16(buf),
        }
    }

    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Endianness::Big => BigEndian::read_u32(buf),
            Endianness::Little => LittleEndian::read_u32(buf),
        }
    }

    pub fn read_u64(self, buf: &[u8]) -> u64 {
        match self {
            Endianness::Big => BigEndian::read_u64(buf),
            Endianness::Little => LittleEndian::read_u64(buf),
        }
    }
}

/// A fixed-width scalar read straight out of the buffer.
pub trait Primitive: Sized + Copy {
    /// Encoded size in bytes.
    const WIDTH: usize;

    /// Build the value from exactly `WIDTH` bytes.
    fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self;
}

impl Primitive for u8 {
    const WIDTH: usize = 1;
    fn from_bytes(bytes: &[u8], _: Endianness) -> Self {
        bytes[0]
    }
}

impl Primitive for i8 {
    const WIDTH: usize = 1;
    fn from_bytes(bytes: &[u8], _: Endianness) -> Self {
        bytes[0] as i8
    }
}

/// `0x01` is true; `0x00` and every other byte are false.
impl Primitive for bool {
    const WIDTH: usize = 1;
    fn from_bytes(bytes: &[u8], _: Endianness) -> Self {
        bytes[0] == 0x01
    }
}

macro_rules! unsigned_primitive {
    ($($t:ty => $width:literal, $read:ident;)*) => {$(
        impl Primitive for $t {
            const WIDTH: usize = $width;
            fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self {
                endianness.$read(bytes)
            }
        }
    )*};
}

unsigned_primitive! {
    u16 => 2, read_u16;
    u32 => 4, read_u32;
    u64 => 8, read_u64;
}

macro_rules! signed_primitive {
    ($($t:ty => $unsigned:ty;)*) => {$(
        impl Primitive for $t {
            const WIDTH: usize = <$unsigned as Primitive>::WIDTH;
            fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self {
                <$unsigned>::from_bytes(bytes, endianness) as $t
            }
        }
    )*};
}

signed_primitive! {
    i16 => u16;
    i32 => u32;
    i64 => u64;
}

/// Platform width: 4 bytes on 32-bit targets, 8 on 64-bit.
impl Primitive for usize {
    const WIDTH: usize = std::mem::size_of::<usize>();
    fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self {
        match Self::WIDTH {
            8 => endianness.read_u64(bytes) as usize,
            _ => endianness.read_u32(bytes) as usize,
        }
    }
}

impl Primitive for isize {
    const WIDTH: usize = <usize as Primitive>::WIDTH;
    fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self {
        usize::from_bytes(bytes, endianness) as isize
    }
}

impl Primitive for f32 {
    const WIDTH: usize = 4;
    fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self {
        f32::from_bits(endianness.read_u32(bytes))
    }
}

impl Primitive for f64 {
    const WIDTH: usize = 8;
    fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self {
        f64::from_bits(endianness.read_u64(bytes))
    }
}
