//! NDR primitive type implementations
//!
//! NDR primitive types and their encodings:
//!
//! | MIDL Type     | Rust Type | Size | Alignment |
//! |---------------|-----------|------|-----------|
//! | boolean       | bool      | 1    | 1         |
//! | byte/char     | u8        | 1    | 1         |
//! | small         | i8        | 1    | 1         |
//! | short         | i16       | 2    | 2         |
//! | long/int      | i32       | 4    | 4         |
//! | hyper         | i64       | 8    | 8         |
//! | unsigned short| u16       | 2    | 2         |
//! | unsigned long | u32       | 4    | 4         |
//! | unsigned hyper| u64       | 8    | 8         |
//! | float         | f32       | 4    | 4         |
//! | double        | f64       | 8    | 8         |
//! | wchar_t       | u16       | 2    | 2         |
//! | error_status_t| u32       | 4    | 4         |
//!
//! Every primitive aligns to its own size.

use std::fmt;
use std::marker::PhantomData;

use bytes::{Buf, BufMut};

use crate::{NdrContext, NdrDecode, NdrEncode, NdrReader, NdrType, NdrWriter, Result};

/// Fixed-width scalar with a byte-order aware wire form.
///
/// Callers must check that `SIZE` bytes remain before calling `get`.
pub trait NdrPrimitive: Copy + PartialEq + fmt::Debug + 'static {
    /// Wire size, equal to the natural alignment.
    const SIZE: usize;

    fn put<B: BufMut>(self, ctx: &NdrContext, buf: &mut B);

    fn get<B: Buf>(ctx: &NdrContext, buf: &mut B) -> Self;

    /// Raw bit pattern, for diagnostics.
    fn to_bits(self) -> u64;
}

// Implements NdrPrimitive plus both codec traits for a scalar
macro_rules! impl_ndr_primitive {
    ($ty:ty, $size:expr, $put:ident, $get:ident, |$v:ident| $bits:expr) => {
        impl NdrPrimitive for $ty {
            const SIZE: usize = $size;

            #[inline]
            fn put<B: BufMut>(self, ctx: &NdrContext, buf: &mut B) {
                ctx.$put(buf, self);
            }

            #[inline]
            fn get<B: Buf>(ctx: &NdrContext, buf: &mut B) -> Self {
                ctx.$get(buf)
            }

            fn to_bits(self) -> u64 {
                let $v = self;
                $bits
            }
        }

        impl_ndr_scalar!($ty);
    };
}

macro_rules! impl_ndr_scalar {
    ($ty:ty) => {
        impl NdrType for $ty {
            const ALIGN: usize = <$ty as NdrPrimitive>::SIZE;
        }

        impl NdrEncode for $ty {
            fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
                w.write_data(*self)
            }
        }

        impl NdrDecode for $ty {
            fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
                r.read_data()
            }
        }
    };
}

impl_ndr_primitive!(u16, 2, put_u16, get_u16, |v| v as u64);
impl_ndr_primitive!(i16, 2, put_i16, get_i16, |v| v as u16 as u64);
impl_ndr_primitive!(u32, 4, put_u32, get_u32, |v| v as u64);
impl_ndr_primitive!(i32, 4, put_i32, get_i32, |v| v as u32 as u64);
impl_ndr_primitive!(u64, 8, put_u64, get_u64, |v| v);
impl_ndr_primitive!(i64, 8, put_i64, get_i64, |v| v as u64);
impl_ndr_primitive!(f32, 4, put_f32, get_f32, |v| v.to_bits() as u64);
impl_ndr_primitive!(f64, 8, put_f64, get_f64, |v| v.to_bits());

impl NdrPrimitive for u8 {
    const SIZE: usize = 1;

    fn put<B: BufMut>(self, _ctx: &NdrContext, buf: &mut B) {
        buf.put_u8(self);
    }

    fn get<B: Buf>(_ctx: &NdrContext, buf: &mut B) -> Self {
        buf.get_u8()
    }

    fn to_bits(self) -> u64 {
        self as u64
    }
}

impl NdrPrimitive for i8 {
    const SIZE: usize = 1;

    fn put<B: BufMut>(self, _ctx: &NdrContext, buf: &mut B) {
        buf.put_i8(self);
    }

    fn get<B: Buf>(_ctx: &NdrContext, buf: &mut B) -> Self {
        buf.get_i8()
    }

    fn to_bits(self) -> u64 {
        self as u8 as u64
    }
}

/// NDR boolean - encoded as a single byte (0x00 = false, 0x01 = true)
impl NdrPrimitive for bool {
    const SIZE: usize = 1;

    fn put<B: BufMut>(self, _ctx: &NdrContext, buf: &mut B) {
        buf.put_u8(u8::from(self));
    }

    fn get<B: Buf>(_ctx: &NdrContext, buf: &mut B) -> Self {
        buf.get_u8() != 0
    }

    fn to_bits(self) -> u64 {
        self as u64
    }
}

impl_ndr_scalar!(u8);
impl_ndr_scalar!(i8);
impl_ndr_scalar!(bool);

/// GUID/UUID type for NDR encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NdrUuid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl NdrUuid {
    /// Nil UUID
    pub const NIL: Self = Self::from_fields(0, 0, 0, [0; 8]);

    pub const fn from_fields(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }

    /// Parse from string "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('-').collect();
        if s.len() != 36 || parts.len() != 5 || parts[4].len() != 12 {
            return None;
        }

        let clock = u16::from_str_radix(parts[3], 16).ok()?;
        let mut data4 = [0u8; 8];
        data4[..2].copy_from_slice(&clock.to_be_bytes());
        for (i, byte) in data4[2..].iter_mut().enumerate() {
            *byte = u8::from_str_radix(parts[4].get(i * 2..i * 2 + 2)?, 16).ok()?;
        }

        Some(Self {
            data1: u32::from_str_radix(parts[0], 16).ok()?,
            data2: u16::from_str_radix(parts[1], 16).ok()?,
            data3: u16::from_str_radix(parts[2], 16).ok()?,
            data4,
        })
    }
}

impl fmt::Display for NdrUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-",
            self.data1, self.data2, self.data3, self.data4[0], self.data4[1]
        )?;
        for byte in &self.data4[2..] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl NdrType for NdrUuid {
    const ALIGN: usize = 4;
}

impl NdrEncode for NdrUuid {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_data(self.data1)?;
        w.write_data(self.data2)?;
        w.write_data(self.data3)?;
        w.write_bytes(&self.data4);
        Ok(())
    }
}

impl NdrDecode for NdrUuid {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let data1 = r.read_data()?;
        let data2 = r.read_data()?;
        let data3 = r.read_data()?;
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&r.read_bytes(8)?);
        Ok(Self {
            data1,
            data2,
            data3,
            data4,
        })
    }
}

/// A must-be-zero field.
///
/// Always encodes as zero. On decode a non-zero value is handled according
/// to the context's [`ReservedPolicy`](crate::ReservedPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reserved<T>(PhantomData<T>);

impl<T> Reserved<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: NdrPrimitive> NdrType for Reserved<T> {
    const ALIGN: usize = T::SIZE;
}

impl<T: NdrPrimitive + Default> NdrEncode for Reserved<T> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_data(T::default())
    }
}

impl<T: NdrPrimitive> NdrDecode for Reserved<T> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let value: T = r.read_data()?;
        r.check_reserved(value.to_bits())?;
        Ok(Self::new())
    }
}

/// NDR error_status_t - HRESULT-like error code
pub type ErrorStatusT = u32;
