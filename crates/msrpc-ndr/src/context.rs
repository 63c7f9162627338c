//! NDR encoding/decoding context
//!
//! The context carries the data representation (byte order) negotiated for a
//! call together with the decode safety limits. It is `Copy` and is handed to
//! every [`NdrWriter`](crate::NdrWriter) and [`NdrReader`](crate::NdrReader).

use bytes::{Buf, BufMut};

use crate::error::{NdrError, Result};

/// Alignment sentinel meaning "the transfer syntax word size".
///
/// Generated stubs align struct and union headers with this value; for NDR 2.0
/// it resolves to 4 bytes.
pub const NATURAL_ALIGNMENT: usize = 9;

/// Word size of NDR 2.0, which [`NATURAL_ALIGNMENT`] resolves to.
pub const NDR20_WORD_SIZE: usize = 4;

/// Default cap on elements in a single decoded array.
pub const MAX_NDR_ARRAY_ELEMENTS: usize = 1 << 20;

/// Default cap on bytes allocated for a single decoded array or string.
pub const MAX_NDR_ALLOCATION_SIZE: usize = 16 * 1024 * 1024;

/// Default cap on deferred pointer nesting.
pub const MAX_NDR_DEPTH: usize = 64;

/// What to do with a must-be-zero field that arrives non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReservedPolicy {
    /// Fail the decode with [`NdrError::NonZeroReserved`].
    #[default]
    Reject,
    /// Log a warning and discard the value.
    Ignore,
}

/// NDR encoding/decoding context
#[derive(Debug, Clone, Copy)]
pub struct NdrContext {
    /// Whether to use little-endian byte order
    pub little_endian: bool,
    /// Maximum element count accepted for one decoded array
    pub max_array_elements: usize,
    /// Maximum bytes accepted for one decoded array or string
    pub max_allocation_bytes: usize,
    /// Maximum nesting of deferred pointer bodies
    pub max_depth: usize,
    /// Handling of non-zero reserved fields on decode
    pub reserved_policy: ReservedPolicy,
}

impl NdrContext {
    /// Create a new NDR context with little-endian byte order (default)
    pub fn new() -> Self {
        Self {
            little_endian: true,
            max_array_elements: MAX_NDR_ARRAY_ELEMENTS,
            max_allocation_bytes: MAX_NDR_ALLOCATION_SIZE,
            max_depth: MAX_NDR_DEPTH,
            reserved_policy: ReservedPolicy::Reject,
        }
    }

    /// Create a context with big-endian byte order
    pub fn big_endian() -> Self {
        Self::new().with_byte_order(false)
    }

    /// Set the byte order
    pub fn with_byte_order(mut self, little_endian: bool) -> Self {
        self.little_endian = little_endian;
        self
    }

    pub fn with_max_array_elements(mut self, max: usize) -> Self {
        self.max_array_elements = max;
        self
    }

    pub fn with_max_allocation_bytes(mut self, max: usize) -> Self {
        self.max_allocation_bytes = max;
        self
    }

    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    pub fn with_reserved_policy(mut self, policy: ReservedPolicy) -> Self {
        self.reserved_policy = policy;
        self
    }

    /// Resolve an alignment request to a byte boundary.
    ///
    /// Accepts 1, 2, 4, 8 and [`NATURAL_ALIGNMENT`].
    pub fn resolve_alignment(alignment: usize) -> Result<usize> {
        match alignment {
            1 | 2 | 4 | 8 => Ok(alignment),
            NATURAL_ALIGNMENT => Ok(NDR20_WORD_SIZE),
            other => Err(NdrError::InvalidAlignment(other)),
        }
    }

    /// Calculate padding needed to align to the given boundary
    #[inline]
    pub fn align_padding(position: usize, alignment: usize) -> usize {
        if alignment <= 1 {
            return 0;
        }
        let remainder = position % alignment;
        if remainder == 0 {
            0
        } else {
            alignment - remainder
        }
    }
}

impl Default for NdrContext {
    fn default() -> Self {
        Self::new()
    }
}

// Byte-order aware accessors. Callers check `remaining()` before a get.
macro_rules! byte_order_accessors {
    ($($ty:ty => $put:ident, $get:ident, $put_le:ident, $put_be:ident, $get_le:ident, $get_be:ident;)*) => {
        impl NdrContext {
            $(
                #[inline]
                pub fn $put<B: BufMut>(&self, buf: &mut B, value: $ty) {
                    if self.little_endian {
                        buf.$put_le(value);
                    } else {
                        buf.$put_be(value);
                    }
                }

                #[inline]
                pub fn $get<B: Buf>(&self, buf: &mut B) -> $ty {
                    if self.little_endian {
                        buf.$get_le()
                    } else {
                        buf.$get_be()
                    }
                }
            )*
        }
    };
}

byte_order_accessors! {
    u16 => put_u16, get_u16, put_u16_le, put_u16, get_u16_le, get_u16;
    i16 => put_i16, get_i16, put_i16_le, put_i16, get_i16_le, get_i16;
    u32 => put_u32, get_u32, put_u32_le, put_u32, get_u32_le, get_u32;
    i32 => put_i32, get_i32, put_i32_le, put_i32, get_i32_le, get_i32;
    u64 => put_u64, get_u64, put_u64_le, put_u64, get_u64_le, get_u64;
    i64 => put_i64, get_i64, put_i64_le, put_i64, get_i64_le, get_i64;
    f32 => put_f32, get_f32, put_f32_le, put_f32, get_f32_le, get_f32;
    f64 => put_f64, get_f64, put_f64_le, put_f64, get_f64_le, get_f64;
}
