//! NDR error types

use std::ops::RangeInclusive;

use thiserror::Error;

/// NDR encoding/decoding errors
#[derive(Debug, Error)]
pub enum NdrError {
    /// Buffer underflow - not enough data for a fixed-size read
    #[error("buffer underflow: needed {needed} bytes, have {have}")]
    BufferUnderflow { needed: usize, have: usize },

    /// A decoded size prefix claims more bytes than remain in the input
    #[error("buffer overflow for size {claimed} of {what}: {remaining} bytes remain")]
    BufferOverflow {
        what: &'static str,
        claimed: usize,
        remaining: usize,
    },

    /// A value falls outside its protocol-declared range
    #[error("{field} out of range: {value} not in {min}..={max}")]
    RangeExceeded {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    /// Decoded size exceeds the configured allocation limit
    #[error("allocation limit exceeded: requested {requested}, limit {limit}")]
    AllocationLimitExceeded { requested: usize, limit: usize },

    /// Size arithmetic overflowed
    #[error("integer overflow in size computation")]
    IntegerOverflow,

    /// Alignment other than 1, 2, 4, 8 or the natural sentinel
    #[error("invalid alignment: {0}")]
    InvalidAlignment(usize),

    /// Invalid string - bad framing or encoding
    #[error("invalid string: {0}")]
    InvalidString(String),

    /// Invalid pointer - referent ID reused with an incompatible type
    #[error("invalid pointer: referent ID {0:#010x}")]
    InvalidPointer(u32),

    /// A `[ref]` pointer was written or read as null
    #[error("null reference pointer")]
    NullRefPointer,

    /// Union switch value with no matching arm
    #[error("unknown union discriminant: {0}")]
    UnknownDiscriminant(i64),

    /// Union switch value does not select the arm that was supplied or expected
    #[error("union discriminant mismatch: expected {expected}, got {got}")]
    DiscriminantMismatch { expected: i64, got: i64 },

    /// Array size mismatch
    #[error("array size mismatch: expected {expected}, got {got}")]
    ArraySizeMismatch { expected: usize, got: usize },

    /// Conformance mismatch
    #[error("conformance mismatch: max_count={max_count}, actual_count={actual_count}")]
    ConformanceMismatch { max_count: u32, actual_count: u32 },

    /// Variance offset other than zero where zero is required
    #[error("non-zero array offset: {0}")]
    NonZeroOffset(u32),

    /// Must-be-zero field carried a value
    #[error("reserved field is non-zero: {0:#x}")]
    NonZeroReserved(u64),

    /// Deferred pointer bodies nested too deeply
    #[error("pointer nesting exceeds depth limit {0}")]
    DepthExceeded(usize),

    /// Invalid enum value
    #[error("invalid enum value: {0}")]
    InvalidEnumValue(i32),

    /// UTF-8 decoding error
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// UTF-16 decoding error
    #[error("UTF-16 error: {0}")]
    Utf16Error(#[from] std::char::DecodeUtf16Error),
}

/// Result type for NDR operations
pub type Result<T> = std::result::Result<T, NdrError>;

/// Reject `value` if it falls outside the `[range(min, max)]` of `field`.
///
/// Used on both sides: encoders call it before writing anything, decoders
/// right after reading the count.
pub fn check_range(field: &'static str, value: usize, range: RangeInclusive<usize>) -> Result<()> {
    if !range.contains(&value) {
        return Err(NdrError::RangeExceeded {
            field,
            value: value as u64,
            min: *range.start() as u64,
            max: *range.end() as u64,
        });
    }
    Ok(())
}
