//! NDR array types
//!
//! NDR supports several array types:
//!
//! - Fixed arrays: size known at compile time
//! - Conformant arrays: size determined at runtime, transmitted as prefix
//! - Varying arrays: subset of elements transmitted
//! - Conformant varying arrays: both conformant and varying
//!
//! Arrays write every element's scalar part first and the elements' pointer
//! bodies afterwards, in element order. When a conformant array is the last
//! member of a struct its `max_count` moves to the front of the struct; such
//! structs call [`NdrWriter::write_size`] themselves and use
//! [`encode_elements`] / [`decode_elements`] for the tail.

use crate::error::check_range;
use crate::{NdrDecode, NdrEncode, NdrError, NdrReader, NdrType, NdrWriter, Result};

const fn max_align(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}

/// Write the scalar part of each element.
pub fn encode_elements<T: NdrEncode>(w: &mut NdrWriter, elements: &[T]) -> Result<()> {
    for element in elements {
        element.ndr_encode(w)?;
    }
    Ok(())
}

/// Write the deferred part of each element, in order.
pub fn encode_elements_deferred<T: NdrEncode>(w: &mut NdrWriter, elements: &[T]) -> Result<()> {
    for element in elements {
        element.ndr_encode_deferred(w)?;
    }
    Ok(())
}

/// Read `count` element scalars after checking the count against the input.
///
/// The check takes `T::ALIGN` bytes as each element's minimum wire size.
pub fn decode_elements<T: NdrDecode>(r: &mut NdrReader, what: &'static str, count: usize) -> Result<Vec<T>> {
    r.check_count(what, count, T::ALIGN)?;
    let mut elements = Vec::with_capacity(count);
    for _ in 0..count {
        elements.push(T::ndr_decode(r)?);
    }
    Ok(elements)
}

pub fn decode_elements_deferred<T: NdrDecode>(r: &mut NdrReader, elements: &mut [T]) -> Result<()> {
    for element in elements {
        element.ndr_decode_deferred(r)?;
    }
    Ok(())
}

/// Fixed-size array
///
/// Wire format: just the elements (no size prefix)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedArray<T, const N: usize> {
    pub elements: [T; N],
}

impl<T: Default, const N: usize> Default for FixedArray<T, N> {
    fn default() -> Self {
        Self {
            elements: std::array::from_fn(|_| T::default()),
        }
    }
}

impl<T, const N: usize> FixedArray<T, N> {
    pub fn new(elements: [T; N]) -> Self {
        Self { elements }
    }
}

impl<T: NdrType, const N: usize> NdrType for FixedArray<T, N> {
    const ALIGN: usize = T::ALIGN;
}

impl<T: NdrEncode, const N: usize> NdrEncode for FixedArray<T, N> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        encode_elements(w, &self.elements)
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        encode_elements_deferred(w, &self.elements)
    }
}

impl<T: NdrDecode, const N: usize> NdrDecode for FixedArray<T, N> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let elements = decode_elements(r, "fixed array", N)?;
        let got = elements.len();
        let elements = elements
            .try_into()
            .map_err(|_| NdrError::ArraySizeMismatch { expected: N, got })?;
        Ok(Self { elements })
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        decode_elements_deferred(r, &mut self.elements)
    }
}

/// Conformant array
///
/// Wire format:
/// ```text
/// max_count: u32
/// elements[max_count]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConformantArray<T> {
    pub elements: Vec<T>,
}

impl<T> ConformantArray<T> {
    pub fn new(elements: Vec<T>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<T> From<Vec<T>> for ConformantArray<T> {
    fn from(elements: Vec<T>) -> Self {
        Self { elements }
    }
}

impl<T: NdrType> NdrType for ConformantArray<T> {
    const ALIGN: usize = max_align(4, T::ALIGN);
}

impl<T: NdrEncode> NdrEncode for ConformantArray<T> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_size(self.elements.len())?;
        encode_elements(w, &self.elements)
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        encode_elements_deferred(w, &self.elements)
    }
}

impl<T: NdrDecode> NdrDecode for ConformantArray<T> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let max_count = r.read_size()?;
        Ok(Self {
            elements: decode_elements(r, "conformant array", max_count)?,
        })
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        decode_elements_deferred(r, &mut self.elements)
    }
}

/// Varying array with fixed capacity `N`
///
/// Wire format:
/// ```text
/// offset: u32
/// actual_count: u32
/// elements[actual_count]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaryingArray<T, const N: usize> {
    pub offset: usize,
    pub elements: Vec<T>,
}

impl<T, const N: usize> Default for VaryingArray<T, N> {
    fn default() -> Self {
        Self {
            offset: 0,
            elements: Vec::new(),
        }
    }
}

impl<T, const N: usize> VaryingArray<T, N> {
    pub fn new(elements: Vec<T>) -> Self {
        Self {
            offset: 0,
            elements,
        }
    }

    pub fn with_offset(offset: usize, elements: Vec<T>) -> Self {
        Self { offset, elements }
    }

    fn check_capacity(offset: usize, count: usize) -> Result<()> {
        let end = offset.checked_add(count).ok_or(NdrError::IntegerOverflow)?;
        if end > N {
            return Err(NdrError::ArraySizeMismatch {
                expected: N,
                got: end,
            });
        }
        Ok(())
    }
}

impl<T: NdrType, const N: usize> NdrType for VaryingArray<T, N> {
    const ALIGN: usize = max_align(4, T::ALIGN);
}

impl<T: NdrEncode, const N: usize> NdrEncode for VaryingArray<T, N> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        Self::check_capacity(self.offset, self.elements.len())?;
        w.write_size(self.offset)?;
        w.write_size(self.elements.len())?;
        encode_elements(w, &self.elements)
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        encode_elements_deferred(w, &self.elements)
    }
}

impl<T: NdrDecode, const N: usize> NdrDecode for VaryingArray<T, N> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let offset = r.read_size()?;
        let actual_count = r.read_size()?;
        Self::check_capacity(offset, actual_count)?;
        Ok(Self {
            offset,
            elements: decode_elements(r, "varying array", actual_count)?,
        })
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        decode_elements_deferred(r, &mut self.elements)
    }
}

/// Conformant varying array
///
/// Wire format:
/// ```text
/// max_count: u32
/// offset: u32
/// actual_count: u32
/// elements[actual_count]
/// ```
///
/// Only the live elements are transmitted; `max_count` may exceed them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConformantVaryingArray<T> {
    pub max_count: usize,
    pub offset: usize,
    pub elements: Vec<T>,
}

impl<T> ConformantVaryingArray<T> {
    pub fn new(elements: Vec<T>) -> Self {
        Self {
            max_count: elements.len(),
            offset: 0,
            elements,
        }
    }

    pub fn with_max(max_count: usize, elements: Vec<T>) -> Self {
        Self {
            max_count,
            offset: 0,
            elements,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn check_variance(max_count: usize, offset: usize, actual_count: usize) -> Result<()> {
    let end = offset
        .checked_add(actual_count)
        .ok_or(NdrError::IntegerOverflow)?;
    if end > max_count {
        return Err(NdrError::ConformanceMismatch {
            max_count: max_count as u32,
            actual_count: actual_count as u32,
        });
    }
    Ok(())
}

impl<T: NdrType> NdrType for ConformantVaryingArray<T> {
    const ALIGN: usize = max_align(4, T::ALIGN);
}

impl<T: NdrEncode> NdrEncode for ConformantVaryingArray<T> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        check_variance(self.max_count, self.offset, self.elements.len())?;
        w.write_size(self.max_count)?;
        w.write_size(self.offset)?;
        w.write_size(self.elements.len())?;
        encode_elements(w, &self.elements)
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        encode_elements_deferred(w, &self.elements)
    }
}

impl<T: NdrDecode> NdrDecode for ConformantVaryingArray<T> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let max_count = r.read_size()?;
        let offset = r.read_size()?;
        let actual_count = r.read_size()?;
        check_variance(max_count, offset, actual_count)?;
        Ok(Self {
            max_count,
            offset,
            elements: decode_elements(r, "conformant varying array", actual_count)?,
        })
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        decode_elements_deferred(r, &mut self.elements)
    }
}

/// `{ count; [size_is(count)] T* values }` with `count` capped at `MAX`.
///
/// The count and a unique pointer token form the scalar part; the deferred
/// part is a conformant array whose `max_count` must equal the count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedArray<T, const MAX: usize> {
    values: Option<Vec<T>>,
    count: usize,
}

impl<T, const MAX: usize> CountedArray<T, MAX> {
    pub fn new(values: Vec<T>) -> Self {
        Self {
            count: values.len(),
            values: Some(values),
        }
    }

    pub fn null() -> Self {
        Self {
            values: None,
            count: 0,
        }
    }

    pub fn values(&self) -> Option<&[T]> {
        self.values.as_deref()
    }

    pub fn into_values(self) -> Option<Vec<T>> {
        self.values
    }

    /// Number of elements, zero when null.
    pub fn len(&self) -> usize {
        self.values.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, const MAX: usize> Default for CountedArray<T, MAX> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T, const MAX: usize> From<Vec<T>> for CountedArray<T, MAX> {
    fn from(values: Vec<T>) -> Self {
        Self::new(values)
    }
}

impl<T: NdrType, const MAX: usize> NdrType for CountedArray<T, MAX> {
    const ALIGN: usize = 4;
}

impl<T: NdrEncode, const MAX: usize> NdrEncode for CountedArray<T, MAX> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        let count = self.len();
        check_range("element count", count, 0..=MAX)?;
        w.write_size(count)?;
        w.write_pointer_token(crate::PointerKind::Unique, self.values.is_some())?;
        Ok(())
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        let Some(values) = &self.values else {
            return Ok(());
        };
        w.nested(|w| {
            w.write_size(values.len())?;
            encode_elements(w, values)?;
            encode_elements_deferred(w, values)
        })
    }
}

impl<T: NdrDecode, const MAX: usize> NdrDecode for CountedArray<T, MAX> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let count = r.read_size()?;
        check_range("element count", count, 0..=MAX)?;
        let id = r.read_pointer_token(crate::PointerKind::Unique)?;
        Ok(Self {
            values: (id != 0).then(Vec::new),
            count,
        })
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        let Some(values) = self.values.as_mut() else {
            return Ok(());
        };
        let count = self.count;
        r.nested(|r| {
            let max_count = r.read_size()?;
            if max_count != count {
                return Err(NdrError::ConformanceMismatch {
                    max_count: max_count as u32,
                    actual_count: count as u32,
                });
            }
            *values = decode_elements(r, "counted array", max_count)?;
            decode_elements_deferred(r, values)
        })
    }
}
