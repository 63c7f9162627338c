//! NDR decoding trait

use crate::{NdrReader, NdrType, Result};

/// Trait for types that can be decoded from NDR format
///
/// Mirrors [`NdrEncode`](crate::NdrEncode): `ndr_decode` returns the value
/// with its pointers pending, `ndr_decode_deferred` reads the referents in
/// the same order the encoder wrote them.
pub trait NdrDecode: NdrType + Sized {
    /// Read the scalar part of a value.
    fn ndr_decode(r: &mut NdrReader) -> Result<Self>;

    /// Fill in the referents of pointers left pending by `ndr_decode`.
    fn ndr_decode_deferred(&mut self, _r: &mut NdrReader) -> Result<()> {
        Ok(())
    }
}

impl<T: NdrDecode> NdrDecode for Box<T> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        Ok(Box::new(T::ndr_decode(r)?))
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        (**self).ndr_decode_deferred(r)
    }
}
