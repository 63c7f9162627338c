//! NDR encoding trait

use crate::{NdrWriter, Result};

/// Static layout facts shared by the encode and decode sides
pub trait NdrType {
    /// Alignment of the value's scalar part.
    ///
    /// Also serves as the lower bound on its wire size when a decoder
    /// validates an element count against the remaining input.
    const ALIGN: usize;
}

/// Trait for types that can be encoded to NDR format
///
/// Encoding runs in two passes. [`ndr_encode`](NdrEncode::ndr_encode) writes
/// the fixed part: scalars, hoisted conformance and pointer tokens.
/// [`ndr_encode_deferred`](NdrEncode::ndr_encode_deferred) then writes the
/// bodies those tokens refer to, depth first, in field order. A struct
/// containing pointers therefore writes all of its tokens before any body.
pub trait NdrEncode: NdrType {
    /// Write the scalar part of this value.
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()>;

    /// Write the referents of any pointers written by `ndr_encode`.
    fn ndr_encode_deferred(&self, _w: &mut NdrWriter) -> Result<()> {
        Ok(())
    }
}

impl<T: NdrType + ?Sized> NdrType for Box<T> {
    const ALIGN: usize = T::ALIGN;
}

/// Boxed values encode as their contents; recursive types box their
/// self-references.
impl<T: NdrEncode + ?Sized> NdrEncode for Box<T> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        (**self).ndr_encode(w)
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        (**self).ndr_encode_deferred(w)
    }
}
