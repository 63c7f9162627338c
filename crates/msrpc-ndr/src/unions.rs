//! NDR discriminated unions
//!
//! A union is a closed Rust enum with one variant per arm. The discriminant
//! is written first, then the arm aligned to the union's arm alignment. A
//! union embedded in a struct usually takes its discriminant from a sibling
//! field (`switch_is(tag & 0xFFFF)`); the struct passes that value to
//! [`NdrWriter::write_union`] and [`NdrReader::read_union`].

use crate::primitives::NdrPrimitive;
use crate::{NdrDecode, NdrEncode, NdrReader, NdrType, NdrWriter, Result};

/// Closed set of union arms.
pub trait NdrUnion: Sized {
    /// Wire type of the switch.
    type Discriminant: NdrPrimitive + Into<i64>;

    /// Largest alignment among the arms.
    const ARM_ALIGN: usize;

    /// Canonical label of the active arm.
    fn discriminant(&self) -> Self::Discriminant;

    /// Whether `switch` selects the active arm. Override when several labels
    /// share one arm.
    fn accepts(&self, switch: Self::Discriminant) -> bool {
        self.discriminant() == switch
    }

    fn encode_arm(&self, w: &mut NdrWriter) -> Result<()>;

    fn encode_arm_deferred(&self, _w: &mut NdrWriter) -> Result<()> {
        Ok(())
    }

    /// Decode the arm selected by `switch`.
    ///
    /// Unknown labels must return
    /// [`NdrError::UnknownDiscriminant`](crate::NdrError::UnknownDiscriminant).
    fn decode_arm(switch: Self::Discriminant, r: &mut NdrReader) -> Result<Self>;

    fn decode_arm_deferred(&mut self, _r: &mut NdrReader) -> Result<()> {
        Ok(())
    }
}

/// A union that carries its own discriminant on the wire and in the value.
#[derive(Debug, Clone, PartialEq)]
pub struct Switched<U>(pub U);

impl<U: NdrUnion> NdrType for Switched<U> {
    const ALIGN: usize = if U::ARM_ALIGN > <U::Discriminant as NdrPrimitive>::SIZE {
        U::ARM_ALIGN
    } else {
        <U::Discriminant as NdrPrimitive>::SIZE
    };
}

impl<U: NdrUnion> NdrEncode for Switched<U> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_union(&self.0, self.0.discriminant())
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_union_deferred(&self.0)
    }
}

impl<U: NdrUnion> NdrDecode for Switched<U> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        Ok(Self(r.read_union(None)?))
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        r.read_union_deferred(&mut self.0)
    }
}
