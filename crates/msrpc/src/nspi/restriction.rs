//! Address book restrictions (`Restriction_r`, MS-OXNSPI 2.2.5)
//!
//! A restriction is a tree: `And`, `Or`, `Not` and `Sub` nodes hold child
//! restrictions behind pointers, so decoding depth is bounded by the
//! context's `max_depth`.

use msrpc_ndr::{
    ndr_struct, CountedArray, NdrDecode, NdrEncode, NdrError, NdrReader, NdrType, NdrUnion,
    NdrWriter, RefPtr, Reserved, Result, UniquePtr,
};

use super::types::{PropertyValue, MAX_VALUES};

/// Restriction types (`rt`)
pub mod restriction_type {
    pub const AND: u32 = 0x00;
    pub const OR: u32 = 0x01;
    pub const NOT: u32 = 0x02;
    pub const CONTENT: u32 = 0x03;
    pub const PROPERTY: u32 = 0x04;
    pub const COMPARE_PROPS: u32 = 0x05;
    pub const BIT_MASK: u32 = 0x06;
    pub const SIZE: u32 = 0x07;
    pub const EXIST: u32 = 0x08;
    pub const SUB: u32 = 0x09;
}

/// Relational operators
pub mod relop {
    pub const LT: u32 = 0;
    pub const LE: u32 = 1;
    pub const GT: u32 = 2;
    pub const GE: u32 = 3;
    pub const EQ: u32 = 4;
    pub const NE: u32 = 5;
    pub const RE: u32 = 6;
    pub const MEMBER_OF_DL: u32 = 100;
}

/// Fuzzy levels of a content restriction; one match mode, optionally OR'd
/// with modifiers.
pub mod fuzzy_level {
    pub const FULL_STRING: u32 = 0x0000_0000;
    pub const SUBSTRING: u32 = 0x0000_0001;
    pub const PREFIX: u32 = 0x0000_0002;
    pub const IGNORE_CASE: u32 = 0x0001_0000;
    pub const IGNORE_NON_SPACE: u32 = 0x0002_0000;
    pub const LOOSE: u32 = 0x0004_0000;
}

/// Children of an `And` or `Or` node.
pub type RestrictionArray = CountedArray<Restriction, MAX_VALUES>;

ndr_struct! {
    /// `ContentRestriction_r`
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct ContentRestriction {
        pub fuzzy_level: u32,
        pub prop_tag: u32,
        pub prop: UniquePtr<PropertyValue>,
    }
}

ndr_struct! {
    /// `PropertyRestriction_r`
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct PropertyRestriction {
        pub relop: u32,
        pub prop_tag: u32,
        pub prop: UniquePtr<PropertyValue>,
    }
}

ndr_struct! {
    /// `ComparePropsRestriction_r`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ComparePropsRestriction {
        pub relop: u32,
        pub prop_tag1: u32,
        pub prop_tag2: u32,
    }
}

ndr_struct! {
    /// `BitMaskRestriction_r`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BitMaskRestriction {
        pub rel_bmr: u32,
        pub prop_tag: u32,
        pub mask: u32,
    }
}

ndr_struct! {
    /// `SizeRestriction_r`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SizeRestriction {
        pub relop: u32,
        pub prop_tag: u32,
        pub cb: u32,
    }
}

ndr_struct! {
    /// `ExistRestriction_r`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ExistRestriction {
        pub reserved1: Reserved<u32>,
        pub prop_tag: u32,
        pub reserved2: Reserved<u32>,
    }
}

ndr_struct! {
    /// `SubRestriction_r`
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct SubRestriction {
        pub sub_object: u32,
        pub restriction: RefPtr<Box<Restriction>>,
    }
}

/// `Restriction_r`: the type `rt` followed by the union it selects
///
/// ```text
/// rt: u32
/// switch: i32     # rt
/// arm
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restriction {
    And(RestrictionArray),
    Or(RestrictionArray),
    Not(RefPtr<Box<Restriction>>),
    Content(ContentRestriction),
    Property(PropertyRestriction),
    CompareProps(ComparePropsRestriction),
    BitMask(BitMaskRestriction),
    Size(SizeRestriction),
    Exist(ExistRestriction),
    Sub(SubRestriction),
}

impl Restriction {
    pub fn and(children: Vec<Restriction>) -> Self {
        Restriction::And(RestrictionArray::new(children))
    }

    pub fn or(children: Vec<Restriction>) -> Self {
        Restriction::Or(RestrictionArray::new(children))
    }

    pub fn not(child: Restriction) -> Self {
        Restriction::Not(RefPtr::new(Box::new(child)))
    }

    pub fn exist(prop_tag: u32) -> Self {
        Restriction::Exist(ExistRestriction {
            prop_tag,
            ..Default::default()
        })
    }

    pub fn property(relop: u32, value: PropertyValue) -> Self {
        Restriction::Property(PropertyRestriction {
            relop,
            prop_tag: value.prop_tag,
            prop: UniquePtr::new(value),
        })
    }

    pub fn content(fuzzy_level: u32, value: PropertyValue) -> Self {
        Restriction::Content(ContentRestriction {
            fuzzy_level,
            prop_tag: value.prop_tag,
            prop: UniquePtr::new(value),
        })
    }

    pub fn restriction_type(&self) -> u32 {
        use restriction_type::*;
        match self {
            Restriction::And(_) => AND,
            Restriction::Or(_) => OR,
            Restriction::Not(_) => NOT,
            Restriction::Content(_) => CONTENT,
            Restriction::Property(_) => PROPERTY,
            Restriction::CompareProps(_) => COMPARE_PROPS,
            Restriction::BitMask(_) => BIT_MASK,
            Restriction::Size(_) => SIZE,
            Restriction::Exist(_) => EXIST,
            Restriction::Sub(_) => SUB,
        }
    }
}

/// Placeholder for a restriction whose body has not been read yet.
impl Default for Restriction {
    fn default() -> Self {
        Restriction::Exist(ExistRestriction::default())
    }
}

impl NdrUnion for Restriction {
    type Discriminant = i32;
    const ARM_ALIGN: usize = 4;

    fn discriminant(&self) -> i32 {
        self.restriction_type() as i32
    }

    fn encode_arm(&self, w: &mut NdrWriter) -> Result<()> {
        match self {
            Restriction::And(v) | Restriction::Or(v) => v.ndr_encode(w),
            Restriction::Not(v) => v.ndr_encode(w),
            Restriction::Content(v) => v.ndr_encode(w),
            Restriction::Property(v) => v.ndr_encode(w),
            Restriction::CompareProps(v) => v.ndr_encode(w),
            Restriction::BitMask(v) => v.ndr_encode(w),
            Restriction::Size(v) => v.ndr_encode(w),
            Restriction::Exist(v) => v.ndr_encode(w),
            Restriction::Sub(v) => v.ndr_encode(w),
        }
    }

    fn encode_arm_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        match self {
            Restriction::And(v) | Restriction::Or(v) => v.ndr_encode_deferred(w),
            Restriction::Not(v) => v.ndr_encode_deferred(w),
            Restriction::Content(v) => v.ndr_encode_deferred(w),
            Restriction::Property(v) => v.ndr_encode_deferred(w),
            Restriction::Sub(v) => v.ndr_encode_deferred(w),
            Restriction::CompareProps(_)
            | Restriction::BitMask(_)
            | Restriction::Size(_)
            | Restriction::Exist(_) => Ok(()),
        }
    }

    fn decode_arm(switch: i32, r: &mut NdrReader) -> Result<Self> {
        use restriction_type::*;
        Ok(match switch as u32 {
            AND => Restriction::And(NdrDecode::ndr_decode(r)?),
            OR => Restriction::Or(NdrDecode::ndr_decode(r)?),
            NOT => Restriction::Not(NdrDecode::ndr_decode(r)?),
            CONTENT => Restriction::Content(NdrDecode::ndr_decode(r)?),
            PROPERTY => Restriction::Property(NdrDecode::ndr_decode(r)?),
            COMPARE_PROPS => Restriction::CompareProps(NdrDecode::ndr_decode(r)?),
            BIT_MASK => Restriction::BitMask(NdrDecode::ndr_decode(r)?),
            SIZE => Restriction::Size(NdrDecode::ndr_decode(r)?),
            EXIST => Restriction::Exist(NdrDecode::ndr_decode(r)?),
            SUB => Restriction::Sub(NdrDecode::ndr_decode(r)?),
            _ => return Err(NdrError::UnknownDiscriminant(switch.into())),
        })
    }

    fn decode_arm_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        match self {
            Restriction::And(v) | Restriction::Or(v) => v.ndr_decode_deferred(r),
            Restriction::Not(v) => v.ndr_decode_deferred(r),
            Restriction::Content(v) => v.ndr_decode_deferred(r),
            Restriction::Property(v) => v.ndr_decode_deferred(r),
            Restriction::Sub(v) => v.ndr_decode_deferred(r),
            Restriction::CompareProps(_)
            | Restriction::BitMask(_)
            | Restriction::Size(_)
            | Restriction::Exist(_) => Ok(()),
        }
    }
}

impl NdrType for Restriction {
    const ALIGN: usize = 4;
}

impl NdrEncode for Restriction {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        let rt = self.restriction_type();
        w.write_align(Self::ALIGN)?;
        w.write_data(rt)?;
        w.write_union(self, rt as i32)
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_union_deferred(self)
    }
}

impl NdrDecode for Restriction {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        r.read_align(Self::ALIGN)?;
        let rt: u32 = r.read_data()?;
        r.read_union(Some(rt as i32))
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        r.read_union_deferred(self)
    }
}
