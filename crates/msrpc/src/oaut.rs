//! OLE Automation types (MS-OAUT 2.2)
//!
//! `BSTR` as a flagged word blob, `VARIANT` and `SAFEARRAY`. Arms that
//! carry interface pointers or records are not modelled and decode as
//! [`NdrError::UnknownDiscriminant`].

use msrpc_ndr::{
    check_range, decode_elements, decode_elements_deferred, encode_elements,
    encode_elements_deferred, ndr_struct, CountedArray, NdrDecode, NdrEncode, NdrError, NdrReader,
    NdrType, NdrUnion, NdrWriter, PointerKind, Result, UniquePtr,
};

/// `cBytes` value marking a NULL BSTR.
const NULL_BSTR_BYTES: u32 = 0xFFFF_FFFF;

/// BSTR as marshalled on the wire: a `FLAGGED_WORD_BLOB`.
///
/// ```text
/// max_count: u32      # clSize, hoisted
/// cBytes: u32         # length in bytes
/// clSize: u32         # length in UTF-16 units
/// asData[clSize]: u16 # no terminating NUL
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bstr(pub String);

/// `BSTR*` out parameter: a unique pointer to the blob.
pub type BstrPtr = UniquePtr<Bstr>;

impl Bstr {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Bstr {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl NdrType for Bstr {
    const ALIGN: usize = 4;
}

impl NdrEncode for Bstr {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        let units: Vec<u16> = self.0.encode_utf16().collect();
        let byte_len = units
            .len()
            .checked_mul(2)
            .ok_or(NdrError::IntegerOverflow)?;

        w.write_size(units.len())?;
        w.write_size(byte_len)?;
        w.write_size(units.len())?;
        for unit in units {
            w.write_data(unit)?;
        }
        Ok(())
    }
}

impl NdrDecode for Bstr {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let max_count = r.read_size()?;
        let byte_len: u32 = r.read_data()?;
        let units = r.read_size()?;
        if units != max_count {
            return Err(NdrError::ConformanceMismatch {
                max_count: max_count as u32,
                actual_count: units as u32,
            });
        }
        if byte_len != NULL_BSTR_BYTES && byte_len as usize > units.saturating_mul(2) {
            return Err(NdrError::ArraySizeMismatch {
                expected: units.saturating_mul(2),
                got: byte_len as usize,
            });
        }
        r.check_count("BSTR", units, 2)?;

        let mut data = Vec::with_capacity(units);
        for _ in 0..units {
            data.push(r.read_data::<u16>()?);
        }
        let s = char::decode_utf16(data).collect::<std::result::Result<String, _>>()?;
        Ok(Self(s))
    }
}

/// Variant types (`VARENUM`) with a wire arm.
pub mod vt {
    pub const EMPTY: u16 = 0;
    pub const NULL: u16 = 1;
    pub const I2: u16 = 2;
    pub const I4: u16 = 3;
    pub const R4: u16 = 4;
    pub const R8: u16 = 5;
    pub const CY: u16 = 6;
    pub const DATE: u16 = 7;
    pub const BSTR: u16 = 8;
    pub const ERROR: u16 = 10;
    pub const BOOL: u16 = 11;
    pub const VARIANT: u16 = 12;
    pub const I1: u16 = 16;
    pub const UI1: u16 = 17;
    pub const UI2: u16 = 18;
    pub const UI4: u16 = 19;
    pub const I8: u16 = 20;
    pub const UI8: u16 = 21;
    pub const INT: u16 = 22;
    pub const UINT: u16 = 23;
}

/// Value arm of a [`Variant`], selected by its `vt`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VariantValue {
    #[default]
    Empty,
    Null,
    I1(i8),
    UI1(u8),
    I2(i16),
    UI2(u16),
    I4(i32),
    UI4(u32),
    Int(i32),
    UInt(u32),
    I8(i64),
    UI8(u64),
    R4(f32),
    R8(f64),
    /// `VARIANT_BOOL`: -1 on the wire for true.
    Bool(bool),
    Error(i32),
    /// Currency in units of 1/10000.
    Currency(i64),
    Date(f64),
    Bstr(BstrPtr),
}

impl NdrUnion for VariantValue {
    type Discriminant = u32;
    const ARM_ALIGN: usize = 8;

    fn discriminant(&self) -> u32 {
        let kind = match self {
            VariantValue::Empty => vt::EMPTY,
            VariantValue::Null => vt::NULL,
            VariantValue::I1(_) => vt::I1,
            VariantValue::UI1(_) => vt::UI1,
            VariantValue::I2(_) => vt::I2,
            VariantValue::UI2(_) => vt::UI2,
            VariantValue::I4(_) => vt::I4,
            VariantValue::UI4(_) => vt::UI4,
            VariantValue::Int(_) => vt::INT,
            VariantValue::UInt(_) => vt::UINT,
            VariantValue::I8(_) => vt::I8,
            VariantValue::UI8(_) => vt::UI8,
            VariantValue::R4(_) => vt::R4,
            VariantValue::R8(_) => vt::R8,
            VariantValue::Bool(_) => vt::BOOL,
            VariantValue::Error(_) => vt::ERROR,
            VariantValue::Currency(_) => vt::CY,
            VariantValue::Date(_) => vt::DATE,
            VariantValue::Bstr(_) => vt::BSTR,
        };
        u32::from(kind)
    }

    fn encode_arm(&self, w: &mut NdrWriter) -> Result<()> {
        match self {
            VariantValue::Empty | VariantValue::Null => Ok(()),
            VariantValue::I1(v) => w.write_data(*v),
            VariantValue::UI1(v) => w.write_data(*v),
            VariantValue::I2(v) => w.write_data(*v),
            VariantValue::UI2(v) => w.write_data(*v),
            VariantValue::I4(v) | VariantValue::Int(v) | VariantValue::Error(v) => w.write_data(*v),
            VariantValue::UI4(v) | VariantValue::UInt(v) => w.write_data(*v),
            VariantValue::I8(v) | VariantValue::Currency(v) => w.write_data(*v),
            VariantValue::UI8(v) => w.write_data(*v),
            VariantValue::R4(v) => w.write_data(*v),
            VariantValue::R8(v) | VariantValue::Date(v) => w.write_data(*v),
            VariantValue::Bool(v) => w.write_data(if *v { -1i16 } else { 0 }),
            VariantValue::Bstr(v) => v.ndr_encode(w),
        }
    }

    fn encode_arm_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        match self {
            VariantValue::Bstr(v) => v.ndr_encode_deferred(w),
            _ => Ok(()),
        }
    }

    fn decode_arm(switch: u32, r: &mut NdrReader) -> Result<Self> {
        let Ok(kind) = u16::try_from(switch) else {
            return Err(NdrError::UnknownDiscriminant(switch.into()));
        };
        Ok(match kind {
            vt::EMPTY => VariantValue::Empty,
            vt::NULL => VariantValue::Null,
            vt::I1 => VariantValue::I1(r.read_data()?),
            vt::UI1 => VariantValue::UI1(r.read_data()?),
            vt::I2 => VariantValue::I2(r.read_data()?),
            vt::UI2 => VariantValue::UI2(r.read_data()?),
            vt::I4 => VariantValue::I4(r.read_data()?),
            vt::UI4 => VariantValue::UI4(r.read_data()?),
            vt::INT => VariantValue::Int(r.read_data()?),
            vt::UINT => VariantValue::UInt(r.read_data()?),
            vt::I8 => VariantValue::I8(r.read_data()?),
            vt::UI8 => VariantValue::UI8(r.read_data()?),
            vt::R4 => VariantValue::R4(r.read_data()?),
            vt::R8 => VariantValue::R8(r.read_data()?),
            vt::BOOL => VariantValue::Bool(r.read_data::<i16>()? != 0),
            vt::ERROR => VariantValue::Error(r.read_data()?),
            vt::CY => VariantValue::Currency(r.read_data()?),
            vt::DATE => VariantValue::Date(r.read_data()?),
            vt::BSTR => VariantValue::Bstr(NdrDecode::ndr_decode(r)?),
            _ => return Err(NdrError::UnknownDiscriminant(switch.into())),
        })
    }

    fn decode_arm_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        match self {
            VariantValue::Bstr(v) => v.ndr_decode_deferred(r),
            _ => Ok(()),
        }
    }
}

/// `VARIANT` as marshalled on the wire (`wireVARIANTStr`).
///
/// ```text
/// clSize: u32         # size in 8-byte units
/// rpcReserved: u32
/// vt: u16
/// wReserved1..3: u16
/// switch: u32         # vt
/// arm                 # 8-aligned
/// ```
///
/// `clSize` and the reserved words are ignored on receipt.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Variant(pub VariantValue);

impl Variant {
    pub fn new(value: VariantValue) -> Self {
        Self(value)
    }

    pub fn vt(&self) -> u16 {
        self.0.discriminant() as u16
    }

    /// Encoded size in bytes, the arm's referents included.
    fn wire_size(&self) -> usize {
        let arm = match &self.0 {
            VariantValue::Empty | VariantValue::Null => 0,
            VariantValue::I1(_) | VariantValue::UI1(_) => 1,
            VariantValue::I2(_) | VariantValue::UI2(_) | VariantValue::Bool(_) => 2,
            VariantValue::I4(_)
            | VariantValue::UI4(_)
            | VariantValue::Int(_)
            | VariantValue::UInt(_)
            | VariantValue::R4(_)
            | VariantValue::Error(_) => 4,
            VariantValue::I8(_)
            | VariantValue::UI8(_)
            | VariantValue::R8(_)
            | VariantValue::Currency(_)
            | VariantValue::Date(_) => 8,
            VariantValue::Bstr(p) => {
                4 + p.as_ref().map_or(0, |b| 12 + 2 * b.0.encode_utf16().count())
            }
        };
        24 + arm
    }
}

impl From<VariantValue> for Variant {
    fn from(value: VariantValue) -> Self {
        Self(value)
    }
}

impl NdrType for Variant {
    const ALIGN: usize = 8;
}

impl NdrEncode for Variant {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        let vt = self.vt();
        w.write_align(Self::ALIGN)?;
        w.write_size(self.wire_size().div_ceil(8))?;
        w.write_data(0u32)?;
        w.write_data(vt)?;
        for _ in 0..3 {
            w.write_data(0u16)?;
        }
        w.write_union(&self.0, u32::from(vt))
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_union_deferred(&self.0)
    }
}

impl NdrDecode for Variant {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        r.read_align(Self::ALIGN)?;
        let _cl_size: u32 = r.read_data()?;
        let _rpc_reserved: u32 = r.read_data()?;
        let vt: u16 = r.read_data()?;
        for _ in 0..3 {
            let _: u16 = r.read_data()?;
        }
        Ok(Self(r.read_union(Some(u32::from(vt)))?))
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        r.read_union_deferred(&mut self.0)
    }
}

/// `VARIANT*` element of a variant array.
pub type VariantPtr = UniquePtr<Variant>;

/// SAFEARRAY element kinds (`sfType`)
pub mod sf_type {
    pub const I2: u32 = 2;
    pub const I4: u32 = 3;
    pub const BSTR: u32 = 8;
    pub const DISPATCH: u32 = 9;
    pub const VARIANT: u32 = 12;
    pub const UNKNOWN: u32 = 13;
    pub const I1: u32 = 16;
    pub const I8: u32 = 20;
    pub const RECORD: u32 = 36;
    pub const HAVEIID: u32 = 0x800D;
}

/// `fFeatures` flags
pub mod fadf {
    pub const HAVEVARTYPE: u16 = 0x0080;
    pub const BSTR: u16 = 0x0100;
    pub const VARIANT: u16 = 0x0800;
}

/// Upper bound of a SAFEARRAY element count.
const MAX_ELEMENTS: usize = u32::MAX as usize;

/// `{ ULONG Size; [size_is(Size), ref] T* data; }`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RefArray<T> {
    elements: Vec<T>,
    count: usize,
}

impl<T> RefArray<T> {
    pub fn new(elements: Vec<T>) -> Self {
        Self {
            count: elements.len(),
            elements,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<T> FromIterator<T> for RefArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: NdrType> NdrType for RefArray<T> {
    const ALIGN: usize = 4;
}

impl<T: NdrEncode> NdrEncode for RefArray<T> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_size(self.elements.len())?;
        w.write_pointer_token(PointerKind::Ref, true)?;
        Ok(())
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        w.nested(|w| {
            w.write_size(self.elements.len())?;
            encode_elements(w, &self.elements)?;
            encode_elements_deferred(w, &self.elements)
        })
    }
}

impl<T: NdrDecode> NdrDecode for RefArray<T> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let count = r.read_size()?;
        r.read_pointer_token(PointerKind::Ref)?;
        Ok(Self {
            elements: Vec::new(),
            count,
        })
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        let count = self.count;
        let elements = &mut self.elements;
        r.nested(|r| {
            let max_count = r.read_size()?;
            if max_count != count {
                return Err(NdrError::ConformanceMismatch {
                    max_count: max_count as u32,
                    actual_count: count as u32,
                });
            }
            *elements = decode_elements(r, "safearray elements", count)?;
            decode_elements_deferred(r, elements)
        })
    }
}

/// Element storage of a [`SafeArray`] (`SAFEARRAYUNION`)
#[derive(Debug, Clone, PartialEq)]
pub enum SafeArrayData {
    Bstr(RefArray<BstrPtr>),
    Variant(RefArray<VariantPtr>),
    /// One-byte elements
    I1(CountedArray<u8, MAX_ELEMENTS>),
    /// Two-byte elements
    I2(CountedArray<u16, MAX_ELEMENTS>),
    /// Four-byte elements
    I4(CountedArray<u32, MAX_ELEMENTS>),
    /// Eight-byte elements
    I8(CountedArray<u64, MAX_ELEMENTS>),
}

impl SafeArrayData {
    /// Number of elements; zero for a null sized array.
    pub fn len(&self) -> usize {
        match self {
            SafeArrayData::Bstr(v) => v.len(),
            SafeArrayData::Variant(v) => v.len(),
            SafeArrayData::I1(v) => v.len(),
            SafeArrayData::I2(v) => v.len(),
            SafeArrayData::I4(v) => v.len(),
            SafeArrayData::I8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Default `fFeatures` and `cbElements` for this element kind.
    fn layout(&self) -> (u16, u32) {
        match self {
            SafeArrayData::Bstr(_) => (fadf::HAVEVARTYPE | fadf::BSTR, 4),
            SafeArrayData::Variant(_) => (fadf::HAVEVARTYPE | fadf::VARIANT, 16),
            SafeArrayData::I1(_) => (fadf::HAVEVARTYPE, 1),
            SafeArrayData::I2(_) => (fadf::HAVEVARTYPE, 2),
            SafeArrayData::I4(_) => (fadf::HAVEVARTYPE, 4),
            SafeArrayData::I8(_) => (fadf::HAVEVARTYPE, 8),
        }
    }
}

impl Default for SafeArrayData {
    fn default() -> Self {
        SafeArrayData::I1(CountedArray::null())
    }
}

impl NdrUnion for SafeArrayData {
    type Discriminant = u32;
    const ARM_ALIGN: usize = 4;

    fn discriminant(&self) -> u32 {
        match self {
            SafeArrayData::Bstr(_) => sf_type::BSTR,
            SafeArrayData::Variant(_) => sf_type::VARIANT,
            SafeArrayData::I1(_) => sf_type::I1,
            SafeArrayData::I2(_) => sf_type::I2,
            SafeArrayData::I4(_) => sf_type::I4,
            SafeArrayData::I8(_) => sf_type::I8,
        }
    }

    fn encode_arm(&self, w: &mut NdrWriter) -> Result<()> {
        match self {
            SafeArrayData::Bstr(v) => v.ndr_encode(w),
            SafeArrayData::Variant(v) => v.ndr_encode(w),
            SafeArrayData::I1(v) => v.ndr_encode(w),
            SafeArrayData::I2(v) => v.ndr_encode(w),
            SafeArrayData::I4(v) => v.ndr_encode(w),
            SafeArrayData::I8(v) => v.ndr_encode(w),
        }
    }

    fn encode_arm_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        match self {
            SafeArrayData::Bstr(v) => v.ndr_encode_deferred(w),
            SafeArrayData::Variant(v) => v.ndr_encode_deferred(w),
            SafeArrayData::I1(v) => v.ndr_encode_deferred(w),
            SafeArrayData::I2(v) => v.ndr_encode_deferred(w),
            SafeArrayData::I4(v) => v.ndr_encode_deferred(w),
            SafeArrayData::I8(v) => v.ndr_encode_deferred(w),
        }
    }

    fn decode_arm(switch: u32, r: &mut NdrReader) -> Result<Self> {
        Ok(match switch {
            sf_type::BSTR => SafeArrayData::Bstr(NdrDecode::ndr_decode(r)?),
            sf_type::VARIANT => SafeArrayData::Variant(NdrDecode::ndr_decode(r)?),
            sf_type::I1 => SafeArrayData::I1(NdrDecode::ndr_decode(r)?),
            sf_type::I2 => SafeArrayData::I2(NdrDecode::ndr_decode(r)?),
            sf_type::I4 => SafeArrayData::I4(NdrDecode::ndr_decode(r)?),
            sf_type::I8 => SafeArrayData::I8(NdrDecode::ndr_decode(r)?),
            other => return Err(NdrError::UnknownDiscriminant(other.into())),
        })
    }

    fn decode_arm_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        match self {
            SafeArrayData::Bstr(v) => v.ndr_decode_deferred(r),
            SafeArrayData::Variant(v) => v.ndr_decode_deferred(r),
            SafeArrayData::I1(v) => v.ndr_decode_deferred(r),
            SafeArrayData::I2(v) => v.ndr_decode_deferred(r),
            SafeArrayData::I4(v) => v.ndr_decode_deferred(r),
            SafeArrayData::I8(v) => v.ndr_decode_deferred(r),
        }
    }
}

ndr_struct! {
    /// `SAFEARRAYBOUND`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SafeArrayBound {
        pub elements: u32,
        pub lower_bound: i32,
    }
}

/// `SAFEARRAY` as marshalled on the wire (`wireSAFEARRAY_t`).
///
/// ```text
/// max_count: u32          # cDims, hoisted
/// cDims: u16              # 1..=65535
/// fFeatures: u16
/// cbElements: u32
/// cLocks: u32
/// sfType: u32
/// switch: u32             # sfType
/// arm
/// rgsabound[cDims]
/// ```
///
/// The product of the bounds' element counts must equal the number of
/// elements in `data`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SafeArray {
    pub features: u16,
    pub element_size: u32,
    pub locks: u32,
    pub data: SafeArrayData,
    pub bounds: Vec<SafeArrayBound>,
}

impl SafeArray {
    /// One-dimensional, zero-based array over `data`.
    pub fn vector(data: SafeArrayData) -> Self {
        let (features, element_size) = data.layout();
        let elements = data.len() as u32;
        Self {
            features,
            element_size,
            locks: 0,
            data,
            bounds: vec![SafeArrayBound {
                elements,
                lower_bound: 0,
            }],
        }
    }

    fn check_element_count(&self) -> Result<()> {
        let expected = self.bounds.iter().try_fold(1usize, |n, b| {
            n.checked_mul(b.elements as usize)
                .ok_or(NdrError::IntegerOverflow)
        })?;
        if expected != self.data.len() {
            return Err(NdrError::ArraySizeMismatch {
                expected,
                got: self.data.len(),
            });
        }
        Ok(())
    }
}

impl NdrType for SafeArray {
    const ALIGN: usize = 4;
}

impl NdrEncode for SafeArray {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        let dims = self.bounds.len();
        check_range("cDims", dims, 1..=u16::MAX as usize)?;
        self.check_element_count()?;
        let sf = self.data.discriminant();
        w.write_size(dims)?;
        w.write_data(dims as u16)?;
        w.write_data(self.features)?;
        w.write_data(self.element_size)?;
        w.write_data(self.locks)?;
        w.write_data(sf)?;
        w.write_union(&self.data, sf)?;
        encode_elements(w, &self.bounds)
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_union_deferred(&self.data)
    }
}

impl NdrDecode for SafeArray {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let max_count = r.read_size()?;
        let dims: u16 = r.read_data()?;
        if max_count != usize::from(dims) {
            return Err(NdrError::ConformanceMismatch {
                max_count: max_count as u32,
                actual_count: u32::from(dims),
            });
        }
        check_range("cDims", usize::from(dims), 1..=u16::MAX as usize)?;
        let features = r.read_data()?;
        let element_size = r.read_data()?;
        let locks = r.read_data()?;
        let sf: u32 = r.read_data()?;
        let data = r.read_union(Some(sf))?;
        let bounds = decode_elements(r, "safearray bounds", usize::from(dims))?;
        Ok(Self {
            features,
            element_size,
            locks,
            data,
            bounds,
        })
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        r.read_union_deferred(&mut self.data)?;
        self.check_element_count()
    }
}
