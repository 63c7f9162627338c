//! NSPI data structures (MS-OXNSPI 2.2)

use msrpc_ndr::{
    check_range, decode_elements, decode_elements_deferred, encode_elements,
    encode_elements_deferred, ndr_struct, CountedArray, FixedArray, NdrDecode, NdrEncode,
    NdrError, NdrReader, NdrString, NdrType, NdrUnion, NdrWString, NdrWriter, Reserved, Result,
    UniquePtr,
};

/// Upper bound of most NSPI counts.
pub const MAX_VALUES: usize = 100_000;
/// Upper bound of `Binary_r.cb`.
pub const MAX_BINARY: usize = 2_097_152;

ndr_struct! {
    /// Table position and sort state (`STAT`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Stat {
        pub sort_type: u32,
        pub container_id: u32,
        pub current_rec: u32,
        pub delta: i32,
        pub num_pos: u32,
        pub total_recs: u32,
        pub code_page: u32,
        pub template_locale: u32,
        pub sort_locale: u32,
    }
}

ndr_struct! {
    /// 16-byte address book object identifier (`FlatUID_r`)
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct FlatUid {
        pub ab: FixedArray<u8, 16>,
    }
}

impl FlatUid {
    pub fn new(ab: [u8; 16]) -> Self {
        Self {
            ab: FixedArray::new(ab),
        }
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.ab.elements
    }
}

ndr_struct! {
    /// 100-nanosecond intervals since 1601-01-01 UTC
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FileTime {
        pub low: u32,
        pub high: u32,
    }
}

impl FileTime {
    pub fn from_u64(ticks: u64) -> Self {
        Self {
            low: ticks as u32,
            high: (ticks >> 32) as u32,
        }
    }

    pub fn as_u64(&self) -> u64 {
        (u64::from(self.high) << 32) | u64::from(self.low)
    }
}

/// `PropertyTagArray_r`
///
/// ```text
/// max_count: u32      # cValues + 1, hoisted
/// cValues: u32        # 0..=100001
/// offset: u32         # 0
/// actual_count: u32   # cValues
/// aulPropTag[cValues]: u32
/// ```
///
/// Also carries lists of MIds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyTagArray {
    pub tags: Vec<u32>,
}

impl PropertyTagArray {
    const MAX_TAGS: usize = MAX_VALUES + 1;

    pub fn new(tags: Vec<u32>) -> Self {
        Self { tags }
    }
}

impl From<Vec<u32>> for PropertyTagArray {
    fn from(tags: Vec<u32>) -> Self {
        Self::new(tags)
    }
}

impl NdrType for PropertyTagArray {
    const ALIGN: usize = 4;
}

impl NdrEncode for PropertyTagArray {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        let count = self.tags.len();
        check_range("cValues", count, 0..=Self::MAX_TAGS)?;
        w.write_size(count + 1)?;
        w.write_size(count)?;
        w.write_data(0u32)?;
        w.write_size(count)?;
        encode_elements(w, &self.tags)
    }
}

impl NdrDecode for PropertyTagArray {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let max_count = r.read_size()?;
        let count = r.read_size()?;
        check_range("cValues", count, 0..=Self::MAX_TAGS)?;
        if max_count != count + 1 {
            return Err(NdrError::ConformanceMismatch {
                max_count: max_count as u32,
                actual_count: count as u32,
            });
        }
        let offset: u32 = r.read_data()?;
        if offset != 0 {
            return Err(NdrError::NonZeroOffset(offset));
        }
        let actual_count = r.read_size()?;
        if actual_count != count {
            return Err(NdrError::ArraySizeMismatch {
                expected: count,
                got: actual_count,
            });
        }
        Ok(Self {
            tags: decode_elements(r, "property tags", count)?,
        })
    }
}

/// Conformant struct of string pointers (`StringsArray_r`, `WStringsArray_r`)
///
/// `{ [range(1,100000)] DWORD Count; [string, size_is(Count)] S* Strings[]; }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameArray<S> {
    pub strings: Vec<UniquePtr<S>>,
}

/// Narrow names, as passed to `NspiDNToMId`.
pub type StringsArray = NameArray<NdrString>;
/// UTF-16 names, as passed to `NspiResolveNamesW`.
pub type WStringsArray = NameArray<NdrWString>;

impl<S> NameArray<S> {
    pub fn new(strings: Vec<UniquePtr<S>>) -> Self {
        Self { strings }
    }
}

impl<S, T: Into<S>> FromIterator<T> for NameArray<S> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|s| UniquePtr::new(s.into())).collect())
    }
}

impl<S> NdrType for NameArray<S> {
    const ALIGN: usize = 4;
}

impl<S: NdrEncode> NdrEncode for NameArray<S> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        let count = self.strings.len();
        check_range("Count", count, 1..=MAX_VALUES)?;
        w.write_size(count)?;
        w.write_size(count)?;
        encode_elements(w, &self.strings)
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        encode_elements_deferred(w, &self.strings)
    }
}

impl<S: NdrDecode + Default> NdrDecode for NameArray<S> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let max_count = r.read_size()?;
        let count = r.read_size()?;
        check_range("Count", count, 1..=MAX_VALUES)?;
        if max_count != count {
            return Err(NdrError::ConformanceMismatch {
                max_count: max_count as u32,
                actual_count: count as u32,
            });
        }
        Ok(Self {
            strings: decode_elements(r, "string pointers", count)?,
        })
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        decode_elements_deferred(r, &mut self.strings)
    }
}

/// `Binary_r`: `{ cb; [size_is(cb)] BYTE* lpb; }`
pub type Binary = CountedArray<u8, MAX_BINARY>;
pub type ShortArray = CountedArray<i16, MAX_VALUES>;
pub type LongArray = CountedArray<i32, MAX_VALUES>;
pub type StringArray = CountedArray<UniquePtr<NdrString>, MAX_VALUES>;
pub type BinaryArray = CountedArray<Binary, MAX_VALUES>;
pub type FlatUidArray = CountedArray<UniquePtr<FlatUid>, MAX_VALUES>;
pub type WStringArray = CountedArray<UniquePtr<NdrWString>, MAX_VALUES>;
pub type DateTimeArray = CountedArray<FileTime, MAX_VALUES>;

/// Property types (low word of a property tag) that select a value arm.
pub mod prop_type {
    pub const NULL: i32 = 0x0001;
    pub const INTEGER16: i32 = 0x0002;
    pub const INTEGER32: i32 = 0x0003;
    pub const ERROR_CODE: i32 = 0x000A;
    pub const BOOLEAN: i32 = 0x000B;
    pub const EMBEDDED_TABLE: i32 = 0x000D;
    pub const STRING8: i32 = 0x001E;
    pub const UNICODE: i32 = 0x001F;
    pub const TIME: i32 = 0x0040;
    pub const GUID: i32 = 0x0048;
    pub const BINARY: i32 = 0x0102;
    pub const MULTIPLE_INTEGER16: i32 = 0x1002;
    pub const MULTIPLE_INTEGER32: i32 = 0x1003;
    pub const MULTIPLE_STRING8: i32 = 0x101E;
    pub const MULTIPLE_UNICODE: i32 = 0x101F;
    pub const MULTIPLE_TIME: i32 = 0x1040;
    pub const MULTIPLE_GUID: i32 = 0x1048;
    pub const MULTIPLE_BINARY: i32 = 0x1102;
}

/// Property value (`PROP_VAL_UNION`)
///
/// `PtypNull` and `PtypEmbeddedTable` share the [`PropValue::Reserved`] arm;
/// it reports `PtypNull` as its canonical label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    Short(i16),
    Long(i32),
    Boolean(u16),
    String8(UniquePtr<NdrString>),
    Binary(Binary),
    Unicode(UniquePtr<NdrWString>),
    Guid(UniquePtr<FlatUid>),
    FileTime(FileTime),
    Error(i32),
    MultiShort(ShortArray),
    MultiLong(LongArray),
    MultiString8(StringArray),
    MultiBinary(BinaryArray),
    MultiGuid(FlatUidArray),
    MultiUnicode(WStringArray),
    MultiFileTime(DateTimeArray),
    Reserved(i32),
}

impl NdrUnion for PropValue {
    type Discriminant = i32;
    const ARM_ALIGN: usize = 4;

    fn discriminant(&self) -> i32 {
        use prop_type::*;
        match self {
            PropValue::Short(_) => INTEGER16,
            PropValue::Long(_) => INTEGER32,
            PropValue::Boolean(_) => BOOLEAN,
            PropValue::String8(_) => STRING8,
            PropValue::Binary(_) => BINARY,
            PropValue::Unicode(_) => UNICODE,
            PropValue::Guid(_) => GUID,
            PropValue::FileTime(_) => TIME,
            PropValue::Error(_) => ERROR_CODE,
            PropValue::MultiShort(_) => MULTIPLE_INTEGER16,
            PropValue::MultiLong(_) => MULTIPLE_INTEGER32,
            PropValue::MultiString8(_) => MULTIPLE_STRING8,
            PropValue::MultiBinary(_) => MULTIPLE_BINARY,
            PropValue::MultiGuid(_) => MULTIPLE_GUID,
            PropValue::MultiUnicode(_) => MULTIPLE_UNICODE,
            PropValue::MultiFileTime(_) => MULTIPLE_TIME,
            PropValue::Reserved(_) => NULL,
        }
    }

    fn accepts(&self, switch: i32) -> bool {
        match self {
            PropValue::Reserved(_) => matches!(switch, prop_type::NULL | prop_type::EMBEDDED_TABLE),
            _ => self.discriminant() == switch,
        }
    }

    fn encode_arm(&self, w: &mut NdrWriter) -> Result<()> {
        match self {
            PropValue::Short(v) => v.ndr_encode(w),
            PropValue::Long(v) | PropValue::Error(v) | PropValue::Reserved(v) => v.ndr_encode(w),
            PropValue::Boolean(v) => v.ndr_encode(w),
            PropValue::String8(v) => v.ndr_encode(w),
            PropValue::Binary(v) => v.ndr_encode(w),
            PropValue::Unicode(v) => v.ndr_encode(w),
            PropValue::Guid(v) => v.ndr_encode(w),
            PropValue::FileTime(v) => v.ndr_encode(w),
            PropValue::MultiShort(v) => v.ndr_encode(w),
            PropValue::MultiLong(v) => v.ndr_encode(w),
            PropValue::MultiString8(v) => v.ndr_encode(w),
            PropValue::MultiBinary(v) => v.ndr_encode(w),
            PropValue::MultiGuid(v) => v.ndr_encode(w),
            PropValue::MultiUnicode(v) => v.ndr_encode(w),
            PropValue::MultiFileTime(v) => v.ndr_encode(w),
        }
    }

    fn encode_arm_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        match self {
            PropValue::String8(v) => v.ndr_encode_deferred(w),
            PropValue::Binary(v) => v.ndr_encode_deferred(w),
            PropValue::Unicode(v) => v.ndr_encode_deferred(w),
            PropValue::Guid(v) => v.ndr_encode_deferred(w),
            PropValue::MultiShort(v) => v.ndr_encode_deferred(w),
            PropValue::MultiLong(v) => v.ndr_encode_deferred(w),
            PropValue::MultiString8(v) => v.ndr_encode_deferred(w),
            PropValue::MultiBinary(v) => v.ndr_encode_deferred(w),
            PropValue::MultiGuid(v) => v.ndr_encode_deferred(w),
            PropValue::MultiUnicode(v) => v.ndr_encode_deferred(w),
            PropValue::MultiFileTime(v) => v.ndr_encode_deferred(w),
            PropValue::Short(_)
            | PropValue::Long(_)
            | PropValue::Boolean(_)
            | PropValue::FileTime(_)
            | PropValue::Error(_)
            | PropValue::Reserved(_) => Ok(()),
        }
    }

    fn decode_arm(switch: i32, r: &mut NdrReader) -> Result<Self> {
        use prop_type::*;
        Ok(match switch {
            INTEGER16 => PropValue::Short(r.read_data()?),
            INTEGER32 => PropValue::Long(r.read_data()?),
            BOOLEAN => PropValue::Boolean(r.read_data()?),
            STRING8 => PropValue::String8(NdrDecode::ndr_decode(r)?),
            BINARY => PropValue::Binary(NdrDecode::ndr_decode(r)?),
            UNICODE => PropValue::Unicode(NdrDecode::ndr_decode(r)?),
            GUID => PropValue::Guid(NdrDecode::ndr_decode(r)?),
            TIME => PropValue::FileTime(NdrDecode::ndr_decode(r)?),
            ERROR_CODE => PropValue::Error(r.read_data()?),
            MULTIPLE_INTEGER16 => PropValue::MultiShort(NdrDecode::ndr_decode(r)?),
            MULTIPLE_INTEGER32 => PropValue::MultiLong(NdrDecode::ndr_decode(r)?),
            MULTIPLE_STRING8 => PropValue::MultiString8(NdrDecode::ndr_decode(r)?),
            MULTIPLE_BINARY => PropValue::MultiBinary(NdrDecode::ndr_decode(r)?),
            MULTIPLE_GUID => PropValue::MultiGuid(NdrDecode::ndr_decode(r)?),
            MULTIPLE_UNICODE => PropValue::MultiUnicode(NdrDecode::ndr_decode(r)?),
            MULTIPLE_TIME => PropValue::MultiFileTime(NdrDecode::ndr_decode(r)?),
            NULL | EMBEDDED_TABLE => PropValue::Reserved(r.read_data()?),
            other => return Err(NdrError::UnknownDiscriminant(other.into())),
        })
    }

    fn decode_arm_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        match self {
            PropValue::String8(v) => v.ndr_decode_deferred(r),
            PropValue::Binary(v) => v.ndr_decode_deferred(r),
            PropValue::Unicode(v) => v.ndr_decode_deferred(r),
            PropValue::Guid(v) => v.ndr_decode_deferred(r),
            PropValue::MultiShort(v) => v.ndr_decode_deferred(r),
            PropValue::MultiLong(v) => v.ndr_decode_deferred(r),
            PropValue::MultiString8(v) => v.ndr_decode_deferred(r),
            PropValue::MultiBinary(v) => v.ndr_decode_deferred(r),
            PropValue::MultiGuid(v) => v.ndr_decode_deferred(r),
            PropValue::MultiUnicode(v) => v.ndr_decode_deferred(r),
            PropValue::MultiFileTime(v) => v.ndr_decode_deferred(r),
            PropValue::Short(_)
            | PropValue::Long(_)
            | PropValue::Boolean(_)
            | PropValue::FileTime(_)
            | PropValue::Error(_)
            | PropValue::Reserved(_) => Ok(()),
        }
    }
}

/// `PropertyValue_r`: a tag and the value arm its property type selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValue {
    pub prop_tag: u32,
    pub reserved: Reserved<u32>,
    pub value: PropValue,
}

/// A `PtypNull` value.
impl Default for PropertyValue {
    fn default() -> Self {
        Self::new(prop_type::NULL as u32, PropValue::Reserved(0))
    }
}

impl PropertyValue {
    pub fn new(prop_tag: u32, value: PropValue) -> Self {
        Self {
            prop_tag,
            reserved: Reserved::new(),
            value,
        }
    }

    /// Union selector: the property type in the low word of the tag.
    pub fn prop_type(&self) -> i32 {
        (self.prop_tag & 0xFFFF) as i32
    }
}

impl NdrType for PropertyValue {
    const ALIGN: usize = 4;
}

impl NdrEncode for PropertyValue {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_align(Self::ALIGN)?;
        w.write_data(self.prop_tag)?;
        self.reserved.ndr_encode(w)?;
        w.write_union(&self.value, self.prop_type())
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_union_deferred(&self.value)
    }
}

impl NdrDecode for PropertyValue {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        r.read_align(Self::ALIGN)?;
        let prop_tag: u32 = r.read_data()?;
        let reserved = Reserved::ndr_decode(r)?;
        let value = r.read_union(Some((prop_tag & 0xFFFF) as i32))?;
        Ok(Self {
            prop_tag,
            reserved,
            value,
        })
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        r.read_union_deferred(&mut self.value)
    }
}

ndr_struct! {
    /// One address book row (`PropertyRow_r`)
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct PropertyRow {
        pub reserved: Reserved<u32>,
        pub props: CountedArray<PropertyValue, MAX_VALUES>,
    }
}

impl PropertyRow {
    pub fn new(props: Vec<PropertyValue>) -> Self {
        Self {
            reserved: Reserved::new(),
            props: CountedArray::new(props),
        }
    }

    /// First value carrying `prop_tag`.
    pub fn find(&self, prop_tag: u32) -> Option<&PropValue> {
        self.props
            .values()?
            .iter()
            .find(|p| p.prop_tag == prop_tag)
            .map(|p| &p.value)
    }
}

/// Conformant struct `{ [range(0,100000)] DWORD count; [size_is(count)] T items[]; }`,
/// with `max_count` hoisted ahead of the count.
macro_rules! conformant_set {
    (
        $(#[$meta:meta])*
        pub struct $name:ident { pub $field:ident: Vec<$elem:ty> }
        count = $count:literal, what = $what:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Default)]
        pub struct $name {
            pub $field: Vec<$elem>,
        }

        impl $name {
            pub fn new($field: Vec<$elem>) -> Self {
                Self { $field }
            }
        }

        impl NdrType for $name {
            const ALIGN: usize = 4;
        }

        impl NdrEncode for $name {
            fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
                let count = self.$field.len();
                check_range($count, count, 0..=MAX_VALUES)?;
                w.write_size(count)?;
                w.write_size(count)?;
                encode_elements(w, &self.$field)
            }

            fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
                encode_elements_deferred(w, &self.$field)
            }
        }

        impl NdrDecode for $name {
            fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
                let max_count = r.read_size()?;
                let count = r.read_size()?;
                check_range($count, count, 0..=MAX_VALUES)?;
                if max_count != count {
                    return Err(NdrError::ConformanceMismatch {
                        max_count: max_count as u32,
                        actual_count: count as u32,
                    });
                }
                Ok(Self {
                    $field: decode_elements(r, $what, count)?,
                })
            }

            fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
                decode_elements_deferred(r, &mut self.$field)
            }
        }
    };
}

conformant_set! {
    /// `PropertyRowSet_r`
    pub struct PropertyRowSet { pub rows: Vec<PropertyRow> }
    count = "cRows", what = "rows"
}

ndr_struct! {
    /// Named property (`PropertyName_r`)
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct PropertyName {
        pub guid: UniquePtr<FlatUid>,
        pub reserved: Reserved<u32>,
        pub id: i32,
    }
}

impl PropertyName {
    pub fn new(guid: FlatUid, id: i32) -> Self {
        Self {
            guid: UniquePtr::new(guid),
            reserved: Reserved::new(),
            id,
        }
    }
}

conformant_set! {
    /// `PropertyNameSet_r`: names returned by `NspiGetNamesFromIDs`
    pub struct PropertyNameSet { pub names: Vec<PropertyName> }
    count = "cNames", what = "property names"
}

/// The `cPropNames` and `[size_is(cPropNames)] PropertyName_r** pNames`
/// parameters of `NspiGetIDsFromNames`, marshalled together.
///
/// ```text
/// cPropNames: u32             # 0..=100000
/// max_count: u32              # cPropNames
/// pNames[cPropNames]: pointer # unique, bodies deferred
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyNameArray {
    pub names: Vec<UniquePtr<PropertyName>>,
}

impl PropertyNameArray {
    pub fn new(names: Vec<UniquePtr<PropertyName>>) -> Self {
        Self { names }
    }
}

impl FromIterator<PropertyName> for PropertyNameArray {
    fn from_iter<I: IntoIterator<Item = PropertyName>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(UniquePtr::new).collect())
    }
}

impl NdrType for PropertyNameArray {
    const ALIGN: usize = 4;
}

impl NdrEncode for PropertyNameArray {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        let count = self.names.len();
        check_range("cPropNames", count, 0..=MAX_VALUES)?;
        w.write_size(count)?;
        w.write_size(count)?;
        encode_elements(w, &self.names)
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        encode_elements_deferred(w, &self.names)
    }
}

impl NdrDecode for PropertyNameArray {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let count = r.read_size()?;
        check_range("cPropNames", count, 0..=MAX_VALUES)?;
        let max_count = r.read_size()?;
        if max_count != count {
            return Err(NdrError::ConformanceMismatch {
                max_count: max_count as u32,
                actual_count: count as u32,
            });
        }
        Ok(Self {
            names: decode_elements(r, "property name pointers", count)?,
        })
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        decode_elements_deferred(r, &mut self.names)
    }
}
