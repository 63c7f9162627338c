//! ORPC (Object RPC) header types (MS-DCOM 2.2.13, 2.2.14)
//!
//! Every DCOM request begins with an [`OrpcThis`] parameter and every
//! response with an [`OrpcThat`]. Responses end with the HRESULT.

use msrpc_ndr::{
    check_range, ndr_struct, NdrDecode, NdrEncode, NdrError, NdrReader, NdrType, NdrUuid,
    NdrWriter, PointerKind, Reserved, Result, UniquePtr,
};

ndr_struct! {
    /// COM version structure (MS-DCOM 2.2.11)
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct ComVersion {
        /// Major version number
        pub major: u16,
        /// Minor version number
        pub minor: u16,
    }
}

impl ComVersion {
    /// DCOM version 5.1 (Windows 2000)
    pub const DCOM_5_1: Self = Self { major: 5, minor: 1 };
    /// DCOM version 5.7 (Windows 7)
    pub const DCOM_5_7: Self = Self { major: 5, minor: 7 };

    pub fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

/// Extension data is padded to a multiple of eight bytes on the wire.
fn padded_extent_size(size: usize) -> Result<usize> {
    size.checked_add(7)
        .map(|n| n & !7)
        .ok_or(NdrError::IntegerOverflow)
}

/// ORPC extension (MS-DCOM 2.2.21.2)
///
/// Conformant struct: `{ GUID id; unsigned long size; [size_is((size+7)&~7)] byte data[]; }`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OrpcExtent {
    /// Extension identifier
    pub id: NdrUuid,
    /// Extension data, without wire padding
    pub data: Vec<u8>,
}

impl OrpcExtent {
    pub fn new(id: NdrUuid, data: Vec<u8>) -> Self {
        Self { id, data }
    }
}

impl NdrType for OrpcExtent {
    const ALIGN: usize = 4;
}

impl NdrEncode for OrpcExtent {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        let padded = padded_extent_size(self.data.len())?;
        w.write_size(padded)?;
        w.write_align(Self::ALIGN)?;
        self.id.ndr_encode(w)?;
        w.write_size(self.data.len())?;
        w.write_bytes(&self.data);
        w.write_bytes(&vec![0u8; padded - self.data.len()]);
        Ok(())
    }
}

impl NdrDecode for OrpcExtent {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let max_count = r.read_size()?;
        r.read_align(Self::ALIGN)?;
        let id = NdrUuid::ndr_decode(r)?;
        let size = r.read_size()?;
        let padded = padded_extent_size(size)?;
        if max_count != padded {
            return Err(NdrError::ConformanceMismatch {
                max_count: max_count as u32,
                actual_count: padded as u32,
            });
        }
        r.check_count("extension data", padded, 1)?;
        let mut data = r.read_bytes(padded)?.to_vec();
        data.truncate(size);
        Ok(Self { id, data })
    }
}

/// Round an extent count up to the even array size used on the wire.
fn padded_extent_count(count: usize) -> Result<usize> {
    count
        .checked_add(1)
        .map(|n| n & !1)
        .ok_or(NdrError::IntegerOverflow)
}

/// ORPC extent array (MS-DCOM 2.2.21.3)
///
/// `{ unsigned long size; unsigned long reserved; [size_is((size+1)&~1), unique] ORPC_EXTENT** extent; }`
///
/// The pointer array is padded to an even length with null entries; null
/// entries are dropped on decode.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OrpcExtentArray {
    pub extents: Vec<OrpcExtent>,
    pending: Option<usize>,
}

impl OrpcExtentArray {
    pub fn new(extents: Vec<OrpcExtent>) -> Self {
        Self {
            extents,
            pending: None,
        }
    }
}

impl NdrType for OrpcExtentArray {
    const ALIGN: usize = 4;
}

impl NdrEncode for OrpcExtentArray {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_size(self.extents.len())?;
        Reserved::<u32>::new().ndr_encode(w)?;
        w.write_pointer_token(PointerKind::Unique, !self.extents.is_empty())?;
        Ok(())
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        if self.extents.is_empty() {
            return Ok(());
        }
        let slots = padded_extent_count(self.extents.len())?;
        w.nested(|w| {
            w.write_size(slots)?;
            for slot in 0..slots {
                w.write_pointer_token(PointerKind::Unique, slot < self.extents.len())?;
            }
            for extent in &self.extents {
                w.write_referent(extent)?;
            }
            Ok(())
        })
    }
}

impl NdrDecode for OrpcExtentArray {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let size = r.read_size()?;
        Reserved::<u32>::ndr_decode(r)?;
        let id = r.read_pointer_token(PointerKind::Unique)?;
        Ok(Self {
            extents: Vec::new(),
            pending: (id != 0).then_some(size),
        })
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        let Some(size) = self.pending.take() else {
            return Ok(());
        };
        let extents = &mut self.extents;
        r.nested(|r| {
            let slots = r.read_size()?;
            let expected = padded_extent_count(size)?;
            if slots != expected {
                return Err(NdrError::ConformanceMismatch {
                    max_count: slots as u32,
                    actual_count: expected as u32,
                });
            }
            r.check_count("extent array", slots, 4)?;
            let mut present = Vec::with_capacity(slots);
            for _ in 0..slots {
                present.push(r.read_pointer_token(PointerKind::Unique)? != 0);
            }
            check_range("extent count", present.iter().filter(|p| **p).count(), 0..=size)?;
            for _ in present.into_iter().filter(|p| *p) {
                extents.push(r.read_referent()?);
            }
            Ok(())
        })
    }
}

ndr_struct! {
    /// ORPCTHIS structure (MS-DCOM 2.2.13.1)
    ///
    /// Sent with every ORPC request from client to server.
    #[derive(Clone, Debug, PartialEq, Default)]
    pub struct OrpcThis {
        /// COM version
        pub version: ComVersion,
        /// Flags
        pub flags: u32,
        /// Must be zero
        pub reserved1: Reserved<u32>,
        /// Causality ID (UUID identifying the call chain)
        pub cid: NdrUuid,
        /// Optional extension array
        pub extensions: UniquePtr<OrpcExtentArray>,
    }
}

impl OrpcThis {
    /// Create an ORPCTHIS for DCOM 5.7 with the given causality ID
    pub fn new(cid: NdrUuid) -> Self {
        Self {
            version: ComVersion::DCOM_5_7,
            flags: 0,
            reserved1: Reserved::new(),
            cid,
            extensions: UniquePtr::null(),
        }
    }
}

ndr_struct! {
    /// ORPCTHAT structure (MS-DCOM 2.2.13.2)
    ///
    /// Sent with every ORPC response from server to client.
    #[derive(Clone, Debug, PartialEq, Default)]
    pub struct OrpcThat {
        /// Flags
        pub flags: u32,
        /// Optional extension array
        pub extensions: UniquePtr<OrpcExtentArray>,
    }
}
