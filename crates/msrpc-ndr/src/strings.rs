//! NDR string types
//!
//! `[string]` pointees are conformant varying arrays with a NUL terminator.
//!
//! Wire format:
//! ```text
//! max_count: u32    # Elements including NUL
//! offset: u32       # Always 0
//! actual_count: u32 # Elements including NUL
//! chars[actual_count]
//! ```
//!
//! Nothing follows the characters; the next field aligns itself.

use crate::{NdrDecode, NdrEncode, NdrError, NdrReader, NdrType, NdrWriter, Result};

fn write_string_header(w: &mut NdrWriter, max_count: usize, actual_count: usize) -> Result<()> {
    w.write_size(max_count)?;
    w.write_size(0)?;
    w.write_size(actual_count)
}

/// Read the header of a conformant varying string and validate the counts
/// against the remaining input. Returns `actual_count`.
fn read_string_header(r: &mut NdrReader, unit_size: usize) -> Result<usize> {
    let max_count = r.read_size()?;
    let offset = r.read_size()?;
    let actual_count = r.read_size()?;
    if offset != 0 {
        return Err(NdrError::NonZeroOffset(offset as u32));
    }
    if actual_count > max_count {
        return Err(NdrError::ConformanceMismatch {
            max_count: max_count as u32,
            actual_count: actual_count as u32,
        });
    }
    r.check_count("string", actual_count, unit_size)?;
    Ok(actual_count)
}

fn read_wide_units(r: &mut NdrReader, count: usize) -> Result<Vec<u16>> {
    let mut units = Vec::with_capacity(count);
    for _ in 0..count {
        units.push(r.read_data::<u16>()?);
    }
    while units.last() == Some(&0) {
        units.pop();
    }
    Ok(units)
}

fn decode_utf16(units: &[u16]) -> Result<String> {
    Ok(char::decode_utf16(units.iter().copied()).collect::<std::result::Result<String, _>>()?)
}

/// Narrow string (`[string] char*`)
///
/// Must hold UTF-8 on the wire; anything else fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NdrString(pub String);

impl NdrString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for NdrString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl NdrType for NdrString {
    const ALIGN: usize = 4;
}

impl NdrEncode for NdrString {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        let bytes = self.0.as_bytes();
        let terminated = bytes.last() == Some(&0);
        let count = if terminated { bytes.len() } else { bytes.len() + 1 };

        write_string_header(w, count, count)?;
        w.write_bytes(bytes);
        if !terminated {
            w.write_bytes(&[0]);
        }
        Ok(())
    }
}

impl NdrDecode for NdrString {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let count = read_string_header(r, 1)?;
        let mut bytes = r.read_bytes(count)?.to_vec();
        while bytes.last() == Some(&0) {
            bytes.pop();
        }
        Ok(Self(String::from_utf8(bytes)?))
    }
}

/// Wide string (`[string] wchar_t*`), UTF-16 code units on the wire
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NdrWString(pub String);

impl NdrWString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for NdrWString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl NdrType for NdrWString {
    const ALIGN: usize = 4;
}

impl NdrEncode for NdrWString {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        let mut units: Vec<u16> = self.0.encode_utf16().collect();
        if units.last() != Some(&0) {
            units.push(0);
        }

        write_string_header(w, units.len(), units.len())?;
        for unit in units {
            w.write_data(unit)?;
        }
        Ok(())
    }
}

impl NdrDecode for NdrWString {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let count = read_string_header(r, 2)?;
        let units = read_wide_units(r, count)?;
        Ok(Self(decode_utf16(&units)?))
    }
}
