//! Wire Format Tests - NDR Layout Scenarios
//!
//! These tests pin down byte-level layouts across the codec:
//! - Unions whose arms carry deferred pointers
//! - Conformant varying arrays after misaligned data
//! - Natural alignment measured from the stub start
//! - Big-endian stub data
//! - Claimed sizes that exceed the input

mod common;

use common::*;
use msrpc::nspi::{PropertyRowSet, Stat};
use msrpc_ndr::{
    ndr_struct, ConformantArray, ConformantVaryingArray, NdrContext, NdrError, NdrReader,
    NdrUnion, NdrWString, NdrWriter, Result, Switched, UniquePtr,
};

ndr_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Contact {
        id: i32,
        name: UniquePtr<NdrWString>,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    Code(u16),
    Contact(Contact),
}

impl NdrUnion for Payload {
    type Discriminant = u32;
    const ARM_ALIGN: usize = 4;

    fn discriminant(&self) -> u32 {
        match self {
            Payload::Code(_) => 1,
            Payload::Contact(_) => 3,
        }
    }

    fn encode_arm(&self, w: &mut NdrWriter) -> Result<()> {
        match self {
            Payload::Code(v) => w.write_data(*v),
            Payload::Contact(c) => msrpc_ndr::NdrEncode::ndr_encode(c, w),
        }
    }

    fn encode_arm_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        match self {
            Payload::Code(_) => Ok(()),
            Payload::Contact(c) => msrpc_ndr::NdrEncode::ndr_encode_deferred(c, w),
        }
    }

    fn decode_arm(switch: u32, r: &mut NdrReader) -> Result<Self> {
        match switch {
            1 => Ok(Payload::Code(r.read_data()?)),
            3 => Ok(Payload::Contact(msrpc_ndr::NdrDecode::ndr_decode(r)?)),
            other => Err(NdrError::UnknownDiscriminant(other.into())),
        }
    }

    fn decode_arm_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        match self {
            Payload::Code(_) => Ok(()),
            Payload::Contact(c) => msrpc_ndr::NdrDecode::ndr_decode_deferred(c, r),
        }
    }
}

#[test]
fn test_union_arm_with_deferred_string() {
    init_tracing();
    let value = Switched(Payload::Contact(Contact {
        id: 7,
        name: UniquePtr::new(NdrWString::new("ab")),
    }));
    let data = roundtrip(NdrContext::new(), &value);

    assert_eq!(
        &data[..],
        &[
            3, 0, 0, 0, // discriminant
            7, 0, 0, 0, // id
            0x00, 0x00, 0x02, 0x00, // referent ID
            3, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, // max, offset, actual
            b'a', 0, b'b', 0, 0, 0,
        ][..]
    );
}

#[test]
fn test_unknown_union_discriminant() {
    init_tracing();
    let data = vec![9u8, 0, 0, 0, 0, 0, 0, 0];
    assert!(matches!(
        decode::<Switched<Payload>>(NdrContext::new(), data),
        Err(NdrError::UnknownDiscriminant(9))
    ));
}

#[test]
fn test_conformant_varying_after_byte() {
    init_tracing();
    let ctx = NdrContext::new();
    let mut w = NdrWriter::new(ctx);
    w.write_param(&0xAAu8).unwrap();
    w.write_param(&ConformantVaryingArray::with_max(5, vec![10u32, 20, 30]))
        .unwrap();
    let data = w.into_bytes();

    // three pad bytes, then max_count 5, offset 0, actual_count 3
    assert_eq!(&data[1..4], &[0, 0, 0]);
    assert_eq!(u32_at(&data, 4), 5);
    assert_eq!(u32_at(&data, 8), 0);
    assert_eq!(u32_at(&data, 12), 3);
    assert_eq!(u32_at(&data, 24), 30);
    assert_eq!(data.len(), 28);

    let mut r = NdrReader::new(ctx, data);
    assert_eq!(r.read_param::<u8>().unwrap(), 0xAA);
    let decoded: ConformantVaryingArray<u32> = r.read_param().unwrap();
    assert_eq!(decoded.max_count, 5);
    assert_eq!(decoded.elements, vec![10, 20, 30]);
}

#[test]
fn test_alignment_from_stub_start() {
    init_tracing();
    let mut w = NdrWriter::new(NdrContext::new());
    w.write_param(&1u8).unwrap();
    w.write_param(&2u16).unwrap();
    w.write_param(&3u64).unwrap();
    w.write_param(&Stat::default()).unwrap();
    // u8 at 0, u16 at 2, u64 at 8, STAT at 16
    assert_eq!(w.position(), 16 + 36);
    assert_eq!(w.as_slice()[2], 2);
    assert_eq!(w.as_slice()[8], 3);
}

#[test]
fn test_big_endian_stat() {
    init_tracing();
    let stat = Stat {
        container_id: 0x0102_0304,
        delta: -2,
        ..Default::default()
    };
    let data = roundtrip(NdrContext::big_endian(), &stat);
    assert_eq!(&data[4..8], &[1, 2, 3, 4]);
    assert_eq!(&data[12..16], &[0xFF, 0xFF, 0xFF, 0xFE]);

    // the same bytes read little-endian are a different value
    let misread: Stat = decode(NdrContext::new(), data).unwrap();
    assert_eq!(misread.container_id, 0x0403_0201);
}

#[test]
fn test_claimed_rows_exceed_input() {
    init_tracing();
    // max_count and cRows of 1000 with one row's worth of data
    let mut data = vec![0xE8u8, 0x03, 0, 0, 0xE8, 0x03, 0, 0];
    data.extend_from_slice(&[0; 12]);
    assert!(matches!(
        decode::<PropertyRowSet>(NdrContext::new(), data),
        Err(NdrError::BufferOverflow { what: "rows", claimed: 4000, remaining: 12 })
    ));
}

#[test]
fn test_element_limit_from_context() {
    init_tracing();
    let data = encode(NdrContext::new(), &ConformantArray::new(vec![1u8, 2, 3]));
    let strict = NdrContext::new().with_max_array_elements(2);
    assert!(matches!(
        decode::<ConformantArray<u8>>(strict, data.clone()),
        Err(NdrError::AllocationLimitExceeded { requested: 3, limit: 2 })
    ));
    assert!(decode::<ConformantArray<u8>>(NdrContext::new(), data).is_ok());
}

#[test]
fn test_truncated_input() {
    init_tracing();
    let data = encode(NdrContext::new(), &Stat::default());
    assert!(matches!(
        decode::<Stat>(NdrContext::new(), data.slice(..30)),
        Err(NdrError::BufferUnderflow { .. })
    ));
}
