//! Pointer Tests - Referent IDs, Aliasing and Null Handling
//!
//! These tests exercise the three pointer kinds:
//! - Full pointers sharing one referent (one body on the wire)
//! - Reference pointers that must never be null
//! - Unique pointers: null, empty and nested bodies
//! - Referent ID allocation order and the nesting limit

mod common;

use std::sync::Arc;

use common::*;
use msrpc_ndr::{
    ndr_struct, FullPtr, NdrContext, NdrDecode, NdrEncode, NdrError, NdrReader, NdrString,
    NdrType, NdrWString, NdrWriter, PointerKind, RefPtr, Result, UniquePtr, FIRST_REFERENT_ID,
    REFERENT_ID_STEP,
};

ndr_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Aliased {
        primary: FullPtr<NdrWString>,
        secondary: FullPtr<NdrWString>,
    }
}

ndr_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Triple {
        a: UniquePtr<u32>,
        b: UniquePtr<u32>,
        c: UniquePtr<u32>,
    }
}

ndr_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Required {
        value: RefPtr<u32>,
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Chain(UniquePtr<Chain>);

impl NdrType for Chain {
    const ALIGN: usize = 4;
}

impl NdrEncode for Chain {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        self.0.ndr_encode(w)
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        self.0.ndr_encode_deferred(w)
    }
}

impl NdrDecode for Chain {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        Ok(Self(UniquePtr::ndr_decode(r)?))
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        self.0.ndr_decode_deferred(r)
    }
}

fn chain(depth: usize) -> Chain {
    (0..depth).fold(Chain::default(), |inner, _| Chain(UniquePtr::new(inner)))
}

#[test]
fn test_shared_full_pointer_single_body() {
    init_tracing();
    let shared = Arc::new(NdrWString::new("hi"));
    let value = Aliased {
        primary: FullPtr::from_arc(shared.clone()),
        secondary: FullPtr::from_arc(shared),
    };
    let data = encode(NdrContext::new(), &value);

    assert_eq!(u32_at(&data, 0), FIRST_REFERENT_ID);
    assert_eq!(u32_at(&data, 4), FIRST_REFERENT_ID);
    // one string body: 12-byte header and three UTF-16 units
    assert_eq!(data.len(), 8 + 12 + 6);

    let decoded: Aliased = decode(NdrContext::new(), data).unwrap();
    let primary = decoded.primary.get().unwrap();
    let secondary = decoded.secondary.get().unwrap();
    assert!(Arc::ptr_eq(primary, secondary));
    assert_eq!(primary.as_str(), "hi");
}

#[test]
fn test_distinct_full_pointers_two_bodies() {
    init_tracing();
    let value = Aliased {
        primary: FullPtr::new(NdrWString::new("hi")),
        secondary: FullPtr::new(NdrWString::new("hi")),
    };
    let data = roundtrip(NdrContext::new(), &value);
    assert_eq!(u32_at(&data, 4), FIRST_REFERENT_ID + REFERENT_ID_STEP);
    assert_eq!(data.len(), 8 + 2 * 18 + 2);

    let decoded: Aliased = decode(NdrContext::new(), data).unwrap();
    assert!(!Arc::ptr_eq(
        decoded.primary.get().unwrap(),
        decoded.secondary.get().unwrap()
    ));
}

#[test]
fn test_null_ref_pointer_rejected() {
    init_tracing();
    let mut w = NdrWriter::new(NdrContext::new());
    assert!(matches!(
        w.write_pointer_token(PointerKind::Ref, false),
        Err(NdrError::NullRefPointer)
    ));

    assert!(matches!(
        decode::<Required>(NdrContext::new(), vec![0u8, 0, 0, 0]),
        Err(NdrError::NullRefPointer)
    ));

    let value = Required {
        value: RefPtr::new(5),
    };
    let data = roundtrip(NdrContext::new(), &value);
    assert_eq!(&data[..], &[0x00, 0x00, 0x02, 0x00, 5, 0, 0, 0]);
}

#[test]
fn test_referent_ids_in_order() {
    init_tracing();
    let value = Triple {
        a: UniquePtr::new(1),
        b: UniquePtr::null(),
        c: UniquePtr::new(3),
    };
    let data = roundtrip(NdrContext::new(), &value);
    assert_eq!(u32_at(&data, 0), FIRST_REFERENT_ID);
    assert_eq!(u32_at(&data, 4), 0);
    assert_eq!(u32_at(&data, 8), FIRST_REFERENT_ID + REFERENT_ID_STEP);
    // bodies follow in pointer order
    assert_eq!(u32_at(&data, 12), 1);
    assert_eq!(u32_at(&data, 16), 3);
}

#[test]
fn test_null_versus_empty_string() {
    init_tracing();
    let null = encode(NdrContext::new(), &UniquePtr::<NdrString>::null());
    assert_eq!(&null[..], &[0, 0, 0, 0]);

    let empty = roundtrip(NdrContext::new(), &UniquePtr::new(NdrString::new("")));
    // referent ID, then a one-unit string holding the terminator
    assert_eq!(&empty[4..16], &[1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0]);
    assert_eq!(empty[16], 0);
}

#[test]
fn test_nesting_limit() {
    init_tracing();
    let ctx = NdrContext::new().with_max_depth(4);
    roundtrip(ctx, &chain(4));

    let mut w = NdrWriter::new(ctx);
    assert!(matches!(
        w.write_param(&chain(5)),
        Err(NdrError::DepthExceeded(4))
    ));

    let data = encode(NdrContext::new(), &chain(5));
    assert!(matches!(
        decode::<Chain>(ctx, data),
        Err(NdrError::DepthExceeded(4))
    ));
}
