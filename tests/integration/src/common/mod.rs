//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::fmt::Debug;
use std::sync::Once;

use bytes::Bytes;
use msrpc_ndr::{NdrContext, NdrDecode, NdrEncode, NdrReader, NdrWriter};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a test subscriber once per test binary. Honors `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Encode one top-level parameter.
pub fn encode<T: NdrEncode>(ctx: NdrContext, value: &T) -> Bytes {
    let mut w = NdrWriter::new(ctx);
    w.write_param(value).expect("encode");
    w.into_bytes()
}

/// Decode one top-level parameter that must consume all of `data`.
pub fn decode<T: NdrDecode>(ctx: NdrContext, data: impl Into<Bytes>) -> msrpc_ndr::Result<T> {
    let mut r = NdrReader::new(ctx, data);
    let value = r.read_param()?;
    assert_eq!(r.remaining(), 0, "trailing stub data");
    Ok(value)
}

/// Encode, decode and compare; returns the wire bytes.
pub fn roundtrip<T>(ctx: NdrContext, value: &T) -> Bytes
where
    T: NdrEncode + NdrDecode + PartialEq + Debug,
{
    let data = encode(ctx, value);
    let decoded: T = decode(ctx, data.clone()).expect("decode");
    assert_eq!(&decoded, value);
    data
}

/// Little-endian u32 at `offset`.
pub fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(data[offset..offset + 4].try_into().unwrap())
}
