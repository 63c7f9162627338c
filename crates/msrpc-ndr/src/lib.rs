//! NDR (Network Data Representation) runtime library
//!
//! This crate implements the NDR 2.0 transfer syntax used by MSRPC and DCOM
//! stubs, as specified in DCE 1.1 RPC and MS-RPCE.
//!
//! # NDR Wire Format
//!
//! - Primitives align to their natural size (1, 2, 4, or 8 bytes), measured
//!   from the start of the stub data
//! - Structures align to their largest member
//! - Embedded pointers are written as referent IDs; the pointed-to data is
//!   deferred until the enclosing top-level parameter is complete
//! - Conformant data (arrays with runtime-determined size) comes at the end,
//!   with its `max_count` hoisted to the front of the enclosing structure
//! - Strings are conformant varying arrays with a NUL terminator
//! - Unions are a discriminant followed by exactly one arm
//!
//! # Example
//!
//! ```
//! use msrpc_ndr::{NdrContext, NdrReader, NdrWriter, NdrWString, UniquePtr};
//!
//! let ctx = NdrContext::new();
//! let mut w = NdrWriter::new(ctx);
//! w.write_param(&42u32).unwrap();
//! w.write_param(&UniquePtr::new(NdrWString::new("hi"))).unwrap();
//!
//! let mut r = NdrReader::new(ctx, w.into_bytes());
//! assert_eq!(r.read_param::<u32>().unwrap(), 42);
//! let name: UniquePtr<NdrWString> = r.read_param().unwrap();
//! assert_eq!(name.as_ref().unwrap().as_str(), "hi");
//! ```

mod arrays;
mod context;
mod decode;
mod encode;
mod error;
mod handle;
mod operation;
mod pointers;
mod primitives;
mod reader;
mod referents;
mod schema;
mod strings;
mod unions;
mod writer;

pub use arrays::{
    decode_elements, decode_elements_deferred, encode_elements, encode_elements_deferred,
    ConformantArray, ConformantVaryingArray, CountedArray, FixedArray, VaryingArray,
};
pub use context::{
    NdrContext, ReservedPolicy, MAX_NDR_ALLOCATION_SIZE, MAX_NDR_ARRAY_ELEMENTS, MAX_NDR_DEPTH,
    NATURAL_ALIGNMENT, NDR20_WORD_SIZE,
};
pub use decode::NdrDecode;
pub use encode::{NdrEncode, NdrType};
pub use error::{check_range, NdrError, Result};
pub use handle::ContextHandle;
pub use operation::{marshal, unmarshal, InterfaceInfo, NdrMessage, Operation};
pub use pointers::{FullPtr, PointerKind, RefPtr, UniquePtr};
pub use primitives::{ErrorStatusT, NdrPrimitive, NdrUuid, Reserved};
pub use reader::NdrReader;
pub use referents::{ReferentCache, ReferentTable, FIRST_REFERENT_ID, REFERENT_ID_STEP};
pub use strings::{NdrString, NdrWString};
pub use unions::{NdrUnion, Switched};
pub use writer::NdrWriter;

/// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};
