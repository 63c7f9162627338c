//! MSRPC interface bindings
//!
//! Request and response types for DCOM and MSRPC interfaces, built on the
//! `msrpc-ndr` codec. Each operation is a unit type implementing
//! [`msrpc_ndr::Operation`]; marshalling a request on the client and
//! unmarshalling it on the server use the same type.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  iisa                            │  nspi                 │
//! │  IAppHostConfigException         │  NspiBind, QueryRows, │
//! │  IAppHostPropertyException       │  ResolveNamesW, ...   │
//! ├──────────────────────────────────┤                       │
//! │  dcom (ORPCTHIS/ORPCTHAT)        │                       │
//! │  oaut (BSTR, VARIANT, SAFEARRAY) │                       │
//! ├──────────────────────────────────────────────────────────┤
//! │                 NDR 2.0 (msrpc-ndr crate)                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`dcom`]: ORPC envelope types
//! - [`oaut`]: OLE Automation BSTR, VARIANT and SAFEARRAY
//! - [`iisa`]: IIS application host exception interfaces
//! - [`nspi`]: Exchange address book (NSPI) interface
//!
//! # Example
//!
//! ```
//! use msrpc::iisa::{FileName, OrpcRequest};
//! use msrpc::dcom::OrpcThis;
//! use msrpc_ndr::{NdrContext, NdrUuid, Operation};
//!
//! let ctx = NdrContext::new();
//! let request = OrpcRequest { this: OrpcThis::new(NdrUuid::NIL) };
//! let stub = FileName::marshal_request(&ctx, &request).unwrap();
//! assert_eq!(FileName::unmarshal_request(&ctx, stub).unwrap(), request);
//! ```

pub mod dcom;
pub mod error;
pub mod iisa;
pub mod nspi;
pub mod oaut;

pub use error::{check_hresult, hresult, operation_name, MsrpcError, Result};

use msrpc_ndr::InterfaceInfo;

/// Every interface with bindings in this crate.
pub const INTERFACES: &[InterfaceInfo] = &[
    iisa::CONFIG_EXCEPTION,
    iisa::PROPERTY_EXCEPTION,
    nspi::NSPI,
];

/// Find an interface by name.
pub fn interface(name: &str) -> Option<&'static InterfaceInfo> {
    INTERFACES.iter().find(|i| i.name.eq_ignore_ascii_case(name))
}
