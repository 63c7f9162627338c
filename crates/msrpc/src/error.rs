//! Interface-level error types

use msrpc_ndr::{InterfaceInfo, NdrError};
use thiserror::Error;
use tracing::debug;

/// Result type for interface operations
pub type Result<T> = std::result::Result<T, MsrpcError>;

/// Errors raised while marshalling a call or interpreting its result
#[derive(Error, Debug)]
pub enum MsrpcError {
    /// Stub data could not be encoded or decoded
    #[error("NDR error: {0}")]
    Ndr(#[from] NdrError),

    /// The call completed and returned a failure code
    #[error("{operation}: {description} ({code:#010x})")]
    Status {
        operation: &'static str,
        code: u32,
        description: &'static str,
    },

    /// Opnum not defined by the interface
    #[error("unknown opnum {opnum} for interface {interface}")]
    UnknownOpnum { interface: &'static str, opnum: u16 },
}

/// HRESULT codes commonly returned by DCOM methods
pub mod hresult {
    /// Operation successful
    pub const S_OK: u32 = 0x00000000;
    /// Operation successful, returning false
    pub const S_FALSE: u32 = 0x00000001;
    /// Not implemented
    pub const E_NOTIMPL: u32 = 0x80004001;
    /// No such interface supported
    pub const E_NOINTERFACE: u32 = 0x80004002;
    /// Invalid pointer
    pub const E_POINTER: u32 = 0x80004003;
    /// Unspecified error
    pub const E_FAIL: u32 = 0x80004005;
    /// Access denied
    pub const E_ACCESSDENIED: u32 = 0x80070005;
    /// Out of memory
    pub const E_OUTOFMEMORY: u32 = 0x8007000E;
    /// Invalid argument
    pub const E_INVALIDARG: u32 = 0x80070057;
    /// Object or server not available
    pub const CO_E_OBJNOTCONNECTED: u32 = 0x800401FD;
    /// RPC server unavailable
    pub const RPC_E_SERVER_DIED: u32 = 0x80010007;

    /// Human-readable name of a well-known code.
    pub fn describe(code: u32) -> &'static str {
        match code {
            S_OK => "S_OK",
            S_FALSE => "S_FALSE",
            E_NOTIMPL => "E_NOTIMPL: not implemented",
            E_NOINTERFACE => "E_NOINTERFACE: no such interface supported",
            E_POINTER => "E_POINTER: invalid pointer",
            E_FAIL => "E_FAIL: unspecified error",
            E_ACCESSDENIED => "E_ACCESSDENIED: access denied",
            E_OUTOFMEMORY => "E_OUTOFMEMORY: out of memory",
            E_INVALIDARG => "E_INVALIDARG: invalid argument",
            CO_E_OBJNOTCONNECTED => "CO_E_OBJNOTCONNECTED: object not connected",
            RPC_E_SERVER_DIED => "RPC_E_SERVER_DIED: server unavailable",
            _ => "unknown HRESULT",
        }
    }
}

/// Map an HRESULT to a result. Any code with the severity bit clear is a
/// success, including `S_FALSE`.
pub fn check_hresult(operation: &'static str, code: i32) -> Result<()> {
    if code >= 0 {
        return Ok(());
    }
    let code = code as u32;
    let description = hresult::describe(code);
    debug!(operation, code, description, "call failed");
    Err(MsrpcError::Status {
        operation,
        code,
        description,
    })
}

/// Look up an operation name, failing for opnums the interface lacks.
pub fn operation_name(interface: &InterfaceInfo, opnum: u16) -> Result<&'static str> {
    interface
        .operation_name(opnum)
        .ok_or(MsrpcError::UnknownOpnum {
            interface: interface.name,
            opnum,
        })
}
