//! Name Service Provider Interface (MS-OXNSPI)
//!
//! The Exchange address book protocol. Every operation after `NspiBind`
//! carries the context handle returned by it, and most return an NSPI error
//! code rather than an HRESULT.

mod ops;
mod restriction;
mod types;

pub use ops::*;
pub use restriction::*;
pub use types::*;

use msrpc_ndr::{InterfaceInfo, NdrUuid, Operation};
use tracing::debug;

use crate::error::MsrpcError;

/// F5CC5A18-4264-101A-8C59-08002B2F8426, version 56.0
pub const NSPI: InterfaceInfo = InterfaceInfo {
    name: "nspi",
    uuid: NdrUuid::from_fields(
        0xF5CC5A18,
        0x4264,
        0x101A,
        [0x8C, 0x59, 0x08, 0x00, 0x2B, 0x2F, 0x84, 0x26],
    ),
    version: (56, 0),
    operations: &[
        (Bind::OPNUM, Bind::NAME),
        (Unbind::OPNUM, Unbind::NAME),
        (UpdateStat::OPNUM, UpdateStat::NAME),
        (QueryRows::OPNUM, QueryRows::NAME),
        (SeekEntries::OPNUM, SeekEntries::NAME),
        (GetMatches::OPNUM, GetMatches::NAME),
        (ResortRestriction::OPNUM, ResortRestriction::NAME),
        (DnToMId::OPNUM, DnToMId::NAME),
        (GetPropList::OPNUM, GetPropList::NAME),
        (GetProps::OPNUM, GetProps::NAME),
        (CompareMIds::OPNUM, CompareMIds::NAME),
        (ModProps::OPNUM, ModProps::NAME),
        (GetSpecialTable::OPNUM, GetSpecialTable::NAME),
        (GetTemplateInfo::OPNUM, GetTemplateInfo::NAME),
        (ModLinkAtt::OPNUM, ModLinkAtt::NAME),
        (QueryColumns::OPNUM, QueryColumns::NAME),
        (GetNamesFromIds::OPNUM, GetNamesFromIds::NAME),
        (GetIdsFromNames::OPNUM, GetIdsFromNames::NAME),
        (ResolveNames::OPNUM, ResolveNames::NAME),
        (ResolveNamesW::OPNUM, ResolveNamesW::NAME),
    ],
};

/// NSPI return codes (MS-OXNSPI 2.2.1.2)
pub mod status {
    pub const SUCCESS: u32 = 0x0000_0000;
    pub const UNBIND_SUCCESS: u32 = 0x0000_0001;
    pub const UNBIND_FAILURE: u32 = 0x0000_0002;
    /// Partial success: some names or properties could not be resolved.
    pub const ERRORS_RETURNED: u32 = 0x0004_0380;
    pub const GENERAL_FAILURE: u32 = 0x8000_4005;
    pub const NOT_SUPPORTED: u32 = 0x8004_0102;
    pub const INVALID_OBJECT: u32 = 0x8004_0108;
    pub const OUT_OF_RESOURCES: u32 = 0x8004_010E;
    pub const NOT_FOUND: u32 = 0x8004_010F;
    pub const LOGON_FAILED: u32 = 0x8004_0111;
    pub const TOO_COMPLEX: u32 = 0x8004_0117;
    pub const INVALID_CODEPAGE: u32 = 0x8004_011E;
    pub const INVALID_LOCALE: u32 = 0x8004_011F;
    pub const TABLE_TOO_BIG: u32 = 0x8004_0403;
    pub const INVALID_BOOKMARK: u32 = 0x8004_0405;
    pub const ACCESS_DENIED: u32 = 0x8007_0005;
    pub const NOT_ENOUGH_MEMORY: u32 = 0x8007_000E;
    pub const INVALID_PARAMETER: u32 = 0x8007_0057;

    pub fn describe(code: u32) -> &'static str {
        match code {
            SUCCESS => "Success",
            UNBIND_SUCCESS => "UnbindSuccess",
            UNBIND_FAILURE => "UnbindFailure",
            ERRORS_RETURNED => "ErrorsReturned",
            GENERAL_FAILURE => "GeneralFailure",
            NOT_SUPPORTED => "NotSupported",
            INVALID_OBJECT => "InvalidObject",
            OUT_OF_RESOURCES => "OutOfResources",
            NOT_FOUND => "NotFound",
            LOGON_FAILED => "LogonFailed",
            TOO_COMPLEX => "TooComplex",
            INVALID_CODEPAGE => "InvalidCodepage",
            INVALID_LOCALE => "InvalidLocale",
            TABLE_TOO_BIG => "TableTooBig",
            INVALID_BOOKMARK => "InvalidBookmark",
            ACCESS_DENIED => "AccessDenied",
            NOT_ENOUGH_MEMORY => "NotEnoughMemory",
            INVALID_PARAMETER => "InvalidParameter",
            _ => "unknown NSPI error",
        }
    }
}

fn status_error(operation: &'static str, code: u32) -> MsrpcError {
    let description = status::describe(code);
    debug!(operation, code, description, "call failed");
    MsrpcError::Status {
        operation,
        code,
        description,
    }
}

/// Map an NSPI return code to a result. `ErrorsReturned` counts as success.
pub fn check_nspi_status(operation: &'static str, code: u32) -> crate::Result<()> {
    match code {
        status::SUCCESS | status::ERRORS_RETURNED => Ok(()),
        _ => Err(status_error(operation, code)),
    }
}

/// `NspiUnbind` returns `UnbindSuccess` rather than `Success`.
pub fn check_unbind_status(code: u32) -> crate::Result<()> {
    match code {
        status::UNBIND_SUCCESS => Ok(()),
        _ => Err(status_error(Unbind::NAME, code)),
    }
}
