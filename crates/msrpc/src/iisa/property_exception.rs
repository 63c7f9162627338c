//! `IAppHostPropertyException` (MS-IISA 3.1.4.20)
//!
//! Extends `IAppHostConfigException`; opnums 3-9 are the inherited getters.

use msrpc_ndr::{InterfaceInfo, NdrUuid, Operation};

use super::config_exception::{
    ConfigPath, ErrorLine, ErrorString, FileName, LineNumber, PostErrorLine, PreErrorLine,
};
use super::{BstrResponse, SafeArrayResponse};

/// IID eafe4895-a929-41ea-b14d-613e23f62b71, version 0.0
pub const PROPERTY_EXCEPTION: InterfaceInfo = InterfaceInfo {
    name: "IAppHostPropertyException",
    uuid: NdrUuid::from_fields(
        0xeafe4895,
        0xa929,
        0x41ea,
        [0xb1, 0x4d, 0x61, 0x3e, 0x23, 0xf6, 0x2b, 0x71],
    ),
    version: (0, 0),
    operations: &[
        (LineNumber::OPNUM, LineNumber::NAME),
        (FileName::OPNUM, FileName::NAME),
        (ConfigPath::OPNUM, ConfigPath::NAME),
        (ErrorLine::OPNUM, ErrorLine::NAME),
        (PreErrorLine::OPNUM, PreErrorLine::NAME),
        (PostErrorLine::OPNUM, PostErrorLine::NAME),
        (ErrorString::OPNUM, ErrorString::NAME),
        (InvalidValue::OPNUM, InvalidValue::NAME),
        (ValidationFailureReason::OPNUM, ValidationFailureReason::NAME),
        (ValidationFailureParameters::OPNUM, ValidationFailureParameters::NAME),
    ],
};

getter_operations! {
    "IAppHostPropertyException";
    /// The rejected property value
    InvalidValue = 10, "InvalidValue" => BstrResponse;
    /// Why validation rejected the value
    ValidationFailureReason = 11, "ValidationFailureReason" => BstrResponse;
    /// Values substituted into the failure reason
    ValidationFailureParameters = 12, "ValidationFailureParameters" => SafeArrayResponse;
}
