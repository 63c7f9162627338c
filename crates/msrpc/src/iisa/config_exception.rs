//! `IAppHostConfigException` (MS-IISA 3.1.4.6)

use msrpc_ndr::{InterfaceInfo, NdrUuid, Operation};

use super::{BstrResponse, LineNumberResponse};

/// IID 4dfa1df3-8900-4bc7-bbb5-d1a458c52410, version 0.0
pub const CONFIG_EXCEPTION: InterfaceInfo = InterfaceInfo {
    name: "IAppHostConfigException",
    uuid: NdrUuid::from_fields(
        0x4dfa1df3,
        0x8900,
        0x4bc7,
        [0xbb, 0xb5, 0xd1, 0xa4, 0x58, 0xc5, 0x24, 0x10],
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
    ],
};

getter_operations! {
    "IAppHostConfigException";
    /// Line of the configuration file where the error occurred
    LineNumber = 3, "LineNumber" => LineNumberResponse;
    /// Path of the configuration file that failed to load
    FileName = 4, "FileName" => BstrResponse;
    /// Configuration path of the failing element
    ConfigPath = 5, "ConfigPath" => BstrResponse;
    ErrorLine = 6, "ErrorLine" => BstrResponse;
    PreErrorLine = 7, "PreErrorLine" => BstrResponse;
    PostErrorLine = 8, "PostErrorLine" => BstrResponse;
    ErrorString = 9, "ErrorString" => BstrResponse;
}
