//! IIS application host administration exceptions (MS-IISA)
//!
//! `IAppHostConfigException` and `IAppHostPropertyException` are DCOM
//! interfaces made of property getters. Every getter takes only the
//! ORPCTHIS envelope and returns ORPCTHAT, the value and an HRESULT, so the
//! operations share their message types and differ in opnum and name.

/// Declare getter operations sharing [`OrpcRequest`].
macro_rules! getter_operations {
    (
        $interface:literal;
        $( $(#[$meta:meta])* $name:ident = $opnum:literal, $method:literal => $response:ty; )*
    ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl msrpc_ndr::Operation for $name {
                const OPNUM: u16 = $opnum;
                const NAME: &'static str = concat!("/", $interface, "/v0/", $method);
                type Request = $crate::iisa::OrpcRequest;
                type Response = $response;
            }
        )*
    };
}

mod config_exception;
mod property_exception;

pub use config_exception::{
    ConfigPath, ErrorLine, ErrorString, FileName, LineNumber, PostErrorLine, PreErrorLine,
    CONFIG_EXCEPTION,
};
pub use property_exception::{
    InvalidValue, ValidationFailureParameters, ValidationFailureReason, PROPERTY_EXCEPTION,
};

use msrpc_ndr::{ndr_message, UniquePtr};

use crate::dcom::{OrpcThat, OrpcThis};
use crate::error::check_hresult;
use crate::oaut::{BstrPtr, SafeArray};

ndr_message! {
    /// Request of every getter: the ORPCTHIS envelope only.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct OrpcRequest {
        pub this: OrpcThis,
    }
}

ndr_message! {
    /// `[out, retval] DWORD*` getter response.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct LineNumberResponse {
        pub that: OrpcThat,
        pub line_number: u32,
        pub return_value: i32,
    }
}

ndr_message! {
    /// `[out, retval] BSTR*` getter response.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct BstrResponse {
        pub that: OrpcThat,
        pub value: BstrPtr,
        pub return_value: i32,
    }
}

ndr_message! {
    /// `[out, retval] SAFEARRAY(VARIANT)*` getter response.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct SafeArrayResponse {
        pub that: OrpcThat,
        pub parameters: UniquePtr<SafeArray>,
        pub return_value: i32,
    }
}

impl LineNumberResponse {
    pub fn into_result(self, operation: &'static str) -> crate::Result<u32> {
        check_hresult(operation, self.return_value)?;
        Ok(self.line_number)
    }
}

impl BstrResponse {
    /// The string, or `None` for a NULL BSTR, once the HRESULT is checked.
    pub fn into_result(self, operation: &'static str) -> crate::Result<Option<String>> {
        check_hresult(operation, self.return_value)?;
        Ok(self.value.into_option().map(|bstr| bstr.0))
    }
}

impl SafeArrayResponse {
    /// The array, or `None` when none was returned, once the HRESULT is checked.
    pub fn into_result(self, operation: &'static str) -> crate::Result<Option<SafeArray>> {
        check_hresult(operation, self.return_value)?;
        Ok(self.parameters.into_option())
    }
}
