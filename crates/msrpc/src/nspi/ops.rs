//! NSPI operations (MS-OXNSPI 3.1.4.1)
//!
//! `[ref]` top-level parameters such as `STAT*` are carried as the plain
//! type. `[out]` double pointers come back as unique pointers.

use msrpc_ndr::{ndr_message, ContextHandle, CountedArray, NdrString, Operation, Reserved, UniquePtr};

use super::restriction::Restriction;
use super::types::{
    BinaryArray, FlatUid, PropertyName, PropertyNameArray, PropertyNameSet, PropertyRow,
    PropertyRowSet, PropertyTagArray, PropertyValue, Stat, StringsArray, WStringsArray,
    MAX_VALUES,
};
use super::{check_nspi_status, check_unbind_status};

macro_rules! nspi_operations {
    ($( $(#[$meta:meta])* $name:ident = $opnum:literal, $method:literal => $request:ty, $response:ty; )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl msrpc_ndr::Operation for $name {
                const OPNUM: u16 = $opnum;
                const NAME: &'static str = concat!("/nspi/v56/", $method);
                type Request = $request;
                type Response = $response;
            }
        )*
    };
}

nspi_operations! {
    /// Open an address book session.
    Bind = 0, "NspiBind" => BindRequest, BindResponse;
    /// Close the session.
    Unbind = 1, "NspiUnbind" => UnbindRequest, UnbindResponse;
    /// Move the table cursor.
    UpdateStat = 2, "NspiUpdateStat" => UpdateStatRequest, UpdateStatResponse;
    /// Read rows at the cursor or for explicit MIds.
    QueryRows = 3, "NspiQueryRows" => QueryRowsRequest, QueryRowsResponse;
    /// Move the cursor to the first row at or after a value in sort order.
    SeekEntries = 4, "NspiSeekEntries" => SeekEntriesRequest, SeekEntriesResponse;
    /// Find rows matching a restriction.
    GetMatches = 5, "NspiGetMatches" => GetMatchesRequest, GetMatchesResponse;
    /// Sort a list of MIds by the table's sort order.
    ResortRestriction = 6, "NspiResortRestriction" => ResortRestrictionRequest, ResortRestrictionResponse;
    /// Map distinguished names to MIds.
    DnToMId = 7, "NspiDNToMId" => DnToMIdRequest, DnToMIdResponse;
    GetPropList = 8, "NspiGetPropList" => GetPropListRequest, GetPropListResponse;
    GetProps = 9, "NspiGetProps" => GetPropsRequest, GetPropsResponse;
    CompareMIds = 10, "NspiCompareMIds" => CompareMIdsRequest, CompareMIdsResponse;
    /// Write properties of the row at the cursor.
    ModProps = 11, "NspiModProps" => ModPropsRequest, ModPropsResponse;
    /// Fetch the address book hierarchy table.
    GetSpecialTable = 12, "NspiGetSpecialTable" => GetSpecialTableRequest, GetSpecialTableResponse;
    /// Fetch a display or addressing template.
    GetTemplateInfo = 13, "NspiGetTemplateInfo" => GetTemplateInfoRequest, GetTemplateInfoResponse;
    /// Add or remove values of a link attribute.
    ModLinkAtt = 14, "NspiModLinkAtt" => ModLinkAttRequest, ModLinkAttResponse;
    QueryColumns = 16, "NspiQueryColumns" => QueryColumnsRequest, QueryColumnsResponse;
    /// Map property IDs to named properties.
    GetNamesFromIds = 17, "NspiGetNamesFromIDs" => GetNamesFromIdsRequest, GetNamesFromIdsResponse;
    /// Map named properties to property IDs.
    GetIdsFromNames = 18, "NspiGetIDsFromNames" => GetIdsFromNamesRequest, GetIdsFromNamesResponse;
    /// Resolve ambiguous narrow names.
    ResolveNames = 19, "NspiResolveNames" => ResolveNamesRequest, ResolveNamesResponse;
    /// Resolve ambiguous UTF-16 names.
    ResolveNamesW = 20, "NspiResolveNamesW" => ResolveNamesWRequest, ResolveNamesWResponse;
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct BindRequest {
        pub flags: u32,
        pub stat: Stat,
        pub server_guid: UniquePtr<FlatUid>,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct BindResponse {
        pub server_guid: UniquePtr<FlatUid>,
        pub handle: ContextHandle,
        pub return_value: u32,
    }
}

impl BindResponse {
    /// The session handle, once the return code is checked.
    pub fn into_result(self) -> crate::Result<ContextHandle> {
        check_nspi_status(Bind::NAME, self.return_value)?;
        Ok(self.handle)
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct UnbindRequest {
        pub handle: ContextHandle,
        pub reserved: Reserved<u32>,
    }
}

ndr_message! {
    /// `return_value` is 1 (`UnbindSuccess`) on success.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct UnbindResponse {
        pub handle: ContextHandle,
        pub return_value: u32,
    }
}

impl UnbindResponse {
    pub fn into_result(self) -> crate::Result<ContextHandle> {
        check_unbind_status(self.return_value)?;
        Ok(self.handle)
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct UpdateStatRequest {
        pub handle: ContextHandle,
        pub reserved: Reserved<u32>,
        pub stat: Stat,
        pub delta: UniquePtr<i32>,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct UpdateStatResponse {
        pub stat: Stat,
        pub delta: UniquePtr<i32>,
        pub return_value: u32,
    }
}

ndr_message! {
    /// `e_table` is `dwETableCount` followed by the unique `lpETable` array
    /// of MIds; a null table reads rows at the cursor.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct QueryRowsRequest {
        pub handle: ContextHandle,
        pub flags: u32,
        pub stat: Stat,
        pub e_table: CountedArray<u32, MAX_VALUES>,
        pub count: u32,
        pub prop_tags: UniquePtr<PropertyTagArray>,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct QueryRowsResponse {
        pub stat: Stat,
        pub rows: UniquePtr<PropertyRowSet>,
        pub return_value: u32,
    }
}

ndr_message! {
    /// `target` is the value to seek to, in the table's sort property.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct SeekEntriesRequest {
        pub handle: ContextHandle,
        pub reserved: Reserved<u32>,
        pub stat: Stat,
        pub target: PropertyValue,
        pub e_table: UniquePtr<PropertyTagArray>,
        pub prop_tags: UniquePtr<PropertyTagArray>,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct SeekEntriesResponse {
        pub stat: Stat,
        pub rows: UniquePtr<PropertyRowSet>,
        pub return_value: u32,
    }
}

ndr_message! {
    /// `filter` or `prop_name` narrows the match; `requested` caps the
    /// number of rows returned.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetMatchesRequest {
        pub handle: ContextHandle,
        pub reserved1: Reserved<u32>,
        pub stat: Stat,
        pub reserved_tags: UniquePtr<PropertyTagArray>,
        pub reserved2: Reserved<u32>,
        pub filter: UniquePtr<Restriction>,
        pub prop_name: UniquePtr<PropertyName>,
        pub requested: u32,
        pub prop_tags: UniquePtr<PropertyTagArray>,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetMatchesResponse {
        pub stat: Stat,
        pub mids: UniquePtr<PropertyTagArray>,
        pub rows: UniquePtr<PropertyRowSet>,
        pub return_value: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ResortRestrictionRequest {
        pub handle: ContextHandle,
        pub reserved: Reserved<u32>,
        pub stat: Stat,
        pub in_mids: PropertyTagArray,
        pub out_mids: UniquePtr<PropertyTagArray>,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ResortRestrictionResponse {
        pub stat: Stat,
        pub out_mids: UniquePtr<PropertyTagArray>,
        pub return_value: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct DnToMIdRequest {
        pub handle: ContextHandle,
        pub reserved: Reserved<u32>,
        pub names: StringsArray,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct DnToMIdResponse {
        pub mids: UniquePtr<PropertyTagArray>,
        pub return_value: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetPropListRequest {
        pub handle: ContextHandle,
        pub flags: u32,
        pub mid: u32,
        pub code_page: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetPropListResponse {
        pub prop_tags: UniquePtr<PropertyTagArray>,
        pub return_value: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetPropsRequest {
        pub handle: ContextHandle,
        pub flags: u32,
        pub stat: Stat,
        pub prop_tags: UniquePtr<PropertyTagArray>,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetPropsResponse {
        pub row: UniquePtr<PropertyRow>,
        pub return_value: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct CompareMIdsRequest {
        pub handle: ContextHandle,
        pub reserved: Reserved<u32>,
        pub stat: Stat,
        pub mid1: u32,
        pub mid2: u32,
    }
}

ndr_message! {
    /// `result` is negative, zero or positive as MId1 sorts before, with or
    /// after MId2.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct CompareMIdsResponse {
        pub result: i32,
        pub return_value: u32,
    }
}

ndr_message! {
    /// `prop_tags` lists the properties of `row` to remove.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ModPropsRequest {
        pub handle: ContextHandle,
        pub reserved: Reserved<u32>,
        pub stat: Stat,
        pub prop_tags: UniquePtr<PropertyTagArray>,
        pub row: PropertyRow,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ModPropsResponse {
        pub return_value: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetSpecialTableRequest {
        pub handle: ContextHandle,
        pub flags: u32,
        pub stat: Stat,
        pub version: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetSpecialTableResponse {
        pub version: u32,
        pub rows: UniquePtr<PropertyRowSet>,
        pub return_value: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetTemplateInfoRequest {
        pub handle: ContextHandle,
        pub flags: u32,
        pub template_type: u32,
        pub dn: UniquePtr<NdrString>,
        pub code_page: u32,
        pub locale_id: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetTemplateInfoResponse {
        pub data: UniquePtr<PropertyRow>,
        pub return_value: u32,
    }
}

ndr_message! {
    /// `flags` is 1 (`fDelete`) to remove `entry_ids` rather than add them.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ModLinkAttRequest {
        pub handle: ContextHandle,
        pub flags: u32,
        pub prop_tag: u32,
        pub mid: u32,
        pub entry_ids: BinaryArray,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ModLinkAttResponse {
        pub return_value: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct QueryColumnsRequest {
        pub handle: ContextHandle,
        pub reserved: Reserved<u32>,
        pub flags: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct QueryColumnsResponse {
        pub columns: UniquePtr<PropertyTagArray>,
        pub return_value: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetNamesFromIdsRequest {
        pub handle: ContextHandle,
        pub reserved: Reserved<u32>,
        pub guid: UniquePtr<FlatUid>,
        pub prop_tags: UniquePtr<PropertyTagArray>,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetNamesFromIdsResponse {
        pub prop_tags: UniquePtr<PropertyTagArray>,
        pub names: UniquePtr<PropertyNameSet>,
        pub return_value: u32,
    }
}

ndr_message! {
    /// `flags` is 2 (`NspiVerifyNames`) to check names without creating IDs.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetIdsFromNamesRequest {
        pub handle: ContextHandle,
        pub reserved: Reserved<u32>,
        pub flags: u32,
        pub names: PropertyNameArray,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GetIdsFromNamesResponse {
        pub prop_tags: UniquePtr<PropertyTagArray>,
        pub return_value: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ResolveNamesRequest {
        pub handle: ContextHandle,
        pub reserved: Reserved<u32>,
        pub stat: Stat,
        pub prop_tags: UniquePtr<PropertyTagArray>,
        pub names: StringsArray,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ResolveNamesResponse {
        pub mids: UniquePtr<PropertyTagArray>,
        pub rows: UniquePtr<PropertyRowSet>,
        pub return_value: u32,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ResolveNamesWRequest {
        pub handle: ContextHandle,
        pub reserved: Reserved<u32>,
        pub stat: Stat,
        pub prop_tags: UniquePtr<PropertyTagArray>,
        pub names: WStringsArray,
    }
}

ndr_message! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ResolveNamesWResponse {
        pub mids: UniquePtr<PropertyTagArray>,
        pub rows: UniquePtr<PropertyRowSet>,
        pub return_value: u32,
    }
}
