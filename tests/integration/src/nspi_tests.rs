//! NSPI Tests - Address Book Session Flows
//!
//! These tests walk an address book session the way a client and server
//! would see it on the wire:
//! - Bind, then calls carrying the returned context handle, then Unbind
//! - Property rows using every value arm
//! - Partial results (`ErrorsReturned`) and failure codes
//! - Stub data whose union selector disagrees with the property tag
//! - Restriction searches and named property lookups

mod common;

use common::*;
use msrpc::nspi::{
    check_nspi_status, fuzzy_level, relop, status, Bind, BindRequest, BindResponse, Binary,
    BinaryArray, DateTimeArray, DnToMId, DnToMIdRequest, DnToMIdResponse, FileTime, FlatUid,
    FlatUidArray, GetIdsFromNames, GetIdsFromNamesRequest, GetIdsFromNamesResponse, GetMatches,
    GetMatchesRequest, GetMatchesResponse, GetNamesFromIds, GetNamesFromIdsRequest,
    GetNamesFromIdsResponse, GetProps, GetPropsRequest, GetPropsResponse, LongArray,
    PropValue, PropertyName, PropertyNameSet, PropertyRow, PropertyRowSet, PropertyTagArray,
    PropertyValue, QueryRows, QueryRowsRequest, QueryRowsResponse, ResolveNamesW,
    ResolveNamesWRequest, ResolveNamesWResponse, Restriction, ShortArray, Stat, StringArray,
    Unbind, UnbindRequest, UnbindResponse, WStringArray, NSPI,
};
use msrpc::MsrpcError;
use msrpc_ndr::{
    ContextHandle, CountedArray, NdrContext, NdrError, NdrString, NdrUuid, NdrWString,
    Operation, Reserved, UniquePtr,
};

const PR_DISPLAY_NAME_W: u32 = 0x3001_001F;
const PR_EMAIL_ADDRESS_A: u32 = 0x3003_001E;
const PR_DISPLAY_TYPE: u32 = 0x3900_0003;
const PR_ENTRYID: u32 = 0x0FFF_0102;

fn session_handle() -> ContextHandle {
    ContextHandle::new(
        0,
        NdrUuid::parse("9a8b7c6d-5e4f-4031-8293-a4b5c6d7e8f9").unwrap(),
    )
}

fn stat() -> Stat {
    Stat {
        code_page: 1252,
        template_locale: 0x0409,
        sort_locale: 0x0409,
        ..Default::default()
    }
}

fn display_name(name: &str) -> PropertyValue {
    PropertyValue::new(
        PR_DISPLAY_NAME_W,
        PropValue::Unicode(UniquePtr::new(NdrWString::new(name))),
    )
}

#[test]
fn test_bind_query_unbind_session() {
    init_tracing();
    let ctx = NdrContext::new();

    // Bind
    let stub = Bind::marshal_request(
        &ctx,
        &BindRequest {
            flags: 0,
            stat: stat(),
            server_guid: UniquePtr::new(FlatUid::default()),
        },
    )
    .unwrap();
    let request = Bind::unmarshal_request(&ctx, stub).unwrap();
    assert_eq!(request.stat.code_page, 1252);
    let reply = Bind::marshal_response(
        &ctx,
        &BindResponse {
            server_guid: UniquePtr::new(FlatUid::new([0x42; 16])),
            handle: session_handle(),
            return_value: status::SUCCESS,
        },
    )
    .unwrap();
    let handle = Bind::unmarshal_response(&ctx, reply)
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(handle, session_handle());

    // QueryRows at the cursor
    let stub = QueryRows::marshal_request(
        &ctx,
        &QueryRowsRequest {
            handle,
            flags: 0,
            stat: stat(),
            e_table: CountedArray::null(),
            count: 50,
            prop_tags: UniquePtr::new(PropertyTagArray::new(vec![
                PR_DISPLAY_NAME_W,
                PR_DISPLAY_TYPE,
            ])),
        },
    )
    .unwrap();
    let request = QueryRows::unmarshal_request(&ctx, stub).unwrap();
    assert_eq!(request.handle, handle);
    assert!(request.e_table.values().is_none());
    let tags = request.prop_tags.as_ref().unwrap().tags.clone();

    let rows = ["Alice", "Bob"]
        .into_iter()
        .map(|name| {
            PropertyRow::new(vec![
                display_name(name),
                PropertyValue::new(PR_DISPLAY_TYPE, PropValue::Long(0)),
            ])
        })
        .collect();
    let reply = QueryRows::marshal_response(
        &ctx,
        &QueryRowsResponse {
            stat: Stat {
                current_rec: 2,
                ..request.stat
            },
            rows: UniquePtr::new(PropertyRowSet::new(rows)),
            return_value: status::SUCCESS,
        },
    )
    .unwrap();
    let response = QueryRows::unmarshal_response(&ctx, reply).unwrap();
    check_nspi_status(QueryRows::NAME, response.return_value).unwrap();
    assert_eq!(response.stat.current_rec, 2);
    let rows = response.rows.into_option().unwrap().rows;
    assert_eq!(rows.len(), 2);
    for row in &rows {
        for tag in &tags {
            assert!(row.find(*tag).is_some());
        }
    }
    assert_eq!(
        rows[1].find(PR_DISPLAY_NAME_W),
        Some(&PropValue::Unicode(UniquePtr::new(NdrWString::new("Bob"))))
    );

    // Unbind
    let stub = Unbind::marshal_request(
        &ctx,
        &UnbindRequest {
            handle,
            reserved: Reserved::new(),
        },
    )
    .unwrap();
    assert_eq!(stub.len(), 24);
    let reply = Unbind::marshal_response(
        &ctx,
        &UnbindResponse {
            handle: ContextHandle::NULL,
            return_value: status::UNBIND_SUCCESS,
        },
    )
    .unwrap();
    let closed = Unbind::unmarshal_response(&ctx, reply)
        .unwrap()
        .into_result()
        .unwrap();
    assert!(closed.is_null());
}

#[test]
fn test_row_with_every_value_arm() {
    init_tracing();
    let row = PropertyRow::new(vec![
        PropertyValue::new(0x3A40_0002, PropValue::Short(-3)),
        PropertyValue::new(PR_DISPLAY_TYPE, PropValue::Long(6)),
        PropertyValue::new(0x3A40_000B, PropValue::Boolean(1)),
        PropertyValue::new(
            PR_EMAIL_ADDRESS_A,
            PropValue::String8(UniquePtr::new(NdrString::new("/o=Example/cn=alice"))),
        ),
        PropertyValue::new(PR_ENTRYID, PropValue::Binary(Binary::new(vec![0, 0, 0, 0, 0xDC, 0xA7]))),
        display_name("Alice"),
        PropertyValue::new(0x3A41_0048, PropValue::Guid(UniquePtr::new(FlatUid::new([7; 16])))),
        PropertyValue::new(0x3007_0040, PropValue::FileTime(FileTime::from_u64(0x01DA_1234_5678_9ABC))),
        PropertyValue::new(0x3A42_000A, PropValue::Error(0x8004_010F_u32 as i32)),
        PropertyValue::new(0x3A43_1002, PropValue::MultiShort(ShortArray::new(vec![1, -1]))),
        PropertyValue::new(0x3A44_1003, PropValue::MultiLong(LongArray::new(vec![10, 20, 30]))),
        PropertyValue::new(
            0x800F_101E,
            PropValue::MultiString8(StringArray::new(vec![
                UniquePtr::new(NdrString::new("smtp:alice@example.com")),
                UniquePtr::new(NdrString::new("x500:/o=Example")),
            ])),
        ),
        PropertyValue::new(
            0x8C6A_1102,
            PropValue::MultiBinary(BinaryArray::new(vec![
                Binary::new(vec![1, 2, 3]),
                Binary::null(),
            ])),
        ),
        PropertyValue::new(
            0x3A45_1048,
            PropValue::MultiGuid(FlatUidArray::new(vec![UniquePtr::new(FlatUid::new([1; 16]))])),
        ),
        PropertyValue::new(
            0x800F_101F,
            PropValue::MultiUnicode(WStringArray::new(vec![UniquePtr::new(NdrWString::new(
                "SMTP:alice@example.com",
            ))])),
        ),
        PropertyValue::new(
            0x3A46_1040,
            PropValue::MultiFileTime(DateTimeArray::new(vec![FileTime::from_u64(1)])),
        ),
        PropertyValue::new(0x3A47_0001, PropValue::Reserved(0)),
        PropertyValue::new(0x3A48_000D, PropValue::Reserved(0)),
    ]);

    let ctx = NdrContext::new();
    let reply = GetProps::marshal_response(
        &ctx,
        &GetPropsResponse {
            row: UniquePtr::new(row.clone()),
            return_value: status::ERRORS_RETURNED,
        },
    )
    .unwrap();
    let response = GetProps::unmarshal_response(&ctx, reply).unwrap();
    assert!(check_nspi_status(GetProps::NAME, response.return_value).is_ok());
    assert_eq!(response.row.into_option().unwrap(), row);
}

#[test]
fn test_get_props_failure() {
    init_tracing();
    let ctx = NdrContext::new();
    let stub = GetProps::marshal_request(
        &ctx,
        &GetPropsRequest {
            handle: session_handle(),
            flags: 0,
            stat: stat(),
            prop_tags: UniquePtr::null(),
        },
    )
    .unwrap();
    assert!(GetProps::unmarshal_request(&ctx, stub).unwrap().prop_tags.is_null());

    let reply = GetProps::marshal_response(
        &ctx,
        &GetPropsResponse {
            row: UniquePtr::null(),
            return_value: status::INVALID_BOOKMARK,
        },
    )
    .unwrap();
    let response = GetProps::unmarshal_response(&ctx, reply).unwrap();
    assert!(matches!(
        check_nspi_status(GetProps::NAME, response.return_value),
        Err(MsrpcError::Status { code: status::INVALID_BOOKMARK, description: "InvalidBookmark", .. })
    ));
}

#[test]
fn test_resolve_names_partial_result() {
    init_tracing();
    let ctx = NdrContext::new();
    let stub = ResolveNamesW::marshal_request(
        &ctx,
        &ResolveNamesWRequest {
            handle: session_handle(),
            reserved: Reserved::new(),
            stat: stat(),
            prop_tags: UniquePtr::new(PropertyTagArray::new(vec![PR_DISPLAY_NAME_W])),
            names: ["alice", "nobody"].into_iter().map(NdrWString::new).collect(),
        },
    )
    .unwrap();
    let request = ResolveNamesW::unmarshal_request(&ctx, stub).unwrap();
    let names: Vec<&str> = request
        .names
        .strings
        .iter()
        .filter_map(|s| s.as_ref().map(NdrWString::as_str))
        .collect();
    assert_eq!(names, vec!["alice", "nobody"]);

    // MId 0 marks the unresolved name
    let reply = ResolveNamesW::marshal_response(
        &ctx,
        &ResolveNamesWResponse {
            mids: UniquePtr::new(PropertyTagArray::new(vec![0x1F00, 0])),
            rows: UniquePtr::new(PropertyRowSet::new(vec![PropertyRow::new(vec![
                display_name("Alice"),
            ])])),
            return_value: status::ERRORS_RETURNED,
        },
    )
    .unwrap();
    let response = ResolveNamesW::unmarshal_response(&ctx, reply).unwrap();
    check_nspi_status(ResolveNamesW::NAME, response.return_value).unwrap();
    assert_eq!(response.mids.as_ref().unwrap().tags, vec![0x1F00, 0]);
}

#[test]
fn test_dn_to_mid() {
    init_tracing();
    let ctx = NdrContext::new();
    let request = DnToMIdRequest {
        handle: session_handle(),
        reserved: Reserved::new(),
        names: ["/o=Example/ou=Exchange Administrative Group/cn=Recipients/cn=alice"]
            .into_iter()
            .map(NdrString::new)
            .collect(),
    };
    let stub = DnToMId::marshal_request(&ctx, &request).unwrap();
    // handle, reserved, max_count, Count, one referent ID
    assert_eq!(u32_at(&stub, 24), 1);
    assert_eq!(u32_at(&stub, 28), 1);
    assert_eq!(u32_at(&stub, 32), 0x0002_0000);
    assert_eq!(DnToMId::unmarshal_request(&ctx, stub).unwrap(), request);

    let reply = DnToMId::marshal_response(
        &ctx,
        &DnToMIdResponse {
            mids: UniquePtr::new(PropertyTagArray::new(vec![0x42])),
            return_value: status::SUCCESS,
        },
    )
    .unwrap();
    let response = DnToMId::unmarshal_response(&ctx, reply).unwrap();
    assert_eq!(response.mids.into_option().unwrap().tags, vec![0x42]);
}

#[test]
fn test_selector_disagrees_with_tag() {
    init_tracing();
    let value = PropertyValue::new(PR_DISPLAY_TYPE, PropValue::Long(6));
    let mut data = encode(NdrContext::new(), &value).to_vec();
    // switch says PtypInteger16 while the tag says PtypInteger32
    data[8] = 0x02;
    assert!(matches!(
        decode::<PropertyValue>(NdrContext::new(), data),
        Err(NdrError::DiscriminantMismatch { expected: 3, got: 2 })
    ));
}

#[test]
fn test_get_matches_with_restriction() {
    init_tracing();
    let ctx = NdrContext::new();

    // display name starts with "al" and an email address exists
    let filter = Restriction::and(vec![
        Restriction::content(
            fuzzy_level::PREFIX | fuzzy_level::IGNORE_CASE,
            display_name("al"),
        ),
        Restriction::exist(PR_EMAIL_ADDRESS_A),
        Restriction::not(Restriction::property(
            relop::EQ,
            PropertyValue::new(PR_DISPLAY_TYPE, PropValue::Long(1)),
        )),
    ]);
    let stub = GetMatches::marshal_request(
        &ctx,
        &GetMatchesRequest {
            handle: session_handle(),
            stat: stat(),
            filter: UniquePtr::new(filter.clone()),
            requested: 10,
            prop_tags: UniquePtr::new(PropertyTagArray::new(vec![PR_DISPLAY_NAME_W])),
            ..Default::default()
        },
    )
    .unwrap();
    let request = GetMatches::unmarshal_request(&ctx, stub).unwrap();
    assert_eq!(request.filter.into_option(), Some(filter));
    assert!(request.prop_name.is_null());

    let reply = GetMatches::marshal_response(
        &ctx,
        &GetMatchesResponse {
            stat: stat(),
            mids: UniquePtr::new(PropertyTagArray::new(vec![0x51])),
            rows: UniquePtr::new(PropertyRowSet::new(vec![PropertyRow::new(vec![
                display_name("Alice"),
            ])])),
            return_value: status::SUCCESS,
        },
    )
    .unwrap();
    let response = GetMatches::unmarshal_response(&ctx, reply).unwrap();
    check_nspi_status(GetMatches::NAME, response.return_value).unwrap();
    assert_eq!(response.mids.into_option().unwrap().tags, vec![0x51]);
}

#[test]
fn test_deep_restriction_rejected() {
    init_tracing();
    let mut filter = Restriction::exist(PR_EMAIL_ADDRESS_A);
    for _ in 0..10 {
        filter = Restriction::not(filter);
    }
    let request = GetMatchesRequest {
        filter: UniquePtr::new(filter),
        ..Default::default()
    };
    let stub = GetMatches::marshal_request(&NdrContext::new(), &request).unwrap();

    let shallow = NdrContext::new().with_max_depth(8);
    assert!(matches!(
        GetMatches::unmarshal_request(&shallow, stub.clone()),
        Err(NdrError::DepthExceeded(8))
    ));
    assert!(GetMatches::unmarshal_request(&NdrContext::new(), stub).is_ok());
}

#[test]
fn test_named_property_round_trip() {
    init_tracing();
    let ctx = NdrContext::new();
    let ps_public_strings = FlatUid::new([
        0x29, 0x03, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x46,
    ]);

    let stub = GetIdsFromNames::marshal_request(
        &ctx,
        &GetIdsFromNamesRequest {
            handle: session_handle(),
            reserved: Reserved::new(),
            flags: 0,
            names: [PropertyName::new(ps_public_strings.clone(), 0x8001)]
                .into_iter()
                .collect(),
        },
    )
    .unwrap();
    let request = GetIdsFromNames::unmarshal_request(&ctx, stub).unwrap();
    let name = request.names.names[0].as_ref().unwrap();
    assert_eq!(name.guid.as_ref(), Some(&ps_public_strings));

    let reply = GetIdsFromNames::marshal_response(
        &ctx,
        &GetIdsFromNamesResponse {
            prop_tags: UniquePtr::new(PropertyTagArray::new(vec![0x8001_0000])),
            return_value: status::SUCCESS,
        },
    )
    .unwrap();
    let prop_id = GetIdsFromNames::unmarshal_response(&ctx, reply)
        .unwrap()
        .prop_tags
        .into_option()
        .unwrap()
        .tags[0];

    let stub = GetNamesFromIds::marshal_request(
        &ctx,
        &GetNamesFromIdsRequest {
            handle: session_handle(),
            prop_tags: UniquePtr::new(PropertyTagArray::new(vec![prop_id | 0x001F])),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(GetNamesFromIds::unmarshal_request(&ctx, stub).unwrap().guid.is_null());

    let response = GetNamesFromIdsResponse {
        prop_tags: UniquePtr::new(PropertyTagArray::new(vec![prop_id | 0x001F])),
        names: UniquePtr::new(PropertyNameSet::new(vec![PropertyName::new(
            ps_public_strings,
            0x8001,
        )])),
        return_value: status::SUCCESS,
    };
    let reply = GetNamesFromIds::marshal_response(&ctx, &response).unwrap();
    assert_eq!(GetNamesFromIds::unmarshal_response(&ctx, reply).unwrap(), response);
}

#[test]
fn test_opnum_table() {
    assert_eq!(NSPI.operation_name(4), Some("/nspi/v56/NspiSeekEntries"));
    assert_eq!(NSPI.operation_name(GetMatches::OPNUM), Some(GetMatches::NAME));
    assert_eq!(
        msrpc::operation_name(&NSPI, 15).unwrap_err().to_string(),
        "unknown opnum 15 for interface nspi"
    );
}
