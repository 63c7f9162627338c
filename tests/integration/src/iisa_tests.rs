//! IIS Application Host Tests - DCOM Getter Exchanges
//!
//! Each test plays both sides of a call: the client marshals the request,
//! the server unmarshals it and answers, and the client interprets the
//! response. Covers:
//! - ORPCTHIS/ORPCTHAT envelopes with and without extensions
//! - BSTR and DWORD getters
//! - HRESULT failures surfacing as errors
//! - SAFEARRAY(VARIANT) results

mod common;

use common::*;
use msrpc::dcom::{OrpcExtent, OrpcExtentArray, OrpcThat, OrpcThis};
use msrpc::hresult;
use msrpc::iisa::{
    BstrResponse, ErrorString, FileName, InvalidValue, LineNumber, LineNumberResponse,
    OrpcRequest, SafeArrayResponse, ValidationFailureParameters, CONFIG_EXCEPTION,
    PROPERTY_EXCEPTION,
};
use msrpc::oaut::{
    sf_type, Bstr, BstrPtr, SafeArray, SafeArrayData, Variant, VariantPtr, VariantValue,
};
use msrpc::MsrpcError;
use msrpc_ndr::{NdrContext, NdrError, NdrUuid, Operation, ReservedPolicy, UniquePtr};

fn causality_id() -> NdrUuid {
    NdrUuid::parse("6f1a2b3c-4d5e-6f70-8192-a3b4c5d6e7f8").unwrap()
}

/// Server side of a BSTR getter.
fn serve_bstr<Op>(ctx: &NdrContext, stub: bytes::Bytes, value: Option<&str>, hr: u32) -> bytes::Bytes
where
    Op: Operation<Request = OrpcRequest, Response = BstrResponse>,
{
    let request = Op::unmarshal_request(ctx, stub).unwrap();
    assert_eq!(request.this.cid, causality_id());
    let response = BstrResponse {
        that: OrpcThat::default(),
        value: value.map(Bstr::new).into(),
        return_value: hr as i32,
    };
    Op::marshal_response(ctx, &response).unwrap()
}

#[test]
fn test_file_name_exchange() {
    init_tracing();
    let ctx = NdrContext::new();
    let request = OrpcRequest {
        this: OrpcThis::new(causality_id()),
    };
    let stub = FileName::marshal_request(&ctx, &request).unwrap();
    assert_eq!(stub.len(), 32);

    let reply = serve_bstr::<FileName>(
        &ctx,
        stub,
        Some(r"C:\Windows\System32\inetsrv\config\applicationHost.config"),
        hresult::S_OK,
    );
    let response = FileName::unmarshal_response(&ctx, reply).unwrap();
    assert_eq!(
        response.into_result(FileName::NAME).unwrap().as_deref(),
        Some(r"C:\Windows\System32\inetsrv\config\applicationHost.config")
    );
}

#[test]
fn test_bstr_response_layout() {
    init_tracing();
    let response = BstrResponse {
        that: OrpcThat::default(),
        value: BstrPtr::new(Bstr::new("a.b")),
        return_value: 0,
    };
    let data = ErrorString::marshal_response(&NdrContext::new(), &response).unwrap();
    assert_eq!(u32_at(&data, 0), 0); // flags
    assert_eq!(u32_at(&data, 4), 0); // no extensions
    assert_eq!(u32_at(&data, 8), 0x0002_0000);
    assert_eq!(u32_at(&data, 12), 3); // clSize, hoisted
    assert_eq!(u32_at(&data, 16), 6); // cBytes
    assert_eq!(u32_at(&data, 20), 3);
    assert_eq!(&data[24..30], &[b'a', 0, b'.', 0, b'b', 0]);
    // HRESULT after two bytes of padding
    assert_eq!(data.len(), 36);
    assert_eq!(u32_at(&data, 32), 0);
}

#[test]
fn test_line_number_with_extensions() {
    init_tracing();
    let ctx = NdrContext::new();
    let mut this = OrpcThis::new(causality_id());
    this.extensions = UniquePtr::new(OrpcExtentArray::new(vec![OrpcExtent::new(
        causality_id(),
        b"debug".to_vec(),
    )]));
    let stub = LineNumber::marshal_request(&ctx, &OrpcRequest { this: this.clone() }).unwrap();
    let request = LineNumber::unmarshal_request(&ctx, stub).unwrap();
    assert_eq!(request.this, this);

    let response = LineNumberResponse {
        that: OrpcThat::default(),
        line_number: 118,
        return_value: 0,
    };
    let reply = LineNumber::marshal_response(&ctx, &response).unwrap();
    let decoded = LineNumber::unmarshal_response(&ctx, reply).unwrap();
    assert_eq!(decoded.into_result(LineNumber::NAME).unwrap(), 118);
}

#[test]
fn test_failed_getter() {
    init_tracing();
    let ctx = NdrContext::new();
    let stub = InvalidValue::marshal_request(
        &ctx,
        &OrpcRequest {
            this: OrpcThis::new(causality_id()),
        },
    )
    .unwrap();
    let reply = serve_bstr::<InvalidValue>(&ctx, stub, None, hresult::E_NOTIMPL);
    let response = InvalidValue::unmarshal_response(&ctx, reply).unwrap();
    assert!(response.value.is_null());

    let err = response.into_result(InvalidValue::NAME).unwrap_err();
    assert!(matches!(err, MsrpcError::Status { code: hresult::E_NOTIMPL, .. }));
    assert_eq!(
        err.to_string(),
        "/IAppHostPropertyException/v0/InvalidValue: E_NOTIMPL: not implemented (0x80004001)"
    );
}

#[test]
fn test_reserved_envelope_field() {
    init_tracing();
    let ctx = NdrContext::new();
    let mut stub = FileName::marshal_request(
        &ctx,
        &OrpcRequest {
            this: OrpcThis::new(causality_id()),
        },
    )
    .unwrap()
    .to_vec();
    // ORPCTHIS.reserved1
    stub[8] = 0x01;
    assert!(matches!(
        FileName::unmarshal_request(&ctx, stub.clone()),
        Err(NdrError::NonZeroReserved(1))
    ));

    let lenient = ctx.with_reserved_policy(ReservedPolicy::Ignore);
    assert!(FileName::unmarshal_request(&lenient, stub).is_ok());
}

#[test]
fn test_validation_failure_parameters_exchange() {
    init_tracing();
    let ctx = NdrContext::new();
    let stub = ValidationFailureParameters::marshal_request(
        &ctx,
        &OrpcRequest {
            this: OrpcThis::new(causality_id()),
        },
    )
    .unwrap();
    ValidationFailureParameters::unmarshal_request(&ctx, stub).unwrap();

    let parameters = SafeArray::vector(SafeArrayData::Variant(
        [
            VariantValue::Bstr(BstrPtr::new(Bstr::new("maxAllowedContentLength"))),
            VariantValue::UI4(30_000_000),
        ]
        .into_iter()
        .map(|v| VariantPtr::new(Variant::new(v)))
        .collect(),
    ));
    let reply = ValidationFailureParameters::marshal_response(
        &ctx,
        &SafeArrayResponse {
            that: OrpcThat::default(),
            parameters: UniquePtr::new(parameters.clone()),
            return_value: hresult::S_OK as i32,
        },
    )
    .unwrap();
    // ORPCTHAT, SAFEARRAY pointer, then the array body
    assert_eq!(u32_at(&reply, 12), 1); // cDims, hoisted
    assert_eq!(u32_at(&reply, 28), sf_type::VARIANT);
    assert_eq!(u32_at(&reply, 32), sf_type::VARIANT);
    assert_eq!(u32_at(&reply, 36), 2);

    let response = ValidationFailureParameters::unmarshal_response(&ctx, reply).unwrap();
    let decoded = response
        .into_result(ValidationFailureParameters::NAME)
        .unwrap()
        .unwrap();
    assert_eq!(decoded, parameters);
    let SafeArrayData::Variant(values) = decoded.data else {
        panic!("expected a variant array");
    };
    assert_eq!(
        values.as_slice()[1].as_ref().map(|v| &v.0),
        Some(&VariantValue::UI4(30_000_000))
    );
}

#[test]
fn test_interface_tables() {
    assert_eq!(CONFIG_EXCEPTION.operation_name(FileName::OPNUM), Some(FileName::NAME));
    assert_eq!(PROPERTY_EXCEPTION.operation_name(FileName::OPNUM), Some(FileName::NAME));
    assert_eq!(CONFIG_EXCEPTION.operation_name(InvalidValue::OPNUM), None);
    assert_eq!(
        PROPERTY_EXCEPTION.operation_name(12),
        Some(ValidationFailureParameters::NAME)
    );
    assert_eq!(
        PROPERTY_EXCEPTION.uuid,
        NdrUuid::parse("eafe4895-a929-41ea-b14d-613e23f62b71").unwrap()
    );
}
