//! Operations and interface metadata
//!
//! An operation pairs an opnum and a name with its request and response
//! parameter lists. The same types serve both sides of the call: a client
//! marshals the request and unmarshals the response, a server does the
//! reverse.

use bytes::Bytes;

use crate::primitives::NdrUuid;
use crate::{NdrContext, NdrReader, NdrWriter, Result};

/// A parameter list marshalled as one stub.
pub trait NdrMessage: Sized {
    fn marshal_ndr(&self, w: &mut NdrWriter) -> Result<()>;

    fn unmarshal_ndr(r: &mut NdrReader) -> Result<Self>;
}

/// Marshal a parameter list into stub data.
pub fn marshal<M: NdrMessage>(ctx: &NdrContext, message: &M) -> Result<Bytes> {
    let mut w = NdrWriter::new(*ctx);
    message.marshal_ndr(&mut w)?;
    Ok(w.into_bytes())
}

/// Unmarshal a parameter list from stub data.
pub fn unmarshal<M: NdrMessage>(ctx: &NdrContext, data: impl Into<Bytes>) -> Result<M> {
    let mut r = NdrReader::new(*ctx, data);
    M::unmarshal_ndr(&mut r)
}

/// One method of an RPC interface.
pub trait Operation {
    const OPNUM: u16;
    /// Path-style name, `/Interface/vN/Method`.
    const NAME: &'static str;

    type Request: NdrMessage;
    type Response: NdrMessage;

    fn marshal_request(ctx: &NdrContext, request: &Self::Request) -> Result<Bytes> {
        marshal(ctx, request)
    }

    fn unmarshal_request(ctx: &NdrContext, data: impl Into<Bytes>) -> Result<Self::Request> {
        unmarshal(ctx, data)
    }

    fn marshal_response(ctx: &NdrContext, response: &Self::Response) -> Result<Bytes> {
        marshal(ctx, response)
    }

    fn unmarshal_response(ctx: &NdrContext, data: impl Into<Bytes>) -> Result<Self::Response> {
        unmarshal(ctx, data)
    }
}

/// Static description of an interface: identity plus its opnum table.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceInfo {
    pub name: &'static str,
    pub uuid: NdrUuid,
    pub version: (u16, u16),
    pub operations: &'static [(u16, &'static str)],
}

impl InterfaceInfo {
    /// Name of the operation at `opnum`, if the interface defines one.
    pub fn operation_name(&self, opnum: u16) -> Option<&'static str> {
        self.operations
            .iter()
            .find(|(op, _)| *op == opnum)
            .map(|(_, name)| *name)
    }

    pub fn opnums(&self) -> impl Iterator<Item = u16> + '_ {
        self.operations.iter().map(|(op, _)| *op)
    }
}
