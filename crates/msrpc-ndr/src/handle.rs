//! RPC context handles

use std::fmt;

use crate::primitives::NdrUuid;

crate::ndr_struct! {
    /// Server-issued session token (`ndr_context_handle`).
    ///
    /// 20 bytes on the wire: the attribute word followed by a UUID. Clients
    /// treat it as opaque and send back exactly what the server returned.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContextHandle {
        pub attributes: u32,
        pub uuid: NdrUuid,
    }
}

impl ContextHandle {
    /// Handle with zero attributes and a nil UUID, as returned by a closed
    /// or failed session.
    pub const NULL: Self = Self {
        attributes: 0,
        uuid: NdrUuid::NIL,
    };

    pub fn new(attributes: u32, uuid: NdrUuid) -> Self {
        Self { attributes, uuid }
    }

    pub fn is_null(&self) -> bool {
        self.attributes == 0 && self.uuid.is_nil()
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}:{}", self.attributes, self.uuid)
    }
}
