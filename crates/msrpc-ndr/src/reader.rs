//! NDR stub reader

use std::any::Any;
use std::sync::Arc;

use bytes::{Buf, Bytes};
use tracing::{trace, warn};

use crate::context::{NdrContext, ReservedPolicy};
use crate::error::{NdrError, Result};
use crate::pointers::PointerKind;
use crate::primitives::NdrPrimitive;
use crate::referents::ReferentCache;
use crate::unions::NdrUnion;
use crate::NdrDecode;

/// Aligned input cursor for one unmarshal pass.
///
/// Every read is bounds checked; running out of input is an error, never a
/// panic.
pub struct NdrReader {
    data: Bytes,
    len: usize,
    ctx: NdrContext,
    referents: ReferentCache,
    depth: usize,
}

impl NdrReader {
    pub fn new(ctx: NdrContext, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            len: data.len(),
            data,
            ctx,
            referents: ReferentCache::new(),
            depth: 0,
        }
    }

    pub fn context(&self) -> &NdrContext {
        &self.ctx
    }

    /// Current offset from the start of the stub.
    pub fn position(&self) -> usize {
        self.len - self.data.remaining()
    }

    pub fn remaining(&self) -> usize {
        self.data.remaining()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let have = self.data.remaining();
        if have < needed {
            return Err(NdrError::BufferUnderflow { needed, have });
        }
        Ok(())
    }

    /// Skip padding up to the next multiple of `alignment`.
    pub fn read_align(&mut self, alignment: usize) -> Result<()> {
        let alignment = NdrContext::resolve_alignment(alignment)?;
        let padding = NdrContext::align_padding(self.position(), alignment);
        self.ensure(padding)?;
        self.data.advance(padding);
        Ok(())
    }

    /// Read a primitive at its natural alignment.
    pub fn read_data<T: NdrPrimitive>(&mut self) -> Result<T> {
        self.read_align(T::SIZE)?;
        self.ensure(T::SIZE)?;
        Ok(T::get(&self.ctx, &mut self.data))
    }

    /// Take `len` raw bytes without alignment.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        self.ensure(len)?;
        Ok(self.data.split_to(len))
    }

    /// Read a conformance or variance count.
    pub fn read_size(&mut self) -> Result<usize> {
        let size: u32 = self.read_data()?;
        Ok(size as usize)
    }

    /// Read a union discriminant.
    pub fn read_switch<D: NdrPrimitive>(&mut self) -> Result<D> {
        self.read_data()
    }

    /// Read a pointer token. A null `Ref` token is rejected.
    pub fn read_pointer_token(&mut self, kind: PointerKind) -> Result<u32> {
        let id: u32 = self.read_data()?;
        if id == 0 && kind == PointerKind::Ref {
            return Err(NdrError::NullRefPointer);
        }
        Ok(id)
    }

    /// Body already decoded for a full pointer ID, if any.
    pub fn full_referent<T: Any + Send + Sync>(&self, id: u32) -> Result<Option<Arc<T>>> {
        let found = self.referents.get(id)?;
        if found.is_some() {
            trace!(referent_id = id, "aliased full referent");
        }
        Ok(found)
    }

    pub fn register_full_referent<T: Any + Send + Sync>(&mut self, id: u32, value: Arc<T>) {
        self.referents.insert(id, value);
    }

    /// Validate an element count before allocating for it.
    ///
    /// Rejects counts above the context limits and counts whose minimal wire
    /// size (`count * min_size`) exceeds the remaining input. `min_size` is a
    /// lower bound on one element's encoding, not its exact size; array
    /// decoders pass the element's `NdrType::ALIGN`.
    pub fn check_count(&self, what: &'static str, count: usize, min_size: usize) -> Result<()> {
        if count > self.ctx.max_array_elements {
            return Err(NdrError::AllocationLimitExceeded {
                requested: count,
                limit: self.ctx.max_array_elements,
            });
        }
        let bytes = count
            .checked_mul(min_size.max(1))
            .ok_or(NdrError::IntegerOverflow)?;
        if bytes > self.ctx.max_allocation_bytes {
            return Err(NdrError::AllocationLimitExceeded {
                requested: bytes,
                limit: self.ctx.max_allocation_bytes,
            });
        }
        let remaining = self.remaining();
        if bytes > remaining {
            return Err(NdrError::BufferOverflow {
                what,
                claimed: bytes,
                remaining,
            });
        }
        Ok(())
    }

    /// Apply the reserved-field policy to a decoded must-be-zero value.
    pub fn check_reserved(&self, bits: u64) -> Result<()> {
        if bits == 0 {
            return Ok(());
        }
        match self.ctx.reserved_policy {
            ReservedPolicy::Reject => Err(NdrError::NonZeroReserved(bits)),
            ReservedPolicy::Ignore => {
                warn!(value = bits, position = self.position(), "ignoring non-zero reserved field");
                Ok(())
            }
        }
    }

    /// Run the deferred pass of `value`.
    pub fn read_deferred<T: NdrDecode>(&mut self, value: &mut T) -> Result<()> {
        value.ndr_decode_deferred(self)
    }

    /// Read a pointer body: both passes, one level deeper.
    pub fn read_referent<T: NdrDecode>(&mut self) -> Result<T> {
        self.nested(|r| {
            let mut value = T::ndr_decode(r)?;
            value.ndr_decode_deferred(r)?;
            Ok(value)
        })
    }

    /// Run `f` one pointer level deeper, enforcing the depth limit.
    pub fn nested<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if self.depth >= self.ctx.max_depth {
            return Err(NdrError::DepthExceeded(self.ctx.max_depth));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Read a top-level parameter: scalars, then its referents.
    pub fn read_param<T: NdrDecode>(&mut self) -> Result<T> {
        let mut value = T::ndr_decode(self)?;
        value.ndr_decode_deferred(self)?;
        Ok(value)
    }

    /// Read a union discriminant and the selected arm's scalar part.
    ///
    /// `expected` carries a discriminant derived from a sibling field; the
    /// wire value must agree with it.
    pub fn read_union<U: NdrUnion>(&mut self, expected: Option<U::Discriminant>) -> Result<U> {
        let switch: U::Discriminant = self.read_switch()?;
        if let Some(expected) = expected {
            if expected != switch {
                return Err(NdrError::DiscriminantMismatch {
                    expected: expected.into(),
                    got: switch.into(),
                });
            }
        }
        self.read_align(U::ARM_ALIGN)?;
        trace!(switch = ?switch, "decoding union arm");
        U::decode_arm(switch, self)
    }

    /// Deferred pass of the decoded arm.
    pub fn read_union_deferred<U: NdrUnion>(&mut self, value: &mut U) -> Result<()> {
        value.decode_arm_deferred(self)
    }
}
