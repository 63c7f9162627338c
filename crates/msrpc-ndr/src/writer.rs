//! NDR stub writer

use std::any::Any;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::context::NdrContext;
use crate::error::{NdrError, Result};
use crate::pointers::PointerKind;
use crate::primitives::NdrPrimitive;
use crate::referents::ReferentTable;
use crate::unions::NdrUnion;
use crate::NdrEncode;

/// Aligned output cursor for one marshal pass.
///
/// Positions are relative to the start of the stub data, which is where the
/// writer starts. The referent table lives as long as the writer.
pub struct NdrWriter {
    buf: BytesMut,
    ctx: NdrContext,
    referents: ReferentTable,
    depth: usize,
}

impl NdrWriter {
    pub fn new(ctx: NdrContext) -> Self {
        Self {
            buf: BytesMut::with_capacity(256),
            ctx,
            referents: ReferentTable::new(),
            depth: 0,
        }
    }

    pub fn context(&self) -> &NdrContext {
        &self.ctx
    }

    /// Current offset from the start of the stub.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// Zero-pad up to the next multiple of `alignment`.
    pub fn write_align(&mut self, alignment: usize) -> Result<()> {
        let alignment = NdrContext::resolve_alignment(alignment)?;
        let padding = NdrContext::align_padding(self.buf.len(), alignment);
        self.buf.put_bytes(0, padding);
        Ok(())
    }

    /// Write a primitive at its natural alignment.
    pub fn write_data<T: NdrPrimitive>(&mut self, value: T) -> Result<()> {
        self.write_align(T::SIZE)?;
        value.put(&self.ctx, &mut self.buf);
        Ok(())
    }

    /// Append raw bytes without alignment.
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    /// Write a conformance or variance count.
    pub fn write_size(&mut self, size: usize) -> Result<()> {
        let size = u32::try_from(size).map_err(|_| NdrError::IntegerOverflow)?;
        self.write_data(size)
    }

    /// Write a union discriminant.
    pub fn write_switch<D: NdrPrimitive>(&mut self, switch: D) -> Result<()> {
        self.write_data(switch)
    }

    /// Write a pointer token and return the referent ID used (0 for null).
    ///
    /// A missing referent behind a `Ref` pointer is rejected.
    pub fn write_pointer_token(&mut self, kind: PointerKind, present: bool) -> Result<u32> {
        if !present {
            if kind == PointerKind::Ref {
                return Err(NdrError::NullRefPointer);
            }
            self.write_data(0u32)?;
            return Ok(0);
        }
        let id = self.referents.allocate()?;
        trace!(?kind, referent_id = id, "allocated referent");
        self.write_data(id)?;
        Ok(id)
    }

    /// Write a full pointer token, reusing the referent ID of an object seen
    /// earlier in this pass.
    pub fn write_full_pointer<T: Any + Send + Sync>(&mut self, value: Option<&Arc<T>>) -> Result<u32> {
        let Some(value) = value else {
            self.write_data(0u32)?;
            return Ok(0);
        };
        let (id, first) = self.referents.full_pointer(value)?;
        if first {
            trace!(referent_id = id, "allocated full referent");
        } else {
            trace!(referent_id = id, "aliased full referent");
        }
        self.write_data(id)?;
        Ok(id)
    }

    /// True if the body for this shared object has not been written yet.
    pub fn claim_full_body<T: Any + Send + Sync>(&mut self, value: &Arc<T>) -> bool {
        self.referents.claim_body(value)
    }

    /// Run the deferred pass of `value`.
    pub fn write_deferred<T: NdrEncode + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.ndr_encode_deferred(self)
    }

    /// Write a pointer body: both passes, one level deeper.
    pub fn write_referent<T: NdrEncode + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.nested(|w| {
            value.ndr_encode(w)?;
            value.ndr_encode_deferred(w)
        })
    }

    /// Run `f` one pointer level deeper, enforcing the depth limit.
    pub fn nested<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.depth >= self.ctx.max_depth {
            return Err(NdrError::DepthExceeded(self.ctx.max_depth));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Write a top-level parameter: scalars, then its referents.
    pub fn write_param<T: NdrEncode + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.ndr_encode(self)?;
        value.ndr_encode_deferred(self)
    }

    /// Write a union discriminant and the active arm's scalar part.
    pub fn write_union<U: NdrUnion>(&mut self, value: &U, switch: U::Discriminant) -> Result<()> {
        if !value.accepts(switch) {
            return Err(NdrError::DiscriminantMismatch {
                expected: switch.into(),
                got: value.discriminant().into(),
            });
        }
        self.write_switch(switch)?;
        self.write_align(U::ARM_ALIGN)?;
        value.encode_arm(self)
    }

    /// Deferred pass of the active arm.
    pub fn write_union_deferred<U: NdrUnion>(&mut self, value: &U) -> Result<()> {
        value.encode_arm_deferred(self)
    }
}
