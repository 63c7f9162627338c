//! NDR pointer types
//!
//! NDR supports three pointer semantics:
//!
//! - Reference (`[ref]`): never null. At the top level of a parameter list
//!   it has no wire form and the pointee is written in place; embedded in a
//!   struct it is a non-zero referent ID with the pointee deferred.
//! - Unique (`[unique]`): nullable, 4-byte referent ID, pointee deferred.
//! - Full (`[ptr]`): nullable, 4-byte referent ID, pointee deferred and
//!   written once no matter how many full pointers share it.
//!
//! A top-level `[ref]` parameter is modelled as the pointee type itself;
//! [`RefPtr`] is for the embedded case.

use std::any::Any;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::{NdrDecode, NdrEncode, NdrReader, NdrType, NdrWriter, Result};

/// Pointer attribute, as passed to
/// [`NdrWriter::write_pointer_token`](crate::NdrWriter::write_pointer_token).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Ref,
    Unique,
    Full,
}

/// Embedded reference pointer - non-null, pointee deferred
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefPtr<T>(pub T);

impl<T> RefPtr<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for RefPtr<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for RefPtr<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> NdrType for RefPtr<T> {
    const ALIGN: usize = 4;
}

impl<T: NdrEncode> NdrEncode for RefPtr<T> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_pointer_token(PointerKind::Ref, true)?;
        Ok(())
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_referent(&self.0)
    }
}

impl<T: NdrDecode + Default> NdrDecode for RefPtr<T> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        r.read_pointer_token(PointerKind::Ref)?;
        Ok(Self(T::default()))
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        self.0 = r.read_referent()?;
        Ok(())
    }
}

/// Unique pointer - nullable, no aliasing
///
/// The `[unique]` attribute in MIDL. Encoded as:
/// - 4-byte referent ID (0 = null, non-zero = valid)
/// - If non-null, pointee data in the deferred pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniquePtr<T>(pub Option<Box<T>>);

impl<T> UniquePtr<T> {
    pub fn new(value: T) -> Self {
        Self(Some(Box::new(value)))
    }

    pub fn null() -> Self {
        Self(None)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn into_option(self) -> Option<T> {
        self.0.map(|b| *b)
    }

    pub fn as_ref(&self) -> Option<&T> {
        self.0.as_deref()
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        self.0.as_deref_mut()
    }
}

impl<T> Default for UniquePtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> From<Option<T>> for UniquePtr<T> {
    fn from(opt: Option<T>) -> Self {
        Self(opt.map(Box::new))
    }
}

impl<T> NdrType for UniquePtr<T> {
    const ALIGN: usize = 4;
}

impl<T: NdrEncode> NdrEncode for UniquePtr<T> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_pointer_token(PointerKind::Unique, self.0.is_some())?;
        Ok(())
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        match &self.0 {
            Some(value) => w.write_referent(value.as_ref()),
            None => Ok(()),
        }
    }
}

impl<T: NdrDecode + Default> NdrDecode for UniquePtr<T> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let id = r.read_pointer_token(PointerKind::Unique)?;
        Ok(if id == 0 {
            Self::null()
        } else {
            // Placeholder until the deferred pass reaches the body
            Self::new(T::default())
        })
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        if let Some(slot) = self.0.as_mut() {
            **slot = r.read_referent()?;
        }
        Ok(())
    }
}

/// Full pointer - nullable, aliasing allowed
///
/// Pointers that share one `Arc` share one referent ID and one body on the
/// wire. Decoding restores the sharing: every occurrence of an ID yields a
/// clone of the same `Arc`.
#[derive(Debug, Clone)]
pub struct FullPtr<T> {
    value: Option<Arc<T>>,
    pending: u32,
}

impl<T> FullPtr<T> {
    pub fn new(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc(value: Arc<T>) -> Self {
        Self {
            value: Some(value),
            pending: 0,
        }
    }

    pub fn null() -> Self {
        Self {
            value: None,
            pending: 0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none() && self.pending == 0
    }

    pub fn get(&self) -> Option<&Arc<T>> {
        self.value.as_ref()
    }

    pub fn into_arc(self) -> Option<Arc<T>> {
        self.value
    }
}

impl<T> Default for FullPtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: PartialEq> PartialEq for FullPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> NdrType for FullPtr<T> {
    const ALIGN: usize = 4;
}

impl<T: NdrEncode + Any + Send + Sync> NdrEncode for FullPtr<T> {
    fn ndr_encode(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_full_pointer(self.value.as_ref())?;
        Ok(())
    }

    fn ndr_encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        match &self.value {
            Some(value) if w.claim_full_body(value) => w.write_referent(value.as_ref()),
            _ => Ok(()),
        }
    }
}

impl<T: NdrDecode + Any + Send + Sync> NdrDecode for FullPtr<T> {
    fn ndr_decode(r: &mut NdrReader) -> Result<Self> {
        let id = r.read_pointer_token(PointerKind::Full)?;
        if id == 0 {
            return Ok(Self::null());
        }
        match r.full_referent::<T>(id)? {
            Some(value) => Ok(Self::from_arc(value)),
            None => Ok(Self {
                value: None,
                pending: id,
            }),
        }
    }

    fn ndr_decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        if self.pending == 0 {
            return Ok(());
        }
        let id = std::mem::take(&mut self.pending);
        // An earlier pointer in this pass may have decoded the body already
        let value = match r.full_referent::<T>(id)? {
            Some(value) => value,
            None => {
                let value = Arc::new(r.read_referent::<T>()?);
                r.register_full_referent(id, value.clone());
                value
            }
        };
        self.value = Some(value);
        Ok(())
    }
}
