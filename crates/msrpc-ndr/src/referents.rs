//! Referent ID tables
//!
//! Referent IDs are scoped to one marshal or unmarshal pass. The encode side
//! hands out IDs and remembers which shared objects already have one; the
//! decode side remembers which full-pointer bodies it has already built.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{NdrError, Result};

/// First referent ID handed out in a pass.
pub const FIRST_REFERENT_ID: u32 = 0x0002_0000;

/// Increment between consecutive referent IDs.
pub const REFERENT_ID_STEP: u32 = 4;

type Shared = Arc<dyn Any + Send + Sync>;

struct FullEntry {
    id: u32,
    emitted: bool,
    // Holds the object alive so its address cannot be reused within the pass.
    _keep: Shared,
}

/// Encode-side referent table.
pub struct ReferentTable {
    next_id: u32,
    full: HashMap<usize, FullEntry>,
}

impl ReferentTable {
    pub fn new() -> Self {
        Self {
            next_id: FIRST_REFERENT_ID,
            full: HashMap::new(),
        }
    }

    /// Allocate a fresh referent ID.
    pub fn allocate(&mut self) -> Result<u32> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(REFERENT_ID_STEP)
            .ok_or(NdrError::IntegerOverflow)?;
        Ok(id)
    }

    /// ID for a full pointer to `value`, reusing the one from an earlier
    /// occurrence of the same object. The flag is true on first sight.
    pub fn full_pointer<T: Any + Send + Sync>(&mut self, value: &Arc<T>) -> Result<(u32, bool)> {
        let key = Arc::as_ptr(value) as *const () as usize;
        if let Some(entry) = self.full.get(&key) {
            return Ok((entry.id, false));
        }
        let id = self.allocate()?;
        let keep: Shared = value.clone();
        self.full.insert(
            key,
            FullEntry {
                id,
                emitted: false,
                _keep: keep,
            },
        );
        Ok((id, true))
    }

    /// Returns true exactly once per shared object: the first time its body
    /// is due in the deferred pass.
    pub fn claim_body<T: Any + Send + Sync>(&mut self, value: &Arc<T>) -> bool {
        let key = Arc::as_ptr(value) as *const () as usize;
        match self.full.get_mut(&key) {
            Some(entry) if !entry.emitted => {
                entry.emitted = true;
                true
            }
            _ => false,
        }
    }
}

impl Default for ReferentTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode-side table of full-pointer bodies already materialised.
#[derive(Default)]
pub struct ReferentCache {
    full: HashMap<u32, Shared>,
}

impl ReferentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the body decoded for `id`, if any.
    ///
    /// A body registered under a different type is an invalid pointer.
    pub fn get<T: Any + Send + Sync>(&self, id: u32) -> Result<Option<Arc<T>>> {
        match self.full.get(&id) {
            Some(shared) => shared
                .clone()
                .downcast::<T>()
                .map(Some)
                .map_err(|_| NdrError::InvalidPointer(id)),
            None => Ok(None),
        }
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, id: u32, value: Arc<T>) {
        self.full.insert(id, value);
    }
}
