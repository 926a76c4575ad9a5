//! Element handle registry.
//!
//! Allocates opaque handles for UI elements discovered by a query and maps
//! each handle to the script-level variable holding the live element
//! reference. Handles are never explicitly destroyed; destroying the session
//! invalidates them all at once.
//!
//! Uniqueness comes from a monotonic in-process counter. Wall-clock naming
//! would collide when two allocations land in the same timer tick.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::ElementHandle;
use crate::protocol::script;
use crate::transport::{BatchRecorder, CommandChannel};

// ============================================================================
// ElementRegistry
// ============================================================================

/// Registry of element handles for one session.
#[derive(Debug, Default)]
pub struct ElementRegistry {
    /// Monotonic counter backing handle allocation.
    next: u64,
    /// Accessor expression for each successfully bound handle.
    bound: FxHashMap<ElementHandle, String>,
}

impl ElementRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh handle, unique for the registry's lifetime.
    ///
    /// The handle doubles as the script-level variable name (`wde0`,
    /// `wde1`, …). Allocation does not bind; [`resolve`](Self::resolve)
    /// fails until a bind dispatch succeeds.
    pub fn allocate(&mut self) -> ElementHandle {
        let handle = ElementHandle::new(format!("wde{}", self.next));
        self.next += 1;
        trace!(%handle, "Handle allocated");
        handle
    }

    /// Binds a handle to an element expression through one dispatch.
    ///
    /// Issues `elements['<h>'] = <expression>;` on the channel. The mapping
    /// is committed only after the dispatch succeeds; on failure the handle
    /// stays unbound.
    ///
    /// # Errors
    ///
    /// Propagates the channel error from the bind dispatch.
    pub async fn bind(
        &mut self,
        handle: &ElementHandle,
        expression: &str,
        channel: &mut CommandChannel,
    ) -> Result<()> {
        let statement = script::assign_element(handle.as_str(), expression);
        channel.dispatch(&statement).await?;

        self.commit(handle);
        Ok(())
    }

    /// Binds a handle inside an open batch.
    ///
    /// The assignment is recorded, not dispatched; the caller flushes the
    /// batch and must [`unbind`](Self::unbind) the handle if the flush fails
    /// or its sentinel never comes back.
    pub fn bind_batched(
        &mut self,
        handle: &ElementHandle,
        expression: &str,
        batch: &mut BatchRecorder,
    ) {
        let statement = script::assign_element(handle.as_str(), expression);
        batch.record(statement);
        self.commit(handle);
    }

    /// Records the accessor mapping for a handle.
    fn commit(&mut self, handle: &ElementHandle) {
        let accessor = script::element_accessor(handle.as_str());
        self.bound.insert(handle.clone(), accessor);
        debug!(%handle, "Handle bound");
    }

    /// Removes a handle whose bind dispatch did not complete.
    ///
    /// Returns `true` if the handle was bound.
    pub fn unbind(&mut self, handle: &ElementHandle) -> bool {
        self.bound.remove(handle).is_some()
    }

    /// Resolves a handle to its accessor expression.
    ///
    /// Pure local lookup; never blocks, never fails for a handle that was
    /// successfully bound.
    ///
    /// # Errors
    ///
    /// [`Error::UnboundHandle`] for unknown or unbound handles.
    pub fn resolve(&self, handle: &ElementHandle) -> Result<&str> {
        self.bound
            .get(handle)
            .map(String::as_str)
            .ok_or_else(|| Error::unbound_handle(handle.clone()))
    }

    /// Returns the number of bound handles.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// Returns `true` if no handles are bound.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    /// Invalidates every handle.
    ///
    /// Called on session deletion; the counter keeps advancing so stale
    /// handles can never be re-allocated.
    pub fn clear(&mut self) {
        let count = self.bound.len();
        self.bound.clear();
        debug!(count, "All handles invalidated");
    }
}

// ============================================================================
// Tests
// ============================================================================
