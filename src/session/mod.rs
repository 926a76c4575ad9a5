//! Session state machine and element handle registry.
//!
//! A [`Session`] owns its own command channel, element registry and working
//! directory; nothing is shared through globals. The [`SessionGateway`]
//! wraps the session behind one exclusive lock and is what the HTTP layer
//! talks to.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `registry` | Element handle allocation and resolution |
//! | `gateway` | WebDriver-shaped operations and the session lifecycle |

// ============================================================================
// Submodules
// ============================================================================

/// Element handle registry.
pub mod registry;

/// Session gateway consumed by the HTTP layer.
pub mod gateway;

// ============================================================================
// Re-exports
// ============================================================================

pub use gateway::SessionGateway;
pub use registry::ElementRegistry;

// ============================================================================
// Imports
// ============================================================================

use std::path::Path;

use crate::identifiers::SessionId;
use crate::transport::CommandChannel;

// ============================================================================
// Session
// ============================================================================

/// One automation session: channel, registry, working directory.
///
/// The bridge supports exactly one concurrent session per automation
/// process; the working directory is exclusive to this session's channel.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    pub(crate) channel: CommandChannel,
    pub(crate) registry: ElementRegistry,
}

impl Session {
    /// Creates a session over an already-probed channel.
    pub(crate) fn new(id: SessionId, channel: CommandChannel) -> Self {
        Self {
            id,
            channel,
            registry: ElementRegistry::new(),
        }
    }

    /// Returns the session ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the working directory shared with the automation process.
    #[inline]
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        self.channel.work_dir()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_exposes_id_and_work_dir() {
        let id = SessionId::new();
        let session = Session::new(id, CommandChannel::new("/tmp/iosauto-test"));

        assert_eq!(session.id(), id);
        assert_eq!(session.work_dir(), Path::new("/tmp/iosauto-test"));
    }
}
