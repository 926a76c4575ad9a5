//! Type-safe identifiers for bridge entities.
//!
//! Newtype wrappers prevent mixing incompatible identifiers at compile time:
//!
//! - [`CommandIndex`] - position of a command on the file-based channel
//! - [`ElementHandle`] - opaque client-facing token for a UI element
//! - [`SessionId`] - identifier of the single active automation session

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// CommandIndex
// ============================================================================

/// Index of a command on the file-based channel.
///
/// Strictly increasing per channel instance. Starts at [`CommandIndex::UNUSED`]
/// (`-1`) before the first dispatch and is incremented before each write.
/// The index names both the command artifact and its matching response
/// artifact, which is the only request/response correlation mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandIndex(i64);

impl CommandIndex {
    /// Sentinel value for a channel that has not dispatched yet.
    pub const UNUSED: Self = Self(-1);

    /// Creates an index from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw index value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns the next index in sequence.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the previous index.
    ///
    /// Used to roll the counter back after a failed command write.
    #[inline]
    #[must_use]
    pub const fn prev(self) -> Self {
        Self(self.0 - 1)
    }

    /// Returns the command artifact filename for this index.
    ///
    /// Format: `<N>-cmd.txt`
    #[must_use]
    pub fn command_filename(self) -> String {
        format!("{}-cmd.txt", self.0)
    }

    /// Returns the response artifact filename for this index.
    ///
    /// Format: `<N>-resp.txt`
    #[must_use]
    pub fn response_filename(self) -> String {
        format!("{}-resp.txt", self.0)
    }
}

impl fmt::Display for CommandIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ElementHandle
// ============================================================================

/// Opaque client-facing token for a UI element.
///
/// Maps 1:1 to a script-level variable name holding a live element reference
/// inside the automation process. Handles are unique within a session and
/// live until the session is destroyed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(String);

impl ElementHandle {
    /// Creates a handle from a raw token.
    ///
    /// Typically the token comes back from an HTTP client; fresh handles are
    /// allocated by the element registry.
    #[inline]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SessionId
// ============================================================================

/// Identifier of an automation session.
///
/// Exactly one session may be active at a time; the ID distinguishes a live
/// session from a stale one in client-facing envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh random session ID.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
