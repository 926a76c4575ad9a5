//! Error types for the Instruments bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use instruments_bridge::{Result, Error};
//!
//! async fn example(channel: &mut CommandChannel) -> Result<()> {
//!     let record = channel.dispatch("target.frontMostApp();").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Channel | [`Error::CommandWriteFailed`], [`Error::ResponseTimeout`] |
//! | Protocol | [`Error::Decode`] |
//! | Element | [`Error::UnboundHandle`], [`Error::UnsupportedElementType`] |
//! | Session | [`Error::SessionAlreadyActive`], [`Error::SessionStartFailed`], [`Error::SessionNotFound`] |
//! | External | [`Error::Io`] |
//!
//! Nothing in this crate is retried automatically; the HTTP client decides
//! whether to re-issue a request. At the HTTP boundary every variant collapses
//! to the WebDriver `UnknownError` status (13) via [`Error::webdriver_status`];
//! the internal kind is preserved for logs only.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::{CommandIndex, ElementHandle};
use crate::protocol::envelope::status;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Channel Errors
    // ========================================================================
    /// Failed to write a command artifact.
    ///
    /// The channel rolls its index back and stays usable; the operation
    /// fails immediately and is not retried.
    #[error("Failed to write command {index}: {message}")]
    CommandWriteFailed {
        /// Index of the command that could not be written.
        index: CommandIndex,
        /// Underlying I/O failure.
        message: String,
    },

    /// No response artifact appeared within the timeout.
    ///
    /// The index is abandoned, never reused; a late response is never read.
    #[error("No response for command {index} after {timeout_ms}ms")]
    ResponseTimeout {
        /// Index of the command that timed out.
        index: CommandIndex,
        /// Milliseconds waited before giving up.
        timeout_ms: u64,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Response decode produced no usable result.
    ///
    /// Individual malformed units are skipped, not errors; this variant is
    /// for responses that are unusable as a whole (e.g. zero units where one
    /// was required, or a missing batch sentinel).
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    // ========================================================================
    // Element Errors
    // ========================================================================
    /// Handle used before its bind dispatch succeeded.
    ///
    /// This is an ordering error on the caller's side; it fails fast.
    #[error("Unbound element handle: {handle}")]
    UnboundHandle {
        /// The unbound handle.
        handle: ElementHandle,
    },

    /// Element type has no known script query.
    #[error("Unsupported element type: {element_type}")]
    UnsupportedElementType {
        /// The unrecognized UI element type tag.
        element_type: String,
    },

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// A second session was requested while one is active.
    ///
    /// The bridge supports exactly one concurrent session.
    #[error("A session is already active")]
    SessionAlreadyActive,

    /// The automation process was not responsive at session creation.
    #[error("Session start failed: {message}")]
    SessionStartFailed {
        /// Description of the startup failure.
        message: String,
    },

    /// Operation issued with no active session.
    #[error("No active session")]
    SessionNotFound,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a command write failure.
    #[inline]
    pub fn command_write_failed(index: CommandIndex, err: IoError) -> Self {
        Self::CommandWriteFailed {
            index,
            message: err.to_string(),
        }
    }

    /// Creates a response timeout error.
    #[inline]
    pub fn response_timeout(index: CommandIndex, timeout_ms: u64) -> Self {
        Self::ResponseTimeout { index, timeout_ms }
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates an unbound handle error.
    #[inline]
    pub fn unbound_handle(handle: ElementHandle) -> Self {
        Self::UnboundHandle { handle }
    }

    /// Creates an unsupported element type error.
    #[inline]
    pub fn unsupported_element_type(element_type: impl Into<String>) -> Self {
        Self::UnsupportedElementType {
            element_type: element_type.into(),
        }
    }

    /// Creates a session start failure.
    #[inline]
    pub fn session_start_failed(message: impl Into<String>) -> Self {
        Self::SessionStartFailed {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ResponseTimeout { .. })
    }

    /// Returns `true` if this is a channel-level error.
    #[inline]
    #[must_use]
    pub fn is_channel_error(&self) -> bool {
        matches!(
            self,
            Self::CommandWriteFailed { .. } | Self::ResponseTimeout { .. } | Self::Io(_)
        )
    }

    /// Returns `true` if this is a session state-machine violation.
    #[inline]
    #[must_use]
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            Self::SessionAlreadyActive | Self::SessionStartFailed { .. } | Self::SessionNotFound
        )
    }

    /// Returns the WebDriver status code for this error.
    ///
    /// Every internal kind collapses to `UnknownError` (13) at the HTTP
    /// boundary; clients never see the internal taxonomy.
    #[inline]
    #[must_use]
    pub fn webdriver_status(&self) -> u32 {
        status::UNKNOWN_ERROR
    }
}

// ============================================================================
// Tests
// ============================================================================
