//! WebDriver-shaped response envelope.
//!
//! Every HTTP response carries the same JSON shape:
//!
//! ```json
//! {"sessionId": "…", "status": 0, "value": "4"}
//! ```
//!
//! Status 0 means success. Every internal error collapses to status 13
//! (`UnknownError`) with a best-effort message in `value`; internal error
//! kinds are for logs only.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::error::Result;
use crate::identifiers::SessionId;

// ============================================================================
// Status Codes
// ============================================================================

/// WebDriver status codes used by the bridge.
pub mod status {
    /// The command executed successfully.
    pub const SUCCESS: u32 = 0;

    /// An unknown server-side error occurred.
    pub const UNKNOWN_ERROR: u32 = 13;
}

// ============================================================================
// WireResponse
// ============================================================================

/// The `{sessionId, status, value}` envelope returned to HTTP clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireResponse {
    /// ID of the session the command ran against, if any.
    #[serde(rename = "sessionId")]
    pub session_id: Option<SessionId>,

    /// WebDriver status code; see [`status`].
    pub status: u32,

    /// Command result, or a best-effort error description.
    pub value: Value,
}

impl WireResponse {
    /// Creates a success envelope.
    #[must_use]
    pub fn success(session_id: Option<SessionId>, value: Value) -> Self {
        Self {
            session_id,
            status: status::SUCCESS,
            value,
        }
    }

    /// Creates an `UnknownError` envelope with a best-effort message.
    #[must_use]
    pub fn unknown_error(session_id: Option<SessionId>, message: impl Into<String>) -> Self {
        Self {
            session_id,
            status: status::UNKNOWN_ERROR,
            value: json!({ "message": message.into() }),
        }
    }

    /// Collapses a gateway result into an envelope.
    ///
    /// This is the single point where internal error kinds disappear: the
    /// kind is logged, the client sees status 13.
    #[must_use]
    pub fn from_result<T: Serialize>(session_id: Option<SessionId>, result: Result<T>) -> Self {
        match result {
            Ok(value) => match serde_json::to_value(value) {
                Ok(value) => Self::success(session_id, value),
                Err(e) => {
                    warn!(error = %e, "Failed to serialize gateway result");
                    Self::unknown_error(session_id, e.to_string())
                }
            },
            Err(e) => {
                warn!(error = %e, status = e.webdriver_status(), "Gateway operation failed");
                Self {
                    session_id,
                    status: e.webdriver_status(),
                    value: json!({ "message": e.to_string() }),
                }
            }
        }
    }

    /// Returns `true` if the envelope carries a success status.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == status::SUCCESS
    }
}

// ============================================================================
// Tests
// ============================================================================
