//! Wire format for the file-based automation protocol.
//!
//! This module defines how the bridge talks to the automation process:
//!
//! | Direction | Format |
//! |-----------|--------|
//! | Bridge → Automation | raw UIAutomation script text in `<N>-cmd.txt` |
//! | Automation → Bridge | `<response>code,payload</response>` units in `<N>-resp.txt` |
//! | Bridge → HTTP client | `{sessionId, status, value}` JSON envelope |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `response` | Response artifact codec |
//! | `script` | UIAutomation script expression builder |
//! | `envelope` | WebDriver-shaped response envelope |

// ============================================================================
// Submodules
// ============================================================================

/// Response artifact codec.
pub mod response;

/// UIAutomation script expression builder.
pub mod script;

/// WebDriver response envelope and status codes.
pub mod envelope;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::WireResponse;
pub use response::{ResponseRecord, ResponseUnit};
