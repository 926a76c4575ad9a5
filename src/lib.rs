//! Instruments bridge - WebDriver-style driver for iOS UIAutomation.
//!
//! This library lets a remote HTTP client drive a running mobile-app UI
//! automation session by translating WebDriver-shaped REST calls into
//! UIAutomation script commands executed inside an external automation
//! process (Apple Instruments), and relaying results back.
//!
//! # Architecture
//!
//! The bridge and the automation process communicate through files in a
//! shared working directory:
//!
//! - Bridge writes `<N>-cmd.txt` holding raw script text
//! - Automation process executes it and writes `<N>-resp.txt` holding
//!   `<response>code,payload</response>` units
//!
//! Key design principles:
//!
//! - One [`Session`] owns its channel, registry and working directory;
//!   no module-level globals
//! - At most one command outstanding at a time (`&mut` channel access)
//! - Element discovery batches all bind commands into one dispatch
//! - Handles come from a monotonic counter, never the wall clock
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use instruments_bridge::{Result, SessionGateway, TempSupervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // The supervisor guarantees a working directory with a live,
//!     // polling automation process behind it.
//!     let supervisor = Arc::new(TempSupervisor::new()?);
//!     let gateway = SessionGateway::new(supervisor);
//!
//!     gateway.create_session().await?;
//!     let answer = gateway.execute_script("2+2;").await?;
//!     println!("automation says: {answer}");
//!
//!     let buttons = gateway.find_elements("tag name", "button").await?;
//!     if let Some(button) = buttons.first() {
//!         gateway.click(button).await?;
//!     }
//!
//!     gateway.delete_session().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `driver` | [`Supervisor`] collaborator seam for process lifecycle |
//! | `error` | Error types and [`Result`] alias |
//! | `identifiers` | Type-safe ID wrappers |
//! | `protocol` | Wire format: response codec, script builder, envelope |
//! | `session` | Session state machine, registry and gateway |
//! | `transport` | File-based command channel and batch recorder |

// ============================================================================
// Modules
// ============================================================================

/// Automation process supervision seam.
///
/// The [`Supervisor`] trait is the narrow interface behind which process
/// launch, bootstrap templating and simulator control live.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for bridge entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Wire format for the file-based automation protocol.
pub mod protocol;

/// Session state machine, element registry and gateway.
pub mod session;

/// File-based transport to the automation process.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Driver types
pub use driver::{FixedSupervisor, Supervisor, TempSupervisor};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{CommandIndex, ElementHandle, SessionId};

// Protocol types
pub use protocol::{ResponseRecord, ResponseUnit, WireResponse};

// Session types
pub use session::{ElementRegistry, Session, SessionGateway};

// Transport types
pub use transport::{BatchRecorder, CommandChannel};
