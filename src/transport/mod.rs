//! File-based transport to the automation process.
//!
//! The bridge and the automation process share a working directory. The
//! bridge writes `<N>-cmd.txt`, the automation process polls for it,
//! executes the script inside, and writes `<N>-resp.txt`. Index equality on
//! the filesystem is the only request/response correlation; the directory
//! must be exclusive to one channel.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | Single-outstanding-request command channel |
//! | `batch` | Batching of logical commands into one dispatch |

// ============================================================================
// Submodules
// ============================================================================

/// Command channel over the shared working directory.
pub mod channel;

/// Batch recorder for combining commands into one dispatch.
pub mod batch;

// ============================================================================
// Re-exports
// ============================================================================

pub use batch::{BatchRecorder, BatchResults};
pub use channel::CommandChannel;
