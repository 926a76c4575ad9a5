//! Command channel over the shared working directory.
//!
//! One dispatch writes one command artifact, then polls for the matching
//! response artifact until it appears or the timeout elapses. The channel is
//! not a pipeline: `dispatch` takes `&mut self`, so at most one command can
//! be awaiting a response at any time.
//!
//! # Timeout Semantics
//!
//! A timed-out index is abandoned, never reused. The automation process may
//! still write the response late; the channel never reads it, and the next
//! dispatch simply moves on to the next index.

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tokio::time::{Instant, sleep};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::CommandIndex;
use crate::protocol::response::{self, ResponseRecord};

// ============================================================================
// Constants
// ============================================================================

/// Default time to wait for a response artifact (10 minutes).
const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(600);

/// Sleep between response-artifact existence checks.
///
/// Sub-second to bound latency without pegging a core.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

// ============================================================================
// CommandChannel
// ============================================================================

/// File-based command channel to the automation process.
///
/// Owns the monotonically increasing command index and the working
/// directory; neither is shared with any other component.
#[derive(Debug)]
pub struct CommandChannel {
    /// Working directory shared with the automation process.
    work_dir: PathBuf,
    /// Index of the most recently dispatched command.
    index: CommandIndex,
    /// Maximum time to wait for a response artifact.
    response_timeout: Duration,
    /// Sleep between existence checks while polling.
    poll_interval: Duration,
}

impl CommandChannel {
    /// Creates a channel over `work_dir` with default timing.
    ///
    /// The caller (the session's supervisor) guarantees the directory exists
    /// and the automation process is polling it before the first dispatch.
    #[must_use]
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self::with_timing(work_dir, DEFAULT_RESPONSE_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }

    /// Creates a channel with explicit response timeout and poll interval.
    #[must_use]
    pub fn with_timing(
        work_dir: impl Into<PathBuf>,
        response_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            work_dir: work_dir.into(),
            index: CommandIndex::UNUSED,
            response_timeout,
            poll_interval,
        }
    }

    /// Returns the working directory.
    #[inline]
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Returns the index of the most recently dispatched command.
    ///
    /// [`CommandIndex::UNUSED`] before the first dispatch.
    #[inline]
    #[must_use]
    pub fn current_index(&self) -> CommandIndex {
        self.index
    }

    /// Dispatches a command and waits for its decoded response.
    ///
    /// Blocks the calling task for up to the configured response timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandWriteFailed`] if the command artifact cannot be
    ///   written; the index is rolled back and the channel stays usable
    /// - [`Error::ResponseTimeout`] if no response artifact appears; the
    ///   index is abandoned
    pub async fn dispatch(&mut self, text: &str) -> Result<ResponseRecord> {
        self.index = self.index.next();
        let index = self.index;

        let command_path = self.work_dir.join(index.command_filename());
        if let Err(e) = fs::write(&command_path, text).await {
            warn!(%index, error = %e, "Failed to write command artifact");
            self.index = self.index.prev();
            return Err(Error::command_write_failed(index, e));
        }

        debug!(%index, command_len = text.len(), "Command dispatched");

        self.await_response(index).await
    }

    /// Polls for the response artifact matching `index`.
    async fn await_response(&self, index: CommandIndex) -> Result<ResponseRecord> {
        let response_path = self.work_dir.join(index.response_filename());
        let deadline = Instant::now() + self.response_timeout;

        loop {
            if fs::try_exists(&response_path).await.unwrap_or(false) {
                let raw = fs::read_to_string(&response_path).await?;
                let record = response::decode(&raw);

                debug!(
                    %index,
                    units = record.len(),
                    malformed = record.malformed_units(),
                    "Response decoded"
                );
                return Ok(record);
            }

            if Instant::now() >= deadline {
                let timeout_ms = self.response_timeout.as_millis() as u64;
                warn!(%index, timeout_ms, "Response timed out; index abandoned");
                return Err(Error::response_timeout(index, timeout_ms));
            }

            trace!(%index, "Response not present yet");
            sleep(self.poll_interval).await;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
