//! Batch recorder for combining commands into one dispatch.
//!
//! The automation process executes statements from a single shared script
//! context, so N logical commands can be concatenated into one script and
//! dispatched in a single round trip. After each command a sentinel
//! statement is inserted whose value is a known marker string carrying the
//! command's zero-based position; the combined response is demultiplexed by
//! matching unit payloads against those markers.
//!
//! ```text
//! wd_frame.buttons().length
//! "end batched automation command 0";
//! elements['wde0'] = wd_frame.buttons()[0];
//! "end batched automation command 1";
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::mem;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::Result;
use crate::protocol::response::{ResponseRecord, ResponseUnit};
use crate::protocol::script;

use super::CommandChannel;

// ============================================================================
// Types
// ============================================================================

/// Demultiplexed batch results, keyed by command position.
///
/// A position missing from the map means its sentinel never came back;
/// callers must check for the positions they queued rather than assume a
/// complete mapping.
pub type BatchResults = FxHashMap<usize, Vec<ResponseUnit>>;

// ============================================================================
// BatchRecorder
// ============================================================================

/// Collects commands without dispatching, then flushes them as one script.
///
/// The queue exists only between [`begin`](Self::begin) and
/// [`flush`](Self::flush); flush clears it unconditionally, success or
/// failure. A dispatch-level error covers every queued position.
#[derive(Debug, Default)]
pub struct BatchRecorder {
    queue: Vec<String>,
}

impl BatchRecorder {
    /// Opens a new, empty batch.
    #[inline]
    #[must_use]
    pub fn begin() -> Self {
        Self { queue: Vec::new() }
    }

    /// Appends a command to the batch instead of dispatching it.
    ///
    /// Returns a synthetic immediate acknowledgement; the real result is
    /// only available from [`flush`](Self::flush).
    pub fn record(&mut self, text: impl Into<String>) -> ResponseRecord {
        let text = text.into();
        trace!(position = self.queue.len(), command_len = text.len(), "Command batched");
        self.queue.push(text);

        ResponseRecord::from_units(vec![ResponseUnit::new("0", "command batched successfully")])
    }

    /// Returns the number of queued commands.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Dispatches the queued commands as one script and demultiplexes the
    /// combined response back into per-position results.
    ///
    /// The queue is drained before dispatch, so it is cleared even when the
    /// dispatch fails. Units trailing after the last sentinel are discarded.
    ///
    /// # Errors
    ///
    /// Propagates the channel error from the single underlying dispatch; it
    /// covers all queued positions.
    pub async fn flush(&mut self, channel: &mut CommandChannel) -> Result<BatchResults> {
        let queue = mem::take(&mut self.queue);
        if queue.is_empty() {
            return Ok(BatchResults::default());
        }

        let count = queue.len();
        let combined = Self::combine(&queue);
        debug!(commands = count, script_len = combined.len(), "Flushing batch");

        let record = channel.dispatch(&combined).await?;
        Ok(Self::demux(record, count))
    }

    /// Concatenates queued commands with their sentinel statements.
    fn combine(queue: &[String]) -> String {
        queue
            .iter()
            .enumerate()
            .map(|(i, cmd)| format!("{cmd}\n{}", script::sentinel_statement(i)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Splits one combined response record into per-position unit lists.
    fn demux(record: ResponseRecord, count: usize) -> BatchResults {
        let mut results = BatchResults::default();
        let mut position = 0;
        let mut pending: Vec<ResponseUnit> = Vec::new();

        for unit in record.into_units() {
            if position < count && unit.payload == script::sentinel_marker(position) {
                results.insert(position, mem::take(&mut pending));
                position += 1;
            } else {
                pending.push(unit);
            }
        }

        // Units after the last expected sentinel belong to no position.
        if !pending.is_empty() {
            trace!(discarded = pending.len(), "Discarding trailing units");
        }

        results
    }
}

// ============================================================================
// Tests
// ============================================================================
