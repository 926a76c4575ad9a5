//! Automation process supervision seam.
//!
//! The bridge does not launch Instruments, template the bootstrap script,
//! beat security dialogs or manage the simulator. A [`Supervisor`]
//! collaborator owns all of that and guarantees two things:
//!
//! 1. Before the first dispatch, the working directory exists and the
//!    automation process is polling it for command artifacts.
//! 2. On session deletion, [`request_shutdown`](Supervisor::request_shutdown)
//!    terminates the automation process and anything it spawned.
//!
//! The shipped implementations manage directories only; they are for
//! embedding the bridge next to an externally supervised process and for
//! tests that stand up a fake automation process.

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;
use tracing::debug;

use crate::error::Result;

// ============================================================================
// Supervisor
// ============================================================================

/// Contract for the automation process supervisor.
#[async_trait]
pub trait Supervisor: Send + Sync {
    /// Returns the working directory of a live, polling automation process.
    ///
    /// Called once per session creation, before the liveness probe.
    async fn ensure_ready(&self) -> Result<PathBuf>;

    /// Shuts down the automation process and the device simulator.
    ///
    /// Called on session deletion, even when an in-flight command is still
    /// timing out.
    async fn request_shutdown(&self) -> Result<()>;
}

// ============================================================================
// TempSupervisor
// ============================================================================

/// Supervisor backed by a fresh `iosauto-` temporary directory.
///
/// The directory lives as long as the supervisor; shutdown is a no-op.
/// Whatever polls the directory is someone else's job.
#[derive(Debug)]
pub struct TempSupervisor {
    dir: TempDir,
}

impl TempSupervisor {
    /// Creates the supervisor and its temporary working directory.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the directory cannot be created.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("iosauto-").tempdir()?;
        debug!(path = %dir.path().display(), "Created automation working directory");
        Ok(Self { dir })
    }

    /// Returns the working directory path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[async_trait]
impl Supervisor for TempSupervisor {
    async fn ensure_ready(&self) -> Result<PathBuf> {
        Ok(self.dir.path().to_path_buf())
    }

    async fn request_shutdown(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// FixedSupervisor
// ============================================================================

/// Supervisor pointing at an existing working directory.
#[derive(Debug, Clone)]
pub struct FixedSupervisor {
    path: PathBuf,
}

impl FixedSupervisor {
    /// Creates a supervisor for `path`.
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Supervisor for FixedSupervisor {
    async fn ensure_ready(&self) -> Result<PathBuf> {
        Ok(self.path.clone())
    }

    async fn request_shutdown(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
