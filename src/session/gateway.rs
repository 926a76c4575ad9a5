//! Session gateway: the single entry point for the HTTP layer.
//!
//! Maps WebDriver-shaped operations onto channel dispatches, batch flushes
//! and registry lookups, and enforces the session state machine:
//!
//! ```text
//! NoSession → Active → Terminated
//! ```
//!
//! # Serialization
//!
//! The automation process executes statements from one shared script context
//! and response artifacts are indexed sequentially, so the bridge is
//! logically single-threaded per session. Every gateway operation takes one
//! exclusive async lock; concurrent HTTP requests queue behind it instead of
//! racing on the command index.

// ============================================================================
// Imports
// ============================================================================

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::driver::Supervisor;
use crate::error::{Error, Result};
use crate::identifiers::{ElementHandle, SessionId};
use crate::protocol::response::ResponseRecord;
use crate::protocol::script;
use crate::transport::{BatchRecorder, CommandChannel};

use super::Session;

// ============================================================================
// SessionState
// ============================================================================

/// Session lifecycle state.
///
/// `Terminated` is terminal: the automation process behind the bridge is
/// gone after shutdown, so a new session needs a new gateway.
enum SessionState {
    NoSession,
    Active(Session),
    Terminated,
}

// ============================================================================
// SessionGateway
// ============================================================================

/// Gateway from WebDriver-shaped operations to the command bridge.
pub struct SessionGateway {
    /// Collaborator owning the automation process lifecycle.
    supervisor: Arc<dyn Supervisor>,
    /// Session state behind the one exclusive lock.
    state: Mutex<SessionState>,
    /// Channel timing override; `None` uses the channel defaults.
    channel_timing: Option<(Duration, Duration)>,
}

impl SessionGateway {
    /// Creates a gateway with default channel timing (600 s / 250 ms).
    #[must_use]
    pub fn new(supervisor: Arc<dyn Supervisor>) -> Self {
        Self {
            supervisor,
            state: Mutex::new(SessionState::NoSession),
            channel_timing: None,
        }
    }

    /// Creates a gateway with explicit channel timing.
    #[must_use]
    pub fn with_channel_timing(
        supervisor: Arc<dyn Supervisor>,
        response_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            supervisor,
            state: Mutex::new(SessionState::NoSession),
            channel_timing: Some((response_timeout, poll_interval)),
        }
    }

    /// Returns the active session ID, if any.
    pub async fn session_id(&self) -> Option<SessionId> {
        match &*self.state.lock().await {
            SessionState::Active(session) => Some(session.id()),
            _ => None,
        }
    }
}

// ============================================================================
// SessionGateway - Lifecycle
// ============================================================================

impl SessionGateway {
    /// Creates the session.
    ///
    /// Asks the supervisor for the working directory, then probes liveness
    /// with one empty dispatch: a response proves the automation process is
    /// polling the directory.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionAlreadyActive`] if a session is active
    /// - [`Error::SessionStartFailed`] if the gateway is terminated or the
    ///   automation process does not answer the probe
    pub async fn create_session(&self) -> Result<SessionId> {
        let mut state = self.state.lock().await;

        match &*state {
            SessionState::Active(_) => return Err(Error::SessionAlreadyActive),
            SessionState::Terminated => {
                return Err(Error::session_start_failed(
                    "automation process already shut down",
                ));
            }
            SessionState::NoSession => {}
        }

        let work_dir = self
            .supervisor
            .ensure_ready()
            .await
            .map_err(|e| Error::session_start_failed(e.to_string()))?;

        let mut channel = match self.channel_timing {
            Some((timeout, poll)) => CommandChannel::with_timing(&work_dir, timeout, poll),
            None => CommandChannel::new(&work_dir),
        };

        // Liveness probe: any response at all means the process is polling.
        channel.dispatch("").await.map_err(|e| {
            Error::session_start_failed(format!("automation process not responsive: {e}"))
        })?;

        let id = SessionId::new();
        *state = SessionState::Active(Session::new(id, channel));

        info!(session_id = %id, work_dir = %work_dir.display(), "Session created");
        Ok(id)
    }

    /// Deletes the session.
    ///
    /// Invalidates every element handle, tells the automation script loop to
    /// stop (best effort) and requests supervisor shutdown. Shutdown is
    /// attempted even when the stop command is timing out.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionNotFound`] if no session is active
    /// - Supervisor shutdown errors are propagated
    pub async fn delete_session(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        let mut session = match mem::replace(&mut *state, SessionState::Terminated) {
            SessionState::Active(session) => session,
            other => {
                *state = other;
                return Err(Error::SessionNotFound);
            }
        };

        session.registry.clear();

        if let Err(e) = session.channel.dispatch(script::STOP_RUN_LOOP).await {
            warn!(error = %e, "Automation stop command failed; proceeding with shutdown");
        }

        self.supervisor.request_shutdown().await?;

        info!(session_id = %session.id(), "Session terminated");
        Ok(())
    }
}

// ============================================================================
// SessionGateway - Commands
// ============================================================================

impl SessionGateway {
    /// Switches the frame context; `None` selects the main window.
    ///
    /// # Errors
    ///
    /// [`Error::SessionNotFound`] without an active session; channel errors
    /// otherwise.
    pub async fn switch_frame(&self, frame: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().await;
        let session = Self::active(&mut state)?;

        session.channel.dispatch(&script::switch_frame(frame)).await?;
        Ok(())
    }

    /// Executes raw script text and returns the first response payload.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] if the response carries no units.
    pub async fn execute_script(&self, script_text: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        let session = Self::active(&mut state)?;

        let record = session.channel.dispatch(script_text).await?;
        Self::first_payload(&record)
    }

    /// Finds elements of a UI type and returns one handle per match.
    ///
    /// Dispatches the count query, then binds all matches in a single
    /// batched dispatch: two round trips total regardless of match count.
    /// (The count must be known before the bind statements can be written,
    /// so the count query cannot join the batch.)
    ///
    /// Zero matches yields an empty list without allocating any handles.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedElementType`] for an unknown type tag
    /// - [`Error::Decode`] if the count is non-numeric or a batch sentinel
    ///   never came back; all handles from the batch are rolled back
    pub async fn find_elements(&self, using: &str, value: &str) -> Result<Vec<ElementHandle>> {
        let mut state = self.state.lock().await;
        let session = Self::active(&mut state)?;

        debug!(using, element_type = value, "Finding elements");
        let query = script::element_query(value)
            .ok_or_else(|| Error::unsupported_element_type(value))?;

        let record = session.channel.dispatch(&script::count_query(query)).await?;
        let payload = Self::first_payload(&record)?;
        let count: usize = payload
            .trim()
            .parse()
            .map_err(|_| Error::decode(format!("element count not numeric: {payload:?}")))?;

        if count == 0 {
            return Ok(Vec::new());
        }

        let mut batch = BatchRecorder::begin();
        let mut handles = Vec::with_capacity(count);
        for i in 0..count {
            let handle = session.registry.allocate();
            session
                .registry
                .bind_batched(&handle, &script::indexed_query(query, i), &mut batch);
            handles.push(handle);
        }

        let results = match batch.flush(&mut session.channel).await {
            Ok(results) => results,
            Err(e) => {
                Self::roll_back(session, &handles);
                return Err(e);
            }
        };

        for i in 0..count {
            if !results.contains_key(&i) {
                Self::roll_back(session, &handles);
                return Err(Error::decode(format!("batch result missing position {i}")));
            }
        }

        info!(count, "Elements bound");
        Ok(handles)
    }

    /// Reads the text value of a bound element.
    pub async fn get_text(&self, handle: &ElementHandle) -> Result<String> {
        let record = self.dispatch_on_element(handle, script::value_of).await?;
        Self::first_payload(&record)
    }

    /// Reads an attribute of a bound element.
    ///
    /// Supports `label` and `value`; anything else reads the element name.
    pub async fn get_attribute(&self, handle: &ElementHandle, attribute: &str) -> Result<String> {
        let record = self
            .dispatch_on_element(handle, |a| script::attribute_of(a, attribute))
            .await?;
        Self::first_payload(&record)
    }

    /// Taps a bound element.
    pub async fn click(&self, handle: &ElementHandle) -> Result<()> {
        self.dispatch_on_element(handle, script::tap).await?;
        Ok(())
    }

    /// Sets the value of a bound element.
    ///
    /// The text is escaped by the expression builder, so embedded quotes
    /// cannot terminate the statement early.
    pub async fn set_value(&self, handle: &ElementHandle, text: &str) -> Result<()> {
        self.dispatch_on_element(handle, |a| script::set_value(a, text))
            .await?;
        Ok(())
    }

    /// Scrolls until a bound element is visible.
    pub async fn scroll_to(&self, handle: &ElementHandle) -> Result<()> {
        self.dispatch_on_element(handle, script::scroll_to_visible)
            .await?;
        Ok(())
    }

    /// Pauses the automation script for the given number of seconds.
    pub async fn delay(&self, seconds: u64) -> Result<()> {
        let mut state = self.state.lock().await;
        let session = Self::active(&mut state)?;

        session.channel.dispatch(&script::delay(seconds)).await?;
        Ok(())
    }
}

// ============================================================================
// SessionGateway - Internals
// ============================================================================

impl SessionGateway {
    /// Returns the active session or [`Error::SessionNotFound`].
    fn active(state: &mut SessionState) -> Result<&mut Session> {
        match state {
            SessionState::Active(session) => Ok(session),
            _ => Err(Error::SessionNotFound),
        }
    }

    /// Resolves a handle and dispatches one statement built on its accessor.
    async fn dispatch_on_element(
        &self,
        handle: &ElementHandle,
        build: impl FnOnce(&str) -> String,
    ) -> Result<ResponseRecord> {
        let mut state = self.state.lock().await;
        let session = Self::active(&mut state)?;

        let accessor = session.registry.resolve(handle)?.to_string();
        session.channel.dispatch(&build(&accessor)).await
    }

    /// Extracts the first payload or reports an empty decode.
    fn first_payload(record: &ResponseRecord) -> Result<String> {
        record
            .first_payload()
            .map(str::to_string)
            .ok_or_else(|| Error::decode("response contained no units"))
    }

    /// Unbinds every handle from a failed batch.
    fn roll_back(session: &mut Session, handles: &[ElementHandle]) {
        for handle in handles {
            session.registry.unbind(handle);
        }
        warn!(count = handles.len(), "Rolled back handles from failed batch");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::protocol::response::{self, ResponseUnit};

    /// Supervisor over a test directory that counts shutdown requests.
    struct CountingSupervisor {
        path: PathBuf,
        shutdowns: AtomicUsize,
    }

    impl CountingSupervisor {
        fn new(path: &Path) -> Arc<Self> {
            Arc::new(Self {
                path: path.to_path_buf(),
                shutdowns: AtomicUsize::new(0),
            })
        }

        fn shutdown_count(&self) -> usize {
            self.shutdowns.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Supervisor for CountingSupervisor {
        async fn ensure_ready(&self) -> Result<PathBuf> {
            Ok(self.path.clone())
        }

        async fn request_shutdown(&self) -> Result<()> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn gateway(dir: &TempDir) -> (SessionGateway, Arc<CountingSupervisor>) {
        let supervisor = CountingSupervisor::new(dir.path());
        let gateway = SessionGateway::with_channel_timing(
            Arc::clone(&supervisor) as Arc<dyn Supervisor>,
            Duration::from_millis(400),
            Duration::from_millis(10),
        );
        (gateway, supervisor)
    }

    /// Pre-writes the response artifact for `index`.
    fn stage_response(dir: &TempDir, index: i64, units: &[ResponseUnit]) {
        let body = response::encode(units);
        std::fs::write(dir.path().join(format!("{index}-resp.txt")), body)
            .expect("response staged");
    }

    fn stage_empty_response(dir: &TempDir, index: i64) {
        stage_response(dir, index, &[]);
    }

    #[tokio::test]
    async fn test_create_session_probes_liveness() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        let id = gateway.create_session().await.expect("session created");

        assert_eq!(gateway.session_id().await, Some(id));
        // The probe consumed index 0 with an empty command.
        let probe = std::fs::read_to_string(dir.path().join("0-cmd.txt")).expect("probe");
        assert!(probe.is_empty());
    }

    #[tokio::test]
    async fn test_create_session_fails_when_process_silent() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        let err = gateway.create_session().await.unwrap_err();
        assert!(matches!(err, Error::SessionStartFailed { .. }));
        assert_eq!(gateway.session_id().await, None);
    }

    #[tokio::test]
    async fn test_second_create_fails_while_active() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("first create");

        let err = gateway.create_session().await.unwrap_err();
        assert!(matches!(err, Error::SessionAlreadyActive));
    }

    #[tokio::test]
    async fn test_operations_without_session_fail() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        let err = gateway.execute_script("2+2;").await.unwrap_err();
        assert!(matches!(err, Error::SessionNotFound));

        let err = gateway.delete_session().await.unwrap_err();
        assert!(matches!(err, Error::SessionNotFound));
    }

    #[tokio::test]
    async fn test_execute_script_returns_first_payload() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");

        stage_response(&dir, 1, &[ResponseUnit::new("0", "4")]);
        let result = gateway.execute_script("2+2;").await.expect("script runs");
        assert_eq!(result, "4");
    }

    #[tokio::test]
    async fn test_execute_script_empty_record_is_decode_error() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");

        stage_empty_response(&dir, 1);
        let err = gateway.execute_script("noop;").await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn test_switch_frame_main_window() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");

        stage_empty_response(&dir, 1);
        gateway.switch_frame(None).await.expect("frame switched");

        let cmd = std::fs::read_to_string(dir.path().join("1-cmd.txt")).expect("command");
        assert_eq!(cmd, "wd_frame = mainWindow");
    }

    #[tokio::test]
    async fn test_find_elements_zero_matches_allocates_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");

        stage_response(&dir, 1, &[ResponseUnit::new("0", "0")]);
        let handles = gateway
            .find_elements("tag name", "button")
            .await
            .expect("find succeeds");

        assert!(handles.is_empty());
        // Only the count query was dispatched; no batch followed.
        assert!(!dir.path().join("2-cmd.txt").exists());
    }

    #[tokio::test]
    async fn test_find_elements_unknown_type() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");

        let err = gateway.find_elements("tag name", "hologram").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedElementType { .. }));
    }

    #[tokio::test]
    async fn test_find_elements_binds_in_one_batch() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");

        stage_response(&dir, 1, &[ResponseUnit::new("0", "2")]);
        stage_response(
            &dir,
            2,
            &[
                ResponseUnit::new("0", ""),
                ResponseUnit::new("0", "end batched automation command 0"),
                ResponseUnit::new("0", ""),
                ResponseUnit::new("0", "end batched automation command 1"),
            ],
        );

        let handles = gateway
            .find_elements("tag name", "button")
            .await
            .expect("find succeeds");

        assert_eq!(handles.len(), 2);
        assert_ne!(handles[0], handles[1]);

        let batch_script = std::fs::read_to_string(dir.path().join("2-cmd.txt")).expect("batch");
        assert!(batch_script.contains("elements['wde0'] = wd_frame.buttons()[0];"));
        assert!(batch_script.contains("elements['wde1'] = wd_frame.buttons()[1];"));
        assert!(batch_script.contains("\"end batched automation command 1\";"));

        // Handles resolve: a click dispatches a tap on the accessor.
        stage_response(&dir, 3, &[ResponseUnit::new("0", "")]);
        gateway.click(&handles[0]).await.expect("click succeeds");
        let cmd = std::fs::read_to_string(dir.path().join("3-cmd.txt")).expect("command");
        assert_eq!(cmd, "elements['wde0'].tap();");
    }

    #[tokio::test]
    async fn test_find_elements_missing_sentinel_rolls_back() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");

        stage_response(&dir, 1, &[ResponseUnit::new("0", "2")]);
        // Only the first sentinel comes back.
        stage_response(
            &dir,
            2,
            &[ResponseUnit::new("0", "end batched automation command 0")],
        );

        let err = gateway.find_elements("tag name", "button").await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));

        // Rolled-back handles must not resolve.
        let err = gateway.click(&ElementHandle::new("wde0")).await.unwrap_err();
        assert!(matches!(err, Error::UnboundHandle { .. }));
    }

    #[tokio::test]
    async fn test_set_value_escapes_quotes() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");

        stage_response(&dir, 1, &[ResponseUnit::new("0", "1")]);
        stage_response(
            &dir,
            2,
            &[ResponseUnit::new("0", "end batched automation command 0")],
        );
        let handles = gateway
            .find_elements("tag name", "textField")
            .await
            .expect("find succeeds");

        stage_response(&dir, 3, &[ResponseUnit::new("0", "")]);
        gateway
            .set_value(&handles[0], r#"quote " and newline
done"#)
            .await
            .expect("value set");

        let cmd = std::fs::read_to_string(dir.path().join("3-cmd.txt")).expect("command");
        assert_eq!(
            cmd,
            r#"elements['wde0'].setValue("quote \" and newline\ndone");"#
        );
    }

    #[tokio::test]
    async fn test_get_attribute_dispatches_mapped_getter() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");

        stage_response(&dir, 1, &[ResponseUnit::new("0", "1")]);
        stage_response(
            &dir,
            2,
            &[ResponseUnit::new("0", "end batched automation command 0")],
        );
        let handles = gateway
            .find_elements("tag name", "button")
            .await
            .expect("find succeeds");

        stage_response(&dir, 3, &[ResponseUnit::new("0", "OK")]);
        let label = gateway
            .get_attribute(&handles[0], "label")
            .await
            .expect("attribute read");
        assert_eq!(label, "OK");
        let cmd = std::fs::read_to_string(dir.path().join("3-cmd.txt")).expect("command");
        assert_eq!(cmd, "elements['wde0'].label();");

        // Unknown attributes fall back to the element name.
        stage_response(&dir, 4, &[ResponseUnit::new("0", "OK")]);
        gateway
            .get_attribute(&handles[0], "aria-role")
            .await
            .expect("attribute read");
        let cmd = std::fs::read_to_string(dir.path().join("4-cmd.txt")).expect("command");
        assert_eq!(cmd, "elements['wde0'].name();");
    }

    #[tokio::test]
    async fn test_delete_session_invalidates_and_shuts_down() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, supervisor) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");

        stage_empty_response(&dir, 1);
        gateway.delete_session().await.expect("delete succeeds");

        assert_eq!(supervisor.shutdown_count(), 1);
        assert_eq!(gateway.session_id().await, None);

        let stop = std::fs::read_to_string(dir.path().join("1-cmd.txt")).expect("stop command");
        assert_eq!(stop, "runLoop=false;");

        let err = gateway.execute_script("2+2;").await.unwrap_err();
        assert!(matches!(err, Error::SessionNotFound));
    }

    #[tokio::test]
    async fn test_delete_session_shuts_down_despite_stop_timeout() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, supervisor) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");

        // No response for the stop command: it times out, shutdown still runs.
        gateway.delete_session().await.expect("delete succeeds");
        assert_eq!(supervisor.shutdown_count(), 1);
    }

    #[tokio::test]
    async fn test_create_after_terminate_fails() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");
        stage_empty_response(&dir, 1);
        gateway.delete_session().await.expect("delete");

        let err = gateway.create_session().await.unwrap_err();
        assert!(matches!(err, Error::SessionStartFailed { .. }));
    }

    #[tokio::test]
    async fn test_delay_dispatches_statement() {
        let dir = TempDir::new().expect("tempdir");
        let (gateway, _) = gateway(&dir);

        stage_empty_response(&dir, 0);
        gateway.create_session().await.expect("create");

        stage_empty_response(&dir, 1);
        gateway.delay(3).await.expect("delay succeeds");

        let cmd = std::fs::read_to_string(dir.path().join("1-cmd.txt")).expect("command");
        assert_eq!(cmd, "delay(3);");
    }
}
