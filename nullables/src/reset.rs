//! Nullable session reset — record redirects instead of navigating.

use std::sync::Mutex;

use idv_session::SessionResetHandler;

/// Records every login path it is asked to navigate to.
#[derive(Debug, Default)]
pub struct RecordingSessionReset {
    redirects: Mutex<Vec<String>>,
}

impl RecordingSessionReset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of session resets triggered so far.
    pub fn count(&self) -> usize {
        self.redirects.lock().unwrap().len()
    }

    /// Login paths in the order they were requested.
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl SessionResetHandler for RecordingSessionReset {
    fn on_session_reset(&self, login_path: &str) {
        self.redirects.lock().unwrap().push(login_path.to_string());
    }
}
