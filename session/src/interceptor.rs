//! Credential interceptor applied around every outgoing request.

use std::fmt;
use std::sync::Arc;

use idv_types::{HttpResponse, RequestEnvelope};

use crate::reset::SessionResetHandler;
use crate::store::CredentialStore;

/// Where the host is sent after the service denies the credential.
pub const LOGIN_ENTRY_POINT: &str = "/login";

/// Attaches the stored bearer credential to requests and resets the session
/// when the service answers with authorization-denied.
///
/// The credential is read when each request is prepared and is not locked
/// for the lifetime of the call: a logout mid-flight does not affect a
/// request already dispatched.
#[derive(Clone)]
pub struct CredentialInterceptor {
    store: Arc<dyn CredentialStore>,
    on_reset: Arc<dyn SessionResetHandler>,
    login_path: String,
}

impl CredentialInterceptor {
    pub fn new(store: Arc<dyn CredentialStore>, on_reset: Arc<dyn SessionResetHandler>) -> Self {
        Self {
            store,
            on_reset,
            login_path: LOGIN_ENTRY_POINT.to_string(),
        }
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Attach the current credential, if any. Requests without a stored
    /// credential pass through unmodified.
    pub fn prepare(&self, envelope: RequestEnvelope) -> RequestEnvelope {
        match self.store.get() {
            Some(credential) if !credential.is_empty() => envelope.with_bearer(credential),
            _ => envelope,
        }
    }

    /// Inspect a completed response. On authorization-denied, clear the
    /// stored credential and signal the host exactly once.
    ///
    /// Returns `true` if the session was reset. The response itself is left
    /// for the caller, who still receives the error.
    pub fn inspect(&self, response: &HttpResponse) -> bool {
        if !response.is_unauthorized() {
            return false;
        }

        tracing::warn!(
            login_path = %self.login_path,
            "authorization denied, clearing stored credential"
        );
        if let Err(e) = self.store.clear() {
            tracing::warn!("failed to clear credential store: {e}");
        }
        self.on_reset.on_session_reset(&self.login_path);
        true
    }
}

impl fmt::Debug for CredentialInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialInterceptor")
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}
