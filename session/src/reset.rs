//! Session-reset side effect, supplied by the host application.

/// Invoked once per authorization-denied response, after the stored
/// credential has been cleared.
///
/// `login_path` is the login entry point the host should navigate to.
pub trait SessionResetHandler: Send + Sync {
    fn on_session_reset(&self, login_path: &str);
}

impl<F> SessionResetHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_session_reset(&self, login_path: &str) {
        self(login_path)
    }
}
