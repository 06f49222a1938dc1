//! Session state for the identity-verification client.
//!
//! Design:
//! - The bearer credential lives in an injectable [`CredentialStore`] rather
//!   than ambient global storage, so tests can substitute their own.
//! - The host application supplies a [`SessionResetHandler`] that is told to
//!   navigate to the login entry point when the service denies the credential.
//! - The [`CredentialInterceptor`] ties both together around every request.

pub mod error;
pub mod interceptor;
pub mod reset;
pub mod store;

pub use error::SessionError;
pub use interceptor::{CredentialInterceptor, LOGIN_ENTRY_POINT};
pub use reset::SessionResetHandler;
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
