//! Shared data model for the identity-verification client.
//!
//! This crate defines the types every other crate in the workspace exchanges:
//! the bearer credential, request envelopes and file parts, the raw service
//! response envelope, transport failures, and the canonical verification
//! outcome returned by the NIC verification flow.

pub mod credential;
pub mod endpoints;
pub mod error;
pub mod file;
pub mod outcome;
pub mod request;
pub mod response;

pub use credential::{Credential, AUTH_TOKEN_KEY};
pub use error::{FailureKind, TransportFailure};
pub use file::{Blob, FilePart, NamedFile};
pub use outcome::{VerificationDetail, VerificationOutcome};
pub use request::{Method, RequestBody, RequestEnvelope, REQUEST_TIMEOUT};
pub use response::{HttpResponse, RawServiceResponse};
