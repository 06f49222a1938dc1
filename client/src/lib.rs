//! Client for the remote identity-verification service.
//!
//! Data flow: caller → [`VerificationClient`] → [`Transport`] (with the
//! credential interceptor applied) → remote service → raw response or
//! failure → [`normalizer`] → [`VerificationOutcome`](idv_types::VerificationOutcome).
//!
//! Every call is attempted exactly once; there is no retry policy anywhere
//! in this layer. Only the NIC verification flow is normalized and never
//! fails; the other operations return `Result` for the caller to handle.

pub mod client;
pub mod config;
pub mod normalizer;
pub mod transport;
pub mod utils;

pub use client::{LoginRequest, RegisterRequest, VerificationClient};
pub use config::{ClientConfig, ConfigError};
pub use normalizer::normalize_nic_verification;
pub use transport::{HttpTransport, Transport};
pub use utils::{blob_to_file, check_api_health, file_from_path, format_error_message};
