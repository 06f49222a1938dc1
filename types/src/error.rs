//! Transport-level failures.

use std::time::Duration;

use thiserror::Error;

use crate::response::{HttpResponse, RawServiceResponse};

/// Why a request did not complete as expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The fixed request timeout elapsed.
    Timeout,
    /// The service could not be reached.
    Connect,
    /// The service answered with a non-success HTTP status.
    Status,
    /// A success status arrived with a body that is not a service envelope.
    Decode,
    /// Any other client-side failure while building or sending the request.
    Request,
}

/// Raised when a request never completes as expected.
///
/// Some failures still carry the service's own envelope (`body`); the rest
/// only have a low-level `diagnostic`.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{diagnostic}")]
pub struct TransportFailure {
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub body: Option<RawServiceResponse>,
    pub diagnostic: String,
}

impl TransportFailure {
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            kind: FailureKind::Timeout,
            status: None,
            body: None,
            diagnostic: format!("timeout of {}ms exceeded", timeout.as_millis()),
        }
    }

    pub fn connect(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: FailureKind::Connect,
            status: None,
            body: None,
            diagnostic: format!("connection failed: {detail}"),
        }
    }

    pub fn request(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Request,
            status: None,
            body: None,
            diagnostic: detail.into(),
        }
    }

    /// A non-success HTTP status, keeping the service envelope if the body had one.
    pub fn from_status(response: &HttpResponse) -> Self {
        Self {
            kind: FailureKind::Status,
            status: Some(response.status),
            body: response.service_body(),
            diagnostic: format!("Request failed with status code {}", response.status),
        }
    }

    /// A success status whose body could not be read as a service envelope.
    pub fn decode(status: u16, detail: impl std::fmt::Display) -> Self {
        Self {
            kind: FailureKind::Decode,
            status: Some(status),
            body: None,
            diagnostic: format!("invalid response body: {detail}"),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    /// The service-authored envelope, when the failure carries one.
    pub fn service_body(&self) -> Option<&RawServiceResponse> {
        self.body.as_ref()
    }
}
