//! Immutable request envelopes handed to the transport.

use std::time::Duration;

use crate::credential::Credential;
use crate::file::FilePart;

/// Fixed timeout for every call, sized for image uploads.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FilePart>),
}

impl RequestBody {
    /// Names of the multipart fields, empty for non-multipart bodies.
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Self::Multipart(parts) => parts.iter().map(|p| p.field.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

/// A request to the remote service.
///
/// Envelopes are never mutated after construction; attaching a credential
/// produces a new envelope.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestEnvelope {
    method: Method,
    path: String,
    body: RequestBody,
    timeout: Duration,
    bearer: Option<Credential>,
}

impl RequestEnvelope {
    fn new(method: Method, path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            timeout: REQUEST_TIMEOUT,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, RequestBody::Empty)
    }

    pub fn post_json(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::Post, path, RequestBody::Json(body))
    }

    pub fn post_multipart(path: impl Into<String>, parts: Vec<FilePart>) -> Self {
        Self::new(Method::Post, path, RequestBody::Multipart(parts))
    }

    /// Return a copy of this envelope carrying the given bearer credential.
    pub fn with_bearer(self, credential: Credential) -> Self {
        Self {
            bearer: Some(credential),
            ..self
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn bearer(&self) -> Option<&Credential> {
        self.bearer.as_ref()
    }

    /// Value of the `Authorization` header, if a credential is attached.
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(Credential::bearer_header)
    }
}
