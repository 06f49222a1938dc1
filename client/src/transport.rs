//! Transport adapter: issues requests against the remote service.

use std::future::Future;

use idv_types::{
    FilePart, HttpResponse, Method, RequestBody, RequestEnvelope, TransportFailure,
    REQUEST_TIMEOUT,
};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};

/// Sends a request envelope and surfaces the raw response or a transport
/// failure. Non-success statuses are returned as responses, not failures;
/// classifying them is the caller's job.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        envelope: RequestEnvelope,
    ) -> impl Future<Output = Result<HttpResponse, TransportFailure>> + Send;
}

/// HTTP transport backed by `reqwest` with a fixed base address.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport targeting the given base URL (e.g. `http://localhost:9091`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportFailure> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportFailure::request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn multipart_form(parts: &[FilePart]) -> Result<Form, TransportFailure> {
    parts.iter().try_fold(Form::new(), |form, part| {
        let file = Part::bytes(part.file.bytes.clone())
            .file_name(part.file.name.clone())
            .mime_str(&part.file.media_type)
            .map_err(|e| {
                TransportFailure::request(format!(
                    "invalid media type '{}' for field {}: {e}",
                    part.file.media_type, part.field
                ))
            })?;
        Ok(form.part(part.field.clone(), file))
    })
}

impl Transport for HttpTransport {
    async fn execute(&self, envelope: RequestEnvelope) -> Result<HttpResponse, TransportFailure> {
        let url = self.url_for(envelope.path());
        let mut request = match envelope.method() {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        }
        .timeout(envelope.timeout());

        if let Some(authorization) = envelope.authorization() {
            request = request.header(AUTHORIZATION, authorization);
        }

        request = match envelope.body() {
            RequestBody::Empty => request,
            RequestBody::Json(body) => request.json(body),
            RequestBody::Multipart(parts) => request.multipart(multipart_form(parts)?),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportFailure::timeout(envelope.timeout())
            } else if e.is_connect() {
                TransportFailure::connect(&e)
            } else {
                TransportFailure::request(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportFailure::timeout(envelope.timeout())
            } else {
                TransportFailure::request(format!("failed to read response body: {e}"))
            }
        })?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
