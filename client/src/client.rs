//! Verification client: one operation per remote capability.

use std::sync::Arc;

use idv_session::{CredentialInterceptor, CredentialStore, SessionError, SessionResetHandler};
use idv_types::endpoints::{self, FACE_IMAGE_FIELD, NIC_IMAGE_FIELD};
use idv_types::{
    Credential, FilePart, NamedFile, RawServiceResponse, RequestEnvelope, TransportFailure,
    VerificationOutcome,
};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::normalizer::normalize_nic_verification;
use crate::transport::{HttpTransport, Transport};

/// Registration fields for `POST /api/auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nic_number: Option<String>,
}

/// Credentials for `POST /api/auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Client for the remote verification service.
///
/// Cheap to clone; clones share the transport and the credential store, so
/// calls may be issued concurrently from several tasks. Each call is
/// attempted exactly once.
pub struct VerificationClient<T> {
    transport: Arc<T>,
    interceptor: CredentialInterceptor,
}

impl<T> Clone for VerificationClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            interceptor: self.interceptor.clone(),
        }
    }
}

impl VerificationClient<HttpTransport> {
    /// Build an HTTP-backed client from configuration.
    pub fn from_config(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        on_reset: Arc<dyn SessionResetHandler>,
    ) -> Result<Self, TransportFailure> {
        let transport = HttpTransport::new(config.base_url.clone())?;
        let interceptor =
            CredentialInterceptor::new(store, on_reset).with_login_path(config.login_path.clone());
        Ok(Self::new(transport, interceptor))
    }
}

impl<T: Transport> VerificationClient<T> {
    pub fn new(transport: T, interceptor: CredentialInterceptor) -> Self {
        Self::with_shared_transport(Arc::new(transport), interceptor)
    }

    pub fn with_shared_transport(transport: Arc<T>, interceptor: CredentialInterceptor) -> Self {
        Self {
            transport,
            interceptor,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn interceptor(&self) -> &CredentialInterceptor {
        &self.interceptor
    }

    /// Send one request through the interceptor and read the service envelope.
    async fn dispatch(&self, envelope: RequestEnvelope) -> Result<RawServiceResponse, TransportFailure> {
        let envelope = self.interceptor.prepare(envelope);
        let method = envelope.method().as_str();
        let path = envelope.path().to_string();
        tracing::debug!(
            method,
            path = %path,
            fields = ?envelope.body().field_names(),
            authorized = envelope.bearer().is_some(),
            "dispatching request"
        );

        let response = self.transport.execute(envelope).await.map_err(|failure| {
            tracing::warn!(method, path = %path, "request failed: {failure}");
            failure
        })?;
        self.interceptor.inspect(&response);

        if !response.is_success() {
            let failure = TransportFailure::from_status(&response);
            tracing::warn!(method, path = %path, status = response.status, "{failure}");
            return Err(failure);
        }

        tracing::debug!(method, path = %path, status = response.status, "request completed");
        let value: serde_json::Value = serde_json::from_slice(&response.body)
            .map_err(|e| TransportFailure::decode(response.status, e))?;
        RawServiceResponse::from_value(value)
            .ok_or_else(|| TransportFailure::decode(response.status, "expected a JSON object"))
    }

    /// `GET /api/auth/health`
    pub async fn health(&self) -> Result<RawServiceResponse, TransportFailure> {
        self.dispatch(RequestEnvelope::get(endpoints::HEALTH)).await
    }

    /// `POST /api/auth/register`
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RawServiceResponse, TransportFailure> {
        let body = serde_json::to_value(request)
            .map_err(|e| TransportFailure::request(format!("invalid registration body: {e}")))?;
        self.dispatch(RequestEnvelope::post_json(endpoints::REGISTER, body))
            .await
    }

    /// `POST /api/auth/login`
    ///
    /// A successful response carrying `data.token` replaces the stored
    /// credential.
    pub async fn login(&self, request: &LoginRequest) -> Result<RawServiceResponse, TransportFailure> {
        let body = serde_json::to_value(request)
            .map_err(|e| TransportFailure::request(format!("invalid login body: {e}")))?;
        let response = self
            .dispatch(RequestEnvelope::post_json(endpoints::LOGIN, body))
            .await?;

        match response.data_str("token").filter(|_| response.success) {
            Some(token) => {
                if let Err(e) = self.interceptor.store().set(Credential::new(token)) {
                    tracing::warn!("failed to persist credential after login: {e}");
                }
            }
            None => tracing::debug!("login response carried no token"),
        }
        Ok(response)
    }

    /// Forget the stored credential. Purely local; no request is issued.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.interceptor.store().clear()
    }

    /// `POST /api/auth/verify-face/{userId}` with field `faceImage`.
    pub async fn verify_face(
        &self,
        user_id: &str,
        face_image: NamedFile,
    ) -> Result<RawServiceResponse, TransportFailure> {
        self.dispatch(RequestEnvelope::post_multipart(
            endpoints::verify_face(user_id),
            vec![FilePart::new(FACE_IMAGE_FIELD, face_image)],
        ))
        .await
    }

    /// `POST /api/auth/verify-nic/{userId}` with field `nicImage`, without
    /// normalization.
    pub async fn verify_nic_raw(
        &self,
        user_id: &str,
        nic_image: NamedFile,
    ) -> Result<RawServiceResponse, TransportFailure> {
        self.dispatch(RequestEnvelope::post_multipart(
            endpoints::verify_nic(user_id),
            vec![FilePart::new(NIC_IMAGE_FIELD, nic_image)],
        ))
        .await
    }

    /// NIC verification. Never fails: every failure path is folded into an
    /// outcome with `success == false`.
    pub async fn verify_nic(&self, user_id: &str, nic_image: NamedFile) -> VerificationOutcome {
        let outcome = normalize_nic_verification(self.verify_nic_raw(user_id, nic_image).await);
        tracing::info!(
            user_id,
            success = outcome.success,
            error = outcome.data.error.as_deref().unwrap_or("none"),
            "NIC verification finished"
        );
        outcome
    }

    /// `POST /api/test/verify-nic-full` with fields `nicImage` and `faceImage`.
    pub async fn test_verify_nic_full(
        &self,
        nic_image: NamedFile,
        face_image: NamedFile,
    ) -> Result<RawServiceResponse, TransportFailure> {
        self.dispatch(RequestEnvelope::post_multipart(
            endpoints::TEST_VERIFY_NIC_FULL,
            vec![
                FilePart::new(NIC_IMAGE_FIELD, nic_image),
                FilePart::new(FACE_IMAGE_FIELD, face_image),
            ],
        ))
        .await
    }

    /// `POST /api/test/extract-nic-number` with field `nicImage`.
    pub async fn test_extract_nic_number(
        &self,
        nic_image: NamedFile,
    ) -> Result<RawServiceResponse, TransportFailure> {
        self.dispatch(RequestEnvelope::post_multipart(
            endpoints::TEST_EXTRACT_NIC_NUMBER,
            vec![FilePart::new(NIC_IMAGE_FIELD, nic_image)],
        ))
        .await
    }

    /// `POST /api/test/validate-face` with field `faceImage`.
    pub async fn test_validate_face(
        &self,
        face_image: NamedFile,
    ) -> Result<RawServiceResponse, TransportFailure> {
        self.dispatch(RequestEnvelope::post_multipart(
            endpoints::TEST_VALIDATE_FACE,
            vec![FilePart::new(FACE_IMAGE_FIELD, face_image)],
        ))
        .await
    }
}
