//! Thin helpers consumed by callers of the client.

use std::path::Path;

use idv_types::{Blob, NamedFile, TransportFailure};

use crate::client::VerificationClient;
use crate::transport::Transport;

/// Display string used when nothing better can be extracted from an error.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Wrap a blob into a named file, preserving its media type.
pub fn blob_to_file(blob: Blob, file_name: impl Into<String>) -> NamedFile {
    NamedFile::new(file_name, blob.media_type, blob.bytes)
}

/// Read a file from disk, guessing its media type from the extension.
pub fn file_from_path(path: &Path) -> std::io::Result<NamedFile> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let media_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(DEFAULT_MEDIA_TYPE);
    Ok(NamedFile::new(name, media_type, bytes))
}

/// Probe the service. Any failure reads as unhealthy; the error itself is
/// swallowed.
pub async fn check_api_health<T: Transport>(client: &VerificationClient<T>) -> bool {
    match client.health().await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("health check failed: {e}");
            false
        }
    }
}

/// Best-effort display string for an arbitrary error.
///
/// Prefers a service-provided message, then the error's own description,
/// then [`UNEXPECTED_ERROR`].
pub fn format_error_message(error: &(dyn std::error::Error + 'static)) -> String {
    if let Some(message) = error
        .downcast_ref::<TransportFailure>()
        .and_then(|failure| failure.service_body())
        .and_then(|body| body.message.as_deref())
        .filter(|m| !m.trim().is_empty())
    {
        return message.to_string();
    }

    let generic = error.to_string();
    if generic.trim().is_empty() {
        UNEXPECTED_ERROR.to_string()
    } else {
        generic
    }
}
