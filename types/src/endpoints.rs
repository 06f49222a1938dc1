//! Paths of the remote verification service.

pub const HEALTH: &str = "/api/auth/health";
pub const REGISTER: &str = "/api/auth/register";
pub const LOGIN: &str = "/api/auth/login";

// Diagnostic endpoints for isolated component testing.
pub const TEST_VERIFY_NIC_FULL: &str = "/api/test/verify-nic-full";
pub const TEST_EXTRACT_NIC_NUMBER: &str = "/api/test/extract-nic-number";
pub const TEST_VALIDATE_FACE: &str = "/api/test/validate-face";

/// Multipart field carrying a face image.
pub const FACE_IMAGE_FIELD: &str = "faceImage";
/// Multipart field carrying an NIC document image.
pub const NIC_IMAGE_FIELD: &str = "nicImage";

/// `POST /api/auth/verify-face/{userId}`
pub fn verify_face(user_id: &str) -> String {
    format!("/api/auth/verify-face/{}", urlencoding::encode(user_id))
}

/// `POST /api/auth/verify-nic/{userId}`
pub fn verify_nic(user_id: &str) -> String {
    format!("/api/auth/verify-nic/{}", urlencoding::encode(user_id))
}
