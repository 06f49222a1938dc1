//! Call-path tests for the verification client, wired against nullable
//! infrastructure: the credential interceptor, every endpoint's envelope,
//! login/logout, NIC normalization, and authorization-denied handling.

use std::sync::Arc;

use idv_client::normalizer::{NETWORK_FAILURE_SUGGESTIONS, SYSTEM_ERROR};
use idv_client::{check_api_health, LoginRequest, RegisterRequest, VerificationClient};
use idv_nullables::{NullTransport, RecordingSessionReset};
use idv_session::{CredentialInterceptor, CredentialStore, MemoryCredentialStore};
use idv_types::{Credential, Method, NamedFile, RequestBody, TransportFailure};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    client: VerificationClient<NullTransport>,
    store: Arc<MemoryCredentialStore>,
    resets: Arc<RecordingSessionReset>,
}

impl Harness {
    fn new() -> Self {
        Self::with_store(MemoryCredentialStore::new())
    }

    fn logged_in(token: &str) -> Self {
        Self::with_store(MemoryCredentialStore::with_credential(Credential::new(token)))
    }

    fn with_store(store: MemoryCredentialStore) -> Self {
        let store = Arc::new(store);
        let resets = Arc::new(RecordingSessionReset::new());
        let interceptor = CredentialInterceptor::new(store.clone(), resets.clone());
        Self {
            client: VerificationClient::new(NullTransport::new(), interceptor),
            store,
            resets,
        }
    }

    fn transport(&self) -> &NullTransport {
        self.client.transport()
    }
}

fn jpeg(name: &str) -> NamedFile {
    NamedFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF])
}

fn ok_body() -> serde_json::Value {
    json!({ "success": true, "message": "ok" })
}

// ---------------------------------------------------------------------------
// 1. Envelopes per endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_get_without_body() {
    let h = Harness::new();
    h.transport().respond_json(200, ok_body());

    let resp = h.client.health().await.expect("health ok");
    assert!(resp.success);

    let req = h.transport().last_request().unwrap();
    assert_eq!(req.method(), Method::Get);
    assert_eq!(req.path(), "/api/auth/health");
    assert_eq!(req.body(), &RequestBody::Empty);
    assert!(req.authorization().is_none());
}

#[tokio::test]
async fn register_posts_json_fields() {
    let h = Harness::new();
    h.transport().respond_json(201, json!({ "success": true, "message": "Registered", "data": { "userId": "u-1" } }));

    let resp = h
        .client
        .register(&RegisterRequest {
            full_name: "Ada Perera".into(),
            email: "ada@example.com".into(),
            password: "secret".into(),
            nic_number: Some("200012345678".into()),
        })
        .await
        .unwrap();
    assert_eq!(resp.data_str("userId"), Some("u-1"));

    let req = h.transport().last_request().unwrap();
    assert_eq!(req.path(), "/api/auth/register");
    match req.body() {
        RequestBody::Json(body) => {
            assert_eq!(body["email"], "ada@example.com");
            assert_eq!(body["nicNumber"], "200012345678");
        }
        other => panic!("expected JSON body, got {other:?}"),
    }
}

#[tokio::test]
async fn multipart_endpoints_use_expected_fields() {
    let h = Harness::new();
    for _ in 0..5 {
        h.transport().respond_json(200, ok_body());
    }

    h.client.verify_face("u-7", jpeg("face.jpg")).await.unwrap();
    h.client.verify_nic_raw("u-7", jpeg("nic.jpg")).await.unwrap();
    h.client
        .test_verify_nic_full(jpeg("nic.jpg"), jpeg("face.jpg"))
        .await
        .unwrap();
    h.client.test_extract_nic_number(jpeg("nic.jpg")).await.unwrap();
    h.client.test_validate_face(jpeg("face.jpg")).await.unwrap();

    let seen: Vec<(String, Vec<String>)> = h
        .transport()
        .requests()
        .iter()
        .map(|r| {
            assert_eq!(r.method(), Method::Post);
            (
                r.path().to_string(),
                r.body().field_names().into_iter().map(String::from).collect(),
            )
        })
        .collect();

    assert_eq!(
        seen,
        vec![
            ("/api/auth/verify-face/u-7".to_string(), vec!["faceImage".to_string()]),
            ("/api/auth/verify-nic/u-7".to_string(), vec!["nicImage".to_string()]),
            (
                "/api/test/verify-nic-full".to_string(),
                vec!["nicImage".to_string(), "faceImage".to_string()]
            ),
            ("/api/test/extract-nic-number".to_string(), vec!["nicImage".to_string()]),
            ("/api/test/validate-face".to_string(), vec!["faceImage".to_string()]),
        ]
    );
}

#[tokio::test]
async fn user_id_is_encoded_into_one_path_segment() {
    let h = Harness::new();
    h.transport().respond_json(200, ok_body());
    h.transport().respond_json(200, ok_body());

    h.client.verify_face("a/b?c#d", jpeg("face.jpg")).await.unwrap();
    h.client.verify_nic("../login", jpeg("nic.jpg")).await;

    let paths: Vec<String> = h
        .transport()
        .requests()
        .iter()
        .map(|r| r.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "/api/auth/verify-face/a%2Fb%3Fc%23d".to_string(),
            "/api/auth/verify-nic/..%2Flogin".to_string(),
        ]
    );
}

// ---------------------------------------------------------------------------
// 2. Credential lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stored_credential_is_attached_to_every_request() {
    let h = Harness::logged_in("tok-abc");
    h.transport().respond_json(200, ok_body());
    h.transport().respond_json(200, ok_body());

    h.client.health().await.unwrap();
    h.client.verify_face("u-1", jpeg("f.jpg")).await.unwrap();

    for req in h.transport().requests() {
        assert_eq!(req.authorization().as_deref(), Some("Bearer tok-abc"));
    }
}

#[tokio::test]
async fn login_stores_token_and_replaces_previous() {
    let h = Harness::logged_in("old");
    h.transport().respond_json(
        200,
        json!({ "success": true, "message": "Welcome", "data": { "token": "new-token" } }),
    );

    h.client
        .login(&LoginRequest {
            email: "ada@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();

    assert_eq!(h.store.get().unwrap().as_str(), "new-token");
}

#[tokio::test]
async fn unsuccessful_login_keeps_store_untouched() {
    let h = Harness::new();
    h.transport().respond_json(
        200,
        json!({ "success": false, "message": "Invalid credentials", "data": { "token": "x" } }),
    );

    let resp = h
        .client
        .login(&LoginRequest {
            email: "ada@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap();
    assert!(!resp.success);
    assert!(h.store.get().is_none());
}

#[tokio::test]
async fn logout_clears_without_request_or_redirect() {
    let h = Harness::logged_in("tok");
    h.client.logout().unwrap();

    assert!(h.store.get().is_none());
    assert!(h.transport().requests().is_empty());
    assert_eq!(h.resets.count(), 0);
}

// ---------------------------------------------------------------------------
// 3. Authorization denied (any endpoint)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_clears_credential_and_redirects_once_per_endpoint() {
    let denied = json!({ "success": false, "message": "Unauthorized" });

    let calls: Vec<&str> = vec![
        "health",
        "register",
        "login",
        "verify_face",
        "verify_nic",
        "test_full",
        "test_extract",
        "test_face",
    ];

    for call in calls {
        let h = Harness::logged_in("tok");
        h.transport().respond_json(401, denied.clone());

        let failed = match call {
            "health" => h.client.health().await.is_err(),
            "register" => h
                .client
                .register(&RegisterRequest {
                    full_name: "A".into(),
                    email: "a@b.c".into(),
                    password: "p".into(),
                    nic_number: None,
                })
                .await
                .is_err(),
            "login" => h
                .client
                .login(&LoginRequest {
                    email: "a@b.c".into(),
                    password: "p".into(),
                })
                .await
                .is_err(),
            "verify_face" => h.client.verify_face("u", jpeg("f.jpg")).await.is_err(),
            "verify_nic" => !h.client.verify_nic("u", jpeg("n.jpg")).await.success,
            "test_full" => h
                .client
                .test_verify_nic_full(jpeg("n.jpg"), jpeg("f.jpg"))
                .await
                .is_err(),
            "test_extract" => h.client.test_extract_nic_number(jpeg("n.jpg")).await.is_err(),
            "test_face" => h.client.test_validate_face(jpeg("f.jpg")).await.is_err(),
            _ => unreachable!(),
        };

        assert!(failed, "{call} should surface the denial");
        assert!(h.store.get().is_none(), "{call} should clear the credential");
        assert_eq!(h.resets.redirects(), vec!["/login".to_string()], "{call}");
        assert_eq!(h.transport().requests().len(), 1, "{call} must not retry");
    }
}

#[tokio::test]
async fn unauthorized_error_still_reaches_caller() {
    let h = Harness::logged_in("tok");
    h.transport()
        .respond_json(401, json!({ "success": false, "message": "Token expired" }));

    let err = h.client.verify_face("u", jpeg("f.jpg")).await.unwrap_err();
    assert_eq!(err.status, Some(401));
    assert_eq!(
        err.service_body().and_then(|b| b.message.as_deref()),
        Some("Token expired")
    );
}

#[tokio::test]
async fn forbidden_does_not_reset_session() {
    let h = Harness::logged_in("tok");
    h.transport().respond_json(403, json!({ "message": "Forbidden" }));

    assert!(h.client.health().await.is_err());
    assert!(h.store.get().is_some());
    assert_eq!(h.resets.count(), 0);
}

// ---------------------------------------------------------------------------
// 4. NIC verification never fails
// ---------------------------------------------------------------------------

#[tokio::test]
async fn verify_nic_success_passes_detail_through() {
    let h = Harness::logged_in("tok");
    h.transport().respond_json(
        200,
        json!({
            "success": true,
            "message": "Verified",
            "data": { "documentNumber": "123", "confidence": 0.97 }
        }),
    );

    let outcome = h.client.verify_nic("u-1", jpeg("nic.jpg")).await;
    assert!(outcome.success);
    assert_eq!(outcome.message, "Verified");
    assert_eq!(outcome.data.message, "Verified");
    assert_eq!(outcome.data.field("documentNumber"), Some(&json!("123")));
    assert_eq!(outcome.data.field("confidence"), Some(&json!(0.97)));
}

#[tokio::test]
async fn verify_nic_structured_failure() {
    let h = Harness::new();
    h.transport().respond_json(
        400,
        json!({ "message": "Blurry image", "data": { "userMessage": "Image too blurry" } }),
    );

    let outcome = h.client.verify_nic("u-1", jpeg("nic.jpg")).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Blurry image");
    assert_eq!(outcome.data.error.as_deref(), Some(SYSTEM_ERROR));
    assert_eq!(outcome.data.user_message, "Image too blurry");
    assert_eq!(outcome.data.suggestions.len(), 4);
}

#[tokio::test]
async fn verify_nic_timeout_is_network_failure() {
    let h = Harness::new();
    h.transport().time_out();

    let outcome = h.client.verify_nic("u-1", jpeg("nic.jpg")).await;
    assert_eq!(outcome.message, "Network error occurred");
    assert_eq!(outcome.data.suggestions, NETWORK_FAILURE_SUGGESTIONS.to_vec());
    assert_eq!(
        outcome.data.technical_error.as_deref(),
        Some("timeout of 30000ms exceeded")
    );
}

#[tokio::test]
async fn verify_nic_malformed_success_body_is_network_failure() {
    let h = Harness::new();
    h.transport().respond_raw(200, "<html>maintenance</html>");

    let outcome = h.client.verify_nic("u-1", jpeg("nic.jpg")).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Network error occurred");
    assert!(outcome
        .data
        .technical_error
        .as_deref()
        .unwrap()
        .starts_with("invalid response body"));
}

// ---------------------------------------------------------------------------
// 5. Health probe and concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_probe_swallows_failures() {
    let h = Harness::new();
    h.transport().respond_json(200, ok_body());
    assert!(check_api_health(&h.client).await);

    h.transport().respond_json(500, json!({ "message": "down" }));
    assert!(!check_api_health(&h.client).await);

    h.transport()
        .push(Err(TransportFailure::connect("connection refused")));
    assert!(!check_api_health(&h.client).await);
}

#[tokio::test]
async fn concurrent_calls_share_the_credential() {
    let h = Harness::logged_in("shared");
    h.transport().respond_json(200, ok_body());
    h.transport().respond_json(200, ok_body());

    let face_client = h.client.clone();
    let nic_client = h.client.clone();
    let (face, nic) = tokio::join!(
        face_client.verify_face("u", jpeg("f.jpg")),
        nic_client.verify_nic("u", jpeg("n.jpg")),
    );

    assert!(face.is_ok());
    assert!(nic.success);
    let requests = h.transport().requests();
    assert_eq!(requests.len(), 2);
    assert!(requests
        .iter()
        .all(|r| r.authorization().as_deref() == Some("Bearer shared")));
}
