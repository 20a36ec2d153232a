mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::Harness;
use serde_json::{Value, json};
use tower::ServiceExt;
use uai_server::http::router;

async fn call(h: &Harness, request: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let response = router(h.app_state()).oneshot(request).await.unwrap();
    let status = response.status();
    let challenge = response
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body, challenge)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_healthcheck() {
    let h = Harness::new();
    let (status, body, _) = call(&h, get("/v1/healthcheck", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");
    assert_eq!(body["environment"], "development");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_register_then_duplicate() {
    let h = Harness::new();
    let request = json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "roles": ["staff", "leader"]
    });

    let (status, body, _) = call(&h, post("/v1/users", request.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["status"], "unverified");

    let (status, body, _) = call(&h, post("/v1/users", request)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "already_exists");
    assert_eq!(body["error"]["message"], "email already in use");
}

#[tokio::test]
async fn test_register_rejects_bad_input_before_store() {
    let h = Harness::new();
    let cases = [
        json!({ "name": "", "email": "a@example.com", "roles": ["staff"] }),
        json!({ "name": "A", "email": "nope", "roles": ["staff"] }),
        json!({ "name": "A", "email": "a@example.com", "roles": [] }),
        json!({ "name": "A", "email": "a@example.com", "roles": ["janitor"] }),
        json!({ "name": "A", "email": "a@example.com", "roles": ["admin"] }),
        json!({ "name": "A" }),
    ];

    for case in cases {
        let (status, body, _) = call(&h, post("/v1/users", case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{case}");
        assert_eq!(body["error"]["code"], "invalid_argument", "{case}");
    }
    assert_eq!(h.store.operation_count(), 0);
}

#[tokio::test]
async fn test_activate_login_and_me() {
    let h = Harness::new();
    let user = h.onboard("flow@example.com").await;
    let token = h.activation_token(&user);

    let (status, body, _) = call(
        &h,
        post(
            "/v1/users/activate",
            json!({ "token": token, "password": "s3cret-passphrase" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["status"], "active");
    assert!(body["authentication_token"]["token"].is_string());

    let (status, body, _) = call(
        &h,
        post(
            "/v1/tokens/authentication",
            json!({ "email": "flow@example.com", "password": "s3cret-passphrase" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let bearer = body["authentication_token"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body, _) = call(&h, get("/v1/users/me", Some(&bearer))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], json!(user.id));
}

#[tokio::test]
async fn test_me_requires_bearer_token() {
    let h = Harness::new();

    let (status, body, challenge) = call(&h, get("/v1/users/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "invalid_token");
    assert_eq!(challenge.as_deref(), Some("Bearer"));

    let (status, _, _) = call(&h, get("/v1/users/me", Some("v1.local.garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_activation_reports_expiry() {
    let h = Harness::new();
    let user = h.onboard("expired@example.com").await;
    let token = h.activation_token(&user);
    h.clock.advance(chrono::Duration::hours(73));

    let (status, body, _) = call(
        &h,
        post(
            "/v1/users/activate",
            json!({ "token": token, "password": "s3cret-passphrase" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "expired_token");
}

#[tokio::test]
async fn test_short_password_rejected() {
    let h = Harness::new();
    let user = h.onboard("short@example.com").await;
    let token = h.activation_token(&user);
    let ops_before = h.store.operation_count();

    let (status, body, _) = call(
        &h,
        post("/v1/users/activate", json!({ "token": token, "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "password");
    assert_eq!(h.store.operation_count(), ops_before);
}

#[tokio::test]
async fn test_bad_login_is_unauthorized() {
    let h = Harness::new();
    h.active_user("who@example.com").await;

    let (status, body, _) = call(
        &h,
        post(
            "/v1/tokens/authentication",
            json!({ "email": "who@example.com", "password": "wrong password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "invalid_credentials");
}
