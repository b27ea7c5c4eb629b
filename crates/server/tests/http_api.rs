//! End-to-end tests over the full router with the in-memory backend.

use aes_gcm_siv::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256GcmSiv, Nonce,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderValue, Request, StatusCode},
};
use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use burnlink_server::server::{router, state::AppState};
use common::{
    envelope::{IV_LEN, KEY_LEN},
    protocol::{CreateSecretResponse, SecretEnvelope},
};
use serde_json::json;
use tower::ServiceExt;

const BROWSER: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0";

fn server() -> TestServer {
    TestServer::new(router::build(AppState::default())).unwrap()
}

fn browser() -> HeaderValue {
    HeaderValue::from_static(BROWSER)
}

async fn create(server: &TestServer, burn_on_read: bool) -> String {
    let resp = server
        .post("/api/secret")
        .json(&json!({
            "encryptedText": "Y2lwaGVydGV4dA==",
            "iv": "bm9uY2U=",
            "ttl": 3600,
            "burnOnRead": burn_on_read,
        }))
        .await;
    resp.assert_status_ok();
    resp.json::<CreateSecretResponse>().id
}

#[tokio::test]
async fn create_then_consume_returns_ciphertext() {
    let server = server();
    let id = create(&server, false).await;
    assert_eq!(id.len(), 22);

    let resp = server
        .get(&format!("/api/secret/{id}"))
        .add_header(header::USER_AGENT, browser())
        .await;
    resp.assert_status_ok();
    let body = resp.json::<serde_json::Value>();
    assert_eq!(
        body,
        json!({"encryptedText": "Y2lwaGVydGV4dA==", "iv": "bm9uY2U="})
    );
}

#[tokio::test]
async fn burn_on_read_secret_is_gone_after_first_read() {
    let server = server();
    let id = create(&server, true).await;
    let path = format!("/api/secret/{id}");

    server
        .get(&path)
        .add_header(header::USER_AGENT, browser())
        .await
        .assert_status_ok();
    server
        .get(&path)
        .add_header(header::USER_AGENT, browser())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preview_fetch_does_not_burn() {
    let server = server();
    let id = create(&server, true).await;
    let path = format!("/api/secret/{id}");

    server
        .get(&path)
        .add_header(
            header::USER_AGENT,
            HeaderValue::from_static("Slackbot-LinkExpanding 1.0 (+https://api.slack.com/robots)"),
        )
        .await
        .assert_status(StatusCode::NOT_FOUND);
    // Missing user agent is refused as well.
    server.get(&path).await.assert_status(StatusCode::NOT_FOUND);

    server
        .get(&path)
        .add_header(header::USER_AGENT, browser())
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn non_ascii_browser_can_burn() {
    let server = server();
    let id = create(&server, true).await;
    let ua = "Mozilla/5.0 (Linux; Android 10; 荣耀 V20) AppleWebKit/537.36 \
              (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36";

    server
        .get(&format!("/api/secret/{id}"))
        .add_header(header::USER_AGENT, HeaderValue::from_bytes(ua.as_bytes()).unwrap())
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn non_burn_secret_survives_repeat_reads() {
    let server = server();
    let id = create(&server, false).await;
    let path = format!("/api/secret/{id}");
    for _ in 0..3 {
        server
            .get(&path)
            .add_header(header::USER_AGENT, browser())
            .await
            .assert_status_ok();
    }
}

#[tokio::test]
async fn ttl_out_of_range_is_rejected() {
    let server = server();
    for ttl in [0, -5, 2_592_001] {
        let resp = server
            .post("/api/secret")
            .json(&json!({
                "encryptedText": "abc",
                "iv": "def",
                "ttl": ttl,
                "burnOnRead": false,
            }))
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body = resp.json::<serde_json::Value>();
        assert_eq!(body["code"], "bad_request", "ttl {ttl}");
    }
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let server = server();
    let resp = server
        .get("/api/secret/AAAAAAAAAAAAAAAAAAAAAA")
        .add_header(header::USER_AGENT, browser())
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(resp.json::<serde_json::Value>()["code"], "not_found");
}

#[tokio::test]
async fn concurrent_burns_yield_exactly_one_success() {
    let app = router::build(AppState::default());

    let req = Request::builder()
        .method("POST")
        .uri("/api/secret")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"encryptedText":"abc","iv":"def","ttl":60,"burnOnRead":true}"#,
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let id = serde_json::from_slice::<CreateSecretResponse>(&bytes).unwrap().id;

    let mut handles = Vec::new();
    for _ in 0..25 {
        let app = app.clone();
        let uri = format!("/api/secret/{id}");
        handles.push(tokio::spawn(async move {
            let req = Request::builder()
                .uri(uri)
                .header(header::USER_AGENT, BROWSER)
                .body(Body::empty())
                .unwrap();
            app.oneshot(req).await.unwrap().status()
        }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => ok += 1,
            StatusCode::NOT_FOUND => {}
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(ok, 1);
}

#[tokio::test]
async fn client_side_envelope_round_trips() {
    let server = server();

    // The key never leaves the client.
    let key = Aes256GcmSiv::generate_key(&mut OsRng);
    assert_eq!(key.len(), KEY_LEN);
    let cipher = Aes256GcmSiv::new(&key);
    let nonce = Aes256GcmSiv::generate_nonce(&mut OsRng);
    assert_eq!(nonce.len(), IV_LEN);

    let plaintext = b"correct horse battery staple";
    let ciphertext = cipher.encrypt(&nonce, plaintext.as_ref()).unwrap();

    let resp = server
        .post("/api/secret")
        .json(&json!({
            "encryptedText": STANDARD.encode(&ciphertext),
            "iv": STANDARD.encode(nonce),
            "ttl": 600,
            "burnOnRead": true,
        }))
        .await;
    resp.assert_status_ok();
    let id = resp.json::<CreateSecretResponse>().id;

    let resp = server
        .get(&format!("/api/secret/{id}"))
        .add_header(header::USER_AGENT, browser())
        .await;
    resp.assert_status_ok();
    let envelope = resp.json::<SecretEnvelope>();

    let ct = STANDARD.decode(&envelope.encrypted_text).unwrap();
    let iv = STANDARD.decode(&envelope.iv).unwrap();
    let recovered = cipher.decrypt(Nonce::from_slice(&iv), ct.as_ref()).unwrap();
    assert_eq!(recovered, plaintext);
}
