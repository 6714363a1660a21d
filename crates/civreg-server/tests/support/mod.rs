// SPDX-License-Identifier: Apache-2.0

// Shared across the integration binaries; not every helper is used by each.
#![allow(dead_code)]

use civreg_core::now_millis;
use civreg_model::{NewAdminUser, Role};
use civreg_server::{ApiConfig, AppState, build_router, hash_password};
use civreg_store::{AdminUserStore, LocalMediaStore, SqliteStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<SqliteStore>,
    pub spool_dir: std::path::PathBuf,
    // Held so the scratch dir outlives the server.
    _dir: TempDir,
}

pub async fn spawn_server(allow_seed: bool) -> TestServer {
    let dir = tempfile::tempdir().expect("tempdir");
    let spool_dir = dir.path().join("spool");
    let store = Arc::new(SqliteStore::open(&dir.path().join("civreg.db")).expect("open store"));
    let media = Arc::new(LocalMediaStore::new(dir.path().join("media")));
    let cfg = ApiConfig {
        allow_seed,
        token_secret: "integration-test-secret".to_string(),
        spool_dir: spool_dir.clone(),
        ..ApiConfig::default()
    };
    let app = build_router(AppState::from_sqlite(store.clone(), media, cfg));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });

    TestServer {
        addr,
        store,
        spool_dir,
        _dir: dir,
    }
}

pub async fn seed_admin(server: &TestServer, email: &str, password: &str, role: Role) {
    let users: &dyn AdminUserStore = server.store.as_ref();
    users
        .insert(&NewAdminUser {
            name: "Test Admin".to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).expect("hash password"),
            role,
            created_at: now_millis(),
        })
        .await
        .expect("seed admin user");
}

/// Raw HTTP/1.1 request against the live server; returns (status, body).
pub async fn request(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: &[u8],
) -> (u16, String) {
    let mut head = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (name, value) in headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));

    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    stream.write_all(head.as_bytes()).await.expect("write head");
    stream.write_all(body).await.expect("write body");

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("read response");
    let response = String::from_utf8_lossy(&response).to_string();

    let status = response
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status line");
    let payload = response
        .split_once("\r\n\r\n")
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_default();
    (status, payload)
}

pub async fn get_json(
    addr: SocketAddr,
    path: &str,
    token: Option<&str>,
) -> (u16, serde_json::Value) {
    let auth;
    let mut headers: Vec<(&str, &str)> = Vec::new();
    if let Some(token) = token {
        auth = format!("Bearer {token}");
        headers.push(("Authorization", auth.as_str()));
    }
    let (status, body) = request(addr, "GET", path, &headers, b"").await;
    let value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
    (status, value)
}

pub async fn post_json(
    addr: SocketAddr,
    path: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> (u16, serde_json::Value) {
    let auth;
    let mut headers: Vec<(&str, &str)> = vec![("Content-Type", "application/json")];
    if let Some(token) = token {
        auth = format!("Bearer {token}");
        headers.push(("Authorization", auth.as_str()));
    }
    let payload = serde_json::to_vec(body).expect("serialize body");
    let (status, body) = request(addr, "POST", path, &headers, &payload).await;
    let value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
    (status, value)
}

pub async fn login(server: &TestServer, email: &str, password: &str) -> String {
    let (status, body) = post_json(
        server.addr,
        "/auth/login",
        None,
        &serde_json::json!({"email": email, "password": password}),
    )
    .await;
    assert_eq!(status, 200, "login failed: {body}");
    body["token"].as_str().expect("token in response").to_string()
}

/// Builds a multipart/form-data body with optional text fields and one file.
pub fn multipart_body(
    boundary: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((name, file_name, bytes)) = file {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(
    addr: SocketAddr,
    path: &str,
    token: Option<&str>,
    boundary: &str,
    body: &[u8],
) -> (u16, serde_json::Value) {
    let content_type = format!("multipart/form-data; boundary={boundary}");
    let auth;
    let mut headers: Vec<(&str, &str)> = vec![("Content-Type", content_type.as_str())];
    if let Some(token) = token {
        auth = format!("Bearer {token}");
        headers.push(("Authorization", auth.as_str()));
    }
    let (status, body) = request(addr, "POST", path, &headers, body).await;
    let value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
    (status, value)
}
