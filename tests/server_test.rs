//! Router-level behaviour: network restriction, static frontend and a real
//! listener.

mod common;

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
};
use common::{body_bytes, TestHarness};
use reelhouse::server::create_router;
use tower::ServiceExt;

fn request_from(uri: &str, peer: &str) -> Request<Body> {
    let mut request = Request::get(uri).body(Body::empty()).unwrap();
    let addr: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

#[tokio::test]
async fn lan_only_rejects_public_peers() {
    let h = TestHarness::new();

    let response = h.request(request_from("/api/health", "198.51.100.4:40000")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = h.request(request_from("/api/health", "192.168.0.20:40000")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn lan_only_can_be_disabled() {
    let mut h = TestHarness::new();
    h.config.server.lan_only = false;

    let response = h.request(request_from("/api/health", "198.51.100.4:40000")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn static_dir_served_with_spa_fallback() {
    let h = TestHarness::new();
    let static_dir = h.dir.path().join("web");
    std::fs::create_dir_all(static_dir.join("assets")).unwrap();
    std::fs::write(static_dir.join("index.html"), "<html>reelhouse</html>").unwrap();
    std::fs::write(static_dir.join("assets/app.js"), "console.log(1)").unwrap();

    let app = create_router(h.context(), Some(static_dir));

    let response = app
        .clone()
        .oneshot(Request::get("/assets/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response.into_body()).await, b"console.log(1)".to_vec());

    // Client-side routes fall back to index.html.
    let response = app
        .clone()
        .oneshot(Request::get("/collections/firefly").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        body_bytes(response.into_body()).await,
        b"<html>reelhouse</html>".to_vec()
    );

    // API routes still win.
    let response = app
        .oneshot(Request::get("/api/collections").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_static_dir_is_ignored() {
    let h = TestHarness::new();
    let app = create_router(h.context(), Some(h.dir.path().join("no-such-dir")));

    let response = app
        .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn serves_over_tcp_with_connect_info() {
    let h = TestHarness::new();
    let app = create_router(h.context(), None);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    // Minimal HTTP/1.1 exchange; loopback counts as local.
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(
            b"GET /api/stream?collectionId=firefly&season=1&ep=1 HTTP/1.1\r\n\
              Host: localhost\r\nRange: bytes=0-9\r\nConnection: close\r\n\r\n",
        )
        .await
        .unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8_lossy(&raw);

    assert!(text.starts_with("HTTP/1.1 206"), "{text}");
    assert!(text.to_lowercase().contains("content-range: bytes 0-9/1000"));
}
