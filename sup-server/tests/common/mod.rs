#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use std::sync::Arc;
use sup_server::{routes::router, sqlite_url_for_path, AppState, Store};
use tempfile::TempDir;
use tower::ServiceExt;

// costo minimo accettato da bcrypt, per non rallentare i test
pub const TEST_COST: u32 = 4;

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    // tiene in vita la directory del database per tutta la durata del test
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .expect("location header")
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().expect("message field")
    }
}

pub async fn spawn_app() -> anyhow::Result<TestApp> {
    let dir = TempDir::new()?;
    let url = sqlite_url_for_path(&dir.path().join("sup.db"))?;
    let store = Store::connect(&url).await?;
    store.migrate().await?;
    let state = AppState::new(store, TEST_COST);
    Ok(TestApp { router: router(state.clone()), state, _dir: dir })
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let resp = self.router.clone().oneshot(req).await.expect("infallible");
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Request::delete(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(&self, method: Method, uri: &str, body: Value) -> TestResponse {
        self.send_raw(method, uri, body.to_string()).await
    }

    pub async fn send_raw(&self, method: Method, uri: &str, body: impl Into<Body>) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap();
        self.send(req).await
    }

    pub async fn get_with_basic(&self, uri: &str, username: &str, password: &str) -> TestResponse {
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        let req = Request::get(uri)
            .header(header::AUTHORIZATION, format!("Basic {encoded}"))
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    /// Crea un utente e ne restituisce l'id preso dall'header Location.
    pub async fn create_user(&self, username: &str, password: &str) -> String {
        let res = self
            .send_json(
                Method::POST,
                "/users",
                serde_json::json!({"username": username, "password": password}),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        res.location()
            .strip_prefix("/users/")
            .expect("location under /users/")
            .to_string()
    }

    pub async fn create_message(&self, from: &str, to: &str, text: &str) -> TestResponse {
        self.send_json(
            Method::POST,
            "/messages",
            serde_json::json!({"text": text, "to": to, "from": from}),
        )
        .await
    }
}
