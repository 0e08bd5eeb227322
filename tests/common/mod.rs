#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

use languhelp_api::config::AppConfig;
use languhelp_api::{app, AppState, Repositories};

/// The router on an unused port, backed by the in-memory store. One per test.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: Client,
    _storage: TempDir,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let storage = tempfile::tempdir().context("failed to create storage dir")?;
        let mut config = AppConfig::development();
        config.storage.base_path = storage.path().to_path_buf();
        config.security.jwt_secret = Some("integration-secret".to_string());

        let state = AppState::new(config, Repositories::in_memory(), None)?;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            client: Client::new(),
            _storage: storage,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn patch(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    /// Registers a customer and logs in. Returns `(user id, token)`.
    pub async fn register_and_login(&self, email: &str) -> Result<(String, String)> {
        let res = self
            .client
            .post(self.url("/api/v1/register"))
            .json(&json!({ "name": "Test User", "email": email, "password": "secret" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        let body: Value = res.json().await?;
        let id = body["data"]["id"].as_str().context("user id missing")?.to_string();

        let token = self.login(email, "secret").await?;
        Ok((id, token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/v1/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"]["token"].as_str().context("token missing")?.to_string())
    }

    /// Creates a context for the caller and returns its id.
    pub async fn create_context(&self, token: &str, language_id: &str) -> Result<String> {
        let res = self.post("/api/v1/contexts", token).json(&json!({ "languageId": language_id })).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create context failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"]["id"].as_str().context("context id missing")?.to_string())
    }

    pub async fn create_note(&self, token: &str, context_id: &str, header: &str, payload: &str) -> Result<Value> {
        let res = self
            .post("/api/v1/notes", token)
            .json(&json!({ "header": header, "payload": payload, "languageId": "1", "contextId": context_id }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create note failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }
}
