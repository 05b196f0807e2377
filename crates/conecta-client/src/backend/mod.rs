//! Client for the hosted backend: auth sessions, table queries, named RPCs,
//! object storage and the realtime change feed. Everything the app persists
//! lives behind this client; the backend enforces authorization row-by-row.

mod http;
mod realtime;
mod storage;

pub use http::{BackendError, Query};
pub use realtime::{RealtimeSubscription, RowInserted};
pub use storage::{
    attachment_kind, content_type_for, validate_attachment, StorageClient, BUCKET_ATTACHMENTS,
    BUCKET_AVATARS,
};

use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use conecta_protocol::ChangeFilter;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: String,
    pub push_gateway_url: String,
    /// Device push token, when the platform shell provides one
    pub device_push_token: Option<String>,
}

impl BackendConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("CONECTA_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:54321".to_string()),
            api_key: std::env::var("CONECTA_API_KEY").unwrap_or_default(),
            push_gateway_url: std::env::var("CONECTA_PUSH_GATEWAY_URL")
                .unwrap_or_else(|_| "https://exp.host/--/api/v2/push/send".to_string()),
            device_push_token: std::env::var("CONECTA_PUSH_TOKEN").ok(),
        }
    }
}

/// Session issued by the backend's auth endpoint; the token is opaque here
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: Arc<BackendConfig>,
    session: Arc<RwLock<Option<AuthSession>>>,
    realtime: Arc<RwLock<Option<realtime::RealtimeClient>>>,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
            session: Arc::new(RwLock::new(None)),
            realtime: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub async fn user_id(&self) -> Option<Uuid> {
        self.session.read().await.as_ref().map(|s| s.user.id)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    async fn token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    async fn headers(&self, prefer: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&self.config.api_key) {
            headers.insert("apikey", v);
        }
        if let Some(token) = self.token().await {
            if let Ok(v) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, v);
            }
        }
        if let Some(prefer) = prefer {
            if let Ok(v) = HeaderValue::from_str(prefer) {
                headers.insert("Prefer", v);
            }
        }
        headers
    }

    // Auth

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.config.base_url);
        let body = serde_json::json!({ "email": email, "password": password });

        let session: AuthSession =
            http::post(&self.http, &url, self.headers(None).await, &body).await?;
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthSession, BackendError> {
        let url = format!("{}/auth/v1/signup", self.config.base_url);
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": { "name": name },
        });

        let session: AuthSession =
            http::post(&self.http, &url, self.headers(None).await, &body).await?;
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// Best-effort server-side logout, then drop the local session and the
    /// realtime connection.
    pub async fn sign_out(&self) {
        let url = format!("{}/auth/v1/logout", self.config.base_url);
        let headers = self.headers(None).await;
        if let Err(e) = http::post_void(&self.http, &url, headers, &serde_json::json!({})).await {
            tracing::warn!("logout request failed: {}", e);
        }
        *self.session.write().await = None;
        *self.realtime.write().await = None;
    }

    // Table queries

    fn table_url(&self, q: &Query) -> String {
        let qs = q.query_string();
        if qs.is_empty() {
            format!("{}/rest/v1/{}", self.config.base_url, q.table())
        } else {
            format!("{}/rest/v1/{}?{}", self.config.base_url, q.table(), qs)
        }
    }

    pub async fn select<T: DeserializeOwned>(&self, q: Query) -> Result<Vec<T>, BackendError> {
        http::get(&self.http, &self.table_url(&q), self.headers(None).await).await
    }

    /// At most one row
    pub async fn select_maybe<T: DeserializeOwned>(
        &self,
        q: Query,
    ) -> Result<Option<T>, BackendError> {
        let mut rows: Vec<T> = self.select(q.limit(1)).await?;
        Ok(rows.pop())
    }

    /// Exactly one row
    pub async fn select_one<T: DeserializeOwned>(&self, q: Query) -> Result<T, BackendError> {
        self.select_maybe(q).await?.ok_or(BackendError::Api {
            status: 406,
            message: "no rows returned".to_string(),
        })
    }

    pub async fn insert<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let q = Query::from(table);
        let headers = self.headers(Some("return=representation")).await;
        let mut rows: Vec<T> = http::post(&self.http, &self.table_url(&q), headers, body).await?;
        rows.pop().ok_or(BackendError::Api {
            status: 500,
            message: "insert returned no rows".to_string(),
        })
    }

    pub async fn insert_void<B: Serialize>(&self, table: &str, body: &B) -> Result<(), BackendError> {
        let q = Query::from(table);
        let headers = self.headers(Some("return=minimal")).await;
        http::post_void(&self.http, &self.table_url(&q), headers, body).await
    }

    /// Update rows matched by `q`'s filters, returning the first updated row
    pub async fn update<T: DeserializeOwned, B: Serialize>(
        &self,
        q: Query,
        body: &B,
    ) -> Result<T, BackendError> {
        let headers = self.headers(Some("return=representation")).await;
        let mut rows: Vec<T> = http::patch(&self.http, &self.table_url(&q), headers, body).await?;
        rows.pop().ok_or(BackendError::Api {
            status: 404,
            message: "no rows updated".to_string(),
        })
    }

    pub async fn update_void<B: Serialize>(&self, q: Query, body: &B) -> Result<(), BackendError> {
        let headers = self.headers(Some("return=minimal")).await;
        http::patch_void(&self.http, &self.table_url(&q), headers, body).await
    }

    /// Insert-or-update on the given conflict target
    pub async fn upsert<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        on_conflict: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = format!(
            "{}/rest/v1/{}?on_conflict={}",
            self.config.base_url, table, on_conflict
        );
        let headers = self
            .headers(Some("resolution=merge-duplicates,return=representation"))
            .await;
        let mut rows: Vec<T> = http::post(&self.http, &url, headers, body).await?;
        rows.pop().ok_or(BackendError::Api {
            status: 500,
            message: "upsert returned no rows".to_string(),
        })
    }

    pub async fn delete(&self, q: Query) -> Result<(), BackendError> {
        http::delete(&self.http, &self.table_url(&q), self.headers(None).await).await
    }

    // Remote procedures

    pub async fn rpc<T: DeserializeOwned, B: Serialize>(
        &self,
        name: &str,
        args: &B,
    ) -> Result<T, BackendError> {
        let url = format!("{}/rest/v1/rpc/{}", self.config.base_url, name);
        http::post(&self.http, &url, self.headers(None).await, args).await
    }

    pub async fn rpc_void<B: Serialize>(&self, name: &str, args: &B) -> Result<(), BackendError> {
        let url = format!("{}/rest/v1/rpc/{}", self.config.base_url, name);
        http::post_void(&self.http, &url, self.headers(None).await, args).await
    }

    // Storage

    pub async fn storage(&self) -> StorageClient {
        StorageClient::new(
            self.http.clone(),
            self.config.base_url.clone(),
            self.config.api_key.clone(),
            self.token().await,
        )
    }

    // Realtime

    async fn ensure_realtime(&self) -> Result<()> {
        if self.realtime.read().await.is_some() {
            return Ok(());
        }

        let token = self
            .token()
            .await
            .ok_or(BackendError::NotAuthenticated)?;

        let ws_base = self
            .config
            .base_url
            .replace("http://", "ws://")
            .replace("https://", "wss://");
        let url = format!("{ws_base}/realtime/v1");

        let client = realtime::RealtimeClient::connect(&url, &token).await?;
        *self.realtime.write().await = Some(client);
        Ok(())
    }

    /// Open one INSERT subscription bound to an equality filter. Connects the
    /// realtime channel lazily on first use.
    pub async fn subscribe(
        &self,
        topic: &str,
        filter: ChangeFilter,
    ) -> Result<RealtimeSubscription> {
        self.ensure_realtime().await?;
        let guard = self.realtime.read().await;
        let client = guard
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("realtime connection is gone"))?;
        client.subscribe(topic, filter).await
    }

    pub async fn unsubscribe(&self, topic: &str) {
        if let Some(client) = self.realtime.read().await.as_ref() {
            client.unsubscribe(topic).await;
        }
    }
}
