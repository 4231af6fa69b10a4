pub mod http_transport;

#[cfg(test)]
pub(crate) mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::app::Result;
use crate::session::TokenHandle;

pub use http_transport::HttpTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A request relative to the API base path (`/api`).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Normalized response body: `{ status?, data, meta?, ... }`.
///
/// Some endpoints put their payload next to `data` (for example
/// `{ "status": "success", "is_subscribed": true }`); those keys land in
/// `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    pub fn with_data(data: Value) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn data<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }

    /// Decode `meta`, treating an absent block as `T::default()`.
    pub fn meta<T: DeserializeOwned + Default>(&self) -> Result<T> {
        match &self.meta {
            Some(meta) if !meta.is_null() => Ok(serde_json::from_value(meta.clone())?),
            _ => Ok(T::default()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }

    /// Look up a boolean flag next to `data`, then inside it.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.extra
            .get(key)
            .and_then(Value::as_bool)
            .or_else(|| self.data.get(key).and_then(Value::as_bool))
    }
}

#[async_trait]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<Envelope>;
}

/// Attaches the session's bearer token to every request.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport + Send + Sync>,
    token: TokenHandle,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport + Send + Sync>, token: TokenHandle) -> Self {
        Self { transport, token }
    }

    pub fn token(&self) -> &TokenHandle {
        &self.token
    }

    pub async fn get(&self, path: &str, query: Vec<(String, String)>) -> Result<Envelope> {
        let mut request = ApiRequest::new(Method::Get, path);
        request.query = query;
        self.send(request).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope> {
        let mut request = ApiRequest::new(Method::Post, path);
        request.body = Some(serde_json::to_value(body)?);
        self.send(request).await
    }

    pub async fn post_empty(&self, path: &str) -> Result<Envelope> {
        self.send(ApiRequest::new(Method::Post, path)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope> {
        let mut request = ApiRequest::new(Method::Put, path);
        request.body = Some(serde_json::to_value(body)?);
        self.send(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<Envelope> {
        self.send(ApiRequest::new(Method::Delete, path)).await
    }

    async fn send(&self, mut request: ApiRequest) -> Result<Envelope> {
        request.bearer = self.token.get();
        tracing::debug!("{} {}", request.method.as_str(), request.path);
        self.transport.send(request).await
    }
}
