use async_trait::async_trait;
use serde_json::Value;

use crate::error::DashboardError;

mod fixture;
mod http;

pub use fixture::FixtureGateway;
pub use http::HttpGateway;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Territories,
    Orders,
    Stats,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Territories => "territories",
            Endpoint::Orders => "orders",
            Endpoint::Stats => "stats",
        }
    }
}

/// Read-only access to the war API. Every read yields a raw JSON document
/// or a transport/schema failure; shape checking happens in `normalize`.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch(&self, endpoint: Endpoint) -> Result<Value, DashboardError>;

    async fn get_territories(&self) -> Result<Value, DashboardError> {
        self.fetch(Endpoint::Territories).await
    }

    /// An empty array means no active orders.
    async fn get_orders(&self) -> Result<Value, DashboardError> {
        self.fetch(Endpoint::Orders).await
    }

    async fn get_stats(&self) -> Result<Value, DashboardError> {
        self.fetch(Endpoint::Stats).await
    }
}

/// Turns a response body into a document. Empty bodies read as an empty
/// list and `{"error": ...}` envelopes as transport failures.
pub(crate) fn decode_body(endpoint: Endpoint, body: &str) -> Result<Value, DashboardError> {
    if body.trim().is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    let doc: Value = serde_json::from_str(body)
        .map_err(|e| DashboardError::schema(endpoint.as_str(), format!("body is not JSON: {}", e)))?;
    if let Some(err) = error_envelope(&doc) {
        return Err(DashboardError::transport(endpoint.as_str(), err));
    }
    Ok(doc)
}

/// Keys an error body may carry next to `error`.
const ENVELOPE_KEYS: &[&str] = &["error", "message", "detail", "status", "code"];

/// An error body is an object whose `error` is a non-empty string and which
/// carries nothing but envelope keys. Data documents that happen to have an
/// `error` member are left alone.
fn error_envelope(doc: &Value) -> Option<String> {
    let map = doc.as_object()?;
    let message = map.get("error")?.as_str()?.trim();
    if message.is_empty() || map.keys().any(|k| !ENVELOPE_KEYS.contains(&k.as_str())) {
        return None;
    }
    Some(message.to_string())
}
