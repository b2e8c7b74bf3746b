use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Endpoint, Gateway};
use crate::error::DashboardError;

/// In-memory gateway serving canned documents, for tests and offline demos.
#[derive(Debug, Default)]
pub struct FixtureGateway {
    documents: HashMap<Endpoint, Result<Value, DashboardError>>,
    calls: AtomicUsize,
}

impl FixtureGateway {
    /// Serves empty territories, no orders and empty stats.
    pub fn empty() -> Self {
        Self::default()
            .with(Endpoint::Territories, json!([]))
            .with(Endpoint::Orders, json!([]))
            .with(Endpoint::Stats, json!({}))
    }

    pub fn new(territories: Value, orders: Value, stats: Value) -> Self {
        Self::default()
            .with(Endpoint::Territories, territories)
            .with(Endpoint::Orders, orders)
            .with(Endpoint::Stats, stats)
    }

    pub fn with(mut self, endpoint: Endpoint, doc: Value) -> Self {
        self.documents.insert(endpoint, Ok(doc));
        self
    }

    /// Makes `endpoint` fail as if it answered with a non-success status.
    pub fn failing(mut self, endpoint: Endpoint, detail: &str) -> Self {
        self.documents
            .insert(endpoint, Err(DashboardError::transport(endpoint.as_str(), detail)));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Gateway for FixtureGateway {
    async fn fetch(&self, endpoint: Endpoint) -> Result<Value, DashboardError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.documents.get(&endpoint) {
            Some(result) => result.clone(),
            None => Err(DashboardError::transport(endpoint.as_str(), "no fixture")),
        }
    }
}
