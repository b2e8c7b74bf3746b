use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::{decode_body, Endpoint, Gateway};
use crate::config::Config;
use crate::error::DashboardError;
use crate::logging::log_fetch;

pub struct HttpGateway {
    client: Client,
    base: Url,
    planets_path: String,
    orders_path: String,
    stats_path: String,
}

impl HttpGateway {
    pub fn new(cfg: &Config) -> Result<Self, DashboardError> {
        let client = Client::builder()
            .timeout(cfg.request_timeout())
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| DashboardError::transport("client", e.to_string()))?;
        let base = Url::parse(&cfg.api_base)
            .map_err(|e| DashboardError::transport("client", format!("bad base url {}: {}", cfg.api_base, e)))?;
        Ok(Self {
            client,
            base,
            planets_path: cfg.planets_path.clone(),
            orders_path: cfg.orders_path.clone(),
            stats_path: cfg.stats_path.clone(),
        })
    }

    pub fn url_for(&self, endpoint: Endpoint) -> Result<Url, DashboardError> {
        let path = match endpoint {
            Endpoint::Territories => &self.planets_path,
            Endpoint::Orders => &self.orders_path,
            Endpoint::Stats => &self.stats_path,
        };
        self.base
            .join(path)
            .map_err(|e| DashboardError::transport(endpoint.as_str(), format!("bad path {}: {}", path, e)))
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch(&self, endpoint: Endpoint) -> Result<Value, DashboardError> {
        let url = self.url_for(endpoint)?;
        let result = async {
            let resp = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| DashboardError::transport(endpoint.as_str(), e.to_string()))?;
            let status = resp.status();
            if !status.is_success() {
                return Err(DashboardError::transport(endpoint.as_str(), format!("status {}", status)));
            }
            let body = resp
                .text()
                .await
                .map_err(|e| DashboardError::transport(endpoint.as_str(), e.to_string()))?;
            decode_body(endpoint, &body)
        }
        .await;

        match &result {
            Ok(_) => log_fetch(endpoint.as_str(), url.as_str(), true, ""),
            Err(e) => log_fetch(endpoint.as_str(), url.as_str(), false, &e.to_string()),
        }
        result
    }
}
