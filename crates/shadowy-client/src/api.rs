//! Response shapes of the node API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `GET /address/{addr}/balance`.
///
/// Amounts are reported both in whole coins (`f64`) and satoshis.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct BalanceResponse {
    pub address: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub balance_satoshis: u64,
    #[serde(default)]
    pub confirmed: f64,
    #[serde(default)]
    pub confirmed_satoshis: u64,
    #[serde(default)]
    pub unconfirmed: f64,
    #[serde(default)]
    pub unconfirmed_satoshis: u64,
    #[serde(default)]
    pub total_received: f64,
    #[serde(default)]
    pub total_received_satoshis: u64,
    #[serde(default)]
    pub total_sent: f64,
    #[serde(default)]
    pub total_sent_satoshis: u64,
    #[serde(default)]
    pub transaction_count: u64,
    #[serde(default)]
    pub last_activity: Option<String>,
}

/// `GET /node/info`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeInfo {
    #[serde(default)]
    pub tip_height: u64,
    #[serde(default)]
    pub total_blocks: u64,
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Health of one node service.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ServiceHealth {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_check: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub metrics: Option<serde_json::Value>,
}

/// `GET /health`. The node answers 503 with the same body when unhealthy.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct HealthReport {
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceHealth>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// HTTP status the report arrived with; filled in by the client.
    #[serde(default)]
    pub http_status: u16,
}

impl HealthReport {
    /// Report for a response that carried no parseable health body.
    pub fn unavailable(http_status: u16) -> Self {
        Self {
            healthy: false,
            status: format!("HTTP {http_status}"),
            services: BTreeMap::new(),
            timestamp: None,
            error: Some(format!("health check failed with HTTP {http_status}")),
            http_status,
        }
    }

    /// Names of services not reporting "healthy".
    pub fn degraded_services(&self) -> Vec<&str> {
        self.services
            .iter()
            .filter(|(_, s)| s.status != "healthy")
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Body of a successful `POST /mempool/transactions`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmitResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tx_hash: String,
    #[serde(default)]
    pub message: String,
}
