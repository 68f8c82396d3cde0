//! Node API client.
//!
//! Queries return typed errors. Broadcast never fails as a Rust error: its
//! outcome is a [`BroadcastResult`] so sibling queries fail independently.

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use shadowy_core::address::Address;
use shadowy_core::types::Utxo;
use shadowy_wallet::{SignedEnvelope, WalletError};

use crate::api::{BalanceResponse, HealthReport, NodeInfo, SubmitResponse};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};

/// Value of the `User-Agent` header.
pub const USER_AGENT: &str = concat!("shadowy-wallet/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastStatus {
    Broadcast,
    Failed,
}

/// Why a broadcast failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The node answered with a non-success status.
    Rejected { status: u16 },
    /// No response was received; the node may or may not have the transaction.
    Unreachable,
    /// The envelope could not be encoded; nothing was sent.
    Encoding,
}

/// Outcome of submitting a signed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastResult {
    pub status: BroadcastStatus,
    pub tx_hash: String,
    pub message: String,
    pub failure: Option<FailureKind>,
}

impl BroadcastResult {
    pub fn is_broadcast(&self) -> bool {
        self.status == BroadcastStatus::Broadcast
    }

    fn failed(tx_hash: String, message: String, kind: FailureKind) -> Self {
        Self {
            status: BroadcastStatus::Failed,
            tx_hash,
            message,
            failure: Some(kind),
        }
    }
}

/// Client for the node HTTP API.
pub struct NodeClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    base_url: String,
    api_key: Option<String>,
}

impl NodeClient<ReqwestTransport> {
    /// Client over reqwest with the configured timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(ReqwestTransport::new(config.timeout)?, config))
    }
}

impl<T: HttpTransport> NodeClient<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        if let Some(key) = &self.api_key {
            headers.push(("Authorization".to_string(), format!("Bearer {key}")));
        }
        headers
    }

    async fn send_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, ClientError> {
        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers: self.headers(),
            body,
        };
        debug!(?method, url = %request.url, "node request");
        let response = self.transport.request(request).await?;
        debug!(status = response.status, len = response.body.len(), "node response");
        Ok(response)
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        let response = self.send_request(Method::Get, path, None).await?;
        if !response.is_success() {
            return Err(ClientError::Status {
                code: response.status,
                body: response.text(),
            });
        }
        serde_json::from_slice(&response.body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Unspent outputs paying `address`.
    ///
    /// A success response with an empty, `null` or malformed body yields an
    /// empty list.
    pub async fn fetch_utxos(&self, address: &str) -> Result<Vec<Utxo>, ClientError> {
        check_address(address)?;
        let response = self
            .send_request(Method::Get, &format!("/utxos?address={address}"), None)
            .await?;
        if !response.is_success() {
            return Err(ClientError::Status {
                code: response.status,
                body: response.text(),
            });
        }

        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        match serde_json::from_slice::<Option<Vec<Utxo>>>(&response.body) {
            Ok(utxos) => {
                let utxos = utxos.unwrap_or_default();
                debug!(address, count = utxos.len(), "UTXOs fetched");
                Ok(utxos)
            }
            Err(e) => {
                warn!(address, error = %e, "malformed UTXO response, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    pub async fn balance(&self, address: &str) -> Result<BalanceResponse, ClientError> {
        check_address(address)?;
        self.get_json(&format!("/address/{address}/balance")).await
    }

    pub async fn node_info(&self) -> Result<NodeInfo, ClientError> {
        self.get_json("/node/info").await
    }

    /// Node health. A 503 with a JSON body is still a parsed report.
    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        let response = self.send_request(Method::Get, "/health", None).await?;
        if response.status == 200 || response.status == 503 {
            if let Ok(mut report) = serde_json::from_slice::<HealthReport>(&response.body) {
                report.http_status = response.status;
                return Ok(report);
            }
        }
        Ok(HealthReport::unavailable(response.status))
    }

    /// True iff `/health` answers 200.
    pub async fn test_connection(&self) -> bool {
        match self.send_request(Method::Get, "/health", None).await {
            Ok(response) => response.status == 200,
            Err(e) => {
                debug!(error = %e, "connection test failed");
                false
            }
        }
    }

    // ── Broadcast ────────────────────────────────────────────────────────────

    /// Submit a signed envelope to the mempool. Never retried.
    pub async fn broadcast(&self, envelope: &SignedEnvelope) -> BroadcastResult {
        let tx_hash = envelope.tx_hash().to_string();

        let body = match envelope
            .to_wire()
            .map_err(|e| e.to_string())
            .and_then(|wire| serde_json::to_vec(&wire).map_err(|e| e.to_string()))
        {
            Ok(body) => body,
            Err(e) => {
                warn!(%tx_hash, error = %e, "failed to encode envelope");
                return BroadcastResult::failed(tx_hash, e, FailureKind::Encoding);
            }
        };
        debug!(%tx_hash, payload_len = body.len(), "submitting transaction");

        let response = match self
            .send_request(Method::Post, "/mempool/transactions", Some(body))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(%tx_hash, error = %e, "broadcast failed: node unreachable");
                return BroadcastResult::failed(tx_hash, e.to_string(), FailureKind::Unreachable);
            }
        };

        if response.is_success() {
            let message = match serde_json::from_slice::<SubmitResponse>(&response.body) {
                Ok(submit) if !submit.message.is_empty() => submit.message,
                _ => response.text().trim().to_string(),
            };
            info!(%tx_hash, status = response.status, "transaction broadcast");
            BroadcastResult {
                status: BroadcastStatus::Broadcast,
                tx_hash,
                message,
                failure: None,
            }
        } else {
            let body = response.text();
            warn!(%tx_hash, status = response.status, body = %body.trim(), "broadcast rejected");
            BroadcastResult::failed(
                tx_hash,
                format!("HTTP {}: {}", response.status, body.trim()),
                FailureKind::Rejected {
                    status: response.status,
                },
            )
        }
    }
}

/// Addresses are interpolated into request URLs, so only well-formed ones
/// (hex after the class prefix) are accepted.
fn check_address(address: &str) -> Result<(), ClientError> {
    Address::decode(address).map_err(WalletError::from)?;
    Ok(())
}
