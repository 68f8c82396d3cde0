//! Shared test helpers for scenario and property tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use shadowy_client::{
    ClientConfig, HttpRequest, HttpResponse, HttpTransport, NodeClient, TransportError,
};
use shadowy_core::address::Address;
use shadowy_core::types::{TransactionDraft, TxInput, TxOutput, Utxo};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A standard address whose digest is `tag` repeated.
pub fn address(tag: u8) -> String {
    Address::from_digest([tag; 20]).encode()
}

/// A UTXO with a distinct txid per `tag`.
pub fn utxo(tag: u8, value: u64, owner: &str) -> Utxo {
    Utxo {
        txid: format!("{:02x}", tag).repeat(32),
        vout: u32::from(tag),
        value,
        script_pubkey: String::new(),
        address: owner.to_string(),
        confirmations: 6,
    }
}

/// The 1e9 / 5e8 / 2e8 UTXO set used by the send scenarios.
pub fn sample_utxos(owner: &str) -> Vec<Utxo> {
    vec![
        utxo(1, 1_000_000_000, owner),
        utxo(2, 500_000_000, owner),
        utxo(3, 200_000_000, owner),
    ]
}

/// A small draft with a fixed timestamp.
pub fn sample_draft(value: u64) -> TransactionDraft {
    TransactionDraft::new(
        vec![TxInput {
            txid: "ab".repeat(32),
            vout: 0,
            script_sig: String::new(),
            sequence: 0xffff_ffff,
        }],
        vec![TxOutput {
            value,
            script_pubkey: Address::from_digest([5; 20]).locking_script(),
            address: address(5),
        }],
        Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7)
            .single()
            .unwrap_or_default(),
    )
}

// ---------------------------------------------------------------------------
// Scripted node
// ---------------------------------------------------------------------------

/// In-process node double: answers requests from a queue and records them.
#[derive(Default)]
pub struct ScriptedNode {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with `status` and `body`.
    pub fn respond(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.push(Ok(HttpResponse::new(status, body)));
        self
    }

    /// Queue a transport failure.
    pub fn fail(self, error: TransportError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, response: Result<HttpResponse, TransportError>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// A client over this node with default configuration.
    pub fn into_client(self) -> NodeClient<ScriptedNode> {
        NodeClient::new(self, &ClientConfig::default())
    }
}

#[async_trait]
impl HttpTransport for ScriptedNode {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request);
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| Err(TransportError::Other("no scripted response".into())))
    }
}

/// JSON body for a UTXO list response.
pub fn utxo_body(utxos: &[Utxo]) -> String {
    serde_json::to_string(utxos).unwrap_or_else(|_| "[]".into())
}
