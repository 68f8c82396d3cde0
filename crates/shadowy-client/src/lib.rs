//! # shadowy-client: node API client for the Shadowy wallet.
//!
//! - [`transport`]: `HttpTransport` collaborator and the reqwest backend
//! - [`client`]: `NodeClient` for UTXO queries, balance, health, broadcast
//! - [`send`]: the select/build/sign/broadcast pipeline
//! - [`config`]: `ClientConfig` from environment variables
//! - [`api`]: response shapes

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod send;
pub mod transport;

pub use api::{BalanceResponse, HealthReport, NodeInfo, ServiceHealth, SubmitResponse};
pub use client::{BroadcastResult, BroadcastStatus, FailureKind, NodeClient, USER_AGENT};
pub use config::ClientConfig;
pub use error::{ClientError, TransportError};
pub use send::{send, SendOutcome};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
