//! End-to-end send: select, build, sign and broadcast from the active wallet.

use tracing::info;

use shadowy_core::address::is_valid_address;
use shadowy_wallet::{
    CoinSelector, SignedEnvelope, TransactionBuilder, TransactionSigner, WalletError, WalletHandle,
};

use crate::client::{BroadcastResult, NodeClient};
use crate::error::ClientError;
use crate::transport::HttpTransport;

/// Summary of one send attempt.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub tx_hash: String,
    pub amount: u64,
    pub fee: u64,
    pub change: u64,
    pub inputs: usize,
    pub envelope: SignedEnvelope,
    pub result: BroadcastResult,
}

/// Pay `amount` to `destination` from `handle`, returning change to the
/// wallet's own address.
///
/// Everything before the broadcast is local; an error returned here means
/// nothing was submitted.
pub async fn send<T: HttpTransport>(
    client: &NodeClient<T>,
    handle: &WalletHandle,
    destination: &str,
    amount: u64,
    fee: u64,
) -> Result<SendOutcome, ClientError> {
    if !is_valid_address(destination) {
        return Err(WalletError::InvalidAddress(destination.to_string()).into());
    }
    if amount == 0 {
        return Err(WalletError::InvalidAmount("amount must be non-zero".into()).into());
    }
    let key_pair = handle.key_pair()?;
    let target = amount
        .checked_add(fee)
        .ok_or_else(|| WalletError::InvalidAmount("amount plus fee overflows".into()))?;

    let utxos = client.fetch_utxos(handle.address()).await?;
    let selection = CoinSelector::select(&utxos, target)?;

    let unsigned = TransactionBuilder::new()
        .set_fee(fee)
        .build(&selection.selected, destination, amount, handle.address())?;
    let envelope = TransactionSigner::sign_unsigned(&unsigned, key_pair)?;

    let result = client.broadcast(&envelope).await;
    info!(
        wallet = handle.name(),
        tx_hash = %result.tx_hash,
        amount,
        fee,
        change = unsigned.change,
        broadcast = result.is_broadcast(),
        "send finished"
    );

    Ok(SendOutcome {
        tx_hash: unsigned.tx_hash().to_string(),
        amount,
        fee,
        change: unsigned.change,
        inputs: unsigned.draft().inputs.len(),
        envelope,
        result,
    })
}
