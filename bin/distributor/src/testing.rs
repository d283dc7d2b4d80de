//! Test doubles for the RPC node and the fee-claim service

use crate::claim::FeeClaimApi;
use crate::errors::ServiceError;
use crate::rpc::{RpcTokenAccountBalance, SolanaRpc};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::{Message, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// Program id stamped on mock claim transactions so the mock node can tell
/// them apart from holder transfers
pub fn claim_program_id() -> Pubkey {
    Pubkey::new_from_array([7u8; 32])
}

pub fn unique_keys(n: usize) -> Vec<Pubkey> {
    (0..n).map(|_| Pubkey::new_unique()).collect()
}

/// Serve `app` on an ephemeral local port, return its base URL
pub async fn spawn_server(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Unsigned claim transaction as the fee-claim service would return it
pub fn unsigned_claim_transaction(wallet: &Pubkey) -> VersionedTransaction {
    let ix = Instruction::new_with_bytes(
        claim_program_id(),
        b"collectCreatorFee",
        vec![AccountMeta::new(*wallet, true)],
    );
    let message = Message::new_with_blockhash(&[ix], Some(wallet), &Hash::new_unique());
    VersionedTransaction {
        signatures: vec![Signature::default(); message.header.num_required_signatures as usize],
        message: VersionedMessage::Legacy(message),
    }
}

/// One `getTokenLargestAccounts` entry as the node encodes it
pub fn token_balance(address: &str, amount: u64, decimals: u8) -> RpcTokenAccountBalance {
    let ui_amount = amount as f64 / 10f64.powi(decimals as i32);
    serde_json::from_value(json!({
        "address": address,
        "amount": amount.to_string(),
        "decimals": decimals,
        "uiAmount": ui_amount,
        "uiAmountString": ui_amount.to_string()
    }))
    .unwrap()
}

/// A System Program transfer observed by the mock node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransfer {
    pub recipient: Pubkey,
    pub lamports: u64,
}

pub struct MockRpc {
    balance: Mutex<Result<u64, ServiceError>>,
    holders: Mutex<Result<Vec<RpcTokenAccountBalance>, ServiceError>>,
    owners: Mutex<HashMap<Pubkey, Pubkey>>,
    owners_error: Mutex<Option<ServiceError>>,
    blockhash_error: Mutex<Option<ServiceError>>,
    rejected: Mutex<HashSet<Pubkey>>,
    claims: Mutex<Vec<VersionedTransaction>>,
    transfers: Mutex<Vec<SentTransfer>>,
    blockhash_calls: AtomicUsize,
    send_calls: AtomicUsize,
    cancel_after: Mutex<Option<(usize, CancellationToken)>>,
}

impl MockRpc {
    pub fn new() -> Self {
        Self {
            balance: Mutex::new(Ok(0)),
            holders: Mutex::new(Ok(Vec::new())),
            owners: Mutex::new(HashMap::new()),
            owners_error: Mutex::new(None),
            blockhash_error: Mutex::new(None),
            rejected: Mutex::new(HashSet::new()),
            claims: Mutex::new(Vec::new()),
            transfers: Mutex::new(Vec::new()),
            blockhash_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            cancel_after: Mutex::new(None),
        }
    }

    pub fn with_balance(self, lamports: u64) -> Self {
        *self.balance.lock() = Ok(lamports);
        self
    }

    pub fn with_balance_error(self, err: ServiceError) -> Self {
        *self.balance.lock() = Err(err);
        self
    }

    pub fn with_holders(self, addresses: &[Pubkey]) -> Self {
        let accounts = addresses
            .iter()
            .enumerate()
            .map(|(i, address)| {
                token_balance(&address.to_string(), ((addresses.len() - i) * 1_000) as u64, 6)
            })
            .collect();
        *self.holders.lock() = Ok(accounts);
        self
    }

    pub fn with_raw_holders(self, accounts: Vec<RpcTokenAccountBalance>) -> Self {
        *self.holders.lock() = Ok(accounts);
        self
    }

    pub fn with_holders_error(self, err: ServiceError) -> Self {
        *self.holders.lock() = Err(err);
        self
    }

    pub fn with_owner(self, account: Pubkey, owner: Pubkey) -> Self {
        self.owners.lock().insert(account, owner);
        self
    }

    pub fn with_owners_error(self, err: ServiceError) -> Self {
        *self.owners_error.lock() = Some(err);
        self
    }

    pub fn with_blockhash_error(self, err: ServiceError) -> Self {
        *self.blockhash_error.lock() = Some(err);
        self
    }

    pub fn reject_transfers_to(self, recipients: &[Pubkey]) -> Self {
        self.rejected.lock().extend(recipients.iter().copied());
        self
    }

    /// Cancel `token` once `sends` transactions have been submitted
    pub fn cancel_after_sends(self, sends: usize, token: CancellationToken) -> Self {
        *self.cancel_after.lock() = Some((sends, token));
        self
    }

    pub fn claims(&self) -> Vec<VersionedTransaction> {
        self.claims.lock().clone()
    }

    pub fn transfers(&self) -> Vec<SentTransfer> {
        self.transfers.lock().clone()
    }

    pub fn blockhash_calls(&self) -> usize {
        self.blockhash_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockRpc {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a single-instruction System Program transfer
fn decode_transfer(tx: &VersionedTransaction) -> Option<SentTransfer> {
    let keys = tx.message.static_account_keys();
    let ix = tx.message.instructions().first()?;
    if keys.get(ix.program_id_index as usize)? != &solana_sdk::system_program::id() {
        return None;
    }
    // SystemInstruction::Transfer = u32 tag 2 followed by u64 lamports
    if ix.data.len() != 12 || ix.data[..4] != [2, 0, 0, 0] {
        return None;
    }
    let lamports = u64::from_le_bytes(ix.data[4..12].try_into().ok()?);
    let recipient = *keys.get(*ix.accounts.get(1)? as usize)?;
    Some(SentTransfer { recipient, lamports })
}

#[async_trait]
impl SolanaRpc for MockRpc {
    async fn get_balance(&self, _pubkey: &Pubkey) -> Result<u64, ServiceError> {
        self.balance.lock().clone()
    }

    async fn get_token_largest_accounts(
        &self,
        _mint: &Pubkey,
    ) -> Result<Vec<RpcTokenAccountBalance>, ServiceError> {
        self.holders.lock().clone()
    }

    async fn get_token_account_owners(
        &self,
        accounts: &[Pubkey],
    ) -> Result<Vec<Option<Pubkey>>, ServiceError> {
        if let Some(err) = self.owners_error.lock().clone() {
            return Err(err);
        }
        let owners = self.owners.lock();
        Ok(accounts.iter().map(|a| owners.get(a).copied()).collect())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ServiceError> {
        self.blockhash_calls.fetch_add(1, Ordering::SeqCst);
        match self.blockhash_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(Hash::new_unique()),
        }
    }

    async fn send_transaction(&self, tx: &VersionedTransaction) -> Result<Signature, ServiceError> {
        let sends = self.send_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, token)) = self.cancel_after.lock().as_ref() {
            if sends >= *after {
                token.cancel();
            }
        }

        if tx.message.static_account_keys().contains(&claim_program_id()) {
            self.claims.lock().push(tx.clone());
            return Ok(tx.signatures[0]);
        }

        let transfer = decode_transfer(tx)
            .ok_or_else(|| ServiceError::malformed("mock node only accepts claims and transfers"))?;

        if self.rejected.lock().contains(&transfer.recipient) {
            return Err(ServiceError::Rejected {
                code: -32002,
                message: "Transaction simulation failed".to_string(),
            });
        }

        self.transfers.lock().push(transfer);
        Ok(tx.signatures[0])
    }
}

pub struct MockFeeApi {
    response: Mutex<Result<Vec<u8>, ServiceError>>,
    calls: AtomicUsize,
    panic_on_first: bool,
}

impl MockFeeApi {
    pub fn returning(bytes: Vec<u8>) -> Self {
        Self {
            response: Mutex::new(Ok(bytes)),
            calls: AtomicUsize::new(0),
            panic_on_first: false,
        }
    }

    pub fn unsigned_claim(wallet: &Pubkey) -> Self {
        let bytes = bincode::serialize(&unsigned_claim_transaction(wallet)).unwrap();
        Self::returning(bytes)
    }

    pub fn failing(err: ServiceError) -> Self {
        Self {
            response: Mutex::new(Err(err)),
            calls: AtomicUsize::new(0),
            panic_on_first: false,
        }
    }

    /// Panic inside the first request, as an unexpected bug in a cycle would
    pub fn panic_on_first_call(mut self) -> Self {
        self.panic_on_first = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeeClaimApi for MockFeeApi {
    async fn request_claim_transaction(&self, _public_key: &Pubkey) -> Result<Vec<u8>, ServiceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.panic_on_first && call == 1 {
            panic!("fee api blew up on call {}", call);
        }
        self.response.lock().clone()
    }
}
