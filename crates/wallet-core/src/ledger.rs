//! Ledger rows produced by the send flow.
//!
//! The wallet engine builds [`LedgerEntry`] values; storing them is the
//! caller's job, done through a [`LedgerSink`].

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chain_sol::{Address, ConfirmedTxInfo, Signature};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AssetKind, Direction, TxStatus};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct LedgerError(pub String);

/// One transfer as seen by one wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub signature: Signature,
    pub asset: AssetKind,
    pub direction: Direction,
    /// Display amount actually transferred, after truncation to base units.
    pub amount: Decimal,
    pub base_units: u64,
    pub from: Address,
    pub to: Address,
    pub status: TxStatus,
    /// When the entry was created locally.
    pub timestamp: DateTime<Utc>,
    /// Cluster-assigned block time, once known.
    pub block_time: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// Status and block time implied by a details lookup. No details means
    /// the transfer is still pending.
    pub fn settle(&mut self, details: Option<&ConfirmedTxInfo>) {
        match details {
            Some(info) => {
                self.status = if info.succeeded() {
                    TxStatus::Confirmed
                } else {
                    TxStatus::Failed
                };
                self.block_time = info
                    .block_time
                    .and_then(|secs| DateTime::from_timestamp(secs, 0));
            }
            None => {
                self.status = TxStatus::Pending;
                self.block_time = None;
            }
        }
    }

    /// The same transfer from the recipient's side.
    pub fn mirrored(&self) -> Self {
        Self {
            direction: match self.direction {
                Direction::Send => Direction::Receive,
                Direction::Receive => Direction::Send,
            },
            ..self.clone()
        }
    }
}

/// Caller-owned ledger storage.
#[async_trait]
pub trait LedgerSink: Send + Sync {
    async fn record(&self, entry: LedgerEntry) -> Result<(), LedgerError>;

    /// Whether `address` belongs to a wallet this system manages, in which
    /// case the receiving side also gets a row.
    async fn is_local_wallet(&self, address: &Address) -> bool;
}

/// Ledger kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: Mutex<Vec<LedgerEntry>>,
    local_wallets: Mutex<HashSet<Address>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_local_wallet(&self, address: Address) {
        if let Ok(mut wallets) = self.local_wallets.lock() {
            wallets.insert(address);
        }
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Entries involving `address`, newest first.
    pub fn history(&self, address: &Address) -> Vec<LedgerEntry> {
        let mut rows: Vec<LedgerEntry> = self
            .entries()
            .into_iter()
            .filter(|e| match e.direction {
                Direction::Send => &e.from == address,
                Direction::Receive => &e.to == address,
            })
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows
    }
}

#[async_trait]
impl LedgerSink for InMemoryLedger {
    async fn record(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| LedgerError("ledger lock poisoned".into()))?;
        if entries
            .iter()
            .any(|e| e.signature == entry.signature && e.direction == entry.direction)
        {
            return Err(LedgerError(format!(
                "duplicate {:?} entry for {}",
                entry.direction, entry.signature
            )));
        }
        entries.push(entry);
        Ok(())
    }

    async fn is_local_wallet(&self, address: &Address) -> bool {
        self.local_wallets
            .lock()
            .map(|wallets| wallets.contains(address))
            .unwrap_or(false)
    }
}
