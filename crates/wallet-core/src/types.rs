use std::fmt;
use std::str::FromStr;

use chain_sol::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// The two assets a wallet can hold and send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// The chain's native coin (SOL).
    #[serde(rename = "SOL")]
    Native,
    /// The configured fungible token (USDC).
    #[serde(rename = "USDC")]
    Token,
}

impl AssetKind {
    /// Ticker symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            AssetKind::Native => "SOL",
            AssetKind::Token => "USDC",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for AssetKind {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SOL" => Ok(AssetKind::Native),
            "USDC" => Ok(AssetKind::Token),
            _ => Err(WalletError::UnsupportedAsset(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Send,
    Receive,
}

/// Ledger status of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Submitted; the node has not reported it as processed yet.
    Pending,
    Confirmed,
    /// Landed on chain with an execution error.
    Failed,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Confirmed => "confirmed",
            TxStatus::Failed => "failed",
        }
    }
}

/// Balances of one wallet address, in display units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub address: Address,
    pub native: Decimal,
    pub token: Decimal,
}
