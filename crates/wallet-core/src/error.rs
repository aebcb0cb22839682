use chain_sol::SolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),

    #[error(transparent)]
    Chain(#[from] SolError),

    /// The transfer was submitted but its ledger row could not be written.
    #[error("Ledger write failed for {signature}: {source}")]
    Ledger {
        signature: String,
        #[source]
        source: crate::ledger::LedgerError,
    },
}

impl WalletError {
    /// True when the error was raised before anything reached the network.
    pub fn is_validation(&self) -> bool {
        match self {
            WalletError::InvalidMnemonic(_) | WalletError::UnsupportedAsset(_) => true,
            WalletError::Chain(e) => e.is_validation(),
            WalletError::Ledger { .. } => false,
        }
    }
}
