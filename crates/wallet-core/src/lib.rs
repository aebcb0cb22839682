//! Custodial Solana wallet engine.
//!
//! Turns a seed phrase into a signing key, reads SOL and token balances and
//! sends either asset, handing the resulting ledger rows to a caller-owned
//! [`ledger::LedgerSink`]. Chain-level work lives in `chain-sol`.

pub mod error;
pub mod ledger;
pub mod logging;
pub mod mnemonic;
pub mod types;
pub mod wallet;

pub use chain_sol::{Address, ChainConfig, Commitment, Keypair, Signature, SolError};
pub use error::WalletError;
pub use ledger::{InMemoryLedger, LedgerEntry, LedgerError, LedgerSink};
pub use logging::init_logging;
pub use mnemonic::{derive_keypair, generate_new_wallet, is_valid_word, validate_mnemonic, SeedPhrase};
pub use types::{AssetKind, Balances, Direction, TxStatus};
pub use wallet::WalletService;
