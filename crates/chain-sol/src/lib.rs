//! Solana chain support for the custodial wallet.
//!
//! Addresses, keypairs, program-derived addresses, instruction encoding and
//! the legacy transaction wire format are implemented by hand on top of
//! `ed25519-dalek`, `curve25519-dalek` and `bs58`, without `solana-sdk`.
//! Network access goes through [`rpc::SolanaRpc`], a small JSON-RPC client
//! whose transport is a trait so tests can replay canned node responses.

pub mod address;
pub mod amount;
pub mod balance;
pub mod config;
pub mod error;
pub mod keypair;
pub mod pda;
pub mod rpc;
pub mod signature;
pub mod spl_token;
pub mod submit;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use address::{validate_address, Address};
pub use amount::{from_base_units, lamports_to_sol, sol_to_lamports, to_base_units, NATIVE_DECIMALS};
pub use balance::{native_balance, token_balance};
pub use config::{ChainConfig, Commitment, MAINNET_USDC_MINT};
pub use error::SolError;
pub use keypair::Keypair;
pub use pda::{create_program_address, find_program_address};
pub use rpc::{ConfirmedTxInfo, HttpTransport, RpcTransport, SignatureStatus, SolanaRpc};
pub use signature::Signature;
pub use spl_token::{
    build_transfer_checked, resolve_ata, TokenPrograms, ASSOCIATED_TOKEN_PROGRAM_ID,
    TOKEN_PROGRAM_ID,
};
pub use submit::{await_confirmation, get_transaction_details, submit};
pub use transaction::{
    build_native_transfer, compile_message, sign_transaction, AccountMeta, Blockhash,
    Instruction, Message, SignedTransaction, SYSTEM_PROGRAM_ID,
};
