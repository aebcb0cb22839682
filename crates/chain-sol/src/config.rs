//! Chain configuration.
//!
//! Everything that identifies a particular network and token lives here and
//! is handed to the RPC client, resolver and submitter explicitly. Mainnet
//! values are available as a preset, never as hidden defaults in the
//! algorithms.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::address::{self, Address};
use crate::error::SolError;
use crate::spl_token::{TokenPrograms, ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID};

/// Mainnet USDC mint.
pub const MAINNET_USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

const DEFAULT_TOKEN_DECIMALS: u8 = 6;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Node commitment level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }

    pub fn parse(value: &str) -> Result<Self, SolError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(SolError::Config(format!("unknown commitment level: {other}"))),
        }
    }
}

/// Connection and token settings for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub token_mint: Address,
    #[serde(default = "default_token_program")]
    pub token_program_id: Address,
    #[serde(default = "default_ata_program")]
    pub associated_token_program_id: Address,
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u8,
    #[serde(default)]
    pub commitment: Commitment,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_token_program() -> Address {
    TOKEN_PROGRAM_ID
}

fn default_ata_program() -> Address {
    ASSOCIATED_TOKEN_PROGRAM_ID
}

fn default_token_decimals() -> u8 {
    DEFAULT_TOKEN_DECIMALS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ChainConfig {
    /// Mainnet USDC against the given node.
    pub fn mainnet_usdc(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            token_mint: Address::new(USDC_MINT_BYTES),
            token_program_id: TOKEN_PROGRAM_ID,
            associated_token_program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
            token_decimals: DEFAULT_TOKEN_DECIMALS,
            commitment: Commitment::Confirmed,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load from environment variables, reading a `.env` file first when one
    /// exists.
    ///
    /// `SOLANA_RPC_URL` and `USDC_MINT_ADDRESS` are required. Optional:
    /// `TOKEN_PROGRAM_ID`, `ASSOCIATED_TOKEN_PROGRAM_ID`, `TOKEN_DECIMALS`,
    /// `SOLANA_COMMITMENT`, `SOLANA_RPC_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, SolError> {
        load_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Used by [`ChainConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SolError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SolError::Config(format!("{key} is not set")))
        };
        let address_var = |key: &str, default: Address| -> Result<Address, SolError> {
            match lookup(key) {
                Some(v) => address::parse(v.trim())
                    .map_err(|e| SolError::Config(format!("{key}: {e}"))),
                None => Ok(default),
            }
        };

        let token_mint = address::parse(required("USDC_MINT_ADDRESS")?.trim())
            .map_err(|e| SolError::Config(format!("USDC_MINT_ADDRESS: {e}")))?;

        let token_decimals = match lookup("TOKEN_DECIMALS") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|e| SolError::Config(format!("TOKEN_DECIMALS: {e}")))?,
            None => DEFAULT_TOKEN_DECIMALS,
        };

        let request_timeout_secs = match lookup("SOLANA_RPC_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|e| SolError::Config(format!("SOLANA_RPC_TIMEOUT_SECS: {e}")))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let commitment = match lookup("SOLANA_COMMITMENT") {
            Some(v) => Commitment::parse(&v)?,
            None => Commitment::default(),
        };

        let config = Self {
            rpc_url: required("SOLANA_RPC_URL")?,
            token_mint,
            token_program_id: address_var("TOKEN_PROGRAM_ID", TOKEN_PROGRAM_ID)?,
            associated_token_program_id: address_var(
                "ASSOCIATED_TOKEN_PROGRAM_ID",
                ASSOCIATED_TOKEN_PROGRAM_ID,
            )?,
            token_decimals,
            commitment,
            request_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, SolError> {
        let config: Self =
            toml::from_str(text).map_err(|e| SolError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SolError> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(SolError::Config(format!(
                "rpc_url must be an http(s) URL, got {:?}",
                self.rpc_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(SolError::Config("request timeout must be > 0".into()));
        }
        if self.token_decimals > 19 {
            return Err(SolError::Config(format!(
                "token decimals {} exceed what a u64 amount can carry",
                self.token_decimals
            )));
        }
        Ok(())
    }

    pub fn token_programs(&self) -> TokenPrograms {
        TokenPrograms {
            token_program_id: self.token_program_id,
            associated_token_program_id: self.associated_token_program_id,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// A missing `.env` file is fine; an unreadable or malformed one is not.
fn load_dotenv<T>(result: Result<T, dotenvy::Error>) -> Result<(), SolError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(SolError::Config(format!(".env: {e}"))),
    }
}

/// Decoded bytes of [`MAINNET_USDC_MINT`].
const USDC_MINT_BYTES: [u8; 32] = [
    0xc6, 0xfa, 0x7a, 0xf3, 0xbe, 0xdb, 0xad, 0x3a, 0x3d, 0x65, 0xf3, 0x6a, 0xab, 0xc9, 0x74,
    0x31, 0xb1, 0xbb, 0xe4, 0xc2, 0xd2, 0xf6, 0xe0, 0xe4, 0x7c, 0xa6, 0x02, 0x03, 0x45, 0x2f,
    0x5d, 0x61,
];
