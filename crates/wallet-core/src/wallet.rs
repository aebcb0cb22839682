//! The two wallet operations: reading balances and sending funds.

use chain_sol::address;
use chain_sol::amount::{from_base_units, to_base_units, NATIVE_DECIMALS};
use chain_sol::{
    build_native_transfer, build_transfer_checked, get_transaction_details, native_balance,
    resolve_ata, submit, token_balance, Address, ChainConfig, Instruction, Keypair, SolanaRpc,
};
use chrono::Utc;
use rust_decimal::Decimal;

use crate::error::WalletError;
use crate::ledger::{LedgerEntry, LedgerSink};
use crate::mnemonic::derive_keypair;
use crate::types::{AssetKind, Balances, Direction, TxStatus};

/// Wallet operations bound to one network configuration.
#[derive(Clone)]
pub struct WalletService {
    config: ChainConfig,
    rpc: SolanaRpc,
}

impl WalletService {
    pub fn new(config: ChainConfig, rpc: SolanaRpc) -> Self {
        Self { config, rpc }
    }

    /// Service talking HTTP to `config.rpc_url`.
    pub fn from_config(config: ChainConfig) -> Result<Self, WalletError> {
        config.validate()?;
        let rpc = SolanaRpc::from_config(&config)?;
        Ok(Self::new(config, rpc))
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Native and token balances of `address`, fetched concurrently.
    pub async fn balances(&self, address: &Address) -> Result<Balances, WalletError> {
        let (native, token) = tokio::try_join!(
            native_balance(&self.rpc, address),
            token_balance(&self.rpc, &self.config, address, &self.config.token_mint),
        )?;
        Ok(Balances {
            address: *address,
            native,
            token,
        })
    }

    /// Transfer `amount` of `asset` from the wallet behind `seed_phrase` to
    /// `recipient`, then record the transfer in `ledger`.
    ///
    /// Amount, recipient and seed phrase are all validated before any
    /// network call. Once the node has accepted the transaction the send row
    /// is written; if that write fails the error still carries the
    /// signature. A receive row is added when the recipient is a local
    /// wallet, and failing to write it never fails the send.
    pub async fn send(
        &self,
        seed_phrase: &str,
        recipient: &str,
        amount: Decimal,
        asset: AssetKind,
        ledger: &dyn LedgerSink,
    ) -> Result<LedgerEntry, WalletError> {
        let decimals = match asset {
            AssetKind::Native => NATIVE_DECIMALS,
            AssetKind::Token => self.config.token_decimals,
        };
        let base_units = to_base_units(amount, decimals)?;
        let to = address::parse(recipient)?;
        let keypair = derive_keypair(seed_phrase)?;
        let from = keypair.pubkey();

        let instruction = self.transfer_instruction(&keypair, &to, asset, base_units)?;

        tracing::info!(%from, %to, %asset, base_units, "sending transfer");
        let signature = submit(&self.rpc, &[instruction], &keypair).await?;

        let details = get_transaction_details(&self.rpc, &signature).await;
        let mut entry = LedgerEntry {
            signature,
            asset,
            direction: Direction::Send,
            amount: from_base_units(base_units, decimals),
            base_units,
            from,
            to,
            status: TxStatus::Pending,
            timestamp: Utc::now(),
            block_time: None,
        };
        entry.settle(details.as_ref());
        tracing::info!(%signature, status = entry.status.as_str(), "transfer submitted");

        ledger
            .record(entry.clone())
            .await
            .map_err(|source| WalletError::Ledger {
                signature: signature.to_string(),
                source,
            })?;

        if ledger.is_local_wallet(&to).await {
            if let Err(e) = ledger.record(entry.mirrored()).await {
                tracing::warn!(%signature, %to, error = %e, "could not record receive entry");
            }
        }

        Ok(entry)
    }

    fn transfer_instruction(
        &self,
        keypair: &Keypair,
        to: &Address,
        asset: AssetKind,
        base_units: u64,
    ) -> Result<Instruction, WalletError> {
        let from = keypair.pubkey();
        let instruction = match asset {
            AssetKind::Native => build_native_transfer(&from, to, base_units)?,
            AssetKind::Token => {
                let programs = self.config.token_programs();
                let mint = &self.config.token_mint;
                let source = resolve_ata(&from, mint, &programs)?;
                let destination = resolve_ata(to, mint, &programs)?;
                build_transfer_checked(
                    &programs.token_program_id,
                    &source,
                    mint,
                    &destination,
                    &from,
                    base_units,
                    self.config.token_decimals,
                )?
            }
        };
        Ok(instruction)
    }
}
