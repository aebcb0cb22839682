//! Native and token balance lookups.
//!
//! Token balances go through an ordered list of decoders. The node's
//! structured `getTokenAccountBalance` answer is preferred; the raw account
//! blob is only fetched when no structured decoder produced a value.

use rust_decimal::Decimal;

use crate::address::Address;
use crate::amount::{from_base_units, lamports_to_sol};
use crate::config::ChainConfig;
use crate::error::SolError;
use crate::rpc::{SolanaRpc, UiTokenAmount};
use crate::spl_token::{decode_token_account_amount, resolve_ata};

/// Native balance in SOL.
pub async fn native_balance(rpc: &SolanaRpc, address: &Address) -> Result<Decimal, SolError> {
    let lamports = rpc.get_balance(address).await?;
    tracing::debug!(%address, lamports, "native balance");
    Ok(lamports_to_sol(lamports))
}

/// What the node told us about a token account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAccountPayload {
    Structured(UiTokenAmount),
    Raw(Vec<u8>),
}

/// Inputs a decoder may need besides the payload.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub mint: &'a Address,
    /// Decimals used when the payload does not carry its own.
    pub decimals: u8,
}

pub type TokenAmountDecoder = fn(&TokenAccountPayload, &DecodeContext<'_>) -> Option<Decimal>;

/// Decoders in priority order. The first one returning `Some` wins.
pub const TOKEN_AMOUNT_DECODERS: &[(&str, TokenAmountDecoder)] = &[
    ("structured_amount", decode_structured_amount),
    ("ui_amount_string", decode_ui_amount_string),
    ("raw_account_data", decode_raw_account_data),
];

fn decode_structured_amount(payload: &TokenAccountPayload, _: &DecodeContext<'_>) -> Option<Decimal> {
    let TokenAccountPayload::Structured(ui) = payload else {
        return None;
    };
    let base_units: u64 = ui.amount.as_deref()?.parse().ok()?;
    Some(from_base_units(base_units, ui.decimals?))
}

fn decode_ui_amount_string(payload: &TokenAccountPayload, _: &DecodeContext<'_>) -> Option<Decimal> {
    let TokenAccountPayload::Structured(ui) = payload else {
        return None;
    };
    ui.ui_amount_string
        .as_deref()
        .and_then(|s| s.parse::<Decimal>().ok())
        .map(|d| d.normalize())
}

/// Reads the amount at a fixed offset of the classic token account layout.
/// A layout change on the token program breaks this decoder; the mint check
/// keeps it from misreading foreign data.
fn decode_raw_account_data(payload: &TokenAccountPayload, ctx: &DecodeContext<'_>) -> Option<Decimal> {
    let TokenAccountPayload::Raw(data) = payload else {
        return None;
    };
    decode_token_account_amount(data, ctx.mint).map(|units| from_base_units(units, ctx.decimals))
}

/// Run every decoder over `payload` in order.
pub fn decode_token_amount(payload: &TokenAccountPayload, ctx: &DecodeContext<'_>) -> Option<Decimal> {
    TOKEN_AMOUNT_DECODERS.iter().find_map(|(name, decode)| {
        let value = decode(payload, ctx);
        if value.is_some() {
            tracing::trace!(decoder = name, "token amount decoded");
        }
        value
    })
}

/// Token balance of `owner` for `mint`, in display units.
///
/// A missing token account reads as zero, and so does an error object from
/// the node on either token lookup. A structured answer that cannot be
/// decoded falls through to the raw account data. Transport failures
/// propagate as `RemoteUnavailable`. The raw fallback uses
/// `config.token_decimals`.
pub async fn token_balance(
    rpc: &SolanaRpc,
    config: &ChainConfig,
    owner: &Address,
    mint: &Address,
) -> Result<Decimal, SolError> {
    let ata = match resolve_ata(owner, mint, &config.token_programs()) {
        Ok(ata) => ata,
        Err(SolError::PdaExhausted) => {
            tracing::warn!(%owner, %mint, "no token account address exists for owner");
            return Ok(Decimal::ZERO);
        }
        Err(e) => return Err(e),
    };
    let ctx = DecodeContext {
        mint,
        decimals: config.token_decimals,
    };

    match rpc.get_token_account_balance(&ata).await {
        Ok(Some(ui)) => {
            if let Some(amount) = decode_token_amount(&TokenAccountPayload::Structured(ui), &ctx) {
                tracing::debug!(%owner, token_account = %ata, %amount, "token balance");
                return Ok(amount);
            }
            tracing::debug!(token_account = %ata, "structured balance undecodable, reading raw account");
        }
        Ok(None) => {}
        Err(SolError::Rpc { code, message }) => {
            tracing::debug!(token_account = %ata, code, %message, "structured balance lookup refused");
        }
        Err(SolError::MalformedResponse(reason)) => {
            tracing::debug!(token_account = %ata, %reason, "structured balance unreadable, reading raw account");
        }
        Err(e) => return Err(e),
    }

    let data = match rpc.get_account_info(&ata).await {
        Ok(Some(info)) => info.data,
        Ok(None) => {
            tracing::debug!(%owner, token_account = %ata, "no token account");
            return Ok(Decimal::ZERO);
        }
        Err(SolError::Rpc { code, message }) => {
            tracing::debug!(token_account = %ata, code, %message, "raw account lookup refused");
            return Ok(Decimal::ZERO);
        }
        Err(e) => return Err(e),
    };

    let amount = decode_token_amount(&TokenAccountPayload::Raw(data), &ctx).unwrap_or_else(|| {
        tracing::warn!(token_account = %ata, "token account data not in the expected layout");
        Decimal::ZERO
    });
    tracing::debug!(%owner, token_account = %ata, %amount, "token balance");
    Ok(amount)
}
