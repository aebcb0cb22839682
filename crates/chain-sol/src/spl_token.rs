//! SPL Token operations for Solana.
//!
//! Implements the `TransferChecked` instruction and associated token account
//! (ATA) derivation without pulling in the `solana-sdk` or `spl-token`
//! crates. Program ids are passed in through [`TokenPrograms`]; the mainnet
//! values below are reference configuration, not part of the algorithm.

use crate::address::Address;
use crate::error::SolError;
use crate::pda;
use crate::transaction::{AccountMeta, Instruction};

// ---------------------------------------------------------------------------
// Reference program ids (mainnet)
// ---------------------------------------------------------------------------

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Address = Address::new([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
]);

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Address = Address::new([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
]);

/// SPL Token `TransferChecked` instruction index.
const TRANSFER_CHECKED_IX: u8 = 12;

/// Byte offset of the `amount` field in an SPL token account
/// (`mint: 32 | owner: 32 | amount: u64 | ...`).
pub const TOKEN_ACCOUNT_AMOUNT_OFFSET: usize = 64;

/// The pair of programs an ATA derivation depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPrograms {
    pub token_program_id: Address,
    pub associated_token_program_id: Address,
}

impl Default for TokenPrograms {
    fn default() -> Self {
        Self {
            token_program_id: TOKEN_PROGRAM_ID,
            associated_token_program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        }
    }
}

// ---------------------------------------------------------------------------
// Associated Token Account (PDA) derivation
// ---------------------------------------------------------------------------

/// Derive the associated token account address for an owner + mint pair.
///
/// Seeds are `[owner, token_program_id, mint]`, derived against the ATA
/// program. Pure: the same inputs always give the same address.
pub fn resolve_ata(
    owner: &Address,
    mint: &Address,
    programs: &TokenPrograms,
) -> Result<Address, SolError> {
    pda::find_program_address(
        &[
            owner.as_ref(),
            programs.token_program_id.as_ref(),
            mint.as_ref(),
        ],
        &programs.associated_token_program_id,
    )
    .map(|(address, _bump)| address)
}

// ---------------------------------------------------------------------------
// TransferChecked
// ---------------------------------------------------------------------------

/// Build an SPL Token `TransferChecked` instruction.
///
/// `amount` is in base units. `decimals` must equal the mint's decimals; the
/// token program refuses the transfer otherwise.
///
/// # Wire format
///
/// `[12] | u64 LE amount | u8 decimals`, 10 bytes. Accounts, in this order:
/// source (w), mint (r), destination (w), owner (signer).
pub fn build_transfer_checked(
    token_program_id: &Address,
    source: &Address,
    mint: &Address,
    destination: &Address,
    owner: &Address,
    amount: u64,
    decimals: u8,
) -> Result<Instruction, SolError> {
    if amount == 0 {
        return Err(SolError::NonPositiveAmount);
    }

    let mut data = Vec::with_capacity(10);
    data.push(TRANSFER_CHECKED_IX);
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(decimals);

    Ok(Instruction {
        program_id: *token_program_id,
        accounts: vec![
            AccountMeta::writable(*source),
            AccountMeta::readonly(*mint),
            AccountMeta::writable(*destination),
            AccountMeta::readonly_signer(*owner),
        ],
        data,
    })
}

/// Decode the `amount` field of a raw SPL token account.
///
/// This reads a fixed offset of the classic token account layout and is
/// only valid for that layout version. Returns `None` when the blob is too
/// short or belongs to a different mint.
pub fn decode_token_account_amount(data: &[u8], expected_mint: &Address) -> Option<u64> {
    let end = TOKEN_ACCOUNT_AMOUNT_OFFSET + 8;
    if data.len() < end {
        return None;
    }
    if &data[..32] != expected_mint.as_bytes() {
        return None;
    }
    let amount: [u8; 8] = data[TOKEN_ACCOUNT_AMOUNT_OFFSET..end].try_into().ok()?;
    Some(u64::from_le_bytes(amount))
}
