//! Program Derived Address (PDA) derivation.
//!
//! A PDA is `SHA-256(seed_0 || .. || seed_n || bump || program_id || "ProgramDerivedAddress")`
//! where the digest must NOT decompress to an Ed25519 point, so that no
//! private key can exist for it. The canonical bump is the highest value in
//! `255..=0` that yields an off-curve digest.

use curve25519_dalek::edwards::CompressedEdwardsY;
use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::error::SolError;

/// Domain separator appended to every PDA preimage.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Maximum number of seeds, including the bump.
pub const MAX_SEEDS: usize = 16;
/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Hash the seeds against `program_id` once, with no bump search.
///
/// Fails with `InvalidSeeds` when the seeds break the length limits, and with
/// `InvalidSeeds` as well when the digest lands on the curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<Address, SolError> {
    check_seeds(seeds, 0)?;
    candidate(seeds, program_id)
        .ok_or_else(|| SolError::InvalidSeeds("derived address lies on the ed25519 curve".into()))
}

/// Search bump seeds from 255 down to 0 and return the first off-curve
/// address together with its bump.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<(Address, u8), SolError> {
    search(seeds, program_id, is_on_curve)
}

fn search(
    seeds: &[&[u8]],
    program_id: &Address,
    on_curve: impl Fn(&[u8; 32]) -> bool,
) -> Result<(Address, u8), SolError> {
    check_seeds(seeds, 1)?;

    for bump in (0u8..=255).rev() {
        let digest = hash_seeds(seeds, Some(bump), program_id);
        if !on_curve(&digest) {
            return Ok((Address::new(digest), bump));
        }
    }

    Err(SolError::PdaExhausted)
}

fn check_seeds(seeds: &[&[u8]], reserved: usize) -> Result<(), SolError> {
    if seeds.len() + reserved > MAX_SEEDS {
        return Err(SolError::InvalidSeeds(format!(
            "at most {} seeds allowed, got {}",
            MAX_SEEDS - reserved,
            seeds.len()
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(SolError::InvalidSeeds(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }
    Ok(())
}

fn candidate(seeds: &[&[u8]], program_id: &Address) -> Option<Address> {
    let digest = hash_seeds(seeds, None, program_id);
    if is_on_curve(&digest) {
        return None;
    }
    Some(Address::new(digest))
}

fn hash_seeds(seeds: &[&[u8]], bump: Option<u8>, program_id: &Address) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    if let Some(bump) = bump {
        hasher.update([bump]);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

/// Check whether 32 bytes decompress to an Ed25519 curve point.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: Address = Address::new([0x8c; 32]);

    #[test]
    fn basepoint_is_on_curve() {
        let mut basepoint = [0x66u8; 32];
        basepoint[0] = 0x58;
        assert!(is_on_curve(&basepoint));
    }

    #[test]
    fn known_token_account_is_off_curve() {
        let ata: Address = "4pw5VSwn2Sec4SjMhbUSBcVjS51rG34Ho1WuHQgxqVd2".parse().unwrap();
        assert!(!is_on_curve(ata.as_bytes()));
    }

    #[test]
    fn found_address_is_off_curve() {
        let (addr, _) = find_program_address(&[b"vault"], &PROGRAM).unwrap();
        assert!(!is_on_curve(addr.as_bytes()));
    }

    #[test]
    fn find_matches_create_with_bump() {
        let (addr, bump) = find_program_address(&[b"vault", &[1, 2, 3]], &PROGRAM).unwrap();
        let created = create_program_address(&[b"vault", &[1, 2, 3], &[bump]], &PROGRAM).unwrap();
        assert_eq!(addr, created);
    }

    #[test]
    fn derivation_is_pure() {
        let a = find_program_address(&[b"seed"], &PROGRAM).unwrap();
        let b = find_program_address(&[b"seed"], &PROGRAM).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn program_id_changes_output() {
        let (a, _) = find_program_address(&[b"seed"], &PROGRAM).unwrap();
        let (b, _) = find_program_address(&[b"seed"], &Address::new([0x8d; 32])).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn bump_search_skips_on_curve_candidates() {
        // Pretend the first three candidates land on the curve.
        let rejected = std::cell::Cell::new(0u8);
        let (addr, bump) = search(&[b"seed"], &PROGRAM, |_| {
            let n = rejected.get();
            rejected.set(n + 1);
            n < 3
        })
        .unwrap();
        assert_eq!(bump, 252);
        assert_eq!(addr.to_bytes(), hash_seeds(&[b"seed"], Some(252), &PROGRAM));
    }

    #[test]
    fn exhausted_bumps_error() {
        let calls = std::cell::Cell::new(0u32);
        let err = search(&[b"seed"], &PROGRAM, |_| {
            calls.set(calls.get() + 1);
            true
        })
        .unwrap_err();
        assert!(matches!(err, SolError::PdaExhausted));
        assert_eq!(calls.get(), 256);
    }

    #[test]
    fn oversized_seed_is_rejected() {
        let long = [0u8; 33];
        let err = find_program_address(&[&long], &PROGRAM).unwrap_err();
        assert!(matches!(err, SolError::InvalidSeeds(_)));
    }

    #[test]
    fn too_many_seeds_is_rejected() {
        let seed: &[u8] = b"s";
        let seeds = vec![seed; MAX_SEEDS];
        assert!(find_program_address(&seeds, &PROGRAM).is_err());
        assert!(find_program_address(&seeds[..MAX_SEEDS - 1], &PROGRAM).is_ok());
    }
}
