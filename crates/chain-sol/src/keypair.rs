//! Ed25519 signing keypair.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey};
use zeroize::Zeroize;

use crate::address::Address;
use crate::error::SolError;
use crate::signature::Signature;

/// A 32-byte Ed25519 private seed and its public key.
///
/// The signing key is zeroized on drop by `ed25519-dalek`. `Debug` only
/// prints the public address.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Build a keypair from a 32-byte private seed.
    ///
    /// The caller's copy of the seed is left untouched; zeroize it when done.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Build a keypair from the leading 32 bytes of a longer seed.
    pub fn from_seed_prefix(seed: &[u8]) -> Result<Self, SolError> {
        if seed.len() < 32 {
            return Err(SolError::InvalidKeypair(format!(
                "seed must be at least 32 bytes, got {}",
                seed.len()
            )));
        }
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&seed[..32]);
        let keypair = Self::from_seed(&secret);
        secret.zeroize();
        Ok(keypair)
    }

    /// Parse the 64-byte `secret || public` layout used by Solana CLI key
    /// files, checking that the public half matches the secret half.
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: &[u8; 64] = bytes.try_into().map_err(|_| {
            SolError::InvalidKeypair(format!("expected 64 bytes, got {}", bytes.len()))
        })?;
        let signing_key = SigningKey::from_keypair_bytes(arr)
            .map_err(|e| SolError::InvalidKeypair(e.to_string()))?;
        Ok(Self { signing_key })
    }

    pub fn pubkey(&self) -> Address {
        Address::new(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign an arbitrary message.
    pub fn sign_message(&self, message: &[u8]) -> Signature {
        Signature::new(self.signing_key.sign(message).to_bytes())
    }

    /// Verify a signature produced by this keypair.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        self.signing_key
            .verifying_key()
            .verify_strict(message, &sig)
            .is_ok()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}
