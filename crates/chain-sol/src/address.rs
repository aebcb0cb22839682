//! Solana address codec.
//!
//! Solana addresses are Base58-encoded 32-byte Ed25519 public keys. There is
//! no hashing step and no checksum: the public key bytes ARE the address
//! bytes. The alphabet is the Bitcoin Base58 alphabet used by the `bs58`
//! crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SolError;

/// Shortest Base58 text that can encode 32 bytes (all leading zeros).
pub const MIN_ENCODED_LEN: usize = 32;
/// Longest Base58 text that can encode 32 bytes.
pub const MAX_ENCODED_LEN: usize = 44;

/// A 32-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 32]);

impl Address {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", format(self))
    }
}

impl FromStr for Address {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(self))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Cheap length pre-check on the encoded form.
///
/// Only rejects text that cannot possibly be an address. Passing this check
/// says nothing about validity; [`parse`] is authoritative.
pub fn plausible_length(text: &str) -> bool {
    (MIN_ENCODED_LEN..=MAX_ENCODED_LEN).contains(&text.len())
}

/// Parse a Base58 address. Fails unless the text decodes to exactly 32 bytes.
pub fn parse(text: &str) -> Result<Address, SolError> {
    if !plausible_length(text) {
        return Err(SolError::InvalidAddress(format!(
            "expected {MIN_ENCODED_LEN}..={MAX_ENCODED_LEN} characters, got {}",
            text.len()
        )));
    }

    let bytes = bs58::decode(text)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })?;

    Ok(Address(arr))
}

/// Encode an address as Base58 text.
pub fn format(address: &Address) -> String {
    bs58::encode(address.0).into_string()
}

/// Validate an address string without keeping the decoded value.
pub fn validate_address(text: &str) -> Result<(), SolError> {
    parse(text).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The System Program address is 32 zero bytes, which encodes to
    /// "11111111111111111111111111111111" in Base58.
    #[test]
    fn system_program_address() {
        let addr = Address::new([0u8; 32]);
        assert_eq!(addr.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn roundtrip_known_address() {
        let text = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        let addr = parse(text).unwrap();
        assert_eq!(format(&addr), text);
    }

    #[test]
    fn roundtrip_from_bytes() {
        let pubkey: [u8; 32] = [
            0x0e, 0xf2, 0x35, 0x68, 0x3f, 0xbc, 0xb4, 0x92, 0xf1, 0x12, 0x66, 0x7c, 0xc6,
            0x22, 0xaf, 0x04, 0x0d, 0x13, 0x96, 0xab, 0x2b, 0x12, 0x3f, 0x8f, 0xc1, 0xa1,
            0xe1, 0x22, 0x64, 0xfe, 0xd6, 0xb7,
        ];
        let addr = Address::new(pubkey);
        let recovered = parse(&format(&addr)).unwrap();
        assert_eq!(recovered, addr);
        assert_eq!(recovered.to_bytes(), pubkey);
    }

    #[test]
    fn roundtrip_extremes() {
        for bytes in [[0u8; 32], [0xffu8; 32], [0x01u8; 32]] {
            let addr = Address::new(bytes);
            assert_eq!(parse(&format(&addr)).unwrap(), addr);
        }
    }

    #[test]
    fn from_str_matches_parse() {
        let addr: Address = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr".parse().unwrap();
        assert_eq!(addr.as_bytes().len(), 32);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = parse("not-a-valid-address-but-long-enough-0OIl").unwrap_err();
        assert!(matches!(err, SolError::InvalidAddress(_)));
    }

    #[test]
    fn short_text_is_rejected_before_decoding() {
        assert!(!plausible_length("1"));
        assert!(matches!(parse("1"), Err(SolError::InvalidAddress(_))));
    }

    #[test]
    fn plausible_length_but_wrong_byte_count_is_rejected() {
        // 33 leading-zero characters decode to 33 zero bytes.
        let text = "1".repeat(33);
        assert!(plausible_length(&text));
        let err = parse(&text).unwrap_err();
        assert!(err.to_string().contains("expected 32 bytes, got 33"));
    }

    #[test]
    fn plausible_length_but_short_decode_is_rejected() {
        let text = bs58::encode([0xffu8; 31]).into_string();
        assert!(plausible_length(&text));
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, SolError::InvalidAddress(_)));
        assert!(err.to_string().contains("expected 32 bytes, got 31"));
    }

    #[test]
    fn serde_uses_base58_text() {
        let addr = Address::new([0u8; 32]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"11111111111111111111111111111111\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn serde_rejects_invalid_text() {
        let result: Result<Address, _> = serde_json::from_str("\"abc\"");
        assert!(result.is_err());
    }

    #[test]
    fn debug_shows_base58() {
        let addr = Address::new([0u8; 32]);
        assert_eq!(
            format!("{addr:?}"),
            "Address(11111111111111111111111111111111)"
        );
    }
}
