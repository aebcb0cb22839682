use bip39::{Language, Mnemonic};
use chain_sol::Keypair;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::error::WalletError;

/// Entropy for a new wallet: 128 bits, which encodes as 12 words.
const NEW_WALLET_ENTROPY_BYTES: usize = 16;

/// Generate a fresh 12-word seed phrase and the keypair it derives.
pub fn generate_new_wallet() -> Result<(SeedPhrase, Keypair), WalletError> {
    let mut entropy = [0u8; NEW_WALLET_ENTROPY_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()));
    entropy.zeroize();

    let phrase = SeedPhrase::new(mnemonic?.to_string())?;
    let keypair = derive_keypair(phrase.as_str())?;
    Ok((phrase, keypair))
}

/// Validate a mnemonic phrase
pub fn validate_mnemonic(phrase: &str) -> bool {
    parse(phrase).is_ok()
}

/// Derive the wallet keypair from a seed phrase.
///
/// The 64-byte BIP-39 seed (empty passphrase) is computed and its first 32
/// bytes become the Ed25519 private seed. There is no hierarchical
/// derivation path: one phrase maps to exactly one address.
pub fn derive_keypair(phrase: &str) -> Result<Keypair, WalletError> {
    let mnemonic = parse(phrase)?;
    let seed = Zeroizing::new(mnemonic.to_seed(""));
    Ok(Keypair::from_seed_prefix(&seed[..])?)
}

/// Get the word list for autocomplete
pub fn word_list() -> &'static [&'static str] {
    Language::English.word_list()
}

/// Validate a single word against the BIP-39 word list
pub fn is_valid_word(word: &str) -> bool {
    Language::English.find_word(word).is_some()
}

fn parse(phrase: &str) -> Result<Mnemonic, WalletError> {
    let normalized = normalize(phrase);
    Mnemonic::parse_in_normalized(Language::English, normalized.as_str())
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
}

/// Lowercase the words and join them with single spaces, writing straight
/// into one zeroizing buffer.
fn normalize(phrase: &str) -> Zeroizing<String> {
    let mut out = Zeroizing::new(String::with_capacity(phrase.len()));
    for (i, word) in phrase.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

/// Validated seed phrase, wiped from memory on drop.
pub struct SeedPhrase {
    phrase: String,
}

impl SeedPhrase {
    pub fn new(phrase: String) -> Result<Self, WalletError> {
        let mut phrase = phrase;
        if !validate_mnemonic(&phrase) {
            phrase.zeroize();
            return Err(WalletError::InvalidMnemonic("Invalid mnemonic phrase".into()));
        }
        let normalized = normalize(&phrase);
        phrase.zeroize();
        Ok(Self {
            phrase: normalized.as_str().to_owned(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    pub fn words(&self) -> Vec<&str> {
        self.phrase.split_whitespace().collect()
    }

    pub fn keypair(&self) -> Result<Keypair, WalletError> {
        derive_keypair(&self.phrase)
    }
}

impl std::fmt::Debug for SeedPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SeedPhrase({} words)", self.words().len())
    }
}

impl Drop for SeedPhrase {
    fn drop(&mut self) {
        self.phrase.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_new_wallet_12_words() {
        let (phrase, keypair) = generate_new_wallet().unwrap();
        assert_eq!(phrase.words().len(), 12);
        assert!(validate_mnemonic(phrase.as_str()));
        assert_eq!(derive_keypair(phrase.as_str()).unwrap().pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_generated_wallets_differ() {
        let (a, _) = generate_new_wallet().unwrap();
        let (b, _) = generate_new_wallet().unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_validate_invalid_mnemonic() {
        assert!(!validate_mnemonic("invalid mnemonic phrase here"));
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert!(matches!(
            derive_keypair(phrase),
            Err(WalletError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_known_vector_address() {
        let keypair = derive_keypair(PHRASE).unwrap();
        assert_eq!(
            hex::encode(keypair.pubkey().to_bytes()),
            "c5785e1865b708938aff8161d573006496663b1aa10834e396dc566869a2c66a"
        );
        assert_eq!(
            keypair.pubkey().to_string(),
            "EHqmfkN89RJ7Y33CXM6uCzhVeuywHoJXZZLszBHHZy7o"
        );
    }

    #[test]
    fn test_derivation_deterministic() {
        let a = derive_keypair(PHRASE).unwrap();
        let b = derive_keypair(PHRASE).unwrap();
        assert_eq!(a.pubkey(), b.pubkey());
        assert_eq!(a.sign_message(b"m"), b.sign_message(b"m"));
    }

    #[test]
    fn test_extra_whitespace_and_case_normalized() {
        let messy = format!("  {}  ", PHRASE.to_uppercase().replace(' ', "\t "));
        assert_eq!(
            derive_keypair(&messy).unwrap().pubkey(),
            derive_keypair(PHRASE).unwrap().pubkey()
        );
    }

    #[test]
    fn test_normalize_lowercases_and_single_spaces() {
        let normalized = normalize("  Abandon\tABOUT \n zoo ");
        assert_eq!(normalized.as_str(), "abandon about zoo");
        assert!(normalize(" \t ").is_empty());
    }

    #[test]
    fn test_is_valid_word() {
        assert!(is_valid_word("abandon"));
        assert!(is_valid_word("zoo"));
        assert!(!is_valid_word("notaword"));
        assert!(!is_valid_word(""));
        assert_eq!(word_list().len(), 2048);
    }

    #[test]
    fn test_seed_phrase_debug_hides_words() {
        let phrase = SeedPhrase::new(PHRASE.to_string()).unwrap();
        let debug = format!("{phrase:?}");
        assert_eq!(debug, "SeedPhrase(12 words)");
        assert!(!debug.contains("abandon"));
    }
}
