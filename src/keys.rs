//! Key-pair generation and public-key byte handling
//!
//! Only the public half leaves this module for script building; the secret
//! half stays behind the signing hook used by the `Signer` collaborator.

use rand::rngs::OsRng;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};

use crate::constants::{COMPRESSED_PUBKEY_LEN, XONLY_PUBKEY_LEN};
use crate::error::{LockscriptError, Result};

/// A secp256k1 key pair held for one construction scenario
pub struct KeyMaterial {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl KeyMaterial {
    /// Generate a fresh key pair from the operating system's entropy source
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        KeyMaterial {
            secret_key,
            public_key,
        }
    }

    /// Rebuild a key pair from 32 secret bytes, for deterministic fixtures
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|e| {
            LockscriptError::InvalidKeyLength(format!("secret key rejected: {}", e))
        })?;
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Ok(KeyMaterial {
            secret_key,
            public_key,
        })
    }

    /// Compressed 33-byte public key for script builders
    pub fn public_key_bytes(&self) -> [u8; 33] {
        self.public_key.serialize()
    }

    /// X-only 32-byte public key for Taproot output-key usage
    pub fn x_only_public_key(&self) -> [u8; 32] {
        let (xonly, _parity) = self.public_key.x_only_public_key();
        xonly.serialize()
    }

    /// Sign a 32-byte digest with ECDSA, DER-serialized.
    ///
    /// Local implementation of the external signer interface, used by the
    /// in-process `Signer` in tests.
    pub fn sign_ecdsa(&self, digest: &[u8; 32]) -> Result<Vec<u8>> {
        let secp = Secp256k1::new();
        let message = Message::from_digest_slice(digest).map_err(|e| {
            LockscriptError::InvalidEncoding(format!("digest rejected: {}", e))
        })?;
        let signature: Signature = secp.sign_ecdsa(&message, &self.secret_key);
        Ok(signature.serialize_der().to_vec())
    }
}

/// Strip the parity prefix from a 33-byte compressed key, yielding the
/// x-only form Taproot scripts carry.
pub fn x_only(pubkey: &[u8]) -> Result<[u8; 32]> {
    if pubkey.len() != COMPRESSED_PUBKEY_LEN {
        return Err(LockscriptError::InvalidKeyLength(format!(
            "x-only conversion needs a {}-byte compressed key, got {}",
            COMPRESSED_PUBKEY_LEN,
            pubkey.len()
        )));
    }
    let mut out = [0u8; XONLY_PUBKEY_LEN];
    out.copy_from_slice(&pubkey[1..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_yields_compressed_key() {
        let material = KeyMaterial::generate();
        let pubkey = material.public_key_bytes();
        assert!(pubkey[0] == 0x02 || pubkey[0] == 0x03);
    }

    #[test]
    fn test_from_secret_bytes_is_deterministic() {
        let seed = [0x42u8; 32];
        let a = KeyMaterial::from_secret_bytes(&seed).unwrap();
        let b = KeyMaterial::from_secret_bytes(&seed).unwrap();
        assert_eq!(a.public_key_bytes(), b.public_key_bytes());
    }

    #[test]
    fn test_x_only_strips_parity_byte() {
        let material = KeyMaterial::generate();
        let pubkey = material.public_key_bytes();
        let xonly = x_only(&pubkey).unwrap();
        assert_eq!(&xonly[..], &pubkey[1..]);
        assert_eq!(xonly, material.x_only_public_key());
    }

    #[test]
    fn test_x_only_rejects_wrong_length() {
        assert!(matches!(
            x_only(&[0u8; 32]),
            Err(LockscriptError::InvalidKeyLength(_))
        ));
        assert!(matches!(
            x_only(&[0u8; 65]),
            Err(LockscriptError::InvalidKeyLength(_))
        ));
    }

    #[test]
    fn test_sign_ecdsa_produces_der() {
        let material = KeyMaterial::from_secret_bytes(&[0x42u8; 32]).unwrap();
        let signature = material.sign_ecdsa(&[0x01u8; 32]).unwrap();
        assert_eq!(signature[0], 0x30); // DER sequence tag
    }
}
