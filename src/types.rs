//! Core data types for locking-script and address construction

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{LockscriptError, Result};

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Network the produced addresses belong to.
///
/// Selects the Base58Check version bytes and the Bech32 human-readable
/// prefix. Regtest shares testnet's Base58 bytes but carries its own prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    /// Base58Check version byte for P2PKH addresses on this network
    pub fn p2pkh_version(&self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2PKH_VERSION,
            Network::Testnet | Network::Regtest => TESTNET_P2PKH_VERSION,
        }
    }

    /// Base58Check version byte for P2SH addresses on this network
    pub fn p2sh_version(&self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2SH_VERSION,
            Network::Testnet | Network::Regtest => TESTNET_P2SH_VERSION,
        }
    }

    /// Bech32 human-readable prefix for this network
    pub fn hrp(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_HRP,
            Network::Testnet => TESTNET_HRP,
            Network::Regtest => REGTEST_HRP,
        }
    }
}

/// OutPoint: reference to a spendable output by (txid, index)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: Hash,
    pub vout: u32,
}

/// Unspent output supplied by the external state reader.
///
/// Read-only input to the assembler; amount is in satoshis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub outpoint: OutPoint,
    pub amount: i64,
    pub script_pubkey: ByteString,
}

/// Transaction input referencing a previous output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script_sig: ByteString,
    pub sequence: u32,
}

/// Transaction output carrying a value and a locking script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: i64,
    pub script_pubkey: ByteString,
}

/// Minimal unsigned transaction produced by the assembler.
///
/// Signing and broadcast are delegated to the external collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSkeleton {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

/// M-of-N multisig authorization policy.
///
/// Invariants: 1 <= m <= n, n <= 20, all keys compressed and distinct.
/// `multisig_redeem` re-validates, so a hand-built policy cannot sneak an
/// out-of-range operand count into a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigPolicy {
    pub m: usize,
    pub pubkeys: Vec<ByteString>,
}

impl MultisigPolicy {
    /// Build a validated policy; `n` is the number of keys supplied.
    pub fn new(m: usize, pubkeys: Vec<ByteString>) -> Result<Self> {
        let policy = MultisigPolicy { m, pubkeys };
        policy.validate()?;
        Ok(policy)
    }

    /// Number of keys in the policy
    pub fn n(&self) -> usize {
        self.pubkeys.len()
    }

    /// Check the policy invariants
    pub fn validate(&self) -> Result<()> {
        let n = self.n();
        if n == 0 {
            return Err(LockscriptError::InvalidMultisigPolicy(
                "policy has no keys".to_string(),
            ));
        }
        if self.m == 0 || self.m > n {
            return Err(LockscriptError::InvalidMultisigPolicy(format!(
                "threshold {} out of range for {} keys",
                self.m, n
            )));
        }
        if n > MAX_MULTISIG_KEYS {
            return Err(LockscriptError::InvalidMultisigPolicy(format!(
                "{} keys exceeds the {}-key operand limit",
                n, MAX_MULTISIG_KEYS
            )));
        }
        for (i, key) in self.pubkeys.iter().enumerate() {
            if key.len() != COMPRESSED_PUBKEY_LEN {
                return Err(LockscriptError::InvalidMultisigPolicy(format!(
                    "key {} is {} bytes, expected compressed ({})",
                    i,
                    key.len(),
                    COMPRESSED_PUBKEY_LEN
                )));
            }
            if self.pubkeys[..i].contains(key) {
                return Err(LockscriptError::InvalidMultisigPolicy(format!(
                    "key {} appears more than once",
                    i
                )));
            }
        }
        Ok(())
    }
}

/// Locking script, one variant per supported output type.
///
/// Each variant holds the material its byte layout is derived from, so the
/// address and descriptor can be recomputed from the same source. The
/// multisig variant keeps the full policy: the P2SH hash alone could not
/// reproduce the `sh(multi(...))` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockingScript {
    /// `<pubkey> OP_CHECKSIG`
    P2pk { pubkey: ByteString },
    /// `OP_DUP OP_HASH160 <hash20> OP_EQUALVERIFY OP_CHECKSIG`
    P2pkh { pubkey_hash: [u8; 20] },
    /// `OP_HASH160 <hash20> OP_EQUAL`
    P2sh { script_hash: [u8; 20] },
    /// P2SH wrapping of `OP_m <keys...> OP_n OP_CHECKMULTISIG`
    MultisigP2sh { policy: MultisigPolicy },
    /// `OP_1 <output_key32>`
    P2tr { output_key: [u8; 32] },
}
