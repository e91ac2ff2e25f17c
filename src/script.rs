//! Locking-script builders, one per supported output type
//!
//! Every builder is a pure function from policy material to the exact
//! scriptPubKey byte sequence. `classify` is the structural inverse used
//! when only raw bytes are available.

use crate::address::hash160;
use crate::constants::*;
use crate::error::{LockscriptError, Result};
use crate::types::{ByteString, LockingScript, MultisigPolicy};

/// Append a minimal data push for `data` (direct length byte up to 75,
/// OP_PUSHDATA1 beyond)
fn push_slice(out: &mut ByteString, data: &[u8]) {
    if data.len() < OP_PUSHDATA1 as usize {
        out.push(data.len() as u8);
    } else {
        // Key and hash pushes in scope never exceed 255 bytes
        out.push(OP_PUSHDATA1);
        out.push(data.len() as u8);
    }
    out.extend_from_slice(data);
}

/// Build a P2PK script: `<pubkey> OP_CHECKSIG`.
///
/// Accepts compressed (33-byte) and uncompressed (65-byte) keys.
pub fn p2pk(pubkey: &[u8]) -> Result<LockingScript> {
    if pubkey.len() != COMPRESSED_PUBKEY_LEN && pubkey.len() != UNCOMPRESSED_PUBKEY_LEN {
        return Err(LockscriptError::InvalidKeyLength(format!(
            "p2pk key is {} bytes, expected {} or {}",
            pubkey.len(),
            COMPRESSED_PUBKEY_LEN,
            UNCOMPRESSED_PUBKEY_LEN
        )));
    }
    Ok(LockingScript::P2pk {
        pubkey: pubkey.to_vec(),
    })
}

/// Build a P2PKH script: `OP_DUP OP_HASH160 <hash20> OP_EQUALVERIFY OP_CHECKSIG`
pub fn p2pkh(pubkey_hash: &[u8]) -> Result<LockingScript> {
    let hash: [u8; 20] = pubkey_hash.try_into().map_err(|_| {
        LockscriptError::InvalidKeyLength(format!(
            "p2pkh hash is {} bytes, expected {}",
            pubkey_hash.len(),
            HASH160_LEN
        ))
    })?;
    Ok(LockingScript::P2pkh { pubkey_hash: hash })
}

/// Build a P2SH script: `OP_HASH160 <hash20> OP_EQUAL`
pub fn p2sh(script_hash: &[u8]) -> Result<LockingScript> {
    let hash: [u8; 20] = script_hash.try_into().map_err(|_| {
        LockscriptError::InvalidKeyLength(format!(
            "p2sh hash is {} bytes, expected {}",
            script_hash.len(),
            HASH160_LEN
        ))
    })?;
    Ok(LockingScript::P2sh { script_hash: hash })
}

/// Emit the multisig redeem script bytes without policy validation.
///
/// Callers outside the crate go through `multisig_redeem`, which validates
/// first; this layout function backs `LockingScript::to_bytes` as well.
pub(crate) fn redeem_script_bytes(policy: &MultisigPolicy) -> ByteString {
    let mut out = ByteString::new();
    out.push(OP_1 + policy.m as u8 - 1);
    for key in &policy.pubkeys {
        push_slice(&mut out, key);
    }
    out.push(OP_1 + policy.n() as u8 - 1);
    out.push(OP_CHECKMULTISIG);
    out
}

/// Build the redeem script for an m-of-n policy:
/// `OP_m <key_1>...<key_n> OP_n OP_CHECKMULTISIG`.
///
/// The redeem script is not itself a standard locking script; wrap it with
/// `multisig_p2sh` (or hash it and call `p2sh`) to produce the output.
pub fn multisig_redeem(policy: &MultisigPolicy) -> Result<ByteString> {
    policy.validate()?;
    Ok(redeem_script_bytes(policy))
}

/// Build the P2SH wrapping of an m-of-n multisig redeem script.
///
/// The resulting locking script keeps the policy so the `sh(multi(...))`
/// descriptor stays derivable.
pub fn multisig_p2sh(policy: &MultisigPolicy) -> Result<LockingScript> {
    policy.validate()?;
    Ok(LockingScript::MultisigP2sh {
        policy: policy.clone(),
    })
}

/// Build a Taproot script: `OP_1 <output_key32>`
pub fn p2tr(output_key: &[u8]) -> Result<LockingScript> {
    let key: [u8; 32] = output_key.try_into().map_err(|_| {
        LockscriptError::InvalidKeyLength(format!(
            "taproot output key is {} bytes, expected {}",
            output_key.len(),
            XONLY_PUBKEY_LEN
        ))
    })?;
    Ok(LockingScript::P2tr { output_key: key })
}

impl LockingScript {
    /// Canonical scriptPubKey byte layout for this variant
    pub fn to_bytes(&self) -> ByteString {
        match self {
            LockingScript::P2pk { pubkey } => {
                let mut out = ByteString::new();
                push_slice(&mut out, pubkey);
                out.push(OP_CHECKSIG);
                out
            }
            LockingScript::P2pkh { pubkey_hash } => {
                let mut out = vec![OP_DUP, OP_HASH160];
                push_slice(&mut out, pubkey_hash);
                out.push(OP_EQUALVERIFY);
                out.push(OP_CHECKSIG);
                out
            }
            LockingScript::P2sh { script_hash } => p2sh_layout(script_hash),
            LockingScript::MultisigP2sh { policy } => {
                p2sh_layout(&hash160(&redeem_script_bytes(policy)))
            }
            LockingScript::P2tr { output_key } => {
                let mut out = vec![OP_1];
                push_slice(&mut out, output_key);
                out
            }
        }
    }

    /// Script bytes as lowercase hex, for logging and fixtures
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The HASH160 of the wrapped redeem script, for P2SH variants
    pub fn script_hash(&self) -> Option<[u8; 20]> {
        match self {
            LockingScript::P2sh { script_hash } => Some(*script_hash),
            LockingScript::MultisigP2sh { policy } => {
                Some(hash160(&redeem_script_bytes(policy)))
            }
            _ => None,
        }
    }
}

fn p2sh_layout(script_hash: &[u8; 20]) -> ByteString {
    let mut out = vec![OP_HASH160];
    push_slice(&mut out, script_hash);
    out.push(OP_EQUAL);
    out
}

/// Structurally classify raw scriptPubKey bytes.
///
/// A multisig-wrapped output classifies as plain `P2sh`: the hash hides the
/// redeem script. Returns `None` for byte sequences outside the five
/// supported layouts.
pub fn classify(bytes: &[u8]) -> Option<LockingScript> {
    match bytes {
        // OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG
        [OP_DUP, OP_HASH160, HASH160_LEN_BYTE, hash @ .., OP_EQUALVERIFY, OP_CHECKSIG]
            if hash.len() == HASH160_LEN =>
        {
            Some(LockingScript::P2pkh {
                pubkey_hash: hash.try_into().ok()?,
            })
        }
        // OP_HASH160 <20> OP_EQUAL
        [OP_HASH160, HASH160_LEN_BYTE, hash @ .., OP_EQUAL] if hash.len() == HASH160_LEN => {
            Some(LockingScript::P2sh {
                script_hash: hash.try_into().ok()?,
            })
        }
        // OP_1 <32>
        [OP_1, XONLY_LEN_BYTE, key @ ..] if key.len() == XONLY_PUBKEY_LEN => {
            Some(LockingScript::P2tr {
                output_key: key.try_into().ok()?,
            })
        }
        // <33|65> OP_CHECKSIG
        [len, rest @ ..]
            if (*len as usize == COMPRESSED_PUBKEY_LEN
                || *len as usize == UNCOMPRESSED_PUBKEY_LEN)
                && rest.len() == *len as usize + 1
                && rest[rest.len() - 1] == OP_CHECKSIG =>
        {
            Some(LockingScript::P2pk {
                pubkey: rest[..rest.len() - 1].to_vec(),
            })
        }
        _ => None,
    }
}

const HASH160_LEN_BYTE: u8 = HASH160_LEN as u8;
const XONLY_LEN_BYTE: u8 = XONLY_PUBKEY_LEN as u8;
