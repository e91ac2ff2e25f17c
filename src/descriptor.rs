//! Output descriptors: checksummed textual expressions for scripts
//!
//! A descriptor is `type(expr)#checksum`, where the 8-character checksum is
//! a BCH code over the descriptor input charset (BIP-380). Two descriptors
//! for the same script may differ only in `[fingerprint/path]` key-origin
//! annotations; `strip_origins` produces the canonical comparable form.

use crate::address::{address_for_script, base58check_decode, bech32m_decode, bech32m_encode};
use crate::constants::*;
use crate::error::{LockscriptError, Result};
use crate::script::{classify, p2sh};
use crate::types::{ByteString, LockingScript, MultisigPolicy, Network};

/// Descriptor checksum generator coefficients (BIP-380)
const GENERATOR: [u64; 5] = [
    0xf5dee51989,
    0xa9fdca3312,
    0x1bab10e32d,
    0x3706b1677a,
    0x644d626ffd,
];

fn polymod(chk: u64, value: u64) -> u64 {
    let top = chk >> 35;
    let mut chk = ((chk & 0x7ffffffff) << 5) ^ value;
    for (i, gen) in GENERATOR.iter().enumerate() {
        if (top >> i) & 1 != 0 {
            chk ^= gen;
        }
    }
    chk
}

/// Compute the 8-character checksum for a descriptor expression.
///
/// Pure function of the expression bytes; fails with `InvalidEncoding` when
/// a character falls outside the descriptor charset.
pub fn checksum(expression: &str) -> Result<String> {
    let mut chk: u64 = 1;
    let mut cls: u64 = 0;
    let mut cls_count = 0;
    for c in expression.chars() {
        let pos = DESCRIPTOR_INPUT_CHARSET.find(c).ok_or_else(|| {
            LockscriptError::InvalidEncoding(format!(
                "character '{}' is not allowed in a descriptor",
                c
            ))
        })? as u64;
        chk = polymod(chk, pos & 31);
        // Group the high symbol bits three characters at a time
        cls = cls * 3 + (pos >> 5);
        cls_count += 1;
        if cls_count == 3 {
            chk = polymod(chk, cls);
            cls = 0;
            cls_count = 0;
        }
    }
    if cls_count > 0 {
        chk = polymod(chk, cls);
    }
    for _ in 0..DESCRIPTOR_CHECKSUM_LEN {
        chk = polymod(chk, 0);
    }
    chk ^= 1;

    let mut out = String::with_capacity(DESCRIPTOR_CHECKSUM_LEN);
    for i in 0..DESCRIPTOR_CHECKSUM_LEN {
        let idx = (chk >> (5 * (7 - i))) & 31;
        out.push(BECH32_CHARSET[idx as usize] as char);
    }
    Ok(out)
}

/// Append the checksum to an expression, yielding `expr#checksum`
pub fn attach_checksum(expression: &str) -> Result<String> {
    Ok(format!("{}#{}", expression, checksum(expression)?))
}

/// Verify a descriptor's checksum segment; does not mutate the input.
///
/// Returns `false` for a missing or malformed checksum as well as a
/// mismatched one.
pub fn verify(descriptor: &str) -> bool {
    let Some((expression, claimed)) = descriptor.rsplit_once('#') else {
        return false;
    };
    if claimed.len() != DESCRIPTOR_CHECKSUM_LEN {
        return false;
    }
    match checksum(expression) {
        Ok(expected) => expected == claimed,
        Err(_) => false,
    }
}

/// Remove `[fingerprint/path]` key-origin annotations and re-checksum.
///
/// Idempotent: stripping an already-stripped descriptor returns it
/// unchanged. Needed because collaborators report the same script with or
/// without origin metadata depending on which wallet produced it.
pub fn strip_origins(descriptor: &str) -> Result<String> {
    let expression = descriptor.split('#').next().unwrap_or("");
    let mut stripped = String::with_capacity(expression.len());
    let mut in_origin = false;
    for c in expression.chars() {
        match c {
            '[' if !in_origin => in_origin = true,
            ']' if in_origin => in_origin = false,
            _ if in_origin => {}
            _ => stripped.push(c),
        }
    }
    attach_checksum(&stripped)
}

/// Canonical descriptor for a locking script, origin-free.
///
/// Mirrors what a node reports for each output type: `pk()` for bare keys,
/// `addr()` where only the hash is known, `sh(multi())` when the policy is,
/// and `rawtr()` for a Taproot output key.
pub fn descriptor_for_script(script: &LockingScript, network: Network) -> Result<String> {
    let expression = match script {
        LockingScript::P2pk { pubkey } => format!("pk({})", hex::encode(pubkey)),
        LockingScript::MultisigP2sh { policy } => {
            let keys: Vec<String> = policy.pubkeys.iter().map(hex::encode).collect();
            format!("sh(multi({},{}))", policy.m, keys.join(","))
        }
        LockingScript::P2tr { output_key } => format!("rawtr({})", hex::encode(output_key)),
        LockingScript::P2pkh { .. } | LockingScript::P2sh { .. } => {
            // Hash-only variants always have an address form
            let address = address_for_script(script, network)?.ok_or_else(|| {
                LockscriptError::InvalidEncoding("script has no address form".to_string())
            })?;
            format!("addr({})", address)
        }
    };
    attach_checksum(&expression)
}

/// Parsed descriptor expression, restricted to the forms this library emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorExpr {
    /// `pk(<hex key>)` — bare public key
    Pk(ByteString),
    /// `addr(<address>)` — opaque address
    Addr(String),
    /// `sh(multi(m,<hex key>,...))` — P2SH-wrapped multisig
    ShMulti(MultisigPolicy),
    /// `rawtr(<hex x-only key>)` — Taproot output key
    RawTr([u8; 32]),
    /// `raw(<hex script>)` — raw script bytes
    Raw(ByteString),
}

/// Parse a descriptor string into its expression.
///
/// A present checksum must verify (`ChecksumMismatch` otherwise); origin
/// annotations are stripped before the expression is read.
pub fn parse(descriptor: &str) -> Result<DescriptorExpr> {
    if descriptor.contains('#') && !verify(descriptor) {
        return Err(LockscriptError::ChecksumMismatch(format!(
            "descriptor checksum does not verify for '{}'",
            descriptor
        )));
    }
    let stripped = strip_origins(descriptor)?;
    let expression = stripped.split('#').next().unwrap_or("");

    if let Some(inner) = unwrap_func(expression, "pk") {
        let key = decode_hex(inner)?;
        if key.len() != COMPRESSED_PUBKEY_LEN && key.len() != UNCOMPRESSED_PUBKEY_LEN {
            return Err(LockscriptError::InvalidKeyLength(format!(
                "pk() key is {} bytes",
                key.len()
            )));
        }
        return Ok(DescriptorExpr::Pk(key));
    }
    if let Some(inner) = unwrap_func(expression, "addr") {
        return Ok(DescriptorExpr::Addr(inner.to_string()));
    }
    if let Some(inner) = unwrap_func(expression, "sh") {
        let multi = unwrap_func(inner, "multi").ok_or_else(|| {
            LockscriptError::InvalidEncoding(format!(
                "unsupported sh() inner expression '{}'",
                inner
            ))
        })?;
        let mut parts = multi.split(',');
        let m: usize = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| {
                LockscriptError::InvalidEncoding("multi() is missing its threshold".to_string())
            })?;
        let mut keys = Vec::new();
        for part in parts {
            keys.push(decode_hex(part)?);
        }
        return Ok(DescriptorExpr::ShMulti(MultisigPolicy::new(m, keys)?));
    }
    if let Some(inner) = unwrap_func(expression, "rawtr") {
        let key = decode_hex(inner)?;
        let key: [u8; 32] = key.try_into().map_err(|k: Vec<u8>| {
            LockscriptError::InvalidKeyLength(format!("rawtr() key is {} bytes", k.len()))
        })?;
        return Ok(DescriptorExpr::RawTr(key));
    }
    if let Some(inner) = unwrap_func(expression, "raw") {
        return Ok(DescriptorExpr::Raw(decode_hex(inner)?));
    }
    Err(LockscriptError::InvalidEncoding(format!(
        "unsupported descriptor expression '{}'",
        expression
    )))
}

/// Derive the address a descriptor resolves to on the given network.
///
/// In-process counterpart of the node's `deriveaddresses`. Returns `None`
/// for expressions with no address form (`pk()`, `raw()` of a bare-key
/// script).
pub fn derive_address(descriptor: &str, network: Network) -> Result<Option<String>> {
    match parse(descriptor)? {
        DescriptorExpr::Pk(_) => Ok(None),
        DescriptorExpr::Addr(address) => {
            // The payload must be a valid address on the requested network;
            // a foreign version byte or prefix must not pass through silently
            if let Ok((version, _)) = base58check_decode(&address) {
                if version != network.p2pkh_version() && version != network.p2sh_version() {
                    return Err(LockscriptError::NetworkMismatch(format!(
                        "address '{}' is not valid on {:?}",
                        address, network
                    )));
                }
                return Ok(Some(address));
            }
            bech32m_decode(&address)?;
            let lowered = address.to_ascii_lowercase();
            let hrp = lowered.rfind('1').map_or("", |i| &lowered[..i]);
            if hrp != network.hrp() {
                return Err(LockscriptError::NetworkMismatch(format!(
                    "address '{}' is not valid on {:?}",
                    address, network
                )));
            }
            Ok(Some(address))
        }
        DescriptorExpr::ShMulti(policy) => {
            let script = crate::script::multisig_p2sh(&policy)?;
            address_for_script(&script, network)
        }
        DescriptorExpr::RawTr(output_key) => {
            Ok(Some(bech32m_encode(network.hrp(), 1, &output_key)?))
        }
        DescriptorExpr::Raw(bytes) => match classify(&bytes) {
            Some(script) => address_for_script(&script, network),
            None => Ok(None),
        },
    }
}

/// Return the inside of `name(...)` when `expr` is exactly that call
fn unwrap_func<'a>(expr: &'a str, name: &str) -> Option<&'a str> {
    expr.strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
}

fn decode_hex(s: &str) -> Result<ByteString> {
    hex::decode(s)
        .map_err(|e| LockscriptError::InvalidEncoding(format!("bad hex '{}': {}", s, e)))
}

/// Convenience: descriptor for a P2SH output whose redeem script is known
/// only by hash
pub fn descriptor_for_script_hash(script_hash: &[u8], network: Network) -> Result<String> {
    descriptor_for_script(&p2sh(script_hash)?, network)
}
