//! Address encoding: Base58Check for legacy outputs, Bech32m for Taproot
//!
//! The two families use deliberately incompatible checksums. Base58Check
//! carries four bytes of double-SHA256; Bech32m is a BCH code over 5-bit
//! symbols with the BIP-350 constant. Neither constant may leak into the
//! other encoder.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::constants::*;
use crate::error::{LockscriptError, Result};
use crate::script::redeem_script_bytes;
use crate::types::{LockingScript, Network};

/// RIPEMD160(SHA256(data)): the 20-byte hash behind P2PKH and P2SH
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let ripemd = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripemd);
    out
}

/// SHA256(SHA256(data)): used for the Base58Check checksum and txids
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

/// Base58Check-encode `version_byte || payload || checksum4`.
///
/// Version byte 111 yields testnet P2PKH addresses ('m'/'n' prefix),
/// 196 yields testnet P2SH ('2' prefix).
pub fn base58check_encode(payload: &[u8], version_byte: u8) -> String {
    let mut data = Vec::with_capacity(payload.len() + 1 + BASE58_CHECKSUM_LEN);
    data.push(version_byte);
    data.extend_from_slice(payload);
    let checksum = sha256d(&data);
    data.extend_from_slice(&checksum[..BASE58_CHECKSUM_LEN]);
    bs58::encode(data).into_string()
}

/// Decode a Base58Check string into (version_byte, payload).
///
/// Fails with `InvalidEncoding` on characters outside the Base58 alphabet
/// and `ChecksumMismatch` when the trailing four bytes disagree with the
/// recomputed double-SHA256.
pub fn base58check_decode(address: &str) -> Result<(u8, Vec<u8>)> {
    let data = bs58::decode(address).into_vec().map_err(|e| {
        LockscriptError::InvalidEncoding(format!("bad base58 in '{}': {}", address, e))
    })?;
    if data.len() < 1 + BASE58_CHECKSUM_LEN {
        return Err(LockscriptError::InvalidEncoding(format!(
            "decoded length {} too short for version and checksum",
            data.len()
        )));
    }
    let (body, checksum) = data.split_at(data.len() - BASE58_CHECKSUM_LEN);
    let expected = sha256d(body);
    if checksum != &expected[..BASE58_CHECKSUM_LEN] {
        return Err(LockscriptError::ChecksumMismatch(format!(
            "base58check checksum does not match for '{}'",
            address
        )));
    }
    Ok((body[0], body[1..].to_vec()))
}

/// Bech32 BCH checksum polymod over 5-bit symbols
fn bech32_polymod(values: &[u8]) -> u32 {
    const GEN: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];
    let mut chk: u32 = 1;
    for &value in values {
        let top = chk >> 25;
        chk = ((chk & 0x1ffffff) << 5) ^ (value as u32);
        for (i, gen) in GEN.iter().enumerate() {
            if (top >> i) & 1 != 0 {
                chk ^= gen;
            }
        }
    }
    chk
}

/// Expand the human-readable prefix into checksum input symbols
fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut out: Vec<u8> = hrp.bytes().map(|b| b >> 5).collect();
    out.push(0);
    out.extend(hrp.bytes().map(|b| b & 31));
    out
}

/// Regroup bits between 8-bit and 5-bit symbol widths.
///
/// Encoding pads the final group; decoding rejects non-zero padding.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to) - 1;
    let mut out = Vec::new();
    for &value in data {
        if (value as u32) >> from != 0 {
            return Err(LockscriptError::InvalidEncoding(format!(
                "value {} exceeds {} bits",
                value, from
            )));
        }
        acc = (acc << from) | value as u32;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & maxv) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return Err(LockscriptError::InvalidEncoding(
            "invalid padding in 5-bit group".to_string(),
        ));
    }
    Ok(out)
}

/// Check a witness program length against the BIP-141/350 rules
fn check_program_length(witness_version: u8, program_len: usize) -> Result<()> {
    if !(MIN_WITNESS_PROGRAM_LEN..=MAX_WITNESS_PROGRAM_LEN).contains(&program_len) {
        return Err(LockscriptError::InvalidProgramLength(format!(
            "program is {} bytes, allowed range is {}-{}",
            program_len, MIN_WITNESS_PROGRAM_LEN, MAX_WITNESS_PROGRAM_LEN
        )));
    }
    if witness_version == 0 && program_len != 20 && program_len != 32 {
        return Err(LockscriptError::InvalidProgramLength(format!(
            "version-0 program must be 20 or 32 bytes, got {}",
            program_len
        )));
    }
    if witness_version == 1 && program_len != XONLY_PUBKEY_LEN {
        return Err(LockscriptError::InvalidProgramLength(format!(
            "version-1 program must be exactly {} bytes, got {}",
            XONLY_PUBKEY_LEN, program_len
        )));
    }
    Ok(())
}

/// Bech32m-encode a witness program (BIP-350).
///
/// Taproot outputs use witness version 1 with the 32-byte x-only output key
/// as the program, giving addresses with a `bc1p`/`tb1p`-style prefix.
pub fn bech32m_encode(hrp: &str, witness_version: u8, program: &[u8]) -> Result<String> {
    if witness_version > 16 {
        return Err(LockscriptError::InvalidEncoding(format!(
            "witness version {} out of range",
            witness_version
        )));
    }
    check_program_length(witness_version, program.len())?;

    let mut data = vec![witness_version];
    data.extend(convert_bits(program, 8, 5, true)?);

    let mut values = hrp_expand(hrp);
    values.extend_from_slice(&data);
    values.extend_from_slice(&[0u8; BECH32_CHECKSUM_LEN]);
    let polymod = bech32_polymod(&values) ^ BECH32M_CONST;

    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + BECH32_CHECKSUM_LEN);
    out.push_str(hrp);
    out.push('1');
    for d in &data {
        out.push(BECH32_CHARSET[*d as usize] as char);
    }
    for i in 0..BECH32_CHECKSUM_LEN {
        let idx = (polymod >> (5 * (5 - i))) & 31;
        out.push(BECH32_CHARSET[idx as usize] as char);
    }
    Ok(out)
}

/// Decode a Bech32m address into (witness_version, program).
///
/// Fails with `InvalidChecksum` when the BIP-350 constant does not verify,
/// `InvalidEncoding` on malformed charset or mixed case.
pub fn bech32m_decode(address: &str) -> Result<(u8, Vec<u8>)> {
    let has_lower = address.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = address.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(LockscriptError::InvalidEncoding(
            "mixed-case bech32m string".to_string(),
        ));
    }
    let address = address.to_ascii_lowercase();

    let sep = address.rfind('1').ok_or_else(|| {
        LockscriptError::InvalidEncoding("missing bech32m separator".to_string())
    })?;
    let (hrp, data_part) = address.split_at(sep);
    let data_part = &data_part[1..];
    if hrp.is_empty() || data_part.len() < BECH32_CHECKSUM_LEN + 1 {
        return Err(LockscriptError::InvalidEncoding(
            "bech32m string too short".to_string(),
        ));
    }

    let mut values = Vec::with_capacity(data_part.len());
    for c in data_part.bytes() {
        let idx = BECH32_CHARSET.iter().position(|&a| a == c).ok_or_else(|| {
            LockscriptError::InvalidEncoding(format!(
                "character '{}' is not in the bech32 charset",
                c as char
            ))
        })?;
        values.push(idx as u8);
    }

    let mut checksum_input = hrp_expand(hrp);
    checksum_input.extend_from_slice(&values);
    if bech32_polymod(&checksum_input) != BECH32M_CONST {
        return Err(LockscriptError::InvalidChecksum(format!(
            "bech32m checksum does not verify for '{}'",
            address
        )));
    }

    let payload = &values[..values.len() - BECH32_CHECKSUM_LEN];
    if payload.is_empty() {
        return Err(LockscriptError::InvalidEncoding(
            "bech32m payload carries no witness version".to_string(),
        ));
    }
    let witness_version = payload[0];
    if witness_version > 16 {
        return Err(LockscriptError::InvalidEncoding(format!(
            "witness version {} out of range",
            witness_version
        )));
    }
    let program = convert_bits(&payload[1..], 5, 8, false)?;
    check_program_length(witness_version, program.len())?;
    Ok((witness_version, program))
}

/// Derive the canonical address for a locking script.
///
/// Returns `None` for P2PK: bare-key outputs have no address form, the
/// public key itself is the destination.
pub fn address_for_script(script: &LockingScript, network: Network) -> Result<Option<String>> {
    match script {
        LockingScript::P2pk { .. } => Ok(None),
        LockingScript::P2pkh { pubkey_hash } => Ok(Some(base58check_encode(
            pubkey_hash,
            network.p2pkh_version(),
        ))),
        LockingScript::P2sh { script_hash } => Ok(Some(base58check_encode(
            script_hash,
            network.p2sh_version(),
        ))),
        LockingScript::MultisigP2sh { policy } => {
            let script_hash = hash160(&redeem_script_bytes(policy));
            Ok(Some(base58check_encode(&script_hash, network.p2sh_version())))
        }
        LockingScript::P2tr { output_key } => {
            Ok(Some(bech32m_encode(network.hrp(), 1, output_key)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compressed generator point, x = 79be667e...
    const KEY_G: [u8; 33] = [
        0x02, 0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87,
        0x0b, 0x07, 0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b, 0x16,
        0xf8, 0x17, 0x98,
    ];

    #[test]
    fn test_hash160_known_value() {
        let hash = hash160(&KEY_G);
        assert_eq!(hex::encode(hash), "751e76e8199196d454941c45d1b3a323f1433bd6");
    }

    #[test]
    fn test_base58check_known_addresses() {
        let hash = hash160(&KEY_G);
        assert_eq!(
            base58check_encode(&hash, 0),
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"
        );
        assert_eq!(
            base58check_encode(&hash, 111),
            "mrCDrCybB6J1vRfbwM5hemdJz73FwDBC8r"
        );
    }

    #[test]
    fn test_base58check_leading_zeros() {
        // All-zero payload with version 0 keeps its leading '1' digits
        assert_eq!(
            base58check_encode(&[0u8; 20], 0),
            "1111111111111111111114oLvT2"
        );
    }

    #[test]
    fn test_base58check_round_trip() {
        let payload = [0xabu8; 20];
        let encoded = base58check_encode(&payload, 196);
        let (version, decoded) = base58check_decode(&encoded).unwrap();
        assert_eq!(version, 196);
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_base58check_detects_corruption() {
        let encoded = base58check_encode(&[0x11u8; 20], 111);
        // Swap one character for another alphabet member
        let mut corrupted: Vec<char> = encoded.chars().collect();
        let last = corrupted.len() - 1;
        corrupted[last] = if corrupted[last] == '2' { '3' } else { '2' };
        let corrupted: String = corrupted.into_iter().collect();
        assert!(matches!(
            base58check_decode(&corrupted),
            Err(LockscriptError::ChecksumMismatch(_))
        ));
    }

    #[test]
    fn test_base58check_rejects_bad_charset() {
        assert!(matches!(
            base58check_decode("m0OIl"),
            Err(LockscriptError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_bech32m_known_taproot_addresses() {
        // BIP-350 test vector: witness v1 program = x coordinate of G
        let program = &KEY_G[1..];
        assert_eq!(
            bech32m_encode("bc", 1, program).unwrap(),
            "bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqzk5jj0"
        );
        assert_eq!(
            bech32m_encode("tb", 1, program).unwrap(),
            "tb1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vq47zagq"
        );
    }

    #[test]
    fn test_bech32m_round_trip() {
        let program = [0x5au8; 32];
        let encoded = bech32m_encode("tb", 1, &program).unwrap();
        let (version, decoded) = bech32m_decode(&encoded).unwrap();
        assert_eq!(version, 1);
        assert_eq!(decoded, program);
    }

    #[test]
    fn test_bech32m_round_trip_other_version() {
        let program = [0xabu8; 16];
        let encoded = bech32m_encode("tb", 2, &program).unwrap();
        assert_eq!(encoded, "tb1z4w46h2at4w46h2at4w46h2at4v09q42c");
        let (version, decoded) = bech32m_decode(&encoded).unwrap();
        assert_eq!(version, 2);
        assert_eq!(decoded, program);
    }

    #[test]
    fn test_bech32m_program_length_rules() {
        assert!(matches!(
            bech32m_encode("tb", 1, &[0u8; 20]),
            Err(LockscriptError::InvalidProgramLength(_))
        ));
        assert!(matches!(
            bech32m_encode("tb", 2, &[0u8; 1]),
            Err(LockscriptError::InvalidProgramLength(_))
        ));
        assert!(matches!(
            bech32m_encode("tb", 2, &[0u8; 41]),
            Err(LockscriptError::InvalidProgramLength(_))
        ));
    }

    #[test]
    fn test_bech32m_detects_corruption() {
        let encoded = bech32m_encode("tb", 1, &[7u8; 32]).unwrap();
        let mut corrupted: Vec<char> = encoded.chars().collect();
        let last = corrupted.len() - 1;
        corrupted[last] = if corrupted[last] == 'q' { 'p' } else { 'q' };
        let corrupted: String = corrupted.into_iter().collect();
        assert!(matches!(
            bech32m_decode(&corrupted),
            Err(LockscriptError::InvalidChecksum(_))
        ));
    }

    #[test]
    fn test_bech32m_rejects_mixed_case() {
        let encoded = bech32m_encode("tb", 1, &[7u8; 32]).unwrap();
        let mixed = format!("TB{}", &encoded[2..]);
        assert!(matches!(
            bech32m_decode(&mixed),
            Err(LockscriptError::InvalidEncoding(_))
        ));
    }
}
