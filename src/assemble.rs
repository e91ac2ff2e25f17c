//! Transaction assembly and three-way derivation verification
//!
//! The assembler builds a minimal one-in/one-out skeleton around a produced
//! locking script. The verifier closes the loop: the script must agree with
//! its address, with its descriptor, and with whatever an output-set scan
//! later reports for that descriptor. All node-side effects stay behind the
//! collaborator traits at the bottom of this module.

use std::fmt;

use crate::address::{address_for_script, sha256d};
use crate::descriptor::{derive_address, descriptor_for_script, strip_origins};
use crate::error::{LockscriptError, Result};
use crate::types::{
    ByteString, LockingScript, Network, TransactionInput, TransactionOutput, TransactionSkeleton,
    Utxo,
};

/// Default sequence for a non-RBF, non-locktime input
const SEQUENCE_FINAL: u32 = 0xffffffff;

/// Build a one-input, one-output unsigned transaction spending `utxo` into
/// `locking_script`, leaving `fee` satoshis to the miner.
///
/// Fails with `InsufficientFunds` when the fee consumes the whole input.
pub fn assemble(utxo: &Utxo, locking_script: &LockingScript, fee: i64) -> Result<TransactionSkeleton> {
    if fee < 0 || fee >= utxo.amount {
        return Err(LockscriptError::InsufficientFunds {
            amount: utxo.amount,
            fee,
        });
    }
    Ok(TransactionSkeleton {
        version: 2,
        inputs: vec![TransactionInput {
            prevout: utxo.outpoint.clone(),
            script_sig: vec![],
            sequence: SEQUENCE_FINAL,
        }],
        outputs: vec![TransactionOutput {
            value: utxo.amount - fee,
            script_pubkey: locking_script.to_bytes(),
        }],
        lock_time: 0,
    })
}

impl TransactionSkeleton {
    /// Serialize in the legacy wire format (no witness section)
    pub fn serialize(&self) -> ByteString {
        let mut out = ByteString::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        write_varint(&mut out, self.inputs.len() as u64);
        for input in &self.inputs {
            // txids display big-endian but travel reversed on the wire
            let mut txid = input.prevout.txid;
            txid.reverse();
            out.extend_from_slice(&txid);
            out.extend_from_slice(&input.prevout.vout.to_le_bytes());
            write_varint(&mut out, input.script_sig.len() as u64);
            out.extend_from_slice(&input.script_sig);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }
        write_varint(&mut out, self.outputs.len() as u64);
        for output in &self.outputs {
            out.extend_from_slice(&output.value.to_le_bytes());
            write_varint(&mut out, output.script_pubkey.len() as u64);
            out.extend_from_slice(&output.script_pubkey);
        }
        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out
    }

    /// Transaction id: double-SHA256 of the serialization, displayed
    /// big-endian
    pub fn txid(&self) -> [u8; 32] {
        let mut hash = sha256d(&self.serialize());
        hash.reverse();
        hash
    }

    /// Transaction id as the usual hex string
    pub fn txid_hex(&self) -> String {
        hex::encode(self.txid())
    }
}

fn write_varint(out: &mut ByteString, value: u64) {
    match value {
        0..=0xfc => out.push(value as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x10000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

/// One diverged artifact in a round-trip check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    pub expected: String,
    pub claimed: String,
}

/// Which derivations disagreed during `verify_round_trip`.
///
/// Both artifacts are always checked so a single failed run shows every
/// disagreement, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoundTripReport {
    pub address: Option<Divergence>,
    pub descriptor: Option<Divergence>,
}

impl RoundTripReport {
    pub fn is_clean(&self) -> bool {
        self.address.is_none() && self.descriptor.is_none()
    }
}

impl fmt::Display for RoundTripReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "all derivations agree");
        }
        if let Some(d) = &self.address {
            write!(
                f,
                "address diverged (expected '{}', claimed '{}')",
                d.expected, d.claimed
            )?;
            if self.descriptor.is_some() {
                write!(f, "; ")?;
            }
        }
        if let Some(d) = &self.descriptor {
            write!(
                f,
                "descriptor diverged (expected '{}', claimed '{}')",
                d.expected, d.claimed
            )?;
        }
        Ok(())
    }
}

/// Check that a locking script, an address, and a descriptor all describe
/// the same output.
///
/// Recomputes the address and the origin-stripped descriptor from the
/// script and compares both against the claimed values, aggregating every
/// disagreement into one `DerivationMismatch`. `claimed_address` is `None`
/// for P2PK outputs, which have no address form.
pub fn verify_round_trip(
    locking_script: &LockingScript,
    network: Network,
    claimed_address: Option<&str>,
    claimed_descriptor: &str,
) -> Result<()> {
    let mut report = RoundTripReport::default();

    let expected_address = address_for_script(locking_script, network)?;
    if expected_address.as_deref() != claimed_address {
        report.address = Some(Divergence {
            expected: expected_address.unwrap_or_else(|| "<none>".to_string()),
            claimed: claimed_address.unwrap_or("<none>").to_string(),
        });
    }

    let expected_descriptor = descriptor_for_script(locking_script, network)?;
    let claimed_stripped = strip_origins(claimed_descriptor)?;
    if expected_descriptor != claimed_stripped {
        report.descriptor = Some(Divergence {
            expected: expected_descriptor,
            claimed: claimed_stripped,
        });
    }

    if report.is_clean() {
        Ok(())
    } else {
        Err(LockscriptError::DerivationMismatch(report))
    }
}

/// Check that an output rediscovered by descriptor scan resolves back to
/// the expected address.
///
/// Models the pattern where a just-spent output is not yet visible in
/// balance listings but must be findable in the full output set purely from
/// its descriptor. Scan entries that fail to parse are skipped: a scan may
/// return foreign descriptors alongside ours.
pub fn verify_discoverable(
    scanned_descriptors: &[String],
    expected_address: &str,
    network: Network,
) -> bool {
    scanned_descriptors.iter().any(|descriptor| {
        matches!(
            derive_address(descriptor, network),
            Ok(Some(address)) if address == expected_address
        )
    })
}

/// External signer collaborator (e.g. a wallet RPC)
pub trait Signer {
    fn sign(&self, raw_transaction: &[u8]) -> Result<ByteString>;
}

/// External broadcast collaborator; returns the accepted txid
pub trait Broadcaster {
    fn broadcast(&self, signed_transaction: &[u8]) -> Result<[u8; 32]>;
}

/// External state reader listing spendable outputs
pub trait UtxoSource {
    fn fetch_utxos(&self) -> Result<Vec<Utxo>>;
}

/// One entry returned by an output-set scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub descriptor: String,
    pub address: Option<String>,
}

/// External indexer scanning the full output set by descriptor
pub trait OutputSetScanner {
    fn scan_output_set(&self, descriptor: &str) -> Result<Vec<ScanEntry>>;
}

/// Assemble, sign, and broadcast a spend of `utxo` into `locking_script`.
///
/// Drives the collaborator interfaces end to end and hands back the txid
/// alongside the skeleton that was signed, so callers can verify against
/// the exact bytes that were broadcast.
pub fn spend_to_script<S: Signer, B: Broadcaster>(
    utxo: &Utxo,
    locking_script: &LockingScript,
    fee: i64,
    signer: &S,
    broadcaster: &B,
) -> Result<(TransactionSkeleton, [u8; 32])> {
    let skeleton = assemble(utxo, locking_script, fee)?;
    let signed = signer.sign(&skeleton.serialize())?;
    let txid = broadcaster.broadcast(&signed)?;
    Ok((skeleton, txid))
}
