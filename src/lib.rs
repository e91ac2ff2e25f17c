//! # Lockscript
//!
//! Locking-script, address, and descriptor construction for the five
//! standard Bitcoin output types: P2PK, P2PKH, P2SH, P2SH-wrapped multisig,
//! and single-key Taproot.
//!
//! Given an authorization policy, this crate produces the canonical
//! scriptPubKey byte sequence, the matching address string, and a
//! checksummed output descriptor, such that all three are mutually
//! derivable and verifiable against each other.
//!
//! ## Architecture
//!
//! Leaves first:
//! - `keys` — key-pair generation and x-only conversion
//! - `address` — Base58Check and Bech32m encoding, HASH160
//! - `script` — one pure builder per output type
//! - `descriptor` — checksummed descriptor strings and origin stripping
//! - `assemble` — transaction skeletons and three-way round-trip checks
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every builder and codec is deterministic and
//!    side-effect-free over immutable inputs
//! 2. **No Silent Correction**: a wrong version byte or checksum constant
//!    surfaces as a typed error, never a retried or patched value
//! 3. **Narrow Collaborators**: signing, broadcast, and output-set scans
//!    stay behind the traits in `assemble`
//!
//! ## Usage
//!
//! ```rust
//! use lockscript::{address, descriptor, script, Network};
//!
//! let pubkey_hash = [0x11u8; 20];
//! let locking = script::p2pkh(&pubkey_hash).unwrap();
//! let addr = address::address_for_script(&locking, Network::Testnet)
//!     .unwrap()
//!     .unwrap();
//! assert!(addr.starts_with('m') || addr.starts_with('n'));
//!
//! let desc = descriptor::descriptor_for_script(&locking, Network::Testnet).unwrap();
//! assert!(descriptor::verify(&desc));
//! ```

pub mod address;
pub mod assemble;
pub mod constants;
pub mod descriptor;
pub mod error;
pub mod keys;
pub mod script;
pub mod types;

// Re-export commonly used types
pub use assemble::{RoundTripReport, ScanEntry};
pub use constants::*;
pub use error::{LockscriptError, Result};
pub use types::*;
