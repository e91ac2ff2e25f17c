//! Opcode bytes, version bytes, and checksum constants shared by the builders

/// OP_1: push the number 1 (also the Taproot witness version marker)
pub const OP_1: u8 = 0x51;

/// OP_PUSHDATA1: next byte is the push length
pub const OP_PUSHDATA1: u8 = 0x4c;

/// OP_DUP: duplicate the top stack item
pub const OP_DUP: u8 = 0x76;

/// OP_HASH160: RIPEMD160(SHA256(x))
pub const OP_HASH160: u8 = 0xa9;

/// OP_EQUAL: push equality of the top two stack items
pub const OP_EQUAL: u8 = 0x87;

/// OP_EQUALVERIFY: fail unless the top two stack items are equal
pub const OP_EQUALVERIFY: u8 = 0x88;

/// OP_CHECKSIG: verify an ECDSA signature
pub const OP_CHECKSIG: u8 = 0xac;

/// OP_CHECKMULTISIG: verify an m-of-n signature set
pub const OP_CHECKMULTISIG: u8 = 0xae;

/// Base58Check version byte for mainnet P2PKH addresses
pub const MAINNET_P2PKH_VERSION: u8 = 0x00;

/// Base58Check version byte for testnet/regtest P2PKH addresses (111)
pub const TESTNET_P2PKH_VERSION: u8 = 0x6f;

/// Base58Check version byte for mainnet P2SH addresses
pub const MAINNET_P2SH_VERSION: u8 = 0x05;

/// Base58Check version byte for testnet/regtest P2SH addresses (196)
pub const TESTNET_P2SH_VERSION: u8 = 0xc4;

/// Bech32 human-readable prefix for mainnet
pub const MAINNET_HRP: &str = "bc";

/// Bech32 human-readable prefix for testnet
pub const TESTNET_HRP: &str = "tb";

/// Bech32 human-readable prefix for regtest
pub const REGTEST_HRP: &str = "bcrt";

/// BIP-350 Bech32m checksum constant (Bech32 proper uses 1)
pub const BECH32M_CONST: u32 = 0x2bc830a3;

/// Bech32/Bech32m data charset, also used for descriptor checksum output
pub const BECH32_CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// BIP-380 descriptor expression charset, indexed by symbol value
pub const DESCRIPTOR_INPUT_CHARSET: &str =
    "0123456789()[],'/*abcdefgh@:$%{}IJKLMNOPQRSTUVWXYZ&+-.;<=>?!^_|~ijklmnopqrstuvwxyzABCDEFGH`#\"\\ ";

/// Length of a compressed secp256k1 public key
pub const COMPRESSED_PUBKEY_LEN: usize = 33;

/// Length of an uncompressed secp256k1 public key
pub const UNCOMPRESSED_PUBKEY_LEN: usize = 65;

/// Length of an x-only (Taproot) public key
pub const XONLY_PUBKEY_LEN: usize = 32;

/// Length of a HASH160 digest (P2PKH and P2SH payloads)
pub const HASH160_LEN: usize = 20;

/// Maximum keys in a CHECKMULTISIG operand list
pub const MAX_MULTISIG_KEYS: usize = 20;

/// Minimum witness program length (BIP-141)
pub const MIN_WITNESS_PROGRAM_LEN: usize = 2;

/// Maximum witness program length (BIP-141)
pub const MAX_WITNESS_PROGRAM_LEN: usize = 40;

/// Base58Check trailing checksum length
pub const BASE58_CHECKSUM_LEN: usize = 4;

/// Bech32 trailing checksum length in 5-bit symbols
pub const BECH32_CHECKSUM_LEN: usize = 6;

/// Descriptor trailing checksum length in characters
pub const DESCRIPTOR_CHECKSUM_LEN: usize = 8;
