//! Comprehensive tests for the public lockscript API

use lockscript::address::*;
use lockscript::descriptor;
use lockscript::script::*;
use lockscript::*;

const KEY_G: [u8; 33] = [
    0x02, 0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87,
    0x0b, 0x07, 0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b, 0x16,
    0xf8, 0x17, 0x98,
];

#[test]
fn test_network_version_bytes() {
    assert_eq!(Network::Mainnet.p2pkh_version(), 0);
    assert_eq!(Network::Testnet.p2pkh_version(), 111);
    assert_eq!(Network::Regtest.p2pkh_version(), 111);
    assert_eq!(Network::Mainnet.p2sh_version(), 5);
    assert_eq!(Network::Testnet.p2sh_version(), 196);
    assert_eq!(Network::Mainnet.hrp(), "bc");
    assert_eq!(Network::Testnet.hrp(), "tb");
    assert_eq!(Network::Regtest.hrp(), "bcrt");
}

#[test]
fn test_p2pkh_full_derivation_chain() {
    // hash160 -> script -> decode -> re-hash closes the loop
    let pubkey_hash = hash160(&KEY_G);
    let locking = p2pkh(&pubkey_hash).unwrap();
    let reparsed = classify(&locking.to_bytes()).unwrap();
    assert_eq!(
        reparsed,
        LockingScript::P2pkh {
            pubkey_hash
        }
    );

    let address = address_for_script(&locking, Network::Testnet)
        .unwrap()
        .unwrap();
    assert_eq!(address, "mrCDrCybB6J1vRfbwM5hemdJz73FwDBC8r");
    let (version, payload) = base58check_decode(&address).unwrap();
    assert_eq!(version, 111);
    assert_eq!(payload, pubkey_hash);
}

#[test]
fn test_address_per_network() {
    let pubkey_hash = hash160(&KEY_G);
    let locking = p2pkh(&pubkey_hash).unwrap();
    assert_eq!(
        address_for_script(&locking, Network::Mainnet).unwrap(),
        Some("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH".to_string())
    );
    // Regtest shares testnet's Base58 version bytes
    assert_eq!(
        address_for_script(&locking, Network::Regtest).unwrap(),
        address_for_script(&locking, Network::Testnet).unwrap()
    );

    let taproot = p2tr(&KEY_G[1..]).unwrap();
    let regtest = address_for_script(&taproot, Network::Regtest)
        .unwrap()
        .unwrap();
    assert!(regtest.starts_with("bcrt1p"));
}

#[test]
fn test_script_hex_rendering() {
    let locking = p2pkh(&hash160(&KEY_G)).unwrap();
    assert_eq!(
        locking.to_hex(),
        "76a914751e76e8199196d454941c45d1b3a323f1433bd688ac"
    );
}

#[test]
fn test_multisig_script_hash_agrees_with_redeem() {
    let keys: Vec<ByteString> = vec![
        KEY_G.to_vec(),
        hex::decode("02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5").unwrap(),
        hex::decode("02f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9").unwrap(),
    ];
    let policy = MultisigPolicy::new(2, keys).unwrap();
    let redeem = multisig_redeem(&policy).unwrap();
    let locking = multisig_p2sh(&policy).unwrap();
    assert_eq!(locking.script_hash(), Some(hash160(&redeem)));

    // Fixed keys give a fixed address and descriptor
    assert_eq!(
        address_for_script(&locking, Network::Testnet).unwrap(),
        Some("2MuFU6ZyBLtDNadMA6RnwJdXGWUSUaoKLeS".to_string())
    );
    let descriptor = descriptor::descriptor_for_script(&locking, Network::Testnet).unwrap();
    assert!(descriptor.ends_with("#07tnuwj6"));
}

#[test]
fn test_descriptor_forms_per_variant() {
    let testnet = Network::Testnet;
    let pk = descriptor::descriptor_for_script(&p2pk(&KEY_G).unwrap(), testnet).unwrap();
    assert!(pk.starts_with("pk(02"));

    let pkh =
        descriptor::descriptor_for_script(&p2pkh(&hash160(&KEY_G)).unwrap(), testnet).unwrap();
    assert!(pkh.starts_with("addr(m") || pkh.starts_with("addr(n"));

    let sh = descriptor::descriptor_for_script(&p2sh(&[0x22u8; 20]).unwrap(), testnet).unwrap();
    assert!(sh.starts_with("addr(2"));

    let tr = descriptor::descriptor_for_script(&p2tr(&KEY_G[1..]).unwrap(), testnet).unwrap();
    assert_eq!(
        tr,
        "rawtr(79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798)#xsjqcczm"
    );

    for descriptor in [pk, pkh, sh, tr] {
        assert!(descriptor::verify(&descriptor));
    }
}

#[test]
fn test_descriptor_for_script_hash() {
    let descriptor =
        descriptor::descriptor_for_script_hash(&[0x22u8; 20], Network::Testnet).unwrap();
    assert!(descriptor.starts_with("addr(2"));
    assert!(descriptor::verify(&descriptor));
}

#[test]
fn test_transaction_skeleton_serde_round_trip() {
    let utxo = Utxo {
        outpoint: OutPoint {
            txid: [0x42; 32],
            vout: 1,
        },
        amount: 5_000_000_000,
        script_pubkey: vec![],
    };
    let locking = p2pkh(&hash160(&KEY_G)).unwrap();
    let skeleton = lockscript::assemble::assemble(&utxo, &locking, 1_500).unwrap();

    let json = serde_json::to_string(&skeleton).unwrap();
    let back: TransactionSkeleton = serde_json::from_str(&json).unwrap();
    assert_eq!(back, skeleton);
    assert_eq!(back.txid(), skeleton.txid());
}

#[test]
fn test_locking_script_serde_round_trip() {
    let locking = p2tr(&KEY_G[1..]).unwrap();
    let json = serde_json::to_string(&locking).unwrap();
    let back: LockingScript = serde_json::from_str(&json).unwrap();
    assert_eq!(back, locking);
}

#[test]
fn test_round_trip_report_display() {
    let err = lockscript::assemble::verify_round_trip(
        &p2pkh(&hash160(&KEY_G)).unwrap(),
        Network::Testnet,
        Some("mfWxJ45yp2SFn7UciZyNpvDKrzbhyfKrY8"), // address of a different hash
        "raw(deadbeef)#89f8spxm",
    )
    .unwrap_err();
    let LockscriptError::DerivationMismatch(report) = err else {
        panic!("expected DerivationMismatch");
    };
    assert!(report.address.is_some());
    assert!(report.descriptor.is_some());
    let rendered = report.to_string();
    assert!(rendered.contains("address diverged"));
    assert!(rendered.contains("descriptor diverged"));
}
