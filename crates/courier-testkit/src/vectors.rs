//! Golden test vectors for deterministic verification.
//!
//! These values were produced by an independent HMAC-SHA256 implementation
//! of the channel derivations. Every implementation must reproduce them
//! byte for byte.

use serde::Serialize;

use courier_core::{
    derive_address, derive_key, encode_base27, injection_position, lock_with_mask_seed,
    message_checksum, MaskSeed, Seed,
};

/// Where a vector's seed comes from.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum GoldenSeed {
    /// The UTF-8 bytes of the string, used as-is.
    Raw(&'static str),
    /// The channel seed derived from the string as a root seed.
    Channel(&'static str),
}

impl GoldenSeed {
    /// The seed bytes the vector is computed with.
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            GoldenSeed::Raw(s) => s.as_bytes().to_vec(),
            GoldenSeed::Channel(root) => Seed::from(*root).channel_seed().as_bytes().to_vec(),
        }
    }
}

/// A `derive_key` vector.
#[derive(Debug, Clone, Serialize)]
pub struct KeyVector {
    pub name: &'static str,
    pub seed: GoldenSeed,
    pub label: &'static str,
    /// Expected key (hex).
    pub expected_key: &'static str,
}

/// A `derive_address` vector.
#[derive(Debug, Clone, Serialize)]
pub struct AddressVector {
    pub name: &'static str,
    pub seed: GoldenSeed,
    pub index: u64,
    pub expected_address: &'static str,
}

/// A lock vector with a fixed mask seed.
#[derive(Debug, Clone, Serialize)]
pub struct LockVector {
    pub name: &'static str,
    pub seed: GoldenSeed,
    /// Raw message (hex).
    pub message: &'static str,
    pub index: u64,
    /// Mask seed (hex).
    pub mask_seed: &'static str,
    /// Checksum injection offset into the raw message.
    pub checksum_pos: usize,
    /// Mask seed injection offset into the checksummed message.
    pub mask_pos: usize,
    /// Expected checksum (hex).
    pub expected_checksum: &'static str,
    /// Expected locked bytes (hex).
    pub expected_locked: &'static str,
}

/// A base-27 encoding vector.
#[derive(Debug, Clone, Serialize)]
pub struct Base27Vector {
    /// Input bytes (hex).
    pub bytes: &'static str,
    pub expected_symbols: &'static str,
}

/// All `derive_key` vectors.
pub fn key_vectors() -> Vec<KeyVector> {
    vec![
        KeyVector {
            name: "channel seed label",
            seed: GoldenSeed::Raw("test-seed"),
            label: "address_seed",
            expected_key: "cdf8b5fcd3c2ac1578b7311795b5786a5739e3ac3fcb2061affbca64a60d9f47",
        },
        KeyVector {
            name: "courier root",
            seed: GoldenSeed::Raw("courier"),
            label: "address_seed",
            expected_key: "69acaa9aced90730bfabe0af3b0f31292000bb32136b02747ffa9bbcada58da6",
        },
        KeyVector {
            name: "empty seed",
            seed: GoldenSeed::Raw(""),
            label: "empty-seed",
            expected_key: "30d2f5888bfd3c96c2a41783d55304bdeb3617e20c09106e5e4cf8df3d676b11",
        },
        KeyVector {
            name: "seed longer than the hash block",
            seed: GoldenSeed::Raw(
                "kkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkk",
            ),
            label: "long seed",
            expected_key: "961aa78c57ffc3a249cd40fba315b607252fc399eb7098b4cadaed40cea18890",
        },
    ]
}

/// All `derive_address` vectors.
pub fn address_vectors() -> Vec<AddressVector> {
    vec![
        AddressVector {
            name: "first slot",
            seed: GoldenSeed::Raw("test-seed"),
            index: 0,
            expected_address: "PKPVDKPC9UGXWSNDRFUWKUBYLSWOMIZVBXEPESOVJFRWSMWNEACSLTPPKZXXCW9GSGMHHKDKPMSKMPUE9",
        },
        AddressVector {
            name: "second slot",
            seed: GoldenSeed::Raw("test-seed"),
            index: 1,
            expected_address: "BIKFHZPGBYKQDQSHOIGHKTQLVM9MHYXGZUXFLLYFC9MARGSCCQPRETLBCBTQYPNVGTSFDZSJJCHLXKVTU",
        },
        AddressVector {
            name: "worked example slot",
            seed: GoldenSeed::Raw("test-seed"),
            index: 5,
            expected_address: "KOGRRXGGTTGQAXVFKSARKJ9PEAQRCICEBF9GPGUABZ9ULC9PLJFMEEUC9SDULZLGJIVZKNPVBVDNPZIBU",
        },
        AddressVector {
            name: "four digit index",
            seed: GoldenSeed::Raw("test-seed"),
            index: 1000,
            expected_address: "HBONIQPZBQABRXBSRJMRGZHAUJHEEAFEVELRVRMJPDKTLHPIPCXGQVWIPYVDRANYQOPTFGFOWZSGWFWDV",
        },
        AddressVector {
            name: "channel seed slot 0",
            seed: GoldenSeed::Channel("courier"),
            index: 0,
            expected_address: "APMKFIJNYGFOZWKKUOY9LNMJHOKJQUHRJHQEWRATGXILH9DFEBWDYEQF9VSZUZSV99KAPUTYWC9YKYFKP",
        },
        AddressVector {
            name: "channel seed slot 7",
            seed: GoldenSeed::Channel("courier"),
            index: 7,
            expected_address: "AGBMRZVMIBQHPQCSRHLXIH9QJGTMWLSIDBQOWBQRIBV9NPZWYQIGLBODZ9HJD9HSDFQDW9MHBKILMXJWH",
        },
    ]
}

/// All lock vectors.
pub fn lock_vectors() -> Vec<LockVector> {
    vec![
        LockVector {
            name: "hello world",
            seed: GoldenSeed::Raw("test-seed"),
            message: "68656c6c6f20776f726c64",
            index: 5,
            mask_seed: "abcd",
            checksum_pos: 10,
            mask_pos: 6,
            expected_checksum: "9148",
            expected_locked: "1ffa8578113babcd1afaa445010258",
        },
        LockVector {
            name: "single byte",
            seed: GoldenSeed::Raw("test-seed"),
            message: "78",
            index: 0,
            mask_seed: "0000",
            checksum_pos: 0,
            mask_pos: 2,
            expected_checksum: "ed1a",
            expected_locked: "d92100001a",
        },
        LockVector {
            name: "binary message at a large index",
            seed: GoldenSeed::Raw("other"),
            message: "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f\
                      202122232425262728292a2b2c2d2e2f303132333435363738393a3b3c3d3e3f",
            index: 123456,
            mask_seed: "ff01",
            checksum_pos: 1,
            mask_pos: 0,
            expected_checksum: "fdb0",
            expected_locked: "ff017dce55dbd3968a7f6b47890e19f6ff1dac387763591ebd811764d82e2457\
                              2bc5e1ec4c765bc458554bcce4cb110f92f48b9cfc5f27749590dd61d6ba4fc0\
                              91c68396",
        },
        LockVector {
            name: "utf-8 text under a channel seed",
            seed: GoldenSeed::Channel("courier"),
            message: "4772c3bcc39f6520c3bc6265722064656e204b616e616c",
            index: 3,
            mask_seed: "1234",
            checksum_pos: 8,
            mask_pos: 12,
            expected_checksum: "153a",
            expected_locked: "fdf878c057e8ae5186868ad0123417d6406b573a59c36478d456b1",
        },
    ]
}

/// All base-27 vectors.
pub fn base27_vectors() -> Vec<Base27Vector> {
    vec![
        Base27Vector {
            bytes: "",
            expected_symbols: "",
        },
        Base27Vector {
            bytes: "0001ff",
            expected_symbols: "ASZ",
        },
        Base27Vector {
            bytes: "68656c6c6f",
            expected_symbols: "BPXJGSTTH",
        },
        Base27Vector {
            bytes: "0000",
            expected_symbols: "AA",
        },
        Base27Vector {
            bytes: "1a",
            expected_symbols: "9",
        },
        Base27Vector {
            bytes: "000102030405060708090a0b0c0d0e0f",
            expected_symbols: "AGHJDZASKBXVQSNYTVPSQTSVA",
        },
    ]
}

fn decode_hex(s: &str) -> Vec<u8> {
    hex::decode(s).unwrap_or_default()
}

fn mask_seed_of(vector: &LockVector) -> MaskSeed {
    let bytes = decode_hex(vector.mask_seed);
    MaskSeed::from_bytes([
        bytes.first().copied().unwrap_or(0),
        bytes.get(1).copied().unwrap_or(0),
    ])
}

/// Verify every golden vector against this implementation.
///
/// Returns `(name, matches, actual)` for each vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let mut results = Vec::new();

    for v in key_vectors() {
        let actual = hex::encode(derive_key(&v.seed.bytes(), v.label.as_bytes()));
        results.push((format!("key: {}", v.name), actual == v.expected_key, actual));
    }

    for v in address_vectors() {
        let actual = derive_address(&v.seed.bytes(), v.index).to_string();
        results.push((
            format!("address: {}", v.name),
            actual == v.expected_address,
            actual,
        ));
    }

    for v in lock_vectors() {
        let seed = v.seed.bytes();
        let message = decode_hex(v.message);
        let actual = lock_with_mask_seed(&seed, &message, v.index, mask_seed_of(&v))
            .map(hex::encode)
            .unwrap_or_else(|e| e.to_string());
        results.push((format!("lock: {}", v.name), actual == v.expected_locked, actual));
    }

    for v in base27_vectors() {
        let actual = encode_base27(&decode_hex(v.bytes));
        results.push((
            format!("base27: {}", v.bytes),
            actual == v.expected_symbols,
            actual,
        ));
    }

    results
}

/// Recompute the injection offsets and checksum of a lock vector.
///
/// Returns `(checksum_pos, mask_pos, checksum_hex)`.
pub fn lock_vector_internals(vector: &LockVector) -> Option<(usize, usize, String)> {
    let seed = vector.seed.bytes();
    let message = decode_hex(vector.message);
    let checksum_label = format!("msg_chk_{}", vector.index);
    let mask_label = format!("msg_rnd_mask_{}", vector.index);

    let checksum_pos = injection_position(&seed, message.len(), checksum_label.as_bytes()).ok()?;
    let mask_pos = injection_position(&seed, message.len() + 2, mask_label.as_bytes()).ok()?;
    let checksum = message_checksum(&seed, &message).to_hex();
    Some((checksum_pos, mask_pos, checksum))
}
