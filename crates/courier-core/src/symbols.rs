//! The 27-symbol ledger alphabet and the codecs built on it.
//!
//! Addresses, tags and payload fragments on the ledger are strings over
//! `A..=Z` plus the filler symbol `9`. Payload bytes are carried as a
//! base-27 positional encoding of the byte string.

use rand::Rng;

use crate::error::{CoreError, Result};
use crate::keys::keystream;

/// The ledger alphabet. Symbol value `v` is `ALPHABET[v]`.
pub const ALPHABET: &[u8; 27] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ9";

/// Number of symbols in the alphabet.
pub const BASE: u32 = 27;

/// Padding symbol used by the ledger to fill fixed-width fields.
pub const FILLER: char = '9';

/// Largest multiple of 27 that fits in a byte (`floor(256 / 27) * 27`).
///
/// Keystream bytes at or above this bound are rejected so that `byte % 27`
/// stays uniform.
pub const UNBIASED_BOUND: u8 = 243;

/// Value of a symbol, or `None` if it is not in the alphabet.
pub fn symbol_value(symbol: u8) -> Option<u8> {
    match symbol {
        b'A'..=b'Z' => Some(symbol - b'A'),
        b'9' => Some(26),
        _ => None,
    }
}

/// Check that every character of `s` is an alphabet symbol.
pub fn is_symbol_string(s: &str) -> bool {
    s.bytes().all(|b| symbol_value(b).is_some())
}

/// Draw `count` uniformly distributed symbols from `keystream(seed, label)`.
///
/// Bytes `>= 243` are discarded and the next byte is drawn instead.
pub fn unbiased_symbols(seed: &[u8], label: &[u8], count: usize) -> String {
    keystream(seed, label)
        .filter(|&byte| byte < UNBIASED_BOUND)
        .take(count)
        .map(|byte| ALPHABET[usize::from(byte % 27)] as char)
        .collect()
}

/// Pick a random terminal marker symbol.
///
/// Markers are drawn from `A..=Z` only: the filler symbol would be stripped
/// together with the padding.
pub fn random_marker() -> char {
    let value = rand::thread_rng().gen_range(0..26usize);
    ALPHABET[value] as char
}

/// Encode bytes as base-27 symbols.
///
/// Leading zero bytes become leading `A` symbols; the remaining bytes are
/// converted as one big-endian number.
pub fn encode_base27(bytes: &[u8]) -> String {
    let zeroes = bytes.iter().take_while(|&&b| b == 0).count();

    // Little-endian base-27 digits of the non-zero tail.
    let mut digits: Vec<u8> = Vec::with_capacity(bytes.len() * 2);
    for &byte in &bytes[zeroes..] {
        let mut carry = u32::from(byte);
        for digit in digits.iter_mut() {
            carry += u32::from(*digit) << 8;
            *digit = (carry % BASE) as u8;
            carry /= BASE;
        }
        while carry > 0 {
            digits.push((carry % BASE) as u8);
            carry /= BASE;
        }
    }

    let mut out = String::with_capacity(zeroes + digits.len());
    out.extend(std::iter::repeat(ALPHABET[0] as char).take(zeroes));
    out.extend(digits.iter().rev().map(|&d| ALPHABET[usize::from(d)] as char));
    out
}

/// Decode base-27 symbols back into bytes.
pub fn decode_base27(symbols: &str) -> Result<Vec<u8>> {
    let input = symbols.as_bytes();
    let zeroes = input.iter().take_while(|&&c| c == ALPHABET[0]).count();

    // Little-endian base-256 digits.
    let mut bytes: Vec<u8> = Vec::with_capacity(input.len());
    for (offset, &c) in input.iter().enumerate().skip(zeroes) {
        let value = symbol_value(c).ok_or_else(|| {
            CoreError::Decode(format!("invalid symbol {:?} at offset {}", c as char, offset))
        })?;

        let mut carry = u32::from(value);
        for byte in bytes.iter_mut() {
            carry += u32::from(*byte) * BASE;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; zeroes];
    out.extend(bytes.iter().rev());
    Ok(out)
}
