// SPDX-License-Identifier: GPL-3.0-only

//! RFC 4648 Base32 without padding.
//!
//! Decoding is lenient: anything outside `A-Z` and `2-7` is skipped rather than
//! rejected, so lowercase input must be upper-cased by the caller first.

#[cfg(test)]
const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

fn symbol_value(c: char) -> Option<u32> {
    match c {
        'A'..='Z' => Some(c as u32 - 'A' as u32),
        '2'..='7' => Some(c as u32 - '2' as u32 + 26),
        _ => None,
    }
}

/// Decodes `input` into bytes, dropping trailing bits that do not fill a byte
pub fn decode(input: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for value in input.chars().filter_map(symbol_value) {
        buffer = (buffer << 5) | value;
        bits += 5;

        if bits >= 8 {
            bits -= 8;
            bytes.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    bytes
}

/// Encodes `bytes` without `=` padding
#[cfg(test)]
pub(crate) fn encode(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;

        while bits >= 5 {
            bits -= 5;
            encoded.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }

    if bits > 0 {
        encoded.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }

    encoded
}
