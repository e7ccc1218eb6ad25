// SPDX-License-Identifier: GPL-3.0-only

use secrecy::zeroize::Zeroize;

use super::sha1::{self, BLOCK_LEN, DIGEST_LEN};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// HMAC-SHA1 as described in RFC 2104
pub fn hmac(key: &[u8], message: &[u8]) -> [u8; DIGEST_LEN] {
    let mut key_block = [0u8; BLOCK_LEN];
    if key.len() > BLOCK_LEN {
        key_block[..DIGEST_LEN].copy_from_slice(&sha1::hash(key));
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let mut inner = Vec::with_capacity(BLOCK_LEN + message.len());
    inner.extend(key_block.iter().map(|b| b ^ IPAD));
    inner.extend_from_slice(message);
    let inner_digest = sha1::hash(&inner);

    let mut outer = Vec::with_capacity(BLOCK_LEN + DIGEST_LEN);
    outer.extend(key_block.iter().map(|b| b ^ OPAD));
    outer.extend_from_slice(&inner_digest);
    let digest = sha1::hash(&outer);

    key_block.zeroize();
    inner.zeroize();
    outer.zeroize();

    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::sha1::to_hex;

    // RFC 2202, section 3
    #[test]
    fn test_rfc2202_vectors() {
        let cases: [(Vec<u8>, Vec<u8>, &str); 7] = [
            (
                vec![0x0b; 20],
                b"Hi There".to_vec(),
                "b617318655057264e28bc0b6fb378c8ef146be00",
            ),
            (
                b"Jefe".to_vec(),
                b"what do ya want for nothing?".to_vec(),
                "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79",
            ),
            (
                vec![0xaa; 20],
                vec![0xdd; 50],
                "125d7342b9ac11cd91a39af48aa17b4f63f175d3",
            ),
            (
                (0x01..=0x19).collect(),
                vec![0xcd; 50],
                "4c9007f4026250c6bc8414f9bf50c86c2d7235da",
            ),
            (
                vec![0x0c; 20],
                b"Test With Truncation".to_vec(),
                "4c1a03424b55e07fe7f27be1d58bb9324a9a5a04",
            ),
            (
                vec![0xaa; 80],
                b"Test Using Larger Than Block-Size Key - Hash Key First".to_vec(),
                "aa4ae5e15272d00e95705637ce8a3b55ed402112",
            ),
            (
                vec![0xaa; 80],
                b"Test Using Larger Than Block-Size Key and Larger Than One Block-Size Data"
                    .to_vec(),
                "e8e99d0f45237d786d6bbaa7965c7808bbff1a91",
            ),
        ];

        for (i, (key, data, expected)) in cases.iter().enumerate() {
            assert_eq!(to_hex(&hmac(key, data)), *expected, "case {}", i + 1);
        }
    }

    #[test]
    fn test_block_sized_key_is_used_as_is() {
        let key = [0x42u8; BLOCK_LEN];
        let mut longer = key.to_vec();
        longer.push(0);
        assert_ne!(hmac(&key, b"msg"), hmac(&longer, b"msg"));
        assert_eq!(hmac(&key, b"msg"), hmac(&key, b"msg"));
    }

    #[test]
    fn test_empty_key_and_message() {
        assert_eq!(to_hex(&hmac(b"", b"")), "fbdb1d1b18aa6c08324b7d64b71fb76370690e1d");
    }
}
