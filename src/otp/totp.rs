// SPDX-License-Identifier: GPL-3.0-only

use std::time::SystemTime;

use secrecy::{ExposeSecret, SecretSlice};

use super::{base32, hmac::hmac, secret::SecretInput, sha1::DIGEST_LEN};
use crate::{Error, clock};

/// Length of a time step in seconds
pub const PERIOD: u64 = 30;
/// Number of decimal digits in a code
pub const DIGITS: u32 = 6;

const MODULUS: u32 = 10u32.pow(DIGITS);

/// One publication of the current code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub code: String,
    /// Seconds left in the current window, always in `1..=PERIOD`
    pub seconds_remaining: u64,
    /// The time step the code was derived from
    pub counter: u64,
}

/// A SHA1, 6 digit, 30 second TOTP generator holding the decoded key
pub struct Totp {
    key: SecretSlice<u8>,
}

impl std::fmt::Debug for Totp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Totp")
            .field("key_len", &self.key_len())
            .finish()
    }
}

impl Totp {
    /// Decodes the key once. Fails when the input yields no key bytes.
    pub fn new(input: &SecretInput) -> Result<Self, Error> {
        if let Some(reason) = input.rejection() {
            tracing::warn!("Rejected otpauth uri: {}", reason);
            return Err(Error::InvalidSecret);
        }

        let key = base32::decode(input.normalized());
        if key.is_empty() {
            return Err(Error::InvalidSecret);
        }

        Ok(Self {
            key: SecretSlice::from(key),
        })
    }

    /// Normalizes and decodes `secret`
    pub fn from_secret(secret: &str) -> Result<Self, Error> {
        Self::new(&SecretInput::parse(secret))
    }

    pub fn key_len(&self) -> usize {
        self.key.expose_secret().len()
    }

    /// HOTP value (RFC 4226) for an explicit counter
    pub fn code_for_counter(&self, counter: u64) -> String {
        let digest = hmac(self.key.expose_secret(), &counter.to_be_bytes());
        format!("{:0width$}", truncate(&digest), width = DIGITS as usize)
    }

    pub fn code_at(&self, unix_seconds: u64) -> String {
        self.code_for_counter(time_step(unix_seconds))
    }

    pub fn tick_at(&self, unix_seconds: u64) -> Tick {
        let counter = time_step(unix_seconds);
        Tick {
            code: self.code_for_counter(counter),
            seconds_remaining: seconds_remaining(unix_seconds),
            counter,
        }
    }
}

/// Computes the code for `secret` at `now`.
///
/// An empty secret also yields [`Error::InvalidSecret`] since no code can be
/// derived from it; callers that distinguish "no session" check for emptiness
/// first.
pub fn code(secret: &str, now: SystemTime) -> Result<String, Error> {
    let totp = Totp::from_secret(secret)?;
    Ok(totp.code_at(clock::since_epoch(now).as_secs()))
}

pub fn time_step(unix_seconds: u64) -> u64 {
    unix_seconds / PERIOD
}

pub fn seconds_remaining(unix_seconds: u64) -> u64 {
    PERIOD - (unix_seconds % PERIOD)
}

/// Dynamic truncation, RFC 4226 section 5.3
fn truncate(digest: &[u8; DIGEST_LEN]) -> u32 {
    let offset = usize::from(digest[DIGEST_LEN - 1] & 0x0f);
    let value = (u32::from(digest[offset] & 0x7f) << 24)
        | (u32::from(digest[offset + 1]) << 16)
        | (u32::from(digest[offset + 2]) << 8)
        | u32::from(digest[offset + 3]);
    value % MODULUS
}
