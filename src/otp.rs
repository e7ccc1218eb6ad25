// SPDX-License-Identifier: GPL-3.0-only

pub mod base32;
pub mod hmac;
pub mod otp_uri;
pub mod secret;
pub mod sha1;
pub mod totp;
