// SPDX-License-Identifier: GPL-3.0-only

//! Time-based one-time passwords (RFC 6238) with a self-contained SHA-1,
//! HMAC and Base32 implementation, plus a [`Scheduler`] that republishes the
//! current code once per second.

pub mod clipboard;
pub mod clock;
pub mod config;
mod error;
pub mod otp;
pub mod scheduler;
pub mod telemetry;

pub use error::Error;
pub use otp::secret::SecretInput;
pub use otp::totp::{Tick, Totp};
pub use scheduler::{Scheduler, Update};
