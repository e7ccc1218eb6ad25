// SPDX-License-Identifier: GPL-3.0-only

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A non-empty secret that yields no usable key
    InvalidSecret,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidSecret => write!(f, "Invalid secret key"),
        }
    }
}

impl std::error::Error for Error {}
