// SPDX-License-Identifier: GPL-3.0-only

use secrecy::{ExposeSecret, SecretString};

use super::otp_uri::{OtpUri, ParseError};

/// A secret as typed by the user, normalized and kept out of `Debug` output.
///
/// Plain text has its whitespace removed and is upper-cased. An `otpauth://`
/// URI contributes its `secret` parameter; a URI that cannot be honoured is
/// remembered as rejected so the engine reports it as an invalid secret.
#[derive(Debug)]
pub struct SecretInput {
    secret: SecretString,
    rejected: Option<ParseError>,
}

impl SecretInput {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if OtpUri::is_uri(trimmed) {
            return match OtpUri::parse(trimmed).and_then(|uri| {
                uri.ensure_supported()?;
                Ok(uri)
            }) {
                Ok(uri) => {
                    tracing::debug!(
                        label = ?uri.label,
                        issuer = ?uri.issuer,
                        "secret taken from otpauth uri"
                    );
                    Self::from_text(&uri.secret)
                }
                Err(err) => Self {
                    secret: SecretString::from(String::new()),
                    rejected: Some(err),
                },
            };
        }

        Self::from_text(trimmed)
    }

    fn from_text(text: &str) -> Self {
        let normalized: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        Self {
            secret: SecretString::from(normalized),
            rejected: None,
        }
    }

    /// True when there is nothing to generate from and nothing went wrong
    pub fn is_empty(&self) -> bool {
        self.rejected.is_none() && self.secret.expose_secret().is_empty()
    }

    /// Why an `otpauth://` URI could not be used, if it could not
    pub fn rejection(&self) -> Option<&ParseError> {
        self.rejected.as_ref()
    }

    pub(crate) fn normalized(&self) -> &str {
        self.secret.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_whitespace_and_case() {
        let input = SecretInput::parse("  jbsw y3dp\tehpk 3pxp\n");
        assert_eq!(input.normalized(), "JBSWY3DPEHPK3PXP");
        assert!(!input.is_empty());
        assert!(input.rejection().is_none());
    }

    #[test]
    fn test_blank_input_is_empty() {
        assert!(SecretInput::parse("").is_empty());
        assert!(SecretInput::parse(" \t \n").is_empty());
    }

    #[test]
    fn test_keeps_characters_outside_the_alphabet() {
        // decoding skips them, normalization does not
        assert_eq!(SecretInput::parse("ab-1!").normalized(), "AB-1!");
    }

    #[test]
    fn test_extracts_secret_from_uri() {
        let input =
            SecretInput::parse("otpauth://totp/Example:me?secret=jbswy3dpehpk3pxp&issuer=Example");
        assert_eq!(input.normalized(), "JBSWY3DPEHPK3PXP");
        assert!(input.rejection().is_none());
    }

    #[test]
    fn test_unusable_uri_is_rejected_not_empty() {
        let input = SecretInput::parse("otpauth://totp/x?secret=JBSWY3DPEHPK3PXP&digits=8");
        assert!(!input.is_empty());
        assert!(matches!(input.rejection(), Some(ParseError::Unsupported(_))));

        let input = SecretInput::parse("otpauth://totp/x");
        assert_eq!(input.rejection(), Some(&ParseError::MissingSecret));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let input = SecretInput::parse("JBSWY3DPEHPK3PXP");
        assert!(!format!("{input:?}").contains("JBSWY3DPEHPK3PXP"));
    }
}
