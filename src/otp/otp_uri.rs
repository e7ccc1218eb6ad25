// SPDX-License-Identifier: GPL-3.0-only

use std::collections::HashMap;

use super::totp::{DIGITS, PERIOD};

#[derive(Debug, Clone)]
pub struct OtpUri {
    pub label: Option<String>,
    pub issuer: Option<String>,
    pub secret: String,
    pub algorithm: Option<String>,
    pub digits: Option<u32>,
    pub period: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidUrl(String),
    InvalidScheme(String),
    InvalidOtpType(String),
    MissingSecret,
    InvalidParameter(String),
    Unsupported(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidUrl(e) => write!(f, "Invalid URL: {}", e),
            ParseError::InvalidScheme(s) => write!(f, "Invalid scheme: {}", s),
            ParseError::InvalidOtpType(t) => write!(f, "Invalid OTP type: {}", t),
            ParseError::MissingSecret => write!(f, "Missing required secret parameter"),
            ParseError::InvalidParameter(p) => write!(f, "Invalid parameter: {}", p),
            ParseError::Unsupported(p) => write!(f, "Unsupported parameter: {}", p),
        }
    }
}

impl std::error::Error for ParseError {}

impl OtpUri {
    pub const SCHEME: &str = "otpauth";

    /// Returns true if `input` looks like an `otpauth://` URI
    pub fn is_uri(input: &str) -> bool {
        input
            .split_once("://")
            .is_some_and(|(scheme, _)| scheme.eq_ignore_ascii_case(Self::SCHEME))
    }

    pub fn parse(uri: &str) -> Result<Self, ParseError> {
        let url = url::Url::parse(uri).map_err(|e| ParseError::InvalidUrl(e.to_string()))?;

        if url.scheme() != Self::SCHEME {
            return Err(ParseError::InvalidScheme(url.scheme().to_string()));
        }

        if !url
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case("totp"))
        {
            return Err(ParseError::InvalidOtpType(
                url.host_str().unwrap_or("missing").to_string(),
            ));
        }

        let params: HashMap<String, String> = url
            .query_pairs()
            .map(|(key, value)| (key.to_ascii_lowercase(), value.to_string()))
            .collect();

        let secret = params
            .get("secret")
            .filter(|s| !s.is_empty())
            .ok_or(ParseError::MissingSecret)?
            .clone();

        let path = url.path();
        let path = path.strip_prefix('/').unwrap_or(path);
        let (label, issuer_from_label) = Self::parse_label(path);

        let issuer = params.get("issuer").cloned().or(issuer_from_label);
        let algorithm = params.get("algorithm").cloned();

        let digits = params
            .get("digits")
            .map(|s| s.parse::<u32>())
            .transpose()
            .map_err(|_| ParseError::InvalidParameter("digits".to_string()))?;

        let period = params
            .get("period")
            .map(|s| s.parse::<u64>())
            .transpose()
            .map_err(|_| ParseError::InvalidParameter("period".to_string()))?;

        Ok(OtpUri {
            label,
            issuer,
            secret,
            algorithm,
            digits,
            period,
        })
    }

    /// Only SHA1, 6 digits and a 30 second period can be generated
    pub fn ensure_supported(&self) -> Result<(), ParseError> {
        match &self.algorithm {
            Some(algorithm) if !algorithm.eq_ignore_ascii_case("SHA1") => {
                return Err(ParseError::Unsupported(format!("algorithm={}", algorithm)));
            }
            _ => {}
        }
        match self.digits {
            Some(digits) if digits != DIGITS => {
                return Err(ParseError::Unsupported(format!("digits={}", digits)));
            }
            _ => {}
        }
        match self.period {
            Some(period) if period != PERIOD => {
                return Err(ParseError::Unsupported(format!("period={}", period)));
            }
            _ => {}
        }
        Ok(())
    }

    fn parse_label(path: &str) -> (Option<String>, Option<String>) {
        if path.is_empty() {
            return (None, None);
        }

        let decoded = urlencoding::decode(path).unwrap_or_else(|_| path.into());

        match decoded.split_once(':') {
            Some((issuer, _account)) if !issuer.trim().is_empty() => {
                (Some(decoded.to_string()), Some(issuer.trim().to_string()))
            }
            _ => (Some(decoded.to_string()), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_uri() {
        let uri = OtpUri::parse(
            "otpauth://totp/Example:alice@google.com?secret=JBSWY3DPEHPK3PXP&issuer=Example&algorithm=SHA1&digits=6&period=30",
        )
        .unwrap();

        assert_eq!(uri.secret, "JBSWY3DPEHPK3PXP");
        assert_eq!(uri.issuer.as_deref(), Some("Example"));
        assert_eq!(uri.label.as_deref(), Some("Example:alice@google.com"));
        assert_eq!(uri.digits, Some(6));
        assert_eq!(uri.period, Some(30));
        assert!(uri.ensure_supported().is_ok());
    }

    #[test]
    fn test_issuer_from_encoded_label() {
        let uri = OtpUri::parse("otpauth://totp/ACME%20Co:john?secret=JBSWY3DPEHPK3PXP").unwrap();
        assert_eq!(uri.issuer.as_deref(), Some("ACME Co"));
        assert!(uri.ensure_supported().is_ok());
    }

    #[test]
    fn test_rejects_hotp_and_missing_secret() {
        assert_eq!(
            OtpUri::parse("otpauth://hotp/x?secret=JBSWY3DPEHPK3PXP&counter=0").unwrap_err(),
            ParseError::InvalidOtpType("hotp".to_string())
        );
        assert_eq!(
            OtpUri::parse("otpauth://totp/x?issuer=y").unwrap_err(),
            ParseError::MissingSecret
        );
        assert!(matches!(
            OtpUri::parse("otpauth://totp/x?secret=AAAA&digits=six"),
            Err(ParseError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unsupported_parameters() {
        for query in ["algorithm=SHA256", "digits=8", "period=60"] {
            let uri =
                OtpUri::parse(&format!("otpauth://totp/x?secret=JBSWY3DPEHPK3PXP&{query}"))
                    .unwrap();
            assert!(matches!(
                uri.ensure_supported(),
                Err(ParseError::Unsupported(_))
            ));
        }
    }

    #[test]
    fn test_is_uri() {
        assert!(OtpUri::is_uri("otpauth://totp/x?secret=A"));
        assert!(OtpUri::is_uri("OTPAUTH://TOTP/X?SECRET=A"));
        assert!(!OtpUri::is_uri("JBSWY3DPEHPK3PXP"));
        assert!(!OtpUri::is_uri("otp"));
        assert!(!OtpUri::is_uri("otpauth:/totp/x"));
        assert!(!OtpUri::is_uri("https://totp/x?secret=A"));
    }
}
