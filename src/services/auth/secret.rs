/*
 * Responsibility
 * - HMAC signing secret を保持する (プロセス起動時に一度だけ読み込み、以後 immutable)
 * - 設定値の encoding (base64 / raw) を解釈する
 * - key material は Debug / log に出さない
 */
use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

// Padding optional, either alphabet: secrets handed to the old login service
// were accepted in any of these shapes.
const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// How `TOKEN_SECRET` is turned into key bytes.
///
/// `Base64` is the default: tokens minted by the existing admin login service are
/// keyed with the base64-decoded property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretEncoding {
    #[default]
    Base64,
    Raw,
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownSecretEncoding;

impl FromStr for SecretEncoding {
    type Err = UnknownSecretEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base64" => Ok(Self::Base64),
            "raw" => Ok(Self::Raw),
            _ => Err(UnknownSecretEncoding),
        }
    }
}

/// Key bytes used to verify token signatures.
///
/// An empty secret is a valid value: it means "not configured", and every
/// token verified against it is denied.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Decode a configured value. Anything that does not decode collapses to
    /// the empty secret.
    pub fn decode(value: &str, encoding: SecretEncoding) -> Self {
        match encoding {
            SecretEncoding::Raw => Self::new(value.as_bytes()),
            SecretEncoding::Base64 => match decode_base64(value.trim()) {
                Ok(bytes) => Self(bytes),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "TOKEN_SECRET is not valid base64; all tokens will be denied"
                    );
                    Self::empty()
                }
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

fn decode_base64(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD_LENIENT
        .decode(value)
        .or_else(|_| URL_SAFE_LENIENT.decode(value))
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_parses_case_insensitively() {
        assert_eq!("BASE64".parse(), Ok(SecretEncoding::Base64));
        assert_eq!(" raw ".parse(), Ok(SecretEncoding::Raw));
        assert_eq!("hex".parse::<SecretEncoding>(), Err(UnknownSecretEncoding));
    }

    #[test]
    fn base64_and_raw_agree_on_same_bytes() {
        let raw = SigningSecret::decode("admin-secret", SecretEncoding::Raw);
        let b64 = SigningSecret::decode("YWRtaW4tc2VjcmV0", SecretEncoding::Base64);
        assert_eq!(raw, b64);
    }

    #[test]
    fn unpadded_base64_is_accepted() {
        let padded = SigningSecret::decode("YWRtaW4tc2VjcmV0MQ==", SecretEncoding::Base64);
        let unpadded = SigningSecret::decode("YWRtaW4tc2VjcmV0MQ", SecretEncoding::Base64);
        assert_eq!(padded, SigningSecret::new("admin-secret1"));
        assert_eq!(unpadded, padded);
    }

    #[test]
    fn url_safe_alphabet_is_accepted() {
        let standard = SigningSecret::decode("+/8=", SecretEncoding::Base64);
        let url_safe = SigningSecret::decode("-_8", SecretEncoding::Base64);
        assert_eq!(standard, SigningSecret::new(vec![0xfb, 0xff]));
        assert_eq!(url_safe, standard);
    }

    #[test]
    fn undecodable_base64_is_empty() {
        let secret = SigningSecret::decode("not base64 !!", SecretEncoding::Base64);
        assert!(secret.is_empty());
    }

    #[test]
    fn debug_does_not_print_key_material() {
        let secret = SigningSecret::new("super-secret");
        let printed = format!("{:?}", secret);
        assert!(!printed.contains("super-secret"));
    }
}
