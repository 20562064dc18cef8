use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::Digest as _;

use crate::error::TypeError;

/// Checksum algorithms accepted on binary uploads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    /// Token used in `Digest` headers.
    pub fn header_token(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha-256",
            Self::Blake3 => "blake3",
        }
    }

    /// URN prefix used when recording the digest in a description graph.
    pub fn urn_prefix(&self) -> &'static str {
        match self {
            Self::Sha256 => "urn:sha256:",
            Self::Blake3 => "urn:blake3:",
        }
    }

    pub fn hash(&self, data: &[u8]) -> String {
        match self {
            Self::Sha256 => hex::encode(sha2::Sha256::digest(data)),
            Self::Blake3 => blake3::hash(data).to_hex().to_string(),
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha-256" | "sha256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(TypeError::UnknownDigestAlgorithm(other.to_string())),
        }
    }
}

/// A hex-encoded content digest.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest {
    pub algorithm: DigestAlgorithm,
    pub value: String,
}

impl Digest {
    pub fn new(algorithm: DigestAlgorithm, value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into().to_ascii_lowercase();
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidDigest(value));
        }
        Ok(Self { algorithm, value })
    }

    pub fn compute(algorithm: DigestAlgorithm, data: &[u8]) -> Self {
        Self {
            algorithm,
            value: algorithm.hash(data),
        }
    }

    pub fn verify(&self, data: &[u8]) -> bool {
        self.algorithm.hash(data) == self.value
    }

    /// `sha-256=<hex>` form.
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.algorithm.header_token(), self.value)
    }

    pub fn from_header_value(s: &str) -> Result<Self, TypeError> {
        let (alg, value) = s
            .trim()
            .split_once('=')
            .ok_or_else(|| TypeError::InvalidDigest(s.to_string()))?;
        Self::new(alg.parse()?, value)
    }

    /// `urn:sha256:<hex>` form.
    pub fn to_urn(&self) -> String {
        format!("{}{}", self.algorithm.urn_prefix(), self.value)
    }

    pub fn from_urn(s: &str) -> Result<Self, TypeError> {
        for algorithm in [DigestAlgorithm::Sha256, DigestAlgorithm::Blake3] {
            if let Some(value) = s.strip_prefix(algorithm.urn_prefix()) {
                return Self::new(algorithm, value);
            }
        }
        Err(TypeError::InvalidDigest(s.to_string()))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_urn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_value() {
        let d = Digest::compute(DigestAlgorithm::Sha256, b"abc");
        assert_eq!(
            d.value,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(d.verify(b"abc"));
        assert!(!d.verify(b"abd"));
    }

    #[test]
    fn header_form() {
        let d = Digest::compute(DigestAlgorithm::Blake3, b"content");
        let header = d.to_header_value();
        assert!(header.starts_with("blake3="));
        assert_eq!(Digest::from_header_value(&header).unwrap(), d);
    }

    #[test]
    fn urn_form() {
        let d = Digest::compute(DigestAlgorithm::Sha256, b"content");
        assert_eq!(Digest::from_urn(&d.to_urn()).unwrap(), d);
        assert!(Digest::from_urn("urn:md5:abc").is_err());
    }

    #[test]
    fn values_are_normalized_and_validated() {
        let d = Digest::new(DigestAlgorithm::Sha256, "ABCDEF").unwrap();
        assert_eq!(d.value, "abcdef");
        assert!(Digest::new(DigestAlgorithm::Sha256, "xyz").is_err());
        assert!(matches!(
            "md5".parse::<DigestAlgorithm>(),
            Err(TypeError::UnknownDigestAlgorithm(_))
        ));
    }
}
