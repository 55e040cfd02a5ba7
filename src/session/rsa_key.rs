//! RSA key material for credential submission
//!
//! The login page hands out a fresh RSA public key (hex modulus and
//! exponent) per visit. Credentials are encrypted with PKCS#1 v1.5 and sent
//! as lowercase hex, matching what the page's own script produces.

use crate::{Error, Result, types::wire::RsaModulusData};
use regex::Regex;
use rsa::rand_core::OsRng;
use rsa::{BigUint, Pkcs1v15Encrypt, RsaPublicKey};
use std::sync::OnceLock;

/// Server-issued RSA public key; fetched per login attempt and used once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaKeyMaterial {
    modulus_hex: String,
    exponent_hex: String,
}

impl RsaKeyMaterial {
    pub fn new(modulus_hex: impl Into<String>, exponent_hex: impl Into<String>) -> Self {
        Self {
            modulus_hex: modulus_hex.into(),
            exponent_hex: exponent_hex.into(),
        }
    }

    /// Key from the `selectRsaModulus.do` JSON, if both parts are present
    pub fn from_api(data: &RsaModulusData) -> Option<Self> {
        match (&data.rsa_modulus, &data.public_exponent) {
            (Some(modulus), Some(exponent)) if !modulus.is_empty() && !exponent.is_empty() => {
                Some(Self::new(modulus, exponent))
            }
            _ => None,
        }
    }

    /// Key scraped from the inline `var rsaModulus = '...'` and
    /// `var publicExponent = '...'` literals on the login page
    pub fn from_login_page(html: &str) -> Option<Self> {
        static MODULUS: OnceLock<Option<Regex>> = OnceLock::new();
        static EXPONENT: OnceLock<Option<Regex>> = OnceLock::new();

        let modulus_re = MODULUS
            .get_or_init(|| Regex::new(r"var\s+rsaModulus\s*=\s*'([a-fA-F0-9]+)'").ok())
            .as_ref()?;
        let exponent_re = EXPONENT
            .get_or_init(|| Regex::new(r"var\s+publicExponent\s*=\s*'([a-fA-F0-9]+)'").ok())
            .as_ref()?;

        let modulus = modulus_re.captures(html)?.get(1)?.as_str();
        let exponent = exponent_re.captures(html)?.get(1)?.as_str();
        Some(Self::new(modulus, exponent))
    }

    pub fn modulus_hex(&self) -> &str {
        &self.modulus_hex
    }

    pub fn exponent_hex(&self) -> &str {
        &self.exponent_hex
    }

    fn public_key(&self) -> Result<RsaPublicKey> {
        let n = parse_hex(&self.modulus_hex, "modulus")?;
        let e = parse_hex(&self.exponent_hex, "exponent")?;
        RsaPublicKey::new(n, e).map_err(|e| Error::encryption(format!("Invalid RSA key: {}", e)))
    }

    /// Encrypt `plaintext`, returning lowercase hex ciphertext
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let key = self.public_key()?;
        let ciphertext = key
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext.as_bytes())
            .map_err(|e| Error::encryption(format!("RSA encryption failed: {}", e)))?;
        Ok(hex::encode(ciphertext))
    }
}

fn parse_hex(value: &str, what: &str) -> Result<BigUint> {
    let trimmed = value.trim();
    let padded = if trimmed.len() % 2 == 1 {
        format!("0{}", trimmed)
    } else {
        trimmed.to_string()
    };
    let bytes = hex::decode(&padded)
        .map_err(|e| Error::encryption(format!("Invalid RSA {} hex: {}", what, e)))?;
    Ok(BigUint::from_bytes_be(&bytes))
}
