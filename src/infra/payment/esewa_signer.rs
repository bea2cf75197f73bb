use crate::domain::ports::SignatureVerifier;
use base64::{Engine as _, engine::general_purpose};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// eSewa v2 signatures: base64(HMAC-SHA256(secret, payload)).
pub struct EsewaSigner {
    secret_key: String,
}

impl EsewaSigner {
    pub fn new(secret_key: String) -> Self {
        Self { secret_key }
    }

    fn mac(&self, payload: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes()).ok()?;
        mac.update(payload.as_bytes());
        Some(mac)
    }
}

impl SignatureVerifier for EsewaSigner {
    fn sign(&self, payload: &str) -> String {
        match self.mac(payload) {
            Some(mac) => general_purpose::STANDARD.encode(mac.finalize().into_bytes()),
            None => String::new(),
        }
    }

    fn verify(&self, payload: &str, signature: &str) -> bool {
        let provided = match general_purpose::STANDARD.decode(signature.trim()) {
            Ok(bytes) => bytes,
            Err(_) => {
                warn!("Payment signature is not valid base64");
                return false;
            }
        };

        match self.mac(payload) {
            // constant-time comparison
            Some(mac) => mac.verify_slice(&provided).is_ok(),
            None => false,
        }
    }
}
