use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Result, SlackError};

type HmacSha256 = Hmac<Sha256>;

/// Requests older (or newer) than this are rejected outright, even with a
/// valid signature.
pub const REPLAY_WINDOW_SECS: i64 = 300;

/// Validates that an inbound request genuinely originated from Slack.
///
/// Recomputes HMAC-SHA256 over `v0:{timestamp}:{raw_body}` with the
/// signing secret and compares against the `v0=<hex>` header value in
/// constant time. A missing secret is an error, never a pass.
pub struct SignatureVerifier {
    signing_secret: Option<String>,
}

impl SignatureVerifier {
    pub fn new(signing_secret: Option<String>) -> Self {
        Self { signing_secret }
    }

    pub fn verify(&self, timestamp: &str, signature: &str, raw_body: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();
        self.verify_at(timestamp, signature, raw_body, now)
    }

    fn verify_at(&self, timestamp: &str, signature: &str, raw_body: &str, now: i64) -> Result<bool> {
        let secret = self
            .signing_secret
            .as_deref()
            .ok_or_else(|| SlackError::Config("signing secret not set".into()))?;

        let Ok(ts) = timestamp.parse::<i64>() else {
            return Ok(false);
        };
        if (now - ts).abs() > REPLAY_WINDOW_SECS {
            return Ok(false);
        }

        let Some(sig_hex) = signature.strip_prefix("v0=") else {
            return Ok(false);
        };
        let Ok(supplied) = hex::decode(sig_hex) else {
            return Ok(false);
        };

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| SlackError::Config("invalid signing secret".into()))?;
        mac.update(format!("v0:{timestamp}:{raw_body}").as_bytes());

        Ok(mac.verify_slice(&supplied).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";

    fn sign(timestamp: &str, body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("v0:{timestamp}:{body}").as_bytes());
        format!("v0={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(Some(SECRET.to_string()))
    }

    #[test]
    fn accepts_valid_signature_inside_window() {
        let sig = sign("1000", "{\"type\":\"event_callback\"}");
        let ok = verifier()
            .verify_at("1000", &sig, "{\"type\":\"event_callback\"}", 1010)
            .unwrap();
        assert!(ok);
    }

    #[test]
    fn rejects_stale_timestamp_even_with_valid_hmac() {
        let sig = sign("1000", "body");
        let ok = verifier().verify_at("1000", &sig, "body", 1000 + 301).unwrap();
        assert!(!ok);
    }

    #[test]
    fn rejects_future_timestamp_outside_window() {
        let sig = sign("2000", "body");
        let ok = verifier().verify_at("2000", &sig, "body", 2000 - 301).unwrap();
        assert!(!ok);
    }

    #[test]
    fn rejects_tampered_body() {
        let sig = sign("1000", "body");
        let ok = verifier().verify_at("1000", &sig, "other body", 1000).unwrap();
        assert!(!ok);
    }

    #[test]
    fn rejects_malformed_signature_header() {
        assert!(!verifier().verify_at("1000", "sha256=zzz", "body", 1000).unwrap());
        assert!(!verifier().verify_at("1000", "v0=nothex", "body", 1000).unwrap());
    }

    #[test]
    fn rejects_non_numeric_timestamp() {
        let sig = sign("1000", "body");
        assert!(!verifier().verify_at("soon", &sig, "body", 1000).unwrap());
    }

    #[test]
    fn missing_secret_fails_closed() {
        let verifier = SignatureVerifier::new(None);
        assert!(matches!(
            verifier.verify_at("1000", "v0=00", "body", 1000),
            Err(SlackError::Config(_))
        ));
    }
}
