// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Svix webhook signature verification (used by Clerk).
//!
//! Signed content is `"{svix-id}.{svix-timestamp}.{raw body}"`, HMAC-SHA256
//! keyed with the base64 part of the `whsec_...` secret. The `svix-signature`
//! header carries one or more space-separated `v1,<base64 mac>` entries; any
//! one of them matching is enough.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed clock skew between sender and receiver, in seconds.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

const SECRET_PREFIX: &str = "whsec_";

/// Values of the three Svix headers.
#[derive(Debug, Clone, Copy)]
pub struct SvixHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("webhook secret is not valid base64")]
    InvalidSecret,

    #[error("svix-timestamp is not a unix timestamp")]
    InvalidTimestamp,

    #[error("svix-timestamp is too old")]
    TimestampTooOld,

    #[error("svix-timestamp is too far in the future")]
    TimestampTooNew,

    #[error("no matching signature found")]
    NoMatchingSignature,
}

/// Verifier for a single signing secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    mac: HmacSha256,
}

impl WebhookVerifier {
    /// Build a verifier from a `whsec_...` secret (the prefix is optional).
    pub fn new(secret: &str) -> Result<Self, SignatureError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = STANDARD
            .decode(encoded)
            .map_err(|_| SignatureError::InvalidSecret)?;
        let mac = HmacSha256::new_from_slice(&key).map_err(|_| SignatureError::InvalidSecret)?;
        Ok(Self { mac })
    }

    /// Verify a payload against the current time.
    pub fn verify(&self, headers: SvixHeaders<'_>, body: &[u8]) -> Result<(), SignatureError> {
        self.verify_at(headers, body, chrono::Utc::now().timestamp())
    }

    /// Verify a payload as of `now` (unix seconds).
    pub fn verify_at(
        &self,
        headers: SvixHeaders<'_>,
        body: &[u8],
        now: i64,
    ) -> Result<(), SignatureError> {
        let timestamp: i64 = headers
            .timestamp
            .trim()
            .parse()
            .map_err(|_| SignatureError::InvalidTimestamp)?;

        // The header is untrusted; extreme values must not overflow
        match now.checked_sub(timestamp) {
            Some(age) if age > TIMESTAMP_TOLERANCE_SECS => {
                return Err(SignatureError::TimestampTooOld)
            }
            Some(age) if age < -TIMESTAMP_TOLERANCE_SECS => {
                return Err(SignatureError::TimestampTooNew)
            }
            Some(_) => {}
            None if timestamp > now => return Err(SignatureError::TimestampTooNew),
            None => return Err(SignatureError::TimestampTooOld),
        }

        let expected = self.compute(headers.id, timestamp, body);

        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == "v1")
            .any(|(_, signature)| bool::from(signature.as_bytes().ct_eq(expected.as_bytes())));

        if matched {
            Ok(())
        } else {
            Err(SignatureError::NoMatchingSignature)
        }
    }

    /// Produce a `v1,<signature>` header value for a payload.
    pub fn sign(&self, msg_id: &str, timestamp: i64, body: &[u8]) -> String {
        format!("v1,{}", self.compute(msg_id, timestamp, body))
    }

    fn compute(&self, msg_id: &str, timestamp: i64, body: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";
    const NOW: i64 = 1_700_000_000;

    fn headers<'a>(timestamp: &'a str, signature: &'a str) -> SvixHeaders<'a> {
        SvixHeaders {
            id: "msg_p5jXN8AQM9LWM0D4loKWxJek",
            timestamp,
            signature,
        }
    }

    #[test]
    fn test_sign_then_verify() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let body = br#"{"type":"user.created"}"#;
        let sig = verifier.sign("msg_p5jXN8AQM9LWM0D4loKWxJek", NOW, body);
        let ts = NOW.to_string();

        assert_eq!(verifier.verify_at(headers(&ts, &sig), body, NOW), Ok(()));
    }

    #[test]
    fn test_any_listed_signature_may_match() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let body = b"{}";
        let sig = verifier.sign("msg_p5jXN8AQM9LWM0D4loKWxJek", NOW, body);
        let header = format!("v1,bm90IGl0 v2,ignored {sig}");
        let ts = NOW.to_string();

        assert_eq!(verifier.verify_at(headers(&ts, &header), body, NOW), Ok(()));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let sig = verifier.sign("msg_p5jXN8AQM9LWM0D4loKWxJek", NOW, b"{\"a\":1}");
        let ts = NOW.to_string();

        assert_eq!(
            verifier.verify_at(headers(&ts, &sig), b"{\"a\":2}", NOW),
            Err(SignatureError::NoMatchingSignature)
        );
    }

    #[test]
    fn test_timestamp_window() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let old = NOW - TIMESTAMP_TOLERANCE_SECS - 1;
        let sig = verifier.sign("msg_p5jXN8AQM9LWM0D4loKWxJek", old, b"{}");
        let ts = old.to_string();
        assert_eq!(
            verifier.verify_at(headers(&ts, &sig), b"{}", NOW),
            Err(SignatureError::TimestampTooOld)
        );

        let future = NOW + TIMESTAMP_TOLERANCE_SECS + 1;
        let ts = future.to_string();
        assert_eq!(
            verifier.verify_at(headers(&ts, "v1,x"), b"{}", NOW),
            Err(SignatureError::TimestampTooNew)
        );

        assert_eq!(
            verifier.verify_at(headers("yesterday", "v1,x"), b"{}", NOW),
            Err(SignatureError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_extreme_timestamps_are_out_of_window() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let min = i64::MIN.to_string();
        let max = i64::MAX.to_string();

        assert_eq!(
            verifier.verify_at(headers(&min, "v1,x"), b"{}", NOW),
            Err(SignatureError::TimestampTooOld)
        );
        assert_eq!(
            verifier.verify_at(headers(&max, "v1,x"), b"{}", NOW),
            Err(SignatureError::TimestampTooNew)
        );
        // Both overflow directions of `now - timestamp`
        assert_eq!(
            verifier.verify_at(headers(&min, "v1,x"), b"{}", i64::MAX),
            Err(SignatureError::TimestampTooOld)
        );
        assert_eq!(
            verifier.verify_at(headers(&max, "v1,x"), b"{}", i64::MIN),
            Err(SignatureError::TimestampTooNew)
        );
        assert_eq!(
            verifier.verify(headers(&min, "v1,x"), b"{}"),
            Err(SignatureError::TimestampTooOld)
        );
    }

    #[test]
    fn test_invalid_secret() {
        assert!(matches!(
            WebhookVerifier::new("whsec_***not base64***"),
            Err(SignatureError::InvalidSecret)
        ));
    }
}
