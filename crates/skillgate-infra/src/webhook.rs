//! Webhook signature verification and event parsing.
//!
//! The KYC provider signs every delivery with a Stripe-style header:
//! `t=<unix-seconds>,v1=<hex hmac-sha256 of "{t}.{body}">`. Verification
//! uses constant-time comparison and a timestamp tolerance window; only a
//! payload that passed verification is parsed into a [`WebhookEvent`].

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use skillgate_types::identity::{RawWebhookEvent, WebhookEvent};

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Signed deliveries older (or newer) than this are rejected.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Errors that can occur during webhook verification.
///
/// Everything except `MalformedPayload` maps to `SignatureInvalid` (400)
/// at the API boundary; the distinction is kept for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Signature header missing from the request.
    #[error("missing signature header")]
    MissingHeader,

    /// Signature header present but not parseable.
    #[error("malformed signature header")]
    MalformedHeader,

    /// HMAC comparison failed.
    #[error("signature verification failed")]
    SignatureMismatch,

    /// Signed timestamp outside the tolerance window.
    #[error("signature timestamp outside tolerance")]
    TimestampOutOfTolerance,

    /// Invalid HMAC key.
    #[error("invalid HMAC key: {0}")]
    InvalidKey(String),

    /// Body passed verification but is not a valid event payload.
    #[error("unparseable webhook payload: {0}")]
    MalformedPayload(String),
}

/// Parsed signature header.
#[derive(Debug, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// All `v1` signatures in the header (the provider may include several
    /// during secret rotation); any single match verifies.
    pub signatures: Vec<Vec<u8>>,
}

/// Parse `t=<unix>,v1=<hex>[,v1=<hex>...]`.
pub fn parse_signature_header(header: &str) -> Result<SignatureHeader, WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            return Err(WebhookError::MalformedHeader);
        };
        match key {
            "t" => {
                timestamp = Some(value.parse().map_err(|_| WebhookError::MalformedHeader)?);
            }
            "v1" => {
                signatures.push(hex_decode(value).map_err(|_| WebhookError::MalformedHeader)?);
            }
            // Unknown scheme versions are skipped, not rejected.
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader);
    }
    Ok(SignatureHeader { timestamp, signatures })
}

/// Verify a signed delivery.
///
/// The signed message is `"{t}.{body}"`; the HMAC check is constant-time
/// via the hmac crate's `verify_slice`.
pub fn verify_signature(
    secret: &[u8],
    body: &[u8],
    signature_header: &str,
    now: DateTime<Utc>,
) -> Result<(), WebhookError> {
    let header = parse_signature_header(signature_header)?;

    if (now.timestamp() - header.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(WebhookError::TimestampOutOfTolerance);
    }

    for candidate in &header.signatures {
        let mut mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| WebhookError::InvalidKey(e.to_string()))?;
        mac.update(header.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        if mac.verify_slice(candidate).is_ok() {
            return Ok(());
        }
    }
    Err(WebhookError::SignatureMismatch)
}

/// Verify and parse a raw delivery into a [`WebhookEvent`].
///
/// No session state may be touched unless this returns `Ok`.
pub fn verify_and_parse(
    raw_body: &[u8],
    signature_header: Option<&str>,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<WebhookEvent, WebhookError> {
    let header = signature_header.ok_or(WebhookError::MissingHeader)?;
    verify_signature(secret, raw_body, header, now)?;

    let raw: RawWebhookEvent = serde_json::from_slice(raw_body)
        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;
    Ok(raw.into_event())
}

/// Compute the hex signature for a body at a given timestamp.
///
/// Used to generate test deliveries and documented signing examples.
pub fn compute_signature_hex(
    secret: &[u8],
    body: &[u8],
    timestamp: i64,
) -> Result<String, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| WebhookError::InvalidKey(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(hex_encode(&mac.finalize().into_bytes()))
}

/// Build a complete signature header for a body at a given timestamp.
pub fn sign_header(secret: &[u8], body: &[u8], timestamp: i64) -> Result<String, WebhookError> {
    let sig = compute_signature_hex(secret, body, timestamp)?;
    Ok(format!("t={timestamp},v1={sig}"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Decode a hex string to bytes.
fn hex_decode(hex: &str) -> Result<Vec<u8>, ()> {
    if hex.len() % 2 != 0 || hex.is_empty() {
        return Err(());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ()))
        .collect()
}

/// Encode bytes to a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const SECRET: &[u8] = b"whsec_test_secret";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn signed(body: &[u8]) -> String {
        sign_header(SECRET, body, now().timestamp()).unwrap()
    }

    #[test]
    fn test_valid_signature_verifies() {
        let body = br#"{"type":"x","data":{"object":{"id":"vs_1"}}}"#;
        assert!(verify_signature(SECRET, body, &signed(body), now()).is_ok());
    }

    #[test]
    fn test_wrong_body_fails() {
        let body = b"payload";
        let header = signed(body);
        assert!(matches!(
            verify_signature(SECRET, b"different", &header, now()),
            Err(WebhookError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let body = b"payload";
        let header = signed(body);
        assert!(matches!(
            verify_signature(b"whsec_other", body, &header, now()),
            Err(WebhookError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_stale_timestamp_fails() {
        let body = b"payload";
        let stale = now().timestamp() - SIGNATURE_TOLERANCE_SECS - 1;
        let header = sign_header(SECRET, body, stale).unwrap();
        assert!(matches!(
            verify_signature(SECRET, body, &header, now()),
            Err(WebhookError::TimestampOutOfTolerance)
        ));
    }

    #[test]
    fn test_rotation_accepts_any_matching_v1() {
        let body = b"payload";
        let good = compute_signature_hex(SECRET, body, now().timestamp()).unwrap();
        let header = format!(
            "t={},v1={},v1={}",
            now().timestamp(),
            "ab".repeat(32),
            good
        );
        assert!(verify_signature(SECRET, body, &header, now()).is_ok());
    }

    #[test]
    fn test_malformed_headers_rejected() {
        let body = b"payload";
        for header in ["", "t=abc,v1=00", "v1=00ff", "t=123", "t=123,v1=zz"] {
            assert!(
                verify_signature(SECRET, body, header, now()).is_err(),
                "header {header:?} should fail"
            );
        }
    }

    #[test]
    fn test_verify_and_parse_missing_header() {
        assert!(matches!(
            verify_and_parse(b"{}", None, SECRET, now()),
            Err(WebhookError::MissingHeader)
        ));
    }

    #[test]
    fn test_verify_and_parse_roundtrip() {
        let body = br#"{
            "type": "identity.verification_session.canceled",
            "data": { "object": { "id": "vs_42" } }
        }"#;
        let header = signed(body);
        let event = verify_and_parse(body, Some(&header), SECRET, now()).unwrap();
        assert_eq!(
            event,
            WebhookEvent::SessionCanceled {
                session_id: "vs_42".to_string()
            }
        );
    }

    #[test]
    fn test_verified_body_with_invalid_json_is_malformed_payload() {
        let body = b"not json at all";
        let header = signed(body);
        assert!(matches!(
            verify_and_parse(body, Some(&header), SECRET, now()),
            Err(WebhookError::MalformedPayload(_))
        ));
    }

    // The signed message is exactly "{t}.{body}" -- computing the HMAC
    // over the concatenated bytes directly must agree.
    #[test]
    fn test_signed_message_layout() {
        let body = b"payload";
        let ts = 1_750_000_000_i64;
        let streamed = compute_signature_hex(SECRET, body, ts).unwrap();

        let mut mac = HmacSha256::new_from_slice(SECRET).unwrap();
        mac.update(format!("{ts}.payload").as_bytes());
        let direct = hex_encode(&mac.finalize().into_bytes());

        assert_eq!(streamed, direct);
    }

    #[test]
    fn test_hex_encode_decode_roundtrip() {
        let data = b"Hello, World!";
        let hex = hex_encode(data);
        assert_eq!(hex_decode(&hex).unwrap(), data);
    }

    #[test]
    fn test_hex_decode_invalid() {
        assert!(hex_decode("0").is_err()); // Odd length
        assert!(hex_decode("zz").is_err()); // Invalid chars
        assert!(hex_decode("").is_err()); // Empty
    }
}
