use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Accepted skew between the timestamp in the signature header and the clock
/// of the verifying host. Stripe retries with fresh signatures, so a tight
/// window costs nothing.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SignatureError {
    #[error("malformed signature header")]
    Malformed,
    #[error("signature timestamp outside tolerance")]
    StaleTimestamp,
    #[error("signature mismatch")]
    Mismatch,
}

/// Hex HMAC-SHA256 over `"{timestamp}.{payload}"`, the scheme behind the
/// `v1=` entries of a `Stripe-Signature` header.
pub fn compute_signature(payload: &str, secret: &str, timestamp: i64) -> String {
    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(signed_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Builds a full `Stripe-Signature` header value for `payload`. Used by tests
/// and local delivery tooling.
pub fn signature_header(payload: &str, secret: &str, timestamp: i64) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        compute_signature(payload, secret, timestamp)
    )
}

fn parse_header(header: &str) -> Result<(i64, &str), SignatureError> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        if let Some(ts) = part.trim().strip_prefix("t=") {
            timestamp = Some(ts.parse::<i64>().map_err(|_| SignatureError::Malformed)?);
        } else if let Some(sig) = part.trim().strip_prefix("v1=") {
            signature = Some(sig);
        }
    }

    match (timestamp, signature) {
        (Some(ts), Some(sig)) if !sig.is_empty() => Ok((ts, sig)),
        _ => Err(SignatureError::Malformed),
    }
}

/// Verifies a `Stripe-Signature` header against the raw request bytes. The
/// bytes must be exactly what arrived on the wire; re-encoding the JSON can
/// change the byte layout and break the signature.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let (timestamp, provided) = parse_header(header)?;

    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::StaleTimestamp);
    }

    let payload_str = std::str::from_utf8(payload).map_err(|_| SignatureError::Malformed)?;
    let expected = compute_signature(payload_str, secret, timestamp);

    if subtle::ConstantTimeEq::ct_eq(expected.as_bytes(), provided.as_bytes()).unwrap_u8() == 0u8 {
        return Err(SignatureError::Mismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &str = r#"{"id":"evt_123","type":"checkout.session.completed"}"#;

    fn now() -> i64 {
        1_700_000_000
    }

    #[test]
    fn accepts_valid_signature() {
        let header = signature_header(PAYLOAD, SECRET, now());
        assert_eq!(
            verify_signature(PAYLOAD.as_bytes(), &header, SECRET, now()),
            Ok(())
        );
    }

    #[test]
    fn accepts_signature_within_tolerance() {
        let header = signature_header(PAYLOAD, SECRET, now() - SIGNATURE_TOLERANCE_SECS + 1);
        assert_eq!(
            verify_signature(PAYLOAD.as_bytes(), &header, SECRET, now()),
            Ok(())
        );
    }

    #[test]
    fn rejects_modified_payload() {
        let header = signature_header(PAYLOAD, SECRET, now());
        let tampered = PAYLOAD.replace("evt_123", "evt_999");
        assert_eq!(
            verify_signature(tampered.as_bytes(), &header, SECRET, now()),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_wrong_secret() {
        let header = signature_header(PAYLOAD, "whsec_other", now());
        assert_eq!(
            verify_signature(PAYLOAD.as_bytes(), &header, SECRET, now()),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_stale_timestamp() {
        let stale = now() - SIGNATURE_TOLERANCE_SECS - 60;
        let header = signature_header(PAYLOAD, SECRET, stale);
        assert_eq!(
            verify_signature(PAYLOAD.as_bytes(), &header, SECRET, now()),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn rejects_future_timestamp() {
        let future = now() + SIGNATURE_TOLERANCE_SECS + 60;
        let header = signature_header(PAYLOAD, SECRET, future);
        assert_eq!(
            verify_signature(PAYLOAD.as_bytes(), &header, SECRET, now()),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn rejects_missing_timestamp() {
        let sig = compute_signature(PAYLOAD, SECRET, now());
        let header = format!("v1={}", sig);
        assert_eq!(
            verify_signature(PAYLOAD.as_bytes(), &header, SECRET, now()),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn rejects_missing_signature_part() {
        let header = format!("t={}", now());
        assert_eq!(
            verify_signature(PAYLOAD.as_bytes(), &header, SECRET, now()),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn rejects_garbage_header() {
        for header in ["", "nonsense", "t=notanumber,v1=abc", "t=,v1="] {
            assert_eq!(
                verify_signature(PAYLOAD.as_bytes(), header, SECRET, now()),
                Err(SignatureError::Malformed),
                "{header}"
            );
        }
    }

    #[test]
    fn ignores_extra_scheme_entries() {
        let header = format!(
            "t={},v0=legacy,v1={}",
            now(),
            compute_signature(PAYLOAD, SECRET, now())
        );
        assert_eq!(
            verify_signature(PAYLOAD.as_bytes(), &header, SECRET, now()),
            Ok(())
        );
    }
}
