//! HMAC-SHA256 computation and constant-time comparison.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::SignatureError;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex-encoded HMAC-SHA256 of `body` under `secret`.
///
/// Used for outbound signing and by tests to build valid inbound requests.
pub fn sign(body: &[u8], secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify that `signature_hex` is the HMAC-SHA256 of `body` under `secret`.
///
/// The comparison is constant-time ([`Mac::verify_slice`]). A mismatch is
/// `Ok(false)`, never an error; only signatures that are not valid hex of
/// digest length produce [`SignatureError::MalformedSignature`].
pub fn verify_signature(
    body: &[u8],
    signature_hex: &str,
    secret: &[u8],
) -> Result<bool, SignatureError> {
    let supplied = hex::decode(signature_hex.trim())
        .map_err(|e| SignatureError::MalformedSignature(e.to_string()))?;
    if supplied.len() != 32 {
        return Err(SignatureError::MalformedSignature(format!(
            "expected 32-byte digest, got {}",
            supplied.len()
        )));
    }

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 accepts any key length");
    mac.update(body);
    Ok(mac.verify_slice(&supplied).is_ok())
}
