use crate::error::{PaymentError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes the gateway's payment signature: lowercase hex of
/// HMAC-SHA256(secret, "{order_id}|{payment_id}").
pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| PaymentError::ValidationError("Signing key rejected".to_string()))?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a client-submitted signature in constant time.
///
/// The error never says which part mismatched.
pub fn verify(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> Result<()> {
    let expected = sign(secret, order_id, payment_id)?;
    if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
        Ok(())
    } else {
        Err(PaymentError::InvalidSignature)
    }
}
