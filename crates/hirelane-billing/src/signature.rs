//! Payment-signature verification.
//!
//! The gateway callback carries `HMAC-SHA256(order_id|payment_id)` computed
//! under the shared key secret; the server recomputes it and compares in
//! constant time before activating a subscription.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex-encoded payment signature for an (order, payment) pair.
pub fn payment_signature(order_id: &str, payment_id: &str, key_secret: &str) -> String {
    // HMAC accepts keys of any length; new_from_slice only fails for
    // variable-output MACs.
    let mut mac = HmacSha256::new_from_slice(key_secret.as_bytes())
        .expect("HMAC-SHA256 accepts any key length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a caller-supplied payment signature.
///
/// Uses constant-time comparison to prevent timing attacks. A malformed or
/// empty signature simply fails verification; no state is mutated by this
/// function.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    key_secret: &str,
) -> bool {
    let expected = payment_signature(order_id, payment_id, key_secret);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
