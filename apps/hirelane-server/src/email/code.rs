//! Verification code generation.

use rand::Rng;

/// Generate a 6-digit verification code.
///
/// Returns a string of exactly 6 digits (000000-999999).
pub fn generate_verification_code() -> String {
    let mut rng = rand::rng();
    let code: u32 = rng.random_range(0..1_000_000);
    format!("{:06}", code)
}
