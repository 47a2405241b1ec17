//! One-time promo codes
//!
//! Codes are for display only. Two players can draw the same code.

use rand::Rng;

/// Every code starts with this
pub const PROMO_PREFIX: &str = "FIZZ";
/// Uppercase letters and digits without I, O, 0 and 1
pub const PROMO_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Random symbols after the prefix
pub const PROMO_SUFFIX_LEN: usize = 6;

/// Generate a promo code like `FIZZ7KQ2MX`
pub fn generate_promo_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut code = String::with_capacity(PROMO_PREFIX.len() + PROMO_SUFFIX_LEN);
    code.push_str(PROMO_PREFIX);
    for _ in 0..PROMO_SUFFIX_LEN {
        let idx = rng.random_range(0..PROMO_ALPHABET.len());
        code.push(PROMO_ALPHABET[idx] as char);
    }
    code
}

/// Check the prefix, length and alphabet of a code
pub fn is_valid_promo_code(code: &str) -> bool {
    match code.strip_prefix(PROMO_PREFIX) {
        Some(suffix) => {
            suffix.len() == PROMO_SUFFIX_LEN && suffix.bytes().all(|b| PROMO_ALPHABET.contains(&b))
        }
        None => false,
    }
}
