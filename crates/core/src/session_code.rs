//! Session code generation.
//!
//! A code is `S` + the UTC date of issue (`YYYYMMDD`) + a random suffix
//! drawn from an alphabet without look-alike characters. Codes are URL-safe
//! so they can be embedded in a check-in link or QR code, and short enough
//! to read out loud in a classroom.

use rand::Rng;

use crate::types::Timestamp;

/// Leading marker on every session code.
pub const CODE_PREFIX: char = 'S';

/// Number of random characters after the date.
pub const CODE_SUFFIX_LENGTH: usize = 8;

/// Total code length: prefix + `YYYYMMDD` + suffix.
pub const CODE_LENGTH: usize = 1 + 8 + CODE_SUFFIX_LENGTH;

/// How many fresh codes to try before giving up on a uniqueness collision.
pub const MAX_CODE_ATTEMPTS: u32 = 5;

/// Digits 2-9 and upper-case letters without I, L and O.
const ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";

/// Generate a session code for a session starting at `now`.
pub fn generate_session_code(now: Timestamp) -> String {
    generate_session_code_with(now, &mut rand::rng())
}

/// Generate a session code using the supplied random source.
pub fn generate_session_code_with<R: Rng + ?Sized>(now: Timestamp, rng: &mut R) -> String {
    let mut code = String::with_capacity(CODE_LENGTH);
    code.push(CODE_PREFIX);
    code.push_str(&now.format("%Y%m%d").to_string());
    for _ in 0..CODE_SUFFIX_LENGTH {
        let idx = rng.random_range(0..ALPHABET.len());
        code.push(char::from(ALPHABET[idx]));
    }
    code
}

/// Cheap shape check used before hitting the store with a client-supplied
/// code. Does not prove the code was ever issued.
pub fn is_well_formed(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() != CODE_LENGTH || bytes[0] != CODE_PREFIX as u8 {
        return false;
    }
    let (date, suffix) = bytes[1..].split_at(8);
    date.iter().all(u8::is_ascii_digit) && suffix.iter().all(|b| ALPHABET.contains(b))
}
