use getrandom::fill;

use super::identity::sha256_hex;

/// Codes expire 10 minutes after issue.
pub const CODE_TTL_SECS: i64 = 600;

/// Failed checks allowed before a code pair locks permanently.
pub const MAX_ATTEMPTS: i32 = 3;

const CODE_MIN: u32 = 100_000;
const CODE_SPAN: u32 = 900_000;

/// Generate a 6-digit verification code in 100000..=999999.
///
/// Draws from the system CSPRNG with rejection sampling so the range stays
/// uniform. These codes gate anti-fraud checks, so a non-cryptographic
/// generator is not acceptable here.
pub fn generate_code() -> String {
    // Largest multiple of CODE_SPAN that fits in a u32; values above it would
    // bias the modulo.
    const LIMIT: u32 = u32::MAX - (u32::MAX % CODE_SPAN);

    loop {
        let mut buf = [0u8; 4];
        fill(&mut buf).expect("Failed to generate random bytes");
        let n = u32::from_le_bytes(buf);
        if n < LIMIT {
            return (CODE_MIN + n % CODE_SPAN).to_string();
        }
    }
}

/// Hash a raw code for storage; the cleartext code never touches the database.
pub fn hash_code(code: &str) -> String {
    sha256_hex(code.as_bytes())
}

pub fn expiry_ts(now: i64) -> i64 {
    now + CODE_TTL_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits_in_range() {
        for _ in 0..500 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().expect("numeric");
            assert!((100_000..=999_999).contains(&n), "out of range: {n}");
        }
    }

    #[test]
    fn consecutive_codes_vary() {
        // Not a randomness test, just a sanity check that the generator is
        // not stuck on one value.
        let first = generate_code();
        let varied = (0..20).any(|_| generate_code() != first);
        assert!(varied);
    }

    #[test]
    fn code_hash_is_stable_and_hides_code() {
        let h = hash_code("123456");
        assert_eq!(h, hash_code("123456"));
        assert_ne!(h, hash_code("123457"));
        assert!(!h.contains("123456"));
    }

    #[test]
    fn expiry_is_ten_minutes_out() {
        assert_eq!(expiry_ts(1_000), 1_600);
    }
}
