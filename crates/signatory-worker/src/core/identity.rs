use sha2::{Digest, Sha256};

/// Canonical form of an email for identity comparison: trimmed, lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Canonical form of a mobile number: digits only, punctuation and spaces
/// stripped.
pub fn normalize_mobile(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// One-way hash of a normalized identity value. Only this hash is ever
/// persisted; equality checks compare hashes.
pub fn hash_identity(normalized: &str) -> String {
    sha256_hex(normalized.as_bytes())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex_encode(&Sha256::digest(bytes))
}

pub fn hex_encode(bytes: &[u8]) -> String {
    const LUT: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(LUT[(b >> 4) as usize] as char);
        out.push(LUT[(b & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_deterministic() {
        let a = hash_identity("jane@example.com");
        let b = hash_identity("jane@example.com");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn distinct_inputs_hash_differently() {
        assert_ne!(
            hash_identity("jane@example.com"),
            hash_identity("john@example.com")
        );
    }

    #[test]
    fn equivalent_emails_normalize_to_same_hash() {
        let a = hash_identity(&normalize_email("Jane@Example.com"));
        let b = hash_identity(&normalize_email("jane@example.com "));
        assert_eq!(a, b);
    }

    #[test]
    fn mobile_normalization_strips_punctuation() {
        assert_eq!(normalize_mobile("0412 345 678"), "0412345678");
        assert_eq!(normalize_mobile("(04) 1234-5678"), "0412345678");
        assert_eq!(
            hash_identity(&normalize_mobile("0412 345 678")),
            hash_identity(&normalize_mobile("0412345678"))
        );
    }

    #[test]
    fn hex_encoding_matches_reference() {
        assert_eq!(hex_encode(&[0x00, 0x0f, 0xf0, 0xff]), "000ff0ff");
    }
}
