use serde::Deserialize;

use super::identity::{normalize_email, normalize_mobile};

pub const NAME_MAX_LEN: usize = 200;

/// Submission payload for `POST /signatures`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInput {
    pub name: String,
    pub email: String,
    pub mobile: String,

    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address_gnaf_id: Option<String>,
    #[serde(default)]
    pub federal_electorate: Option<String>,
    #[serde(default)]
    pub state_electorate: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub sa2_code: Option<String>,
    #[serde(default)]
    pub lga_name: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldError {
    Name(&'static str),
    Email(&'static str),
    Mobile(&'static str),
}

impl FieldError {
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::Name(_) => "invalid_name",
            FieldError::Email(_) => "invalid_email",
            FieldError::Mobile(_) => "invalid_mobile",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FieldError::Name(m) | FieldError::Email(m) | FieldError::Mobile(m) => m,
        }
    }
}

pub fn validate(input: &SubmissionInput) -> Result<(), FieldError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(FieldError::Name("Name is required"));
    }
    if name.len() > NAME_MAX_LEN {
        return Err(FieldError::Name("Name is too long"));
    }

    if !plausible_email(&normalize_email(&input.email)) {
        return Err(FieldError::Email("A valid email address is required"));
    }

    if !valid_mobile(&normalize_mobile(&input.mobile)) {
        return Err(FieldError::Mobile(
            "A valid 10-digit Australian mobile number is required",
        ));
    }

    Ok(())
}

/// RFC-plausible, not RFC-complete: one `@`, non-empty local part, a domain
/// with at least one interior dot, no whitespace. Deliverability is proven by
/// the verification code, not by parsing.
pub fn plausible_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((head, tail)) = domain.split_once('.') else {
        return false;
    };
    !head.is_empty() && !tail.is_empty() && !domain.ends_with('.')
}

/// Australian mobile: exactly 10 digits after stripping, leading zero.
pub fn valid_mobile(digits: &str) -> bool {
    digits.len() == 10
        && digits.starts_with('0')
        && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str, mobile: &str) -> SubmissionInput {
        SubmissionInput {
            name: name.to_string(),
            email: email.to_string(),
            mobile: mobile.to_string(),
            position: None,
            institution: None,
            address: None,
            address_gnaf_id: None,
            federal_electorate: None,
            state_electorate: None,
            latitude: None,
            longitude: None,
            sa2_code: None,
            lga_name: None,
            postcode: None,
            state: None,
        }
    }

    #[test]
    fn accepts_a_plain_submission() {
        assert_eq!(validate(&input("Jane Doe", "jane@example.com", "0412345678")), Ok(()));
    }

    #[test]
    fn accepts_formatted_mobile_and_cased_email() {
        assert_eq!(
            validate(&input("Jane Doe", "Jane@Example.com ", "0412 345 678")),
            Ok(())
        );
    }

    #[test]
    fn rejects_blank_name() {
        let err = validate(&input("   ", "jane@example.com", "0412345678")).unwrap_err();
        assert_eq!(err.code(), "invalid_name");
    }

    #[test]
    fn rejects_implausible_emails() {
        for email in ["", "jane", "jane@", "@example.com", "jane@example", "jane @example.com", "jane@example."] {
            let err = validate(&input("Jane", email, "0412345678")).unwrap_err();
            assert_eq!(err.code(), "invalid_email", "email: {email:?}");
        }
    }

    #[test]
    fn rejects_bad_mobiles() {
        // Wrong length, missing leading zero, foreign format.
        for mobile in ["", "041234567", "04123456789", "4412345678", "+61412345678"] {
            let err = validate(&input("Jane", "jane@example.com", mobile)).unwrap_err();
            assert_eq!(err.code(), "invalid_mobile", "mobile: {mobile:?}");
        }
    }
}
