use subtle::ConstantTimeEq;

use super::codes::MAX_ATTEMPTS;

/// Snapshot of one stored verification-code row, as loaded by the handler.
#[derive(Clone, Debug)]
pub struct CodeState {
    pub code_hash: String,
    pub expires_at: i64,
    pub attempts: i32,
    pub verified_at: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    AlreadyVerified,
    Expired,
    TooManyAttempts,
    Mismatch { attempts_remaining: i32 },
    Verified,
}

/// Decide the fate of one verification attempt against the stored code pair.
///
/// Check order matters: a confirmed pair stays confirmed, expiry beats
/// correctness, and an exhausted attempt budget beats correctness. On a
/// mismatch both counters advance together (shared failure accounting), so the
/// remaining budget is the smaller of the two after the increment.
pub fn evaluate(
    email: &CodeState,
    sms: &CodeState,
    submitted_email_hash: &str,
    submitted_sms_hash: &str,
    now: i64,
) -> VerifyOutcome {
    if email.verified_at.is_some() && sms.verified_at.is_some() {
        return VerifyOutcome::AlreadyVerified;
    }

    if now >= email.expires_at || now >= sms.expires_at {
        return VerifyOutcome::Expired;
    }

    if email.attempts >= MAX_ATTEMPTS || sms.attempts >= MAX_ATTEMPTS {
        return VerifyOutcome::TooManyAttempts;
    }

    let email_ok = hashes_match(&email.code_hash, submitted_email_hash);
    let sms_ok = hashes_match(&sms.code_hash, submitted_sms_hash);

    if email_ok && sms_ok {
        VerifyOutcome::Verified
    } else {
        let highest_after_increment = email.attempts.max(sms.attempts) + 1;
        VerifyOutcome::Mismatch {
            attempts_remaining: (MAX_ATTEMPTS - highest_after_increment).max(0),
        }
    }
}

fn hashes_match(stored: &str, submitted: &str) -> bool {
    stored.as_bytes().ct_eq(submitted.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codes::hash_code;

    const NOW: i64 = 1_000;
    const FRESH_EXPIRY: i64 = NOW + 600;

    fn code(raw: &str, attempts: i32) -> CodeState {
        CodeState {
            code_hash: hash_code(raw),
            expires_at: FRESH_EXPIRY,
            attempts,
            verified_at: None,
        }
    }

    #[test]
    fn correct_pair_verifies() {
        let outcome = evaluate(
            &code("123456", 0),
            &code("654321", 0),
            &hash_code("123456"),
            &hash_code("654321"),
            NOW,
        );
        assert_eq!(outcome, VerifyOutcome::Verified);
    }

    #[test]
    fn wrong_email_code_burns_shared_budget() {
        // Scenario: correct SMS code, wrong email code, three times over.
        let sms_hash = hash_code("654321");
        let wrong = hash_code("000000");

        let mut attempts = 0;
        let expected_remaining = [2, 1, 0];
        for remaining in expected_remaining {
            let outcome = evaluate(
                &code("123456", attempts),
                &code("654321", attempts),
                &wrong,
                &sms_hash,
                NOW,
            );
            assert_eq!(outcome, VerifyOutcome::Mismatch { attempts_remaining: remaining });
            attempts += 1;
        }

        // Fourth attempt is blocked even with both codes correct.
        let outcome = evaluate(
            &code("123456", attempts),
            &code("654321", attempts),
            &hash_code("123456"),
            &sms_hash,
            NOW,
        );
        assert_eq!(outcome, VerifyOutcome::TooManyAttempts);
    }

    #[test]
    fn expiry_beats_correct_codes() {
        // Eleven minutes after issue, against a ten-minute TTL.
        let outcome = evaluate(
            &code("123456", 0),
            &code("654321", 0),
            &hash_code("123456"),
            &hash_code("654321"),
            FRESH_EXPIRY + 60,
        );
        assert_eq!(outcome, VerifyOutcome::Expired);
    }

    #[test]
    fn confirmed_pair_reports_already_verified() {
        let mut email = code("123456", 0);
        let mut sms = code("654321", 0);
        email.verified_at = Some(NOW - 10);
        sms.verified_at = Some(NOW - 10);

        let outcome = evaluate(&email, &sms, &hash_code("123456"), &hash_code("654321"), NOW);
        assert_eq!(outcome, VerifyOutcome::AlreadyVerified);

        // Replay beats expiry: a confirmed pair answers AlreadyVerified even
        // after the codes would have lapsed.
        let outcome = evaluate(&email, &sms, &hash_code("123456"), &hash_code("654321"), FRESH_EXPIRY + 60);
        assert_eq!(outcome, VerifyOutcome::AlreadyVerified);
    }

    #[test]
    fn mismatch_remaining_never_goes_negative() {
        let outcome = evaluate(
            &code("123456", 2),
            &code("654321", 2),
            &hash_code("000000"),
            &hash_code("000000"),
            NOW,
        );
        assert_eq!(outcome, VerifyOutcome::Mismatch { attempts_remaining: 0 });
    }

    #[test]
    fn uneven_counters_use_the_higher_one() {
        let outcome = evaluate(
            &code("123456", 1),
            &code("654321", 2),
            &hash_code("000000"),
            &hash_code("654321"),
            NOW,
        );
        assert_eq!(outcome, VerifyOutcome::Mismatch { attempts_remaining: 0 });
    }
}
