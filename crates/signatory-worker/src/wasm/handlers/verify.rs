use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use worker::{Env, Request, Response, Result};

use crate::core::codes::{hash_code, MAX_ATTEMPTS};
use crate::core::verify::{evaluate, CodeState, VerifyOutcome};
use crate::worker_wasm::db::{db_connect, map_db_err};
use crate::worker_wasm::http::{error_response, internal_error_response, json_with_cors};
use crate::worker_wasm::rate_limit;
use crate::worker_wasm::util::now_ts;

use entity::verification_code::{CODE_TYPE_EMAIL, CODE_TYPE_SMS};
use entity::{signature, verification_code};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyInput {
    email_code: String,
    sms_code: String,
}

fn client_ip(req: &Request) -> String {
    req.headers()
        .get("CF-Connecting-IP")
        .ok()
        .flatten()
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn handle_verify(mut req: Request, env: &Env, signature_id: String) -> Result<Response> {
    // Same per-IP window as submission; code guessing burns the shared budget.
    match rate_limit::check_submission_allowed(env, &client_ip(&req)).await {
        Ok(decision) if !decision.allowed => {
            let resp = Response::from_json(&serde_json::json!({
                "error": "rate_limited",
                "message": "Too many requests. Please wait before trying again.",
                "retryAfter": decision.retry_after,
            }))?
            .with_status(429);
            return json_with_cors(&req, resp);
        }
        Ok(_) => {}
        Err(e) => {
            worker::console_log!("Rate limiter unavailable, failing open: {e}");
        }
    }

    let payload: VerifyInput = match req.json().await {
        Ok(p) => p,
        Err(e) => {
            worker::console_log!("Invalid JSON in verify: {e}");
            return error_response(&req, 400, "invalid_json", "Invalid JSON body");
        }
    };

    let email_code = payload.email_code.trim();
    let sms_code = payload.sms_code.trim();
    if email_code.is_empty() || sms_code.is_empty() {
        // Blank input is a malformed request, not a failed attempt; it does
        // not burn budget.
        return error_response(&req, 400, "invalid_json", "Both emailCode and smsCode are required");
    }

    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(&req, "Failed to open libSQL connection", &e),
    };

    let Some(sig) = signature::Entity::find_by_id(signature_id.clone())
        .one(&db)
        .await
        .map_err(map_db_err)?
    else {
        return error_response(&req, 404, "not_found", "Signature not found");
    };

    if sig.email_verified && sig.phone_verified {
        return error_response(
            &req,
            400,
            "already_verified",
            "This signature has already been verified.",
        );
    }

    let codes = verification_code::Entity::find()
        .filter(verification_code::Column::SignatureId.eq(&signature_id))
        .all(&db)
        .await
        .map_err(map_db_err)?;

    let email_rec = codes.iter().find(|c| c.code_type == CODE_TYPE_EMAIL);
    let sms_rec = codes.iter().find(|c| c.code_type == CODE_TYPE_SMS);
    let (Some(email_rec), Some(sms_rec)) = (email_rec, sms_rec) else {
        return error_response(
            &req,
            404,
            "corrupt_state",
            "Verification codes for this signature are missing.",
        );
    };

    let now = now_ts();
    let outcome = evaluate(
        &as_state(email_rec),
        &as_state(sms_rec),
        &hash_code(email_code),
        &hash_code(sms_code),
        now,
    );

    match outcome {
        VerifyOutcome::AlreadyVerified => error_response(
            &req,
            400,
            "already_verified",
            "This signature has already been verified.",
        ),
        VerifyOutcome::Expired => error_response(
            &req,
            400,
            "codes_expired",
            "These verification codes have expired.",
        ),
        VerifyOutcome::TooManyAttempts => error_response(
            &req,
            400,
            "too_many_attempts",
            "Too many failed attempts. Verification is locked for this signature.",
        ),
        VerifyOutcome::Mismatch { attempts_remaining } => {
            // Shared failure accounting: one conditional statement bumps both
            // rows, and the attempts < limit guard keeps concurrent attempts
            // from pushing the counter past the cap.
            if let Err(e) = verification_code::Entity::update_many()
                .col_expr(
                    verification_code::Column::Attempts,
                    Expr::col(verification_code::Column::Attempts).add(1),
                )
                .filter(verification_code::Column::SignatureId.eq(&signature_id))
                .filter(verification_code::Column::Attempts.lt(MAX_ATTEMPTS))
                .exec(&db)
                .await
            {
                return internal_error_response(&req, "Failed to record failed attempt", &e);
            }

            let resp = Response::from_json(&serde_json::json!({
                "error": "invalid_codes",
                "message": "One or both codes are incorrect.",
                "attemptsRemaining": attempts_remaining,
            }))?
            .with_status(400);
            json_with_cors(&req, resp)
        }
        VerifyOutcome::Verified => {
            if let Err(e) = verification_code::Entity::update_many()
                .col_expr(verification_code::Column::VerifiedAt, Expr::value(now))
                .filter(verification_code::Column::SignatureId.eq(&signature_id))
                .exec(&db)
                .await
            {
                return internal_error_response(&req, "Failed to confirm codes", &e);
            }

            let mut active: signature::ActiveModel = sig.into();
            active.email_verified = Set(true);
            active.phone_verified = Set(true);
            active.verification_completed_at = Set(Some(now));
            active.updated_at = Set(now);

            if let Err(e) = active.update(&db).await {
                return internal_error_response(&req, "Failed to mark signature verified", &e);
            }

            let resp = Response::from_json(&serde_json::json!({
                "message": "Signature verified. Thank you for signing.",
            }))?;
            json_with_cors(&req, resp)
        }
    }
}

fn as_state(rec: &verification_code::Model) -> CodeState {
    CodeState {
        code_hash: rec.code_hash.clone(),
        expires_at: rec.expires_at,
        attempts: rec.attempts,
        verified_at: rec.verified_at,
    }
}
