use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use worker::{Env, Request, Response, Result};

use crate::core::codes::{expiry_ts, generate_code, hash_code};
use crate::core::identity::{hash_identity, normalize_email, normalize_mobile};
use crate::core::validate::{validate, SubmissionInput};
use crate::worker_wasm::db::{db_connect, map_db_err};
use crate::worker_wasm::http::{error_response, internal_error_response, json_with_cors};
use crate::worker_wasm::rate_limit;
use crate::worker_wasm::util::{new_id, now_ts, ts_to_rfc3339};
use crate::worker_wasm::{mailer, sms};

use entity::verification_code::{CODE_TYPE_EMAIL, CODE_TYPE_SMS};
use entity::{initial_signatory, signature, verification_code};

const LIST_DEFAULT_LIMIT: u64 = 100;
const LIST_MAX_LIMIT: u64 = 500;

fn client_ip(req: &Request) -> String {
    req.headers()
        .get("CF-Connecting-IP")
        .ok()
        .flatten()
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn handle_submit(mut req: Request, env: &Env) -> Result<Response> {
    // Gate before any parsing or database work.
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
            // Fail open: a limiter outage must not take signing down with it.
            worker::console_log!("Rate limiter unavailable, failing open: {e}");
        }
    }

    let payload: SubmissionInput = match req.json().await {
        Ok(p) => p,
        Err(e) => {
            worker::console_log!("Invalid JSON in submission: {e}");
            return error_response(&req, 400, "invalid_json", "Invalid JSON body");
        }
    };

    if let Err(field) = validate(&payload) {
        return error_response(&req, 400, field.code(), field.message());
    }

    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(&req, "Failed to open libSQL connection", &e),
    };

    let email = normalize_email(&payload.email);
    let mobile = normalize_mobile(&payload.mobile);
    let email_hash = hash_identity(&email);
    let phone_hash = hash_identity(&mobile);

    // One signature per email and per mobile, verified or not.
    let existing = signature::Entity::find()
        .filter(
            Condition::any()
                .add(signature::Column::EmailHash.eq(&email_hash))
                .add(signature::Column::PhoneHash.eq(&phone_hash)),
        )
        .one(&db)
        .await
        .map_err(map_db_err)?;

    if existing.is_some() {
        return error_response(
            &req,
            400,
            "duplicate_identity",
            "This email or mobile number has already been used to sign.",
        );
    }

    let now = now_ts();
    let signature_id = new_id();
    let name = payload.name.trim().to_string();

    let row = signature::ActiveModel {
        id: Set(signature_id.clone()),
        name: Set(name.clone()),
        position: Set(payload.position.clone()),
        institution: Set(payload.institution.clone()),
        address: Set(payload.address.clone()),
        address_gnaf_id: Set(payload.address_gnaf_id.clone()),
        federal_electorate: Set(payload.federal_electorate.clone()),
        state_electorate: Set(payload.state_electorate.clone()),
        latitude: Set(payload.latitude),
        longitude: Set(payload.longitude),
        sa2_code: Set(payload.sa2_code.clone()),
        lga_name: Set(payload.lga_name.clone()),
        postcode: Set(payload.postcode.clone()),
        state: Set(payload.state.clone()),
        email_hash: Set(email_hash),
        phone_hash: Set(phone_hash),
        email_verified: Set(false),
        phone_verified: Set(false),
        verification_completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    if let Err(e) = row.insert(&db).await {
        return internal_error_response(&req, "Failed to insert signature", &e);
    }

    let email_code = generate_code();
    let sms_code = generate_code();
    let expires_at = expiry_ts(now);

    for (code_type, code) in [(CODE_TYPE_EMAIL, &email_code), (CODE_TYPE_SMS, &sms_code)] {
        let record = verification_code::ActiveModel {
            id: Set(new_id()),
            signature_id: Set(signature_id.clone()),
            code_type: Set(code_type.to_string()),
            code_hash: Set(hash_code(code)),
            expires_at: Set(expires_at),
            attempts: Set(0),
            verified_at: Set(None),
            created_at: Set(now),
        };

        if let Err(e) = record.insert(&db).await {
            if let Err(cleanup) = rollback_submission(&db, &signature_id).await {
                worker::console_log!("Rollback after code insert failure failed: {cleanup}");
            }
            return internal_error_response(&req, "Failed to insert verification code", &e);
        }
    }

    // Dispatch both codes concurrently and wait for both to settle.
    let email_send = mailer::send_verification_email(env, &email, &name, &email_code);
    let sms_send = sms::send_verification_sms(env, &mobile, &sms_code);
    let (email_sent, sms_sent) = futures_util::future::join(email_send, sms_send).await;

    if email_sent.is_err() || sms_sent.is_err() {
        // Compensating rollback: never leave a pending signature whose codes
        // were not delivered. Gateway detail stays in the logs.
        if let Err(e) = &email_sent {
            worker::console_log!("Email delivery failed: {e}");
        }
        if let Err(e) = &sms_sent {
            worker::console_log!("SMS delivery failed: {e}");
        }
        if let Err(cleanup) = rollback_submission(&db, &signature_id).await {
            worker::console_log!("Rollback after delivery failure failed: {cleanup}");
        }
        return error_response(
            &req,
            500,
            "delivery_failed",
            "We could not deliver your verification codes. Please try signing again.",
        );
    }

    let resp = Response::from_json(&serde_json::json!({
        "id": signature_id,
        "message": "Verification codes sent. Enter both codes to confirm your signature.",
    }))?
    .with_status(201);

    json_with_cors(&req, resp)
}

async fn rollback_submission(
    db: &DatabaseConnection,
    signature_id: &str,
) -> std::result::Result<(), sea_orm::DbErr> {
    // Explicit child delete first; libSQL only honors the FK cascade when
    // foreign keys are enabled on the connection.
    verification_code::Entity::delete_many()
        .filter(verification_code::Column::SignatureId.eq(signature_id))
        .exec(db)
        .await?;

    signature::Entity::delete_by_id(signature_id.to_string())
        .exec(db)
        .await?;

    Ok(())
}

fn paging(req: &Request) -> (u64, u64) {
    let (mut limit, mut offset) = (LIST_DEFAULT_LIMIT, 0);
    if let Ok(url) = req.url() {
        for (k, v) in url.query_pairs() {
            match k.as_ref() {
                "limit" => {
                    if let Ok(n) = v.parse::<u64>() {
                        limit = n.clamp(1, LIST_MAX_LIMIT);
                    }
                }
                "offset" => {
                    if let Ok(n) = v.parse::<u64>() {
                        offset = n;
                    }
                }
                _ => {}
            }
        }
    }
    (limit, offset)
}

fn verified_only() -> Condition {
    Condition::all()
        .add(signature::Column::EmailVerified.eq(true))
        .add(signature::Column::PhoneVerified.eq(true))
}

/// Public wall: verified signatures only, newest verification first. Identity
/// hashes never leave the database.
pub async fn handle_list(req: Request, env: &Env) -> Result<Response> {
    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(&req, "Failed to open libSQL connection", &e),
    };

    let (limit, offset) = paging(&req);

    let rows = match signature::Entity::find()
        .filter(verified_only())
        .order_by_desc(signature::Column::VerificationCompletedAt)
        .limit(limit)
        .offset(offset)
        .all(&db)
        .await
    {
        Ok(rows) => rows,
        Err(e) => return internal_error_response(&req, "Failed to list signatures", &e),
    };

    let entries: Vec<serde_json::Value> = rows
        .iter()
        .map(|s| {
            serde_json::json!({
                "id": s.id,
                "name": s.name,
                "position": s.position,
                "institution": s.institution,
                "created_at": ts_to_rfc3339(s.created_at),
            })
        })
        .collect();

    let resp = Response::from_json(&serde_json::json!({ "signatures": entries }))?;
    json_with_cors(&req, resp)
}

pub async fn handle_count(req: Request, env: &Env) -> Result<Response> {
    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(&req, "Failed to open libSQL connection", &e),
    };

    let count = match signature::Entity::find()
        .filter(verified_only())
        .count(&db)
        .await
    {
        Ok(n) => n,
        Err(e) => return internal_error_response(&req, "Failed to count signatures", &e),
    };

    let resp = Response::from_json(&serde_json::json!({ "count": count }))?;
    json_with_cors(&req, resp)
}

/// Curated list shown alongside public signatures, in display order.
pub async fn handle_initial_signatories(req: Request, env: &Env) -> Result<Response> {
    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(&req, "Failed to open libSQL connection", &e),
    };

    let rows = match initial_signatory::Entity::find()
        .order_by_asc(initial_signatory::Column::DisplayOrder)
        .all(&db)
        .await
    {
        Ok(rows) => rows,
        Err(e) => return internal_error_response(&req, "Failed to list initial signatories", &e),
    };

    let entries: Vec<serde_json::Value> = rows
        .iter()
        .map(|s| {
            serde_json::json!({
                "id": s.id,
                "name": s.name,
                "position": s.position,
                "institution": s.institution,
            })
        })
        .collect();

    let resp = Response::from_json(&serde_json::json!({ "signatories": entries }))?;
    json_with_cors(&req, resp)
}
