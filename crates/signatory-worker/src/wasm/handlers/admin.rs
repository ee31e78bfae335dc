use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use worker::{Env, Request, Response, Result};

use crate::worker_wasm::db::db_connect;
use crate::worker_wasm::http::{error_response, internal_error_response, json_with_cors};
use crate::worker_wasm::util::ts_to_rfc3339;

use entity::{signature, verification_code};

use super::admin_auth::ensure_admin_authorized;

pub async fn handle_db_ping(req: &Request, env: &Env) -> Result<Response> {
    if let Some(resp) = ensure_admin_authorized(req, env)? {
        return Ok(resp);
    }

    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(req, "Failed to open libSQL connection", &e),
    };

    // A minimal query to validate the connection.
    if let Err(e) = db.ping().await {
        return internal_error_response(req, "libSQL ping failed", &e);
    }

    let resp = Response::from_json(&serde_json::json!({
        "success": true,
        "db": { "ok": true }
    }))?;

    json_with_cors(req, resp)
}

/// Dashboard feed: every signature including pending ones. Hashes are shown
/// truncated, enough to correlate support requests without exposing a full
/// lookup key.
pub async fn handle_admin_signatures(req: &Request, env: &Env) -> Result<Response> {
    if let Some(resp) = ensure_admin_authorized(req, env)? {
        return Ok(resp);
    }

    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(req, "Failed to open libSQL connection", &e),
    };

    let rows = match signature::Entity::find()
        .order_by_desc(signature::Column::CreatedAt)
        .all(&db)
        .await
    {
        Ok(rows) => rows,
        Err(e) => return internal_error_response(req, "Failed to list signatures", &e),
    };

    let entries: Vec<serde_json::Value> = rows
        .iter()
        .map(|s| {
            serde_json::json!({
                "id": s.id,
                "name": s.name,
                "position": s.position,
                "institution": s.institution,
                "emailHashPrefix": truncate_hash(&s.email_hash),
                "phoneHashPrefix": truncate_hash(&s.phone_hash),
                "emailVerified": s.email_verified,
                "phoneVerified": s.phone_verified,
                "verificationCompletedAt": s.verification_completed_at.map(ts_to_rfc3339),
                "createdAt": ts_to_rfc3339(s.created_at),
            })
        })
        .collect();

    let resp = Response::from_json(&serde_json::json!({ "signatures": entries }))?;
    json_with_cors(req, resp)
}

/// Out-of-band recovery for locked-out or expired signers: remove the record
/// so they can resubmit from scratch.
pub async fn handle_delete_signature(req: &Request, env: &Env, id: String) -> Result<Response> {
    if let Some(resp) = ensure_admin_authorized(req, env)? {
        return Ok(resp);
    }

    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(req, "Failed to open libSQL connection", &e),
    };

    if let Err(e) = verification_code::Entity::delete_many()
        .filter(verification_code::Column::SignatureId.eq(&id))
        .exec(&db)
        .await
    {
        return internal_error_response(req, "Failed to delete verification codes", &e);
    }

    let deleted = match signature::Entity::delete_by_id(id).exec(&db).await {
        Ok(res) => res.rows_affected,
        Err(e) => return internal_error_response(req, "Failed to delete signature", &e),
    };

    if deleted == 0 {
        return error_response(req, 404, "not_found", "Signature not found");
    }

    let resp = Response::from_json(&serde_json::json!({
        "message": "Signature deleted. The signer may submit again.",
    }))?;
    json_with_cors(req, resp)
}

fn truncate_hash(hash: &str) -> String {
    hash.chars().take(8).collect()
}
