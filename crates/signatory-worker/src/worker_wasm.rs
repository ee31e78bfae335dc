use worker::*;

#[path = "wasm/db/mod.rs"]
pub mod db;
#[path = "wasm/env.rs"]
pub mod env;
#[path = "wasm/handlers/mod.rs"]
pub mod handlers;
#[path = "wasm/http.rs"]
pub mod http;
#[path = "wasm/mailer.rs"]
pub mod mailer;
#[path = "wasm/rate_limit.rs"]
pub mod rate_limit;
#[path = "wasm/sms.rs"]
pub mod sms;
#[path = "wasm/util.rs"]
pub mod util;

use http::{json_with_cors, not_found};

#[event(fetch)]
pub async fn fetch(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    if req.method() == Method::Options {
        let resp = Response::empty()?.with_status(204);
        return json_with_cors(&req, resp);
    }

    let url = req.url()?;
    let path = url.path();

    if req.method() == Method::Get && path == "/health" {
        let body = serde_json::json!({
            "ok": true,
            "service": "signatory",
        });
        let resp = Response::from_json(&body)?;
        return json_with_cors(&req, resp);
    }

    // Public signature surface.
    if path == "/signatures" {
        return match req.method() {
            Method::Post => handlers::signatures::handle_submit(req, &env).await,
            Method::Get => handlers::signatures::handle_list(req, &env).await,
            _ => http::method_not_allowed(&req),
        };
    }
    if req.method() == Method::Get && path == "/signatures/count" {
        return handlers::signatures::handle_count(req, &env).await;
    }
    if let Some(rest) = path.strip_prefix("/signatures/") {
        // Matches: POST /signatures/<id>/verify
        if let Some(id) = rest.strip_suffix("/verify") {
            let id = id.trim_matches('/').to_string();
            if req.method() != Method::Post {
                return http::method_not_allowed(&req);
            }
            return handlers::verify::handle_verify(req, &env, id).await;
        }
    }
    if req.method() == Method::Get && path == "/signatories/initial" {
        return handlers::signatures::handle_initial_signatories(req, &env).await;
    }

    // Admin/ops surface, bearer-token guarded.
    if req.method() == Method::Post && path == "/v1/admin/migrations/up" {
        return handlers::migrations::handle_migrations_up(&req, &env).await;
    }
    if req.method() == Method::Get && path == "/v1/admin/db/ping" {
        return handlers::admin::handle_db_ping(&req, &env).await;
    }
    if req.method() == Method::Get && path == "/v1/admin/signatures" {
        return handlers::admin::handle_admin_signatures(&req, &env).await;
    }
    if let Some(rest) = path.strip_prefix("/v1/admin/signatures/") {
        let id = rest.trim_matches('/').to_string();
        if req.method() == Method::Delete && !id.is_empty() {
            return handlers::admin::handle_delete_signature(&req, &env, id).await;
        }
    }

    not_found(&req)
}
