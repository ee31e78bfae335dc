use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use worker::{Env, Headers, Method, Request, RequestInit, Result};

use crate::worker_wasm::env::env_string;

fn require_env(env: &Env, key: &str) -> std::result::Result<String, worker::Error> {
    let Some(v) = env_string(env, key) else {
        return Err(worker::Error::RustError(format!("{key} is required")));
    };
    Ok(v)
}

fn is_success_status(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Convert a local Australian mobile (04xxxxxxxx) to E.164 for Twilio.
fn to_e164_au(digits: &str) -> String {
    match digits.strip_prefix('0') {
        Some(rest) => format!("+61{rest}"),
        None => format!("+{digits}"),
    }
}

/// Percent-encode a form value. The inputs here are phone numbers and short
/// ASCII messages, but '+' in E.164 numbers must not pass through raw.
fn form_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => {
                const LUT: &[u8; 16] = b"0123456789ABCDEF";
                out.push('%');
                out.push(LUT[(b >> 4) as usize] as char);
                out.push(LUT[(b & 0x0f) as usize] as char);
            }
        }
    }
    out
}

/// Deliver the SMS-side verification code via the Twilio Messages API.
pub async fn send_verification_sms(env: &Env, to_mobile_digits: &str, code: &str) -> Result<()> {
    let account_sid = require_env(env, "TWILIO_ACCOUNT_SID")?;
    let auth_token = require_env(env, "TWILIO_AUTH_TOKEN")?;
    let from_number = require_env(env, "TWILIO_FROM_NUMBER")?;

    let to = to_e164_au(to_mobile_digits);
    let message = format!("Your signature verification code is {code}. It expires in 10 minutes.");

    let form = format!(
        "To={}&From={}&Body={}",
        form_encode(&to),
        form_encode(&from_number),
        form_encode(&message)
    );

    let basic = STANDARD.encode(format!("{account_sid}:{auth_token}"));

    let headers = Headers::new();
    headers.set("Authorization", &format!("Basic {basic}"))?;
    headers.set("Content-Type", "application/x-www-form-urlencoded")?;
    headers.set("Accept", "application/json")?;
    headers.set("User-Agent", "Signatory/0.1 (Cloudflare Worker)")?;

    let mut init = RequestInit::new();
    init.with_method(Method::Post);
    init.with_headers(headers);
    init.with_body(Some(form.into()));

    let url = format!("https://api.twilio.com/2010-04-01/Accounts/{account_sid}/Messages.json");
    let req = Request::new_with_init(&url, &init)?;

    let mut resp = worker::Fetch::Request(req).send().await?;
    let status = resp.status_code();
    if is_success_status(status) {
        return Ok(());
    }

    let body = resp.text().await.unwrap_or_default();
    Err(worker::Error::RustError(format!(
        "Twilio send failed (status={status}): {body}"
    )))
}
