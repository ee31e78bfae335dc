pub mod core;

#[cfg(target_arch = "wasm32")]
mod worker_wasm;

#[cfg(target_arch = "wasm32")]
pub use worker_wasm::*;

/// This crate is intended to be built for Cloudflare Workers (wasm32-unknown-unknown).
///
/// The `core` module (hashing, code generation, the rate-limit window machine and
/// the verification decision logic) is platform-independent so `cargo check` and
/// `cargo test` work on typical dev machines.
#[cfg(not(target_arch = "wasm32"))]
pub fn build_target_hint() -> &'static str {
    "signatory-worker is intended for wasm32-unknown-unknown (Cloudflare Workers)"
}
