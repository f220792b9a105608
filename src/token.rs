//! Password-reset capability tokens.
//!
//! A token is a signed, self-contained payload: `base64url(claims)` joined
//! with `base64url(HMAC-SHA256(secret, claims))` by a dot, where the claims
//! are `{"reset_password": <user id>, "exp": <unix seconds>}`. Nothing is
//! persisted; a token is valid exactly while its signature checks out, it is
//! unexpired, and its subject still exists. Tokens stay usable until expiry
//! (there is no single-use invalidation).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::user_key;
use crate::core::store::KeyValue;
use crate::models::models::User;

type HmacSha256 = Hmac<Sha256>;

#[derive(Serialize, Deserialize)]
struct ResetClaims {
    reset_password: String,
    exp: i64,
}

pub fn issue(secret: &str, user_id: &str, ttl_secs: i64) -> anyhow::Result<String> {
    let claims = ResetClaims {
        reset_password: user_id.to_string(),
        exp: chrono::Utc::now().timestamp() + ttl_secs,
    };
    let payload = serde_json::to_vec(&claims)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| anyhow::anyhow!("Invalid signing key"))?;
    mac.update(&payload);
    let signature = mac.finalize().into_bytes();

    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(&payload),
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Resolves a token back to its user. Any failure — malformed token, bad
/// signature, expired, or the user no longer exists — yields `None`; callers
/// must not tell the end user which one it was.
pub fn verify<S: KeyValue>(store: &S, secret: &str, token: &str) -> Option<User> {
    let (payload_b64, signature_b64) = token.split_once('.')?;
    let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(&payload);
    mac.verify_slice(&signature).ok()?;

    let claims: ResetClaims = serde_json::from_slice(&payload).ok()?;
    if chrono::Utc::now().timestamp() >= claims.exp {
        return None;
    }

    store
        .get_json::<User>(&user_key(&claims.reset_password))
        .ok()
        .flatten()
}
