//! Session management and the password-reset request/submit flow.
//!
//! Login failures are deliberately uniform: an unknown username and a wrong
//! password produce the same status and body, so neither leaks which part
//! was wrong. The same applies to reset requests (no account enumeration)
//! and reset tokens (one generic failure for every invalid cause).

use spin_sdk::http::{Request, Response};
use uuid::Uuid;

use crate::config::{self, session_key, user_key, SESSIONS_LIST_KEY};
use crate::core::errors::ApiError;
use crate::core::helpers::{hash_password, json_response, now_iso, verify_password};
use crate::core::store::KeyValue;
use crate::mail::{send_password_reset_email, Mailer};
use crate::models::models::{SessionData, User};
use crate::token;
use crate::users::find_by_email;

pub fn issue_session<S: KeyValue>(store: &S, user_id: &str) -> anyhow::Result<String> {
    let token = Uuid::new_v4().to_string();
    let data = SessionData {
        user_id: user_id.to_string(),
        created_at: now_iso(),
    };
    store.set_json(&session_key(&token), &data)?;

    let mut sessions: Vec<String> = store.get_json(SESSIONS_LIST_KEY)?.unwrap_or_default();
    sessions.push(token.clone());
    store.set_json(SESSIONS_LIST_KEY, &sessions)?;

    Ok(token)
}

/// Deletes every live session belonging to the user.
pub fn revoke_sessions<S: KeyValue>(store: &S, user_id: &str) -> anyhow::Result<()> {
    let sessions: Vec<String> = store.get_json(SESSIONS_LIST_KEY)?.unwrap_or_default();
    let mut kept = Vec::new();

    for token in sessions {
        match store.get_json::<SessionData>(&session_key(&token))? {
            Some(data) if data.user_id == user_id => {
                store.delete(&session_key(&token))?;
            }
            Some(_) => kept.push(token),
            None => {}
        }
    }

    store.set_json(SESSIONS_LIST_KEY, &kept)?;
    Ok(())
}

pub fn login<S: KeyValue>(store: &S, req: Request) -> anyhow::Result<Response> {
    let creds: serde_json::Value = serde_json::from_slice(req.body())?;
    let username = creds["username"].as_str().unwrap_or_default();
    let password = creds["password"].as_str().unwrap_or_default();

    let users: Vec<String> = store.get_json(config::USERS_LIST_KEY)?.unwrap_or_default();

    for id in users {
        if let Some(user) = store.get_json::<User>(&user_key(&id))? {
            if user.username == username && verify_password(password, &user.password_hash) {
                let token = issue_session(store, &user.id)?;
                return json_response(
                    200,
                    &serde_json::json!({ "token": token, "user_id": user.id }),
                );
            }
        }
    }

    tracing::debug!(username, "login rejected");
    Ok(invalid_credentials())
}

/// One response for every failed login, regardless of the cause.
fn invalid_credentials() -> Response {
    Response::builder()
        .status(401)
        .header("Content-Type", "application/json")
        .body(
            serde_json::to_vec(&serde_json::json!({ "error": "Invalid username or password" }))
                .unwrap_or_default(),
        )
        .build()
}

pub fn logout<S: KeyValue>(store: &S, req: Request) -> anyhow::Result<Response> {
    let auth_header = req
        .header("Authorization")
        .and_then(|h| h.as_str())
        .unwrap_or_default();

    if !auth_header.starts_with("Bearer ") {
        return Ok(ApiError::Unauthorized.into());
    }

    let token = auth_header.strip_prefix("Bearer ").unwrap_or_default();
    store.delete(&session_key(token))?;

    let mut sessions: Vec<String> = store.get_json(SESSIONS_LIST_KEY)?.unwrap_or_default();
    sessions.retain(|t| t != token);
    store.set_json(SESSIONS_LIST_KEY, &sessions)?;

    json_response(200, &serde_json::json!({ "message": "Logged out successfully" }))
}

/// Resolves the bearer token on a request to a user id. A valid session also
/// counts as activity, so the user's last_seen is refreshed here.
pub fn validate_token<S: KeyValue>(store: &S, req: &Request) -> Option<String> {
    let auth_header = req.header("Authorization")?.as_str().unwrap_or_default();
    if !auth_header.starts_with("Bearer ") {
        return None;
    }
    let token = auth_header.strip_prefix("Bearer ").unwrap_or_default();

    let data = store
        .get_json::<SessionData>(&session_key(token))
        .ok()??;

    if let Ok(created) = chrono::DateTime::parse_from_rfc3339(&data.created_at) {
        let age_hours = (chrono::Utc::now() - created.with_timezone(&chrono::Utc)).num_hours();
        if age_hours > config::session_expiration_hours() {
            return None;
        }
    }

    let mut user = store.get_json::<User>(&user_key(&data.user_id)).ok()??;
    user.last_seen = now_iso();
    if let Err(err) = store.set_json(&user_key(&user.id), &user) {
        tracing::warn!(error = %err, "failed to refresh last_seen");
    }

    Some(data.user_id)
}

pub fn reset_password_request<S: KeyValue>(
    store: &S,
    mailer: &dyn Mailer,
    req: Request,
) -> anyhow::Result<Response> {
    let value: serde_json::Value = serde_json::from_slice(req.body())?;
    let email = value["email"].as_str().unwrap_or_default();

    if let Some(user) = find_by_email(store, email)? {
        let token = token::issue(
            &config::secret_key(),
            &user.id,
            config::reset_token_ttl_secs(),
        )?;
        send_password_reset_email(mailer, &user, &token);
    }

    // Same answer whether or not the address is registered.
    json_response(
        200,
        &serde_json::json!({
            "message": "Check your email for the instructions to reset your password"
        }),
    )
}

pub fn reset_password<S: KeyValue>(store: &S, req: Request) -> anyhow::Result<Response> {
    let reset_token = req
        .path()
        .trim_start_matches("/reset_password/")
        .to_string();

    let Some(mut user) = token::verify(store, &config::secret_key(), &reset_token) else {
        return Ok(
            ApiError::BadRequest("Invalid or expired reset link".to_string()).into(),
        );
    };

    let value: serde_json::Value = serde_json::from_slice(req.body())?;
    let password = value["password"].as_str().unwrap_or_default();
    if password.len() < config::MIN_PASSWORD_LENGTH {
        return Ok(
            ApiError::BadRequest("Password must be at least 3 characters".to_string()).into(),
        );
    }

    user.password_hash = hash_password(password)?;
    store.set_json(&user_key(&user.id), &user)?;
    revoke_sessions(store, &user.id)?;

    tracing::info!(username = %user.username, "password reset completed");

    json_response(200, &serde_json::json!({ "message": "Your password has been reset" }))
}
