use spin_sdk::http::{Request, Response};
use uuid::Uuid;

use crate::auth::{self, validate_token};
use crate::config::*;
use crate::core::errors::ApiError;
use crate::core::helpers::{
    hash_password, json_response, now_iso, sanitize_text, validate_email, validate_uuid,
    verify_password,
};
use crate::core::store::KeyValue;
use crate::models::models::User;

/// Public view of a user; the email stays private to the account owner.
pub fn build_user_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "username": user.username,
        "about_me": user.about_me.as_ref().unwrap_or(&String::new()),
        "last_seen": user.last_seen,
    })
}

fn own_profile_json(user: &User) -> serde_json::Value {
    let mut profile = build_user_json(user);
    profile["email"] = serde_json::Value::String(user.email.clone());
    profile
}

pub fn find_by_username<S: KeyValue>(store: &S, username: &str) -> anyhow::Result<Option<User>> {
    let users: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    for id in users {
        if let Some(user) = store.get_json::<User>(&user_key(&id))? {
            if user.username == username {
                return Ok(Some(user));
            }
        }
    }
    Ok(None)
}

pub fn find_by_email<S: KeyValue>(store: &S, email: &str) -> anyhow::Result<Option<User>> {
    let users: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    for id in users {
        if let Some(user) = store.get_json::<User>(&user_key(&id))? {
            if user.email == email {
                return Ok(Some(user));
            }
        }
    }
    Ok(None)
}

/// Collects every registration problem instead of bailing on the first, so
/// the client can render the full list.
fn validate_registration<S: KeyValue>(
    store: &S,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Vec<String>> {
    let mut errors = Vec::new();

    if username.is_empty() {
        errors.push("Username is required".to_string());
    } else if username.chars().count() < MIN_USERNAME_LENGTH
        || username.chars().count() > MAX_USERNAME_LENGTH
    {
        errors.push("Username must be 3-64 characters".to_string());
    } else if find_by_username(store, username)?.is_some() {
        errors.push("Please use a different username".to_string());
    }

    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if email.len() > MAX_EMAIL_LENGTH || !validate_email(email) {
        errors.push("Invalid email address".to_string());
    } else if find_by_email(store, email)?.is_some() {
        errors.push("Please use a different email address".to_string());
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        errors.push("Password must be at least 3 characters".to_string());
    }

    Ok(errors)
}

pub fn register<S: KeyValue>(store: &S, req: Request) -> anyhow::Result<Response> {
    let new_user: serde_json::Value = serde_json::from_slice(req.body())?;
    let username = sanitize_text(new_user["username"].as_str().unwrap_or(""));
    let email = new_user["email"].as_str().unwrap_or("").trim().to_string();
    let password = new_user["password"].as_str().unwrap_or("");

    let errors = validate_registration(store, &username, &email, password)?;
    if !errors.is_empty() {
        return Ok(ApiError::Validation(errors).into());
    }

    let id = Uuid::new_v4().to_string();
    let user = User {
        id: id.clone(),
        username,
        email,
        password_hash: hash_password(password)?,
        about_me: None,
        last_seen: now_iso(),
    };

    store.set_json(&user_key(&id), &user)?;

    let mut users: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    users.push(id);
    store.set_json(USERS_LIST_KEY, &users)?;

    tracing::info!(username = %user.username, "user registered");

    json_response(201, &own_profile_json(&user))
}

pub fn get_profile<S: KeyValue>(store: &S, req: Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    match store.get_json::<User>(&user_key(&user_id))? {
        Some(user) => json_response(200, &own_profile_json(&user)),
        None => Ok(ApiError::NotFound("User not found".to_string()).into()),
    }
}

pub fn get_user_details<S: KeyValue>(store: &S, path: &str) -> anyhow::Result<Response> {
    let user_id = path.trim_start_matches("/users/");

    if user_id.is_empty() || !validate_uuid(user_id) {
        return Ok(ApiError::BadRequest("User ID required".to_string()).into());
    }

    match store.get_json::<User>(&user_key(user_id))? {
        Some(user) => json_response(200, &build_user_json(&user)),
        None => Ok(ApiError::NotFound("User not found".to_string()).into()),
    }
}

pub fn update_profile<S: KeyValue>(store: &S, req: Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let Some(mut user) = store.get_json::<User>(&user_key(&user_id))? else {
        return Ok(ApiError::NotFound("User not found".to_string()).into());
    };

    let value: serde_json::Value = serde_json::from_slice(req.body())?;
    let mut password_changed = false;

    if let Some(about_me) = value["about_me"].as_str() {
        let sanitized = sanitize_text(about_me);
        if sanitized.chars().count() > MAX_ABOUT_ME_LENGTH {
            return Ok(
                ApiError::BadRequest("About me too long (max 140 chars)".to_string()).into(),
            );
        }
        user.about_me = if sanitized.is_empty() {
            None
        } else {
            Some(sanitized)
        };
    }

    if let Some(new_password) = value["new_password"].as_str() {
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Ok(
                ApiError::BadRequest("Password must be at least 3 characters".to_string()).into(),
            );
        }

        let old_password = value["old_password"].as_str().unwrap_or_default();
        if !verify_password(old_password, &user.password_hash) {
            return Ok(ApiError::Unauthorized.into());
        }

        user.password_hash = hash_password(new_password)?;
        password_changed = true;
    }

    store.set_json(&user_key(&user.id), &user)?;

    let mut response = own_profile_json(&user);
    if password_changed {
        // Changing the password signs out every existing session and hands
        // back a fresh one for the caller.
        auth::revoke_sessions(store, &user.id)?;
        let token = auth::issue_session(store, &user.id)?;
        response["token"] = serde_json::Value::String(token);
    }

    json_response(200, &response)
}
