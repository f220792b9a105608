//! Directed follower graph over users, kept as an explicit edge set with a
//! forward index (`followings:{follower}`) and a reverse index
//! (`followers:{followed}`). Both mutations are idempotent. The graph layer
//! does not reject self-follows; the HTTP handlers guard against them.

use spin_sdk::http::{Request, Response};

use crate::auth::validate_token;
use crate::config::{followers_key, followings_key, user_key};
use crate::core::errors::ApiError;
use crate::core::helpers::{json_response, validate_uuid};
use crate::core::store::KeyValue;
use crate::models::models::User;

pub fn follow_user<S: KeyValue>(
    store: &S,
    follower_id: &str,
    followed_id: &str,
) -> anyhow::Result<()> {
    let mut followings: Vec<String> = store
        .get_json(&followings_key(follower_id))?
        .unwrap_or_default();

    if !followings.contains(&followed_id.to_string()) {
        followings.push(followed_id.to_string());
        store.set_json(&followings_key(follower_id), &followings)?;
    }

    let mut followers: Vec<String> = store
        .get_json(&followers_key(followed_id))?
        .unwrap_or_default();

    if !followers.contains(&follower_id.to_string()) {
        followers.push(follower_id.to_string());
        store.set_json(&followers_key(followed_id), &followers)?;
    }

    Ok(())
}

pub fn unfollow_user<S: KeyValue>(
    store: &S,
    follower_id: &str,
    followed_id: &str,
) -> anyhow::Result<()> {
    let mut followings: Vec<String> = store
        .get_json(&followings_key(follower_id))?
        .unwrap_or_default();
    followings.retain(|id| id != followed_id);
    store.set_json(&followings_key(follower_id), &followings)?;

    let mut followers: Vec<String> = store
        .get_json(&followers_key(followed_id))?
        .unwrap_or_default();
    followers.retain(|id| id != follower_id);
    store.set_json(&followers_key(followed_id), &followers)?;

    Ok(())
}

pub fn is_following<S: KeyValue>(
    store: &S,
    follower_id: &str,
    followed_id: &str,
) -> anyhow::Result<bool> {
    let followings: Vec<String> = store
        .get_json(&followings_key(follower_id))?
        .unwrap_or_default();

    Ok(followings.contains(&followed_id.to_string()))
}

pub fn get_followings<S: KeyValue>(store: &S, user_id: &str) -> anyhow::Result<Vec<String>> {
    Ok(store
        .get_json(&followings_key(user_id))?
        .unwrap_or_default())
}

pub fn get_followers<S: KeyValue>(store: &S, user_id: &str) -> anyhow::Result<Vec<String>> {
    Ok(store.get_json(&followers_key(user_id))?.unwrap_or_default())
}

// === HTTP Handlers ===

pub fn handle_follow<S: KeyValue>(store: &S, req: Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let value: serde_json::Value = serde_json::from_slice(req.body())?;
    let target_user_id = value["target_user_id"].as_str().unwrap_or_default();

    if target_user_id.is_empty() || !validate_uuid(target_user_id) || target_user_id == user_id {
        return Ok(ApiError::BadRequest("Invalid target user".to_string()).into());
    }

    if store
        .get_json::<User>(&user_key(target_user_id))?
        .is_none()
    {
        return Ok(ApiError::NotFound("Target user not found".to_string()).into());
    }

    follow_user(store, &user_id, target_user_id)?;

    json_response(200, &serde_json::json!({ "status": "followed" }))
}

pub fn handle_unfollow<S: KeyValue>(store: &S, req: Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let value: serde_json::Value = serde_json::from_slice(req.body())?;
    let target_user_id = value["target_user_id"].as_str().unwrap_or_default();

    if target_user_id.is_empty() || !validate_uuid(target_user_id) {
        return Ok(ApiError::BadRequest("Invalid target user".to_string()).into());
    }

    unfollow_user(store, &user_id, target_user_id)?;

    json_response(200, &serde_json::json!({ "status": "unfollowed" }))
}

pub fn get_followings_list<S: KeyValue>(store: &S, path: &str) -> anyhow::Result<Response> {
    let user_id = path.trim_start_matches("/followings/");

    if user_id.is_empty() || !validate_uuid(user_id) {
        return Ok(ApiError::BadRequest("User ID required".to_string()).into());
    }

    let followings = get_followings(store, user_id)?;
    json_response(200, &serde_json::json!(followings))
}

pub fn get_followers_list<S: KeyValue>(store: &S, path: &str) -> anyhow::Result<Response> {
    let user_id = path.trim_start_matches("/followers/");

    if user_id.is_empty() || !validate_uuid(user_id) {
        return Ok(ApiError::BadRequest("User ID required".to_string()).into());
    }

    let followers = get_followers(store, user_id)?;
    json_response(200, &serde_json::json!(followers))
}
