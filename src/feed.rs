//! Feed composition: the union of a user's own posts and the posts of every
//! user they follow, newest first.

use spin_sdk::http::{Request, Response};

use crate::auth::validate_token;
use crate::config;
use crate::core::errors::ApiError;
use crate::core::helpers::json_response;
use crate::core::query_params::{get_page, parse_query_params};
use crate::core::store::KeyValue;
use crate::follow::get_followings;
use crate::models::models::Post;
use crate::posts::{collect_posts, paginate};

/// Recomputed from current state on every call; no caching between
/// pagination windows. A post cannot appear twice because authorship is
/// single-valued. Ordering is timestamp descending with id descending as a
/// deterministic tie-breaker.
pub fn followed_posts<S: KeyValue>(store: &S, user_id: &str) -> anyhow::Result<Vec<Post>> {
    let followed = get_followings(store, user_id)?;

    let mut posts = collect_posts(store, |p| {
        p.user_id == user_id || followed.contains(&p.user_id)
    })?;

    posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));

    Ok(posts)
}

pub fn get_feed<S: KeyValue>(store: &S, req: Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let params = parse_query_params(req.uri());
    let page = get_page(&params);

    let posts = followed_posts(store, &user_id)?;
    let window = paginate(posts, page, config::posts_per_page());

    json_response(200, &serde_json::json!(window))
}
