use spin_sdk::http::{Request, Response};
use uuid::Uuid;

use crate::auth::validate_token;
use crate::config::{self, post_key, MAX_POST_LENGTH, POSTS_LIST_KEY};
use crate::core::errors::ApiError;
use crate::core::helpers::{json_response, now_iso, sanitize_text};
use crate::core::query_params::{get_bool_flag, get_page, get_string, parse_query_params};
use crate::core::store::KeyValue;
use crate::models::models::Post;
use crate::users::find_by_username;

/// Walks the global post list (newest first) and keeps the posts matching
/// the filter.
pub fn collect_posts<S, F>(store: &S, filter: F) -> anyhow::Result<Vec<Post>>
where
    S: KeyValue,
    F: Fn(&Post) -> bool,
{
    let ids: Vec<String> = store.get_json(POSTS_LIST_KEY)?.unwrap_or_default();
    let mut posts = Vec::new();
    for id in &ids {
        if let Some(post) = store.get_json::<Post>(&post_key(id))? {
            if filter(&post) {
                posts.push(post);
            }
        }
    }
    Ok(posts)
}

pub fn paginate(posts: Vec<Post>, page: usize, per_page: usize) -> Vec<Post> {
    posts
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect()
}

pub fn create_post<S: KeyValue>(store: &S, req: Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let value: serde_json::Value = serde_json::from_slice(req.body())?;
    let body = sanitize_text(value["body"].as_str().unwrap_or_default());

    if body.is_empty() || body.chars().count() > MAX_POST_LENGTH {
        return Ok(ApiError::BadRequest("Post must be 1-140 characters".to_string()).into());
    }

    // Unknown language codes are dropped rather than rejected.
    let language = value["language"]
        .as_str()
        .map(str::to_string)
        .filter(|code| config::languages().contains(code));

    let id = Uuid::new_v4().to_string();
    let post = Post {
        id: id.clone(),
        user_id,
        body,
        timestamp: now_iso(),
        language,
    };

    store.set_json(&post_key(&id), &post)?;

    let mut posts: Vec<String> = store.get_json(POSTS_LIST_KEY)?.unwrap_or_default();
    posts.insert(0, id); // prepend newest
    store.set_json(POSTS_LIST_KEY, &posts)?;

    json_response(201, &serde_json::json!(post))
}

pub fn list_posts<S: KeyValue>(store: &S, req: Request) -> anyhow::Result<Response> {
    let params = parse_query_params(req.uri());
    let filter_username = get_string(&params, "user");
    let show_all = get_bool_flag(&params, "all");
    let page = get_page(&params);
    let per_page = config::posts_per_page();

    let posts = if let Some(username) = filter_username {
        // Public query: posts for a specific username.
        match find_by_username(store, &username)? {
            Some(user) => collect_posts(store, |p| p.user_id == user.id)?,
            None => Vec::new(),
        }
    } else if show_all {
        // Public explore listing.
        collect_posts(store, |_| true)?
    } else {
        // Authenticated query: the caller's own posts.
        let user_id = match validate_token(store, &req) {
            Some(uid) => uid,
            None => return Ok(ApiError::Unauthorized.into()),
        };
        collect_posts(store, |p| p.user_id == user_id)?
    };

    json_response(200, &serde_json::json!(paginate(posts, page, per_page)))
}
