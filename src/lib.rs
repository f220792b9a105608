pub mod auth;
pub mod config;
pub mod core;
pub mod feed;
pub mod follow;
pub mod mail;
pub mod models;
pub mod posts;
pub mod token;
pub mod users;

use spin_sdk::http::{Request, Response};

use crate::core::store::KeyValue;
use crate::mail::Mailer;

/// Explicit route table shared by the Spin component and the native server.
pub fn route<S: KeyValue>(
    store: &S,
    mailer: &dyn Mailer,
    req: Request,
) -> anyhow::Result<Response> {
    let path = req.path().to_string();
    let method = req.method().to_string();

    match (method.as_str(), path.as_str()) {
        ("POST", "/users") => users::register(store, req),
        ("POST", "/login") => auth::login(store, req),
        ("POST", "/logout") => auth::logout(store, req),
        ("GET", "/profile") => users::get_profile(store, req),
        ("PUT", "/profile") => users::update_profile(store, req),
        ("POST", "/posts") => posts::create_post(store, req),
        ("GET", "/posts") => posts::list_posts(store, req),
        ("GET", "/feed") => feed::get_feed(store, req),
        ("POST", "/follow") => follow::handle_follow(store, req),
        ("POST", "/unfollow") => follow::handle_unfollow(store, req),
        ("POST", "/reset_password_request") => auth::reset_password_request(store, mailer, req),
        ("POST", p) if p.starts_with("/reset_password/") => auth::reset_password(store, req),
        ("GET", p) if p.starts_with("/followings/") => follow::get_followings_list(store, p),
        ("GET", p) if p.starts_with("/followers/") => follow::get_followers_list(store, p),
        ("GET", p) if p.starts_with("/users/") && p.len() > 7 => users::get_user_details(store, p),
        _ => Ok(Response::builder()
            .status(404)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&serde_json::json!({ "error": "No route found" }))?)
            .build()),
    }
}

#[cfg(target_arch = "wasm32")]
mod component {
    use spin_sdk::http::{IntoResponse, Request};
    use spin_sdk::http_component;
    use spin_sdk::key_value::Store;

    use crate::mail::OutboxMailer;

    #[http_component]
    fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
        let store = Store::open_default()?;
        let mailer = OutboxMailer::new(Store::open_default()?);
        crate::route(&store, &mailer, req)
    }
}
