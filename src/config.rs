//! Application-wide knobs, sourced from the environment with sensible
//! defaults, plus the key-builder functions for the KV layout.

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 64;
pub const MAX_EMAIL_LENGTH: usize = 120;
pub const MIN_PASSWORD_LENGTH: usize = 3;
pub const MAX_POST_LENGTH: usize = 140;
pub const MAX_ABOUT_ME_LENGTH: usize = 140;

pub const USERS_LIST_KEY: &str = "users_list";
pub const POSTS_LIST_KEY: &str = "posts";
pub const SESSIONS_LIST_KEY: &str = "sessions_list";
pub const MAIL_OUTBOX_KEY: &str = "mail_outbox";

pub fn user_key(id: &str) -> String {
    format!("user:{}", id)
}

pub fn post_key(id: &str) -> String {
    format!("post:{}", id)
}

pub fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

pub fn followings_key(user_id: &str) -> String {
    format!("followings:{}", user_id)
}

pub fn followers_key(user_id: &str) -> String {
    format!("followers:{}", user_id)
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

pub fn secret_key() -> String {
    std::env::var("SECRET_KEY").unwrap_or_else(|_| "you-will-never-guess".to_string())
}

pub fn posts_per_page() -> usize {
    env_or("POSTS_PER_PAGE", 10).max(1)
}

pub fn session_expiration_hours() -> i64 {
    env_or("SESSION_EXPIRATION_HOURS", 24)
}

pub fn reset_token_ttl_secs() -> i64 {
    env_or("PASSWORD_RESET_TTL_SECS", 600)
}

pub fn mail_server() -> Option<String> {
    std::env::var("MAIL_SERVER").ok().filter(|s| !s.is_empty())
}

pub fn mail_port() -> u16 {
    env_or("MAIL_PORT", 25)
}

pub fn mail_use_tls() -> bool {
    std::env::var("MAIL_USE_TLS").is_ok()
}

pub fn mail_username() -> Option<String> {
    std::env::var("MAIL_USERNAME").ok().filter(|s| !s.is_empty())
}

pub fn mail_password() -> Option<String> {
    std::env::var("MAIL_PASSWORD").ok().filter(|s| !s.is_empty())
}

pub fn mail_queue_capacity() -> usize {
    env_or("MAIL_QUEUE_CAPACITY", 64).max(1)
}

pub fn mail_workers() -> usize {
    env_or("MAIL_WORKERS", 2).max(1)
}

/// Addresses that receive operational notices; the first one doubles as the
/// sender for outgoing application mail.
pub fn admins() -> Vec<String> {
    std::env::var("ADMINS")
        .unwrap_or_else(|_| "admin@example.com".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Locale codes a post may be tagged with.
pub fn languages() -> Vec<String> {
    std::env::var("LANGUAGES")
        .unwrap_or_else(|_| "en,fr".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
