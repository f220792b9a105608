use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub about_me: Option<String>,
    pub last_seen: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub body: String,
    pub timestamp: String,
    pub language: Option<String>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct SessionData {
    pub user_id: String,
    pub created_at: String,
}
