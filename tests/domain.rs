//! Unit-level checks for the graph, feed, token, and credential primitives,
//! exercised directly against an in-memory store.

use acorn::config::{self, post_key, user_key, POSTS_LIST_KEY};
use acorn::core::helpers::{hash_password, verify_password};
use acorn::core::store::{KeyValue, MemStore};
use acorn::feed::followed_posts;
use acorn::follow::{follow_user, get_followers, get_followings, is_following, unfollow_user};
use acorn::mail::{MailMessage, Mailer, OutboxMailer};
use acorn::models::models::{Post, User};
use acorn::posts::paginate;
use acorn::token;

fn seed_user(store: &MemStore, id: &str, username: &str) {
    let user = User {
        id: id.to_string(),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: "x".to_string(),
        about_me: None,
        last_seen: "2026-01-01T00:00:00.000000Z".to_string(),
    };
    store.set_json(&user_key(id), &user).unwrap();
}

fn seed_post(store: &MemStore, id: &str, user_id: &str, body: &str, second: u32) {
    let post = Post {
        id: id.to_string(),
        user_id: user_id.to_string(),
        body: body.to_string(),
        timestamp: format!("2026-01-01T00:00:{:02}.000000Z", second),
        language: None,
    };
    store.set_json(&post_key(id), &post).unwrap();

    let mut list: Vec<String> = store.get_json(POSTS_LIST_KEY).unwrap().unwrap_or_default();
    list.insert(0, id.to_string());
    store.set_json(POSTS_LIST_KEY, &list).unwrap();
}

#[test]
fn follow_is_idempotent_and_tracked_both_ways() {
    let store = MemStore::new();

    follow_user(&store, "a", "b").unwrap();
    follow_user(&store, "a", "b").unwrap();

    assert!(is_following(&store, "a", "b").unwrap());
    assert!(!is_following(&store, "b", "a").unwrap());
    assert_eq!(get_followings(&store, "a").unwrap(), vec!["b".to_string()]);
    assert_eq!(get_followers(&store, "b").unwrap(), vec!["a".to_string()]);
}

#[test]
fn unfollow_is_idempotent_and_clears_both_indexes() {
    let store = MemStore::new();

    follow_user(&store, "a", "b").unwrap();
    unfollow_user(&store, "a", "b").unwrap();
    unfollow_user(&store, "a", "b").unwrap();

    assert!(!is_following(&store, "a", "b").unwrap());
    assert!(get_followings(&store, "a").unwrap().is_empty());
    assert!(get_followers(&store, "b").unwrap().is_empty());
}

#[test]
fn unfollow_without_follow_is_a_no_op() {
    let store = MemStore::new();
    unfollow_user(&store, "a", "b").unwrap();
    assert!(!is_following(&store, "a", "b").unwrap());
}

#[test]
fn feed_unions_own_and_followed_posts() {
    let store = MemStore::new();
    follow_user(&store, "a", "b").unwrap();

    seed_post(&store, "p1", "a", "mine", 1);
    seed_post(&store, "p2", "b", "theirs", 2);
    seed_post(&store, "p3", "c", "unrelated", 3);

    let feed = followed_posts(&store, "a").unwrap();
    let bodies: Vec<&str> = feed.iter().map(|p| p.body.as_str()).collect();
    assert_eq!(bodies, vec!["theirs", "mine"]);
}

#[test]
fn feed_sorts_newest_first_with_id_tiebreak() {
    let store = MemStore::new();

    seed_post(&store, "p1", "a", "oldest", 1);
    seed_post(&store, "p3", "a", "tied high id", 2);
    seed_post(&store, "p2", "a", "tied low id", 2);

    let feed = followed_posts(&store, "a").unwrap();
    let ids: Vec<&str> = feed.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p3", "p2", "p1"]);
}

#[test]
fn pagination_windows_are_disjoint_and_exhaustive() {
    let posts: Vec<Post> = (0..25)
        .map(|i| Post {
            id: format!("p{}", i),
            user_id: "a".to_string(),
            body: format!("post {}", i),
            timestamp: format!("2026-01-01T00:00:{:02}.000000Z", i),
            language: None,
        })
        .collect();

    let page1 = paginate(posts.clone(), 1, 10);
    let page2 = paginate(posts.clone(), 2, 10);
    let page3 = paginate(posts.clone(), 3, 10);
    let page4 = paginate(posts, 4, 10);

    assert_eq!(page1.len(), 10);
    assert_eq!(page2.len(), 10);
    assert_eq!(page3.len(), 5);
    assert!(page4.is_empty());
    assert_ne!(page1[0].id, page2[0].id);
}

#[test]
fn reset_token_round_trip() {
    let store = MemStore::new();
    seed_user(&store, "u1", "alice");

    let token = token::issue("secret", "u1", 600).unwrap();
    let user = token::verify(&store, "secret", &token).expect("token should resolve");
    assert_eq!(user.id, "u1");
}

#[test]
fn reset_token_rejects_wrong_key_and_tampering() {
    let store = MemStore::new();
    seed_user(&store, "u1", "alice");

    let token = token::issue("secret", "u1", 600).unwrap();
    assert!(token::verify(&store, "other-secret", &token).is_none());

    // Flip the payload while keeping the signature.
    let (_, signature) = token.split_once('.').unwrap();
    let forged = format!("eyJmb3JnZWQiOnRydWV9.{}", signature);
    assert!(token::verify(&store, "secret", &forged).is_none());

    assert!(token::verify(&store, "secret", "garbage").is_none());
}

#[test]
fn reset_token_expires() {
    let store = MemStore::new();
    seed_user(&store, "u1", "alice");

    let token = token::issue("secret", "u1", 0).unwrap();
    assert!(token::verify(&store, "secret", &token).is_none());
}

#[test]
fn reset_token_for_missing_user_fails() {
    let store = MemStore::new();
    let token = token::issue("secret", "ghost", 600).unwrap();
    assert!(token::verify(&store, "secret", &token).is_none());
}

#[test]
fn password_hashing_round_trip() {
    let hash = hash_password("hunter2").unwrap();
    assert_ne!(hash, "hunter2");
    assert!(verify_password("hunter2", &hash));
    assert!(!verify_password("hunter3", &hash));

    // Same password, fresh salt, different hash.
    let second = hash_password("hunter2").unwrap();
    assert_ne!(hash, second);
}

#[test]
fn outbox_mailer_caps_queued_messages() {
    let store = MemStore::new();
    let mailer = OutboxMailer::with_capacity(store.clone(), 2);

    for i in 0..3 {
        mailer.send(MailMessage {
            subject: format!("message {}", i),
            sender: "no-reply@example.com".to_string(),
            recipients: vec!["alice@example.com".to_string()],
            text_body: "body".to_string(),
            html_body: "<p>body</p>".to_string(),
        });
    }

    let outbox: Vec<MailMessage> = store
        .get_json(config::MAIL_OUTBOX_KEY)
        .unwrap()
        .unwrap_or_default();
    assert_eq!(outbox.len(), 2);
    assert_eq!(outbox[0].subject, "message 0");
    assert_eq!(outbox[1].subject, "message 1");
}
