use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use playtrack_app::{build_application, domain::credentials::BcryptPasswordHasher};
use playtrack_avatar_fs::FsAvatarStorage;
use playtrack_persistence_memory::{InMemoryAnalytics, InMemoryGraphStore};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestServer {
    router: Router,
    _uploads: TempDir,
}

impl TestServer {
    fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let graph = Arc::new(InMemoryGraphStore::new());
        let app = build_application(
            graph.clone(),
            graph.clone(),
            graph.clone(),
            graph.clone(),
            graph,
            Arc::new(InMemoryAnalytics::new()),
            Arc::new(FsAvatarStorage::new(uploads.path())),
            Arc::new(BcryptPasswordHasher::new(4)),
            1000,
        );
        Self {
            router: playtrack_http_api::router(Arc::new(app), uploads.path().to_path_buf()),
            _uploads: uploads,
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(body) => {
                self.send_raw(method, uri, token, Some("application/json"), body.to_string())
                    .await
            }
            None => self.send_raw(method, uri, token, None, String::new()).await,
        }
    }

    async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: String,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let request = request.body(Body::from(body)).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Signs the player up and returns a session token.
    async fn player(&self, username: &str) -> String {
        let (status, _) = self
            .send(
                "POST",
                "/api/players",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "secret123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self
            .send(
                "POST",
                "/api/players/login",
                None,
                Some(json!({ "username": username, "password": "secret123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn game(&self, title: &str) {
        let (status, _) = self
            .send("POST", "/api/games", None, Some(json!({ "title": title })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::new();
    let (status, body) = server.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn test_signup_and_login() {
    let server = TestServer::new();
    let (status, body) = server
        .send(
            "POST",
            "/api/players",
            None,
            Some(json!({ "username": "alice", "email": "alice@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["player"]["username"], "alice");
    assert_eq!(body["player"]["age"], 18);
    assert!(body["player"].get("passwordHash").is_none());

    let (status, body) = server
        .send(
            "POST",
            "/api/players",
            None,
            Some(json!({ "username": "alice", "email": "other@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username already exists");

    let (status, body) = server
        .send(
            "POST",
            "/api/players/login",
            None,
            Some(json!({ "username": "alice", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, body) = server
        .send(
            "POST",
            "/api/players/login",
            None,
            Some(json!({ "username": "alice", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_rating_requires_owner_token_and_valid_score() {
    let server = TestServer::new();
    let alice = server.player("alice").await;
    let bob = server.player("bob").await;
    server.game("Chess").await;

    let rate = |score: i64| json!({ "gameTitle": "Chess", "rating": score });

    let (status, _) = server
        .send("POST", "/api/players/alice/rate", None, Some(rate(4)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server
        .send("POST", "/api/players/alice/rate", Some(&bob), Some(rate(4)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server
        .send("POST", "/api/players/alice/rate", Some(&alice), Some(rate(0)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Rating must be between 1 and 5");

    let (status, body) = server
        .send("POST", "/api/players/alice/rate", Some(&alice), Some(rate(5)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 5);

    let (status, body) = server
        .send("GET", "/api/players/alice/profile", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["ratedGamesCount"], 1);
    assert_eq!(body["stats"]["averageRating"], "5.00");
}

#[tokio::test]
async fn test_follow_is_idempotent() {
    let server = TestServer::new();
    let alice = server.player("alice").await;
    server.player("bob").await;

    for _ in 0..2 {
        let (status, _) = server
            .send(
                "POST",
                "/api/players/alice/follow",
                Some(&alice),
                Some(json!({ "targetUsername": "bob" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) = server
        .send("GET", "/api/players/alice/is-following/bob", None, None)
        .await;
    assert_eq!(body["isFollowing"], true);
    let (_, body) = server
        .send("GET", "/api/players/alice/profile", None, None)
        .await;
    assert_eq!(body["friendsList"].as_array().unwrap().len(), 1);

    let (status, _) = server
        .send(
            "POST",
            "/api/players/alice/follow",
            Some(&alice),
            Some(json!({ "targetUsername": "alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_social_distance_through_intermediary() {
    let server = TestServer::new();
    let alice = server.player("alice").await;
    let bob = server.player("bob").await;
    let carol = server.player("carol").await;
    server.game("Chess").await;

    for (from, token, to) in [("alice", &alice, "bob"), ("bob", &bob, "carol")] {
        let (status, _) = server
            .send(
                "POST",
                &format!("/api/players/{}/follow", from),
                Some(token),
                Some(json!({ "targetUsername": to })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = server
        .send(
            "POST",
            "/api/players/carol/rate",
            Some(&carol),
            Some(json!({ "gameTitle": "Chess", "rating": 4 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .send(
            "POST",
            "/api/social-graph/depth",
            None,
            Some(json!({ "username": "alice", "gameTitle": "Chess" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connections"], json!([{ "username": "carol", "depth": 2 }]));
    assert_eq!(body["intermediaries"], json!(["bob"]));
    assert_eq!(body["truncated"], false);

    let (status, _) = server
        .send(
            "POST",
            "/api/social-graph/depth",
            None,
            Some(json!({ "username": "alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_author_edits_topic() {
    let server = TestServer::new();
    let alice = server.player("alice").await;
    let bob = server.player("bob").await;

    let (status, topic) = server
        .send(
            "POST",
            "/api/topics",
            Some(&alice),
            Some(json!({
                "title": "Opening theory",
                "content": "Which Chess opening do you play?",
                "authorUsername": "alice",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(topic["category"], "general");
    let uri = format!("/api/topics/{}", topic["id"].as_str().unwrap());

    let (status, _) = server
        .send(
            "PUT",
            &uri,
            Some(&bob),
            Some(json!({ "content": "hijacked", "username": "bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server
        .send(
            "POST",
            &format!("{}/comments", uri),
            Some(&bob),
            Some(json!({ "content": "Sicilian", "authorUsername": "bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, page) = server.send("GET", "/api/topics", None, None).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["topics"][0]["commentCount"], 1);

    let (status, _) = server
        .send("DELETE", &uri, Some(&alice), Some(json!({ "username": "alice" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.send("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server.send("GET", "/api/topics/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_short_search_returns_nothing() {
    let server = TestServer::new();
    server.player("alice").await;

    let (status, body) = server.send("GET", "/api/users/search?q=a", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"], json!([]));

    let (_, body) = server.send("GET", "/api/users/search?q=al", None, None).await;
    assert_eq!(body["users"][0]["username"], "alice");
    assert_eq!(body["users"][0]["friendsCount"], 0);
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let server = TestServer::new();
    server.player("max_power").await;
    server.player("maxipower").await;

    let (status, body) = server.send("GET", "/api/users/search?q=x_", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "max_power");

    let (_, body) = server.send("GET", "/api/users/search?q=%25%25", None, None).await;
    assert_eq!(body["users"], json!([]));
}

#[tokio::test]
async fn test_leaderboard_direct_writes() {
    let server = TestServer::new();
    server.player("alice").await;

    let (status, body) = server
        .send(
            "POST",
            "/api/stats/activity",
            None,
            Some(json!({ "username": "alice", "activityType": "tournament", "points": 500 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalScore"], 500);

    let (status, _) = server
        .send(
            "POST",
            "/api/leaderboard/game",
            None,
            Some(json!({ "gameTitle": "Chess", "username": "alice", "score": 42 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, board) = server
        .send("GET", "/api/leaderboard/game/Chess?limit=5", None, None)
        .await;
    assert_eq!(board, json!([{ "rank": 1, "username": "alice", "score": 42, "updatedAt": board[0]["updatedAt"] }]));

    let (_, summary) = server
        .send("GET", "/api/stats/leaderboard-summary", None, None)
        .await;
    assert_eq!(summary["totalTimeActive"], 0);
}

#[tokio::test]
async fn test_unreadable_bodies_are_bad_requests() {
    let server = TestServer::new();
    let alice = server.player("alice").await;
    server.game("Chess").await;

    let (status, body) = server
        .send(
            "POST",
            "/api/players/alice/rate",
            Some(&alice),
            Some(json!({ "gameTitle": "Chess", "rating": 3.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = server
        .send_raw(
            "POST",
            "/api/players/alice/follow",
            Some(&alice),
            Some("application/json"),
            "{\"targetUsername\":".to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = server
        .send_raw(
            "POST",
            "/api/players",
            None,
            None,
            json!({ "username": "bob" }).to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = server.send("GET", "/api/topics?page=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
