//! In-process stand-in for the proxied BeReal API.
//!
//! Valid access token is `fresh`; refresh token `r-ok` rotates to `r-next`.

use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::BeViewClient;

pub const MOUNT: &str = "bereal-proxy";
pub const VALID_TOKEN: &str = "fresh";
pub const VALID_REFRESH: &str = "r-ok";

#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

pub type Recorded = Arc<Mutex<Vec<Seen>>>;

pub fn post_json(id: &str) -> Value {
    json!({
        "id": id,
        "user": {
            "id": "u1",
            "username": "alice",
            "profilePicture": { "url": "https://cdn.example/alice.jpg" }
        },
        "photoURL": format!("https://cdn.example/{id}-primary.jpg"),
        "secondaryPhotoURL": format!("https://cdn.example/{id}-secondary.jpg"),
        "caption": "sunset",
        "location": { "name": "Lisbon" },
        "takenAt": "2024-06-01T19:30:00Z",
        "realmojis": [],
        "comment": { "count": 2 }
    })
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn handle(
    State(recorded): State<Recorded>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let authorization = header("authorization");

    recorded.lock().unwrap().push(Seen {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: authorization.clone(),
        content_type: header("content-type"),
        body: body.clone(),
    });

    let Some(endpoint) = uri.path().strip_prefix(&format!("/{MOUNT}/")) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if endpoint.starts_with("content/")
        && authorization.as_deref() != Some(format!("Bearer {VALID_TOKEN}").as_str())
    {
        return message(StatusCode::UNAUTHORIZED, "Token expired");
    }

    match (method.as_str(), endpoint) {
        ("POST", "person/otp") => match body["phoneNumber"].as_str() {
            Some("+10000000000") => message(StatusCode::BAD_REQUEST, "Invalid phone number"),
            Some("+19999999999") => (StatusCode::BAD_GATEWAY, "upstream down").into_response(),
            _ => Json(json!({ "vonageRequestId": "req-1" })).into_response(),
        },
        ("POST", "person/otp/verify") => {
            if body["code"] == "123456" {
                Json(json!({
                    "token": VALID_TOKEN,
                    "refreshToken": VALID_REFRESH,
                    "userId": "u1"
                }))
                .into_response()
            } else {
                message(StatusCode::BAD_REQUEST, "Invalid code")
            }
        }
        ("POST", "person/refresh-token") => {
            if body["refreshToken"] == VALID_REFRESH {
                Json(json!({ "token": VALID_TOKEN, "refreshToken": "r-next" })).into_response()
            } else {
                message(StatusCode::UNAUTHORIZED, "Invalid refresh token")
            }
        }
        ("GET", "content/friends") => {
            Json(json!({ "posts": [post_json("friend-1"), post_json("friend-2")] }))
                .into_response()
        }
        ("GET", "content/discovery") => {
            Json(json!({ "posts": [post_json("discover-1")] })).into_response()
        }
        ("GET", "content/posts/missing") => {
            message(StatusCode::NOT_FOUND, "Post not found")
        }
        ("GET", path) if path.starts_with("content/posts/") => {
            let id = path.trim_start_matches("content/posts/");
            Json(post_json(id)).into_response()
        }
        ("GET", "content/comments") => Json(json!({
            "comments": [{ "id": "c1", "content": "nice shot" }]
        }))
        .into_response(),
        ("POST", "content/comments") | ("POST", "content/realmojis") => {
            StatusCode::OK.into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Spawn the mock API and return a client pointed at its mount.
pub async fn spawn_api() -> (BeViewClient, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .fallback(handle)
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = BeViewClient::new(&format!("http://{addr}/{MOUNT}")).unwrap();
    (client, recorded)
}
