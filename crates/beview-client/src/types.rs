//! Domain types and the raw API shapes they are mapped from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tokens issued by `person/otp/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub profile_picture: Option<String>,
}

/// A dual-camera post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub user: User,
    pub primary: String,
    pub secondary: String,
    pub caption: Option<String>,
    pub location: Option<String>,
    pub taken_at: String,
    pub realmojis: Vec<Value>,
    pub comments: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPost {
    id: String,
    user: RawUser,
    #[serde(rename = "photoURL")]
    photo_url: String,
    #[serde(rename = "secondaryPhotoURL")]
    secondary_photo_url: String,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    location: Option<RawLocation>,
    taken_at: String,
    #[serde(default)]
    realmojis: Option<Vec<Value>>,
    #[serde(default)]
    comment: Option<RawCommentCount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    id: String,
    username: String,
    #[serde(default)]
    profile_picture: Option<RawPicture>,
}

#[derive(Debug, Deserialize)]
struct RawPicture {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCommentCount {
    #[serde(default)]
    count: u64,
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        Self {
            id: raw.id,
            user: User {
                id: raw.user.id,
                username: raw.user.username,
                profile_picture: raw.user.profile_picture.and_then(|p| p.url),
            },
            primary: raw.photo_url,
            secondary: raw.secondary_photo_url,
            caption: raw.caption,
            location: raw.location.and_then(|l| l.name),
            taken_at: raw.taken_at,
            realmojis: raw.realmojis.unwrap_or_default(),
            comments: raw.comment.map(|c| c.count).unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedResponse {
    pub posts: Vec<RawPost>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentsResponse {
    pub comments: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
}

/// Error payload the API returns alongside non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: Option<String>,
}
