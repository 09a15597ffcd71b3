//! Feeds, posts, comments and RealMoji reactions.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use crate::client::{api_error, decode, BeViewClient};
use crate::error::{ClientError, Result};
use crate::session::Session;
use crate::types::{CommentsResponse, FeedResponse, Post, RawPost};

impl BeViewClient {
    /// Posts from the user's friends, one page at a time starting at 0.
    pub async fn friends_feed(&self, session: &mut Session, page: u32) -> Result<Vec<Post>> {
        self.feed(session, "friends", page).await
    }

    /// Public posts from the discovery feed.
    pub async fn discovery_feed(&self, session: &mut Session, page: u32) -> Result<Vec<Post>> {
        self.feed(session, "discovery", page).await
    }

    pub async fn post(&self, session: &mut Session, post_id: &str) -> Result<Post> {
        let resp = self
            .authorized(session, || {
                self.request(Method::GET, &["content", "posts", post_id])
            })
            .await?;
        let raw: RawPost = decode(resp).await?;
        Ok(raw.into())
    }

    pub async fn add_realmoji(
        &self,
        session: &mut Session,
        post_id: &str,
        image_url: &str,
        kind: &str,
    ) -> Result<()> {
        let body = json!({ "postId": post_id, "imageUrl": image_url, "type": kind });
        self.authorized(session, || {
            self.request(Method::POST, &["content", "realmojis"])
                .json(&body)
        })
        .await?;
        Ok(())
    }

    /// Raw comment objects for a post.
    pub async fn comments(&self, session: &mut Session, post_id: &str) -> Result<Vec<Value>> {
        let resp = self
            .authorized(session, || {
                self.request(Method::GET, &["content", "comments"])
                    .query(&[("postId", post_id)])
            })
            .await?;
        let comments: CommentsResponse = decode(resp).await?;
        Ok(comments.comments)
    }

    pub async fn add_comment(&self, session: &mut Session, post_id: &str, content: &str) -> Result<()> {
        let body = json!({ "postId": post_id, "content": content });
        self.authorized(session, || {
            self.request(Method::POST, &["content", "comments"])
                .json(&body)
        })
        .await?;
        Ok(())
    }

    async fn feed(&self, session: &mut Session, kind: &str, page: u32) -> Result<Vec<Post>> {
        let resp = self
            .authorized(session, || {
                self.request(Method::GET, &["content", kind])
                    .query(&[("page", page)])
            })
            .await?;
        let feed: FeedResponse = decode(resp).await?;
        tracing::debug!(feed = kind, page, posts = feed.posts.len(), "Fetched feed");
        Ok(feed.posts.into_iter().map(Post::from).collect())
    }

    /// Send with the session's bearer token. A 401 triggers one refresh and
    /// one retry; if the refresh fails the call fails with
    /// [`ClientError::AuthenticationFailed`].
    async fn authorized<F>(&self, session: &mut Session, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let token = session.access_token().ok_or(ClientError::NotAuthenticated)?;
        let resp = build().bearer_auth(token).send().await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return success(resp).await;
        }

        tracing::debug!("Access token rejected, refreshing session");
        if self.refresh_token(session).await.is_err() {
            return Err(ClientError::AuthenticationFailed);
        }

        let token = session.access_token().ok_or(ClientError::NotAuthenticated)?;
        let resp = build().bearer_auth(token).send().await?;
        success(resp).await
    }
}

async fn success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(api_error(resp, format!("API error: {}", status.as_u16())).await)
    }
}
