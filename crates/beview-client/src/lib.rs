//! Typed client for the BeReal mobile API, routed through `beview-proxy`.
//!
//! Credentials live in an explicit [`Session`] value owned by the caller and
//! passed into every call that needs them:
//!
//! ```rust,no_run
//! use beview_client::{BeViewClient, Session};
//!
//! # async fn example() -> beview_client::Result<()> {
//! let client = BeViewClient::new("http://localhost:3080/bereal-proxy")?;
//! let mut session = Session::new();
//!
//! client.send_otp("+15550100").await?;
//! client.verify_otp(&mut session, "+15550100", "123456").await?;
//!
//! for post in client.friends_feed(&mut session, 0).await? {
//!     println!("{}: {:?}", post.user.username, post.caption);
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod content;
pub mod error;
pub mod session;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::BeViewClient;
pub use error::{ClientError, Result};
pub use session::{Credentials, Session, SessionState};
pub use types::{AuthTokens, Post, User};
