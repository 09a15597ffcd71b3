//! Request translation: preflight, path and header rewriting, forwarding,
//! auditing, and response relay.

pub mod audit;
pub mod correlation;
pub mod cors;
pub mod error;
pub mod forward;
pub mod headers;
pub mod path;
pub mod relay;
pub mod supabase;
