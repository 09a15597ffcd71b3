//! Request id generation for log correlation.
//!
//! Ids only appear on spans and log lines; they are never sent upstream or
//! added to relayed responses.

use uuid::Uuid;

/// Generate a new request id (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
