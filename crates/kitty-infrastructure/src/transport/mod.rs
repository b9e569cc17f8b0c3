//! Implementations of the backend call contract.

mod bridge;
mod http;

pub use bridge::{CommandHandler, InProcessBridge};
pub use http::{HttpBackendClient, REQUEST_ID_HEADER};

/// First `max` characters of a reply body, for error messages
pub(crate) fn excerpt(body: &str, max: usize) -> String {
    let mut out: String = body.chars().take(max).collect();
    if body.chars().count() > max {
        out.push_str("...");
    }
    out
}
