//! Request handler module
//!
//! Responsible for request routing dispatch: health checks and the action
//! group invoke endpoint.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
