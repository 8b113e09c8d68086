//! HTTP protocol layer module
//!
//! Response builders shared by the request handler, decoupled from the
//! action routing logic.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_400_response, build_404_response, build_405_response, build_413_response,
    build_health_response, build_json_response, build_options_response, INVOKE_ALLOW,
};
