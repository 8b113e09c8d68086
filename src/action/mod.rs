//! Action group module
//!
//! Request routing for the coffee-shop agent's action group:
//! - Wire types for the inbound event and the response envelope
//! - Parameter flattening
//! - Static menu and stock responders

pub mod catalog;
mod params;
mod router;
mod types;

pub use params::ParameterMap;
pub use router::{handle, handle_event, handle_with, route, EnvelopeOptions, Route};
pub use types::{
    ActionRequest, ActionResponse, EncodedBody, MenuItem, Parameter, ResponseBody, ResponseEnvelope,
};
