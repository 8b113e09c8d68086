//! Warung kopi action group service
//!
//! Answers menu and stock queries from a coffee-shop ordering agent. Action
//! events arrive over HTTP (or one at a time through the `invoke` command)
//! and are answered with the envelope the agent host expects.

pub mod action;
pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
