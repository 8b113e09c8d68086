//! Logger module
//!
//! Provides logging utilities for the service including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Action event diagnostics
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogLevel;

use crate::action::ResponseEnvelope;
use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        LogLevel::parse(&config.logging.level),
    )
}

/// Initialize the logger for one-shot runs, keeping stdout free for output
pub fn init_stderr(config: &Config) -> std::io::Result<()> {
    writer::init_stderr(LogLevel::parse(&config.logging.level))
}

/// Write to info/access log
///
/// Before `init` the message goes to stdout, still filtered at `writer::DEFAULT_LEVEL`.
fn write_info(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write_info(level, message),
        None if writer::enabled(level) => println!("{message}"),
        None => {}
    }
}

/// Write to error log
fn write_error(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write_error(level, message),
        None if writer::enabled(level) => eprintln!("{message}"),
        None => {}
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info(LogLevel::Info, "======================================");
    write_info(LogLevel::Info, "Warung kopi action service started");
    write_info(LogLevel::Info, &format!("Listening on: http://{addr}"));
    write_info(
        LogLevel::Info,
        &format!("  - POST http://{addr}{}  (action events)", config.agent.invoke_path),
    );
    if config.routes.health.enabled {
        write_info(
            LogLevel::Info,
            &format!(
                "  - GET  http://{addr}{}, {}  (health)",
                config.routes.health.liveness_path, config.routes.health.readiness_path
            ),
        );
    }
    write_info(LogLevel::Info, &format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(LogLevel::Info, &format!("Worker threads: {workers}"));
    }
    if let Some(max) = config.performance.max_connections {
        write_info(LogLevel::Info, &format!("Max connections: {max}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(LogLevel::Info, &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(LogLevel::Info, &format!("Error log: {path}"));
    }
    write_info(LogLevel::Info, "======================================\n");
}

pub fn log_info(message: &str) {
    write_info(LogLevel::Info, &format!("[INFO] {message}"));
}

pub fn log_debug(message: &str) {
    write_info(LogLevel::Debug, &format!("[DEBUG] {message}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(
        LogLevel::Error,
        &format!("[ERROR] Failed to serve connection: {err:?}"),
    );
}

pub fn log_error(message: &str) {
    write_error(LogLevel::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(LogLevel::Warn, &format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

/// Log the inbound action event exactly as the host sent it
pub fn log_action_event(event: &serde_json::Value) {
    log_info(&event_line(event));
}

fn event_line(event: &serde_json::Value) -> String {
    format!("[Action] Received event: {event}")
}

/// Log the outbound envelope as JSON
pub fn log_action_response(envelope: &ResponseEnvelope) {
    match serde_json::to_string(envelope) {
        Ok(json) => log_info(&format!("[Action] Returning response: {json}")),
        Err(e) => log_warning(&format!("[Action] Could not encode response for logging: {e}")),
    }
}
