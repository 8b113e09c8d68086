// Application state module
// Shared, read-only state handed to every connection

use crate::action::EnvelopeOptions;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Envelope settings derived once from `config.agent`
    pub envelope: EnvelopeOptions,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            envelope: config.envelope_options(),
        }
    }
}
