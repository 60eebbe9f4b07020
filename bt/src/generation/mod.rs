//! Generation module for BrainTrip
//!
//! Provides quiz, suggestion, route, and image generation requests.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;

pub use client::GenerationClient;
pub use error::GenerationError;
pub use gemini::GeminiClient;

use crate::config::GenerationConfig;

/// Create a generation client from configuration
///
/// Only the "gemini" provider is supported today; the provider field
/// exists so configs stay stable if another backend lands.
pub fn create_client(config: &GenerationConfig) -> Result<Arc<dyn GenerationClient>, GenerationError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::from_config(config)?)),
        other => Err(GenerationError::InvalidResponse(format!(
            "Unknown generation provider: '{}'. Supported: gemini",
            other
        ))),
    }
}
