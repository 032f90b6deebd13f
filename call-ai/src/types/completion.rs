//! Types for LLM completion requests.

use serde::{Deserialize, Serialize};

/// Tuning knobs for a single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Constrain the model to emit a single valid JSON object
    pub json_mode: bool,
    /// Sampling temperature; lower is more deterministic
    pub temperature: f32,
    /// Hard cap on generated tokens
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            json_mode: false,
            temperature: 0.3,
            max_tokens: 1200,
        }
    }
}

impl CompletionOptions {
    /// Options for structured-output calls: JSON mode, low temperature.
    pub fn structured(max_tokens: u32) -> Self {
        Self {
            json_mode: true,
            temperature: 0.2,
            max_tokens,
        }
    }
}
