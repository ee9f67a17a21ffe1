//! Squawk generation gateway
//!
//! Post text comes from a [`TextGenerator`]. The server treats it as a black
//! box: a prompt and a temperature go in, a string comes out, and any failure
//! is passed straight back to the caller.
//!
//! Two implementations ship with the crate:
//! - [`MarkovGenerator`] walks a word chain built from a small built-in corpus
//! - [`HttpGenerator`] delegates to an external text-generation service

pub mod http;
pub mod markov;

pub use http::HttpGenerator;
pub use markov::MarkovGenerator;

use async_trait::async_trait;

/// Temperature used when the caller does not pick one.
pub const DEFAULT_TEMPERATURE: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub prompt: Option<String>,
    pub temperature: Option<f64>,
}

impl GenerationRequest {
    pub fn temperature_or_default(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short identifier stored alongside each generated post.
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String>;
}
