pub mod gemini;
pub mod prompts;

use std::future::Future;

use anyhow::Result;

use crate::curve::IntensitySample;
use crate::story::models::{Language, StoryDraft};

pub use gemini::GeminiClient;

/// The generative backend the story controller talks to.
///
/// Implementations own transport concerns (auth, timeouts, parsing). Any
/// failure is returned as an error; the controller decides what it means.
pub trait StoryService: Send + Sync + 'static {
    /// Writes a story whose chapters follow `samples`, one chapter per sample.
    fn generate_story(
        &self,
        samples: &[IntensitySample],
        language: Language,
    ) -> impl Future<Output = Result<StoryDraft>> + Send;

    /// Renders one image for an English prompt and returns a URI for it.
    fn generate_image(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}
