use thiserror::Error;

/// Message shown to the user whenever story text generation fails.
/// The underlying cause is only ever logged.
pub const STORY_FAILED_MESSAGE: &str =
    "Failed to weave the story. Please check your connection or API key and try again.";

#[derive(Debug, Error)]
pub enum StoryError {
    /// The caller asked for work on input that can never succeed
    /// (nothing drawn, zero-sized surface, empty sample set).
    #[error("invalid input: {0}")]
    Input(String),

    /// The text collaborator failed or returned an unusable story.
    #[error("story generation failed")]
    TextGeneration(#[source] anyhow::Error),

    /// A single chapter's image request failed. Absorbed by the orchestrator.
    #[error("image generation failed for chapter {chapter}")]
    ImageGeneration {
        chapter: usize,
        #[source]
        source: anyhow::Error,
    },

    /// A command that needs an idle session arrived mid-generation.
    #[error("a story is already being generated")]
    Busy,
}

impl StoryError {
    pub fn input(msg: impl Into<String>) -> Self {
        StoryError::Input(msg.into())
    }

    /// Text shown to the user for this error. Raw causes stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            StoryError::TextGeneration(_) | StoryError::ImageGeneration { .. } => {
                STORY_FAILED_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }

    /// Full description including the collaborator's cause chain, for logs.
    pub fn detail(&self) -> String {
        match self {
            StoryError::TextGeneration(source) | StoryError::ImageGeneration { source, .. } => {
                format!("{self}: {source:#}")
            }
            other => other.to_string(),
        }
    }
}

pub type StoryResult<T> = std::result::Result<T, StoryError>;
