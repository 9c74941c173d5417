pub mod controller;
pub mod events;
pub mod models;
pub mod state;

#[cfg(feature = "desktop")]
pub mod commands;

pub use controller::StoryController;
pub use events::{NoopEvents, StoryEvents, STORY_STATE_EVENT};
pub use models::{Chapter, ImageStatus, Language, Story, StoryDraft};
pub use state::{StorySnapshot, StoryState, StoryStatus};
