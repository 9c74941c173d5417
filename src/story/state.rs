use serde::{Deserialize, Serialize};

use super::models::{ImageStatus, Story};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StoryStatus {
    Idle,
    GeneratingText,
    GeneratingImages,
    Playing,
    Error,
}

/// Lifecycle phase. The story only exists in the phases that show it.
#[derive(Debug, Clone)]
pub enum StoryPhase {
    Idle,
    GeneratingText,
    GeneratingImages {
        story: Story,
    },
    Playing {
        story: Story,
    },
    Error {
        message: String,
    },
}

/// What the frontend renders from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySnapshot {
    pub status: StoryStatus,
    pub story: Option<Story>,
    pub error_message: Option<String>,
    pub images_generating: bool,
}

/// Session state plus the epoch of the generation run that owns it.
///
/// Every transition driven by an async result names the epoch it was started
/// under; once `reset` or a new run bumps the epoch, those results no longer
/// apply and are dropped.
#[derive(Debug, Clone)]
pub struct StoryState {
    phase: StoryPhase,
    epoch: u64,
}

impl Default for StoryState {
    fn default() -> Self {
        Self {
            phase: StoryPhase::Idle,
            epoch: 0,
        }
    }
}

impl StoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StoryStatus {
        match self.phase {
            StoryPhase::Idle => StoryStatus::Idle,
            StoryPhase::GeneratingText => StoryStatus::GeneratingText,
            StoryPhase::GeneratingImages { .. } => StoryStatus::GeneratingImages,
            StoryPhase::Playing { .. } => StoryStatus::Playing,
            StoryPhase::Error { .. } => StoryStatus::Error,
        }
    }

    pub fn story(&self) -> Option<&Story> {
        match &self.phase {
            StoryPhase::GeneratingImages { story } | StoryPhase::Playing { story } => Some(story),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            StoryPhase::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> StorySnapshot {
        StorySnapshot {
            status: self.status(),
            story: self.story().cloned(),
            error_message: self.error_message().map(str::to_string),
            images_generating: self.status() == StoryStatus::GeneratingImages,
        }
    }

    /// Idle -> GeneratingText. Returns the epoch of the new run, or `None`
    /// if the session is not idle.
    pub fn begin_text(&mut self) -> Option<u64> {
        if !matches!(self.phase, StoryPhase::Idle) {
            return None;
        }
        self.epoch += 1;
        self.phase = StoryPhase::GeneratingText;
        Some(self.epoch)
    }

    /// GeneratingText -> GeneratingImages.
    pub fn accept_story(&mut self, epoch: u64, story: Story) -> bool {
        if !self.owns(epoch) || !matches!(self.phase, StoryPhase::GeneratingText) {
            return false;
        }
        self.phase = StoryPhase::GeneratingImages { story };
        true
    }

    /// GeneratingText -> Error.
    pub fn fail(&mut self, epoch: u64, message: String) -> bool {
        if !self.owns(epoch) || !matches!(self.phase, StoryPhase::GeneratingText) {
            return false;
        }
        self.phase = StoryPhase::Error { message };
        true
    }

    /// Replaces one chapter's image on the current story.
    pub fn settle_image(&mut self, epoch: u64, index: usize, image: ImageStatus) -> bool {
        if !self.owns(epoch) {
            return false;
        }
        match &mut self.phase {
            StoryPhase::GeneratingImages { story } => story.settle_image(index, image),
            _ => false,
        }
    }

    /// GeneratingImages -> Playing, once the whole batch has settled.
    pub fn finish_images(&mut self, epoch: u64) -> bool {
        if !self.owns(epoch) {
            return false;
        }
        let phase = std::mem::replace(&mut self.phase, StoryPhase::Idle);
        match phase {
            StoryPhase::GeneratingImages { story } => {
                self.phase = StoryPhase::Playing { story };
                true
            }
            other => {
                self.phase = other;
                false
            }
        }
    }

    /// Any phase -> Idle. Outstanding results from the old run are orphaned.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.phase = StoryPhase::Idle;
    }

    fn owns(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }
}
