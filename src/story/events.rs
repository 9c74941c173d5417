use super::state::StorySnapshot;

pub const STORY_STATE_EVENT: &str = "story-state-changed";

/// Receives a snapshot after every lifecycle or chapter change.
///
/// Called with the session lock held, so snapshots arrive in the order the
/// state changed. Implementations must not call back into the controller.
pub trait StoryEvents: Send + Sync + 'static {
    fn story_changed(&self, snapshot: &StorySnapshot);
}

/// Discards every snapshot.
pub struct NoopEvents;

impl StoryEvents for NoopEvents {
    fn story_changed(&self, _snapshot: &StorySnapshot) {}
}

#[cfg(feature = "desktop")]
impl StoryEvents for tauri::AppHandle {
    fn story_changed(&self, snapshot: &StorySnapshot) {
        use tauri::Emitter;

        if let Err(err) = self.emit(STORY_STATE_EVENT, snapshot.clone()) {
            log::warn!("failed to emit {STORY_STATE_EVENT}: {err}");
        }
    }
}
