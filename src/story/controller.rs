use std::sync::Arc;

use futures_util::future::join_all;
use tokio::{sync::Mutex, task::JoinHandle};

use crate::ai::StoryService;
use crate::curve::IntensitySample;
use crate::error::{StoryError, StoryResult};

use super::events::StoryEvents;
use super::models::{ImageStatus, Language, Story};
use super::state::{StorySnapshot, StoryState, StoryStatus};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Drives one story session: text first, then every chapter image at once.
pub struct StoryController<S: StoryService> {
    state: Arc<Mutex<StoryState>>,
    service: Arc<S>,
    events: Arc<dyn StoryEvents>,
    image_batch: Arc<Mutex<Option<JoinHandle<()>>>>,
    verbose: bool,
}

impl<S: StoryService> Clone for StoryController<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            service: self.service.clone(),
            events: self.events.clone(),
            image_batch: self.image_batch.clone(),
            verbose: self.verbose,
        }
    }
}

impl<S: StoryService> StoryController<S> {
    pub fn new(service: Arc<S>, events: Arc<dyn StoryEvents>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoryState::new())),
            service,
            events,
            image_batch: Arc::new(Mutex::new(None)),
            verbose: crate::settings::debug_mode_from_env(),
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    pub async fn snapshot(&self) -> StorySnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn status(&self) -> StoryStatus {
        self.state.lock().await.status()
    }

    /// Generates a story for a confirmed curve.
    ///
    /// Returns once the story text is in (or has failed). Chapter images keep
    /// arriving in the background; [`settle_images`](Self::settle_images)
    /// waits for them.
    pub async fn confirm_curve(
        &self,
        samples: Vec<IntensitySample>,
        language: Language,
    ) -> StoryResult<StorySnapshot> {
        if samples.is_empty() {
            return Err(StoryError::input("no curve samples to tell a story from"));
        }

        let epoch = {
            let mut state = self.state.lock().await;
            let epoch = state.begin_text().ok_or(StoryError::Busy)?;
            self.events.story_changed(&state.snapshot());
            epoch
        };
        log_info!(
            "Generating story text for {} samples (run {})",
            samples.len(),
            epoch
        );

        let result = self
            .service
            .generate_story(&samples, language)
            .await
            .and_then(|draft| draft.into_story(samples.len(), language))
            .map_err(StoryError::TextGeneration);

        match result {
            Ok(story) => self.accept_story(epoch, story).await,
            Err(err) => {
                log_error!("Story generation failed: {}", err.detail());
                let mut state = self.state.lock().await;
                if !state.fail(epoch, err.user_message()) {
                    log_debug!("Dropping failure of stale run {}", epoch);
                    return Ok(state.snapshot());
                }
                self.events.story_changed(&state.snapshot());
                Err(err)
            }
        }
    }

    async fn accept_story(&self, epoch: u64, story: Story) -> StoryResult<StorySnapshot> {
        let prompts: Vec<String> = story
            .chapters
            .iter()
            .map(|c| c.image_prompt.clone())
            .collect();

        let snapshot = {
            let mut state = self.state.lock().await;
            if !state.accept_story(epoch, story) {
                log_debug!("Dropping story from stale run {}", epoch);
                return Ok(state.snapshot());
            }
            let snapshot = state.snapshot();
            self.events.story_changed(&snapshot);
            snapshot
        };
        log_info!(
            "Story text ready; requesting {} chapter images",
            prompts.len()
        );

        self.spawn_image_batch(epoch, prompts).await;
        Ok(snapshot)
    }

    async fn spawn_image_batch(&self, epoch: u64, prompts: Vec<String>) {
        let mut batch_guard = self.image_batch.lock().await;

        let state = self.state.clone();
        let service = self.service.clone();
        let events = self.events.clone();
        let verbose = self.verbose;

        let handle = tokio::spawn(async move {
            let chapter_count = prompts.len();
            let chapters = prompts.into_iter().enumerate().map(|(index, prompt)| {
                let request = tokio::spawn(request_image(
                    service.clone(),
                    state.clone(),
                    events.clone(),
                    epoch,
                    index,
                    prompt,
                    verbose,
                ));
                let state = state.clone();
                let events = events.clone();
                async move {
                    // A chapter task that died never settled its image.
                    if let Err(err) = request.await {
                        log_error!("Chapter {} image task failed: {}", index + 1, err);
                        publish_image(&state, events.as_ref(), epoch, index, ImageStatus::fallback())
                            .await;
                    }
                }
            });

            join_all(chapters).await;

            let mut guard = state.lock().await;
            if !guard.finish_images(epoch) {
                return;
            }
            log_info!("All {} chapter images settled; story is playing", chapter_count);
            events.story_changed(&guard.snapshot());
        });

        // A previous batch can only still be here if it was orphaned by a
        // reset; it finishes on its own and its results are ignored.
        *batch_guard = Some(handle);
    }

    /// Waits until the current image batch, if any, has settled.
    pub async fn settle_images(&self) {
        let handle = self.image_batch.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                log_error!("image batch task failed: {}", err);
            }
        }
    }

    /// Back to `Idle` from any phase, dropping the story and error message.
    /// In-flight requests are not cancelled; their results are discarded.
    pub async fn reset(&self) -> StorySnapshot {
        let snapshot = {
            let mut state = self.state.lock().await;
            let previous = state.status();
            state.reset();
            log_info!("Story session reset from {:?}", previous);
            let snapshot = state.snapshot();
            self.events.story_changed(&snapshot);
            snapshot
        };
        self.image_batch.lock().await.take();
        snapshot
    }
}

async fn request_image<S: StoryService>(
    service: Arc<S>,
    state: Arc<Mutex<StoryState>>,
    events: Arc<dyn StoryEvents>,
    epoch: u64,
    index: usize,
    prompt: String,
    verbose: bool,
) {
    let image = match service.generate_image(&prompt).await {
        Ok(uri) => {
            if verbose {
                log_info!("Chapter {} image loaded", index + 1);
            }
            ImageStatus::Loaded { uri }
        }
        Err(source) => {
            let err = StoryError::ImageGeneration {
                chapter: index + 1,
                source,
            };
            log_warn!("{}; using fallback image", err.detail());
            ImageStatus::fallback()
        }
    };
    publish_image(&state, events.as_ref(), epoch, index, image).await;
}

/// Settles one chapter and publishes the result. The snapshot is emitted
/// under the state lock so no later transition can be published before it.
async fn publish_image(
    state: &Mutex<StoryState>,
    events: &dyn StoryEvents,
    epoch: u64,
    index: usize,
    image: ImageStatus,
) {
    let mut guard = state.lock().await;
    if guard.settle_image(epoch, index, image) {
        events.story_changed(&guard.snapshot());
    } else {
        log_debug!("Chapter {} image not applied to run {}", index + 1, epoch);
    }
}
