#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tokio::sync::Semaphore;

use arc_narrator_lib::ai::StoryService;
use arc_narrator_lib::curve::IntensitySample;
use arc_narrator_lib::story::models::DraftChapter;
use arc_narrator_lib::story::{Language, StoryDraft, StoryEvents, StorySnapshot, StoryStatus};

pub fn prompt_for(index: usize) -> String {
    format!("scene {index}, cinematic lighting")
}

pub fn draft(chapters: usize) -> StoryDraft {
    StoryDraft {
        title: "The Lighthouse Keeper".into(),
        theme: "Folklore".into(),
        chapters: (0..chapters)
            .map(|i| DraftChapter {
                chapter_title: format!("Chapter {}", i + 1),
                content: format!("The tide turned for the {}th time.", i + 1),
                intensity: 10.0 + 15.0 * i as f64,
                image_prompt: prompt_for(i),
            })
            .collect(),
    }
}

pub fn samples(n: usize) -> Vec<IntensitySample> {
    (0..n)
        .map(|index| IntensitySample {
            index,
            intensity: (index * 20) as f64,
        })
        .collect()
}

/// Story service whose answers and timing are scripted by the test.
pub struct FakeService {
    story: Result<StoryDraft, String>,
    text_gate: Option<Arc<Semaphore>>,
    image_gates: HashMap<String, Arc<Semaphore>>,
    failing_prompts: HashSet<String>,
    panicking_prompts: HashSet<String>,
    pub received_samples: Mutex<Vec<IntensitySample>>,
    pub received_language: Mutex<Option<Language>>,
    pub image_calls: AtomicUsize,
    pub images_done: AtomicUsize,
}

impl FakeService {
    pub fn returning(story: StoryDraft) -> Self {
        Self::with_result(Ok(story))
    }

    pub fn failing_text(message: &str) -> Self {
        Self::with_result(Err(message.to_string()))
    }

    fn with_result(story: Result<StoryDraft, String>) -> Self {
        Self {
            story,
            text_gate: None,
            image_gates: HashMap::new(),
            failing_prompts: HashSet::new(),
            panicking_prompts: HashSet::new(),
            received_samples: Mutex::new(Vec::new()),
            received_language: Mutex::new(None),
            image_calls: AtomicUsize::new(0),
            images_done: AtomicUsize::new(0),
        }
    }

    /// Makes the image request for `chapter` fail.
    pub fn fail_image(mut self, chapter: usize) -> Self {
        self.failing_prompts.insert(prompt_for(chapter));
        self
    }

    /// Makes the image request for `chapter` panic mid-flight.
    pub fn panic_image(mut self, chapter: usize) -> Self {
        self.panicking_prompts.insert(prompt_for(chapter));
        self
    }

    /// Holds the image request for `chapter` until a permit is added.
    pub fn gate_image(&mut self, chapter: usize) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.image_gates.insert(prompt_for(chapter), gate.clone());
        gate
    }

    /// Holds every image request on one shared gate.
    pub fn gate_all_images(&mut self, chapters: usize) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        for chapter in 0..chapters {
            self.image_gates.insert(prompt_for(chapter), gate.clone());
        }
        gate
    }

    /// Holds the text request until a permit is added.
    pub fn gate_text(&mut self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.text_gate = Some(gate.clone());
        gate
    }

    pub fn images_done(&self) -> usize {
        self.images_done.load(Ordering::SeqCst)
    }
}

impl StoryService for FakeService {
    async fn generate_story(
        &self,
        samples: &[IntensitySample],
        language: Language,
    ) -> anyhow::Result<StoryDraft> {
        self.received_samples
            .lock()
            .unwrap()
            .extend_from_slice(samples);
        *self.received_language.lock().unwrap() = Some(language);

        if let Some(gate) = &self.text_gate {
            gate.acquire().await?.forget();
        }

        match &self.story {
            Ok(draft) => Ok(draft.clone()),
            Err(message) => Err(anyhow!(message.clone())),
        }
    }

    async fn generate_image(&self, prompt: &str) -> anyhow::Result<String> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = self.image_gates.get(prompt) {
            gate.acquire().await?.forget();
        }

        if self.panicking_prompts.contains(prompt) {
            self.images_done.fetch_add(1, Ordering::SeqCst);
            panic!("image backend crashed on {prompt}");
        }

        let result = if self.failing_prompts.contains(prompt) {
            Err(anyhow!("quota exceeded for {prompt}"))
        } else {
            Ok(format!("https://images.test/{}", prompt.replace(' ', "_")))
        };
        self.images_done.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// Collects every snapshot the controller publishes.
#[derive(Default)]
pub struct RecordingEvents {
    snapshots: Mutex<Vec<StorySnapshot>>,
}

impl RecordingEvents {
    pub fn statuses(&self) -> Vec<StoryStatus> {
        self.snapshots
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.status)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<StorySnapshot> {
        self.snapshots.lock().unwrap().last().cloned()
    }
}

impl StoryEvents for RecordingEvents {
    fn story_changed(&self, snapshot: &StorySnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }
}

/// Lets spawned tasks on the current-thread runtime make progress.
pub async fn let_tasks_run() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
