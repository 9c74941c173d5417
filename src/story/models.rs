use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shown for any chapter whose image request failed.
pub const FALLBACK_IMAGE_URI: &str = "https://picsum.photos/800/450?blur=2";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh")]
    SimplifiedChinese,
}

impl Default for Language {
    fn default() -> Self {
        Language::SimplifiedChinese
    }
}

impl Language {
    /// Name used when instructing the model which language to write in.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::SimplifiedChinese => "Simplified Chinese (简体中文)",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum IntensityBand {
    Low,
    Medium,
    High,
    Extreme,
}

impl IntensityBand {
    pub fn from_intensity(intensity: f64) -> Self {
        if intensity < 30.0 {
            IntensityBand::Low
        } else if intensity < 60.0 {
            IntensityBand::Medium
        } else if intensity < 85.0 {
            IntensityBand::High
        } else {
            IntensityBand::Extreme
        }
    }
}

/// Image state of one chapter. Once settled it stays settled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ImageStatus {
    Pending,
    Loaded { uri: String },
    Fallback { uri: String },
}

impl ImageStatus {
    pub fn fallback() -> Self {
        ImageStatus::Fallback {
            uri: FALLBACK_IMAGE_URI.to_string(),
        }
    }

    pub fn uri(&self) -> Option<&str> {
        match self {
            ImageStatus::Pending => None,
            ImageStatus::Loaded { uri } | ImageStatus::Fallback { uri } => Some(uri),
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, ImageStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub title: String,
    pub content: String,
    pub intensity: f64,
    pub band: IntensityBand,
    pub image_prompt: String,
    pub image: ImageStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub title: String,
    pub theme: String,
    pub language: Language,
    pub created_at: DateTime<Utc>,
    pub chapters: Vec<Chapter>,
}

impl Story {
    /// Settles one chapter's image. Chapters that already settled are left
    /// alone; returns whether anything changed.
    pub fn settle_image(&mut self, index: usize, image: ImageStatus) -> bool {
        match self.chapters.get_mut(index) {
            Some(chapter) if !chapter.image.is_settled() => {
                chapter.image = image;
                true
            }
            _ => false,
        }
    }
}

/// Story as returned by the text model, before validation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDraft {
    pub title: String,
    pub theme: String,
    pub chapters: Vec<DraftChapter>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftChapter {
    pub chapter_title: String,
    pub content: String,
    pub intensity: f64,
    pub image_prompt: String,
}

impl StoryDraft {
    /// Checks the draft is complete and has exactly `expected` chapters,
    /// then builds a story with every image pending.
    pub fn into_story(self, expected: usize, language: Language) -> Result<Story> {
        if self.chapters.len() != expected {
            bail!(
                "expected {} chapters, model returned {}",
                expected,
                self.chapters.len()
            );
        }
        require_text("title", &self.title)?;
        require_text("theme", &self.theme)?;

        let chapters = self
            .chapters
            .into_iter()
            .enumerate()
            .map(|(i, draft)| -> Result<Chapter> {
                require_text("chapterTitle", &draft.chapter_title)
                    .and_then(|_| require_text("content", &draft.content))
                    .and_then(|_| require_text("imagePrompt", &draft.image_prompt))
                    .map_err(|e| anyhow!("chapter {}: {e}", i + 1))?;
                if !draft.intensity.is_finite() {
                    bail!("chapter {}: intensity is not a number", i + 1);
                }
                let intensity = draft.intensity.clamp(0.0, 100.0);
                Ok(Chapter {
                    title: draft.chapter_title,
                    content: draft.content,
                    intensity,
                    band: IntensityBand::from_intensity(intensity),
                    image_prompt: draft.image_prompt,
                    image: ImageStatus::Pending,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Story {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            theme: self.theme,
            language,
            created_at: Utc::now(),
            chapters,
        })
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("missing {field}");
    }
    Ok(())
}
