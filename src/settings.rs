use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use crate::story::models::Language;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationSettings {
    /// Language preselected in the drawing view.
    pub language: Language,
    pub text_model: String,
    pub image_model: String,
    pub aspect_ratio: String,
    pub request_timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            language: Language::SimplifiedChinese,
            text_model: "gemini-3-flash-preview".into(),
            image_model: "gemini-2.5-flash-image".into(),
            aspect_ratio: "16:9".into(),
            request_timeout_secs: 120,
        }
    }
}

impl GenerationSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    #[serde(default)]
    generation: GenerationSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!(
                    "Ignoring unreadable settings at {}: {}",
                    path.display(),
                    err
                );
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn generation(&self) -> GenerationSettings {
        self.data
            .read()
            .map(|guard| guard.generation.clone())
            .unwrap_or_default()
    }

    pub fn update_generation(&self, settings: GenerationSettings) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        let mut next = guard.clone();
        next.generation = settings;
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

/// Reads the Gemini key from the environment. `GEMINI_API_KEY` wins over
/// the generic `API_KEY`.
pub fn api_key_from_env() -> Option<String> {
    ["GEMINI_API_KEY", "API_KEY"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Optional `GEMINI_BASE_URL` override, e.g. for a corporate proxy.
pub fn gemini_base_url_from_env() -> Option<String> {
    std::env::var("GEMINI_BASE_URL")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `ARC_NARRATOR_DEBUG=1` (or `true`) turns on per-chapter progress logs.
pub fn debug_mode_from_env() -> bool {
    std::env::var("ARC_NARRATOR_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
