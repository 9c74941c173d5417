use tauri::State;

use crate::settings::GenerationSettings;
use crate::AppState;

use super::{Language, StorySnapshot};

#[tauri::command]
pub async fn get_story_state(state: State<'_, AppState>) -> Result<StorySnapshot, String> {
    Ok(state.story.snapshot().await)
}

/// Samples the drawn curve and starts generating a story from it.
#[tauri::command]
pub async fn generate_story_from_curve(
    state: State<'_, AppState>,
    language: Option<Language>,
) -> Result<StorySnapshot, String> {
    let language = language.unwrap_or_else(|| state.settings.generation().language);

    let samples = {
        let mut capture = state
            .curve
            .lock()
            .map_err(|_| "curve capture lock poisoned".to_string())?;
        if capture.is_locked() {
            return Err("a story is already being generated".into());
        }
        let samples = capture.sample().map_err(|e| e.user_message())?;
        capture.lock();
        samples
    };

    state
        .story
        .confirm_curve(samples, language)
        .await
        .map_err(|e| e.user_message())
}

/// Starts over: drops the story or error and lets the user draw again.
#[tauri::command]
pub async fn reset_story(state: State<'_, AppState>) -> Result<StorySnapshot, String> {
    let snapshot = state.story.reset().await;
    if let Ok(mut capture) = state.curve.lock() {
        capture.unlock();
    }
    Ok(snapshot)
}

#[tauri::command]
pub fn get_generation_settings(state: State<'_, AppState>) -> GenerationSettings {
    state.settings.generation()
}

#[tauri::command]
pub fn set_generation_settings(
    state: State<'_, AppState>,
    settings: GenerationSettings,
) -> Result<(), String> {
    state
        .settings
        .update_generation(settings.clone())
        .map_err(|e| e.to_string())?;
    state.story.service().update_settings(settings);
    Ok(())
}
