pub mod ai;
pub mod curve;
pub mod error;
pub mod settings;
pub mod story;
mod utils;

#[cfg(feature = "desktop")]
pub use desktop::run;

#[cfg(feature = "desktop")]
pub(crate) use desktop::AppState;

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::{Arc, Mutex};

    use tauri::Manager;

    use crate::ai::GeminiClient;
    use crate::curve::{
        commands::{
            curve_begin, curve_clear, curve_end, curve_extend, curve_resize, curve_state,
            WindowRenderer,
        },
        CurveCapture, CurveConfig,
    };
    use crate::settings::{api_key_from_env, gemini_base_url_from_env, SettingsStore};
    use crate::story::{
        commands::{
            generate_story_from_curve, get_generation_settings, get_story_state, reset_story,
            set_generation_settings,
        },
        StoryController,
    };

    pub(crate) struct AppState {
        pub(crate) curve: Mutex<CurveCapture>,
        pub(crate) story: StoryController<GeminiClient>,
        pub(crate) settings: SettingsStore,
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        // Initialize logging (reads RUST_LOG env var)
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();

        log::info!("Arc Narrator starting up...");

        tauri::Builder::default()
            .plugin(tauri_plugin_opener::init())
            .setup(|app| {
                let result = (|| -> anyhow::Result<()> {
                    let app_data_dir = app
                        .path()
                        .app_data_dir()
                        .map_err(|err| anyhow::anyhow!(err))?;
                    std::fs::create_dir_all(&app_data_dir)?;

                    let settings_store = SettingsStore::new(app_data_dir.join("settings.json"))?;
                    let generation = settings_store.generation();

                    let api_key = api_key_from_env();
                    if api_key.is_none() {
                        log::warn!("No GEMINI_API_KEY or API_KEY set; story generation will fail");
                    }
                    let mut client = GeminiClient::new(api_key, generation)?;
                    if let Some(base_url) = gemini_base_url_from_env() {
                        log::info!("Using Gemini endpoint {}", base_url);
                        client = client.with_base_url(base_url);
                    }

                    let handle = app.handle().clone();
                    let story = StoryController::new(Arc::new(client), Arc::new(handle.clone()));
                    let curve = CurveCapture::new(
                        CurveConfig::default(),
                        Box::new(WindowRenderer::new(handle)),
                    );

                    app.manage(AppState {
                        curve: Mutex::new(curve),
                        story,
                        settings: settings_store,
                    });

                    Ok(())
                })();

                result.map_err(|err| err.into())
            })
            .invoke_handler(tauri::generate_handler![
                curve_begin,
                curve_extend,
                curve_end,
                curve_clear,
                curve_resize,
                curve_state,
                get_story_state,
                generate_story_from_curve,
                reset_story,
                get_generation_settings,
                set_generation_settings,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}
