use tauri::{AppHandle, Emitter, State};

use crate::AppState;

use super::{CaptureSnapshot, CurveCapture, CurveFrame, CurveRenderer, Point};

pub const CURVE_FRAME_EVENT: &str = "curve-frame";

/// Pushes every frame to the webview as a `curve-frame` event.
pub struct WindowRenderer {
    app_handle: AppHandle,
}

impl WindowRenderer {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl CurveRenderer for WindowRenderer {
    fn render(&mut self, frame: &CurveFrame) {
        if let Err(err) = self.app_handle.emit(CURVE_FRAME_EVENT, frame.clone()) {
            log::warn!("failed to emit {CURVE_FRAME_EVENT}: {err}");
        }
    }
}

fn with_capture<T>(
    state: &State<'_, AppState>,
    f: impl FnOnce(&mut CurveCapture) -> T,
) -> Result<T, String> {
    let mut capture = state
        .curve
        .lock()
        .map_err(|_| "curve capture lock poisoned".to_string())?;
    Ok(f(&mut capture))
}

#[tauri::command]
pub fn curve_begin(state: State<'_, AppState>, x: f64, y: f64) -> Result<bool, String> {
    with_capture(&state, |capture| capture.begin(Point::new(x, y)))
}

#[tauri::command]
pub fn curve_extend(state: State<'_, AppState>, x: f64, y: f64) -> Result<bool, String> {
    with_capture(&state, |capture| capture.extend(Point::new(x, y)))
}

#[tauri::command]
pub fn curve_end(state: State<'_, AppState>) -> Result<(), String> {
    with_capture(&state, |capture| capture.end())
}

#[tauri::command]
pub fn curve_clear(state: State<'_, AppState>) -> Result<(), String> {
    with_capture(&state, |capture| capture.clear())
}

#[tauri::command]
pub fn curve_resize(state: State<'_, AppState>, width: f64, height: f64) -> Result<(), String> {
    with_capture(&state, |capture| capture.resize(width, height))
}

#[tauri::command]
pub fn curve_state(state: State<'_, AppState>) -> Result<CaptureSnapshot, String> {
    with_capture(&state, |capture| capture.snapshot())
}
