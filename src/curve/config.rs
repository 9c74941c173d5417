/// Drawing surface height used by the frontend canvas.
pub const CANVAS_HEIGHT: f64 = 400.0;

/// Number of chapters (and therefore curve samples) per story.
pub const SAMPLING_POINTS: usize = 5;

/// Tunable parameters for curve capture and resampling.
#[derive(Debug, Clone)]
pub struct CurveConfig {
    /// Initial surface height; width comes from the first resize.
    pub surface_height: f64,

    /// Sample count N. One chapter per sample.
    pub chapter_count: usize,

    /// A pointer move is recorded only if it travels strictly more than
    /// this many surface units horizontally from the last recorded point.
    pub min_step: f64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            surface_height: CANVAS_HEIGHT,
            chapter_count: SAMPLING_POINTS,
            min_step: 2.0,
        }
    }
}
