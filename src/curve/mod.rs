pub mod capture;
pub mod config;
pub mod path;
pub mod resample;
pub mod types;

#[cfg(feature = "desktop")]
pub mod commands;

pub use capture::{CaptureSnapshot, CurveCapture, CurveRenderer, NullRenderer};
pub use config::{CurveConfig, CANVAS_HEIGHT, SAMPLING_POINTS};
pub use path::{CurveFrame, PathCommand};
pub use resample::resample;
pub use types::{IntensitySample, Point, Surface};
