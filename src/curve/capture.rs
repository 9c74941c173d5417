use serde::Serialize;

use crate::error::StoryResult;

use super::config::CurveConfig;
use super::path::CurveFrame;
use super::resample::resample;
use super::types::{IntensitySample, Point, Surface};

const ENABLE_LOGS: bool = false;

use crate::log_debug;

/// Receives a fresh frame whenever the captured curve or surface changes.
pub trait CurveRenderer: Send {
    fn render(&mut self, frame: &CurveFrame);
}

/// Renderer that drops every frame. Used before a window is attached.
pub struct NullRenderer;

impl CurveRenderer for NullRenderer {
    fn render(&mut self, _frame: &CurveFrame) {}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSnapshot {
    pub surface: Surface,
    pub point_count: usize,
    pub is_drawing: bool,
    pub has_drawn: bool,
    pub locked: bool,
}

/// Records a freehand gesture as a raw path on a fixed-size surface.
pub struct CurveCapture {
    config: CurveConfig,
    surface: Surface,
    points: Vec<Point>,
    is_drawing: bool,
    has_drawn: bool,
    /// Set while a story is being generated; new gestures are refused.
    locked: bool,
    renderer: Box<dyn CurveRenderer>,
}

impl CurveCapture {
    pub fn new(config: CurveConfig, renderer: Box<dyn CurveRenderer>) -> Self {
        let surface = Surface::new(0.0, config.surface_height);
        Self {
            config,
            surface,
            points: Vec::new(),
            is_drawing: false,
            has_drawn: false,
            locked: false,
            renderer,
        }
    }

    /// Starts a new gesture at `point`, discarding any previous path.
    /// Returns false if capture is locked.
    pub fn begin(&mut self, point: Point) -> bool {
        if self.locked {
            log_debug!("ignoring gesture start while locked");
            return false;
        }
        self.is_drawing = true;
        self.has_drawn = true;
        self.points.clear();
        self.points.push(point);
        self.redraw();
        true
    }

    /// Appends `point` if a gesture is active and it moved far enough
    /// horizontally. Returns whether the point was recorded.
    pub fn extend(&mut self, point: Point) -> bool {
        if !self.is_drawing || self.locked {
            return false;
        }
        let Some(last) = self.points.last() else {
            return false;
        };
        if (point.x - last.x).abs() <= self.config.min_step {
            return false;
        }
        self.points.push(point);
        self.redraw();
        true
    }

    pub fn end(&mut self) {
        self.is_drawing = false;
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.is_drawing = false;
        self.has_drawn = false;
        self.redraw();
    }

    /// Adopts new surface dimensions. Recorded points keep their pixel
    /// coordinates; nothing is rescaled.
    pub fn resize(&mut self, width: f64, height: f64) {
        let surface = Surface::new(width, height);
        if surface != self.surface {
            log_debug!(
                "surface resized {}x{} -> {}x{}",
                self.surface.width,
                self.surface.height,
                width,
                height
            );
            self.surface = surface;
        }
        self.redraw();
    }

    pub fn lock(&mut self) {
        self.locked = true;
        self.is_drawing = false;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// True once at least one point exists, i.e. generation may be offered.
    pub fn can_generate(&self) -> bool {
        !self.locked && !self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Resamples the recorded path into one intensity per chapter.
    pub fn sample(&self) -> StoryResult<Vec<IntensitySample>> {
        resample(&self.points, self.surface, self.config.chapter_count)
    }

    pub fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            surface: self.surface,
            point_count: self.points.len(),
            is_drawing: self.is_drawing,
            has_drawn: self.has_drawn,
            locked: self.locked,
        }
    }

    pub fn frame(&self) -> CurveFrame {
        CurveFrame::build(
            self.surface,
            self.config.chapter_count,
            &self.points,
            self.has_drawn,
        )
    }

    fn redraw(&mut self) {
        let frame = self.frame();
        self.renderer.render(&frame);
    }
}
