use serde::Serialize;

use super::types::{Point, Surface};

/// One drawing instruction for the frontend canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PathCommand {
    MoveTo { to: Point },
    QuadTo { control: Point, to: Point },
    LineTo { to: Point },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuideLine {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabel {
    pub text: &'static str,
    pub at: Point,
}

/// Everything the frontend needs to repaint the drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveFrame {
    pub surface: Surface,
    pub guides: Vec<GuideLine>,
    pub labels: Vec<AxisLabel>,
    pub curve: Vec<PathCommand>,
    pub has_drawn: bool,
}

impl CurveFrame {
    pub fn build(surface: Surface, sections: usize, points: &[Point], has_drawn: bool) -> Self {
        Self {
            surface,
            guides: guide_lines(surface, sections),
            labels: axis_labels(surface),
            curve: smooth_path(points),
            has_drawn,
        }
    }
}

/// Smooths a raw path into quadratic segments through successive midpoints.
///
/// Each interior point becomes the control point of a curve ending halfway to
/// its successor, and a final straight segment reaches the last point.
/// Fewer than two points produce no curve.
pub fn smooth_path(points: &[Point]) -> Vec<PathCommand> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut commands = Vec::with_capacity(points.len() + 1);
    commands.push(PathCommand::MoveTo { to: points[0] });

    for pair in points[1..].windows(2) {
        commands.push(PathCommand::QuadTo {
            control: pair[0],
            to: pair[0].midpoint(&pair[1]),
        });
    }

    if points.len() > 2 {
        commands.push(PathCommand::LineTo {
            to: points[points.len() - 1],
        });
    }

    commands
}

/// Horizontal midline plus the dividers between sampling sections.
pub fn guide_lines(surface: Surface, sections: usize) -> Vec<GuideLine> {
    let mid_y = surface.height / 2.0;
    let mut guides = vec![GuideLine {
        from: Point::new(0.0, mid_y),
        to: Point::new(surface.width, mid_y),
    }];

    let section_width = surface.width / sections.max(1) as f64;
    for i in 1..sections {
        let x = section_width * i as f64;
        guides.push(GuideLine {
            from: Point::new(x, 0.0),
            to: Point::new(x, surface.height),
        });
    }

    guides
}

fn axis_labels(surface: Surface) -> Vec<AxisLabel> {
    vec![
        AxisLabel {
            text: "High Intensity",
            at: Point::new(10.0, 20.0),
        },
        AxisLabel {
            text: "Neutral",
            at: Point::new(10.0, surface.height / 2.0 - 5.0),
        },
        AxisLabel {
            text: "Low Intensity",
            at: Point::new(10.0, surface.height - 10.0),
        },
    ]
}
