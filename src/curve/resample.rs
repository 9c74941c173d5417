use crate::error::{StoryError, StoryResult};

use super::types::{IntensitySample, Point, Surface};

/// Reduces a raw drawing path to exactly `sections` intensity samples.
///
/// The surface is split into equal-width vertical sections. For each one the
/// path point horizontally nearest to the section's midpoint is picked (the
/// earliest point wins a tie) and its height is mapped to an intensity where
/// the top edge is 100 and the bottom edge is 0, clamped to `[0, 100]`.
pub fn resample(
    path: &[Point],
    surface: Surface,
    sections: usize,
) -> StoryResult<Vec<IntensitySample>> {
    if path.is_empty() {
        return Err(StoryError::input("nothing has been drawn yet"));
    }
    if !surface.is_drawable() {
        return Err(StoryError::input(format!(
            "drawing surface {}x{} has no area",
            surface.width, surface.height
        )));
    }

    let section_width = surface.width / sections as f64;

    let samples = (0..sections)
        .map(|i| {
            let target_x = section_width * i as f64 + section_width / 2.0;
            let closest = nearest_by_x(path, target_x);
            IntensitySample {
                index: i,
                intensity: to_intensity(closest.y, surface.height),
            }
        })
        .collect();

    Ok(samples)
}

fn nearest_by_x(path: &[Point], target_x: f64) -> &Point {
    let mut best = &path[0];
    let mut best_distance = (best.x - target_x).abs();
    for point in &path[1..] {
        let distance = (point.x - target_x).abs();
        // Strictly smaller only: ties keep the earlier point.
        if distance < best_distance {
            best = point;
            best_distance = distance;
        }
    }
    best
}

fn to_intensity(y: f64, height: f64) -> f64 {
    let intensity = ((height - y) / height) * 100.0;
    if intensity.is_nan() {
        return 0.0;
    }
    intensity.clamp(0.0, 100.0)
}
