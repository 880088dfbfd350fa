//! Circular finder-pattern decorations.

use serde::{Deserialize, Serialize};

use crate::cell::{draw_dot_cell, draw_rect_cell, CellPaint};
use crate::surface::DrawTarget;

/// Finder pattern edge in modules.
pub const MARKER_OUTER_SIZE: usize = 7;
pub const MARKER_DIVIDER_SIZE: usize = 5;
pub const MARKER_INNER_SIZE: usize = 3;

/// How the three finder patterns are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerStyle {
    /// Concentric circles drawn over the finder patterns.
    Circle,
    /// No special marker; finder patterns are drawn like any other modules.
    #[default]
    Auto,
}

/// Pixel positions of the top-left, top-right and bottom-left finder patterns.
///
/// `border` is the quiet zone in modules; positions are the top-left corner of each pattern.
pub fn marker_origins(module_count: usize, border: usize, pixel_size: u32) -> [(f32, f32); 3] {
    let pixel_size = pixel_size as f32;
    let near = border as f32 * pixel_size;
    let far = (module_count as f32 - MARKER_OUTER_SIZE as f32 - border as f32) * pixel_size;
    [(near, near), (far, near), (near, far)]
}

/// Draws one decoration with its top-left corner at (`x`, `y`).
///
/// A light square one module wider than the pattern erases what the cells painted, then the
/// outer, divider and inner circles are drawn in that order.
pub fn draw_marker<T: DrawTarget + ?Sized>(target: &mut T, x: f32, y: f32, paint: &CellPaint) {
    let pixel_size = paint.pixel_size as f32;
    let outer_radius = MARKER_OUTER_SIZE as f32 * pixel_size / 2.0;
    let divider_radius = MARKER_DIVIDER_SIZE as f32 * pixel_size / 2.0;
    let inner_radius = MARKER_INNER_SIZE as f32 * pixel_size / 2.0;

    draw_rect_cell(
        target,
        x - pixel_size / 2.0,
        y - pixel_size / 2.0,
        MARKER_OUTER_SIZE as f32 * pixel_size + pixel_size,
        paint.light,
    );

    let (cx, cy) = (x + outer_radius, y + outer_radius);
    draw_dot_cell(target, cx, cy, outer_radius, paint.dark);
    draw_dot_cell(target, cx, cy, divider_radius, paint.light);
    draw_dot_cell(target, cx, cy, inner_radius, paint.dark);
}

/// Draws the three decorations for a grid of `module_count` modules.
pub fn draw_markers<T: DrawTarget + ?Sized>(
    target: &mut T,
    module_count: usize,
    border: usize,
    paint: &CellPaint,
) {
    for (x, y) in marker_origins(module_count, border, paint.pixel_size) {
        draw_marker(target, x, y, paint);
    }
}
