//! Per-module shape drawing.

use image::Rgba;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::grid::ModuleGrid;
use crate::rounding::{corner_rounding, CornerRounding};
use crate::surface::{DrawTarget, Rect, STROKE_WIDTH};

/// Shape used for each module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelStyle {
    /// Plain squares.
    #[default]
    Rect,
    /// Squares whose exposed corners are rounded, with light modules filling concave corners.
    Rounded,
    /// Circles.
    Dot,
}

/// Colors and size shared by every cell of one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPaint {
    pub light: Rgba<u8>,
    pub dark: Rgba<u8>,
    pub pixel_size: u32,
}

pub fn draw_rect_cell<T: DrawTarget + ?Sized>(
    target: &mut T,
    x: f32,
    y: f32,
    size: f32,
    color: Rgba<u8>,
) {
    target.fill_rect(Rect::square(x, y, size), color);
}

pub fn draw_dot_cell<T: DrawTarget + ?Sized>(
    target: &mut T,
    cx: f32,
    cy: f32,
    radius: f32,
    color: Rgba<u8>,
) {
    target.fill_circle(cx, cy, radius, color);
}

/// Draws one module of the rounded style with its top-left corner at (`x`, `y`).
///
/// The cell is split into four quadrants. Rounded quadrants get the opposite color, then a
/// circle in the cell color restores everything but the corner itself. When the cell is too
/// small to fit the circle inside its stroke, a plain square is drawn instead.
pub fn draw_rounded_cell<T: DrawTarget + ?Sized>(
    target: &mut T,
    x: f32,
    y: f32,
    is_dark: bool,
    corners: CornerRounding,
    paint: &CellPaint,
) {
    let size = paint.pixel_size as f32;
    let half = size / 2.0;
    let radius = half - STROKE_WIDTH;

    let (color, background) = if is_dark {
        (paint.dark, paint.light)
    } else {
        (paint.light, paint.dark)
    };

    if radius <= 0.0 {
        draw_rect_cell(target, x, y, size, color);
        return;
    }

    let pick = |rounded: bool| if rounded { background } else { color };
    target.fill_rect(Rect::square(x, y, half), pick(corners.lt));
    target.fill_rect(Rect::square(x + half, y, half), pick(corners.rt));
    target.fill_rect(Rect::square(x, y + half, half), pick(corners.lb));
    target.fill_rect(Rect::square(x + half, y + half, half), pick(corners.rb));

    draw_dot_cell(target, x + half, y + half, radius, color);
}

/// Draws every module of `grid` in the requested style.
///
/// Rect and Dot only paint dark modules and rely on the light base layer for the rest. Rounded
/// paints every module. Modules starting beyond the target edge are skipped.
pub fn draw_cells<T: DrawTarget + ?Sized>(
    target: &mut T,
    grid: &ModuleGrid,
    style: PixelStyle,
    paint: &CellPaint,
) {
    let module_count = grid.size();
    let pixel_size = paint.pixel_size as usize;
    let edge = target.edge() as usize;
    let visible = if pixel_size == 0 { 0 } else { module_count.min(edge.div_ceil(pixel_size)) };
    trace!("drawing {visible}x{visible} of {module_count}x{module_count} modules as {style:?}");

    let size = paint.pixel_size as f32;
    for x in 0..visible {
        for y in 0..visible {
            let x_pos = (x * pixel_size) as f32;
            let y_pos = (y * pixel_size) as f32;
            let is_dark = grid.is_dark(x, y);

            match style {
                PixelStyle::Rounded => {
                    let corners = corner_rounding(grid, x, y);
                    draw_rounded_cell(target, x_pos, y_pos, is_dark, corners, paint);
                }
                PixelStyle::Dot => {
                    if is_dark {
                        let radius = size / 2.0;
                        draw_dot_cell(target, x_pos + radius, y_pos + radius, radius, paint.dark);
                    }
                }
                PixelStyle::Rect => {
                    if is_dark {
                        draw_rect_cell(target, x_pos, y_pos, size, paint.dark);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, DrawRecorder, Surface};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn paint(pixel_size: u32) -> CellPaint {
        CellPaint { light: WHITE, dark: BLACK, pixel_size }
    }

    fn surface_for(grid: &ModuleGrid, pixel_size: u32) -> Surface {
        let mut surface = Surface::new(grid.size() as u32 * pixel_size).unwrap();
        surface.fill(WHITE);
        surface
    }

    fn diagonal(size: usize) -> ModuleGrid {
        ModuleGrid::from_fn(size, |x, y| x == y)
    }

    #[test]
    fn test_rect_paints_dark_cells_only() {
        let grid = ModuleGrid::from_fn(5, |x, y| (x * 3 + y) % 4 == 0);
        let mut surface = surface_for(&grid, 4);
        draw_cells(&mut surface, &grid, PixelStyle::Rect, &paint(4));
        for (px, py, pixel) in surface.image().enumerate_pixels() {
            let dark = grid.is_dark(px as usize / 4, py as usize / 4);
            let expected = if dark { BLACK } else { WHITE };
            assert_eq!(*pixel, expected, "pixel ({px}, {py})");
        }
    }

    #[test]
    fn test_dot_leaves_light_cell_centres() {
        let grid = ModuleGrid::from_fn(6, |x, y| (x + y) % 2 == 0);
        let mut surface = surface_for(&grid, 10);
        draw_cells(&mut surface, &grid, PixelStyle::Dot, &paint(10));
        for y in 0..6 {
            for x in 0..6 {
                let center = surface.pixel(x * 10 + 5, y * 10 + 5);
                let expected = if grid.is_dark(x as usize, y as usize) { BLACK } else { WHITE };
                assert_eq!(center, expected, "cell ({x}, {y})");
            }
        }
        // Cell corners lie outside the dot.
        assert_eq!(surface.pixel(0, 0), WHITE);
    }

    #[test]
    fn test_dot_draws_one_circle_per_dark_cell() {
        let grid = diagonal(4);
        let mut recorder = DrawRecorder::new(40);
        draw_cells(&mut recorder, &grid, PixelStyle::Dot, &paint(10));
        assert_eq!(recorder.circle_count(), 4);
        assert_eq!(
            recorder.ops()[1],
            DrawOp::FillCircle { cx: 15.0, cy: 15.0, radius: 5.0, color: BLACK }
        );
    }

    #[test]
    fn test_rounded_draws_every_cell() {
        let grid = diagonal(3);
        let mut recorder = DrawRecorder::new(30);
        draw_cells(&mut recorder, &grid, PixelStyle::Rounded, &paint(10));
        // Four quadrants and one circle per cell.
        assert_eq!(recorder.ops().len(), 9 * 5);
        assert_eq!(recorder.circle_count(), 9);
    }

    #[test]
    fn test_rounded_small_pixels_fall_back_to_squares() {
        let grid = ModuleGrid::from_fn(7, |x, y| (x ^ y) & 1 == 1);
        for pixel_size in [1, 2] {
            let mut recorder = DrawRecorder::new(7 * pixel_size);
            draw_cells(&mut recorder, &grid, PixelStyle::Rounded, &paint(pixel_size));
            assert_eq!(recorder.circle_count(), 0);
            assert_eq!(recorder.ops().len(), 49);
            assert!(recorder.ops().iter().all(|op| matches!(op, DrawOp::FillRect { .. })));
        }
    }

    #[test]
    fn test_rounded_isolated_cell_has_light_corners() {
        let grid = ModuleGrid::from_fn(3, |x, y| x == 1 && y == 1);
        let mut surface = surface_for(&grid, 20);
        draw_cells(&mut surface, &grid, PixelStyle::Rounded, &paint(20));
        assert_eq!(surface.pixel(30, 30), BLACK);
        assert_eq!(surface.pixel(20, 20), WHITE);
        assert_eq!(surface.pixel(39, 39), WHITE);
        assert_eq!(surface.pixel(30, 21), BLACK);
    }

    #[test]
    fn test_rounded_quadrant_colors() {
        let corners = CornerRounding { lt: true, rt: false, lb: false, rb: true };
        let mut recorder = DrawRecorder::new(10);
        draw_rounded_cell(&mut recorder, 0.0, 0.0, true, corners, &paint(10));
        let colors: Vec<Rgba<u8>> = recorder
            .ops()
            .iter()
            .map(|op| match op {
                DrawOp::FillRect { color, .. } | DrawOp::FillCircle { color, .. } => *color,
                other => panic!("unexpected op {other:?}"),
            })
            .collect();
        assert_eq!(colors, vec![WHITE, BLACK, BLACK, WHITE, BLACK]);
        assert_eq!(
            recorder.ops()[4],
            DrawOp::FillCircle { cx: 5.0, cy: 5.0, radius: 4.0, color: BLACK }
        );
    }

    #[test]
    fn test_cells_beyond_edge_are_skipped() {
        let grid = ModuleGrid::filled(10, true);
        let mut recorder = DrawRecorder::new(25);
        draw_cells(&mut recorder, &grid, PixelStyle::Rect, &paint(10));
        assert_eq!(recorder.ops().len(), 9);
    }
}
