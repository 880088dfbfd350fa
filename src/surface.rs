//! Raster surfaces and the drawing primitives the renderer paints with.
//!
//! Shapes are drawn through the [`DrawTarget`] trait. It is implemented for
//! [`RgbaImage`] (and therefore for the [`Surface`] and [`DisplaySurface`] that
//! own one) and for [`DrawRecorder`], which only records the operations it
//! receives. All fills are anti-aliased by exact pixel coverage and composited
//! source-over; images may also be composited with [`CompositeMode::Lighten`].

use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard};

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use log::{debug, trace};

use crate::error::{Error, Result};

/// Largest edge, in pixels, a surface may have. Larger requests are clipped.
pub const MAX_SURFACE_EDGE: u32 = 16384;

/// Width of the outline drawn around every circle.
pub const STROKE_WIDTH: f32 = 1.0;

/// Computes the surface edge for a grid of `module_count` modules drawn `pixel_size` pixels wide.
///
/// The result is `min(module_count * pixel_size, MAX_SURFACE_EDGE)`; whatever lies past the cap
/// is simply not drawn.
pub fn surface_edge(module_count: usize, pixel_size: u32) -> u32 {
    let natural = (module_count as u64).saturating_mul(u64::from(pixel_size));
    if natural > u64::from(MAX_SURFACE_EDGE) {
        debug!("surface edge {natural}px exceeds {MAX_SURFACE_EDGE}px, output will be clipped");
        MAX_SURFACE_EDGE
    } else {
        natural as u32
    }
}

/// An axis-aligned rectangle in surface pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// A square with its top-left corner at (`x`, `y`).
    pub fn square(x: f32, y: f32, side: f32) -> Self {
        Rect { x, y, w: side, h: side }
    }
}

/// A sub-rectangle of a source image, in whole source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// How image pixels are combined with what is already on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    #[default]
    SourceOver,
    /// Keeps the brighter of source and destination in each channel.
    Lighten,
}

/// Something shapes can be painted onto.
pub trait DrawTarget {
    /// Edge length of the (square) target in pixels.
    fn edge(&self) -> u32;

    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>);

    /// Fills a circle and strokes its outline with a [`STROKE_WIDTH`] line of the same color,
    /// so coverage reaches half a stroke beyond `radius`.
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba<u8>);

    fn fill_round_rect(&mut self, rect: Rect, radius: f32, color: Rgba<u8>);

    /// Draws the `src` region of `image` scaled into `dst`.
    fn draw_image(&mut self, image: &RgbaImage, src: CropRect, dst: Rect, mode: CompositeMode);
}

impl DrawTarget for RgbaImage {
    fn edge(&self) -> u32 {
        self.width().min(self.height())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        let Some((x0, x1)) = span(rect.x, rect.x + rect.w, self.width()) else { return };
        let Some((y0, y1)) = span(rect.y, rect.y + rect.h, self.height()) else { return };

        for py in y0..y1 {
            let cover_y = overlap(py as f32, rect.y, rect.y + rect.h);
            for px in x0..x1 {
                let coverage = cover_y * overlap(px as f32, rect.x, rect.x + rect.w);
                blend_over(self.get_pixel_mut(px, py), color, coverage);
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
        if radius <= 0.0 {
            return;
        }
        let outer = radius + STROKE_WIDTH / 2.0;
        let Some((x0, x1)) = span(cx - outer - 1.0, cx + outer + 1.0, self.width()) else {
            return;
        };
        let Some((y0, y1)) = span(cy - outer - 1.0, cy + outer + 1.0, self.height()) else {
            return;
        };

        for py in y0..y1 {
            let dy = py as f32 + 0.5 - cy;
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - cx;
                let distance = (dx * dx + dy * dy).sqrt();
                let coverage = (outer - distance + 0.5).clamp(0.0, 1.0);
                blend_over(self.get_pixel_mut(px, py), color, coverage);
            }
        }
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: f32, color: Rgba<u8>) {
        let Some((x0, x1)) = span(rect.x, rect.x + rect.w, self.width()) else { return };
        let Some((y0, y1)) = span(rect.y, rect.y + rect.h, self.height()) else { return };

        let radius = radius.clamp(0.0, rect.w.min(rect.h) / 2.0);
        let (half_w, half_h) = (rect.w / 2.0, rect.h / 2.0);
        let (center_x, center_y) = (rect.x + half_w, rect.y + half_h);

        for py in y0..y1 {
            let qy = (py as f32 + 0.5 - center_y).abs() - (half_h - radius);
            for px in x0..x1 {
                let qx = (px as f32 + 0.5 - center_x).abs() - (half_w - radius);
                let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
                let distance = outside + qx.max(qy).min(0.0) - radius;
                let coverage = (0.5 - distance).clamp(0.0, 1.0)
                    * overlap(px as f32, rect.x, rect.x + rect.w)
                    * overlap(py as f32, rect.y, rect.y + rect.h);
                blend_over(self.get_pixel_mut(px, py), color, coverage);
            }
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, src: CropRect, dst: Rect, mode: CompositeMode) {
        let target_w = dst.w.round().max(0.0) as u32;
        let target_h = dst.h.round().max(0.0) as u32;
        if target_w == 0 || target_h == 0 || src.w == 0 || src.h == 0 {
            return;
        }

        let crop = imageops::crop_imm(image, src.x, src.y, src.w, src.h).to_image();
        let scaled = if crop.dimensions() == (target_w, target_h) {
            crop
        } else {
            imageops::resize(&crop, target_w, target_h, FilterType::Triangle)
        };
        trace!("drawing {}x{} image at ({}, {}) with {:?}", target_w, target_h, dst.x, dst.y, mode);

        let origin_x = dst.x.round() as i64;
        let origin_y = dst.y.round() as i64;
        for (sx, sy, pixel) in scaled.enumerate_pixels() {
            let (px, py) = (origin_x + i64::from(sx), origin_y + i64::from(sy));
            if px < 0 || py < 0 || px >= i64::from(self.width()) || py >= i64::from(self.height()) {
                continue;
            }
            let target = self.get_pixel_mut(px as u32, py as u32);
            match mode {
                CompositeMode::SourceOver => blend_over(target, *pixel, 1.0),
                CompositeMode::Lighten => blend_lighten(target, *pixel),
            }
        }
    }
}

/// Whole-pixel range `[start, end)` touched by the interval `[from, to)`, clipped to `0..limit`.
fn span(from: f32, to: f32, limit: u32) -> Option<(u32, u32)> {
    let start = from.floor().max(0.0);
    let end = to.ceil().min(limit as f32);
    if start >= end {
        None
    } else {
        Some((start as u32, end as u32))
    }
}

/// Fraction of the pixel `[pixel, pixel + 1)` lying inside `[from, to)`.
fn overlap(pixel: f32, from: f32, to: f32) -> f32 {
    ((pixel + 1.0).min(to) - pixel.max(from)).clamp(0.0, 1.0)
}

fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let src_alpha = f32::from(src[3]) / 255.0 * coverage;
    if src_alpha <= 0.0 {
        return;
    }
    if src_alpha >= 1.0 {
        *dst = src;
        return;
    }

    let dst_alpha = f32::from(dst[3]) / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    for channel in 0..3 {
        let s = f32::from(src[channel]);
        let d = f32::from(dst[channel]);
        let value = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        dst[channel] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
}

fn blend_lighten(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let dst_alpha = f32::from(dst[3]) / 255.0;
    let mut mixed = src;
    for channel in 0..3 {
        let s = f32::from(src[channel]);
        let lighter = s.max(f32::from(dst[channel]));
        mixed[channel] = ((1.0 - dst_alpha) * s + dst_alpha * lighter).round() as u8;
    }
    blend_over(dst, mixed, 1.0);
}

/// The off-screen surface a render paints into.
///
/// Created square at a fixed edge, then cleared and filled with the base color before any
/// module is drawn. Once every stage has run it is serialized with [`Surface::to_png`] or
/// presented onto a [`DisplaySurface`].
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Allocates a fully transparent `edge x edge` surface.
    pub fn new(edge: u32) -> Result<Self> {
        if edge == 0 {
            return Err(Error::ContextUnavailable("surface has zero size".to_string()));
        }
        let len = (edge as usize)
            .checked_mul(edge as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                Error::ContextUnavailable(format!("{edge}x{edge} surface is too large"))
            })?;

        let mut raw: Vec<u8> = Vec::new();
        raw.try_reserve_exact(len).map_err(|err| {
            Error::ContextUnavailable(format!("cannot allocate a {edge}x{edge} surface: {err}"))
        })?;
        raw.resize(len, 0);

        let pixels = RgbaImage::from_raw(edge, edge, raw)
            .ok_or_else(|| Error::ContextUnavailable("surface buffer size mismatch".to_string()))?;
        Ok(Surface { pixels })
    }

    /// Resets every pixel to fully transparent.
    pub fn clear(&mut self) {
        self.pixels.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    /// Paints the whole surface with `color`; the base layer under every module.
    pub fn fill(&mut self, color: Rgba<u8>) {
        let edge = self.pixels.width() as f32;
        self.pixels.fill_rect(Rect::square(0.0, 0.0, edge), color);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Encodes the surface as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.pixels.write_to(&mut cursor, ImageFormat::Png)?;
        Ok(cursor.into_inner())
    }
}

impl DrawTarget for Surface {
    fn edge(&self) -> u32 {
        self.pixels.edge()
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        self.pixels.fill_rect(rect, color)
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
        self.pixels.fill_circle(cx, cy, radius, color)
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: f32, color: Rgba<u8>) {
        self.pixels.fill_round_rect(rect, radius, color)
    }

    fn draw_image(&mut self, image: &RgbaImage, src: CropRect, dst: Rect, mode: CompositeMode) {
        self.pixels.draw_image(image, src, dst, mode)
    }
}

/// A display-bound surface supplied by the caller of the interactive render path.
///
/// Cloning the handle shares the same pixels; a detached logo task keeps one clone and paints
/// onto it after the render call has returned.
#[derive(Debug, Clone, Default)]
pub struct DisplaySurface {
    pixels: Arc<Mutex<RgbaImage>>,
}

impl DisplaySurface {
    pub fn new() -> Self {
        DisplaySurface::default()
    }

    /// Locks the surface for drawing.
    pub fn lock(&self) -> Result<MutexGuard<'_, RgbaImage>> {
        self.pixels
            .lock()
            .map_err(|_| Error::ContextUnavailable("display surface lock is poisoned".to_string()))
    }

    /// Clears the display and replaces it with a copy of the finished off-screen surface.
    pub fn present(&self, surface: &Surface) -> Result<()> {
        let mut pixels = self.lock()?;
        *pixels = surface.image().clone();
        Ok(())
    }

    /// Copies the current display contents.
    pub fn snapshot(&self) -> Result<RgbaImage> {
        Ok(self.lock()?.clone())
    }
}

/// One operation received by a [`DrawRecorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect { rect: Rect, color: Rgba<u8> },
    FillCircle { cx: f32, cy: f32, radius: f32, color: Rgba<u8> },
    FillRoundRect { rect: Rect, radius: f32, color: Rgba<u8> },
    DrawImage { src: CropRect, dst: Rect, mode: CompositeMode },
}

/// A draw target that records operations instead of rasterizing them.
#[derive(Debug, Clone, Default)]
pub struct DrawRecorder {
    edge: u32,
    ops: Vec<DrawOp>,
}

impl DrawRecorder {
    pub fn new(edge: u32) -> Self {
        DrawRecorder { edge, ops: Vec::new() }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn circle_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::FillCircle { .. })).count()
    }
}

impl DrawTarget for DrawRecorder {
    fn edge(&self) -> u32 {
        self.edge
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
        self.ops.push(DrawOp::FillCircle { cx, cy, radius, color });
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: f32, color: Rgba<u8>) {
        self.ops.push(DrawOp::FillRoundRect { rect, radius, color });
    }

    fn draw_image(&mut self, _image: &RgbaImage, src: CropRect, dst: Rect, mode: CompositeMode) {
        self.ops.push(DrawOp::DrawImage { src, dst, mode });
    }
}
