//! Off-screen and interactive render pipelines.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::cell::{draw_cells, CellPaint};
use crate::error::{Error, OverlayKind, Result};
use crate::marker::{draw_markers, MarkerStyle};
use crate::options::RenderOptions;
use crate::overlay::{draw_background, draw_logo, draw_logo_badge, Decoding, OverlayPolicy};
use crate::qrcode::{EncodeInput, EncodedQr, Encoder, QrCodegenEncoder};
use crate::surface::{surface_edge, DisplaySurface, Surface};

/// File name given to every exported image.
pub const OUTPUT_FILE_NAME: &str = "qrcode.png";

/// MIME type of exported images.
pub const OUTPUT_MIME_TYPE: &str = "image/png";

/// Encoding metadata and output dimensions of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateResult {
    pub version: u8,
    /// Module count per side, quiet zone included.
    pub size: usize,
    pub mask_pattern: u8,
    pub width: u32,
    pub height: u32,
}

/// A rendered QR code encoded as PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub metadata: GenerateResult,
}

impl RenderedImage {
    pub fn file_name(&self) -> &'static str {
        OUTPUT_FILE_NAME
    }

    pub fn mime_type(&self) -> &'static str {
        OUTPUT_MIME_TYPE
    }

    /// Writes the image to `qrcode.png` inside a directory and returns the file path.
    ///
    /// # Arguments
    ///
    /// * `directory_path` - Optional. The directory the image is saved in, created if it does not
    ///   exist. Defaults to "generated".
    pub fn save(&self, directory_path: Option<&str>) -> Result<PathBuf> {
        let directory_path = Path::new(directory_path.unwrap_or("generated"));

        // Check if the directory exists, create it if it doesn't
        if !directory_path.exists() {
            fs::create_dir_all(directory_path)?;
        }

        let file_path = directory_path.join(self.file_name());
        fs::write(&file_path, &self.bytes)?;
        Ok(file_path)
    }
}

/// A logo still being composited onto a display surface after the render returned.
#[derive(Debug)]
pub struct PendingOverlay {
    task: JoinHandle<Result<()>>,
}

impl PendingOverlay {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits until the logo has been drawn, or reports why it was not.
    pub async fn wait(self) -> Result<()> {
        self.task.await.map_err(|_| Error::DecodeAborted { kind: OverlayKind::Logo })?
    }
}

/// Result of the interactive render path.
#[derive(Debug)]
pub struct GenerateOutcome {
    pub result: GenerateResult,
    /// Set when the logo was detached and may not be on the display yet.
    pub logo: Option<PendingOverlay>,
}

/// Everything drawn before the logo stage.
struct BaseLayer {
    qr: EncodedQr,
    paint: CellPaint,
    surface: Surface,
    logo: Option<Decoding>,
}

impl BaseLayer {
    fn metadata(&self) -> GenerateResult {
        let edge = self.surface.image().width();
        GenerateResult {
            version: self.qr.version,
            size: self.qr.size,
            mask_pattern: self.qr.mask_pattern,
            width: edge,
            height: edge,
        }
    }
}

/// Encodes the payload and draws base color, modules, markers and background.
///
/// Both image decodes start right after encoding; the background decode is awaited here, the
/// logo decode is handed back to the caller.
async fn draw_base_layer<E: Encoder + ?Sized>(
    encoder: &E,
    input: EncodeInput<'_>,
    options: &RenderOptions,
) -> Result<BaseLayer> {
    let draw = &options.draw;
    let paint = draw.paint()?;
    let qr = encoder.encode(input, &options.encode)?;

    let timeout = draw.decode_timeout();
    let background = match &draw.background {
        Some(resource) => {
            Some(Decoding::spawn(OverlayKind::Background, resource.clone(), timeout)?)
        }
        None => None,
    };
    let logo = match &draw.logo {
        Some(resource) => Some(Decoding::spawn(OverlayKind::Logo, resource.clone(), timeout)?),
        None => None,
    };

    let edge = surface_edge(qr.size, paint.pixel_size);
    debug!("rendering {} modules at {}px into a {edge}x{edge} surface", qr.size, paint.pixel_size);

    let mut surface = Surface::new(edge)?;
    surface.clear();
    surface.fill(paint.light);

    draw_cells(&mut surface, &qr.data, draw.pixel_style, &paint);

    if draw.marker_style == MarkerStyle::Circle {
        draw_markers(&mut surface, qr.size, options.encode.border, &paint);
    }

    if let Some(background) = background {
        let image = background.wait().await?;
        draw_background(&mut surface, &image);
    }

    Ok(BaseLayer { qr, paint, surface, logo })
}

async fn paint_detached_logo(display: DisplaySurface, logo: Decoding) -> Result<()> {
    let result = async {
        let image = logo.wait().await?;
        draw_logo(&mut *display.lock()?, &image);
        Ok::<(), Error>(())
    }
    .await;
    if let Err(err) = &result {
        warn!("logo overlay skipped: {err}");
    }
    result
}

/// Renders a styled QR code off-screen and returns it as a PNG.
///
/// The background is always composited before the image is serialized. The logo is composited
/// first as well under [`OverlayPolicy::Await`]; under [`OverlayPolicy::Detach`] it is included
/// only if its decode has already finished when serialization starts.
///
/// # Example
///
/// ```rust,no_run
/// use qistyle::cell::PixelStyle;
/// use qistyle::options::RenderOptions;
/// use qistyle::render::render_image;
///
/// # async fn run() -> qistyle::Result<()> {
/// let mut options = RenderOptions::default();
/// options.draw.pixel_style = PixelStyle::Rounded;
/// let image = render_image("https://example.com", &options).await?;
/// image.save(Some("output"))?;
/// # Ok(())
/// # }
/// ```
pub async fn render_image<'a>(
    input: impl Into<EncodeInput<'a>>,
    options: &RenderOptions,
) -> Result<RenderedImage> {
    render_image_with(&QrCodegenEncoder, input, options).await
}

/// Like [`render_image`], with a caller-supplied encoder.
pub async fn render_image_with<'a, E: Encoder + ?Sized>(
    encoder: &E,
    input: impl Into<EncodeInput<'a>>,
    options: &RenderOptions,
) -> Result<RenderedImage> {
    let base = draw_base_layer(encoder, input.into(), options).await?;
    let metadata = base.metadata();
    let BaseLayer { paint, mut surface, logo, .. } = base;

    if let Some(mut logo) = logo {
        draw_logo_badge(&mut surface, paint.light);
        match options.draw.overlay_policy {
            OverlayPolicy::Await => {
                let image = logo.wait().await?;
                draw_logo(&mut surface, &image);
            }
            OverlayPolicy::Detach => match logo.try_take() {
                Some(Ok(image)) => draw_logo(&mut surface, &image),
                Some(Err(err)) => warn!("logo overlay skipped: {err}"),
                None => debug!("logo still decoding at serialization, exporting without it"),
            },
        }
    }

    let bytes = surface.to_png()?;
    Ok(RenderedImage { bytes, metadata })
}

/// Renders a styled QR code onto a display surface.
///
/// Everything up to the background is drawn off-screen and then presented onto `target` in one
/// step. The logo badge is drawn onto `target` immediately. Under [`OverlayPolicy::Await`] the
/// logo is drawn before this returns; under [`OverlayPolicy::Detach`] the call returns as soon
/// as the badge is drawn and [`GenerateOutcome::logo`] tracks the logo still on its way.
///
/// An error from the awaited logo is returned after the base layer and the badge have already
/// been presented, so `target` is left showing the code without its logo.
pub async fn generate_qrcode<'a>(
    target: &DisplaySurface,
    input: impl Into<EncodeInput<'a>>,
    options: &RenderOptions,
) -> Result<GenerateOutcome> {
    generate_qrcode_with(&QrCodegenEncoder, target, input, options).await
}

/// Like [`generate_qrcode`], with a caller-supplied encoder.
pub async fn generate_qrcode_with<'a, E: Encoder + ?Sized>(
    encoder: &E,
    target: &DisplaySurface,
    input: impl Into<EncodeInput<'a>>,
    options: &RenderOptions,
) -> Result<GenerateOutcome> {
    // Fail before doing any work if the display cannot be drawn on.
    drop(target.lock()?);

    let base = draw_base_layer(encoder, input.into(), options).await?;
    let result = base.metadata();
    target.present(&base.surface)?;

    let logo = match base.logo {
        None => None,
        Some(logo) => {
            draw_logo_badge(&mut *target.lock()?, base.paint.light);
            match options.draw.overlay_policy {
                OverlayPolicy::Await => {
                    let image = logo.wait().await?;
                    draw_logo(&mut *target.lock()?, &image);
                    None
                }
                OverlayPolicy::Detach => {
                    let runtime = Handle::try_current().map_err(|err| {
                        Error::ContextUnavailable(format!("cannot schedule logo overlay: {err}"))
                    })?;
                    let task = runtime.spawn(paint_detached_logo(target.clone(), logo));
                    Some(PendingOverlay { task })
                }
            }
        }
    };

    Ok(GenerateOutcome { result, logo })
}
