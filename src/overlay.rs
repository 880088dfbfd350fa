//! Background and logo overlays.
//!
//! Image resources are decoded off the render thread. Each decode is started with
//! [`Decoding::spawn`] and completes exactly once through a channel; the render pipeline
//! decides when (and whether) to wait for it.

use std::path::Path;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use image::{Rgba, RgbaImage};
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;

use crate::error::{Error, OverlayKind, Result};
use crate::surface::{CompositeMode, CropRect, DrawTarget, Rect};

/// Whether the render waits for the logo before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPolicy {
    /// The logo is always composited before the render completes.
    #[default]
    Await,
    /// Best effort: the render does not wait for the logo decode.
    ///
    /// The off-screen path includes the logo only if it has already been decoded when the
    /// surface is serialized. The interactive path returns while the logo is still pending
    /// and paints it onto the display surface once it is ready.
    Detach,
}

/// An encoded image (PNG, JPEG, ...) to be used as a logo or background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResource {
    bytes: Arc<[u8]>,
}

impl ImageResource {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        ImageResource { bytes: Arc::from(bytes) }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(ImageResource::from_bytes(std::fs::read(path)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for ImageResource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageResource::from_bytes(bytes)
    }
}

/// Returns the centered square region of a `width x height` image.
///
/// The longer side is trimmed equally on both ends (the odd pixel, if any, goes to the far end).
pub fn center_square_crop(width: u32, height: u32) -> CropRect {
    if width > height {
        CropRect { x: (width - height) / 2, y: 0, w: height, h: height }
    } else if width < height {
        CropRect { x: 0, y: (height - width) / 2, w: width, h: width }
    } else {
        CropRect { x: 0, y: 0, w: width, h: height }
    }
}

type Decoded = std::result::Result<RgbaImage, image::ImageError>;

/// An image decode in flight.
pub struct Decoding {
    kind: OverlayKind,
    timeout: Option<Duration>,
    receiver: mpsc::Receiver<Decoded>,
}

impl Decoding {
    /// Starts decoding `resource` on the blocking pool of the current tokio runtime.
    ///
    /// Fails with [`Error::ContextUnavailable`] when called outside a tokio runtime. The runtime
    /// does not need a time driver; timeouts are measured on the blocking pool.
    pub fn spawn(
        kind: OverlayKind,
        resource: ImageResource,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|err| {
            Error::ContextUnavailable(format!("cannot decode {kind} image: {err}"))
        })?;
        let (sender, receiver) = mpsc::channel();
        runtime.spawn_blocking(move || {
            let decoded =
                image::load_from_memory(resource.as_bytes()).map(|image| image.to_rgba8());
            // The receiver is gone when the render stopped caring about this overlay.
            let _ = sender.send(decoded);
        });
        Ok(Decoding { kind, timeout, receiver })
    }

    #[cfg(test)]
    fn from_receiver(
        kind: OverlayKind,
        timeout: Option<Duration>,
        receiver: mpsc::Receiver<Decoded>,
    ) -> Self {
        Decoding { kind, timeout, receiver }
    }

    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    /// Waits for the decode to complete, up to the configured timeout.
    pub async fn wait(self) -> Result<RgbaImage> {
        let Decoding { kind, timeout, receiver } = self;
        let runtime = Handle::try_current().map_err(|err| {
            Error::ContextUnavailable(format!("cannot wait for {kind} image: {err}"))
        })?;
        let outcome = runtime
            .spawn_blocking(move || match timeout {
                Some(limit) => receiver.recv_timeout(limit),
                None => receiver.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected),
            })
            .await
            .map_err(|_| Error::DecodeAborted { kind })?;
        match outcome {
            Ok(Ok(image)) => {
                debug!("decoded {} image ({}x{})", kind, image.width(), image.height());
                Ok(image)
            }
            Ok(Err(source)) => Err(Error::ResourceDecode { kind, source }),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::DecodeTimeout {
                kind,
                millis: timeout.map_or(0, |limit| limit.as_millis() as u64),
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::DecodeAborted { kind }),
        }
    }

    /// Takes the result if the decode has already completed, without waiting.
    pub fn try_take(&mut self) -> Option<Result<RgbaImage>> {
        let kind = self.kind;
        match self.receiver.try_recv() {
            Ok(Ok(image)) => Some(Ok(image)),
            Ok(Err(source)) => Some(Err(Error::ResourceDecode { kind, source })),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(Error::DecodeAborted { kind })),
        }
    }
}

/// Composites `image` over the whole target, keeping the brighter channel of each pixel.
pub fn draw_background<T: DrawTarget + ?Sized>(target: &mut T, image: &RgbaImage) {
    let edge = target.edge() as f32;
    let crop = center_square_crop(image.width(), image.height());
    target.draw_image(image, crop, Rect::square(0.0, 0.0, edge), CompositeMode::Lighten);
}

/// Geometry of the logo area for a surface of the given edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoLayout {
    /// Edge of the rounded badge behind the logo.
    pub badge: f32,
    /// Corner radius of the badge.
    pub badge_radius: f32,
    /// Edge of the logo itself.
    pub logo: f32,
    pub center: f32,
}

impl LogoLayout {
    pub fn for_edge(edge: u32) -> Self {
        let edge = edge as f32;
        let badge = (edge / 5.0).round();
        LogoLayout {
            badge,
            badge_radius: badge / 10.0,
            logo: (badge / 5.0).round() * 4.0,
            center: edge / 2.0,
        }
    }

    pub fn badge_rect(&self) -> Rect {
        Rect::square(self.center - self.badge / 2.0, self.center - self.badge / 2.0, self.badge)
    }

    pub fn logo_rect(&self) -> Rect {
        Rect::square(self.center - self.logo / 2.0, self.center - self.logo / 2.0, self.logo)
    }
}

/// Fills the rounded badge the logo sits on.
pub fn draw_logo_badge<T: DrawTarget + ?Sized>(target: &mut T, light: Rgba<u8>) {
    let layout = LogoLayout::for_edge(target.edge());
    target.fill_round_rect(layout.badge_rect(), layout.badge_radius, light);
}

/// Draws the center-cropped logo in the middle of the target.
pub fn draw_logo<T: DrawTarget + ?Sized>(target: &mut T, image: &RgbaImage) {
    let layout = LogoLayout::for_edge(target.edge());
    let crop = center_square_crop(image.width(), image.height());
    target.draw_image(image, crop, layout.logo_rect(), CompositeMode::SourceOver);
}
