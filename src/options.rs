//! Render configuration.
//!
//! Every option type deserializes with serde and falls back to its default for missing fields,
//! so a render can be configured from a JSON (or any serde format) document:
//!
//! ```rust
//! use qistyle::options::RenderOptions;
//! use qistyle::cell::PixelStyle;
//!
//! let options: RenderOptions = serde_json::from_str(
//!     r##"{ "encode": { "border": 2 }, "draw": { "pixel_style": "Rounded", "dark_color": "#1e90ff" } }"##,
//! ).unwrap();
//! assert_eq!(options.draw.pixel_style, PixelStyle::Rounded);
//! assert_eq!(options.draw.pixel_size, 10);
//! ```
//!
//! Logo and background images are binary resources and are attached in code.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cell::{CellPaint, PixelStyle};
use crate::color::parse_color;
use crate::error::{Error, Result};
use crate::marker::MarkerStyle;
use crate::overlay::{ImageResource, OverlayPolicy};
use crate::qrcode::QrCodeGenerateOptions;

/// Visual options for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawOptions {
    /// Color of light modules and of the base layer.
    pub light_color: String,
    /// Color of dark modules.
    pub dark_color: String,
    /// Edge length of one module in output pixels.
    pub pixel_size: u32,
    pub pixel_style: PixelStyle,
    pub marker_style: MarkerStyle,
    /// Whether the render waits for the logo.
    pub overlay_policy: OverlayPolicy,
    /// Upper bound on each image decode; `None` waits indefinitely.
    pub decode_timeout_ms: Option<u64>,
    #[serde(skip)]
    pub logo: Option<ImageResource>,
    #[serde(skip)]
    pub background: Option<ImageResource>,
}

impl Default for DrawOptions {
    fn default() -> Self {
        DrawOptions {
            light_color: "#fff".to_string(),
            dark_color: "#000".to_string(),
            pixel_size: 10,
            pixel_style: PixelStyle::Rect,
            marker_style: MarkerStyle::Auto,
            overlay_policy: OverlayPolicy::Await,
            decode_timeout_ms: Some(10_000),
            logo: None,
            background: None,
        }
    }
}

impl DrawOptions {
    pub fn with_logo(mut self, logo: ImageResource) -> Self {
        self.logo = Some(logo);
        self
    }

    pub fn with_background(mut self, background: ImageResource) -> Self {
        self.background = Some(background);
        self
    }

    pub fn decode_timeout(&self) -> Option<Duration> {
        self.decode_timeout_ms.map(Duration::from_millis)
    }

    /// Parses the colors and checks the pixel size.
    pub fn paint(&self) -> Result<CellPaint> {
        if self.pixel_size == 0 {
            return Err(Error::InvalidOptions("pixel_size must be positive".to_string()));
        }
        Ok(CellPaint {
            light: parse_color(&self.light_color)?,
            dark: parse_color(&self.dark_color)?,
            pixel_size: self.pixel_size,
        })
    }
}

/// Encoder options and draw options for one render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub encode: QrCodeGenerateOptions,
    pub draw: DrawOptions,
}

impl RenderOptions {
    pub fn new(encode: QrCodeGenerateOptions, draw: DrawOptions) -> Self {
        RenderOptions { encode, draw }
    }
}
