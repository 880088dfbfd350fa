//! # qistyle
//!
//! A Rust library for rendering styled QR codes into raster images.
//!
//! `qistyle` takes an encoded QR module grid and draws it with a choice of module shapes and
//! finder-pattern decorations, optionally compositing a background image and a center logo.
//! Encoding is delegated to an [`Encoder`](qrcode::Encoder); the default one supports versions
//! 1 to 40, all four error correction levels, fixed or automatic masks and quiet-zone borders.
//!
//! ## Features
//!
//! - Module styles: plain squares, dots, and rounded blocks whose corners follow the shape of
//!   the surrounding dark region.
//! - Circular finder markers.
//! - Background images composited with a "lighten" blend, so dark modules stay dark.
//! - Center logos on a rounded light badge, either awaited or best effort.
//! - PNG output, or drawing onto a caller-owned display surface.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qistyle = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Render a rounded QR code with circular markers and a logo:
//!
//! ```rust,no_run
//! use qistyle::cell::PixelStyle;
//! use qistyle::marker::MarkerStyle;
//! use qistyle::options::{DrawOptions, RenderOptions};
//! use qistyle::overlay::ImageResource;
//! use qistyle::qrcode::{QrCodeEcc, QrCodeGenerateOptions};
//!
//! #[tokio::main]
//! async fn main() -> qistyle::Result<()> {
//!     let draw = DrawOptions {
//!         dark_color: "#ffa500".to_string(), // Orange
//!         pixel_size: 12,
//!         pixel_style: PixelStyle::Rounded,
//!         marker_style: MarkerStyle::Circle,
//!         ..DrawOptions::default()
//!     }
//!     .with_logo(ImageResource::from_path("src/logo.png")?);
//!     let encode = QrCodeGenerateOptions { ecc: QrCodeEcc::High, border: 2, ..Default::default() };
//!     let options = RenderOptions::new(encode, draw);
//!
//!     let image = qistyle::render_image("https://example.com", &options).await?;
//!     image.save(Some("output"))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Encoder contract and the default encoder.
//! - [`grid`]: Module grid with bounds-safe lookups.
//! - [`cell`], [`rounding`]: Per-module shapes and corner rounding.
//! - [`marker`]: Finder-pattern decorations.
//! - [`overlay`]: Background and logo images.
//! - [`surface`]: Raster surfaces and drawing primitives.
//! - [`render`]: The off-screen and interactive render pipelines.

#![forbid(unsafe_code)]

pub mod cell;
pub mod color;
pub mod error;
pub mod grid;
pub mod marker;
pub mod options;
pub mod overlay;
pub mod qrcode;
pub mod render;
pub mod rounding;
pub mod surface;

pub use error::{Error, Result};
pub use render::{generate_qrcode, render_image, GenerateOutcome, GenerateResult, RenderedImage};
