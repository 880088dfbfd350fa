//! QR code encoding collaborator.
//!
//! The renderer only needs a square module grid plus a little metadata. This module defines that
//! contract ([`Encoder`] and [`EncodedQr`]) together with the generate options that are passed
//! to the encoder untouched, and provides [`QrCodegenEncoder`], the default implementation on top
//! of the `qrcodegen` crate (QR Code Model 2, versions 1 to 40, numeric, alphanumeric and byte
//! segments).

use log::debug;
use qrcodegen::{Mask, QrCode, QrSegment, Version};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::ModuleGrid;

/// The error correction level used in a QR code symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QrCodeEcc {
    /// Tolerates about 7% erroneous codewords.
    #[default]
    Low,
    /// Tolerates about 15% erroneous codewords.
    Medium,
    /// Tolerates about 25% erroneous codewords.
    Quartile,
    /// Tolerates about 30% erroneous codewords.
    High,
}

impl From<QrCodeEcc> for qrcodegen::QrCodeEcc {
    fn from(ecc: QrCodeEcc) -> Self {
        match ecc {
            QrCodeEcc::Low => qrcodegen::QrCodeEcc::Low,
            QrCodeEcc::Medium => qrcodegen::QrCodeEcc::Medium,
            QrCodeEcc::Quartile => qrcodegen::QrCodeEcc::Quartile,
            QrCodeEcc::High => qrcodegen::QrCodeEcc::High,
        }
    }
}

/// Options handed to the encoder verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrCodeGenerateOptions {
    /// Error correction level.
    pub ecc: QrCodeEcc,
    /// Mask pattern 0 to 7, or `None` to pick the one with the lowest penalty.
    pub mask_pattern: Option<u8>,
    /// Raise the error correction level when it does not increase the version.
    pub boost_ecc: bool,
    /// Smallest version to consider, 1 to 40.
    pub min_version: u8,
    /// Largest version to consider, 1 to 40.
    pub max_version: u8,
    /// Quiet-zone modules added on every side of the symbol.
    pub border: usize,
}

impl Default for QrCodeGenerateOptions {
    fn default() -> Self {
        QrCodeGenerateOptions {
            ecc: QrCodeEcc::Low,
            mask_pattern: None,
            boost_ecc: false,
            min_version: Version::MIN.value(),
            max_version: Version::MAX.value(),
            border: 1,
        }
    }
}

impl QrCodeGenerateOptions {
    /// Checks the version bounds and mask pattern.
    pub fn validate(&self) -> Result<()> {
        let range = Version::MIN.value()..=Version::MAX.value();
        if !range.contains(&self.min_version) || !range.contains(&self.max_version) {
            return Err(Error::InvalidOptions(format!(
                "versions must be within 1..=40, got {}..={}",
                self.min_version, self.max_version
            )));
        }
        if self.min_version > self.max_version {
            return Err(Error::InvalidOptions(format!(
                "min_version {} is greater than max_version {}",
                self.min_version, self.max_version
            )));
        }
        if let Some(mask) = self.mask_pattern {
            if mask > 7 {
                return Err(Error::InvalidOptions(format!(
                    "mask pattern must be 0..=7, got {mask}"
                )));
            }
        }
        Ok(())
    }
}

/// Payload to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeInput<'a> {
    /// Unicode text; the most compact segment mode is chosen automatically.
    Text(&'a str),
    /// Arbitrary binary data, encoded in byte mode.
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for EncodeInput<'a> {
    fn from(text: &'a str) -> Self {
        EncodeInput::Text(text)
    }
}

impl<'a> From<&'a String> for EncodeInput<'a> {
    fn from(text: &'a String) -> Self {
        EncodeInput::Text(text)
    }
}

impl<'a> From<&'a [u8]> for EncodeInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        EncodeInput::Bytes(bytes)
    }
}

/// The encoder's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedQr {
    /// Module count per side, quiet zone included.
    pub size: usize,
    pub data: ModuleGrid,
    /// QR version, 1 to 40.
    pub version: u8,
    /// Mask pattern that was applied, 0 to 7.
    pub mask_pattern: u8,
}

/// Turns a payload into a module grid.
///
/// Implementations must be deterministic: identical input and options give identical output.
pub trait Encoder {
    fn encode(&self, input: EncodeInput<'_>, options: &QrCodeGenerateOptions) -> Result<EncodedQr>;
}

/// The default encoder, backed by `qrcodegen`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodegenEncoder;

impl Encoder for QrCodegenEncoder {
    fn encode(&self, input: EncodeInput<'_>, options: &QrCodeGenerateOptions) -> Result<EncodedQr> {
        options.validate()?;

        let segments = match input {
            EncodeInput::Text(text) => QrSegment::make_segments(text),
            EncodeInput::Bytes(bytes) => vec![QrSegment::make_bytes(bytes)],
        };
        let qr = QrCode::encode_segments_advanced(
            &segments,
            options.ecc.into(),
            Version::new(options.min_version),
            Version::new(options.max_version),
            options.mask_pattern.map(Mask::new),
            options.boost_ecc,
        )?;

        let symbol =
            ModuleGrid::from_fn(qr.size() as usize, |x, y| qr.get_module(x as i32, y as i32));
        let data = symbol.with_quiet_zone(options.border);
        debug!(
            "encoded version {} with mask {} into {} modules",
            qr.version().value(),
            qr.mask().value(),
            data.size()
        );

        Ok(EncodedQr {
            size: data.size(),
            data,
            version: qr.version().value(),
            mask_pattern: qr.mask().value(),
        })
    }
}

/// Encodes `input` with the default encoder.
///
/// # Example
///
/// ```rust
/// use qistyle::qrcode::{encode, QrCodeGenerateOptions};
///
/// let qr = encode("Hello, World!".into(), &QrCodeGenerateOptions::default()).unwrap();
/// assert_eq!(qr.version, 1);
/// assert_eq!(qr.size, 23);
/// ```
pub fn encode(input: EncodeInput<'_>, options: &QrCodeGenerateOptions) -> Result<EncodedQr> {
    QrCodegenEncoder.encode(input, options)
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn options(border: usize) -> QrCodeGenerateOptions {
        QrCodeGenerateOptions { border, ..QrCodeGenerateOptions::default() }
    }

    #[test]
    fn test_encode_size_includes_border() {
        // "Hello, world!" at low error correction fits version 1 (21 modules),
        // a border of 4 makes it 29 modules wide.
        let qr = encode("Hello, world!".into(), &options(4)).unwrap();
        assert_eq!(qr.version, 1);
        assert_eq!(qr.size, 29);
        assert_eq!(qr.data.size(), 29);
    }

    #[test]
    fn test_quiet_zone_and_finder_pattern() {
        let qr = encode("HELLO WORLD".into(), &options(1)).unwrap();
        assert!(!qr.data.is_dark(0, 0));
        // Finder pattern: dark ring, light ring, dark eye.
        assert!(qr.data.is_dark(1, 1));
        assert!(!qr.data.is_dark(2, 2));
        assert!(qr.data.is_dark(4, 4));
    }

    #[test]
    fn test_fixed_mask_is_reported() {
        for mask in 0..8 {
            let opts = QrCodeGenerateOptions { mask_pattern: Some(mask), ..options(0) };
            let qr = encode("mask".into(), &opts).unwrap();
            assert_eq!(qr.mask_pattern, mask);
        }
    }

    #[test]
    fn test_min_version_is_honoured() {
        let opts = QrCodeGenerateOptions { min_version: 5, ..options(0) };
        let qr = encode("a".into(), &opts).unwrap();
        assert_eq!(qr.version, 5);
        assert_eq!(qr.size, 37);
    }

    #[test]
    fn test_binary_input() {
        let bytes = [0u8, 159, 255, 7];
        let qr = encode(EncodeInput::Bytes(&bytes), &options(0)).unwrap();
        assert_eq!(qr.size, 21);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let a = encode("https://example.com".into(), &options(2)).unwrap();
        let b = encode("https://example.com".into(), &options(2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_data_too_long() {
        let payload = "x".repeat(200);
        let opts = QrCodeGenerateOptions { max_version: 2, ..options(0) };
        assert!(matches!(encode(payload.as_str().into(), &opts), Err(Error::DataTooLong(_))));
    }

    #[test]
    fn test_invalid_options() {
        let bad = [
            QrCodeGenerateOptions { min_version: 0, ..options(0) },
            QrCodeGenerateOptions { max_version: 41, ..options(0) },
            QrCodeGenerateOptions { min_version: 10, max_version: 9, ..options(0) },
            QrCodeGenerateOptions { mask_pattern: Some(8), ..options(0) },
        ];
        for opts in bad {
            assert!(matches!(encode("x".into(), &opts), Err(Error::InvalidOptions(_))), "{opts:?}");
        }
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: QrCodeGenerateOptions =
            serde_json::from_str(r#"{"ecc":"High","border":4}"#).unwrap();
        assert_eq!(opts.ecc, QrCodeEcc::High);
        assert_eq!(opts.border, 4);
        assert_eq!(opts.max_version, 40);
        assert_eq!(opts.mask_pattern, None);
    }
}
