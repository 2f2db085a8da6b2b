//! Device/CSS pixel pairs.
//!
//! Every spatial scalar handed to renderers is carried as both device pixels
//! (the backing-store unit) and CSS pixels (the layout unit). Device pixels
//! are canonical; the CSS value is always derived by dividing by the ratio.

use serde::{Deserialize, Serialize};

/// Smallest pixel ratio accepted from the host.
pub const MIN_PIXEL_RATIO: f64 = 0.1;

/// Sanitize a device pixel ratio reported by the host.
///
/// Non-finite or non-positive ratios fall back to 1.0.
pub fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio.max(MIN_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// A length expressed in both device and CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelValue {
    /// Physical backing-store pixels.
    pub device: f64,
    /// Logical layout pixels (`device / ratio`).
    pub css: f64,
}

impl PixelValue {
    /// Zero in both units.
    pub const ZERO: Self = Self { device: 0.0, css: 0.0 };

    /// Build from a device-pixel value.
    pub fn from_device(device: f64, ratio: f64) -> Self {
        let ratio = sanitize_ratio(ratio);
        Self {
            device,
            css: device / ratio,
        }
    }

    /// Build from a CSS-pixel value.
    ///
    /// The device value is computed first and the CSS value re-derived from
    /// it, so the pair satisfies `device == css * ratio`.
    pub fn from_css(css: f64, ratio: f64) -> Self {
        let ratio = sanitize_ratio(ratio);
        Self::from_device(css * ratio, ratio)
    }

    /// Re-derive the CSS value for a new pixel ratio, keeping device pixels.
    pub fn rescaled(self, ratio: f64) -> Self {
        Self::from_device(self.device, ratio)
    }

    /// Add a CSS-pixel delta.
    pub fn offset_css(self, delta: f64, ratio: f64) -> Self {
        Self::from_css(self.css + delta, ratio)
    }

    /// Clamp the device value into `[min, max]` (device pixels).
    pub fn clamp_device(self, min: f64, max: f64, ratio: f64) -> Self {
        let max = max.max(min);
        Self::from_device(self.device.clamp(min, max), ratio)
    }

    /// Check the pair against a ratio.
    pub fn is_consistent(&self, ratio: f64) -> bool {
        let ratio = sanitize_ratio(ratio);
        let expected = self.css * ratio;
        (self.device - expected).abs() <= 1e-9 * self.device.abs().max(1.0)
    }
}
