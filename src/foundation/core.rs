pub use kurbo::{Affine, Rect, Vec2};

/// Monotonic 0-based counter of animation ticks (display refreshes) since the loop started.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TickIndex(pub u64);

/// Rendered box of an element in layout pixels (CSS pixels, before device scaling).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutBox {
    /// Width in layout pixels.
    pub width: f64,
    /// Height in layout pixels.
    pub height: f64,
}

impl LayoutBox {
    /// Create a box from `width` x `height` layout pixels.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Return `true` when either side is zero, negative, or non-finite.
    pub fn is_degenerate(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// Geometry snapshot read from the host page on construction and on every resize.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportMetrics {
    /// Rendered box of the drawing surface's parent container.
    pub container: LayoutBox,
    /// Display pixel density ratio (`devicePixelRatio`).
    #[serde(default = "default_dpr")]
    pub device_pixel_ratio: f64,
    /// Total scrollable height of the designated scroll container.
    pub scroll_height: f64,
    /// Height of the visible viewport.
    pub viewport_height: f64,
}

fn default_dpr() -> f64 {
    1.0
}

impl ViewportMetrics {
    /// Metrics for a full-viewport surface inside a container `scroll_height` tall.
    pub fn fullscreen(width: f64, height: f64, scroll_height: f64) -> Self {
        Self {
            container: LayoutBox::new(width, height),
            device_pixel_ratio: 1.0,
            scroll_height,
            viewport_height: height,
        }
    }

    /// Return a copy with `device_pixel_ratio` replaced.
    pub fn with_dpr(mut self, dpr: f64) -> Self {
        self.device_pixel_ratio = dpr;
        self
    }

    /// Density ratio with the host fallback applied: missing, non-finite, or non-positive is `1`.
    pub fn effective_dpr(self) -> f64 {
        let dpr = self.device_pixel_ratio;
        if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert a straight-alpha color to premultiplied form.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub(crate) fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
