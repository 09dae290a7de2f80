use crate::foundation::core::{Affine, LayoutBox, Rect};

/// Destination rectangle of an image inside a surface, in layout pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Left edge.
    pub offset_x: f64,
    /// Top edge.
    pub offset_y: f64,
    /// Drawn width.
    pub width: f64,
    /// Drawn height.
    pub height: f64,
}

impl Placement {
    /// Placement as a rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            self.offset_x,
            self.offset_y,
            self.offset_x + self.width,
            self.offset_y + self.height,
        )
    }

    /// Transform from image pixel space into backing-store pixels at density `dpr`.
    pub fn image_transform(self, image_width: f64, image_height: f64, dpr: f64) -> Affine {
        Affine::scale(dpr)
            * Affine::translate((self.offset_x, self.offset_y))
            * Affine::scale_non_uniform(self.width / image_width, self.height / image_height)
    }
}

/// Aspect-preserving "contain" placement of an `image_width` x `image_height` image in `surface`.
///
/// The image is scaled uniformly to fit entirely inside the surface and centered on both axes.
/// When the surface is relatively wider than the image the height is the constraint, otherwise
/// the width is. Returns `None` for degenerate geometry (zero or non-finite sizes), where the
/// ratios are undefined.
pub fn contain(image_width: f64, image_height: f64, surface: LayoutBox) -> Option<Placement> {
    if !(image_width.is_finite() && image_height.is_finite())
        || image_width <= 0.0
        || image_height <= 0.0
        || surface.is_degenerate()
    {
        return None;
    }

    let img_ratio = image_width / image_height;
    let box_ratio = surface.width / surface.height;

    let (width, height) = if box_ratio > img_ratio {
        let h = surface.height;
        (h * img_ratio, h)
    } else {
        let w = surface.width;
        (w, w / img_ratio)
    };

    Some(Placement {
        offset_x: (surface.width - width) / 2.0,
        offset_y: (surface.height - height) / 2.0,
        width,
        height,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
