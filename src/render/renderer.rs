use std::sync::Arc;

use crate::{
    assets::{FrameHandle, FrameImage},
    foundation::core::{Affine, LayoutBox, Rgba8Premul, ViewportMetrics},
    foundation::error::{ScrollyError, ScrollyResult},
    render::{
        FrameRGBA,
        fit::{Placement, contain},
    },
};

/// Options for [`Renderer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RendererOpts {
    /// Straight-alpha RGBA8 color the surface is cleared to before each draw. `None` clears to
    /// transparent.
    pub clear_rgba: Option<[u8; 4]>,
}

struct Backing {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

/// Draws one frame image at a time into a backing store bound to a parent container's box.
///
/// Layout math happens in layout pixels; the backing store is `layout x devicePixelRatio` pixels
/// so output stays crisp on high-density displays.
pub struct Renderer {
    opts: RendererOpts,
    layout: LayoutBox,
    dpr: f64,
    backing: Option<Backing>,

    current: Option<Arc<FrameImage>>,
    paint: Option<(Arc<FrameImage>, vello_cpu::Image)>,
    placement: Option<Placement>,
}

impl Renderer {
    /// Create a renderer sized to `metrics`.
    pub fn new(metrics: &ViewportMetrics, opts: RendererOpts) -> ScrollyResult<Self> {
        let mut out = Self {
            opts,
            layout: LayoutBox::default(),
            dpr: 1.0,
            backing: None,
            current: None,
            paint: None,
            placement: None,
        };
        out.resize(metrics)?;
        Ok(out)
    }

    /// Re-read the container box and density ratio and resize the backing store.
    ///
    /// Safe to call at any time. If an image was drawn before, it is redrawn immediately at the
    /// new size.
    pub fn resize(&mut self, metrics: &ViewportMetrics) -> ScrollyResult<()> {
        let dpr = metrics.effective_dpr();
        let layout = metrics.container;
        let (w, h) = backing_size(layout, dpr)?;

        self.layout = layout;
        self.dpr = dpr;
        self.backing = if w == 0 || h == 0 {
            None
        } else {
            match self.backing.take() {
                Some(b) if b.width == w && b.height == h => Some(b),
                _ => Some(Backing {
                    width: w,
                    height: h,
                    pixmap: vello_cpu::Pixmap::new(w, h),
                }),
            }
        };
        tracing::debug!(
            layout_w = layout.width,
            layout_h = layout.height,
            dpr,
            backing_w = w,
            backing_h = h,
            "renderer resized"
        );

        match self.current.clone() {
            Some(img) => self.draw_image(&img).map(|_| ()),
            None => {
                let clear = self.clear_rgba();
                if let Some(b) = self.backing.as_mut() {
                    clear_pixmap(&mut b.pixmap, clear);
                }
                Ok(())
            }
        }
    }

    /// Draw a frame slot. Missing and failed slots are skipped and leave the surface untouched.
    ///
    /// Returns `true` when pixels were painted.
    pub fn draw(&mut self, frame: Option<&FrameHandle>) -> ScrollyResult<bool> {
        match frame.and_then(FrameHandle::image) {
            Some(img) => self.draw_image(img),
            None => Ok(false),
        }
    }

    /// Clear the surface and draw `image` with a "contain" fit, centered.
    ///
    /// Images with no area are skipped entirely. On a zero-size surface the image is remembered
    /// (so the next resize paints it) but nothing is drawn.
    pub fn draw_image(&mut self, image: &Arc<FrameImage>) -> ScrollyResult<bool> {
        if image.is_empty() {
            tracing::debug!("skipping frame with zero-sized image");
            return Ok(false);
        }
        self.current = Some(Arc::clone(image));

        let (iw, ih) = (f64::from(image.width), f64::from(image.height));
        let placement = contain(iw, ih, self.layout);
        self.placement = placement;
        let clear = self.clear_rgba();

        if self.backing.is_none() {
            return Ok(false);
        }
        let Some(placement) = placement else {
            if let Some(b) = self.backing.as_mut() {
                clear_pixmap(&mut b.pixmap, clear);
            }
            return Ok(false);
        };
        let paint = self.paint_for(image)?;
        let transform = placement.image_transform(iw, ih, self.dpr);

        let Some(backing) = self.backing.as_mut() else {
            return Ok(false);
        };
        clear_pixmap(&mut backing.pixmap, clear);

        let mut ctx = vello_cpu::RenderContext::new(backing.width, backing.height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if let Some([r, g, b, a]) = self.opts.clear_rgba {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(backing.width),
                f64::from(backing.height),
            ));
        }
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        ctx.flush();
        ctx.render_to_pixmap(&mut backing.pixmap);

        tracing::trace!(
            x = placement.offset_x,
            y = placement.offset_y,
            w = placement.width,
            h = placement.height,
            "drew frame"
        );
        Ok(true)
    }

    /// Read back the backing store.
    pub fn snapshot(&self) -> FrameRGBA {
        match &self.backing {
            Some(b) => FrameRGBA {
                width: u32::from(b.width),
                height: u32::from(b.height),
                data: b.pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            },
            None => FrameRGBA::empty(),
        }
    }

    /// Displayed size in layout pixels.
    pub fn layout_size(&self) -> LayoutBox {
        self.layout
    }

    /// Backing store size in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        self.backing
            .as_ref()
            .map(|b| (u32::from(b.width), u32::from(b.height)))
            .unwrap_or((0, 0))
    }

    /// Density ratio in effect.
    pub fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    /// Last image passed to a successful draw call.
    pub fn current_image(&self) -> Option<&Arc<FrameImage>> {
        self.current.as_ref()
    }

    /// Placement of the current image in layout pixels, if the geometry allows one.
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    fn clear_rgba(&self) -> [u8; 4] {
        self.opts
            .clear_rgba
            .map(|[r, g, b, a]| Rgba8Premul::from_straight_rgba(r, g, b, a))
            .unwrap_or_else(Rgba8Premul::transparent)
            .to_array()
    }

    fn paint_for(&mut self, image: &Arc<FrameImage>) -> ScrollyResult<vello_cpu::Image> {
        if let Some((cached, paint)) = &self.paint
            && Arc::ptr_eq(cached, image)
        {
            return Ok(paint.clone());
        }

        let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.paint = Some((Arc::clone(image), paint.clone()));
        Ok(paint)
    }
}

fn backing_size(layout: LayoutBox, dpr: f64) -> ScrollyResult<(u16, u16)> {
    fn axis(v: f64, dpr: f64, name: &str) -> ScrollyResult<u16> {
        let px = (v * dpr).floor();
        if !px.is_finite() || px <= 0.0 {
            return Ok(0);
        }
        if px > f64::from(u16::MAX) {
            return Err(ScrollyError::render(format!(
                "surface {name} of {px} device pixels exceeds u16"
            )));
        }
        Ok(px as u16)
    }

    Ok((
        axis(layout.width, dpr, "width")?,
        axis(layout.height, dpr, "height")?,
    ))
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ScrollyResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ScrollyError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ScrollyError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ScrollyError::render("frame image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
