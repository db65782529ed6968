//! Overlay rendering and compositing.

use image::{Rgba, RgbaImage};

use crate::blending;
use crate::font::LoadedFont;
use crate::notice::{BadgeStyle, WatermarkSpec};
use crate::placement::{badge_rect, BadgeLayout, Point, Rect};

/// Transparent buffer holding only the badges, sized to the source image.
#[derive(Debug)]
pub struct OverlayLayer {
    pixels: RgbaImage,
}

impl OverlayLayer {
    /// A fully transparent layer of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Layer dimensions.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// The rendered pixels.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Overwrite every pixel inside `rect` with `color`, clipped to the layer.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        let (width, height) = self.pixels.dimensions();
        let Some((x0, x1)) = clip_span(rect.left, rect.right, width) else {
            return;
        };
        let Some((y0, y1)) = clip_span(rect.top, rect.bottom, height) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.pixels.put_pixel(x, y, color);
            }
        }
    }

    /// Draw a backing box sized to `text` plus `style.padding`, then the text
    /// on top of it. `origin` is the text's top-left corner.
    pub fn draw_badge(&mut self, font: &LoadedFont, origin: Point, text: &str, style: &BadgeStyle) {
        let rect = badge_rect(origin, font.measure(text), style.padding);
        self.fill_rect(rect, style.background);
        font.draw_text(&mut self.pixels, origin, text, style.text);
    }
}

/// Clip an inclusive span to `0..len`.
fn clip_span(start: i64, end: i64, len: u32) -> Option<(u32, u32)> {
    let last = i64::from(len) - 1;
    if len == 0 || end < 0 || start > last || start > end {
        return None;
    }
    let lo = u32::try_from(start.max(0)).ok()?;
    let hi = u32::try_from(end.min(last)).ok()?;
    Some((lo, hi))
}

/// Blend `layer` over `base` with the "over" operator.
///
/// The returned image keeps its alpha channel; it is dropped at encode time.
#[must_use]
pub fn composite(mut base: RgbaImage, layer: &OverlayLayer) -> RgbaImage {
    blending::composite_over(&mut base, &layer.pixels);
    base
}

/// Render both badges for `spec` onto a fresh layer matching `base`, and
/// composite it.
///
/// Returns the stamped image and the layout used, so callers can inspect
/// badge collisions.
#[must_use]
pub fn render(
    base: RgbaImage,
    spec: &WatermarkSpec,
    font: &LoadedFont,
    style: &BadgeStyle,
) -> (RgbaImage, BadgeLayout) {
    let (width, height) = base.dimensions();
    let layout = BadgeLayout::compute(
        (width, height),
        font.measure(spec.owner_notice()),
        font.measure(spec.timestamp_notice()),
        style.margin,
        style.padding,
    );

    let mut layer = OverlayLayer::new(width, height);
    layer.draw_badge(font, layout.owner_origin, spec.owner_notice(), style);
    layer.draw_badge(font, layout.timestamp_origin, spec.timestamp_notice(), style);

    (composite(base, &layer), layout)
}
