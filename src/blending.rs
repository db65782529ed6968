//! Alpha blending math for badge compositing.
//!
//! Badges are applied with the Porter-Duff "over" operator:
//! `out = fg * alpha_fg + bg * (1 - alpha_fg)`
//!
//! The general form below also accounts for a non-opaque background, which
//! reduces to the equation above whenever the background is opaque.

use image::{Rgba, RgbaImage};

/// Output alpha below this is treated as fully transparent.
const MIN_OUT_ALPHA: f32 = 0.001;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Composite one RGBA pixel over another.
#[must_use]
pub fn blend_over(bottom: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    let top_alpha = f32::from(top[3]) / 255.0;
    let bottom_alpha = f32::from(bottom[3]) / 255.0;

    if top_alpha <= 0.0 {
        return bottom;
    }

    let out_alpha = top_alpha + bottom_alpha * (1.0 - top_alpha);
    if out_alpha < MIN_OUT_ALPHA {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |t: u8, b: u8| -> u8 {
        let t = f32::from(t) / 255.0;
        let b = f32::from(b) / 255.0;
        to_channel((t * top_alpha + b * bottom_alpha * (1.0 - top_alpha)) / out_alpha)
    };

    Rgba([
        blend(top[0], bottom[0]),
        blend(top[1], bottom[1]),
        blend(top[2], bottom[2]),
        to_channel(out_alpha),
    ])
}

/// Scale a color's alpha by an anti-aliasing coverage value in `[0, 1]`.
#[must_use]
pub fn with_coverage(color: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let alpha = f32::from(color[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    Rgba([color[0], color[1], color[2], to_channel(alpha)])
}

/// Blend `color` over the pixel at `(x, y)`, ignoring coordinates that fall
/// outside the image.
pub fn blend_at(image: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x >= image.width() || y >= image.height() {
        return;
    }
    let px = image.get_pixel_mut(x, y);
    *px = blend_over(*px, color);
}

/// Composite `layer` over `base` in place.
///
/// Both buffers must have identical dimensions; pixels outside the shared
/// area are ignored.
pub fn composite_over(base: &mut RgbaImage, layer: &RgbaImage) {
    debug_assert_eq!(base.dimensions(), layer.dimensions());

    for (bg, fg) in base.pixels_mut().zip(layer.pixels()) {
        if fg[3] == 0 {
            continue;
        }
        *bg = blend_over(*bg, *fg);
    }
}
