//! Font resolution and text rendering.
//!
//! Fonts are resolved through an ordered candidate list: the first scalable
//! font that loads wins. When no candidate loads, rendering falls back to an
//! embedded 8x8 bitmap font. The fallback is degraded output, not an error.

use std::fmt;
use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};

use crate::blending::{blend_at, with_coverage};
use crate::error::{Error, Result};
use crate::placement::{Point, TextSize};

/// Directories searched for candidates given as bare file names.
const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/truetype/msttcorefonts",
    "/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
    "C:\\Windows\\Fonts",
];

/// Side length of a bitmap glyph cell before scaling.
const BITMAP_CELL: u32 = 8;

/// Integer upscale applied to bitmap glyphs.
const BITMAP_SCALE: u32 = 2;

/// Ordered list of scalable font candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontChain {
    candidates: Vec<PathBuf>,
}

impl Default for FontChain {
    fn default() -> Self {
        Self::new(["arial.ttf", "DejaVuSans.ttf"])
    }
}

impl FontChain {
    /// Build a chain from candidates in priority order.
    pub fn new<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    /// A chain with no scalable candidates; always yields the bitmap font.
    #[must_use]
    pub fn bitmap_only() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// Put `path` ahead of every existing candidate.
    #[must_use]
    pub fn with_preferred(mut self, path: impl Into<PathBuf>) -> Self {
        self.candidates.insert(0, path.into());
        self
    }

    /// Candidates in the order they are tried.
    #[must_use]
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Load the first usable font at `size` pixels per em.
    ///
    /// Never fails: if every candidate is missing or unparsable, the bitmap
    /// font is returned.
    #[must_use]
    pub fn load(&self, size: f32) -> LoadedFont {
        for candidate in &self.candidates {
            for path in search_paths(candidate) {
                if !path.is_file() {
                    continue;
                }
                match LoadedFont::scalable(&path, size) {
                    Ok(font) => {
                        tracing::debug!(font = %path.display(), "loaded scalable font");
                        return font;
                    }
                    Err(e) => tracing::debug!(error = %e, "skipping font candidate"),
                }
            }
        }

        tracing::warn!(
            candidates = self.candidates.len(),
            "no scalable font available, using bitmap fallback"
        );
        LoadedFont::Bitmap
    }
}

/// Expand a candidate into the concrete paths worth trying.
fn search_paths(candidate: &Path) -> Vec<PathBuf> {
    let bare = candidate.is_relative() && candidate.components().count() == 1;
    let mut paths = vec![candidate.to_path_buf()];
    if bare {
        paths.extend(FONT_DIRS.iter().map(|dir| Path::new(dir).join(candidate)));
    }
    paths
}

/// A font ready for measuring and drawing.
pub enum LoadedFont {
    /// An outline font rasterized with `ab_glyph`.
    Scalable {
        /// File the font was loaded from.
        path: PathBuf,
        /// Parsed font data.
        font: FontVec,
        /// Pixel scale derived from the requested em size.
        scale: PxScale,
    },
    /// The embedded fixed-size 8x8 bitmap font.
    Bitmap,
}

impl fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalable { path, scale, .. } => f
                .debug_struct("Scalable")
                .field("path", path)
                .field("scale", &(scale.x, scale.y))
                .finish(),
            Self::Bitmap => f.write_str("Bitmap"),
        }
    }
}

impl LoadedFont {
    /// Load a scalable font file, sized to `size` pixels per em.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FontLoad`] if the file cannot be read or parsed.
    pub fn scalable(path: &Path, size: f32) -> Result<Self> {
        let load_err = |reason: String| Error::FontLoad {
            path: path.to_path_buf(),
            reason,
        };

        let data = std::fs::read(path).map_err(|e| load_err(e.to_string()))?;
        let font = FontVec::try_from_vec(data).map_err(|e| load_err(e.to_string()))?;

        // PxScale is ascent-to-descent height, not em size.
        let scale = match font.units_per_em() {
            Some(upem) if upem > 0.0 => PxScale::from(size * font.height_unscaled() / upem),
            _ => PxScale::from(size),
        };

        Ok(Self::Scalable {
            path: path.to_path_buf(),
            font,
            scale,
        })
    }

    /// Whether this is the bitmap fallback.
    #[must_use]
    pub fn is_bitmap(&self) -> bool {
        matches!(self, Self::Bitmap)
    }

    /// Short description for diagnostics.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Scalable { path, .. } => path.display().to_string(),
            Self::Bitmap => "bitmap 8x8".to_string(),
        }
    }

    /// Rendered pixel footprint of `text`.
    ///
    /// Pure: identical inputs always give identical results.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn measure(&self, text: &str) -> TextSize {
        match self {
            Self::Scalable { font, scale, .. } => {
                let scaled = font.as_scaled(*scale);
                let mut width = 0.0f32;
                let mut prev: Option<GlyphId> = None;
                for c in text.chars() {
                    let id = scaled.glyph_id(c);
                    if let Some(p) = prev {
                        width += scaled.kern(p, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                TextSize::new(
                    width.max(0.0).ceil() as u32,
                    scaled.height().max(0.0).ceil() as u32,
                )
            }
            Self::Bitmap => {
                let cell = BITMAP_CELL * BITMAP_SCALE;
                let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                TextSize::new(chars.saturating_mul(cell), cell)
            }
        }
    }

    /// Draw `text` with its top-left corner at `origin`, blending over
    /// whatever `layer` already holds. Pixels outside the layer are clipped.
    pub fn draw_text(&self, layer: &mut RgbaImage, origin: Point, text: &str, color: Rgba<u8>) {
        match self {
            Self::Scalable { font, scale, .. } => {
                draw_outlined(layer, font, *scale, origin, text, color);
            }
            Self::Bitmap => draw_bitmap(layer, origin, text, color),
        }
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn draw_outlined(
    layer: &mut RgbaImage,
    font: &FontVec,
    scale: PxScale,
    origin: Point,
    text: &str,
    color: Rgba<u8>,
) {
    let scaled = font.as_scaled(scale);
    let baseline_y = origin.y as f32 + scaled.ascent();
    let mut cursor_x = origin.x as f32;
    let mut prev: Option<GlyphId> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(p) = prev {
            cursor_x += scaled.kern(p, id);
        }

        let glyph = id.with_scale_and_position(scale, point(cursor_x, baseline_y));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let min_x = bounds.min.x as i64;
            let min_y = bounds.min.y as i64;
            outlined.draw(|px, py, coverage| {
                if coverage <= 0.0 {
                    return;
                }
                let x = min_x + i64::from(px);
                let y = min_y + i64::from(py);
                blend_at(layer, x, y, with_coverage(color, coverage));
            });
        }

        cursor_x += scaled.h_advance(id);
        prev = Some(id);
    }
}

fn bitmap_glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or_default()
}

fn draw_bitmap(layer: &mut RgbaImage, origin: Point, text: &str, color: Rgba<u8>) {
    let scale = i64::from(BITMAP_SCALE);
    let advance = i64::from(BITMAP_CELL * BITMAP_SCALE);
    let mut cursor_x = origin.x;

    for c in text.chars() {
        for (row, bits) in (0i64..).zip(bitmap_glyph(c)) {
            for col in 0..8i64 {
                // Bit 0 is the leftmost pixel.
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                let x0 = cursor_x + col * scale;
                let y0 = origin.y + row * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        blend_at(layer, x0 + dx, y0 + dy, color);
                    }
                }
            }
        }
        cursor_x += advance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_prefers_arial_then_dejavu() {
        let chain = FontChain::default();
        assert_eq!(
            chain.candidates(),
            &[PathBuf::from("arial.ttf"), PathBuf::from("DejaVuSans.ttf")]
        );
        let chain = chain.with_preferred("/opt/fonts/Brand.ttf");
        assert_eq!(chain.candidates()[0], PathBuf::from("/opt/fonts/Brand.ttf"));
        assert_eq!(chain.candidates().len(), 3);
    }

    #[test]
    fn missing_candidates_fall_back_to_bitmap() {
        let chain = FontChain::new(["/nonexistent/one.ttf", "/nonexistent/two.ttf"]);
        assert!(chain.load(40.0).is_bitmap());
        assert!(FontChain::bitmap_only().load(40.0).is_bitmap());
    }

    #[test]
    fn unparsable_font_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"definitely not a font").unwrap();

        assert!(matches!(
            LoadedFont::scalable(&bogus, 40.0),
            Err(Error::FontLoad { .. })
        ));
        assert!(FontChain::new([bogus]).load(40.0).is_bitmap());
    }

    #[test]
    fn bare_names_search_font_directories() {
        let paths = search_paths(Path::new("DejaVuSans.ttf"));
        assert_eq!(paths[0], PathBuf::from("DejaVuSans.ttf"));
        assert_eq!(paths.len(), 1 + FONT_DIRS.len());

        let explicit = search_paths(Path::new("/opt/fonts/Brand.ttf"));
        assert_eq!(explicit, vec![PathBuf::from("/opt/fonts/Brand.ttf")]);
    }

    #[test]
    fn bitmap_measure_is_fixed_cell() {
        let font = LoadedFont::Bitmap;
        assert_eq!(font.measure("abc"), TextSize::new(48, 16));
        assert_eq!(font.measure(""), TextSize::new(0, 16));
        assert_eq!(font.measure("© x"), TextSize::new(48, 16));
    }

    #[test]
    fn measure_is_deterministic() {
        let font = FontChain::default().load(40.0);
        let text = "© Rajesh Kumar - AgroLink Verified";
        assert_eq!(font.measure(text), font.measure(text));
    }

    fn installed_dejavu() -> Option<PathBuf> {
        search_paths(Path::new("DejaVuSans.ttf"))
            .into_iter()
            .find(|p| p.is_file())
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn scalable_text_stays_inside_padded_box() {
        // Only meaningful where DejaVu Sans is installed.
        let Some(path) = installed_dejavu() else {
            return;
        };
        let font = FontChain::new([path]).load(40.0);
        assert!(!font.is_bitmap());

        let LoadedFont::Scalable { font: raw, .. } = &font else {
            unreachable!()
        };
        let upem = raw.units_per_em().unwrap();
        let expected_height = 40.0 * raw.height_unscaled() / upem;

        let text = "© Rajesh Kumar - AgroLink Verified";
        let size = font.measure(text);
        assert!((size.height as f32 - expected_height).abs() <= 2.0);
        assert!(size.width > size.height);
        assert!(font.measure("AV").width <= font.measure("A").width + font.measure("V").width);

        let mut layer = RgbaImage::new(size.width + 100, size.height + 60);
        let origin = Point { x: 30, y: 30 };
        font.draw_text(&mut layer, origin, text, Rgba([255, 255, 255, 200]));

        let rect = crate::placement::badge_rect(origin, size, 10);
        let mut inked = 0;
        for (x, y, p) in layer.enumerate_pixels() {
            if p[3] == 0 {
                continue;
            }
            inked += 1;
            let (x, y) = (i64::from(x), i64::from(y));
            assert!(x >= rect.left && x <= rect.right, "ink at x={x}");
            assert!(y >= rect.top && y <= rect.bottom, "ink at y={y}");
        }
        assert!(inked > 0);
    }

    #[test]
    fn bitmap_text_draws_inside_its_footprint() {
        let font = LoadedFont::Bitmap;
        let mut layer = RgbaImage::new(100, 40);
        let origin = Point { x: 5, y: 7 };
        font.draw_text(&mut layer, origin, "Hi", Rgba([255, 255, 255, 200]));

        let size = font.measure("Hi");
        let mut inked = 0;
        for (x, y, p) in layer.enumerate_pixels() {
            if p[3] == 0 {
                continue;
            }
            inked += 1;
            assert!(i64::from(x) >= origin.x && i64::from(x) < origin.x + i64::from(size.width));
            assert!(i64::from(y) >= origin.y && i64::from(y) < origin.y + i64::from(size.height));
            assert_eq!(*p, Rgba([255, 255, 255, 200]));
        }
        assert!(inked > 0);
    }

    #[test]
    fn copyright_sign_has_a_bitmap_glyph() {
        assert_ne!(bitmap_glyph('©'), [0; 8]);
        assert_eq!(bitmap_glyph('\u{4e2d}'), bitmap_glyph('?'));
    }

    #[test]
    fn bitmap_text_clips_at_edges() {
        let mut layer = RgbaImage::new(10, 10);
        LoadedFont::Bitmap.draw_text(
            &mut layer,
            Point { x: -12, y: -5 },
            "WW",
            Rgba([255, 255, 255, 255]),
        );
        // Must not panic; some ink lands in the visible corner.
        assert!(layer.pixels().any(|p| p[3] > 0));
    }
}
