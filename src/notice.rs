//! The text and styling stamped onto each image.

use chrono::NaiveDateTime;
use image::Rgba;

/// Platform named in ownership notices unless configured otherwise.
pub const DEFAULT_PLATFORM: &str = "AgroLink";

/// Visual parameters shared by both badges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeStyle {
    /// Font em size in pixels.
    pub font_size: f32,
    /// Distance from the image edge to the text.
    pub margin: u32,
    /// Padding between the text and its backing box.
    pub padding: u32,
    /// Backing box fill.
    pub background: Rgba<u8>,
    /// Text fill.
    pub text: Rgba<u8>,
}

impl Default for BadgeStyle {
    fn default() -> Self {
        Self {
            font_size: 40.0,
            margin: 20,
            padding: 10,
            background: Rgba([0, 0, 0, 120]),
            text: Rgba([255, 255, 255, 200]),
        }
    }
}

/// The two notices stamped onto one image.
///
/// The owner name is used verbatim. Nothing here escapes it, so anything
/// rendering these strings as markup must escape them itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkSpec {
    owner_notice: String,
    timestamp_notice: String,
}

impl WatermarkSpec {
    /// Build notices for `owner` on `platform`, captured at `captured_at`.
    #[must_use]
    pub fn new(owner: &str, platform: &str, captured_at: NaiveDateTime) -> Self {
        Self {
            owner_notice: format!("© {owner} - {platform} Verified"),
            timestamp_notice: format!("Captured: {}", captured_at.format("%Y-%m-%d %H:%M")),
        }
    }

    /// Ownership notice, drawn bottom-right.
    #[must_use]
    pub fn owner_notice(&self) -> &str {
        &self.owner_notice
    }

    /// Capture timestamp notice at minute resolution, drawn top-left.
    #[must_use]
    pub fn timestamp_notice(&self) -> &str {
        &self.timestamp_notice
    }
}
