//! Watermark pipeline: decode, render badges, composite, encode.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::codec::{self, OUTPUT_QUALITY};
use crate::compositor;
use crate::error::{Error, Result};
use crate::font::FontChain;
use crate::gatekeeper;
use crate::notice::{BadgeStyle, WatermarkSpec, DEFAULT_PLATFORM};

/// What a successful stamping run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkOutcome {
    /// Where the JPEG was written.
    pub output: PathBuf,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Whether the bitmap fallback font was used.
    pub bitmap_font: bool,
    /// Whether the two badges overlap on this image.
    pub badges_overlap: bool,
}

/// Result of processing a single image file in a batch.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the source file.
    pub path: PathBuf,
    /// Path the stamped image was written to.
    pub output: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
}

/// Stamps ownership and capture-time badges onto images.
///
/// Holds configuration only. Fonts are loaded on each call and every buffer
/// is owned by a single invocation, so one `Watermarker` can be shared
/// across threads stamping different files.
#[derive(Debug, Clone)]
pub struct Watermarker {
    fonts: FontChain,
    style: BadgeStyle,
    platform: String,
}

impl Default for Watermarker {
    fn default() -> Self {
        Self {
            fonts: FontChain::default(),
            style: BadgeStyle::default(),
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

impl Watermarker {
    /// A watermarker with default fonts, style, and platform name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the font candidate chain.
    #[must_use]
    pub fn with_fonts(mut self, fonts: FontChain) -> Self {
        self.fonts = fonts;
        self
    }

    /// Replace the badge style.
    #[must_use]
    pub fn with_style(mut self, style: BadgeStyle) -> Self {
        self.style = style;
        self
    }

    /// Replace the platform named in ownership notices.
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Font candidates in use.
    #[must_use]
    pub fn fonts(&self) -> &FontChain {
        &self.fonts
    }

    /// Stamp `source` for `owner` and write a JPEG to `output`, using the
    /// current local time as the capture time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyOwnerName`], [`Error::Decode`], or
    /// [`Error::Encode`]. Font problems are never errors.
    pub fn watermark_file(
        &self,
        source: &Path,
        owner: &str,
        output: &Path,
    ) -> Result<WatermarkOutcome> {
        self.watermark_file_at(source, owner, output, Local::now().naive_local())
    }

    /// Like [`Watermarker::watermark_file`], with an explicit capture time.
    ///
    /// # Errors
    ///
    /// See [`Watermarker::watermark_file`].
    pub fn watermark_file_at(
        &self,
        source: &Path,
        owner: &str,
        output: &Path,
        captured_at: NaiveDateTime,
    ) -> Result<WatermarkOutcome> {
        if owner.trim().is_empty() {
            return Err(Error::EmptyOwnerName);
        }

        let base = codec::decode(source)?;
        let (width, height) = base.dimensions();

        let spec = WatermarkSpec::new(owner, &self.platform, captured_at);
        let font = self.fonts.load(self.style.font_size);
        let (stamped, layout) = compositor::render(base, &spec, &font, &self.style);

        if layout.overlaps() {
            tracing::warn!(
                source = %source.display(),
                width,
                height,
                "image too small, watermark badges overlap"
            );
        }

        codec::encode(stamped, output, OUTPUT_QUALITY)?;

        tracing::debug!(
            source = %source.display(),
            output = %output.display(),
            font = %font.name(),
            "watermark applied"
        );

        Ok(WatermarkOutcome {
            output: output.to_path_buf(),
            width,
            height,
            bitmap_font: font.is_bitmap(),
            badges_overlap: layout.overlaps(),
        })
    }

    /// Stamp `source` for `owner` into `output`, reporting only success.
    ///
    /// Every failure is logged and collapsed to `false`. On `false`, no
    /// usable file at `output` should be assumed.
    #[must_use]
    pub fn apply_watermark(&self, source: &Path, owner: &str, output: &Path) -> bool {
        match self.watermark_file(source, owner, output) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    source = %source.display(),
                    output = %output.display(),
                    error = %e,
                    "error adding watermark"
                );
                false
            }
        }
    }

    /// Process a single image file, creating the output directory if needed.
    #[must_use]
    pub fn process_file(&self, input: &Path, output: &Path, owner: &str) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            output: output.to_path_buf(),
            success: false,
            message: String::new(),
        };

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    return result;
                }
            }
        }

        match self.watermark_file(input, owner, output) {
            Ok(outcome) => {
                result.success = true;
                result.message = if outcome.badges_overlap {
                    "Watermarked (badges overlap)".to_string()
                } else {
                    "Watermarked".to_string()
                };
            }
            Err(e) => {
                tracing::error!(source = %input.display(), error = %e, "error adding watermark");
                result.message = e.to_string();
            }
        }

        result
    }

    /// Process all supported images in a directory.
    ///
    /// Outputs are named `watermarked_{stem}.jpg`; inputs that share a stem
    /// get numbered suffixes so no two jobs write the same file. Uses
    /// parallel iteration when the `cli` feature is enabled (via rayon).
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        owner: &str,
    ) -> Vec<ProcessResult> {
        let mut inputs: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => {
                return vec![ProcessResult {
                    path: input_dir.to_path_buf(),
                    output: output_dir.to_path_buf(),
                    success: false,
                    message: format!("Failed to read directory: {e}"),
                }];
            }
        };
        inputs.sort();

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult {
                    path: output_dir.to_path_buf(),
                    output: output_dir.to_path_buf(),
                    success: false,
                    message: format!("Failed to create output directory: {e}"),
                }];
            }
        }

        let jobs = assign_output_paths(&inputs, output_dir);

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            jobs.par_iter()
                .map(|(input, output)| self.process_file(input, output, owner))
                .collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            jobs.iter()
                .map(|(input, output)| self.process_file(input, output, owner))
                .collect()
        }
    }
}

/// Stamp `source` for `owner` into `output` with default settings.
///
/// See [`Watermarker::apply_watermark`].
#[must_use]
pub fn apply_watermark(source: &Path, owner: &str, output: &Path) -> bool {
    Watermarker::default().apply_watermark(source, owner, output)
}

/// Pair each input with a distinct output path inside `output_dir`.
fn assign_output_paths(inputs: &[PathBuf], output_dir: &Path) -> Vec<(PathBuf, PathBuf)> {
    let mut seen: HashMap<String, u32> = HashMap::new();
    inputs
        .iter()
        .map(|input| {
            let stem = input.file_stem().unwrap_or_default().to_string_lossy().into_owned();
            let count = seen.entry(stem.clone()).or_insert(0);
            let name = if *count == 0 {
                format!("watermarked_{stem}.jpg")
            } else {
                format!("watermarked_{stem}_{count}.jpg")
            };
            *count += 1;
            (input.clone(), output_dir.join(name))
        })
        .collect()
}

/// Check if a file has an extension the default upload policy accepts.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(gatekeeper::is_allowed_file)
}

/// Generate a default output path from an input path.
///
/// Example: `"farm.png"` becomes `"watermarked_farm.jpg"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("watermarked_{stem}.jpg"))
}
