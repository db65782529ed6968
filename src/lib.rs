//! Stamp ownership and capture-time badges onto farm product photos.
//!
//! Each photo gets two semi-transparent badges: an ownership notice
//! (`© {farmer} - AgroLink Verified`) in the bottom-right corner and a
//! `Captured: YYYY-MM-DD HH:MM` notice in the top-left. The result is always
//! written as a quality-90 JPEG.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! let ok = agrolink_watermark::apply_watermark(
//!     Path::new("farm.png"),
//!     "Rajesh Kumar",
//!     Path::new("watermarked_farm.jpg"),
//! );
//! assert!(ok);
//! ```
//!
//! # Typed errors
//!
//! [`Watermarker::watermark_file`] returns the same work as a
//! [`Result`], for callers that want to know why stamping failed.
//!
//! ```no_run
//! use std::path::Path;
//! use agrolink_watermark::{FontChain, Watermarker};
//!
//! let marker = Watermarker::new().with_fonts(FontChain::default().with_preferred("brand.ttf"));
//! match marker.watermark_file(Path::new("farm.png"), "Asha", Path::new("out.jpg")) {
//!     Ok(outcome) => println!("{}x{}", outcome.width, outcome.height),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
//!
//! # Records
//!
//! [`RecordStore`] keeps farmers and products in memory, and
//! [`ProductIntake`] ties uploads, the watermark pipeline, and the store
//! together. Block numbers and tags there are simulated display values.

#![deny(missing_docs)]

pub mod blending;
pub mod codec;
pub mod compositor;
mod engine;
pub mod error;
pub mod font;
pub mod gatekeeper;
pub mod intake;
pub mod notice;
pub mod placement;
pub mod records;

pub use engine::{
    apply_watermark, default_output_path, is_supported_image, ProcessResult, WatermarkOutcome,
    Watermarker,
};
pub use error::{Error, Result};
pub use font::{FontChain, LoadedFont};
pub use gatekeeper::UploadPolicy;
pub use intake::{IntakeDirs, ProductIntake, ProductReceipt, Upload};
pub use notice::{BadgeStyle, WatermarkSpec};
pub use records::{FarmerForm, ProductForm, RecordStore};
