//! Upload screening by file extension and size.

use crate::error::{Error, Result};

/// Default upload size limit: 5 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Which uploads are allowed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Accepted extensions, lowercase, without the dot.
    pub allowed_extensions: Vec<String>,
    /// Largest accepted upload in bytes.
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: ["png", "jpg", "jpeg"].map(String::from).to_vec(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Lowercased text after the last `.`, if there is one.
fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

impl UploadPolicy {
    /// Whether `filename` carries an accepted extension.
    #[must_use]
    pub fn is_allowed_file(&self, filename: &str) -> bool {
        extension_of(filename).is_some_and(|ext| self.allowed_extensions.contains(&ext))
    }

    /// Screen an upload, returning its lowercased extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for a disallowed or missing
    /// extension and [`Error::FileTooLarge`] when `len` exceeds the limit.
    pub fn check(&self, filename: &str, len: u64) -> Result<String> {
        let ext = extension_of(filename)
            .filter(|ext| self.allowed_extensions.contains(ext))
            .ok_or_else(|| Error::UnsupportedFormat(filename.to_string()))?;

        if len > self.max_bytes {
            return Err(Error::FileTooLarge {
                size: len,
                limit: self.max_bytes,
            });
        }

        Ok(ext)
    }
}

/// Whether `filename` passes the default extension filter.
#[must_use]
pub fn is_allowed_file(filename: &str) -> bool {
    UploadPolicy::default().is_allowed_file(filename)
}
