//! Product intake: screen the upload, stamp it, record the product.

use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;

use crate::codec;
use crate::engine::Watermarker;
use crate::error::{Error, Result};
use crate::gatekeeper::UploadPolicy;
use crate::records::{CosmeticTag, ProductForm, RecordStore};

/// An uploaded file as received from a form.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied file name; only its extension is used.
    pub filename: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Where uploads are staged and stamped images are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeDirs {
    /// Staging area for raw uploads.
    pub upload_dir: PathBuf,
    /// Final home of watermarked images.
    pub watermarked_dir: PathBuf,
}

impl Default for IntakeDirs {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("static/uploads/products"),
            watermarked_dir: PathBuf::from("static/watermarked"),
        }
    }
}

impl IntakeDirs {
    /// Create both directories if missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a directory cannot be created.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.watermarked_dir)?;
        Ok(())
    }
}

/// What the caller gets back after a product is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductReceipt {
    /// New product id.
    pub product_id: u64,
    /// Cosmetic identifier of the product.
    pub display_tag: CosmeticTag,
    /// Simulated block number.
    pub block_number: u64,
    /// Printable product code.
    pub qr_code: String,
    /// Products in the store after this one.
    pub product_count: usize,
    /// Watermarked photo file name inside the watermarked directory.
    pub watermarked_image: Option<String>,
}

/// Runs the add-product flow against a [`RecordStore`].
#[derive(Debug, Clone, Default)]
pub struct ProductIntake {
    dirs: IntakeDirs,
    policy: UploadPolicy,
    watermarker: Watermarker,
}

impl ProductIntake {
    /// Build an intake with explicit collaborators.
    #[must_use]
    pub fn new(dirs: IntakeDirs, policy: UploadPolicy, watermarker: Watermarker) -> Self {
        Self {
            dirs,
            policy,
            watermarker,
        }
    }

    /// Directory configuration.
    #[must_use]
    pub fn dirs(&self) -> &IntakeDirs {
        &self.dirs
    }

    /// Full path of a watermarked image previously returned in a receipt.
    #[must_use]
    pub fn watermarked_path(&self, filename: &str) -> PathBuf {
        self.dirs.watermarked_dir.join(filename)
    }

    /// Validate `form`, stamp `upload` if present, and record the product.
    ///
    /// An upload with an empty file name is treated as absent. The staged
    /// upload is removed whether or not stamping succeeds. If stamping fails
    /// the product is not recorded.
    ///
    /// # Errors
    ///
    /// Returns form validation errors, [`Error::FarmerNotFound`], gatekeeper
    /// rejections, [`Error::Io`] if staging fails, or
    /// [`Error::ImageProcessing`] if the pipeline fails.
    pub fn submit(
        &self,
        store: &mut RecordStore,
        form: ProductForm,
        upload: Option<Upload>,
    ) -> Result<ProductReceipt> {
        let farmer_id = form.validate()?;
        let farmer_name = store
            .farmer(farmer_id)
            .map(|f| f.name.clone())
            .ok_or(Error::FarmerNotFound(farmer_id))?;

        let watermarked_image = match upload.filter(|u| !u.filename.is_empty()) {
            Some(upload) => Some(self.stamp_upload(&upload, &farmer_name)?),
            None => None,
        };

        let (product_id, display_tag, block_number, qr_code, watermarked_image) = {
            let product = store.add_product(form, watermarked_image)?;
            (
                product.id,
                product.display_tag.clone(),
                product.block_number,
                product.qr_code.clone(),
                product.image_filename.clone(),
            )
        };

        Ok(ProductReceipt {
            product_id,
            display_tag,
            block_number,
            qr_code,
            product_count: store.product_count(),
            watermarked_image,
        })
    }

    /// Stage, stamp, and clean up one upload, returning the stamped file name.
    fn stamp_upload(&self, upload: &Upload, owner: &str) -> Result<String> {
        let len = u64::try_from(upload.bytes.len()).unwrap_or(u64::MAX);
        let ext = self.policy.check(&upload.filename, len)?;
        self.dirs.ensure()?;

        let unique = Uuid::new_v4().simple().to_string();
        let staged = self.dirs.upload_dir.join(format!("{unique}.{ext}"));
        let stamped_name = format!("watermarked_{unique}.jpg");
        let stamped = self.dirs.watermarked_dir.join(&stamped_name);

        std::fs::write(&staged, &upload.bytes)?;
        let ok = self.watermarker.apply_watermark(&staged, owner, &stamped);
        codec::discard(&staged, "staged upload");

        if ok {
            Ok(stamped_name)
        } else {
            if stamped.exists() {
                codec::discard(&stamped, "failed output");
            }
            Err(Error::ImageProcessing)
        }
    }
}
