//! In-memory farmer and product records.
//!
//! Nothing here is persisted, and there is no ledger behind the block
//! numbers or tags. [`CosmeticTag`] values are display identifiers only and
//! cannot be verified against anything.

use std::fmt;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// First block number reported before any record is added.
pub const GENESIS_BLOCK: u64 = 12_847;

/// Accounts reported on top of one per farmer.
const BASE_ACCOUNTS: usize = 8;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Monotonically increasing counter owned by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sequence {
    value: u64,
}

impl Sequence {
    /// A sequence whose next value is `start + 1`.
    #[must_use]
    pub fn starting_at(start: u64) -> Self {
        Self { value: start }
    }

    /// Advance and return the new value.
    pub fn next_value(&mut self) -> u64 {
        self.value += 1;
        self.value
    }

    /// The most recently issued value.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.value
    }
}

/// Hex-looking identifier shown next to records.
///
/// Purely cosmetic: it is not a commitment to any data and proves nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CosmeticTag(String);

impl CosmeticTag {
    /// Tag for a farmer, derived from the id alone.
    #[must_use]
    pub fn for_farmer(id: u64) -> Self {
        Self(format!("0x{id:08x}ABC123"))
    }

    /// Tag for a product: the first 16 hex digits of a SHA-256 over the
    /// product name, farmer id, and creation time.
    #[must_use]
    pub fn for_product(product_name: &str, farmer_id: u64, created: NaiveDateTime) -> Self {
        let input = format!(
            "{product_name}{farmer_id}{}",
            created.format("%Y-%m-%dT%H:%M:%S%.6f")
        );
        let digest = hex::encode(Sha256::digest(input.as_bytes()));
        Self(format!("0x{}", &digest[..16]))
    }

    /// The tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CosmeticTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Farmer registration input, as submitted.
#[derive(Debug, Clone, Default)]
pub struct FarmerForm {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Postal address.
    pub address: String,
    /// Farm size, free text.
    pub farm_size: String,
    /// Crops grown, free text.
    pub crops: String,
}

/// A registered farmer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Farmer {
    /// Store-assigned id.
    pub id: u64,
    /// Display name, stamped onto product photos.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Postal address.
    pub address: String,
    /// Farm size, free text.
    pub farm_size: String,
    /// Crops grown, free text.
    pub crops: String,
    /// Registration time, `YYYY-MM-DD HH:MM:SS`.
    pub registration_date: String,
    /// Cosmetic identifier.
    pub display_tag: CosmeticTag,
    /// Record status.
    pub status: String,
    /// Simulated block number.
    pub block_number: u64,
}

/// Product listing input, as submitted.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    /// Product name.
    pub product_name: String,
    /// Category, free text.
    pub category: String,
    /// Quantity, free text.
    pub quantity: String,
    /// Unit of the quantity.
    pub unit: String,
    /// Harvest date, free text.
    pub harvest_date: String,
    /// Optional price per unit.
    pub price_per_unit: String,
    /// Id of the farmer listing the product, unparsed.
    pub farmer_id: String,
    /// Where the product was grown.
    pub farm_location: String,
    /// Optional description.
    pub description: String,
}

fn require(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::MissingField(field))
    } else {
        Ok(())
    }
}

impl FarmerForm {
    /// Check required fields: name, email, phone, address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for the first empty required field.
    pub fn validate(&self) -> Result<()> {
        require(&self.name, "Name")?;
        require(&self.email, "Email")?;
        require(&self.phone, "Phone")?;
        require(&self.address, "Address")
    }
}

impl ProductForm {
    /// Check required fields and parse the farmer id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for the first empty required field or
    /// [`Error::InvalidFarmerId`] if the id is not an integer.
    pub fn validate(&self) -> Result<u64> {
        require(&self.product_name, "Product Name")?;
        require(&self.category, "Category")?;
        require(&self.quantity, "Quantity")?;
        require(&self.unit, "Unit")?;
        require(&self.harvest_date, "Harvest Date")?;
        require(&self.farmer_id, "Farmer Id")?;
        require(&self.farm_location, "Farm Location")?;

        let raw = self.farmer_id.trim();
        raw.parse()
            .map_err(|_| Error::InvalidFarmerId(raw.to_string()))
    }
}

/// A listed product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Store-assigned id.
    pub id: u64,
    /// Product name.
    pub product_name: String,
    /// Category.
    pub category: String,
    /// Quantity.
    pub quantity: String,
    /// Unit of the quantity.
    pub unit: String,
    /// Harvest date.
    pub harvest_date: String,
    /// Price per unit, possibly empty.
    pub price_per_unit: String,
    /// Owning farmer's id.
    pub farmer_id: u64,
    /// Owning farmer's display name at listing time.
    pub farmer_name: String,
    /// Where the product was grown.
    pub farm_location: String,
    /// Description, possibly empty.
    pub description: String,
    /// Watermarked photo file name, if a photo was uploaded.
    pub image_filename: Option<String>,
    /// Listing time, `YYYY-MM-DD HH:MM:SS`.
    pub added_date: String,
    /// Cosmetic identifier.
    pub display_tag: CosmeticTag,
    /// Simulated block number.
    pub block_number: u64,
    /// Record status.
    pub status: String,
    /// Printable product code.
    pub qr_code: String,
}

/// Summary counters for dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    /// Always `"simulated"`: there is no ledger behind these numbers.
    pub ledger_status: &'static str,
    /// Highest block number issued.
    pub latest_block: u64,
    /// Simulated account count.
    pub account_count: usize,
    /// Registered farmers.
    pub farmer_count: usize,
    /// Listed products.
    pub product_count: usize,
}

/// JSON listing of every farmer.
#[derive(Debug, Serialize)]
pub struct FarmerListing<'a> {
    /// Number of farmers.
    pub total_farmers: usize,
    /// All farmers in registration order.
    pub farmers: &'a [Farmer],
    /// Always `"simulated"`.
    pub ledger_status: &'static str,
    /// When the listing was generated.
    pub last_updated: String,
}

/// JSON listing of every product.
#[derive(Debug, Serialize)]
pub struct ProductListing<'a> {
    /// Number of products.
    pub total_products: usize,
    /// All products in listing order.
    pub products: &'a [Product],
    /// Always `"simulated"`.
    pub ledger_status: &'static str,
    /// When the listing was generated.
    pub last_updated: String,
}

const LEDGER_STATUS: &str = "simulated";

/// Farmers, products, and the counters that number them.
#[derive(Debug, Clone)]
pub struct RecordStore {
    farmers: Vec<Farmer>,
    products: Vec<Product>,
    farmer_ids: Sequence,
    product_ids: Sequence,
    blocks: Sequence,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            farmers: Vec::new(),
            products: Vec::new(),
            farmer_ids: Sequence::default(),
            product_ids: Sequence::default(),
            blocks: Sequence::starting_at(GENESIS_BLOCK),
        }
    }

    /// A store seeded with one sample farmer.
    #[must_use]
    pub fn with_sample_data() -> Self {
        let mut store = Self::new();
        let sample = FarmerForm {
            name: "Rajesh Kumar".to_string(),
            email: "farmer@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "Sample Farm, Maharashtra, India".to_string(),
            farm_size: "5.0".to_string(),
            crops: "Rice, Wheat, Tomatoes".to_string(),
        };
        if let Err(e) = store.register_farmer(sample) {
            tracing::error!(error = %e, "failed to seed sample farmer");
        }
        store
    }

    /// Register a farmer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if a required field is empty.
    pub fn register_farmer(&mut self, form: FarmerForm) -> Result<&Farmer> {
        form.validate()?;

        let id = self.farmer_ids.next_value();
        let farmer = Farmer {
            id,
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            address: form.address.trim().to_string(),
            farm_size: form.farm_size,
            crops: form.crops.trim().to_string(),
            registration_date: Local::now().format(DATE_FORMAT).to_string(),
            display_tag: CosmeticTag::for_farmer(id),
            status: "active".to_string(),
            block_number: self.blocks.next_value(),
        };

        tracing::info!(id, name = %farmer.name, "farmer registered");
        self.farmers.push(farmer);
        Ok(&self.farmers[self.farmers.len() - 1])
    }

    /// List a product for an existing farmer.
    ///
    /// # Errors
    ///
    /// Returns the form's validation error, or [`Error::FarmerNotFound`].
    pub fn add_product(&mut self, form: ProductForm, image_filename: Option<String>) -> Result<&Product> {
        let farmer_id = form.validate()?;
        let farmer_name = self
            .farmer(farmer_id)
            .map(|f| f.name.clone())
            .ok_or(Error::FarmerNotFound(farmer_id))?;

        let now = Local::now().naive_local();
        let product_name = form.product_name.trim().to_string();
        let id = self.product_ids.next_value();
        let product = Product {
            id,
            display_tag: CosmeticTag::for_product(&product_name, farmer_id, now),
            product_name,
            category: form.category.trim().to_string(),
            quantity: form.quantity.trim().to_string(),
            unit: form.unit.trim().to_string(),
            harvest_date: form.harvest_date.trim().to_string(),
            price_per_unit: form.price_per_unit.trim().to_string(),
            farmer_id,
            farmer_name,
            farm_location: form.farm_location.trim().to_string(),
            description: form.description.trim().to_string(),
            image_filename,
            added_date: now.format(DATE_FORMAT).to_string(),
            block_number: self.blocks.next_value(),
            status: "active".to_string(),
            qr_code: format!("QR{id:06}"),
        };

        tracing::info!(id, name = %product.product_name, farmer_id, "product added");
        self.products.push(product);
        Ok(&self.products[self.products.len() - 1])
    }

    /// Look up a farmer; `None` means not registered.
    #[must_use]
    pub fn farmer(&self, id: u64) -> Option<&Farmer> {
        self.farmers.iter().find(|f| f.id == id)
    }

    /// Look up a product; `None` means not listed.
    #[must_use]
    pub fn product(&self, id: u64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// All farmers in registration order.
    #[must_use]
    pub fn farmers(&self) -> &[Farmer] {
        &self.farmers
    }

    /// All products in listing order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of registered farmers.
    #[must_use]
    pub fn farmer_count(&self) -> usize {
        self.farmers.len()
    }

    /// Number of listed products.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Dashboard counters.
    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            ledger_status: LEDGER_STATUS,
            latest_block: self.blocks.current(),
            account_count: BASE_ACCOUNTS + self.farmer_count(),
            farmer_count: self.farmer_count(),
            product_count: self.product_count(),
        }
    }

    /// Every farmer, ready to serialize.
    #[must_use]
    pub fn farmer_listing(&self) -> FarmerListing<'_> {
        FarmerListing {
            total_farmers: self.farmer_count(),
            farmers: &self.farmers,
            ledger_status: LEDGER_STATUS,
            last_updated: Local::now().format(DATE_FORMAT).to_string(),
        }
    }

    /// Every product, ready to serialize.
    #[must_use]
    pub fn product_listing(&self) -> ProductListing<'_> {
        ProductListing {
            total_products: self.product_count(),
            products: &self.products,
            ledger_status: LEDGER_STATUS,
            last_updated: Local::now().format(DATE_FORMAT).to_string(),
        }
    }
}
