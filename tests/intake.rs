use std::io::Cursor;

use agrolink_watermark::{
    Error, FarmerForm, FontChain, IntakeDirs, ProductForm, ProductIntake, RecordStore, Upload,
    UploadPolicy, Watermarker,
};
use image::{ImageFormat, Rgb, RgbImage};

fn jpeg_upload(name: &str, w: u32, h: u32) -> Upload {
    let mut buf = Cursor::new(Vec::new());
    RgbImage::from_pixel(w, h, Rgb([120, 170, 60]))
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    Upload {
        filename: name.to_string(),
        bytes: buf.into_inner(),
    }
}

fn form(farmer_id: u64, name: &str) -> ProductForm {
    ProductForm {
        product_name: name.to_string(),
        category: "Fruit".to_string(),
        quantity: "12".to_string(),
        unit: "crate".to_string(),
        harvest_date: "2024-06-01".to_string(),
        farmer_id: farmer_id.to_string(),
        farm_location: "Ratnagiri".to_string(),
        price_per_unit: "450".to_string(),
        ..ProductForm::default()
    }
}

#[test]
fn registered_farmer_lists_stamped_products() {
    let root = tempfile::tempdir().unwrap();
    let intake = ProductIntake::new(
        IntakeDirs {
            upload_dir: root.path().join("uploads"),
            watermarked_dir: root.path().join("watermarked"),
        },
        UploadPolicy::default(),
        Watermarker::new().with_fonts(FontChain::bitmap_only()),
    );

    let mut store = RecordStore::with_sample_data();
    let farmer_id = store
        .register_farmer(FarmerForm {
            name: "Meera Patil".to_string(),
            email: "meera@example.com".to_string(),
            phone: "+91 90000 00000".to_string(),
            address: "Ratnagiri, Maharashtra".to_string(),
            farm_size: "2.5".to_string(),
            crops: "Mangoes".to_string(),
        })
        .unwrap()
        .id;
    assert_eq!(farmer_id, 2);

    let first = intake
        .submit(
            &mut store,
            form(farmer_id, "Alphonso Mangoes"),
            Some(jpeg_upload("mango.jpeg", 500, 400)),
        )
        .unwrap();
    let second = intake
        .submit(
            &mut store,
            form(farmer_id, "Kesar Mangoes"),
            Some(jpeg_upload("mango.jpeg", 500, 400)),
        )
        .unwrap();

    assert_eq!((first.product_id, second.product_id), (1, 2));
    assert_eq!(second.product_count, 2);
    assert!(second.block_number > first.block_number);
    assert_ne!(first.watermarked_image, second.watermarked_image);

    for receipt in [&first, &second] {
        let name = receipt.watermarked_image.as_deref().unwrap();
        let img = image::open(intake.watermarked_path(name)).unwrap();
        assert_eq!((img.width(), img.height()), (500, 400));
    }

    let product = store.product(2).unwrap();
    assert_eq!(product.farmer_name, "Meera Patil");
    assert_eq!(product.qr_code, "QR000002");

    let stats = store.stats();
    assert_eq!(stats.farmer_count, 2);
    assert_eq!(stats.product_count, 2);
    assert_eq!(stats.latest_block, second.block_number);
}

#[test]
fn oversized_upload_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let intake = ProductIntake::new(
        IntakeDirs {
            upload_dir: root.path().join("uploads"),
            watermarked_dir: root.path().join("watermarked"),
        },
        UploadPolicy {
            max_bytes: 64,
            ..UploadPolicy::default()
        },
        Watermarker::new().with_fonts(FontChain::bitmap_only()),
    );
    let mut store = RecordStore::with_sample_data();

    let err = intake
        .submit(&mut store, form(1, "Rice"), Some(jpeg_upload("rice.jpg", 64, 64)))
        .unwrap_err();
    assert!(matches!(err, Error::FileTooLarge { limit: 64, .. }));
    assert_eq!(store.product_count(), 0);
}

#[test]
fn receipt_serializes_with_display_tag() {
    let root = tempfile::tempdir().unwrap();
    let intake = ProductIntake::new(
        IntakeDirs {
            upload_dir: root.path().join("uploads"),
            watermarked_dir: root.path().join("watermarked"),
        },
        UploadPolicy::default(),
        Watermarker::new(),
    );
    let mut store = RecordStore::with_sample_data();

    let receipt = intake.submit(&mut store, form(1, "Rice"), None).unwrap();
    let json = serde_json::to_value(&receipt).unwrap();
    assert_eq!(json["product_id"], 1);
    assert_eq!(json["qr_code"], "QR000001");
    assert!(json["display_tag"].as_str().unwrap().starts_with("0x"));
    assert!(json["watermarked_image"].is_null());
}
