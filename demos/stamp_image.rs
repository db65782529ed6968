//! Stamp a farmer's badges onto a single image.
//!
//! Usage:
//! ```sh
//! cargo run --example stamp_image -- farm.png "Rajesh Kumar" watermarked_farm.jpg
//! ```

use std::env;
use std::path::Path;
use std::process;

use agrolink_watermark::Watermarker;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <input> <farmer name> <output>", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);
    let farmer = &args[2];
    let output = Path::new(&args[3]);

    match Watermarker::new().watermark_file(input, farmer, output) {
        Ok(outcome) => {
            println!(
                "Done: {} ({}x{}{})",
                outcome.output.display(),
                outcome.width,
                outcome.height,
                if outcome.bitmap_font { ", bitmap font" } else { "" }
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
