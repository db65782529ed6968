use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use agrolink_watermark::{
    default_output_path, FontChain, IntakeDirs, ProcessResult, ProductForm, ProductIntake,
    RecordStore, Upload, UploadPolicy, Watermarker,
};

#[derive(Parser)]
#[command(
    name = "agrolink",
    about = "Stamp farmer ownership and capture-time badges onto product photos",
    version,
    after_help = "Simple usage: agrolink stamp farm.png --farmer \"Rajesh Kumar\"\n\n\
                  Block numbers and tags printed by `intake` are simulated display values."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Preferred font file, tried before the built-in candidates (repeatable)
    #[arg(long = "font", global = true)]
    fonts: Vec<PathBuf>,

    /// Platform named in the ownership notice
    #[arg(long, global = true, default_value = "AgroLink")]
    platform: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Watermark a single image
    Stamp {
        /// Input image file
        input: PathBuf,

        /// Farmer display name for the ownership notice
        #[arg(long)]
        farmer: String,

        /// Output file (default: watermarked_{name}.jpg next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Watermark every png/jpg/jpeg in a directory
    Batch {
        /// Input directory
        input: PathBuf,

        /// Farmer display name for the ownership notice
        #[arg(long)]
        farmer: String,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Run the add-product flow against a sample store and print the receipt
    Intake(IntakeArgs),
}

#[derive(Args)]
struct IntakeArgs {
    /// Product photo to stamp
    #[arg(long)]
    image: Option<PathBuf>,

    /// Registered farmer id (the sample store has farmer 1)
    #[arg(long, default_value = "1")]
    farmer_id: String,

    /// Product name
    #[arg(long)]
    product_name: String,

    /// Product category
    #[arg(long)]
    category: String,

    /// Quantity
    #[arg(long)]
    quantity: String,

    /// Unit of the quantity
    #[arg(long)]
    unit: String,

    /// Harvest date
    #[arg(long)]
    harvest_date: String,

    /// Where the product was grown
    #[arg(long)]
    farm_location: String,

    /// Price per unit
    #[arg(long, default_value = "")]
    price_per_unit: String,

    /// Description
    #[arg(long, default_value = "")]
    description: String,

    /// Staging directory for uploads
    #[arg(long, env = "AGROLINK_UPLOAD_DIR", default_value = "static/uploads/products")]
    upload_dir: PathBuf,

    /// Directory for watermarked images
    #[arg(long, env = "AGROLINK_WATERMARKED_DIR", default_value = "static/watermarked")]
    watermarked_dir: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let fonts = cli
        .fonts
        .iter()
        .rev()
        .fold(FontChain::default(), |chain, f| chain.with_preferred(f));
    let marker = Watermarker::new()
        .with_fonts(fonts)
        .with_platform(cli.platform);

    let failed = match cli.command {
        Command::Stamp {
            input,
            farmer,
            output,
        } => {
            let output = output.unwrap_or_else(|| default_output_path(&input));
            let result = marker.process_file(&input, &output, &farmer);
            print_result(&result, cli.quiet);
            !result.success
        }
        Command::Batch {
            input,
            farmer,
            output,
        } => run_batch(&marker, &input, &output, &farmer, cli.quiet),
        Command::Intake(args) => run_intake(marker, args),
    };

    if failed {
        process::exit(1);
    }
}

fn run_batch(marker: &Watermarker, input: &Path, output: &Path, farmer: &str, quiet: bool) -> bool {
    if !input.is_dir() {
        eprintln!("Error: Input path is not a directory: {}", input.display());
        return true;
    }

    let results = marker.process_directory(input, output, farmer);

    let mut success_count = 0u32;
    let mut fail_count = 0u32;
    for r in &results {
        print_result(r, quiet);
        if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if !quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    fail_count > 0
}

fn run_intake(marker: Watermarker, args: IntakeArgs) -> bool {
    let upload = match &args.image {
        Some(path) => match std::fs::read(path) {
            Ok(bytes) => Some(Upload {
                filename: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                bytes,
            }),
            Err(e) => {
                eprintln!("Error: cannot read {}: {e}", path.display());
                return true;
            }
        },
        None => None,
    };

    let form = ProductForm {
        product_name: args.product_name,
        category: args.category,
        quantity: args.quantity,
        unit: args.unit,
        harvest_date: args.harvest_date,
        price_per_unit: args.price_per_unit,
        farmer_id: args.farmer_id,
        farm_location: args.farm_location,
        description: args.description,
    };
    let dirs = IntakeDirs {
        upload_dir: args.upload_dir,
        watermarked_dir: args.watermarked_dir,
    };

    let intake = ProductIntake::new(dirs, UploadPolicy::default(), marker);
    let mut store = RecordStore::with_sample_data();

    match intake.submit(&mut store, form, upload) {
        Ok(receipt) => {
            let report = serde_json::json!({
                "success": true,
                "receipt": receipt,
                "stats": store.stats(),
            });
            match serde_json::to_string_pretty(&report) {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    return true;
                }
            }
            false
        }
        Err(e) => {
            println!("{}", serde_json::json!({ "success": false, "message": e.to_string() }));
            true
        }
    }
}

fn print_result(result: &ProcessResult, quiet: bool) {
    if quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        eprintln!(
            "[OK] {filename} -> {} ({})",
            result.output.display(),
            result.message
        );
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }
}
