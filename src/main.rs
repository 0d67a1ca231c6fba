use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use mobile_price_wizard::{
    catalog::label_for,
    config::{LOG_ENV, LOG_FILE_NAME},
    encode, select_payload, DeviceAttributes, ExportOutcome, Exporter,
    PriceEstimate, QrStyle, WizardConfig, AGE_OPTIONS, BRANDS, CONDITION_OPTIONS,
    STORAGE_OPTIONS,
};

#[derive(Parser)]
#[command(name = "mobile-price-wizard", version, about = "Estimate mobile device prices and share them as QR codes")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive two-tab terminal UI (default)
    Ui,

    /// Estimate a price without the UI
    Estimate {
        #[arg(long, default_value = "")]
        brand: String,
        #[arg(long, default_value = "")]
        model: String,
        #[arg(long, default_value = "")]
        storage: String,
        #[arg(long, default_value = "")]
        condition: String,
        #[arg(long, default_value = "")]
        age: String,
    },

    /// Generate a QR code PNG without the UI
    Qr {
        /// Custom text; takes precedence over --price
        #[arg(long, default_value = "")]
        text: String,

        /// Price to embed when no text is given
        #[arg(long)]
        price: Option<u64>,

        /// Output file (defaults to mobile-price-qr.png in the export dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the accepted brand, storage, condition and age values
    Options,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = WizardConfig::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => {
            if let Err(e) = init_file_logging(&config.log_dir()) {
                eprintln!("⚠️  Logging disabled: {:#}", e);
            }
            run_ui_mode(&config)?;
        }
        Commands::Estimate {
            brand,
            model,
            storage,
            condition,
            age,
        } => {
            init_stderr_logging();
            let attrs = DeviceAttributes::new(brand, model, storage, condition, age);
            run_estimate(&config, &attrs)?;
        }
        Commands::Qr { text, price, out } => {
            init_stderr_logging();
            run_qr(&config, &text, price.map(PriceEstimate::new), out.as_deref())?;
        }
        Commands::Options => print_options(),
    }

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The terminal belongs to the UI, so records go to a file instead
fn init_file_logging(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log dir {:?}", dir))?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(appender)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

fn run_estimate(config: &WizardConfig, attrs: &DeviceAttributes) -> Result<()> {
    let table = config.pricing_table().context("Failed to load pricing table")?;

    println!("📱 Mobile Price Wizard - Price Calculator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match table.estimate(attrs) {
        Ok(price) => {
            println!("✓ {} {} ({})", attrs.brand, attrs.model, attrs.storage);
            println!(
                "✓ Condition: {}  Age: {}",
                label_for(&CONDITION_OPTIONS, &attrs.condition),
                label_for(&AGE_OPTIONS, &attrs.age)
            );
            println!("\n💰 Estimated Price: {}", price);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    }
}

fn run_qr(
    config: &WizardConfig,
    text: &str,
    price: Option<PriceEstimate>,
    out: Option<&Path>,
) -> Result<()> {
    println!("🔳 Mobile Price Wizard - QR Code Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let payload = select_payload(text, price);
    let image = encode(&payload, &QrStyle::default()).context("Error generating QR code")?;
    println!("✓ QR Code contains: {}", image.payload());

    let path = match out {
        Some(path) => {
            std::fs::write(path, image.png_bytes())
                .with_context(|| format!("Failed to write {:?}", path))?;
            path.to_path_buf()
        }
        None => {
            let exporter = Exporter::new(config.export_dir.clone());
            let ExportOutcome::Saved(path) = exporter.download(Some(&image))? else {
                anyhow::bail!("Nothing to export");
            };
            path
        }
    };

    println!("💾 Saved {}", path.display());
    Ok(())
}

fn print_options() {
    println!("Brands:     {}", BRANDS.iter().map(|b| b.name).collect::<Vec<_>>().join(", "));
    println!(
        "Storage:    {}",
        STORAGE_OPTIONS.iter().map(|s| s.name).collect::<Vec<_>>().join(", ")
    );
    println!(
        "Condition:  {}",
        CONDITION_OPTIONS
            .iter()
            .map(|c| format!("{} ({})", c.value, c.label))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "Age:        {}",
        AGE_OPTIONS
            .iter()
            .map(|a| format!("{} ({})", a.value, a.label))
            .collect::<Vec<_>>()
            .join(", ")
    );
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &WizardConfig) -> Result<()> {
    use mobile_price_wizard::ui;

    let mut app = ui::App::new(config)?;
    ui::run_ui(&mut app)?;

    if let Some(price) = app.wizard.last_price() {
        println!("✅ Last estimate: {}", price);
    }

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &WizardConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: mobile-price-wizard estimate / qr");
    std::process::exit(1);
}
