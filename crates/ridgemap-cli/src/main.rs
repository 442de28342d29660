//! ridgemap CLI — fingerprint minutiae extraction from image files.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use ridgemap::{DetectConfig, Detector};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "ridgemap")]
#[command(about = "Extract fingerprint minutiae (positions, directions, quality, ridge counts)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect minutiae in a grayscale fingerprint image.
    Detect(CliDetectArgs),

    /// Print the default detection configuration as JSON.
    ConfigDump,
}

#[derive(Debug, Clone, Args)]
struct CliDetectArgs {
    /// Path to the input image (PNG or PGM, 8-bit grayscale).
    #[arg(long)]
    image: PathBuf,

    /// Path to write the minutiae template (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Path to write the binarized image (PNG).
    #[arg(long)]
    binary: Option<PathBuf>,

    /// Path to a detection configuration file (JSON); defaults apply
    /// otherwise.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scan resolution in pixels per inch, recorded in the template.
    #[arg(long, default_value = "500")]
    ppi: u32,

    /// Use the isotropic binarization fallback for directionless blocks.
    #[arg(long)]
    isotropic_fallback: bool,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Detect(args) => run_detect(args),
        Commands::ConfigDump => {
            println!("{}", serde_json::to_string_pretty(&DetectConfig::default())?);
            Ok(())
        }
    }
}

fn run_detect(args: CliDetectArgs) -> CliResult<()> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => DetectConfig::default(),
    };
    config.ppi = args.ppi;
    config.binarize.isotropic_fallback |= args.isotropic_fallback;

    let image = image::ImageReader::open(&args.image)?.decode()?.into_luma8();
    let detector = Detector::with_config(config);
    let output = detector.detect(&image)?;

    let template = output.template(args.ppi);
    std::fs::write(&args.out, serde_json::to_string_pretty(&template)?)?;
    eprintln!(
        "{} minutiae -> {}",
        output.minutiae.len(),
        args.out.display()
    );

    if let Some(path) = &args.binary {
        output.binary_image.save(path)?;
    }
    Ok(())
}
