use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use palettize::models::AppConfig;
use palettize::rendering::RgbImage;
use palettize::services::{QuantizedImage, Quantizer};

#[derive(Parser)]
#[command(name = "palettize")]
#[command(about = "Extract color palettes from PNG images and quantize onto them")]
struct Cli {
    /// Config file (defaults to $PALETTIZE_CONFIG, then ./palettize.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the color table extracted from one or more images
    Extract {
        /// Input PNG (repeat to extract one table across several images)
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Number of colors in the table
        #[arg(short = 'n', long)]
        colors: Option<usize>,

        /// Forced colors as comma-separated hex (e.g. "#000000,#FFFFFF")
        #[arg(long)]
        force: Option<String>,
    },
    /// Quantize an image to an indexed PNG
    Quantize {
        /// Input PNG
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Number of colors in the table
        #[arg(short = 'n', long)]
        colors: Option<usize>,

        /// Forced colors as comma-separated hex (e.g. "#000000,#FFFFFF")
        #[arg(long)]
        force: Option<String>,

        /// Use error diffusion instead of plain nearest-color mapping
        #[arg(long)]
        dither: bool,

        /// Diffusion kernel (floyd-steinberg, atkinson, sierra-lite, jarvis-judice-ninke)
        #[arg(long)]
        kernel: Option<String>,

        /// Skip the nearest-color grid and scan linearly
        #[arg(long)]
        no_optimize: bool,
    },
    /// Write mapped and dithered output for every table size from 4 to 256
    Sweep {
        /// Input PNG
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short = 'd', long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "palettize=info,color_quant=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config_path = AppConfig::resolve_path(cli.config.as_deref());
    let config = AppConfig::load(config_path.as_deref());

    match cli.command {
        Some(Commands::Extract {
            input,
            colors,
            force,
        }) => run_extract_command(config, &input, colors, force),
        Some(Commands::Quantize {
            input,
            output,
            colors,
            force,
            dither,
            kernel,
            no_optimize,
        }) => {
            let mut config = with_overrides(config, colors, force);
            config.dither |= dither;
            if let Some(kernel) = kernel {
                config.kernel = kernel;
            }
            if no_optimize {
                config.optimize = false;
            }
            run_quantize_command(config, &input, &output)
        }
        Some(Commands::Sweep { input, out_dir }) => run_sweep_command(config, &input, &out_dir),
        None => {
            println!("palettize {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Effective configuration:");
            print!("{}", config.to_yaml()?);
            println!();
            println!("Run `palettize --help` for commands.");
            Ok(())
        }
    }
}

fn with_overrides(mut config: AppConfig, colors: Option<usize>, force: Option<String>) -> AppConfig {
    if let Some(colors) = colors {
        config.table_length = colors;
    }
    if let Some(force) = force {
        config.force_colors = force
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }
    config
}

/// Print one extracted table across all inputs
fn run_extract_command(
    config: AppConfig,
    inputs: &[PathBuf],
    colors: Option<usize>,
    force: Option<String>,
) -> anyhow::Result<()> {
    let config = with_overrides(config, colors, force);
    let table_length = config.table_length;
    let quantizer = Quantizer::new(config)?;

    let images = inputs
        .iter()
        .map(|path| RgbImage::open(path))
        .collect::<Result<Vec<_>, _>>()?;
    let table = quantizer.extract_table(&images, table_length)?;

    for color in table.iter() {
        println!("{}", color.to_hex());
    }
    Ok(())
}

fn run_quantize_command(config: AppConfig, input: &Path, output: &Path) -> anyhow::Result<()> {
    let quantizer = Quantizer::new(config)?;
    let image = RgbImage::open(input)?;
    let quantized: QuantizedImage = quantizer.quantize(&image)?;
    quantized.write_png(output)?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        colors = quantized.table.len(),
        "Quantized"
    );
    Ok(())
}

fn run_sweep_command(config: AppConfig, input: &Path, out_dir: &Path) -> anyhow::Result<()> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image")
        .to_string();
    let quantizer = Quantizer::new(config)?;
    let image = RgbImage::open(input)?;
    let written = quantizer.sweep(&image, &stem, out_dir)?;

    println!("Wrote {} files to {}", written.len(), out_dir.display());
    Ok(())
}
