use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bloom_toolkit::bloom::{bloom_image, derive_output_path};
use bloom_toolkit::{BloomSettings, ToneMapping};

#[derive(Parser)]
#[command(name = "bloom-toolkit")]
#[command(about = "Spread a glow around pixels of a chosen color by solving a Laplace equation")]
struct Cli {
    /// Path to the image that will be transformed
    image: PathBuf,

    /// Controls how far the bloom is spread (in pixels)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    n: u32,

    /// Red component of the color that will be bloomed (from 0 to 255)
    r: u8,

    /// Green component of the color that will be bloomed (from 0 to 255)
    g: u8,

    /// Blue component of the color that will be bloomed (from 0 to 255)
    b: u8,

    /// Use Reinhard mapping to convert HDR colors to LDR. Without this
    /// flag, simple color clamping is used instead
    #[arg(long)]
    reinhard: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bloom_toolkit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let settings = BloomSettings {
        radius: cli.n,
        color: [cli.r, cli.g, cli.b],
        tone_mapping: if cli.reinhard {
            ToneMapping::Reinhard
        } else {
            ToneMapping::Clamp
        },
        ..Default::default()
    };

    let output_path = derive_output_path(&cli.image);
    let result = bloom_image(cli.image, output_path.clone(), settings)?;

    println!(
        "Bloomed {} source pixels ({} unknowns) -> {}",
        result.source_pixels,
        result.unknowns,
        output_path.display()
    );

    Ok(())
}
