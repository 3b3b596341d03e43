//! rasterpipe - decode, transcode, tile, psnr, blur, design, shape
//!
//! A thin command-line front end over `rasterpipe-io`/`rasterpipe-transform`;
//! each verb below is informative tooling, not part of the core pipeline API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

use commands::{blur, decode, design, info, psnr, shape, tile, transcode};

#[derive(Parser)]
#[command(name = "rasterpipe")]
#[command(author, version, about = "Scanline image decode/transform/encode pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Re-run the selected verb N times against the same input, reporting
    /// wall-clock timing; a benchmarking convenience, not a distinct path.
    #[arg(long = "repeat", global = true, default_value = "1")]
    repeat: u32,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Report decoded image dimensions, color mode, and metadata.
    Info(info::InfoArgs),
    /// Decode a source image to a raw bitmap description.
    Decode(decode::DecodeArgs),
    /// Decode, transform, and re-encode an image.
    Transcode(transcode::TranscodeArgs),
    /// Split a decoded bitmap into a grid of numbered sub-bitmap files.
    Tile(tile::TileArgs),
    /// Compute PSNR between two images of equal dimensions.
    Psnr(psnr::PsnrArgs),
    /// Apply the sharpen/blur convolution in isolation.
    Blur(blur::BlurArgs),
    /// Lay out a contact-sheet canvas from a set of input thumbnails.
    Design(design::DesignArgs),
    /// Report the crop/output Rects implied by a set of options, without decoding pixels.
    Shape(shape::ShapeArgs),
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "rasterpipe=info",
        2 => "rasterpipe=debug",
        _ => "rasterpipe=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_timer(fmt::time::uptime())
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    for iteration in 0..cli.repeat.max(1) {
        let start = std::time::Instant::now();
        run_command(cli.command.clone(), cli.verbose)?;
        if cli.repeat > 1 {
            eprintln!("iteration {iteration}: {:?}", start.elapsed());
        }
    }
    Ok(())
}

fn run_command(command: Commands, verbose: u8) -> Result<()> {
    match command {
        Commands::Info(args) => info::run(args, verbose),
        Commands::Decode(args) => decode::run(args, verbose),
        Commands::Transcode(args) => transcode::run(args, verbose),
        Commands::Tile(args) => tile::run(args, verbose),
        Commands::Psnr(args) => psnr::run(args, verbose),
        Commands::Blur(args) => blur::run(args, verbose),
        Commands::Design(args) => design::run(args, verbose),
        Commands::Shape(args) => shape::run(args, verbose),
    }
}

