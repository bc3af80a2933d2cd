use anyhow::Result;
use clap::{Parser, ValueEnum};
use favgen::builder::DEFAULT_MANIFEST_FILE_NAME;
use favgen::pixel::FitMode;
use favgen::GenerateOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "favgen",
    version,
    about = "Generates a favicon set and web manifest from a source image"
)]
struct Args {
    /// Path to the input image
    #[arg(short, long)]
    input: PathBuf,

    /// Output folder for the generated files
    #[arg(short, long)]
    output: PathBuf,

    /// Name for the web manifest
    #[arg(short, long, default_value = "")]
    name: String,

    /// Short name for the web manifest
    #[arg(short, long)]
    short_name: Option<String>,

    /// Theme color for the web manifest (hex; sampled from the image if
    /// omitted)
    #[arg(short, long)]
    color: Option<String>,

    /// Background color used with the contain fit
    #[arg(short, long, default_value = "transparent")]
    background: String,

    /// Mark manifest icons as maskable
    #[arg(short, long)]
    maskable: bool,

    /// Start URL for the web manifest
    #[arg(short = 'u', long)]
    start_url: Option<String>,

    /// Resize strategy
    #[arg(long, value_enum, default_value_t = FitArg::Contain)]
    fit: FitArg,

    /// File name for the web manifest
    #[arg(long, default_value = DEFAULT_MANIFEST_FILE_NAME)]
    manifest_file_name: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FitArg {
    Contain,
    Cover,
    Fill,
}

impl From<FitArg> for FitMode {
    fn from(fit: FitArg) -> FitMode {
        match fit {
            FitArg::Contain => FitMode::Contain,
            FitArg::Cover => FitMode::Cover,
            FitArg::Fill => FitMode::Fill,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let mut options = GenerateOptions::new(args.input, args.output);
    options.name = args.name;
    options.short_name = args.short_name;
    options.theme_color = args.color;
    options.background = args.background;
    options.fit = args.fit.into();
    options.maskable = args.maskable;
    options.start_url = args.start_url;
    options.manifest_file_name = args.manifest_file_name;

    let stats = favgen::generate(&options)?;
    println!("Successfully generated favicons!");
    for image in stats.images.iter() {
        println!("  {}: {}", image.file_name, format_file_size(image.size));
    }
    println!("  {}", stats.manifest);
    Ok(())
}

fn format_file_size(size: u64) -> String {
    if size < 1024 {
        format!("{} bytes", size)
    } else {
        format!("{} kB", (size + 512) / 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::format_file_size;

    #[test]
    fn file_sizes_are_human_readable() {
        assert_eq!(format_file_size(0), "0 bytes");
        assert_eq!(format_file_size(1023), "1023 bytes");
        assert_eq!(format_file_size(1024), "1 kB");
        assert_eq!(format_file_size(10_000), "10 kB");
    }
}
