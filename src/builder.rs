//! Drives the whole generation run: renders each configured target from the
//! source image, writes the files, and assembles the web manifest.  If any
//! step fails partway, every file already written in the run is removed
//! before the error propagates.

use crate::error::Result;
use crate::ico::{self, SourceImage};
use crate::manifest::WebManifest;
use crate::pixel::{self, FitMode};
use image::{DynamicImage, ImageFormat, Rgba};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default file name for the web manifest.
pub const DEFAULT_MANIFEST_FILE_NAME: &str = "site.webmanifest";

/// One file to produce from the source image.
#[derive(Clone, Debug)]
pub enum OutputTarget {
    /// A single resized PNG.
    Png {
        /// Output file name, relative to the output directory.
        file_name: String,
        /// Square dimension, in pixels.
        size: u32,
        /// Whether this icon is advertised in the web manifest.
        in_manifest: bool,
    },
    /// A multi-resolution ICO container.
    Ico {
        /// Output file name, relative to the output directory.
        file_name: String,
        /// The square dimensions bundled into the container.
        sizes: Vec<u32>,
    },
}

impl OutputTarget {
    /// The standard favicon set: android-chrome and apple-touch PNGs plus
    /// the classic small-icon ICO bundle.
    pub fn default_set() -> Vec<OutputTarget> {
        vec![
            OutputTarget::png("android-chrome-192x192.png", 192, true),
            OutputTarget::png("android-chrome-512x512.png", 512, true),
            OutputTarget::png("apple-touch-icon.png", 180, false),
            OutputTarget::png("favicon-16x16.png", 16, false),
            OutputTarget::png("favicon-32x32.png", 32, false),
            OutputTarget::Ico {
                file_name: "favicon.ico".to_string(),
                sizes: vec![16, 32, 48],
            },
        ]
    }

    fn png(file_name: &str, size: u32, in_manifest: bool) -> OutputTarget {
        OutputTarget::Png {
            file_name: file_name.to_string(),
            size,
            in_manifest,
        }
    }

    fn file_name(&self) -> &str {
        match self {
            OutputTarget::Png { file_name, .. } => file_name,
            OutputTarget::Ico { file_name, .. } => file_name,
        }
    }
}

/// Configuration for one generation run.
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Path to the source image.
    pub input: PathBuf,
    /// Directory the icons and manifest are written to; created if missing.
    pub output_dir: PathBuf,
    /// Application name for the manifest.
    pub name: String,
    /// Short name for the manifest; falls back to `name`.
    pub short_name: Option<String>,
    /// Manifest theme color; sampled from the image when not given.
    pub theme_color: Option<String>,
    /// Background color used with [`FitMode::Contain`].
    pub background: String,
    /// Resize strategy.
    pub fit: FitMode,
    /// Mark manifest icons as maskable.
    pub maskable: bool,
    /// Manifest start URL; defaults to `/`.
    pub start_url: Option<String>,
    /// Manifest file name.
    pub manifest_file_name: String,
    /// The files to produce.
    pub targets: Vec<OutputTarget>,
}

impl GenerateOptions {
    /// Options with the default target set, a transparent contain-fit
    /// background, and an empty name.
    pub fn new(
        input: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> GenerateOptions {
        GenerateOptions {
            input: input.into(),
            output_dir: output_dir.into(),
            name: String::new(),
            short_name: None,
            theme_color: None,
            background: "transparent".to_string(),
            fit: FitMode::default(),
            maskable: false,
            start_url: None,
            manifest_file_name: DEFAULT_MANIFEST_FILE_NAME.to_string(),
            targets: OutputTarget::default_set(),
        }
    }
}

/// Name and size on disk of one generated image.
#[derive(Clone, Debug)]
pub struct ImageStat {
    /// Output file name, relative to the output directory.
    pub file_name: String,
    /// Size of the written file, in bytes.
    pub size: u64,
}

/// Summary of a successful generation run.
#[derive(Clone, Debug)]
pub struct Stats {
    /// Generated images, in target order.
    pub images: Vec<ImageStat>,
    /// File name of the generated manifest.
    pub manifest: String,
}

/// Runs a full generation: decodes the input once, writes the manifest and
/// every configured target, and returns per-file stats.  On failure, all
/// files written so far in this run are deleted before the error is
/// returned.
pub fn generate(options: &GenerateOptions) -> Result<Stats> {
    let background = pixel::parse_color(&options.background)?;
    let source = pixel::load_image(&options.input)?;
    fs::create_dir_all(&options.output_dir)?;

    let theme_color = match &options.theme_color {
        Some(color) => normalize_color(color),
        None => pixel::hex_color(pixel::dominant_color(&source)),
    };
    let manifest_sizes: Vec<(String, u32)> = options
        .targets
        .iter()
        .filter_map(|target| match target {
            OutputTarget::Png { file_name, size, in_manifest: true } => {
                Some((file_name.clone(), *size))
            }
            _ => None,
        })
        .collect();
    let manifest = WebManifest::new(
        &options.name,
        options.short_name.as_deref(),
        &theme_color,
        options.start_url.as_deref(),
        options.maskable,
        &manifest_sizes,
    );

    let mut written = Vec::<PathBuf>::new();
    match write_outputs(options, &source, background, &manifest, &mut written)
    {
        Ok(images) => Ok(Stats {
            images,
            manifest: options.manifest_file_name.clone(),
        }),
        Err(error) => {
            warn!(%error, "generation failed, removing partial output");
            cleanup(&written);
            Err(error)
        }
    }
}

fn write_outputs(
    options: &GenerateOptions,
    source: &DynamicImage,
    background: Rgba<u8>,
    manifest: &WebManifest,
    written: &mut Vec<PathBuf>,
) -> Result<Vec<ImageStat>> {
    let manifest_path = options.output_dir.join(&options.manifest_file_name);
    written.push(manifest_path.clone());
    fs::write(&manifest_path, manifest.to_json()?)?;
    debug!(file = %options.manifest_file_name, "wrote manifest");

    let mut images = Vec::<ImageStat>::with_capacity(options.targets.len());
    for target in options.targets.iter() {
        let path = options.output_dir.join(target.file_name());
        written.push(path.clone());
        match target {
            OutputTarget::Png { size, .. } => {
                let square = pixel::render_square(
                    source,
                    *size,
                    options.fit,
                    background,
                );
                DynamicImage::ImageRgba8(square)
                    .save_with_format(&path, ImageFormat::Png)?;
            }
            OutputTarget::Ico { sizes, .. } => {
                let frames: Vec<SourceImage> = sizes
                    .iter()
                    .map(|&size| {
                        let square = pixel::render_square(
                            source,
                            size,
                            options.fit,
                            background,
                        );
                        SourceImage::new(size, size, square.into_raw())
                    })
                    .collect();
                fs::write(&path, ico::encode(&frames)?)?;
            }
        }
        let size = fs::metadata(&path)?.len();
        debug!(file = %target.file_name(), size, "wrote icon");
        images.push(ImageStat {
            file_name: target.file_name().to_string(),
            size,
        });
    }
    Ok(images)
}

/// Options for [`generate_social_image`].
#[derive(Clone, Debug)]
pub struct SocialImageOptions {
    /// Target width, in pixels.
    pub width: u32,
    /// Target height, in pixels.
    pub height: u32,
    /// Resize strategy.
    pub fit: FitMode,
    /// Background color used with [`FitMode::Contain`].
    pub background: String,
}

impl Default for SocialImageOptions {
    fn default() -> SocialImageOptions {
        SocialImageOptions {
            width: 1200,
            height: 628,
            fit: FitMode::default(),
            background: "transparent".to_string(),
        }
    }
}

/// Renders the source image as a social-preview card (1200x628 by default)
/// and writes it to `output` as a lossless WebP.  Returns the size of the
/// written file, in bytes.
pub fn generate_social_image(
    input: &Path,
    output: &Path,
    options: &SocialImageOptions,
) -> Result<u64> {
    let background = pixel::parse_color(&options.background)?;
    let source = pixel::load_image(input)?;
    let card = pixel::render_rect(
        &source,
        options.width,
        options.height,
        options.fit,
        background,
    );
    DynamicImage::ImageRgba8(card)
        .save_with_format(output, ImageFormat::WebP)?;
    let size = fs::metadata(output)?.len();
    debug!(file = %output.display(), size, "wrote social image");
    Ok(size)
}

/// Accept theme colors with or without the leading `#`.
fn normalize_color(color: &str) -> String {
    if color.starts_with('#') {
        color.to_string()
    } else {
        format!("#{}", color)
    }
}

fn cleanup(paths: &[PathBuf]) {
    for path in paths.iter() {
        if let Err(error) = fs::remove_file(path) {
            // The file may simply not have been created yet.
            debug!(path = %path.display(), %error, "cleanup skipped file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GenerateOptions, OutputTarget, SocialImageOptions};
    use crate::pixel::FitMode;

    #[test]
    fn default_target_set_bundles_small_sizes_into_ico() {
        let targets = OutputTarget::default_set();
        let ico = targets
            .iter()
            .find_map(|target| match target {
                OutputTarget::Ico { file_name, sizes } => {
                    Some((file_name.as_str(), sizes.clone()))
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(ico, ("favicon.ico", vec![16, 32, 48]));
    }

    #[test]
    fn social_image_defaults_to_the_open_graph_card_size() {
        let options = SocialImageOptions::default();
        assert_eq!((options.width, options.height), (1200, 628));
        assert_eq!(options.fit, FitMode::Contain);
        assert_eq!(options.background, "transparent");
    }

    #[test]
    fn default_options() {
        let options = GenerateOptions::new("logo.png", "out");
        assert_eq!(options.manifest_file_name, "site.webmanifest");
        assert_eq!(options.background, "transparent");
        assert!(!options.maskable);
        assert_eq!(options.targets.len(), 6);
    }
}
