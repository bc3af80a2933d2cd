//! Decoding and resizing glue over the `image` crate: square rendering with
//! a fit policy, color parsing, and dominant-color sampling for the manifest
//! theme color.

use crate::error::{Error, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use std::collections::BTreeMap;
use std::path::Path;

/// How to map a non-square source onto a square target.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FitMode {
    /// Scale to fit inside the square, centered on the background color.
    #[default]
    Contain,
    /// Scale to cover the square, cropping the overflow.
    Cover,
    /// Stretch to the square, ignoring aspect ratio.
    Fill,
}

/// Decodes the image at `path`.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    Ok(image::open(path)?)
}

/// Renders `image` into a `size` x `size` RGBA buffer according to `fit`.
/// The background color only matters for [`FitMode::Contain`], which
/// letterboxes the scaled image onto a filled canvas.
pub fn render_square(
    image: &DynamicImage,
    size: u32,
    fit: FitMode,
    background: Rgba<u8>,
) -> RgbaImage {
    render_rect(image, size, size, fit, background)
}

/// Renders `image` into a `width` x `height` RGBA buffer according to
/// `fit`; the rectangular form behind [`render_square`], also used for
/// social-preview images.
pub fn render_rect(
    image: &DynamicImage,
    width: u32,
    height: u32,
    fit: FitMode,
    background: Rgba<u8>,
) -> RgbaImage {
    match fit {
        FitMode::Fill => image
            .resize_exact(width, height, FilterType::Lanczos3)
            .to_rgba8(),
        FitMode::Cover => image
            .resize_to_fill(width, height, FilterType::Lanczos3)
            .to_rgba8(),
        FitMode::Contain => {
            let scaled =
                image.resize(width, height, FilterType::Lanczos3).to_rgba8();
            let mut canvas =
                RgbaImage::from_pixel(width, height, background);
            let x = ((width - scaled.width()) / 2) as i64;
            let y = ((height - scaled.height()) / 2) as i64;
            imageops::overlay(&mut canvas, &scaled, x, y);
            canvas
        }
    }
}

/// Parses a background/theme color: `"transparent"`, `#rgb`, `#rrggbb` or
/// `#rrggbbaa`, with the leading `#` optional.
pub fn parse_color(value: &str) -> Result<Rgba<u8>> {
    if value.eq_ignore_ascii_case("transparent") {
        return Ok(Rgba([0, 0, 0, 0]));
    }
    let hex = value.strip_prefix('#').unwrap_or(value);
    let invalid = || Error::InvalidColor(value.to_string());
    let nibble = |index: usize| -> Result<u8> {
        hex.as_bytes()
            .get(index)
            .and_then(|&b| (b as char).to_digit(16))
            .map(|digit| digit as u8)
            .ok_or_else(invalid)
    };
    let byte = |index: usize| -> Result<u8> {
        u8::from_str_radix(hex.get(index..index + 2).ok_or_else(invalid)?, 16)
            .map_err(|_| invalid())
    };
    match hex.len() {
        3 => {
            let (r, g, b) = (nibble(0)?, nibble(1)?, nibble(2)?);
            Ok(Rgba([r << 4 | r, g << 4 | g, b << 4 | b, 255]))
        }
        6 => Ok(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Ok(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => Err(invalid()),
    }
}

/// Picks a representative color from the image: opaque-ish pixels are
/// bucketed at 4 bits per channel, and the most populated bucket's average
/// wins.  Fully transparent images fall back to black.  Deterministic for a
/// given input (ties break toward the lowest bucket).
pub fn dominant_color(image: &DynamicImage) -> (u8, u8, u8) {
    let rgba = image.to_rgba8();
    let mut buckets =
        BTreeMap::<(u8, u8, u8), (u64, u64, u64, u64)>::new();
    for pixel in rgba.pixels() {
        let Rgba([r, g, b, a]) = *pixel;
        if a == 0 {
            continue;
        }
        let entry = buckets
            .entry((r >> 4, g >> 4, b >> 4))
            .or_insert((0, 0, 0, 0));
        entry.0 += 1;
        entry.1 += r as u64;
        entry.2 += g as u64;
        entry.3 += b as u64;
    }
    let mut best: Option<(u64, u64, u64, u64)> = None;
    for &(count, r, g, b) in buckets.values() {
        if best.map_or(true, |(best_count, ..)| count > best_count) {
            best = Some((count, r, g, b));
        }
    }
    match best {
        Some((count, r, g, b)) => {
            ((r / count) as u8, (g / count) as u8, (b / count) as u8)
        }
        None => (0, 0, 0),
    }
}

/// Formats an RGB triple as a `#rrggbb` hex string.
pub fn hex_color((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_color_forms() {
        assert_eq!(parse_color("transparent").unwrap(), Rgba([0, 0, 0, 0]));
        assert_eq!(parse_color("#1a2b3c").unwrap(), Rgba([26, 43, 60, 255]));
        assert_eq!(parse_color("1a2b3c").unwrap(), Rgba([26, 43, 60, 255]));
        assert_eq!(parse_color("#f0a").unwrap(), Rgba([255, 0, 170, 255]));
        assert_eq!(
            parse_color("#11223380").unwrap(),
            Rgba([17, 34, 51, 128])
        );
    }

    #[test]
    fn parse_color_rejects_garbage() {
        assert!(parse_color("").is_err());
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#zzzzzz").is_err());
        assert!(parse_color("blue").is_err());
    }

    #[test]
    fn hex_color_is_zero_padded() {
        assert_eq!(hex_color((1, 2, 3)), "#010203");
        assert_eq!(hex_color((255, 0, 128)), "#ff0080");
    }

    #[test]
    fn contain_letterboxes_onto_background() {
        // A 2x1 source scaled into a 4x4 square covers only the middle
        // rows; the top and bottom rows must be pure background.
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2,
            1,
            Rgba([255, 0, 0, 255]),
        ));
        let background = Rgba([0, 0, 255, 255]);
        let square =
            render_square(&source, 4, FitMode::Contain, background);
        assert_eq!(square.dimensions(), (4, 4));
        for x in 0..4 {
            assert_eq!(*square.get_pixel(x, 0), background);
            assert_eq!(*square.get_pixel(x, 3), background);
        }
    }

    #[test]
    fn fill_and_cover_produce_exact_squares() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            6,
            3,
            Rgba([0, 255, 0, 255]),
        ));
        for fit in [FitMode::Fill, FitMode::Cover] {
            let square =
                render_square(&source, 8, fit, Rgba([0, 0, 0, 0]));
            assert_eq!(square.dimensions(), (8, 8));
        }
    }

    #[test]
    fn rect_contain_pads_the_short_axis() {
        // A square source scaled into a wide rectangle leaves background
        // columns on the left and right.
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2,
            2,
            Rgba([255, 0, 0, 255]),
        ));
        let background = Rgba([0, 255, 0, 255]);
        let rect =
            render_rect(&source, 8, 4, FitMode::Contain, background);
        assert_eq!(rect.dimensions(), (8, 4));
        for y in 0..4 {
            assert_eq!(*rect.get_pixel(0, y), background);
            assert_eq!(*rect.get_pixel(7, y), background);
        }
    }

    #[test]
    fn dominant_color_picks_most_common_bucket() {
        let mut image = RgbaImage::from_pixel(3, 1, Rgba([200, 10, 10, 255]));
        image.put_pixel(2, 0, Rgba([10, 200, 10, 255]));
        let dominant = dominant_color(&DynamicImage::ImageRgba8(image));
        assert_eq!(dominant, (200, 10, 10));
    }

    #[test]
    fn dominant_color_ignores_transparent_pixels() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([50, 60, 70, 0]));
        image.put_pixel(1, 0, Rgba([1, 2, 3, 255]));
        let dominant = dominant_color(&DynamicImage::ImageRgba8(image));
        assert_eq!(dominant, (1, 2, 3));
    }
}
