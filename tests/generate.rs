use favgen::{
    generate, generate_social_image, Error, GenerateOptions,
    SocialImageOptions,
};
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

//===========================================================================//

const DEFAULT_FILES: &[&str] = &[
    "android-chrome-192x192.png",
    "android-chrome-512x512.png",
    "apple-touch-icon.png",
    "favicon-16x16.png",
    "favicon-32x32.png",
    "favicon.ico",
    "site.webmanifest",
];

fn write_source_png(dir: &Path) -> PathBuf {
    let path = dir.join("logo.png");
    let image = RgbaImage::from_pixel(64, 64, Rgba([255, 0, 0, 255]));
    image.save(&path).unwrap();
    path
}

//===========================================================================//

#[test]
fn generate_produces_the_default_set() {
    let dir = tempdir().unwrap();
    let input = write_source_png(dir.path());
    let out_dir = dir.path().join("icons");
    let mut options = GenerateOptions::new(&input, &out_dir);
    options.name = "Test App".to_string();

    let stats = generate(&options).unwrap();
    assert_eq!(stats.manifest, "site.webmanifest");
    assert_eq!(stats.images.len(), 6);
    for file in DEFAULT_FILES.iter() {
        assert!(out_dir.join(file).exists(), "missing {}", file);
    }
    for image in stats.images.iter() {
        assert!(image.size > 0);
        assert_eq!(
            image.size,
            fs::metadata(out_dir.join(&image.file_name)).unwrap().len()
        );
    }

    // The ICO bundle holds the three classic sizes.
    let ico = fs::read(out_dir.join("favicon.ico")).unwrap();
    assert_eq!(&ico[..6], b"\x00\x00\x01\x00\x03\x00");
    assert_eq!((ico[6], ico[7]), (16, 16));
}

#[test]
fn manifest_theme_color_is_sampled_from_the_image() {
    let dir = tempdir().unwrap();
    let input = write_source_png(dir.path());
    let out_dir = dir.path().join("icons");
    let mut options = GenerateOptions::new(&input, &out_dir);
    options.name = "Red App".to_string();

    generate(&options).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out_dir.join("site.webmanifest")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["name"], "Red App");
    assert_eq!(manifest["theme_color"], "#ff0000");
    assert_eq!(manifest["background_color"], "#ff0000");
    assert_eq!(manifest["icons"].as_array().unwrap().len(), 2);
}

#[test]
fn explicit_theme_color_gets_a_hash_prefix() {
    let dir = tempdir().unwrap();
    let input = write_source_png(dir.path());
    let out_dir = dir.path().join("icons");
    let mut options = GenerateOptions::new(&input, &out_dir);
    options.theme_color = Some("abc123".to_string());

    generate(&options).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out_dir.join("site.webmanifest")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["theme_color"], "#abc123");
}

#[test]
fn missing_input_fails_before_touching_the_output_dir() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("icons");
    let options =
        GenerateOptions::new(dir.path().join("nope.png"), &out_dir);
    match generate(&options) {
        Err(Error::InputNotFound(path)) => {
            assert!(path.ends_with("nope.png"));
        }
        result => panic!("unexpected result: {:?}", result.map(|_| ())),
    }
    assert!(!out_dir.exists());
}

#[test]
fn social_image_is_rendered_at_the_requested_size() {
    let dir = tempdir().unwrap();
    let input = write_source_png(dir.path());
    let output = dir.path().join("social.webp");
    let options = SocialImageOptions {
        width: 60,
        height: 30,
        ..SocialImageOptions::default()
    };

    let size = generate_social_image(&input, &output, &options).unwrap();
    assert_eq!(size, fs::metadata(&output).unwrap().len());
    let card = image::open(&output).unwrap();
    assert_eq!((card.width(), card.height()), (60, 30));
}

#[test]
fn social_image_fails_on_missing_input() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("social.webp");
    let result = generate_social_image(
        &dir.path().join("nope.png"),
        &output,
        &SocialImageOptions::default(),
    );
    assert!(matches!(result, Err(Error::InputNotFound(_))));
    assert!(!output.exists());
}

#[test]
fn failed_run_removes_already_written_files() {
    let dir = tempdir().unwrap();
    let input = write_source_png(dir.path());
    let out_dir = dir.path().join("icons");
    // A directory squatting on one of the target names makes that write
    // fail after earlier targets have already been written.
    fs::create_dir_all(out_dir.join("apple-touch-icon.png")).unwrap();
    let options = GenerateOptions::new(&input, &out_dir);

    assert!(generate(&options).is_err());
    let leftovers: Vec<String> = fs::read_dir(&out_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    // Only the planted directory survives; the manifest and the icons
    // written before the failure are gone.
    assert_eq!(leftovers, vec!["apple-touch-icon.png".to_string()]);
}

//===========================================================================//
