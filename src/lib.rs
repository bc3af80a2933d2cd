//! Generates a favicon set and a web application manifest from a single
//! source image.
//!
//! The interesting part lives in the [`ico`] module: a from-scratch encoder
//! for the legacy multi-resolution Windows icon container, with its
//! bottom-up rows, BGRA color plane, bit-packed AND mask and 256-as-zero
//! dimension sentinel.  Everything else (decoding, resizing, PNG output,
//! the manifest document, the CLI) is orchestration over the `image` crate.

#![warn(missing_docs)]

pub mod builder;
pub mod error;
pub mod ico;
pub mod manifest;
pub mod pixel;

pub use crate::builder::{
    generate, generate_social_image, GenerateOptions, ImageStat,
    OutputTarget, SocialImageOptions, Stats,
};
pub use crate::error::{Error, Result};
pub use crate::ico::{encode, EncodeError, SourceImage};
