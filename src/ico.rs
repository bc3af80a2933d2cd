//! The legacy Windows icon container encoder: serializes already-resized
//! RGBA buffers into a single ICO file.  The format's quirks are load
//! bearing and preserved exactly: bottom-up row order, BGRA pixel order,
//! a bit-packed AND mask with rows padded to 4-byte boundaries, and a
//! zero byte standing for the dimension 256 in the directory.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};
use thiserror::Error;

//===========================================================================//

// Fixed sizes of the container structures, in bytes.
const FILE_HEADER_LEN: usize = 6;
const DIR_ENTRY_LEN: usize = 16;
const BMP_HEADER_LEN: usize = 40;

// The ICONDIR resource type for plain icons (2 would be a cursor).
const RES_TYPE_ICON: u16 = 1;

// Size limits for images in an ICO file.  The directory stores each
// dimension in a single byte, with zero standing for 256.
const MIN_DIMENSION: u32 = 1;
const MAX_DIMENSION: u32 = 256;

const BITS_PER_PIXEL: u16 = 32;

//===========================================================================//

/// An error produced when the encoder's input violates its contract.  All
/// validation happens before any output is written; a failed call never
/// produces a partial container.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The image list was empty.
    #[error("no images to encode")]
    EmptyImageList,
    /// Too many images to fit the directory's 16-bit entry count.
    #[error("too many images (was {count}, but max is {max})", max = u16::MAX)]
    TooManyImages {
        /// Number of images supplied.
        count: usize,
    },
    /// An image's width or height was outside `[1, 256]`.
    #[error(
        "image {index}: dimensions {width}x{height} out of range \
         (each must be in 1..=256)"
    )]
    DimensionOutOfRange {
        /// Index of the offending image in the input sequence.
        index: usize,
        /// Declared width, in pixels.
        width: u32,
        /// Declared height, in pixels.
        height: u32,
    },
    /// An image's pixel buffer didn't match its declared dimensions.
    #[error(
        "image {index}: pixel buffer has {actual} bytes, \
         but must have {expected} for a {width}x{height} image"
    )]
    PixelBufferMismatch {
        /// Index of the offending image in the input sequence.
        index: usize,
        /// Declared width, in pixels.
        width: u32,
        /// Declared height, in pixels.
        height: u32,
        /// Required buffer length (`width * height * 4`).
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },
    /// The underlying writer failed.  Never produced by [`encode`], which
    /// writes into an in-memory buffer.
    #[error(transparent)]
    Io(#[from] io::Error),
}

//===========================================================================//

/// One decoded, already-resized icon candidate: RGBA pixels in row-major
/// order from the top row down, exactly `width * height * 4` bytes.
///
/// Constructing a `SourceImage` performs no validation; [`encode`] and
/// [`write`] check every image up front and report the index of the first
/// one that violates the contract.
#[derive(Clone, Debug)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba_data: Vec<u8>,
}

impl SourceImage {
    /// Creates a new source image from raw RGBA data.
    pub fn new(width: u32, height: u32, rgba_data: Vec<u8>) -> SourceImage {
        SourceImage { width, height, rgba_data }
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the RGBA data for this image, in row-major order from top to
    /// bottom.
    pub fn rgba_data(&self) -> &[u8] {
        &self.rgba_data
    }

    fn validate(&self, index: usize) -> Result<(), EncodeError> {
        if self.width < MIN_DIMENSION
            || self.width > MAX_DIMENSION
            || self.height < MIN_DIMENSION
            || self.height > MAX_DIMENSION
        {
            return Err(EncodeError::DimensionOutOfRange {
                index,
                width: self.width,
                height: self.height,
            });
        }
        let expected = (self.width as usize) * (self.height as usize) * 4;
        if self.rgba_data.len() != expected {
            return Err(EncodeError::PixelBufferMismatch {
                index,
                width: self.width,
                height: self.height,
                expected,
                actual: self.rgba_data.len(),
            });
        }
        Ok(())
    }

    /// Length of one bit-packed mask row, padded up to a 4-byte boundary.
    fn mask_row_len(&self) -> usize {
        let row_data_len = (self.width as usize + 7) / 8;
        ((row_data_len + 3) / 4) * 4
    }

    /// Total length of this image's block: BITMAPINFOHEADER plus XOR color
    /// plane plus AND mask plane.  No padding is needed for the color rows,
    /// since `width * 4` is always a multiple of 4.
    fn block_len(&self) -> usize {
        let color_plane = (self.width as usize) * 4 * (self.height as usize);
        let mask_plane = self.mask_row_len() * (self.height as usize);
        BMP_HEADER_LEN + color_plane + mask_plane
    }

    fn write_block<W: Write>(&self, mut writer: W) -> io::Result<()> {
        // Write the BITMAPINFOHEADER struct.  The height field records the
        // actual image height; the mask plane is a separate plane following
        // the color data, and the directory's dataSize is computed to match.
        writer.write_u32::<LittleEndian>(BMP_HEADER_LEN as u32)?;
        writer.write_i32::<LittleEndian>(self.width as i32)?;
        writer.write_i32::<LittleEndian>(self.height as i32)?;
        writer.write_u16::<LittleEndian>(1)?; // planes
        writer.write_u16::<LittleEndian>(BITS_PER_PIXEL)?;
        writer.write_u32::<LittleEndian>(0)?; // compression
        writer.write_u32::<LittleEndian>(0)?; // image size
        writer.write_i32::<LittleEndian>(0)?; // horz ppm
        writer.write_i32::<LittleEndian>(0)?; // vert ppm
        writer.write_u32::<LittleEndian>(0)?; // colors used
        writer.write_u32::<LittleEndian>(0)?; // colors important

        // Write the XOR color plane, row by row starting from the *bottom*
        // row, with each pixel's channels swapped from RGBA to BGRA:
        let width = self.width as usize;
        for row in (0..self.height as usize).rev() {
            let row_start = row * width * 4;
            for col in 0..width {
                let start = row_start + col * 4;
                writer.write_u8(self.rgba_data[start + 2])?; // blue
                writer.write_u8(self.rgba_data[start + 1])?; // green
                writer.write_u8(self.rgba_data[start])?; // red
                writer.write_u8(self.rgba_data[start + 3])?; // alpha
            }
        }

        // Write the AND mask plane (1 bit per pixel, rows padded to a
        // multiple of four bytes).  Transparency is carried by the color
        // plane's alpha channel, so every mask bit is left clear; the mask
        // exists only for consumers that predate alpha icons.
        let mask_row = vec![0u8; self.mask_row_len()];
        for _ in 0..self.height {
            writer.write_all(&mask_row)?;
        }
        Ok(())
    }
}

//===========================================================================//

/// Serializes the given images into a single ICO container, in input order.
///
/// The output is a deterministic function of the input: the same image
/// sequence always encodes to byte-identical output, with all pad bytes
/// zero.  Returns an [`EncodeError`] (and produces nothing) if the input
/// list is empty or any image has out-of-range dimensions or a pixel buffer
/// that doesn't match its declared size.
pub fn encode(images: &[SourceImage]) -> Result<Vec<u8>, EncodeError> {
    validate(images)?;
    let total_len = FILE_HEADER_LEN
        + DIR_ENTRY_LEN * images.len()
        + images.iter().map(SourceImage::block_len).sum::<usize>();
    let mut buffer = Vec::<u8>::with_capacity(total_len);
    write_validated(images, &mut buffer)?;
    debug_assert_eq!(buffer.len(), total_len);
    Ok(buffer)
}

/// Like [`encode`], but streams the container into `writer` instead of
/// returning a buffer.  Validation still happens before the first byte is
/// written, but a failure of the writer itself can leave partial output
/// behind.
pub fn write<W: Write>(
    images: &[SourceImage],
    writer: W,
) -> Result<(), EncodeError> {
    validate(images)?;
    write_validated(images, writer)
}

fn validate(images: &[SourceImage]) -> Result<(), EncodeError> {
    if images.is_empty() {
        return Err(EncodeError::EmptyImageList);
    }
    if images.len() > (u16::MAX as usize) {
        return Err(EncodeError::TooManyImages { count: images.len() });
    }
    for (index, image) in images.iter().enumerate() {
        image.validate(index)?;
    }
    Ok(())
}

fn write_validated<W: Write>(
    images: &[SourceImage],
    mut writer: W,
) -> Result<(), EncodeError> {
    writer.write_u16::<LittleEndian>(0)?; // reserved
    writer.write_u16::<LittleEndian>(RES_TYPE_ICON)?;
    writer.write_u16::<LittleEndian>(images.len() as u16)?;
    let mut data_offset =
        (FILE_HEADER_LEN + DIR_ENTRY_LEN * images.len()) as u32;
    for image in images.iter() {
        // A width/height byte of zero stands for a dimension of 256.
        writer.write_u8(dimension_byte(image.width))?;
        writer.write_u8(dimension_byte(image.height))?;
        writer.write_u8(0)?; // color count
        writer.write_u8(0)?; // reserved
        writer.write_u16::<LittleEndian>(1)?; // color planes
        writer.write_u16::<LittleEndian>(BITS_PER_PIXEL)?;
        let data_size = image.block_len() as u32;
        writer.write_u32::<LittleEndian>(data_size)?;
        writer.write_u32::<LittleEndian>(data_offset)?;
        data_offset += data_size;
    }
    for image in images.iter() {
        image.write_block(&mut writer)?;
    }
    Ok(())
}

fn dimension_byte(dimension: u32) -> u8 {
    if dimension >= 256 {
        0
    } else {
        dimension as u8
    }
}

//===========================================================================//


//===========================================================================//
