//! Decoded icon pixels.
//!
//! An [`IconImage`] is an immutable RGBA8 buffer with straight (not
//! premultiplied) alpha. Rows are stored top to bottom. The pipeline shares a
//! decoded image between its cache and every future that asked for it through
//! an `Arc<IconImage>`, so nothing is copied after decoding.

use crate::error::{IconError, IconResult};

/// Bytes per RGBA8 pixel.
const BYTES_PER_PIXEL: usize = 4;

/// A decoded icon bitmap.
#[derive(Clone, PartialEq, Eq)]
pub struct IconImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl IconImage {
    /// Create an image from straight-alpha RGBA8 pixels.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::InvalidDimensions`] if either dimension is zero and
    /// [`IconError::BufferSize`] if `pixels` is not exactly
    /// `width * height * 4` bytes long.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> IconResult<Self> {
        if width == 0 || height == 0 {
            return Err(IconError::InvalidDimensions { width, height });
        }
        let expected = expected_len(width, height)
            .ok_or(IconError::InvalidDimensions { width, height })?;
        if pixels.len() != expected {
            return Err(IconError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create an image from an `image` crate RGBA buffer.
    pub fn from_rgba_image(rgba: image::RgbaImage) -> IconResult<Self> {
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }

    /// Create an image filled with a single RGBA color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> IconResult<Self> {
        let len = expected_len(width, height)
            .ok_or(IconError::InvalidDimensions { width, height })?;
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(len)
            .collect::<Vec<_>>();
        Self::from_rgba(width, height, pixels)
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get `(width, height)`.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA8 pixel data, row-major from the top-left.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Get the RGBA value at `(x, y)`, or `None` if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = self.pixels.get(offset..offset + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Memory used by the pixel data in bytes.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.pixels.len()
    }
}

impl std::fmt::Debug for IconImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

fn expected_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}
