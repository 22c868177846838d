use crate::color::Rgb;

/// Why a source image was rejected before quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageError {
    /// Width or height is zero.
    ZeroDimension,
    /// Packing pairs columns, so the width must be even.
    OddWidth,
    /// Pixel count does not match `width * height`.
    LengthMismatch,
}

/// Borrowed view of a full-color source image, validated on construction.
///
/// Holding a `Raster` means the geometry already satisfies the packing
/// contract: nonzero dimensions, even width, `width * height` pixels.
#[derive(Clone, Copy)]
pub struct Raster<'a> {
    pixels: &'a [Rgb],
    width: usize,
    height: usize,
}

impl<'a> Raster<'a> {
    pub fn new(pixels: &'a [Rgb], width: usize, height: usize) -> Result<Raster<'a>, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::ZeroDimension);
        }
        if width % 2 != 0 {
            return Err(ImageError::OddWidth);
        }
        if pixels.len() != width * height {
            return Err(ImageError::LengthMismatch);
        }
        Ok(Raster { pixels, width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &'a [Rgb] {
        self.pixels
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [Rgb]> {
        self.pixels.chunks_exact(self.width)
    }
}
