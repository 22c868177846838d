use embedded_graphics::{
    Pixel,
    pixelcolor::Rgb888,
    prelude::{DrawTarget, OriginDimensions, Size},
};

use crate::{color::Rgb, palette::Palette};

pub const WIDTH: usize = 256;
pub const HEIGHT: usize = 240;
/// Pixels per full frame.
pub const FRAME_PIXELS: usize = WIDTH * HEIGHT;
/// Bytes of packed indices per full frame, two pixels per byte.
pub const PACKED_SIZE: usize = FRAME_PIXELS / 2;

/// Borrowed view over a 32-bit `00:R:G:B` pixel buffer owned by the caller.
///
/// The peripheral scans out whatever the buffer holds; the blit routines
/// overwrite every word they cover and never read previous contents.
pub struct Framebuffer<'a> {
    buffer: &'a mut [u32],
    width: usize,
    height: usize,
}

impl Framebuffer<'_> {
    pub fn new(buffer: &'_ mut [u32], width: usize, height: usize) -> Framebuffer<'_> {
        debug_assert_eq!(buffer.len(), width * height);
        Framebuffer {
            buffer,
            width,
            height,
        }
    }

    /// Decode a packed index stream through `palette` into the buffer.
    ///
    /// One byte in, two words out per iteration, in scan order. Layout was
    /// validated at load time, so the loop itself carries no checks; the
    /// lookup table is nibble-indexed and cannot be overrun.
    pub fn blit_indexed(&mut self, data: &[u8], palette: &Palette) {
        debug_assert_eq!(data.len() * 2, self.buffer.len());
        let table = palette.lookup_table();
        for (pair, &byte) in self.buffer.chunks_exact_mut(2).zip(data) {
            pair[0] = table[(byte >> 4) as usize];
            pair[1] = table[(byte & 0x0F) as usize];
        }
    }

    /// Copy an already-decoded word stream straight into the buffer.
    ///
    /// The identity-palette case of [`Self::blit_indexed`]: same scan order,
    /// one full word per pixel instead of a nibble.
    pub fn blit_direct(&mut self, words: &[u32]) {
        debug_assert_eq!(words.len(), self.buffer.len());
        for (out, &word) in self.buffer.iter_mut().zip(words) {
            *out = word;
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            self.buffer[y * self.width + x] = color.to_word();
        }
    }
}

impl OriginDimensions for Framebuffer<'_> {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for Framebuffer<'_> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0 && coord.y >= 0 {
                self.set_pixel(coord.x as usize, coord.y as usize, Rgb::from(color));
            }
        }
        Ok(())
    }
}
