use embedded_graphics::{pixelcolor::Rgb888, prelude::RgbColor};

/// 8-bit-per-channel RGB color.
///
/// The hardware-native encoding is a 32-bit word with the high byte zero
/// and the channels packed as `00:R:G:B`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into the `00:R:G:B` framebuffer word.
    pub const fn to_word(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub const fn from_word(word: u32) -> Self {
        Self {
            r: (word >> 16) as u8,
            g: (word >> 8) as u8,
            b: word as u8,
        }
    }

    /// Squared euclidean distance in RGB space.
    pub fn distance_sq(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl From<Rgb888> for Rgb {
    fn from(color: Rgb888) -> Self {
        Self::new(color.r(), color.g(), color.b())
    }
}

impl From<Rgb> for Rgb888 {
    fn from(color: Rgb) -> Self {
        Self::new(color.r, color.g, color.b)
    }
}
