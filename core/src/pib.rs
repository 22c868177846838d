use alloc::{boxed::Box, vec};
use log::info;
use zerocopy::{FromBytes, IntoBytes};

use crate::{
    color::Rgb,
    fs::File,
    palette::{MAX_COLORS, Palette},
};

const PIB_MAGIC: &[u8; 4] = b"PIB\0";

/// On-disk header of a packed indexed bitmap.
///
/// Multi-byte fields are little-endian. The payload follows directly:
/// `colors` palette words of four bytes each, then `width * height / 2`
/// packed index bytes.
#[repr(C)]
#[derive(Clone, Copy, zerocopy::FromBytes, zerocopy::IntoBytes, zerocopy::Immutable)]
pub struct Header {
    pub magic: [u8; 4],
    pub width: u16,
    pub height: u16,
    pub colors: u8,
    pub reserved: u8,
}

impl Header {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size of the packed index payload, two pixels per byte.
    pub fn data_size(&self) -> usize {
        self.pixel_count() / 2
    }

    pub fn palette_size(&self) -> usize {
        self.colors as usize * 4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PibError {
    IoError(embedded_io::ErrorKind),
    InvalidSignature,
    InvalidData,
    /// Declared dimensions and actual payload size disagree.
    LayoutMismatch,
}

impl PibError {
    fn from_io_error(error: impl embedded_io::Error) -> Self {
        PibError::IoError(error.kind())
    }

    fn from_read_exact_error<E: embedded_io::Error>(error: embedded_io::ReadExactError<E>) -> Self {
        match error {
            embedded_io::ReadExactError::UnexpectedEof => PibError::LayoutMismatch,
            embedded_io::ReadExactError::Other(e) => PibError::from_io_error(e),
        }
    }
}

type Result<T> = core::result::Result<T, PibError>;

/// A loaded asset: palette plus packed payload, ready for
/// [`crate::framebuffer::Framebuffer::blit_indexed`].
pub struct PibImage {
    pub width: u16,
    pub height: u16,
    pub palette: Palette,
    pub data: Box<[u8]>,
}

impl PibImage {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Parse a full asset from `file`.
///
/// Every load-time precondition is checked here so the decode loop does not
/// have to: magic, even non-zero dimensions, palette bound, and the exact
/// file size the header implies.
pub fn parse(file: &mut impl File) -> Result<PibImage> {
    let mut header_bytes = [0u8; core::mem::size_of::<Header>()];
    file.read_exact(&mut header_bytes)
        .map_err(PibError::from_read_exact_error)?;
    let header = Header::read_from_bytes(&header_bytes).unwrap();

    if &header.magic != PIB_MAGIC {
        return Err(PibError::InvalidSignature);
    }
    if header.width == 0 || header.height == 0 || header.width % 2 != 0 {
        return Err(PibError::InvalidData);
    }
    if header.colors == 0 || header.colors as usize > MAX_COLORS {
        return Err(PibError::InvalidData);
    }
    let expected = core::mem::size_of::<Header>() + header.palette_size() + header.data_size();
    if file.size() != expected {
        return Err(PibError::LayoutMismatch);
    }

    let mut palette = Palette::new();
    let mut word = [0u8; 4];
    for _ in 0..header.colors {
        file.read_exact(&mut word)
            .map_err(PibError::from_read_exact_error)?;
        palette.push(Rgb::from_word(u32::from_le_bytes(word)));
    }

    let mut data = vec![0u8; header.data_size()].into_boxed_slice();
    file.read_exact(&mut data)
        .map_err(PibError::from_read_exact_error)?;

    info!(
        "parsed PIB asset: {}x{}, {} colors",
        header.width, header.height, header.colors
    );

    Ok(PibImage {
        width: header.width,
        height: header.height,
        palette,
        data,
    })
}

/// Write a complete asset to `file`.
///
/// All arguments are validated before the first byte goes out, so a failed
/// call never leaves a partial header behind.
pub fn write(
    file: &mut impl File,
    width: u16,
    height: u16,
    palette: &Palette,
    data: &[u8],
) -> Result<()> {
    if width == 0 || height == 0 || width % 2 != 0 {
        return Err(PibError::InvalidData);
    }
    if palette.is_empty() {
        return Err(PibError::InvalidData);
    }
    if data.len() != width as usize * height as usize / 2 {
        return Err(PibError::LayoutMismatch);
    }

    let header = Header {
        magic: *PIB_MAGIC,
        width,
        height,
        colors: palette.len() as u8,
        reserved: 0,
    };
    file.write_all(header.as_bytes())
        .map_err(PibError::from_io_error)?;
    for color in palette.iter() {
        file.write_all(&color.to_word().to_le_bytes())
            .map_err(PibError::from_io_error)?;
    }
    file.write_all(data).map_err(PibError::from_io_error)?;

    Ok(())
}
