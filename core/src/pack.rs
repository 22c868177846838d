use alloc::vec::Vec;

use crate::raster::ImageError;

/// Combine two 4-bit indices into one byte: even column high, odd column low.
pub const fn pack_pair(even: u8, odd: u8) -> u8 {
    (even << 4) | (odd & 0x0F)
}

/// Split a packed byte back into `(even, odd)` indices.
pub const fn unpack_pair(byte: u8) -> (u8, u8) {
    (byte >> 4, byte & 0x0F)
}

/// Pack a row-major index stream, two pixels per byte.
///
/// Column pairs `(2k, 2k+1)` share a byte; an odd width would leave a
/// dangling pixel per row, so it is rejected instead of silently dropped
/// or duplicated.
pub fn pack(indices: &[u8], width: usize, height: usize) -> Result<Vec<u8>, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::ZeroDimension);
    }
    if width % 2 != 0 {
        return Err(ImageError::OddWidth);
    }
    if indices.len() != width * height {
        return Err(ImageError::LengthMismatch);
    }

    // With an even width every row boundary falls between pairs, so pairing
    // the flat stream is the same as pairing each row.
    let packed = indices
        .chunks_exact(2)
        .map(|pair| {
            debug_assert!(pair[0] < 16 && pair[1] < 16);
            pack_pair(pair[0], pair[1])
        })
        .collect();
    Ok(packed)
}
