extern crate std;

use alloc::{vec, vec::Vec};
use embedded_io::{Seek, SeekFrom};

use crate::{
    color::Rgb,
    framebuffer::{self, Framebuffer},
    fs,
    pack::{self, pack_pair, unpack_pair},
    palette::{MAX_COLORS, Palette},
    pib::{self, PibError},
    quant::{self, Options},
    raster::{ImageError, Raster},
};

const RED: Rgb = Rgb::new(255, 0, 0);
const GREEN: Rgb = Rgb::new(0, 255, 0);
const BLUE: Rgb = Rgb::new(0, 0, 255);
const WHITE: Rgb = Rgb::new(255, 255, 255);

struct MemFile {
    data: Vec<u8>,
    pos: usize,
}

impl MemFile {
    fn new() -> Self {
        MemFile {
            data: Vec::new(),
            pos: 0,
        }
    }

    fn from_bytes(data: &[u8]) -> Self {
        MemFile {
            data: data.to_vec(),
            pos: 0,
        }
    }
}

impl embedded_io::ErrorType for MemFile {
    type Error = core::convert::Infallible;
}

impl embedded_io::Read for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let available = self.data.len().saturating_sub(self.pos);
        let n = available.min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl embedded_io::Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let end = self.pos + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl embedded_io::Seek for MemFile {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::End(offset) => self.data.len() as i64 + offset,
            SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        self.pos = target.max(0) as usize;
        Ok(self.pos as u64)
    }
}

impl fs::File for MemFile {
    fn size(&self) -> usize {
        self.data.len()
    }
}

/// Full 256x240 frame with far more than 16 distinct colors.
fn gradient_frame() -> Vec<Rgb> {
    let mut pixels = Vec::with_capacity(framebuffer::FRAME_PIXELS);
    for y in 0..framebuffer::HEIGHT {
        for x in 0..framebuffer::WIDTH {
            pixels.push(Rgb::new(x as u8, y as u8, ((x + y) / 2) as u8));
        }
    }
    pixels
}

fn raw_header(width: u16, height: u16, colors: u8) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"PIB\0");
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    data.push(colors);
    data.push(0);
    data
}

#[test]
fn test_pack_pair_round_trips_all_nibbles() {
    for a in 0..16u8 {
        for b in 0..16u8 {
            assert_eq!(unpack_pair(pack_pair(a, b)), (a, b));
        }
    }
}

#[test]
fn test_pack_rejects_bad_shapes() {
    assert!(matches!(pack::pack(&[0; 6], 3, 2), Err(ImageError::OddWidth)));
    assert!(matches!(
        pack::pack(&[], 0, 2),
        Err(ImageError::ZeroDimension)
    ));
    assert!(matches!(
        pack::pack(&[], 2, 0),
        Err(ImageError::ZeroDimension)
    ));
    assert!(matches!(
        pack::pack(&[0; 5], 2, 2),
        Err(ImageError::LengthMismatch)
    ));
    assert!(pack::pack(&[0; 4], 2, 2).is_ok());
}

#[test]
fn test_raster_rejects_bad_shapes() {
    let pixels = [RED; 6];
    assert!(matches!(
        Raster::new(&pixels[..0], 0, 2),
        Err(ImageError::ZeroDimension)
    ));
    assert!(matches!(
        Raster::new(&pixels, 3, 2),
        Err(ImageError::OddWidth)
    ));
    assert!(matches!(
        Raster::new(&pixels[..5], 2, 3),
        Err(ImageError::LengthMismatch)
    ));
    assert!(Raster::new(&pixels, 2, 3).is_ok());
}

#[test]
fn test_two_by_two_quantize_and_pack() {
    let pixels = [RED, RED, GREEN, BLUE];
    let raster = Raster::new(&pixels, 2, 2).unwrap();
    let quantized = quant::quantize(&raster, Options::default());

    assert_eq!(quantized.palette.len(), 3);
    assert_eq!(quantized.palette.color(0), RED);
    assert_eq!(quantized.palette.color(1), GREEN);
    assert_eq!(quantized.palette.color(2), BLUE);
    assert_eq!(quantized.indices, [0, 0, 1, 2]);

    let packed = pack::pack(&quantized.indices, 2, 2).unwrap();
    assert_eq!(packed, [0x00, 0x12]);
}

#[test]
fn test_blit_indexed_decodes_two_by_two() {
    let palette = Palette::from_colors(&[RED, GREEN, BLUE]).unwrap();
    let mut buffer = [0u32; 4];
    let mut framebuffer = Framebuffer::new(&mut buffer, 2, 2);
    framebuffer.blit_indexed(&[0x00, 0x12], &palette);

    assert_eq!(
        buffer,
        [
            RED.to_word(),
            RED.to_word(),
            GREEN.to_word(),
            BLUE.to_word()
        ]
    );
}

#[test]
fn test_palette_never_exceeds_sixteen() {
    let pixels = gradient_frame();
    let raster = Raster::new(&pixels, framebuffer::WIDTH, framebuffer::HEIGHT).unwrap();
    let quantized = quant::quantize(&raster, Options::default());

    assert!(quantized.palette.len() >= 1);
    assert!(quantized.palette.len() <= MAX_COLORS);
    let len = quantized.palette.len() as u8;
    assert!(quantized.indices.iter().all(|&index| index < len));
}

#[test]
fn test_max_colors_is_clamped() {
    let pixels = [RED, RED, GREEN, BLUE];
    let raster = Raster::new(&pixels, 2, 2).unwrap();
    let quantized = quant::quantize(
        &raster,
        Options {
            max_colors: 0,
            dither: false,
        },
    );
    assert_eq!(quantized.palette.len(), 1);
    assert!(quantized.indices.iter().all(|&index| index == 0));
}

#[test]
fn test_dither_changes_only_index_assignment() {
    let pixels = gradient_frame();
    let raster = Raster::new(&pixels, framebuffer::WIDTH, framebuffer::HEIGHT).unwrap();
    let plain = quant::quantize(
        &raster,
        Options {
            max_colors: 8,
            dither: false,
        },
    );
    let dithered = quant::quantize(
        &raster,
        Options {
            max_colors: 8,
            dither: true,
        },
    );

    assert_eq!(plain.palette, dithered.palette);
    let len = dithered.palette.len() as u8;
    assert!(dithered.indices.iter().all(|&index| index < len));
}

#[test]
fn test_asset_output_is_deterministic() {
    for dither in [false, true] {
        let options = Options {
            max_colors: MAX_COLORS,
            dither,
        };
        let mut outputs = Vec::new();
        for _ in 0..2 {
            let pixels = gradient_frame();
            let raster = Raster::new(&pixels, framebuffer::WIDTH, framebuffer::HEIGHT).unwrap();
            let quantized = quant::quantize(&raster, options);
            let packed =
                pack::pack(&quantized.indices, raster.width(), raster.height()).unwrap();
            let mut file = MemFile::new();
            pib::write(&mut file, 256, 240, &quantized.palette, &packed).unwrap();
            outputs.push(file.data);
        }
        assert_eq!(outputs[0], outputs[1]);
    }
}

#[test]
fn test_full_frame_footprint() {
    let pixels = gradient_frame();
    let raster = Raster::new(&pixels, framebuffer::WIDTH, framebuffer::HEIGHT).unwrap();
    let quantized = quant::quantize(&raster, Options::default());
    let packed = pack::pack(&quantized.indices, raster.width(), raster.height()).unwrap();
    assert_eq!(packed.len(), framebuffer::PACKED_SIZE);
    assert_eq!(packed.len(), 30720);
    assert!(quantized.palette.len() * 4 <= 64);

    let mut file = MemFile::new();
    pib::write(&mut file, 256, 240, &quantized.palette, &packed).unwrap();
    assert_eq!(file.data.len(), 10 + 4 * quantized.palette.len() + 30720);
}

#[test]
fn test_round_trip_matches_quantized_approximation() {
    let pixels = gradient_frame();
    let raster = Raster::new(&pixels, framebuffer::WIDTH, framebuffer::HEIGHT).unwrap();
    let quantized = quant::quantize(&raster, Options::default());
    let packed = pack::pack(&quantized.indices, raster.width(), raster.height()).unwrap();

    let mut file = MemFile::new();
    pib::write(&mut file, 256, 240, &quantized.palette, &packed).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let image = pib::parse(&mut file).unwrap();

    assert_eq!(image.width, 256);
    assert_eq!(image.height, 240);
    assert_eq!(image.palette, quantized.palette);
    assert_eq!(&image.data[..], &packed[..]);

    let mut buffer = vec![0u32; framebuffer::FRAME_PIXELS];
    let mut target = Framebuffer::new(&mut buffer, 256, 240);
    target.blit_indexed(&image.data, &image.palette);

    for (word, &index) in buffer.iter().zip(quantized.indices.iter()) {
        assert_eq!(*word, quantized.palette.color(index).to_word());
    }
}

#[test]
fn test_blit_overwrites_every_word() {
    // high byte is never zero, so no decoded pixel can collide with it
    const SENTINEL: u32 = 0xDEAD_BEEF;

    let pixels = gradient_frame();
    let raster = Raster::new(&pixels, framebuffer::WIDTH, framebuffer::HEIGHT).unwrap();
    let quantized = quant::quantize(&raster, Options::default());
    let packed = pack::pack(&quantized.indices, raster.width(), raster.height()).unwrap();

    let mut buffer = vec![SENTINEL; framebuffer::FRAME_PIXELS];
    let mut target = Framebuffer::new(&mut buffer, framebuffer::WIDTH, framebuffer::HEIGHT);
    target.blit_indexed(&packed, &quantized.palette);

    assert!(buffer.iter().all(|&word| word != SENTINEL));
}

#[test]
fn test_blit_direct_copies_words_in_order() {
    let words: Vec<u32> = (0..16u32).map(|i| i * 0x0101_0101).collect();
    let mut buffer = vec![0xDEAD_BEEFu32; 16];
    let mut target = Framebuffer::new(&mut buffer, 4, 4);
    target.blit_direct(&words);
    assert_eq!(buffer, words);
}

#[test]
fn test_nearest_prefers_lowest_index_on_tie() {
    let palette = Palette::from_colors(&[Rgb::new(0, 0, 0), Rgb::new(10, 0, 0)]).unwrap();
    // equidistant between both entries
    assert_eq!(palette.nearest(Rgb::new(5, 0, 0)), 0);
}

#[test]
fn test_lookup_table_pads_with_black() {
    let palette = Palette::from_colors(&[WHITE]).unwrap();
    let table = palette.lookup_table();
    assert_eq!(table[0], WHITE.to_word());
    for entry in &table[1..] {
        assert_eq!(*entry, 0);
    }
}

#[test]
fn test_parse_rejects_bad_magic() {
    let palette = Palette::from_colors(&[RED, GREEN, BLUE]).unwrap();
    let mut file = MemFile::new();
    pib::write(&mut file, 2, 2, &palette, &[0x00, 0x12]).unwrap();
    file.data[0] = b'X';
    file.seek(SeekFrom::Start(0)).unwrap();
    assert!(matches!(
        pib::parse(&mut file),
        Err(PibError::InvalidSignature)
    ));
}

#[test]
fn test_parse_rejects_truncated_payload() {
    let palette = Palette::from_colors(&[RED, GREEN, BLUE]).unwrap();
    let mut file = MemFile::new();
    pib::write(&mut file, 2, 2, &palette, &[0x00, 0x12]).unwrap();
    file.data.pop();
    file.seek(SeekFrom::Start(0)).unwrap();
    assert!(matches!(
        pib::parse(&mut file),
        Err(PibError::LayoutMismatch)
    ));
}

#[test]
fn test_parse_rejects_invalid_headers() {
    for (width, height, colors) in [
        (3u16, 2u16, 1u8),
        (0, 2, 1),
        (2, 0, 1),
        (2, 2, 0),
        (2, 2, 17),
    ] {
        let mut data = raw_header(width, height, colors);
        // plausible payload so only the header is at fault
        let payload = colors as usize * 4 + width as usize * height as usize / 2;
        data.resize(data.len() + payload, 0);
        let mut file = MemFile::from_bytes(&data);
        assert!(matches!(pib::parse(&mut file), Err(PibError::InvalidData)));
    }
}

#[test]
fn test_write_validates_before_output() {
    let palette = Palette::from_colors(&[RED]).unwrap();
    let mut file = MemFile::new();

    // payload too short for the declared dimensions
    assert!(matches!(
        pib::write(&mut file, 2, 2, &palette, &[0x00]),
        Err(PibError::LayoutMismatch)
    ));
    assert!(file.data.is_empty());

    // odd width
    assert!(matches!(
        pib::write(&mut file, 3, 2, &palette, &[0x00, 0x11, 0x22]),
        Err(PibError::InvalidData)
    ));
    assert!(file.data.is_empty());

    // empty palette
    assert!(matches!(
        pib::write(&mut file, 2, 2, &Palette::new(), &[0x00, 0x12]),
        Err(PibError::InvalidData)
    ));
    assert!(file.data.is_empty());
}
