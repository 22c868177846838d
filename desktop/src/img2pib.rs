use argh::FromArgs;
use log::info;
use nibblit_core::{
    color::Rgb,
    framebuffer::{HEIGHT, WIDTH},
    pack, pib,
    quant::{self, Options},
    raster::Raster,
};

use crate::std_fs::StdFile;

mod std_fs;

#[derive(FromArgs)]
/// Conversion options
struct Args {
    /// input image path
    #[argh(option, short = 'i')]
    input_path: String,

    /// output PIB file path
    #[argh(option, short = 'o')]
    output_path: String,

    /// distribute quantization error to neighboring pixels
    #[argh(switch, short = 'd')]
    dither: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    let mut image = image::open(&args.input_path).expect("Failed to open input image");
    if image.width() as usize != WIDTH || image.height() as usize != HEIGHT {
        info!(
            "resampling {}x{} input to {}x{}",
            image.width(),
            image.height(),
            WIDTH,
            HEIGHT
        );
        image = image.resize_exact(
            WIDTH as u32,
            HEIGHT as u32,
            image::imageops::FilterType::Lanczos3,
        );
    }

    let rgb = image.into_rgb8();
    let pixels: Vec<Rgb> = rgb
        .pixels()
        .map(|pixel| Rgb::new(pixel[0], pixel[1], pixel[2]))
        .collect();
    let raster = Raster::new(&pixels, WIDTH, HEIGHT).expect("Resampled image has invalid shape");

    let quantized = quant::quantize(
        &raster,
        Options {
            dither: args.dither,
            ..Options::default()
        },
    );
    let packed = pack::pack(&quantized.indices, raster.width(), raster.height())
        .expect("Index stream does not match image shape");

    // The whole asset is built in memory first; a failed conversion never
    // leaves a partial file behind.
    let mut out = StdFile::create(&args.output_path).expect("Failed to create output PIB file");
    pib::write(
        &mut out,
        WIDTH as u16,
        HEIGHT as u16,
        &quantized.palette,
        &packed,
    )
    .expect("Failed to write PIB file");

    info!(
        "wrote {}: {} colors, {} packed bytes",
        args.output_path,
        quantized.palette.len(),
        packed.len()
    );
}
