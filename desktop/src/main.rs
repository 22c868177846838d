use argh::FromArgs;
use embedded_graphics::{
    Drawable,
    pixelcolor::Rgb888,
    prelude::{Point, Primitive, RgbColor, Size},
    primitives::{PrimitiveStyle, Rectangle},
};
use log::info;
use nibblit_core::{
    framebuffer::{FRAME_PIXELS, Framebuffer, HEIGHT, WIDTH},
    pib,
};

use crate::std_fs::StdFile;

mod std_fs;

/// Sixteen bar colors for the test card.
const BARS: [Rgb888; 16] = [
    Rgb888::new(0x00, 0x00, 0x00),
    Rgb888::new(0x80, 0x00, 0x00),
    Rgb888::new(0x00, 0x80, 0x00),
    Rgb888::new(0x80, 0x80, 0x00),
    Rgb888::new(0x00, 0x00, 0x80),
    Rgb888::new(0x80, 0x00, 0x80),
    Rgb888::new(0x00, 0x80, 0x80),
    Rgb888::new(0xC0, 0xC0, 0xC0),
    Rgb888::new(0x80, 0x80, 0x80),
    Rgb888::new(0xFF, 0x00, 0x00),
    Rgb888::new(0x00, 0xFF, 0x00),
    Rgb888::new(0xFF, 0xFF, 0x00),
    Rgb888::new(0x00, 0x00, 0xFF),
    Rgb888::new(0xFF, 0x00, 0xFF),
    Rgb888::new(0x00, 0xFF, 0xFF),
    Rgb888::new(0xFF, 0xFF, 0xFF),
];

#[derive(FromArgs)]
/// Viewer options
struct Args {
    /// PIB asset to display; shows the test card when omitted
    #[argh(positional)]
    asset: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    match args.asset {
        Some(path) => view_asset(&path),
        None => view_test_card(),
    }
}

fn view_asset(path: &str) {
    let mut file = StdFile::open(path).expect("Failed to open asset");
    let image = pib::parse(&mut file).expect("Failed to parse asset");
    info!(
        "displaying {}: {}x{}, {} colors",
        path,
        image.width,
        image.height,
        image.palette.len()
    );

    let width = image.width as usize;
    let height = image.height as usize;
    let mut buffer = vec![0u32; image.pixel_count()];
    let mut window = create_window(width, height);

    // Decode into the scanout buffer on every pass, the way the device
    // redraws from the packed asset each frame.
    while window.is_open() && !window.is_key_down(minifb::Key::Escape) {
        let mut framebuffer = Framebuffer::new(&mut buffer, width, height);
        framebuffer.blit_indexed(&image.data, &image.palette);
        window.update_with_buffer(&buffer, width, height).unwrap();
    }
}

fn view_test_card() {
    info!("no asset given, showing test card");

    let source = test_card();
    let mut buffer = vec![0u32; FRAME_PIXELS];
    let mut window = create_window(WIDTH, HEIGHT);

    while window.is_open() && !window.is_key_down(minifb::Key::Escape) {
        let mut framebuffer = Framebuffer::new(&mut buffer, WIDTH, HEIGHT);
        framebuffer.blit_direct(&source);
        window.update_with_buffer(&buffer, WIDTH, HEIGHT).unwrap();
    }
}

/// Sixteen vertical bars over the full frame, plus a white border so the
/// edges of the scanout are visible.
fn test_card() -> Vec<u32> {
    let mut words = vec![0u32; FRAME_PIXELS];
    let mut framebuffer = Framebuffer::new(&mut words, WIDTH, HEIGHT);
    for (i, color) in BARS.iter().enumerate() {
        Rectangle::new(
            Point::new((i * WIDTH / BARS.len()) as i32, 0),
            Size::new((WIDTH / BARS.len()) as u32, HEIGHT as u32),
        )
        .into_styled(PrimitiveStyle::with_fill(*color))
        .draw(&mut framebuffer)
        .unwrap();
    }
    Rectangle::new(Point::new(0, 0), Size::new(WIDTH as u32, HEIGHT as u32))
        .into_styled(PrimitiveStyle::with_stroke(Rgb888::WHITE, 1))
        .draw(&mut framebuffer)
        .unwrap();
    words
}

fn create_window(width: usize, height: usize) -> minifb::Window {
    let options = minifb::WindowOptions {
        borderless: false,
        title: true,
        resize: true,
        scale: minifb::Scale::X2,
        ..minifb::WindowOptions::default()
    };
    let mut window =
        minifb::Window::new("Nibblit Viewer", width, height, options).unwrap_or_else(|e| {
            panic!("Unable to open window: {}", e);
        });

    window.set_target_fps(60);
    window
}
