use alloc::{
    collections::btree_map::{BTreeMap, Entry},
    vec,
    vec::Vec,
};
use log::info;

use crate::{
    color::Rgb,
    palette::{MAX_COLORS, Palette},
    raster::Raster,
};

/// Quantizer configuration.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Target palette size, clamped to `1..=16`.
    pub max_colors: usize,
    /// Distribute quantization error to neighboring pixels instead of
    /// letting gradients collapse into flat bands.
    pub dither: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_colors: MAX_COLORS,
            dither: false,
        }
    }
}

/// Output of a quantization pass: the chosen palette and one palette index
/// per source pixel, row-major.
#[derive(Debug)]
pub struct Quantized {
    pub palette: Palette,
    pub indices: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// One distinct source color and how often it occurs.
#[derive(Clone, Copy)]
struct Swatch {
    color: Rgb,
    count: u32,
}

/// Reduce `raster` to at most `options.max_colors` representative colors.
///
/// Deterministic: identical input and options always yield identical
/// palettes and indices. Images with no more distinct colors than the
/// target keep them all, in first-appearance order.
pub fn quantize(raster: &Raster<'_>, options: Options) -> Quantized {
    let target = options.max_colors.clamp(1, MAX_COLORS);

    let swatches = histogram(raster);
    let palette = if swatches.len() <= target {
        exact_palette(&swatches)
    } else {
        median_cut(swatches, target)
    };

    let indices = if options.dither {
        diffuse_map(raster, &palette)
    } else {
        nearest_map(raster, &palette)
    };

    info!(
        "quantized {}x{} image to {} colors (dither: {})",
        raster.width(),
        raster.height(),
        palette.len(),
        options.dither
    );

    Quantized {
        palette,
        indices,
        width: raster.width(),
        height: raster.height(),
    }
}

/// Distinct colors in first-appearance order, with occurrence counts.
fn histogram(raster: &Raster<'_>) -> Vec<Swatch> {
    let mut slots: BTreeMap<u32, usize> = BTreeMap::new();
    let mut swatches: Vec<Swatch> = Vec::new();
    for &pixel in raster.pixels() {
        match slots.entry(pixel.to_word()) {
            Entry::Occupied(slot) => swatches[*slot.get()].count += 1,
            Entry::Vacant(slot) => {
                slot.insert(swatches.len());
                swatches.push(Swatch { color: pixel, count: 1 });
            }
        }
    }
    swatches
}

fn exact_palette(swatches: &[Swatch]) -> Palette {
    let mut palette = Palette::new();
    for swatch in swatches {
        // at most `target` swatches here, so capacity cannot overflow
        palette.push(swatch.color);
    }
    palette
}

/// Classic median-cut: repeatedly split the box with the widest channel
/// range at its weighted median until `target` boxes exist, then average
/// each box into one palette entry.
///
/// The split count is capped at `target`, so the palette can never grow
/// past the 16-entry bound.
fn median_cut(swatches: Vec<Swatch>, target: usize) -> Palette {
    let mut boxes: Vec<Vec<Swatch>> = vec![swatches];

    while boxes.len() < target {
        // Widest splittable box; lowest index wins ties.
        let mut widest = None;
        let mut widest_spread = 0u8;
        for (index, candidates) in boxes.iter().enumerate() {
            if candidates.len() < 2 {
                continue;
            }
            let (spread, _) = channel_spread(candidates);
            if widest.is_none() || spread > widest_spread {
                widest = Some(index);
                widest_spread = spread;
            }
        }
        let Some(widest) = widest else {
            // every box is down to a single color
            break;
        };

        let (low, high) = split_box(core::mem::take(&mut boxes[widest]));
        boxes[widest] = low;
        boxes.push(high);
    }

    let mut palette = Palette::new();
    for candidates in &boxes {
        palette.push(average(candidates));
    }
    palette
}

/// Range of the widest channel of a box, as `(spread, channel)`.
/// Channels tie in r, g, b order.
fn channel_spread(swatches: &[Swatch]) -> (u8, usize) {
    let mut min = [255u8; 3];
    let mut max = [0u8; 3];
    for swatch in swatches {
        let channels = [swatch.color.r, swatch.color.g, swatch.color.b];
        for c in 0..3 {
            min[c] = min[c].min(channels[c]);
            max[c] = max[c].max(channels[c]);
        }
    }
    let mut spread = 0;
    let mut channel = 0;
    for c in 0..3 {
        if max[c] - min[c] > spread {
            spread = max[c] - min[c];
            channel = c;
        }
    }
    (spread, channel)
}

/// Split one box at the weighted median of its widest channel. Both halves
/// come back non-empty.
fn split_box(mut swatches: Vec<Swatch>) -> (Vec<Swatch>, Vec<Swatch>) {
    let (_, channel) = channel_spread(&swatches);
    swatches.sort_unstable_by_key(|swatch| {
        let channels = [swatch.color.r, swatch.color.g, swatch.color.b];
        // full word as secondary key gives a total order
        (channels[channel], swatch.color.to_word())
    });

    let total: u64 = swatches.iter().map(|swatch| swatch.count as u64).sum();
    let mut accumulated = 0u64;
    let mut split = swatches.len();
    for (index, swatch) in swatches.iter().enumerate() {
        accumulated += swatch.count as u64;
        if accumulated * 2 >= total {
            split = index + 1;
            break;
        }
    }
    let split = split.clamp(1, swatches.len() - 1);

    let high = swatches.split_off(split);
    (swatches, high)
}

/// Weighted mean color of a box, rounded per channel.
fn average(swatches: &[Swatch]) -> Rgb {
    let mut sums = [0u64; 3];
    let mut total = 0u64;
    for swatch in swatches {
        let weight = swatch.count as u64;
        sums[0] += swatch.color.r as u64 * weight;
        sums[1] += swatch.color.g as u64 * weight;
        sums[2] += swatch.color.b as u64 * weight;
        total += weight;
    }
    Rgb::new(
        ((sums[0] + total / 2) / total) as u8,
        ((sums[1] + total / 2) / total) as u8,
        ((sums[2] + total / 2) / total) as u8,
    )
}

/// Map every pixel to its nearest palette entry, memoized per distinct
/// color.
fn nearest_map(raster: &Raster<'_>, palette: &Palette) -> Vec<u8> {
    let mut cache = BTreeMap::new();
    raster
        .pixels()
        .iter()
        .map(|&pixel| {
            *cache
                .entry(pixel.to_word())
                .or_insert_with(|| palette.nearest(pixel))
        })
        .collect()
}

/// Error-diffusion mapping: right 7/16, below-left 3/16, below 5/16,
/// below-right 1/16, in plain left-to-right top-to-bottom scan order.
fn diffuse_map(raster: &Raster<'_>, palette: &Palette) -> Vec<u8> {
    let width = raster.width();
    let mut indices = Vec::with_capacity(raster.pixels().len());
    // Carried error per channel for the current row and the one below.
    let mut current = vec![[0i32; 3]; width];
    let mut below = vec![[0i32; 3]; width];

    for row in raster.rows() {
        for (x, &pixel) in row.iter().enumerate() {
            let carried = current[x];
            let wanted = Rgb::new(
                clamp_channel(pixel.r as i32 + carried[0]),
                clamp_channel(pixel.g as i32 + carried[1]),
                clamp_channel(pixel.b as i32 + carried[2]),
            );
            let index = palette.nearest(wanted);
            indices.push(index);

            let chosen = palette.color(index);
            let error = [
                wanted.r as i32 - chosen.r as i32,
                wanted.g as i32 - chosen.g as i32,
                wanted.b as i32 - chosen.b as i32,
            ];
            if x + 1 < width {
                spread_error(&mut current[x + 1], error, 7);
                spread_error(&mut below[x + 1], error, 1);
            }
            if x > 0 {
                spread_error(&mut below[x - 1], error, 3);
            }
            spread_error(&mut below[x], error, 5);
        }
        core::mem::swap(&mut current, &mut below);
        below.fill([0; 3]);
    }
    indices
}

fn spread_error(cell: &mut [i32; 3], error: [i32; 3], weight: i32) {
    for c in 0..3 {
        cell[c] += error[c] * weight / 16;
    }
}

fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}
