#![no_std]

pub mod color;
pub mod framebuffer;
pub mod fs;
pub mod pack;
pub mod palette;
pub mod pib;
pub mod quant;
pub mod raster;

#[cfg(test)]
mod tests;

extern crate alloc;
