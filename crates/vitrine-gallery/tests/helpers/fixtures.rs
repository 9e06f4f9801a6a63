//! Test fixtures: selected files.

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use vitrine_core::models::SourceFile;

/// A real PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn png_file(name: &str) -> SourceFile {
    SourceFile::new(name, "image/png", png_bytes(4, 3))
}

pub fn jpeg_file(name: &str) -> SourceFile {
    SourceFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3])
}

pub fn gif_file(name: &str) -> SourceFile {
    SourceFile::new(name, "image/gif", b"GIF89a".to_vec())
}
