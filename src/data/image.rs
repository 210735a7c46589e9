/// Preprocessing that turns an arbitrary photo or scan of a digit into the
/// bilevel 28×28 input the MNIST-trained network expects.
///
/// Pipeline: decode → resize to `side × side` → 8-bit grayscale → invert
/// (MNIST digits are bright strokes on a dark background) → threshold to
/// pure black/white → normalize to `[0, 1]`.
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};

use crate::errors::NnError;

/// MNIST images are 28 pixels wide and high.
pub const MNIST_SIDE: u32 = 28;

/// Inverted intensities strictly above this become 255, the rest 0.
pub const BILEVEL_THRESHOLD: u8 = 128;

/// Resizes, grayscales, inverts and thresholds `img`.
pub fn to_bilevel(img: &DynamicImage, side: u32, threshold: u8) -> GrayImage {
    let gray = img.resize_exact(side, side, FilterType::Triangle).to_luma8();
    invert_threshold(&gray, threshold)
}

/// Inverts each pixel and maps it to 255 if it is then above `threshold`,
/// otherwise to 0.
pub fn invert_threshold(gray: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let inverted = 255 - gray.get_pixel(x, y).0[0];
        if inverted > threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Row-major pixels divided by 255.
pub fn to_input(gray: &GrayImage) -> Vec<f64> {
    gray.pixels().map(|p| p.0[0] as f64 / 255.0).collect()
}

/// Decodes image bytes (PNG/JPEG/BMP/GIF) and runs the full pipeline.
///
/// Returns the bilevel image alongside the flat network input of length
/// `side * side`.
pub fn bilevel_input_from_bytes(
    bytes: &[u8],
    side: u32,
    threshold: u8,
) -> Result<(GrayImage, Vec<f64>), NnError> {
    let img = image::load_from_memory(bytes)?;
    let bilevel = to_bilevel(&img, side, threshold);
    let input = to_input(&bilevel);
    Ok((bilevel, input))
}

/// Same as `bilevel_input_from_bytes`, reading the image from `path`.
pub fn load_bilevel_input<P: AsRef<Path>>(
    path: P,
    side: u32,
    threshold: u8,
) -> Result<(GrayImage, Vec<f64>), NnError> {
    let img = image::open(path)?;
    let bilevel = to_bilevel(&img, side, threshold);
    let input = to_input(&bilevel);
    Ok((bilevel, input))
}

/// Draws an input vector as text, `*` for values above 0.5 and `_` otherwise.
pub fn render_ascii(input: &[f64], width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let mut out = String::with_capacity(input.len() + input.len() / width);
    for row in input.chunks(width) {
        for &v in row {
            out.push(if v > 0.5 { '*' } else { '_' });
        }
        out.push('\n');
    }
    out
}
