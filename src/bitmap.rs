use image::GrayImage;

use crate::config::{ALPHA_OPAQUE_MIN, LUMA_THRESHOLD, PAD};
use crate::error::PipelineError;

/// Mask value for ink (foreground) pixels. Background is 0.
pub const INK: u8 = 255;

/// Binarize an RGBA buffer into a padded binary mask.
///
/// The mask is `PAD` pixels larger on every side than the input; the
/// border ring is always background, which pins `(0, 0)` for the
/// background flood fill. A pixel is ink iff it is sufficiently opaque
/// (alpha >= `ALPHA_OPAQUE_MIN`) and its Rec.601 luminance
/// `0.299 R + 0.587 G + 0.114 B` falls below `LUMA_THRESHOLD`.
///
/// Binarization is idempotent: feeding the rendered mask back through
/// produces the same mask.
pub fn binarize_padded(
    buffer: &[u8],
    width: u32,
    height: u32,
) -> Result<GrayImage, PipelineError> {
    let padded_w = width + 2 * PAD;
    let padded_h = height + 2 * PAD;
    let len = padded_w as usize * padded_h as usize;

    // The padded mask is the pipeline's largest allocation.
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| PipelineError::OutOfMemory)?;
    data.resize(len, 0);

    for y in 0..height {
        for x in 0..width {
            let i = (y as usize * width as usize + x as usize) * 4;
            let (r, g, b, a) = (buffer[i], buffer[i + 1], buffer[i + 2], buffer[i + 3]);
            if a < ALPHA_OPAQUE_MIN {
                continue;
            }
            let luma = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
            if luma < LUMA_THRESHOLD {
                let j = (y + PAD) as usize * padded_w as usize + (x + PAD) as usize;
                data[j] = INK;
            }
        }
    }

    Ok(GrayImage::from_raw(padded_w, padded_h, data).expect("mask buffer sized to dimensions"))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Render a mask back to RGBA: ink -> opaque black, background ->
    /// opaque white.
    fn mask_to_rgba(mask: &GrayImage) -> (Vec<u8>, u32, u32) {
        let (w, h) = mask.dimensions();
        let mut buf = Vec::with_capacity(w as usize * h as usize * 4);
        for p in mask.pixels() {
            let v = if p[0] == INK { 0 } else { 255 };
            buf.extend_from_slice(&[v, v, v, 255]);
        }
        (buf, w, h)
    }

    #[test]
    fn white_image_is_all_background() {
        let buf = vec![255u8; 4 * 8 * 8];
        let mask = binarize_padded(&buf, 8, 8).unwrap();
        assert_eq!(mask.dimensions(), (8 + 2 * PAD, 8 + 2 * PAD));
        assert!(mask.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn transparent_pixels_are_background() {
        // Black but fully transparent: must not become ink.
        let buf = vec![0u8, 0, 0, 0].repeat(8 * 8);
        let mask = binarize_padded(&buf, 8, 8).unwrap();
        assert!(mask.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn dark_pixels_become_ink_inside_the_pad() {
        let mut buf = vec![255u8; 4 * 8 * 8];
        let i = (3 * 8 + 4) * 4;
        buf[i..i + 4].copy_from_slice(&[10, 10, 10, 255]);
        let mask = binarize_padded(&buf, 8, 8).unwrap();
        assert_eq!(mask.get_pixel(4 + PAD, 3 + PAD)[0], INK);
        assert_eq!(
            mask.pixels().filter(|p| p[0] == INK).count(),
            1,
            "exactly one ink pixel expected"
        );
    }

    #[test]
    fn binarization_is_idempotent() {
        let mut buf = vec![255u8; 4 * 16 * 16];
        for x in 2..14usize {
            let i = (7 * 16 + x) * 4;
            buf[i..i + 4].copy_from_slice(&[0, 0, 0, 255]);
        }
        let first = binarize_padded(&buf, 16, 16).unwrap();

        // Strip the pad, render as grayscale RGBA, binarize again.
        let mut inner = GrayImage::new(16, 16);
        for y in 0..16 {
            for x in 0..16 {
                inner.put_pixel(x, y, *first.get_pixel(x + PAD, y + PAD));
            }
        }
        let (rendered, w, h) = mask_to_rgba(&inner);
        let second = binarize_padded(&rendered, w, h).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }
}
