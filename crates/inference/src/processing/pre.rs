use common::span;
use image::{DynamicImage, ImageError};
use ndarray::Array3;

/// Decode raw upload bytes with whichever codec matches the content.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let _s = span!("decode_image");
    image::load_from_memory(bytes)
}

/// Converts decoded images into the model's input layout: RGB, `f32` in
/// `[0, 1]`, channel-first `[3, H, W]`, at the source resolution. The
/// detector resizes internally, so boxes come back in source pixels.
#[derive(Debug, Clone, Copy)]
pub struct PreProcessor {
    pub max_pixels: u64,
}

impl PreProcessor {
    pub fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }

    pub fn to_tensor(&self, image: &DynamicImage) -> anyhow::Result<Array3<f32>> {
        let _s = span!("to_tensor");

        let width = image.width();
        let height = image.height();

        tracing::trace!(width, height, color = ?image.color(), "Converting image to tensor");

        if width == 0 || height == 0 {
            anyhow::bail!("Image has zero size: {}x{}", width, height);
        }

        let pixels = u64::from(width) * u64::from(height);
        if pixels > self.max_pixels {
            anyhow::bail!(
                "Image too large: {}x{} ({} pixels, limit {})",
                width,
                height,
                pixels,
                self.max_pixels
            );
        }

        let rgb = image.to_rgb8();
        let width = width as usize;
        let height = height as usize;
        let spatial = width * height;

        let mut output = vec![0.0f32; 3 * spatial];

        for (i, px) in rgb.as_raw().chunks_exact(3).enumerate() {
            output[i] = px[0] as f32 / 255.0;
            output[i + spatial] = px[1] as f32 / 255.0;
            output[i + 2 * spatial] = px[2] as f32 / 255.0;
        }

        Ok(Array3::from_shape_vec((3, height, width), output)?)
    }
}

impl Default for PreProcessor {
    fn default() -> Self {
        Self::new(40_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    /// Test decoding of a real PNG
    #[test]
    fn test_decode_png() {
        let bytes = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([1, 2, 3]))),
            ImageFormat::Png,
        );

        let decoded = decode_image(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    /// Test that non-image bytes fail to decode
    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_image(b"definitely not an image").is_err());
        // Valid PNG signature, truncated body
        assert!(decode_image(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]).is_err());
    }

    /// Test channel-first layout and [0, 1] scaling
    #[test]
    fn test_tensor_layout_is_chw() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([255, 0, 0])); // Red
        img.put_pixel(1, 0, Rgb([0, 255, 0])); // Green
        img.put_pixel(0, 1, Rgb([0, 0, 255])); // Blue
        img.put_pixel(1, 1, Rgb([255, 255, 255])); // White

        let tensor = PreProcessor::default()
            .to_tensor(&DynamicImage::ImageRgb8(img))
            .unwrap();

        assert_eq!(tensor.shape(), &[3, 2, 2]);

        assert_eq!(tensor[[0, 0, 0]], 1.0);
        assert_eq!(tensor[[1, 0, 0]], 0.0);
        assert_eq!(tensor[[1, 0, 1]], 1.0);
        assert_eq!(tensor[[2, 1, 0]], 1.0);
        for c in 0..3 {
            assert_eq!(tensor[[c, 1, 1]], 1.0);
        }
    }

    /// Test non-square images keep height before width
    #[test]
    fn test_tensor_shape_for_wide_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 3, Rgb([128, 128, 128])));
        let tensor = PreProcessor::default().to_tensor(&img).unwrap();

        assert_eq!(tensor.shape(), &[3, 3, 8]);
        assert!((tensor[[2, 2, 7]] - 128.0 / 255.0).abs() < 1e-6);
    }

    /// Test grayscale and RGBA inputs are expanded/flattened to RGB
    #[test]
    fn test_non_rgb_inputs_become_three_channels() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 3, Luma([51])));
        let tensor = PreProcessor::default().to_tensor(&gray).unwrap();
        assert_eq!(tensor.shape(), &[3, 3, 3]);
        assert!((tensor[[1, 1, 1]] - 0.2).abs() < 1e-6);

        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 10])));
        let tensor = PreProcessor::default().to_tensor(&rgba).unwrap();
        assert_eq!(tensor.shape(), &[3, 2, 2]);
        assert_eq!(tensor[[2, 0, 0]], 1.0);
    }

    /// Test the pixel limit is enforced
    #[test]
    fn test_pixel_limit() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(10, 10));

        let err = PreProcessor::new(99).to_tensor(&img).unwrap_err();
        assert!(err.to_string().contains("too large"));

        assert!(PreProcessor::new(100).to_tensor(&img).is_ok());
    }
}
