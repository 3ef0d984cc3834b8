//! Image encoding for upload and decoding of synthesized output.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use scenecraft_types::content::Blob;

use crate::error::Result;

/// 上传前的最大边长（像素）。
pub const MAX_UPLOAD_DIMENSION: u32 = 1024;
/// 不透明图片的 JPEG 质量。
pub const JPEG_QUALITY: u8 = 85;

/// 缩放并编码图片以便内联上传。
///
/// 超过 [`MAX_UPLOAD_DIMENSION`] 时按比例缩小（Lanczos3），不会放大。
/// 带 alpha 通道的图片编码为 PNG 以保留透明背景，其余编码为 JPEG。
///
/// # Errors
/// 编码失败时返回错误。
pub fn encode_for_upload(image: &DynamicImage) -> Result<Blob> {
    let (width, height) = image.dimensions();
    let resized;
    let image = if width > MAX_UPLOAD_DIMENSION || height > MAX_UPLOAD_DIMENSION {
        resized = image.resize(MAX_UPLOAD_DIMENSION, MAX_UPLOAD_DIMENSION, FilterType::Lanczos3);
        &resized
    } else {
        image
    };

    let mut data = Vec::new();
    if image.color().has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)?;
        Ok(Blob {
            mime_type: "image/png".into(),
            data,
        })
    } else {
        JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY).encode_image(&image.to_rgb8())?;
        Ok(Blob {
            mime_type: "image/jpeg".into(),
            data,
        })
    }
}

/// 解码模型返回的图片数据。
///
/// # Errors
/// 数据不是可识别的图片格式时返回错误。
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// 按整数倍放大（Lanczos3），用于高清下载版本。
#[must_use]
pub fn upscale(image: &DynamicImage, factor: u32) -> DynamicImage {
    let factor = factor.max(1);
    let (width, height) = image.dimensions();
    image.resize_exact(
        width.saturating_mul(factor),
        height.saturating_mul(factor),
        FilterType::Lanczos3,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn transparent_images_stay_png() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 16, Rgba([0, 0, 0, 0])));
        let blob = encode_for_upload(&image).unwrap();
        assert_eq!(blob.mime_type, "image/png");
        let decoded = decode_image(&blob.data).unwrap();
        assert_eq!(decoded.dimensions(), (32, 16));
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn opaque_images_become_jpeg() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 10, Rgb([200, 10, 10])));
        let blob = encode_for_upload(&image).unwrap();
        assert_eq!(blob.mime_type, "image/jpeg");
        assert_eq!(decode_image(&blob.data).unwrap().dimensions(), (20, 10));
    }

    #[test]
    fn large_images_are_capped_preserving_aspect() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(2048, 1024));
        let blob = encode_for_upload(&image).unwrap();
        let decoded = decode_image(&blob.data).unwrap();
        assert_eq!(decoded.dimensions(), (1024, 512));
    }

    #[test]
    fn small_images_are_not_enlarged() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(100, 300));
        let blob = encode_for_upload(&image).unwrap();
        assert_eq!(decode_image(&blob.data).unwrap().dimensions(), (100, 300));
    }

    #[test]
    fn upscale_doubles_dimensions() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(30, 20));
        assert_eq!(upscale(&image, 2).dimensions(), (60, 40));
        assert_eq!(upscale(&image, 0).dimensions(), (30, 20));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_image(b"definitely not an image").is_err());
    }
}
