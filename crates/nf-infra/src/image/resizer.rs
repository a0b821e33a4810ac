use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use nf_core::ports::ImageResizerPort;
use nf_core::{Direction, ResizedImage, ScaleParams, ScalingError};
use tracing::debug_span;

/// Resize primitive on the `image` crate.
///
/// PNG sources stay PNG; everything else is re-encoded as JPEG.
pub struct PixelResizer {
    default_quality: u8,
}

impl PixelResizer {
    pub fn new(default_quality: u8) -> Self {
        Self { default_quality }
    }
}

impl Default for PixelResizer {
    fn default() -> Self {
        Self::new(88)
    }
}

/// Resize target and optional centered crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Plan {
    resize: (u32, u32),
    crop: Option<(u32, u32)>,
}

fn scaled(value: u32, factor: f64) -> u32 {
    ((value as f64) * factor).round().max(1.0) as u32
}

fn plan_for(
    direction: Direction,
    (width, height): (u32, u32),
    target_width: Option<u32>,
    target_height: Option<u32>,
) -> Plan {
    let keep = Plan {
        resize: (width, height),
        crop: None,
    };
    if width == 0 || height == 0 {
        return keep;
    }
    let fx = target_width.map(|w| w as f64 / width as f64);
    let fy = target_height.map(|h| h as f64 / height as f64);

    match direction {
        Direction::Thumbnail => {
            let factor = match (fx, fy) {
                (Some(fx), Some(fy)) => fx.min(fy),
                (Some(f), None) | (None, Some(f)) => f,
                (None, None) => return keep,
            };
            if factor >= 1.0 {
                return keep;
            }
            Plan {
                resize: (scaled(width, factor), scaled(height, factor)),
                crop: None,
            }
        }
        Direction::Down | Direction::Up => {
            let cover = match (fx, fy) {
                (Some(fx), Some(fy)) => fx.max(fy),
                (Some(f), None) | (None, Some(f)) => f,
                (None, None) => return keep,
            };
            let factor = if direction == Direction::Down {
                cover.min(1.0)
            } else {
                cover
            };
            let resize = (scaled(width, factor), scaled(height, factor));
            let crop_width = target_width.unwrap_or(resize.0).min(resize.0);
            let crop_height = target_height.unwrap_or(resize.1).min(resize.1);
            let crop = (crop_width, crop_height);
            Plan {
                resize,
                crop: (crop != resize).then_some(crop),
            }
        }
    }
}

fn filter_from(params: &ScaleParams) -> FilterType {
    match params.extra.get("filter").map(String::as_str) {
        Some("nearest") => FilterType::Nearest,
        Some("triangle") => FilterType::Triangle,
        Some("catmullrom") => FilterType::CatmullRom,
        Some("gaussian") => FilterType::Gaussian,
        _ => FilterType::Lanczos3,
    }
}

fn transform_error(context: &str, err: impl std::fmt::Display) -> ScalingError {
    ScalingError::Transform(format!("{context}: {err}"))
}

impl ImageResizerPort for PixelResizer {
    fn scale_image(
        &self,
        data: &[u8],
        params: &ScaleParams,
    ) -> Result<Option<ResizedImage>, ScalingError> {
        let span = debug_span!(
            "infra.image.scale",
            size_bytes = data.len(),
            direction = %params.direction,
            width = ?params.width,
            height = ?params.height,
        );
        let _enter = span.enter();

        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|err| transform_error("read image header", err))?;
        let source_format = reader.format();
        let decoded = reader
            .decode()
            .map_err(|err| transform_error("decode image", err))?;

        let plan = plan_for(params.direction, decoded.dimensions(), params.width, params.height);
        let mut image = if plan.resize == decoded.dimensions() {
            decoded
        } else {
            decoded.resize_exact(plan.resize.0, plan.resize.1, filter_from(params))
        };
        if let Some((crop_width, crop_height)) = plan.crop {
            let x = (image.width() - crop_width) / 2;
            let y = (image.height() - crop_height) / 2;
            image = image.crop_imm(x, y, crop_width, crop_height);
        }

        let dimensions = image.dimensions();
        let mut encoded = Vec::new();
        let format = if source_format == Some(ImageFormat::Png) {
            image
                .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
                .map_err(|err| transform_error("encode png", err))?;
            "PNG"
        } else {
            let quality = params.quality.unwrap_or(self.default_quality).clamp(1, 100);
            let encoder = JpegEncoder::new_with_quality(&mut encoded, quality);
            DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|err| transform_error("encode jpeg", err))?;
            "JPEG"
        };

        Ok(Some(ResizedImage {
            data: Bytes::from(encoded),
            format: format.to_string(),
            dimensions,
        }))
    }
}
