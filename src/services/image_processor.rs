// src/services/image_processor.rs
use crate::errors::CreatorError;
use crate::models::ReferenceImage;
use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, GenericImageView, ImageFormat as ImgFormat};

const MAX_ACCEPTED_DIMENSION: u32 = 4096;

pub struct ImageProcessor {
    max_dimension: u32,
}

impl ImageProcessor {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    pub fn validate_image(&self, data: &[u8]) -> Result<(u32, u32), CreatorError> {
        let img = load(data)?;
        let (width, height) = img.dimensions();

        if width > MAX_ACCEPTED_DIMENSION || height > MAX_ACCEPTED_DIMENSION {
            return Err(CreatorError::ImageProcessing(format!(
                "Image dimensions exceed {0}x{0}",
                MAX_ACCEPTED_DIMENSION
            )));
        }

        Ok((width, height))
    }

    /// Returns the original bytes when they already fit, otherwise a PNG
    /// scaled down to fit `max_dimension` on its longer side.
    pub fn resize_if_needed(&self, data: &[u8]) -> Result<Vec<u8>, CreatorError> {
        let img = load(data)?;
        let (width, height) = img.dimensions();

        if width <= self.max_dimension && height <= self.max_dimension {
            return Ok(data.to_vec());
        }

        let ratio = (self.max_dimension as f32 / width.max(height) as f32).min(1.0);
        let new_width = ((width as f32 * ratio) as u32).max(1);
        let new_height = ((height as f32 * ratio) as u32).max(1);

        let resized = img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3);
        encode_png(&resized)
    }

    /// Validates, downsizes and base64-encodes an uploaded image. Formats the
    /// generative service does not take inline are re-encoded as PNG.
    pub fn encode_reference(&self, data: &[u8]) -> Result<ReferenceImage, CreatorError> {
        self.validate_image(data)?;
        let mut bytes = self.resize_if_needed(data)?;

        let mime_type = match image::guess_format(&bytes) {
            Ok(ImgFormat::Png) => "image/png",
            Ok(ImgFormat::Jpeg) => "image/jpeg",
            Ok(ImgFormat::WebP) => "image/webp",
            _ => {
                bytes = encode_png(&load(&bytes)?)?;
                "image/png"
            }
        };

        let (width, height) = load(&bytes)?.dimensions();
        Ok(ReferenceImage {
            mime_type: mime_type.to_string(),
            data: general_purpose::STANDARD.encode(&bytes),
            width,
            height,
            byte_len: bytes.len(),
        })
    }
}

fn load(data: &[u8]) -> Result<DynamicImage, CreatorError> {
    image::load_from_memory(data)
        .map_err(|e| CreatorError::ImageProcessing(format!("Invalid image format: {}", e)))
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, CreatorError> {
    let mut output = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut output), ImgFormat::Png)
        .map_err(|e| CreatorError::ImageProcessing(format!("Failed to encode image: {}", e)))?;
    Ok(output)
}
