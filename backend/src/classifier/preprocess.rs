use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use thiserror::Error;
use tract_onnx::prelude::*;

use super::config::{ModelSpec, Normalization};

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Unrecognized image format: {0}")]
    Format(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decodes uploaded bytes, guessing JPEG/PNG from the magic numbers.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PreprocessError> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    Ok(img)
}

/// Resizes to the classifier's input shape and builds the NHWC f32 tensor.
///
/// The Keras-lineage exports all take channels-last input, so the layout is
/// `[1, height, width, 3]`.
pub fn to_tensor(img: &DynamicImage, spec: &ModelSpec) -> Tensor {
    let (width, height) = (spec.input.width, spec.input.height);
    let resized = image::imageops::resize(&img.to_rgb8(), width, height, FilterType::Triangle);
    tract_ndarray::Array4::from_shape_fn(
        (1, height as usize, width as usize, 3),
        |(_, y, x, c)| {
            let value = resized[(x as u32, y as u32)][c] as f32;
            match spec.normalization {
                Normalization::Scale => value / 255.0,
                Normalization::Mobilenet => value / 127.5 - 1.0,
            }
        },
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::config::InputShape;
    use image::{Rgb, RgbImage};

    fn spec(normalization: Normalization, width: u32, height: u32) -> ModelSpec {
        ModelSpec {
            label: "test".to_string(),
            path: "unused".to_string(),
            input: InputShape {
                width,
                height,
                channels: 3,
            },
            normalization,
            softmax: false,
        }
    }

    fn solid_image(r: u8, g: u8, b: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 40, Rgb([r, g, b])))
    }

    #[test]
    fn decodes_png_bytes() {
        let mut bytes = Vec::new();
        solid_image(10, 20, 30)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let img = decode(&bytes).unwrap();
        assert_eq!(img.width(), 50);
        assert_eq!(img.height(), 40);
    }

    #[test]
    fn rejects_garbage_bytes() {
        assert!(decode(b"not an image at all").is_err());
    }

    #[test]
    fn tensor_has_nhwc_shape() {
        let tensor = to_tensor(&solid_image(0, 0, 0), &spec(Normalization::Scale, 224, 224));
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn scale_normalization_maps_into_unit_range() {
        let tensor = to_tensor(&solid_image(255, 0, 127), &spec(Normalization::Scale, 32, 32));
        let view = tensor.to_array_view::<f32>().unwrap();
        assert!((view[[0, 0, 0, 0]] - 1.0).abs() < 1e-5);
        assert!(view[[0, 0, 0, 1]].abs() < 1e-5);
        assert!((view[[0, 0, 0, 2]] - 127.0 / 255.0).abs() < 1e-5);
    }

    #[test]
    fn mobilenet_normalization_maps_into_signed_range() {
        let tensor = to_tensor(&solid_image(255, 0, 127), &spec(Normalization::Mobilenet, 32, 32));
        let view = tensor.to_array_view::<f32>().unwrap();
        assert!((view[[0, 0, 0, 0]] - 1.0).abs() < 1e-5);
        assert!((view[[0, 0, 0, 1]] + 1.0).abs() < 1e-5);
        assert!((view[[0, 0, 0, 2]] - (127.0 / 127.5 - 1.0)).abs() < 1e-5);
    }

    #[test]
    fn resize_matches_requested_shape_for_non_square_input() {
        let tensor = to_tensor(&solid_image(5, 5, 5), &spec(Normalization::Scale, 256, 128));
        assert_eq!(tensor.shape(), &[1, 128, 256, 3]);
    }
}
