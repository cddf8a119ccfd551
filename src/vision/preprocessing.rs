// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the civic-infrastructure classifier

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::{Array4, ArrayView4};
use thiserror::Error;

/// Side length of the square classifier input
pub const INPUT_SIZE: u32 = 224;

/// Color channels of the classifier input (RGB)
pub const CHANNELS: usize = 3;

/// Resampling filter used to reach `INPUT_SIZE`.
///
/// Catmull-Rom is the bicubic kernel, matching what the model saw during
/// training. Resizing is deterministic for a given input.
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Failed to build input tensor: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Classifier input: `[1, 224, 224, 3]` NHWC, every value in `[0, 1]`.
///
/// Only constructible with the exact shape; anything else is a bug in the
/// caller and panics.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor(Array4<f32>);

impl NormalizedTensor {
    pub const SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, CHANNELS];

    pub fn from_array(array: Array4<f32>) -> Self {
        assert_eq!(
            array.shape(),
            &Self::SHAPE[..],
            "classifier input must be 1x224x224x3"
        );
        debug_assert!(
            array.iter().all(|v| (0.0..=1.0).contains(v)),
            "classifier input values must lie in [0, 1]"
        );
        Self(array)
    }

    /// All-zero (black) input, useful for warming up a model
    pub fn zeros() -> Self {
        Self(Array4::zeros(Self::SHAPE))
    }

    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.0.view()
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn into_array(self) -> Array4<f32> {
        self.0
    }
}

/// Canonicalize a decoded image into the classifier input.
///
/// Steps:
/// 1. Convert to 8-bit RGB (alpha dropped, grayscale replicated)
/// 2. Resize to 224x224 with `RESIZE_FILTER`, ignoring aspect ratio
/// 3. Scale each channel by 1/255
/// 4. Prepend the batch axis
pub fn preprocess(image: &DynamicImage) -> Result<NormalizedTensor, PreprocessError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PreprocessError::EmptyImage { width, height });
    }

    let rgb = image.to_rgb8();
    let resized = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, RESIZE_FILTER);

    // RgbImage stores rows of interleaved channels, which is already HWC
    let values: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();

    let array = Array4::from_shape_vec(NormalizedTensor::SHAPE, values)?;
    Ok(NormalizedTensor::from_array(array))
}
