//! Padding - Masked Spatial Padding
//!
//! A `PaddedTensor` pairs the padded values with a validity mask instead of
//! marking padding with NaN. Only the spatial axes (everything after batch
//! and channel) are padded. Padding cells hold `0.0` and a `false` mask bit,
//! which is also what `count_include_pad` averaging sums over.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use refcheck_tensor::shape::{contiguous_strides, linear_index};
use refcheck_tensor::{IndexIter, Shape, Tensor};

use crate::error::{OnnxError, OnnxResult};

// =============================================================================
// PaddedTensor
// =============================================================================

/// An `[N, C, spatial..]` tensor with padded spatial axes and a validity mask.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedTensor {
    values: Vec<f32>,
    mask: Vec<bool>,
    shape: Shape,
    pads_begin: Vec<usize>,
    pads_end: Vec<usize>,
}

impl PaddedTensor {
    /// Pads the spatial axes of `input` with masked-out zeros.
    pub fn new(input: &Tensor<f32>, pads_begin: &[usize], pads_end: &[usize]) -> OnnxResult<Self> {
        let spatial_rank = spatial_rank(input.shape())?;
        check_len("pads_begin", spatial_rank, pads_begin.len())?;
        check_len("pads_end", spatial_rank, pads_end.len())?;

        let mut shape = Shape::from_slice(input.shape());
        for i in 0..spatial_rank {
            shape[i + 2] += pads_begin[i] + pads_end[i];
        }

        let total: usize = shape.iter().product();
        let mut values = vec![0.0f32; total];
        let mut mask = vec![false; total];
        let strides = contiguous_strides(&shape);

        for (idx, &value) in IndexIter::new(input.shape()).zip(input.as_slice()) {
            let mut target = idx;
            for i in 0..spatial_rank {
                target[i + 2] += pads_begin[i];
            }
            let offset = linear_index(&target, &strides);
            values[offset] = value;
            mask[offset] = true;
        }

        Ok(Self {
            values,
            mask,
            shape,
            pads_begin: pads_begin.to_vec(),
            pads_end: pads_end.to_vec(),
        })
    }

    /// Adopts a tensor that was padded with NaN sentinels.
    ///
    /// Every NaN becomes a masked-out zero. `pads_begin` and `pads_end`
    /// describe where the sentinel border sits so the unpadded geometry can
    /// be recovered.
    pub fn from_sentinel(
        padded: &Tensor<f32>,
        pads_begin: &[usize],
        pads_end: &[usize],
    ) -> OnnxResult<Self> {
        let spatial_rank = spatial_rank(padded.shape())?;
        check_len("pads_begin", spatial_rank, pads_begin.len())?;
        check_len("pads_end", spatial_rank, pads_end.len())?;

        for i in 0..spatial_rank {
            if pads_begin[i] + pads_end[i] > padded.shape()[i + 2] {
                return Err(OnnxError::InvalidShape(format!(
                    "pads exceed padded extent {} on spatial axis {i}",
                    padded.shape()[i + 2]
                )));
            }
        }

        let mask: Vec<bool> = padded.as_slice().iter().map(|v| !v.is_nan()).collect();
        let values = padded
            .as_slice()
            .iter()
            .map(|&v| if v.is_nan() { 0.0 } else { v })
            .collect();

        Ok(Self {
            values,
            mask,
            shape: Shape::from_slice(padded.shape()),
            pads_begin: pads_begin.to_vec(),
            pads_end: pads_end.to_vec(),
        })
    }

    /// Returns the padded shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the padded spatial extents.
    pub fn spatial_shape(&self) -> &[usize] {
        &self.shape[2..]
    }

    /// Returns the shape before padding.
    pub fn input_shape(&self) -> Shape {
        let mut shape = self.shape.clone();
        for (i, (b, e)) in self.pads_begin.iter().zip(&self.pads_end).enumerate() {
            shape[i + 2] -= b + e;
        }
        shape
    }

    /// Returns the padded values in row-major order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Returns the validity mask in row-major order.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Returns the padding before each spatial axis.
    pub fn pads_begin(&self) -> &[usize] {
        &self.pads_begin
    }

    /// Returns the padding after each spatial axis.
    pub fn pads_end(&self) -> &[usize] {
        &self.pads_end
    }

    /// Strips the padding back off.
    pub fn unpadded(&self) -> OnnxResult<Tensor<f32>> {
        let input_shape = self.input_shape();
        let strides = contiguous_strides(&self.shape);
        let data = IndexIter::new(&input_shape)
            .map(|mut idx| {
                for (i, b) in self.pads_begin.iter().enumerate() {
                    idx[i + 2] += b;
                }
                self.values[linear_index(&idx, &strides)]
            })
            .collect();
        Ok(Tensor::from_vec(data, &input_shape)?)
    }
}

fn spatial_rank(shape: &[usize]) -> OnnxResult<usize> {
    if shape.len() < 3 {
        return Err(OnnxError::InvalidShape(format!(
            "expected [N, C, spatial..] input, got {shape:?}"
        )));
    }
    Ok(shape.len() - 2)
}

fn check_len(what: &str, expected: usize, actual: usize) -> OnnxResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(OnnxError::shape_mismatch(what, expected, actual))
    }
}

// =============================================================================
// Tests
// =============================================================================
