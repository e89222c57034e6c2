//! Convolution - Reference Sliding Dot Product
//!
//! Reference convolution over any number of spatial axes. The input is
//! zero-padded once through [`PaddedTensor`] and every output element is the
//! dot product of one kernel placement with the weight slice of its output
//! channel, accumulated in `f64`.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use refcheck_tensor::shape::{contiguous_strides, linear_index, numel};
use refcheck_tensor::{IndexIter, Tensor};

use crate::error::{OnnxError, OnnxResult};
use crate::padding::PaddedTensor;
use crate::shape_inference::SpatialConfig;

// =============================================================================
// Convolution
// =============================================================================

/// Convolves `x` (`[N, C, spatial..]`) with `w` (`[M, C / group, k..]`).
///
/// `bias`, when given, holds one value per output channel.
pub fn conv(
    x: &Tensor<f32>,
    w: &Tensor<f32>,
    bias: Option<&Tensor<f32>>,
    config: &SpatialConfig,
    group: usize,
) -> OnnxResult<Tensor<f32>> {
    let x_shape = x.shape();
    let w_shape = w.shape();
    if x_shape.len() < 3 || w_shape.len() != x_shape.len() {
        return Err(OnnxError::InvalidShape(format!(
            "Conv needs matching [N, C, ..] input and [M, C/g, ..] weight, got {x_shape:?} and {w_shape:?}"
        )));
    }

    let (batch, in_channels) = (x_shape[0], x_shape[1]);
    let out_channels = w_shape[0];
    if group == 0 || in_channels % group != 0 || out_channels % group != 0 {
        return Err(OnnxError::InvalidAttribute(
            "group".to_string(),
            format!("{group} does not divide {in_channels} input and {out_channels} output channels"),
        ));
    }
    let in_per_group = in_channels / group;
    let out_per_group = out_channels / group;
    if w_shape[1] != in_per_group {
        return Err(OnnxError::InvalidShape(format!(
            "weight has {} input channels, expected {in_per_group}",
            w_shape[1]
        )));
    }
    if config.kernel_shape != w_shape[2..] {
        return Err(OnnxError::InvalidShape(format!(
            "kernel_shape {:?} disagrees with weight {:?}",
            config.kernel_shape, w_shape
        )));
    }

    let bias_values = match bias {
        Some(b) if b.numel() != out_channels => {
            return Err(OnnxError::InvalidShape(format!(
                "bias has {} values for {out_channels} output channels",
                b.numel()
            )))
        }
        Some(b) => b.to_vec(),
        None => vec![0.0; out_channels],
    };

    let geometry = config.resolve(&x_shape[2..])?;
    let padded = PaddedTensor::new(x, &geometry.pads_begin, &geometry.pads_end)?;
    let values = padded.values();
    let padded_spatial = padded.spatial_shape();
    let plane_size = numel(padded_spatial);
    let plane_strides = contiguous_strides(padded_spatial);

    let kernel = &config.kernel_shape;
    let kernel_volume = numel(kernel);
    let weights = w.as_slice();

    let mut out_shape = vec![batch, out_channels];
    out_shape.extend_from_slice(&geometry.output_shape);

    let mut output = Vec::with_capacity(numel(&out_shape));
    let mut position = vec![0usize; kernel.len()];

    for idx in IndexIter::new(&out_shape) {
        let (n, m) = (idx[0], idx[1]);
        let g = m / out_per_group;
        let mut acc = f64::from(bias_values[m]);

        for ci in 0..in_per_group {
            let c = g * in_per_group + ci;
            let plane = (n * in_channels + c) * plane_size;
            let w_base = (m * in_per_group + ci) * kernel_volume;

            for (k_linear, k) in IndexIter::new(kernel).enumerate() {
                for i in 0..k.len() {
                    position[i] = idx[i + 2] * config.strides[i] + k[i] * config.dilations[i];
                }
                let v = values[plane + linear_index(&position, &plane_strides)];
                acc += f64::from(v) * f64::from(weights[w_base + k_linear]);
            }
        }

        output.push(acc as f32);
    }

    Ok(Tensor::from_vec(output, &out_shape)?)
}

// =============================================================================
// Tests
// =============================================================================
