//! Pooling - Reference Windowed Reduction
//!
//! Slides a kernel over a [`PaddedTensor`] and reduces each placement with
//! MAX or AVG. Every output position is computed from the immutable padded
//! input alone, so positions are evaluated in parallel once the output is
//! large enough.
//!
//! # Semantics
//! - Masked-out cells (padding) and NaN data are missing values. MAX never
//!   selects them and AVG never counts them in its divisor.
//! - With `count_include_pad`, AVG divides by the full kernel volume and the
//!   padding contributes zero to the sum.
//! - A window with no usable value yields NaN (argmax `-1`).
//! - MAX ties keep the first winner in row-major window order.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use tracing::trace;

use refcheck_tensor::shape::{contiguous_strides, linear_index, numel, unravel_index};
use refcheck_tensor::{IndexIter, Tensor};

use crate::error::{OnnxError, OnnxResult};
use crate::padding::PaddedTensor;

/// Threshold for using parallel processing (in output elements)
pub const PARALLEL_THRESHOLD: usize = 4096;

// =============================================================================
// Modes
// =============================================================================

/// Window reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolMode {
    /// Largest value in the window.
    Max,
    /// Mean of the window.
    Avg,
}

impl FromStr for PoolMode {
    type Err = OnnxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MAX" => Ok(Self::Max),
            "AVG" => Ok(Self::Avg),
            _ => Err(OnnxError::UnsupportedReductionMode(s.to_string())),
        }
    }
}

impl fmt::Display for PoolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => f.write_str("MAX"),
            Self::Avg => f.write_str("AVG"),
        }
    }
}

/// Flattening order of argmax indices over the unpadded spatial axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageOrder {
    /// Last spatial axis varies fastest (`storage_order = 0`).
    #[default]
    RowMajor,
    /// First spatial axis varies fastest (`storage_order = 1`).
    ColumnMajor,
}

impl TryFrom<i64> for StorageOrder {
    type Error = OnnxError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::RowMajor),
            1 => Ok(Self::ColumnMajor),
            other => Err(OnnxError::InvalidAttribute(
                "storage_order".to_string(),
                other.to_string(),
            )),
        }
    }
}

// =============================================================================
// Window Geometry
// =============================================================================

/// Precomputed addressing shared by every output position.
struct Geometry<'a> {
    padded: &'a PaddedTensor,
    channels: usize,
    out_full: Vec<usize>,
    kernel: &'a [usize],
    kernel_volume: usize,
    strides: &'a [usize],
    padded_spatial_strides: Vec<usize>,
    padded_spatial_volume: usize,
    input_spatial: Vec<usize>,
    input_spatial_volume: usize,
}

/// Result of reducing one window.
#[derive(Debug, Clone, Copy)]
struct Reduced {
    value: f32,
    argmax: i64,
}

impl Geometry<'_> {
    fn reduce(
        &self,
        out_linear: usize,
        mode: PoolMode,
        count_include_pad: bool,
        order: StorageOrder,
    ) -> Reduced {
        let out_idx = unravel_index(out_linear, &self.out_full);
        let (n, c) = (out_idx[0], out_idx[1]);
        let plane = (n * self.channels + c) * self.padded_spatial_volume;
        let values = self.padded.values();
        let mask = self.padded.mask();

        let mut sum = 0.0f64;
        let mut count = 0usize;
        let mut best: Option<(f32, Vec<usize>)> = None;
        let mut position = vec![0usize; self.kernel.len()];

        for k in IndexIter::new(self.kernel) {
            for i in 0..k.len() {
                position[i] = self.strides[i] * out_idx[i + 2] + k[i];
            }
            let offset = plane + linear_index(&position, &self.padded_spatial_strides);
            if !mask[offset] || values[offset].is_nan() {
                continue;
            }

            let v = values[offset];
            match mode {
                PoolMode::Avg => {
                    sum += f64::from(v);
                    count += 1;
                }
                PoolMode::Max => {
                    if best.as_ref().map_or(true, |(b, _)| v > *b) {
                        best = Some((v, position.clone()));
                    }
                }
            }
        }

        match mode {
            PoolMode::Avg => {
                let divisor = if count_include_pad {
                    self.kernel_volume
                } else {
                    count
                };
                let value = if divisor == 0 {
                    f32::NAN
                } else {
                    (sum / divisor as f64) as f32
                };
                Reduced { value, argmax: -1 }
            }
            PoolMode::Max => match best {
                Some((value, winner)) => Reduced {
                    value,
                    argmax: self.flatten_argmax(n, c, &winner, order),
                },
                None => Reduced {
                    value: f32::NAN,
                    argmax: -1,
                },
            },
        }
    }

    /// Flattens a padded winner position to its offset in the unpadded input.
    fn flatten_argmax(&self, n: usize, c: usize, padded_pos: &[usize], order: StorageOrder) -> i64 {
        let pads_begin = self.padded.pads_begin();
        let unpadded: Vec<usize> = padded_pos
            .iter()
            .zip(pads_begin)
            .map(|(&p, &b)| p - b)
            .collect();

        let spatial_offset = match order {
            StorageOrder::RowMajor => {
                linear_index(&unpadded, &contiguous_strides(&self.input_spatial))
            }
            StorageOrder::ColumnMajor => {
                let mut offset = 0;
                let mut stride = 1;
                for (&u, &extent) in unpadded.iter().zip(&self.input_spatial) {
                    offset += u * stride;
                    stride *= extent;
                }
                offset
            }
        };

        ((n * self.channels + c) * self.input_spatial_volume + spatial_offset) as i64
    }
}

// =============================================================================
// Pooling
// =============================================================================

/// Reduces every window of `padded` and returns the `f32` output.
///
/// `input_shape` is the full unpadded `[N, C, spatial..]` shape; `pad_shape`
/// is the total padding per spatial axis and `output_shape` the number of
/// window placements per spatial axis. Exactly `output_shape[i]` placements
/// are visited along axis `i`.
pub fn pool(
    padded: &PaddedTensor,
    input_shape: &[usize],
    kernel_shape: &[usize],
    strides: &[usize],
    output_shape: &[usize],
    pad_shape: &[usize],
    mode: PoolMode,
    count_include_pad: bool,
) -> OnnxResult<Tensor<f32>> {
    let geometry = check_geometry(
        padded,
        input_shape,
        kernel_shape,
        strides,
        output_shape,
        pad_shape,
    )?;
    let reduced = run(&geometry, mode, count_include_pad, StorageOrder::RowMajor);
    let values = reduced.iter().map(|r| r.value).collect();
    Ok(Tensor::from_vec(values, &geometry.out_full)?)
}

/// MAX pooling that also reports where each maximum came from.
///
/// Indices address the unpadded input flattened as
/// `(n * C + c) * spatial_volume + spatial_offset`, with the spatial offset
/// taken in `order`.
pub fn pool_with_argmax(
    padded: &PaddedTensor,
    input_shape: &[usize],
    kernel_shape: &[usize],
    strides: &[usize],
    output_shape: &[usize],
    pad_shape: &[usize],
    order: StorageOrder,
) -> OnnxResult<(Tensor<f32>, Tensor<i64>)> {
    let geometry = check_geometry(
        padded,
        input_shape,
        kernel_shape,
        strides,
        output_shape,
        pad_shape,
    )?;
    let reduced = run(&geometry, PoolMode::Max, false, order);
    let values = reduced.iter().map(|r| r.value).collect();
    let indices = reduced.iter().map(|r| r.argmax).collect();
    Ok((
        Tensor::from_vec(values, &geometry.out_full)?,
        Tensor::from_vec(indices, &geometry.out_full)?,
    ))
}

fn run(
    geometry: &Geometry<'_>,
    mode: PoolMode,
    count_include_pad: bool,
    order: StorageOrder,
) -> Vec<Reduced> {
    let total = numel(&geometry.out_full);
    let mut out = vec![
        Reduced {
            value: 0.0,
            argmax: -1
        };
        total
    ];

    if total >= PARALLEL_THRESHOLD {
        out.par_iter_mut().enumerate().for_each(|(o, r)| {
            *r = geometry.reduce(o, mode, count_include_pad, order);
        });
    } else {
        for (o, r) in out.iter_mut().enumerate() {
            *r = geometry.reduce(o, mode, count_include_pad, order);
        }
    }

    trace!(mode = %mode, outputs = total, "pooled");
    out
}

fn check_geometry<'a>(
    padded: &'a PaddedTensor,
    input_shape: &[usize],
    kernel_shape: &'a [usize],
    strides: &'a [usize],
    output_shape: &[usize],
    pad_shape: &[usize],
) -> OnnxResult<Geometry<'a>> {
    if input_shape.len() < 3 {
        return Err(OnnxError::InvalidShape(format!(
            "expected [N, C, spatial..] input, got {input_shape:?}"
        )));
    }
    let spatial_rank = input_shape.len() - 2;
    for (what, len) in [
        ("kernel_shape", kernel_shape.len()),
        ("strides", strides.len()),
        ("output_shape", output_shape.len()),
        ("pad_shape", pad_shape.len()),
    ] {
        if len != spatial_rank {
            return Err(OnnxError::shape_mismatch(what, spatial_rank, len));
        }
    }
    if padded.shape().len() != input_shape.len() || padded.shape()[..2] != input_shape[..2] {
        return Err(OnnxError::InvalidShape(format!(
            "padded tensor {:?} does not match input {:?}",
            padded.shape(),
            input_shape
        )));
    }

    let padded_spatial = padded.spatial_shape();
    for i in 0..spatial_rank {
        let expected = input_shape[i + 2] + pad_shape[i];
        if padded_spatial[i] != expected {
            return Err(OnnxError::InvalidShape(format!(
                "padded extent {} on spatial axis {i}, expected {expected}",
                padded_spatial[i]
            )));
        }
        if strides[i] == 0 || kernel_shape[i] == 0 {
            return Err(OnnxError::InvalidShape(
                "kernel and strides must be positive".to_string(),
            ));
        }
        if output_shape[i] > 0
            && (output_shape[i] - 1) * strides[i] + kernel_shape[i] > padded_spatial[i]
        {
            return Err(OnnxError::InvalidShape(format!(
                "{} windows of size {} stride {} overrun padded extent {} on axis {i}",
                output_shape[i], kernel_shape[i], strides[i], padded_spatial[i]
            )));
        }
    }

    let input_spatial = input_shape[2..].to_vec();
    let mut out_full = input_shape[..2].to_vec();
    out_full.extend_from_slice(output_shape);

    Ok(Geometry {
        padded,
        channels: input_shape[1],
        out_full,
        kernel: kernel_shape,
        kernel_volume: numel(kernel_shape),
        strides,
        padded_spatial_strides: contiguous_strides(padded_spatial).to_vec(),
        padded_spatial_volume: numel(padded_spatial),
        input_spatial_volume: numel(&input_spatial),
        input_spatial,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use refcheck_tensor::arange;

    fn seq_5x5() -> Tensor<f32> {
        arange(1.0f32, 26.0, 1.0)
            .unwrap()
            .reshape(&[1, 1, 5, 5])
            .unwrap()
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("MAX".parse::<PoolMode>().unwrap(), PoolMode::Max);
        assert_eq!("AVG".parse::<PoolMode>().unwrap(), PoolMode::Avg);
        let err = "avg".parse::<PoolMode>().unwrap_err();
        assert!(matches!(err, OnnxError::UnsupportedReductionMode(ref m) if m == "avg"));
        assert!("Max".parse::<PoolMode>().is_err());
        let err = "LP".parse::<PoolMode>().unwrap_err();
        assert!(matches!(err, OnnxError::UnsupportedReductionMode(ref m) if m == "LP"));
    }

    #[test]
    fn test_storage_order_parse() {
        assert_eq!(StorageOrder::try_from(0).unwrap(), StorageOrder::RowMajor);
        assert_eq!(StorageOrder::try_from(1).unwrap(), StorageOrder::ColumnMajor);
        assert!(StorageOrder::try_from(2).is_err());
    }

    #[test]
    #[rustfmt::skip]
    fn test_full_matrices_5x5() {
        let x = seq_5x5();

        let padded = PaddedTensor::new(&x, &[2, 2], &[2, 2]).unwrap();
        let max = pool(&padded, x.shape(), &[5, 5], &[1, 1], &[5, 5], &[4, 4], PoolMode::Max, false)
            .unwrap();
        assert_eq!(max.to_vec(), vec![
            13.0, 14.0, 15.0, 15.0, 15.0,
            18.0, 19.0, 20.0, 20.0, 20.0,
            23.0, 24.0, 25.0, 25.0, 25.0,
            23.0, 24.0, 25.0, 25.0, 25.0,
            23.0, 24.0, 25.0, 25.0, 25.0,
        ]);
        let avg = pool(&padded, x.shape(), &[5, 5], &[1, 1], &[5, 5], &[4, 4], PoolMode::Avg, false)
            .unwrap();
        assert_eq!(avg.to_vec(), vec![
            7.0, 7.5, 8.0, 8.5, 9.0,
            9.5, 10.0, 10.5, 11.0, 11.5,
            12.0, 12.5, 13.0, 13.5, 14.0,
            14.5, 15.0, 15.5, 16.0, 16.5,
            17.0, 17.5, 18.0, 18.5, 19.0,
        ]);

        // SAME_UPPER, 3x3 kernel, stride 2: one cell of padding on each side.
        let padded = PaddedTensor::new(&x, &[1, 1], &[1, 1]).unwrap();
        let max = pool(&padded, x.shape(), &[3, 3], &[2, 2], &[3, 3], &[2, 2], PoolMode::Max, false)
            .unwrap();
        assert_eq!(max.to_vec(), vec![7.0, 9.0, 10.0, 17.0, 19.0, 20.0, 22.0, 24.0, 25.0]);
        let avg = pool(&padded, x.shape(), &[3, 3], &[2, 2], &[3, 3], &[2, 2], PoolMode::Avg, false)
            .unwrap();
        assert_eq!(avg.to_vec(), vec![4.0, 5.5, 7.0, 11.5, 13.0, 14.5, 19.0, 20.5, 22.0]);
    }

    #[test]
    fn test_avg_excludes_padding() {
        let x = seq_5x5();
        let padded = PaddedTensor::new(&x, &[2, 2], &[2, 2]).unwrap();
        let y = pool(&padded, x.shape(), &[5, 5], &[1, 1], &[5, 5], &[4, 4], PoolMode::Avg, false)
            .unwrap();
        assert_eq!(y.shape(), &[1, 1, 5, 5]);
        assert_eq!(y.get(&[0, 0, 0, 0]).unwrap(), 7.0);
        assert_eq!(y.get(&[0, 0, 2, 2]).unwrap(), 13.0);
        assert_eq!(y.get(&[0, 0, 4, 4]).unwrap(), 19.0);
    }

    #[test]
    fn test_avg_count_include_pad() {
        let x = seq_5x5();
        let padded = PaddedTensor::new(&x, &[2, 2], &[2, 2]).unwrap();
        let y = pool(&padded, x.shape(), &[5, 5], &[1, 1], &[5, 5], &[4, 4], PoolMode::Avg, true)
            .unwrap();
        // Top-left window holds 1,2,3,6,7,8,11,12,13 and 16 padding cells.
        assert!((y.get(&[0, 0, 0, 0]).unwrap() - 63.0 / 25.0).abs() < 1e-6);
        assert_eq!(y.get(&[0, 0, 2, 2]).unwrap(), 13.0);
    }

    #[test]
    fn test_max_strided() {
        let x = seq_5x5();
        let padded = PaddedTensor::new(&x, &[0, 0], &[0, 0]).unwrap();
        let y = pool(&padded, x.shape(), &[2, 2], &[2, 2], &[2, 2], &[0, 0], PoolMode::Max, false)
            .unwrap();
        assert_eq!(y.to_vec(), vec![7.0, 9.0, 17.0, 19.0]);
    }

    #[test]
    fn test_argmax_orders() {
        let x = seq_5x5();
        let padded = PaddedTensor::new(&x, &[0, 0], &[0, 0]).unwrap();
        let (y, rows) = pool_with_argmax(
            &padded,
            x.shape(),
            &[2, 2],
            &[2, 2],
            &[2, 2],
            &[0, 0],
            StorageOrder::RowMajor,
        )
        .unwrap();
        assert_eq!(y.to_vec(), vec![7.0, 9.0, 17.0, 19.0]);
        assert_eq!(rows.to_vec(), vec![6, 8, 16, 18]);

        let (_, cols) = pool_with_argmax(
            &padded,
            x.shape(),
            &[2, 2],
            &[2, 2],
            &[2, 2],
            &[0, 0],
            StorageOrder::ColumnMajor,
        )
        .unwrap();
        assert_eq!(cols.to_vec(), vec![6, 16, 8, 18]);
    }

    #[test]
    fn test_argmax_ignores_padding_offset() {
        let x = seq_5x5();
        let padded = PaddedTensor::new(&x, &[2, 2], &[2, 2]).unwrap();
        let (_, idx) = pool_with_argmax(
            &padded,
            x.shape(),
            &[5, 5],
            &[1, 1],
            &[5, 5],
            &[4, 4],
            StorageOrder::RowMajor,
        )
        .unwrap();
        assert_eq!(idx.get(&[0, 0, 0, 0]).unwrap(), 12);
        assert_eq!(idx.get(&[0, 0, 4, 4]).unwrap(), 24);
    }

    #[test]
    fn test_argmax_batch_channel_offset() {
        let x = arange(0.0f32, 16.0, 1.0)
            .unwrap()
            .reshape(&[2, 2, 2, 2])
            .unwrap();
        let padded = PaddedTensor::new(&x, &[0, 0], &[0, 0]).unwrap();
        let (y, idx) = pool_with_argmax(
            &padded,
            x.shape(),
            &[2, 2],
            &[1, 1],
            &[1, 1],
            &[0, 0],
            StorageOrder::RowMajor,
        )
        .unwrap();
        assert_eq!(y.to_vec(), vec![3.0, 7.0, 11.0, 15.0]);
        assert_eq!(idx.to_vec(), vec![3, 7, 11, 15]);
    }

    #[test]
    fn test_max_tie_keeps_first() {
        let x = Tensor::full(&[1, 1, 2, 2], 1.0f32);
        let padded = PaddedTensor::new(&x, &[0, 0], &[0, 0]).unwrap();
        let (_, idx) = pool_with_argmax(
            &padded,
            x.shape(),
            &[2, 2],
            &[1, 1],
            &[1, 1],
            &[0, 0],
            StorageOrder::RowMajor,
        )
        .unwrap();
        assert_eq!(idx.to_vec(), vec![0]);
    }

    #[test]
    fn test_nan_data_is_skipped() {
        let x = Tensor::from_vec(vec![f32::NAN, 2.0, f32::NAN, 4.0], &[1, 1, 4]).unwrap();
        let padded = PaddedTensor::new(&x, &[0], &[0]).unwrap();
        let y = pool(&padded, x.shape(), &[2], &[2], &[2], &[0], PoolMode::Max, false).unwrap();
        assert_eq!(y.to_vec(), vec![2.0, 4.0]);
        let y = pool(&padded, x.shape(), &[2], &[2], &[2], &[0], PoolMode::Avg, false).unwrap();
        assert_eq!(y.to_vec(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_all_missing_window_is_nan() {
        let x = Tensor::from_vec(vec![1.0], &[1, 1, 1]).unwrap();
        let padded = PaddedTensor::new(&x, &[2], &[0]).unwrap();
        let (y, idx) = pool_with_argmax(
            &padded,
            x.shape(),
            &[1],
            &[1],
            &[3],
            &[2],
            StorageOrder::RowMajor,
        )
        .unwrap();
        assert!(y.as_slice()[0].is_nan());
        assert_eq!(y.as_slice()[2], 1.0);
        assert_eq!(idx.to_vec(), vec![-1, -1, 0]);
    }

    #[test]
    fn test_three_spatial_axes() {
        let x = arange(0.0f32, 27.0, 1.0)
            .unwrap()
            .reshape(&[1, 1, 3, 3, 3])
            .unwrap();
        let padded = PaddedTensor::new(&x, &[0, 0, 0], &[0, 0, 0]).unwrap();
        let y = pool(
            &padded,
            x.shape(),
            &[2, 2, 2],
            &[1, 1, 1],
            &[2, 2, 2],
            &[0, 0, 0],
            PoolMode::Max,
            false,
        )
        .unwrap();
        assert_eq!(y.to_vec(), vec![13.0, 14.0, 16.0, 17.0, 22.0, 23.0, 25.0, 26.0]);
    }

    #[test]
    fn test_parallel_matches_sequential_geometry() {
        // 1x2x70x70 with k2 s1 gives 2 * 69 * 69 outputs, above the threshold.
        let x = arange(0.0f32, 9800.0, 1.0)
            .unwrap()
            .reshape(&[1, 2, 70, 70])
            .unwrap();
        let padded = PaddedTensor::new(&x, &[0, 0], &[0, 0]).unwrap();
        let y = pool(&padded, x.shape(), &[2, 2], &[1, 1], &[69, 69], &[0, 0], PoolMode::Max, false)
            .unwrap();
        assert!(y.numel() >= PARALLEL_THRESHOLD);
        assert_eq!(y.get(&[0, 0, 0, 0]).unwrap(), 71.0);
        assert_eq!(y.get(&[0, 1, 68, 68]).unwrap(), 9799.0);
    }

    #[test]
    fn test_rejects_inconsistent_geometry() {
        let x = seq_5x5();
        let padded = PaddedTensor::new(&x, &[1, 1], &[1, 1]).unwrap();
        // pad_shape disagrees with the padded extent
        assert!(pool(&padded, x.shape(), &[3, 3], &[1, 1], &[5, 5], &[0, 0], PoolMode::Max, false)
            .is_err());
        // too many windows
        assert!(pool(&padded, x.shape(), &[3, 3], &[1, 1], &[6, 6], &[2, 2], PoolMode::Max, false)
            .is_err());
        // rank mismatch
        assert!(matches!(
            pool(&padded, x.shape(), &[3], &[1, 1], &[5, 5], &[2, 2], PoolMode::Max, false),
            Err(OnnxError::ShapeMismatch { .. })
        ));
    }
}
