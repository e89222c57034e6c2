//! Views - Concatenation Along an Axis
//!
//! Concatenation is expressed as a row-major copy split into an outer loop
//! over the axes before the concat axis and an inner block covering the concat
//! axis and everything after it. Negative axes wrap around the rank.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use refcheck_core::dtype::Scalar;
use refcheck_core::error::{Error, Result};

use crate::shape::{normalize_axis, numel, Shape};
use crate::tensor::Tensor;

// =============================================================================
// Concatenation
// =============================================================================

/// Concatenates tensors along an existing axis.
///
/// `axis` may be negative: `-1` is the last axis. All inputs must share the
/// rank and every extent except the one along `axis`.
pub fn cat<T: Scalar>(tensors: &[Tensor<T>], axis: i64) -> Result<Tensor<T>> {
    let first = tensors
        .first()
        .ok_or_else(|| Error::invalid_operation("Cannot concatenate empty list"))?;

    let ndim = first.ndim();
    let dim = normalize_axis(axis, ndim)?;

    // Validate shapes match except for concat dimension
    for t in tensors.iter().skip(1) {
        if t.ndim() != ndim {
            return Err(Error::invalid_operation(
                "All tensors must have same number of dimensions",
            ));
        }
        for (d, (&s1, &s2)) in first.shape().iter().zip(t.shape().iter()).enumerate() {
            if d != dim && s1 != s2 {
                return Err(Error::shape_mismatch(first.shape(), t.shape()));
            }
        }
    }

    let mut output_shape = Shape::from_slice(first.shape());
    output_shape[dim] = tensors.iter().map(|t| t.shape()[dim]).sum();

    let outer: usize = numel(&first.shape()[..dim]);
    let mut output = Vec::with_capacity(numel(&output_shape));

    for o in 0..outer {
        for t in tensors {
            let block = numel(&t.shape()[dim..]);
            output.extend_from_slice(&t.as_slice()[o * block..(o + 1) * block]);
        }
    }

    Tensor::from_vec(output, &output_shape)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn t2(values: &[f32]) -> Tensor<f32> {
        Tensor::from_slice(values, &[2, 2]).unwrap()
    }

    #[test]
    fn test_cat_axis0() {
        let c = cat(&[t2(&[1.0, 2.0, 3.0, 4.0]), t2(&[5.0, 6.0, 7.0, 8.0])], 0).unwrap();
        assert_eq!(c.shape(), &[4, 2]);
        assert_eq!(c.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_cat_axis1() {
        let c = cat(&[t2(&[1.0, 2.0, 3.0, 4.0]), t2(&[5.0, 6.0, 7.0, 8.0])], 1).unwrap();
        assert_eq!(c.shape(), &[2, 4]);
        assert_eq!(c.to_vec(), vec![1.0, 2.0, 5.0, 6.0, 3.0, 4.0, 7.0, 8.0]);
    }

    #[test]
    fn test_cat_negative_axis_matches_positive() {
        let a = Tensor::<f32>::from_vec((0..8).map(|v| v as f32).collect(), &[2, 2, 2]).unwrap();
        let b = Tensor::<f32>::from_vec((8..16).map(|v| v as f32).collect(), &[2, 2, 2]).unwrap();
        for axis in 0..3i64 {
            let pos = cat(&[a.clone(), b.clone()], axis).unwrap();
            let neg = cat(&[a.clone(), b.clone()], axis - 3).unwrap();
            assert_eq!(pos, neg);
        }
    }

    #[test]
    fn test_cat_uneven_extent() {
        let a = Tensor::<i64>::from_vec(vec![1, 2, 3], &[1, 3]).unwrap();
        let b = Tensor::<i64>::from_vec(vec![4, 5, 6, 7, 8, 9], &[2, 3]).unwrap();
        let c = cat(&[a, b], -2).unwrap();
        assert_eq!(c.shape(), &[3, 3]);
        assert_eq!(c.to_vec(), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_cat_errors() {
        let a = Tensor::<f32>::zeros(&[2, 2]);
        let b = Tensor::<f32>::zeros(&[3, 3]);
        assert!(cat::<f32>(&[], 0).is_err());
        assert!(cat(&[a.clone(), b], 0).is_err());
        assert!(cat(&[a.clone(), a.clone()], 2).is_err());
        assert!(cat(&[a.clone(), Tensor::zeros(&[2])], 0).is_err());
    }
}
