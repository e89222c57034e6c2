//! Shape and Strides - Tensor Dimension Management
//!
//! Provides types and functions for shape arithmetic, axis normalization,
//! `NumPy` broadcasting and rank-generic index iteration. Every reference
//! operator walks its output through these helpers instead of relying on
//! implicit array broadcasting.
//!
//! # Key Features
//! - Small-vector shape representation
//! - Row-major stride computation and index conversion
//! - Broadcasting aligned from the trailing axis
//! - Lazy, restartable multi-index generator for any rank
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use smallvec::SmallVec;

use refcheck_core::error::{Error, Result};

// =============================================================================
// Type Aliases
// =============================================================================

/// Shape type - dimensions of a tensor.
/// Uses `SmallVec` for stack allocation of small shapes (up to 6 dimensions).
pub type Shape = SmallVec<[usize; 6]>;

/// Strides type - step sizes for each dimension.
pub type Strides = SmallVec<[usize; 6]>;

// =============================================================================
// Shape Utilities
// =============================================================================

/// Computes the total number of elements from a shape.
///
/// The empty shape describes a scalar and has one element.
#[must_use]
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Computes row-major (C-order) strides for a shape.
#[must_use]
pub fn contiguous_strides(shape: &[usize]) -> Strides {
    let mut strides = Strides::from_elem(0, shape.len());
    let mut stride = 1usize;

    // Compute strides from right to left
    for (i, &dim) in shape.iter().enumerate().rev() {
        strides[i] = stride;
        stride *= dim;
    }

    strides
}

/// Computes the linear offset of multi-dimensional indices.
#[must_use]
pub fn linear_index(indices: &[usize], strides: &[usize]) -> usize {
    debug_assert_eq!(indices.len(), strides.len());

    indices
        .iter()
        .zip(strides.iter())
        .map(|(&idx, &stride)| idx * stride)
        .sum()
}

/// Converts a linear index to multi-dimensional indices.
#[must_use]
pub fn unravel_index(mut linear: usize, shape: &[usize]) -> Shape {
    let mut indices = Shape::from_elem(0, shape.len());

    for (i, &dim) in shape.iter().enumerate().rev() {
        if dim == 0 {
            continue;
        }
        indices[i] = linear % dim;
        linear /= dim;
    }

    indices
}

/// Resolves a possibly negative axis against a rank.
///
/// `-1` addresses the last axis, `-ndim` the first. Anything outside
/// `[-ndim, ndim)` is an [`Error::InvalidDimension`].
pub fn normalize_axis(axis: i64, ndim: usize) -> Result<usize> {
    let rank = ndim as i64;
    let resolved = if axis < 0 { axis + rank } else { axis };

    if resolved < 0 || resolved >= rank {
        return Err(Error::InvalidDimension { index: axis, ndim });
    }

    Ok(resolved as usize)
}

// =============================================================================
// Broadcasting
// =============================================================================

/// Computes the broadcast shape of two shapes.
///
/// Broadcasting follows `NumPy` rules:
/// 1. Shapes are aligned from the right
/// 2. Dimensions are compatible if equal or one of them is 1
/// 3. Missing dimensions are treated as 1
pub fn broadcast_shape(shape1: &[usize], shape2: &[usize]) -> Result<Shape> {
    let max_ndim = shape1.len().max(shape2.len());
    let mut result = Shape::with_capacity(max_ndim);

    // Iterate from right to left
    for i in 0..max_ndim {
        let d1 = if i < shape1.len() {
            shape1[shape1.len() - 1 - i]
        } else {
            1
        };

        let d2 = if i < shape2.len() {
            shape2[shape2.len() - 1 - i]
        } else {
            1
        };

        if d1 == d2 || d2 == 1 {
            result.push(d1);
        } else if d1 == 1 {
            result.push(d2);
        } else {
            return Err(Error::broadcast(shape1, shape2));
        }
    }

    result.reverse();
    Ok(result)
}

/// Computes strides that read `shape` as if it had `target_shape`.
///
/// Leading axes missing from `shape` and axes of extent 1 that are stretched
/// get stride 0, so every index along them maps to the same element.
#[must_use]
pub fn broadcast_strides(shape: &[usize], target_shape: &[usize]) -> Strides {
    let strides = contiguous_strides(shape);
    let shape_offset = target_shape.len() - shape.len();
    let mut result = Strides::with_capacity(target_shape.len());

    for (i, &target_dim) in target_shape.iter().enumerate() {
        if i < shape_offset {
            result.push(0);
        } else {
            let orig_idx = i - shape_offset;
            if shape[orig_idx] == 1 && target_dim != 1 {
                result.push(0);
            } else {
                result.push(strides[orig_idx]);
            }
        }
    }

    result
}

// =============================================================================
// Index Iteration
// =============================================================================

/// Lazy row-major iterator over every multi-index of an extent.
///
/// The last axis varies fastest. An extent containing a zero yields nothing;
/// the empty extent yields exactly one empty index. Cloning the iterator or
/// calling [`IndexIter::reset`] restarts the sequence.
#[derive(Debug, Clone)]
pub struct IndexIter {
    extents: Shape,
    next: Option<Shape>,
}

impl IndexIter {
    /// Creates an iterator over all indices within `extents`.
    #[must_use]
    pub fn new(extents: &[usize]) -> Self {
        let mut iter = Self {
            extents: Shape::from_slice(extents),
            next: None,
        };
        iter.reset();
        iter
    }

    /// Rewinds the iterator to the first index.
    pub fn reset(&mut self) {
        self.next = if self.extents.contains(&0) {
            None
        } else {
            Some(Shape::from_elem(0, self.extents.len()))
        };
    }

    /// Returns the extents being iterated.
    #[must_use]
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    fn successor(&self, current: &Shape) -> Option<Shape> {
        let mut succ = current.clone();
        for axis in (0..succ.len()).rev() {
            succ[axis] += 1;
            if succ[axis] < self.extents[axis] {
                return Some(succ);
            }
            succ[axis] = 0;
        }
        None
    }
}

impl Iterator for IndexIter {
    type Item = Shape;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self.successor(&current);
        Some(current)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numel() {
        assert_eq!(numel(&[2, 3, 4]), 24);
        assert_eq!(numel(&[]), 1);
        assert_eq!(numel(&[3, 0]), 0);
    }

    #[test]
    fn test_contiguous_strides() {
        assert_eq!(contiguous_strides(&[2, 3, 4]).as_slice(), &[12, 4, 1]);
        assert!(contiguous_strides(&[]).is_empty());
    }

    #[test]
    fn test_linear_unravel() {
        let shape = [2, 3, 4];
        let strides = contiguous_strides(&shape);
        for linear in 0..numel(&shape) {
            let idx = unravel_index(linear, &shape);
            assert_eq!(linear_index(&idx, &strides), linear);
        }
        assert_eq!(unravel_index(23, &shape).as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_normalize_axis() {
        assert_eq!(normalize_axis(0, 3).unwrap(), 0);
        assert_eq!(normalize_axis(-1, 3).unwrap(), 2);
        assert_eq!(normalize_axis(-3, 3).unwrap(), 0);
        assert!(normalize_axis(3, 3).is_err());
        assert!(matches!(
            normalize_axis(-4, 3),
            Err(Error::InvalidDimension { index: -4, ndim: 3 })
        ));
    }

    #[test]
    fn test_broadcast_shape() {
        assert_eq!(broadcast_shape(&[3, 4, 5], &[5]).unwrap().as_slice(), &[3, 4, 5]);
        assert_eq!(broadcast_shape(&[2, 1], &[1, 3]).unwrap().as_slice(), &[2, 3]);
        assert_eq!(broadcast_shape(&[], &[2]).unwrap().as_slice(), &[2]);
        assert!(broadcast_shape(&[3, 4], &[5]).is_err());
    }

    #[test]
    fn test_broadcast_strides() {
        assert_eq!(broadcast_strides(&[5], &[3, 4, 5]).as_slice(), &[0, 0, 1]);
        assert_eq!(broadcast_strides(&[3, 1], &[3, 4]).as_slice(), &[1, 0]);
        assert_eq!(broadcast_strides(&[1], &[1]).as_slice(), &[1]);
    }

    #[test]
    fn test_index_iter_row_major() {
        let all: Vec<Vec<usize>> = IndexIter::new(&[2, 3]).map(|i| i.to_vec()).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2],
            ]
        );
    }

    #[test]
    fn test_index_iter_edge_extents() {
        assert_eq!(IndexIter::new(&[]).count(), 1);
        assert_eq!(IndexIter::new(&[4, 0, 2]).count(), 0);
        assert_eq!(IndexIter::new(&[2, 3, 4, 5]).count(), 120);
    }

    #[test]
    fn test_index_iter_restart() {
        let mut iter = IndexIter::new(&[3]);
        let fresh = iter.clone();
        assert_eq!(iter.by_ref().count(), 3);
        assert!(iter.next().is_none());
        iter.reset();
        assert_eq!(iter.count(), 3);
        assert_eq!(fresh.count(), 3);
    }
}
