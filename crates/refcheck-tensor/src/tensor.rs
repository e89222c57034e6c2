//! Tensor - Owned N-Dimensional Array
//!
//! The `Tensor` struct holds its elements in a contiguous row-major `Vec`
//! together with a fixed shape. There is no view machinery and no shared
//! storage: cloning copies, every operation allocates its result, and a
//! tensor's rank and extents never change after construction.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use core::fmt;

use refcheck_core::dtype::{Numeric, Scalar};
use refcheck_core::error::{Error, Result};

use crate::shape::{
    broadcast_shape, broadcast_strides, contiguous_strides, linear_index, numel, IndexIter, Shape,
    Strides,
};

// =============================================================================
// Tensor Struct
// =============================================================================

/// An owned N-dimensional array of `T` in row-major order.
#[derive(Clone, PartialEq)]
pub struct Tensor<T: Scalar> {
    data: Vec<T>,
    shape: Shape,
}

impl<T: Scalar> Tensor<T> {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a tensor from a vector and a shape.
    ///
    /// Fails with a shape mismatch when `data.len()` differs from the number
    /// of elements the shape describes.
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        let expected = numel(shape);
        if data.len() != expected {
            return Err(Error::shape_mismatch(&[expected], &[data.len()]));
        }

        Ok(Self {
            data,
            shape: Shape::from_slice(shape),
        })
    }

    /// Creates a tensor by copying a slice.
    pub fn from_slice(data: &[T], shape: &[usize]) -> Result<Self> {
        Self::from_vec(data.to_vec(), shape)
    }

    /// Creates a rank-0 tensor holding one value.
    #[must_use]
    pub fn scalar(value: T) -> Self {
        Self {
            data: vec![value],
            shape: Shape::new(),
        }
    }

    /// Creates a tensor with every element set to `value`.
    #[must_use]
    pub fn full(shape: &[usize], value: T) -> Self {
        Self {
            data: vec![value; numel(shape)],
            shape: Shape::from_slice(shape),
        }
    }

    /// Creates a tensor of zero bits (0 for every supported element type).
    #[must_use]
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, T::zeroed())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the shape of the tensor.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the tensor holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if this is a rank-0 tensor.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Returns the row-major strides of the tensor.
    #[must_use]
    pub fn strides(&self) -> Strides {
        contiguous_strides(&self.shape)
    }

    /// Returns the element at the given multi-dimensional index.
    pub fn get(&self, indices: &[usize]) -> Result<T> {
        if indices.len() != self.ndim() {
            return Err(Error::invalid_operation(format!(
                "Expected {} indices, got {}",
                self.ndim(),
                indices.len()
            )));
        }

        for (&idx, &dim) in indices.iter().zip(self.shape.iter()) {
            if idx >= dim {
                return Err(Error::IndexOutOfBounds {
                    index: idx,
                    size: dim,
                });
            }
        }

        Ok(self.data[linear_index(indices, &self.strides())])
    }

    /// Returns the single value of a one-element tensor.
    pub fn item(&self) -> Result<T> {
        match self.data.as_slice() {
            [value] => Ok(*value),
            [] => Err(Error::EmptyTensor),
            _ => Err(Error::invalid_operation(format!(
                "item() requires a single element, tensor has {}",
                self.numel()
            ))),
        }
    }

    /// Returns the elements as a row-major slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns a copy of the elements in row-major order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.data.clone()
    }

    // =========================================================================
    // Transformations
    // =========================================================================

    /// Returns a tensor with the same elements under a new shape.
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        if numel(shape) != self.numel() {
            return Err(Error::shape_mismatch(shape, &self.shape));
        }
        Self::from_vec(self.data.clone(), shape)
    }

    /// Applies `f` to every element, producing a tensor of the same shape.
    #[must_use]
    pub fn map<U: Scalar>(&self, f: impl Fn(T) -> U) -> Tensor<U> {
        Tensor {
            data: self.data.iter().map(|&v| f(v)).collect(),
            shape: self.shape.clone(),
        }
    }

    /// Promotes every element to `f32`.
    #[must_use]
    pub fn to_f32(&self) -> Tensor<f32> {
        self.map(Scalar::to_f32)
    }

    /// Materializes this tensor broadcast to `target` shape.
    pub fn broadcast_to(&self, target: &[usize]) -> Result<Self> {
        let result_shape = broadcast_shape(&self.shape, target)?;
        if result_shape.as_slice() != target {
            return Err(Error::broadcast(&self.shape, target));
        }

        let strides = broadcast_strides(&self.shape, target);
        let data = IndexIter::new(target)
            .map(|idx| self.data[linear_index(&idx, &strides)])
            .collect();

        Self::from_vec(data, target)
    }
}

// =============================================================================
// Arithmetic Operations
// =============================================================================

impl<T: Numeric> Tensor<T> {
    /// Combines two tensors element-wise under `NumPy` broadcasting.
    pub fn zip_with(&self, other: &Self, f: impl Fn(T, T) -> T) -> Result<Self> {
        let result_shape = broadcast_shape(&self.shape, &other.shape)?;
        let self_strides = broadcast_strides(&self.shape, &result_shape);
        let other_strides = broadcast_strides(&other.shape, &result_shape);

        let result_data = IndexIter::new(&result_shape)
            .map(|idx| {
                let a = self.data[linear_index(&idx, &self_strides)];
                let b = other.data[linear_index(&idx, &other_strides)];
                f(a, b)
            })
            .collect();

        Self::from_vec(result_data, &result_shape)
    }

    /// Element-wise addition with broadcasting.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Element-wise subtraction with broadcasting.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Element-wise multiplication with broadcasting.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a * b)
    }
}

// =============================================================================
// Formatting
// =============================================================================

impl<T: Scalar + fmt::Display> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor(shape={:?}, dtype={}", self.shape(), T::DTYPE)?;
        if self.numel() <= 10 {
            write!(f, ", data={:?}", self.data)?;
        }
        write!(f, ")")
    }
}

impl<T: Scalar + fmt::Display> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scalar() {
            write!(f, "{}", self.data[0])
        } else if self.ndim() == 1 {
            write!(f, "[")?;
            for (i, val) in self.data.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{val}")?;
            }
            write!(f, "]")
        } else {
            write!(f, "Tensor(shape={:?})", self.shape())
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec() {
        let t = Tensor::<f32>::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.numel(), 6);
        assert_eq!(t.ndim(), 2);
    }

    #[test]
    fn test_from_vec_wrong_length() {
        let err = Tensor::<f32>::from_vec(vec![1.0, 2.0], &[3]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_get() {
        let t = Tensor::<f32>::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        assert_eq!(t.get(&[0, 0]).unwrap(), 1.0);
        assert_eq!(t.get(&[0, 1]).unwrap(), 2.0);
        assert_eq!(t.get(&[1, 0]).unwrap(), 3.0);
        assert_eq!(t.get(&[1, 1]).unwrap(), 4.0);
        assert!(t.get(&[2, 0]).is_err());
        assert!(t.get(&[0]).is_err());
    }

    #[test]
    fn test_scalar_and_item() {
        let s = Tensor::scalar(7i64);
        assert!(s.is_scalar());
        assert_eq!(s.item().unwrap(), 7);
        assert_eq!(s.get(&[]).unwrap(), 7);
        assert!(Tensor::<f32>::zeros(&[2]).item().is_err());
    }

    #[test]
    fn test_reshape() {
        let t = Tensor::<f32>::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        let r = t.reshape(&[3, 2]).unwrap();
        assert_eq!(r.shape(), &[3, 2]);
        assert_eq!(t.shape(), &[2, 3]);
        assert!(t.reshape(&[4]).is_err());
    }

    #[test]
    fn test_to_f32_promotion() {
        let t = Tensor::<i64>::from_vec(vec![1, -2, 3], &[3]).unwrap();
        assert_eq!(t.to_f32().to_vec(), vec![1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_arithmetic() {
        let a = Tensor::<f32>::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let b = Tensor::<f32>::from_vec(vec![4.0, 5.0, 6.0], &[3]).unwrap();

        assert_eq!(a.add(&b).unwrap().to_vec(), vec![5.0, 7.0, 9.0]);
        assert_eq!(a.sub(&b).unwrap().to_vec(), vec![-3.0, -3.0, -3.0]);
        assert_eq!(a.mul(&b).unwrap().to_vec(), vec![4.0, 10.0, 18.0]);
    }

    #[test]
    fn test_broadcasting() {
        let a = Tensor::<f32>::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        let b = Tensor::<f32>::from_vec(vec![10.0, 20.0, 30.0], &[3]).unwrap();

        let c = a.add(&b).unwrap();
        assert_eq!(c.shape(), &[2, 3]);
        assert_eq!(c.to_vec(), vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);

        // Commutative under broadcasting
        assert_eq!(b.add(&a).unwrap(), c);
    }

    #[test]
    fn test_broadcasting_both_sides() {
        let col = Tensor::<i64>::from_vec(vec![1, 2], &[2, 1]).unwrap();
        let row = Tensor::<i64>::from_vec(vec![10, 20, 30], &[1, 3]).unwrap();
        let c = col.add(&row).unwrap();
        assert_eq!(c.shape(), &[2, 3]);
        assert_eq!(c.to_vec(), vec![11, 21, 31, 12, 22, 32]);
    }

    #[test]
    fn test_broadcast_incompatible() {
        let a = Tensor::<f32>::zeros(&[3, 4]);
        let b = Tensor::<f32>::zeros(&[5]);
        assert!(matches!(a.add(&b), Err(Error::BroadcastError { .. })));
    }

    #[test]
    fn test_broadcast_to() {
        let b = Tensor::<f32>::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        let t = b.broadcast_to(&[2, 2]).unwrap();
        assert_eq!(t.to_vec(), vec![1.0, 2.0, 1.0, 2.0]);
        assert!(b.broadcast_to(&[3]).is_err());
    }

    #[test]
    fn test_display() {
        let t = Tensor::<f32>::from_vec(vec![1.0, 2.5], &[2]).unwrap();
        assert_eq!(t.to_string(), "[1, 2.5]");
        assert!(format!("{t:?}").contains("dtype=f32"));
    }
}
