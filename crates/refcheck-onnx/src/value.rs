//! Tensor Values - Dynamically Typed Operator Inputs and Outputs
//!
//! Operators exchange `f32` data tensors and `i64` index tensors. Integer
//! data reaching a pooling or convolution operator is promoted to `f32`.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use std::fmt;

use refcheck_core::DType;
use refcheck_tensor::Tensor;

use crate::error::{OnnxError, OnnxResult};

/// A tensor of one of the element types operators exchange.
#[derive(Clone, PartialEq)]
pub enum TensorValue {
    /// 32-bit float data.
    F32(Tensor<f32>),
    /// 64-bit integer data or indices.
    I64(Tensor<i64>),
}

impl TensorValue {
    /// Returns the shape.
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::F32(t) => t.shape(),
            Self::I64(t) => t.shape(),
        }
    }

    /// Returns the element type.
    pub fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::I64(_) => DType::I64,
        }
    }

    /// Borrows the `f32` tensor, failing for any other element type.
    pub fn as_f32(&self) -> OnnxResult<&Tensor<f32>> {
        match self {
            Self::F32(t) => Ok(t),
            Self::I64(_) => Err(OnnxError::TensorConversion(
                "expected f32 tensor, got i64".to_string(),
            )),
        }
    }

    /// Borrows the `i64` tensor, failing for any other element type.
    pub fn as_i64(&self) -> OnnxResult<&Tensor<i64>> {
        match self {
            Self::I64(t) => Ok(t),
            Self::F32(_) => Err(OnnxError::TensorConversion(
                "expected i64 tensor, got f32".to_string(),
            )),
        }
    }

    /// Returns the data as `f32`, promoting integers.
    pub fn to_f32(&self) -> Tensor<f32> {
        match self {
            Self::F32(t) => t.clone(),
            Self::I64(t) => t.to_f32(),
        }
    }
}

impl From<Tensor<f32>> for TensorValue {
    fn from(t: Tensor<f32>) -> Self {
        Self::F32(t)
    }
}

impl From<Tensor<i64>> for TensorValue {
    fn from(t: Tensor<i64>) -> Self {
        Self::I64(t)
    }
}

impl fmt::Debug for TensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32(t) => fmt::Debug::fmt(t, f),
            Self::I64(t) => fmt::Debug::fmt(t, f),
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
    fn test_dtype_and_access() {
        let v: TensorValue = Tensor::from_vec(vec![1i64, 2], &[2]).unwrap().into();
        assert_eq!(v.dtype(), DType::I64);
        assert_eq!(v.shape(), &[2]);
        assert!(v.as_f32().is_err());
        assert_eq!(v.as_i64().unwrap().to_vec(), vec![1, 2]);
        assert_eq!(v.to_f32().to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_debug_forwards() {
        let v = TensorValue::F32(Tensor::from_vec(vec![1.0], &[1]).unwrap());
        assert!(format!("{v:?}").contains("dtype=f32"));
    }
}
