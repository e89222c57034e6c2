//! Operations - N-ary Element-wise Reductions Over Tensor Lists
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use refcheck_core::dtype::Numeric;
use refcheck_core::error::{Error, Result};

use crate::tensor::Tensor;

// =============================================================================
// Sum
// =============================================================================

/// Element-wise sum of any number of tensors.
///
/// Inputs are folded left to right with broadcasting [`Tensor::add`], so the
/// result has the broadcast shape of all operands. A single input is returned
/// as a copy.
pub fn sum<T: Numeric>(tensors: &[Tensor<T>]) -> Result<Tensor<T>> {
    let (first, rest) = tensors
        .split_first()
        .ok_or_else(|| Error::invalid_operation("Sum requires at least one input"))?;

    rest.iter().try_fold(first.clone(), |acc, t| acc.add(t))
}

// =============================================================================
// Tests
// =============================================================================
