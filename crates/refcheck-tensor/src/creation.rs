//! Tensor Creation Functions
//!
//! Factory functions for sequential and random tensors. Random
//! tensors always take an explicit seed so every reference scenario is
//! reproducible from run to run.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::StandardNormal;

use refcheck_core::dtype::Numeric;
use refcheck_core::error::{Error, Result};

use crate::tensor::Tensor;

// =============================================================================
// Range Functions
// =============================================================================

/// Creates a 1D tensor with values from start to end (exclusive) with step.
pub fn arange<T: Numeric>(start: T, end: T, step: T) -> Result<Tensor<T>> {
    if step == T::ZERO {
        return Err(Error::invalid_operation("arange step must be non-zero"));
    }

    let mut data = Vec::new();
    let mut current = start;

    if step > T::ZERO {
        while current < end {
            data.push(current);
            current = current + step;
        }
    } else {
        while current > end {
            data.push(current);
            current = current + step;
        }
    }

    let len = data.len();
    Tensor::from_vec(data, &[len])
}

// =============================================================================
// Seeded Random Functions
// =============================================================================

/// Creates an `f32` tensor of standard-normal samples from a fixed seed.
pub fn randn_seeded(shape: &[usize], seed: u64) -> Result<Tensor<f32>> {
    let numel: usize = shape.iter().product();
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<f32> = (0..numel)
        .map(|_| Distribution::<f32>::sample(&StandardNormal, &mut rng))
        .collect();
    Tensor::from_vec(data, shape)
}

// =============================================================================
// Tests
// =============================================================================
