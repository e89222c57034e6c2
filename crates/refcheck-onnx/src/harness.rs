//! Harness - Reference Versus Backend Comparison
//!
//! Runs one node on a backend and checks every output against its
//! closed-form reference. Floating-point outputs agree when
//! `|expected - actual| < 1.5 * 10^-decimal` holds element-wise. Integer
//! outputs (argmax indices) must match exactly. Any disagreement is an
//! error, never a warning.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use std::collections::HashMap;

use tracing::debug;

use refcheck_tensor::shape::unravel_index;
use refcheck_tensor::Tensor;

use crate::backend::Backend;
use crate::error::{OnnxError, OnnxResult};
use crate::proto::NodeProto;
use crate::value::TensorValue;

/// Default number of decimals outputs must agree to.
pub const DEFAULT_DECIMAL: u32 = 5;

// =============================================================================
// Array Comparison
// =============================================================================

/// Absolute tolerance for a decimal count.
pub fn tolerance(decimal: u32) -> f64 {
    1.5 * 10f64.powi(-(decimal as i32))
}

/// Checks that two tensors agree to `decimal` places.
///
/// Shapes and element types must match. NaN in the reference only matches
/// NaN in the backend output.
pub fn assert_array_almost_equal(
    output: &str,
    expected: &TensorValue,
    actual: &TensorValue,
    decimal: u32,
) -> OnnxResult<()> {
    if expected.shape() != actual.shape() {
        return Err(OnnxError::OutputMismatch(format!(
            "{output}: expected shape {:?}, got {:?}",
            expected.shape(),
            actual.shape()
        )));
    }

    match (expected, actual) {
        (TensorValue::F32(e), TensorValue::F32(a)) => compare_f32(output, e, a, tolerance(decimal)),
        (TensorValue::I64(e), TensorValue::I64(a)) => compare_i64(output, e, a),
        _ => Err(OnnxError::OutputMismatch(format!(
            "{output}: expected dtype {}, got {}",
            expected.dtype(),
            actual.dtype()
        ))),
    }
}

fn compare_f32(output: &str, expected: &Tensor<f32>, actual: &Tensor<f32>, tol: f64) -> OnnxResult<()> {
    let pairs = expected.as_slice().iter().zip(actual.as_slice());
    for (i, (&e, &a)) in pairs.enumerate() {
        let (e, a) = (f64::from(e), f64::from(a));
        let agree = if e.is_nan() || a.is_nan() {
            e.is_nan() && a.is_nan()
        } else {
            e == a || (e - a).abs() < tol
        };
        if !agree {
            return Err(OnnxError::ComparisonFailure {
                output: output.to_string(),
                index: unravel_index(i, expected.shape()).to_vec(),
                expected: e,
                actual: a,
                delta: (e - a).abs(),
            });
        }
    }
    Ok(())
}

fn compare_i64(output: &str, expected: &Tensor<i64>, actual: &Tensor<i64>) -> OnnxResult<()> {
    let pairs = expected.as_slice().iter().zip(actual.as_slice());
    match pairs.enumerate().find(|(_, (e, a))| e != a) {
        Some((i, (&e, &a))) => Err(OnnxError::ComparisonFailure {
            output: output.to_string(),
            index: unravel_index(i, expected.shape()).to_vec(),
            expected: e as f64,
            actual: a as f64,
            delta: (e - a).unsigned_abs() as f64,
        }),
        None => Ok(()),
    }
}

// =============================================================================
// Single-Node Expectation
// =============================================================================

/// Runs `node` on `backend` and compares each output with `expected`.
///
/// `inputs` are bound positionally to `node.input`; `expected` lines up with
/// `node.output`. A backend that returns a different number of outputs fails.
pub fn expect(
    backend: &dyn Backend,
    node: &NodeProto,
    inputs: &[TensorValue],
    expected: &[TensorValue],
    name: &str,
    decimal: u32,
) -> OnnxResult<()> {
    if inputs.len() != node.input.len() {
        return Err(OnnxError::shape_mismatch(
            format!("{name} inputs"),
            node.input.len(),
            inputs.len(),
        ));
    }

    let bound: HashMap<String, TensorValue> = node
        .input
        .iter()
        .cloned()
        .zip(inputs.iter().cloned())
        .collect();

    debug!(case = name, backend = backend.name(), op = %node.op_type, "running case");
    let outputs = backend.run_node(node, &bound)?;

    if outputs.len() != expected.len() {
        return Err(OnnxError::OutputMismatch(format!(
            "{name}: expected {} outputs, backend returned {}",
            expected.len(),
            outputs.len()
        )));
    }

    for (i, (e, a)) in expected.iter().zip(&outputs).enumerate() {
        let output = node
            .output
            .get(i)
            .map_or_else(|| format!("output {i}"), Clone::clone);
        assert_array_almost_equal(&format!("{name}/{output}"), e, a, decimal)?;
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
