//! ONNX Error Types
//!
//! Error types for descriptor parsing, shape inference, reference
//! computation and backend comparison.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use thiserror::Error;

/// Result type for ONNX operations.
pub type OnnxResult<T> = Result<T, OnnxError>;

/// Errors that can occur during ONNX operations.
#[derive(Error, Debug)]
pub enum OnnxError {
    /// Unsupported ONNX operator.
    #[error("Unsupported ONNX operator: {0}")]
    UnsupportedOperator(String),

    /// Pooling mode outside MAX and AVG.
    #[error("Unsupported reduction mode: {0} (expected MAX or AVG)")]
    UnsupportedReductionMode(String),

    /// A kernel, stride, pad or dilation vector disagrees with the spatial rank.
    #[error("Shape mismatch: {what} has {actual} entries, expected {expected}")]
    ShapeMismatch {
        /// Which attribute or tensor disagreed.
        what: String,
        /// The expected length.
        expected: usize,
        /// The actual length.
        actual: usize,
    },

    /// Invalid tensor shape.
    #[error("Invalid tensor shape: {0}")]
    InvalidShape(String),

    /// Missing required attribute.
    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    /// Missing required input tensor.
    #[error("Missing required input: {0}")]
    MissingInput(String),

    /// Invalid attribute value.
    #[error("Invalid attribute value for {0}: {1}")]
    InvalidAttribute(String, String),

    /// Tensor held the wrong element type.
    #[error("Tensor conversion error: {0}")]
    TensorConversion(String),

    /// Reference and backend outputs differ beyond tolerance.
    #[error(
        "Comparison failure in {output} at {index:?}: expected {expected}, got {actual} (delta {delta})"
    )]
    ComparisonFailure {
        /// Name of the output being compared.
        output: String,
        /// Multi-index of the first mismatching element.
        index: Vec<usize>,
        /// Reference value.
        expected: f64,
        /// Backend value.
        actual: f64,
        /// Absolute difference.
        delta: f64,
    },

    /// Reference and backend outputs disagree in count, shape or dtype.
    #[error("Output mismatch: {0}")]
    OutputMismatch(String),

    /// Tensor-level failure.
    #[error("Tensor error: {0}")]
    Tensor(#[from] refcheck_core::Error),

    /// Descriptor (de)serialization failure.
    #[error("Descriptor serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OnnxError {
    /// Creates a shape mismatch for an attribute vector.
    pub fn shape_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// Returns true if this error reports a backend disagreement rather than
    /// a malformed case.
    pub fn is_comparison_failure(&self) -> bool {
        matches!(
            self,
            Self::ComparisonFailure { .. } | Self::OutputMismatch(_)
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
