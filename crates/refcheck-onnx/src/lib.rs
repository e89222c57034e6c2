//! Refcheck ONNX - Reference Pooling and Operator Conformance
//!
//! Closed-form reference implementations of ONNX pooling, convolution and
//! elementwise operators, plus a harness that runs single nodes on a backend
//! and checks its outputs against those references.
//!
//! # Features
//! - Output-shape and padding inference for `VALID`, `SAME_UPPER`,
//!   `SAME_LOWER` and explicit pads
//! - N-d MAX/AVG pooling over a masked padded input, with argmax indices
//! - Grouped, strided, dilated reference convolution
//! - A built-in conformance suite and a comparison harness that never
//!   tolerates a mismatch
//!
//! # Example
//! ```rust
//! use refcheck_onnx::{run_suite, HarnessConfig, ReferenceBackend};
//!
//! let config = HarnessConfig {
//!     filter: Some("maxpool_2d_precomputed".to_string()),
//!     ..HarnessConfig::default()
//! };
//! let report = run_suite(&ReferenceBackend, &config).unwrap();
//! assert!(report.is_success());
//! ```
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod backend;
pub mod config;
pub mod conv;
pub mod error;
pub mod harness;
pub mod operators;
pub mod padding;
pub mod pool;
pub mod proto;
pub mod shape_inference;
pub mod suite;
pub mod value;

pub use backend::{Backend, ReferenceBackend};
pub use config::HarnessConfig;
pub use conv::conv;
pub use error::{OnnxError, OnnxResult};
pub use harness::{assert_array_almost_equal, expect, DEFAULT_DECIMAL};
pub use operators::{create_operator, OnnxOperator};
pub use padding::PaddedTensor;
pub use pool::{pool, pool_with_argmax, PoolMode, StorageOrder};
pub use proto::{AttributeProto, NodeProto};
pub use shape_inference::{output_shape, pad_shape, split_pads, AutoPad, ResolvedGeometry, SpatialConfig};
pub use suite::{conformance_suite, run_suite, CaseFailure, ConformanceCase, SuiteReport};
pub use value::TensorValue;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_backend_passes_suite() {
        let report = run_suite(&ReferenceBackend, &HarnessConfig::default()).unwrap();
        assert!(report.is_success(), "failures: {:?}", report.failures);
        assert!(report.total() > 40);
    }
}
