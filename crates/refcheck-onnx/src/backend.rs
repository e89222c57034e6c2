//! Backends - Single-Node Execution Targets
//!
//! A backend runs one ONNX node against named input tensors and returns its
//! outputs in the order the node lists them. The harness compares any
//! backend against the closed-form references.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use std::collections::HashMap;

use tracing::debug;

use crate::error::OnnxResult;
use crate::operators::create_operator;
use crate::proto::NodeProto;
use crate::value::TensorValue;

// =============================================================================
// Backend Trait
// =============================================================================

/// An operator implementation under test.
pub trait Backend: Send + Sync {
    /// Short identifier shown in reports.
    fn name(&self) -> &str;

    /// Executes `node`, binding its inputs by name from `inputs`.
    fn run_node(
        &self,
        node: &NodeProto,
        inputs: &HashMap<String, TensorValue>,
    ) -> OnnxResult<Vec<TensorValue>>;
}

// =============================================================================
// Reference Backend
// =============================================================================

/// The crate's own operator set, executed on the CPU.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceBackend;

impl ReferenceBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

impl Backend for ReferenceBackend {
    fn name(&self) -> &str {
        "reference"
    }

    fn run_node(
        &self,
        node: &NodeProto,
        inputs: &HashMap<String, TensorValue>,
    ) -> OnnxResult<Vec<TensorValue>> {
        let operator = create_operator(node)?;

        // Empty names mark omitted optional inputs
        let op_inputs: Vec<Option<&TensorValue>> = node
            .input
            .iter()
            .map(|name| {
                if name.is_empty() {
                    None
                } else {
                    inputs.get(name)
                }
            })
            .collect();

        debug!(
            op = operator.name(),
            inputs = op_inputs.iter().filter(|i| i.is_some()).count(),
            "executing node"
        );
        operator.execute(&op_inputs)
    }
}

// =============================================================================
// Tests
// =============================================================================
