//! ONNX Operator Descriptors
//!
//! Rust mirrors of the ONNX `NodeProto` and `AttributeProto` messages, trimmed
//! to the attribute kinds operator descriptors actually carry. Descriptors
//! round-trip through JSON so a case can be stored next to its tensors.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use serde::{Deserialize, Serialize};

use crate::error::OnnxResult;

// =============================================================================
// Attributes
// =============================================================================

/// Attribute type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AttributeType {
    /// Undefined attribute.
    Undefined = 0,
    /// Float value.
    Float = 1,
    /// Integer value.
    Int = 2,
    /// String value.
    String = 3,
    /// Float array.
    Floats = 6,
    /// Integer array.
    Ints = 7,
}

/// An attribute of an ONNX operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeProto {
    /// Attribute name.
    pub name: String,
    /// Attribute type.
    pub r#type: i32,
    /// Float value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f: Option<f32>,
    /// Integer value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i: Option<i64>,
    /// String value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<Vec<u8>>,
    /// Float array.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub floats: Vec<f32>,
    /// Integer array.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ints: Vec<i64>,
}

impl AttributeProto {
    fn empty(name: &str, kind: AttributeType) -> Self {
        Self {
            name: name.to_string(),
            r#type: kind as i32,
            f: None,
            i: None,
            s: None,
            floats: Vec::new(),
            ints: Vec::new(),
        }
    }

    /// Creates an integer attribute.
    pub fn int(name: &str, value: i64) -> Self {
        Self {
            i: Some(value),
            ..Self::empty(name, AttributeType::Int)
        }
    }

    /// Creates a float attribute.
    pub fn float(name: &str, value: f32) -> Self {
        Self {
            f: Some(value),
            ..Self::empty(name, AttributeType::Float)
        }
    }

    /// Creates a string attribute.
    pub fn string(name: &str, value: &str) -> Self {
        Self {
            s: Some(value.as_bytes().to_vec()),
            ..Self::empty(name, AttributeType::String)
        }
    }

    /// Creates an integer array attribute.
    pub fn ints(name: &str, values: Vec<i64>) -> Self {
        Self {
            ints: values,
            ..Self::empty(name, AttributeType::Ints)
        }
    }

    /// Creates a float array attribute.
    pub fn floats(name: &str, values: Vec<f32>) -> Self {
        Self {
            floats: values,
            ..Self::empty(name, AttributeType::Floats)
        }
    }

    /// Gets the string value.
    pub fn get_string(&self) -> Option<String> {
        self.s
            .as_ref()
            .and_then(|bytes| String::from_utf8(bytes.clone()).ok())
    }
}

// =============================================================================
// Node (Operator)
// =============================================================================

/// A single ONNX operator with named inputs, outputs and attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProto {
    /// Input tensor names.
    pub input: Vec<String>,
    /// Output tensor names.
    pub output: Vec<String>,
    /// Node name (optional, for debugging).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Operator type (e.g., "Conv", "MaxPool", "Concat").
    pub op_type: String,
    /// Operator attributes.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attribute: Vec<AttributeProto>,
}

impl NodeProto {
    /// Creates a node with no attributes.
    pub fn new(op_type: &str, inputs: &[&str], outputs: &[&str]) -> Self {
        Self {
            input: inputs.iter().map(|s| (*s).to_string()).collect(),
            output: outputs.iter().map(|s| (*s).to_string()).collect(),
            name: None,
            op_type: op_type.to_string(),
            attribute: Vec::new(),
        }
    }

    /// Adds an attribute, replacing any previous one with the same name.
    pub fn with_attribute(mut self, attr: AttributeProto) -> Self {
        self.attribute.retain(|a| a.name != attr.name);
        self.attribute.push(attr);
        self
    }

    /// Adds an integer attribute.
    pub fn with_int(self, name: &str, value: i64) -> Self {
        self.with_attribute(AttributeProto::int(name, value))
    }

    /// Adds an integer array attribute.
    pub fn with_ints(self, name: &str, values: &[i64]) -> Self {
        self.with_attribute(AttributeProto::ints(name, values.to_vec()))
    }

    /// Adds a float attribute.
    pub fn with_float(self, name: &str, value: f32) -> Self {
        self.with_attribute(AttributeProto::float(name, value))
    }

    /// Adds a string attribute.
    pub fn with_string(self, name: &str, value: &str) -> Self {
        self.with_attribute(AttributeProto::string(name, value))
    }

    /// Gets an attribute by name.
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeProto> {
        self.attribute.iter().find(|a| a.name == name)
    }

    /// Gets an integer attribute by name.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get_attribute(name).and_then(|a| a.i)
    }

    /// Gets a float attribute by name.
    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.get_attribute(name).and_then(|a| a.f)
    }

    /// Gets an integer array attribute by name.
    pub fn get_ints(&self, name: &str) -> Option<&[i64]> {
        self.get_attribute(name).map(|a| a.ints.as_slice())
    }

    /// Gets a string attribute by name.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get_attribute(name).and_then(AttributeProto::get_string)
    }

    /// Parses a node from JSON.
    pub fn from_json(text: &str) -> OnnxResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the node to JSON.
    pub fn to_json(&self) -> OnnxResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// =============================================================================
// Tests
// =============================================================================
