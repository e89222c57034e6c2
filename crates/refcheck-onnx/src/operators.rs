//! ONNX Operator Implementations
//!
//! Executable operators behind [`ReferenceBackend`](crate::backend::ReferenceBackend).
//! Pooling and convolution walk the unpadded input with bounds-checked
//! coordinates rather than materializing padding, so they share no code
//! path with the reference reducer they are compared against.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use std::fmt::Debug;

use refcheck_tensor::shape::{contiguous_strides, linear_index, numel};
use refcheck_tensor::{cat, sum, IndexIter, Tensor};

use crate::error::{OnnxError, OnnxResult};
use crate::pool::StorageOrder;
use crate::proto::NodeProto;
use crate::shape_inference::SpatialConfig;
use crate::value::TensorValue;

// =============================================================================
// Helper Functions
// =============================================================================

/// Fetches a required positional input.
fn required<'a>(
    inputs: &[Option<&'a TensorValue>],
    index: usize,
    name: &str,
) -> OnnxResult<&'a TensorValue> {
    inputs
        .get(index)
        .and_then(|i| *i)
        .ok_or_else(|| OnnxError::MissingInput(name.to_string()))
}

/// Inputs that all share one element type.
enum Homogeneous {
    F32(Vec<Tensor<f32>>),
    I64(Vec<Tensor<i64>>),
}

fn homogeneous(op: &str, inputs: &[Option<&TensorValue>]) -> OnnxResult<Homogeneous> {
    let present: Vec<&TensorValue> = inputs.iter().filter_map(|i| *i).collect();
    let first = present
        .first()
        .ok_or_else(|| OnnxError::MissingInput(format!("{op} needs at least one input")))?;

    match first {
        TensorValue::F32(_) => present
            .iter()
            .map(|v| v.as_f32().cloned())
            .collect::<OnnxResult<Vec<_>>>()
            .map(Homogeneous::F32),
        TensorValue::I64(_) => present
            .iter()
            .map(|v| v.as_i64().cloned())
            .collect::<OnnxResult<Vec<_>>>()
            .map(Homogeneous::I64),
    }
}

/// Maps an output position and kernel tap to an unpadded input coordinate.
///
/// Writes the coordinate into `coord` and returns false when the tap lands
/// in padding.
fn tap(
    out: &[usize],
    k: &[usize],
    config: &SpatialConfig,
    pads_begin: &[usize],
    extent: &[usize],
    coord: &mut [usize],
) -> bool {
    for i in 0..coord.len() {
        let padded = out[i] * config.strides[i] + k[i] * config.dilations[i];
        if padded < pads_begin[i] || padded - pads_begin[i] >= extent[i] {
            return false;
        }
        coord[i] = padded - pads_begin[i];
    }
    true
}

fn spatial_input(op: &str, x: &Tensor<f32>, spatial_rank: usize) -> OnnxResult<()> {
    if x.ndim() != spatial_rank + 2 {
        return Err(OnnxError::InvalidShape(format!(
            "{op} with {spatial_rank} spatial axes requires [N, C, ..] input of rank {}, got {:?}",
            spatial_rank + 2,
            x.shape()
        )));
    }
    Ok(())
}

// =============================================================================
// Operator Trait
// =============================================================================

/// Trait for ONNX operator implementations.
pub trait OnnxOperator: Debug + Send + Sync {
    /// Executes the operator with the given inputs.
    fn execute(&self, inputs: &[Option<&TensorValue>]) -> OnnxResult<Vec<TensorValue>>;

    /// Returns the operator name.
    fn name(&self) -> &str;
}

// =============================================================================
// Operator Factory
// =============================================================================

/// Creates an operator from an ONNX node.
pub fn create_operator(node: &NodeProto) -> OnnxResult<Box<dyn OnnxOperator>> {
    match node.op_type.as_str() {
        // Math operations
        "Add" => Ok(Box::new(AddOp)),
        "Sum" => Ok(Box::new(SumOp)),

        // Shape operations
        "Concat" => Ok(Box::new(ConcatOp::from_node(node)?)),

        // Neural network operations
        "Conv" => Ok(Box::new(ConvOp::from_node(node)?)),
        "MaxPool" => Ok(Box::new(MaxPoolOp::from_node(node)?)),
        "AveragePool" => Ok(Box::new(AvgPoolOp::from_node(node)?)),

        _ => Err(OnnxError::UnsupportedOperator(node.op_type.clone())),
    }
}

// =============================================================================
// Math Operators
// =============================================================================

/// Element-wise addition
#[derive(Debug)]
pub struct AddOp;

impl OnnxOperator for AddOp {
    fn execute(&self, inputs: &[Option<&TensorValue>]) -> OnnxResult<Vec<TensorValue>> {
        let a = required(inputs, 0, "A")?;
        let b = required(inputs, 1, "B")?;

        let out = match (a, b) {
            (TensorValue::F32(a), TensorValue::F32(b)) => TensorValue::F32(a.add(b)?),
            (TensorValue::I64(a), TensorValue::I64(b)) => TensorValue::I64(a.add(b)?),
            _ => {
                return Err(OnnxError::TensorConversion(format!(
                    "Add operands differ in type: {} and {}",
                    a.dtype(),
                    b.dtype()
                )))
            }
        };
        Ok(vec![out])
    }

    fn name(&self) -> &str {
        "Add"
    }
}

/// Element-wise sum of any number of inputs
#[derive(Debug)]
pub struct SumOp;

impl OnnxOperator for SumOp {
    fn execute(&self, inputs: &[Option<&TensorValue>]) -> OnnxResult<Vec<TensorValue>> {
        let out = match homogeneous("Sum", inputs)? {
            Homogeneous::F32(tensors) => TensorValue::F32(sum(&tensors)?),
            Homogeneous::I64(tensors) => TensorValue::I64(sum(&tensors)?),
        };
        Ok(vec![out])
    }

    fn name(&self) -> &str {
        "Sum"
    }
}

// =============================================================================
// Shape Operators
// =============================================================================

/// Concat operator
#[derive(Debug)]
pub struct ConcatOp {
    axis: i64,
}

impl ConcatOp {
    fn from_node(node: &NodeProto) -> OnnxResult<Self> {
        let axis = node
            .get_int("axis")
            .ok_or_else(|| OnnxError::MissingAttribute("axis".to_string()))?;
        Ok(Self { axis })
    }
}

impl OnnxOperator for ConcatOp {
    fn execute(&self, inputs: &[Option<&TensorValue>]) -> OnnxResult<Vec<TensorValue>> {
        let out = match homogeneous("Concat", inputs)? {
            Homogeneous::F32(tensors) => TensorValue::F32(cat(&tensors, self.axis)?),
            Homogeneous::I64(tensors) => TensorValue::I64(cat(&tensors, self.axis)?),
        };
        Ok(vec![out])
    }

    fn name(&self) -> &str {
        "Concat"
    }
}

// =============================================================================
// Neural Network Operators
// =============================================================================

/// Conv operator - N-d grouped convolution
#[derive(Debug)]
pub struct ConvOp {
    node: NodeProto,
    group: usize,
}

impl ConvOp {
    fn from_node(node: &NodeProto) -> OnnxResult<Self> {
        let group = node.get_int("group").unwrap_or(1);
        let group = usize::try_from(group)
            .ok()
            .filter(|&g| g > 0)
            .ok_or_else(|| OnnxError::InvalidAttribute("group".to_string(), group.to_string()))?;
        Ok(Self {
            node: node.clone(),
            group,
        })
    }
}

impl OnnxOperator for ConvOp {
    fn execute(&self, inputs: &[Option<&TensorValue>]) -> OnnxResult<Vec<TensorValue>> {
        let input = required(inputs, 0, "X")?.to_f32();
        let weight = required(inputs, 1, "W")?.to_f32();
        let bias = inputs.get(2).and_then(|i| *i).map(TensorValue::to_f32);

        // Input shape: [batch, in_channels, spatial..]
        // Weight shape: [out_channels, in_channels/group, kernel..]
        let input_shape = input.shape();
        let weight_shape = weight.shape();
        if weight_shape.len() < 3 {
            return Err(OnnxError::InvalidShape(format!(
                "Conv weight must be [M, C/g, kernel..], got {weight_shape:?}"
            )));
        }
        let spatial_rank = weight_shape.len() - 2;
        spatial_input("Conv", &input, spatial_rank)?;

        let config = SpatialConfig::from_node_with_kernel(&self.node, &weight_shape[2..])?;
        let geometry = config.resolve(&input_shape[2..])?;

        let batch = input_shape[0];
        let in_channels = input_shape[1];
        let out_channels = weight_shape[0];
        let group = self.group;
        if in_channels % group != 0
            || out_channels % group != 0
            || weight_shape[1] * group != in_channels
        {
            return Err(OnnxError::InvalidShape(format!(
                "Conv channels {in_channels} -> {out_channels} incompatible with group {group} and weight {weight_shape:?}"
            )));
        }
        let in_channels_per_group = in_channels / group;
        let out_channels_per_group = out_channels / group;

        let bias_data = match bias {
            Some(b) if b.numel() != out_channels => {
                return Err(OnnxError::InvalidShape(format!(
                    "Conv bias has {} values for {out_channels} output channels",
                    b.numel()
                )))
            }
            Some(b) => Some(b.to_vec()),
            None => None,
        };

        let in_spatial = &input_shape[2..];
        let in_strides = contiguous_strides(in_spatial);
        let in_plane = numel(in_spatial);
        let kernel_volume = numel(&config.kernel_shape);
        let input_data = input.as_slice();
        let weight_data = weight.as_slice();

        let mut out_shape = vec![batch, out_channels];
        out_shape.extend_from_slice(&geometry.output_shape);
        let mut output = Vec::with_capacity(numel(&out_shape));
        let mut coord = vec![0usize; spatial_rank];

        for idx in IndexIter::new(&out_shape) {
            let (b, out_c) = (idx[0], idx[1]);
            let g = out_c / out_channels_per_group;
            let mut sum = 0.0f32;

            for ic in 0..in_channels_per_group {
                let in_c = g * in_channels_per_group + ic;
                let in_base = (b * in_channels + in_c) * in_plane;
                let w_base = (out_c * in_channels_per_group + ic) * kernel_volume;

                for (kl, k) in IndexIter::new(&config.kernel_shape).enumerate() {
                    if tap(&idx[2..], &k, &config, &geometry.pads_begin, in_spatial, &mut coord) {
                        sum += input_data[in_base + linear_index(&coord, &in_strides)]
                            * weight_data[w_base + kl];
                    }
                }
            }

            // Add bias if present
            if let Some(ref bias) = bias_data {
                sum += bias[out_c];
            }
            output.push(sum);
        }

        Ok(vec![Tensor::from_vec(output, &out_shape)?.into()])
    }

    fn name(&self) -> &str {
        "Conv"
    }
}

/// MaxPool operator - N-d max pooling with optional indices output
#[derive(Debug)]
pub struct MaxPoolOp {
    config: SpatialConfig,
    storage_order: StorageOrder,
    with_indices: bool,
}

impl MaxPoolOp {
    fn from_node(node: &NodeProto) -> OnnxResult<Self> {
        let rank = node.get_ints("kernel_shape").map_or(0, <[i64]>::len);
        Ok(Self {
            config: SpatialConfig::from_node(node, rank)?,
            storage_order: StorageOrder::try_from(node.get_int("storage_order").unwrap_or(0))?,
            with_indices: node.output.get(1).is_some_and(|name| !name.is_empty()),
        })
    }
}

impl OnnxOperator for MaxPoolOp {
    fn execute(&self, inputs: &[Option<&TensorValue>]) -> OnnxResult<Vec<TensorValue>> {
        let x = required(inputs, 0, "X")?.to_f32();
        let spatial_rank = self.config.kernel_shape.len();
        spatial_input("MaxPool", &x, spatial_rank)?;

        let shape = x.shape();
        let geometry = self.config.resolve(&shape[2..])?;
        let in_spatial = &shape[2..];
        let in_strides = contiguous_strides(in_spatial);
        let in_plane = numel(in_spatial);
        let x_data = x.as_slice();

        let mut out_shape = shape[..2].to_vec();
        out_shape.extend_from_slice(&geometry.output_shape);
        let total = numel(&out_shape);
        let mut output = Vec::with_capacity(total);
        let mut indices = Vec::with_capacity(total);
        let mut coord = vec![0usize; spatial_rank];

        for idx in IndexIter::new(&out_shape) {
            let plane = idx[0] * shape[1] + idx[1];
            let mut best: Option<(f32, usize)> = None;

            for k in IndexIter::new(&self.config.kernel_shape) {
                if !tap(&idx[2..], &k, &self.config, &geometry.pads_begin, in_spatial, &mut coord) {
                    continue;
                }
                let v = x_data[plane * in_plane + linear_index(&coord, &in_strides)];
                if v.is_nan() || best.is_some_and(|(m, _)| v <= m) {
                    continue;
                }
                let offset = match self.storage_order {
                    StorageOrder::RowMajor => linear_index(&coord, &in_strides),
                    StorageOrder::ColumnMajor => coord
                        .iter()
                        .zip(in_spatial)
                        .rev()
                        .fold(0, |acc, (&c, &extent)| acc * extent + c),
                };
                best = Some((v, plane * in_plane + offset));
            }

            match best {
                Some((v, i)) => {
                    output.push(v);
                    indices.push(i as i64);
                }
                None => {
                    output.push(f32::NAN);
                    indices.push(-1);
                }
            }
        }

        let mut outputs: Vec<TensorValue> = vec![Tensor::from_vec(output, &out_shape)?.into()];
        if self.with_indices {
            outputs.push(Tensor::from_vec(indices, &out_shape)?.into());
        }
        Ok(outputs)
    }

    fn name(&self) -> &str {
        "MaxPool"
    }
}

/// AveragePool operator - N-d average pooling
#[derive(Debug)]
pub struct AvgPoolOp {
    config: SpatialConfig,
    count_include_pad: bool,
}

impl AvgPoolOp {
    fn from_node(node: &NodeProto) -> OnnxResult<Self> {
        let rank = node.get_ints("kernel_shape").map_or(0, <[i64]>::len);
        Ok(Self {
            config: SpatialConfig::from_node(node, rank)?,
            count_include_pad: node.get_int("count_include_pad").unwrap_or(0) != 0,
        })
    }
}

impl OnnxOperator for AvgPoolOp {
    fn execute(&self, inputs: &[Option<&TensorValue>]) -> OnnxResult<Vec<TensorValue>> {
        let x = required(inputs, 0, "X")?.to_f32();
        let spatial_rank = self.config.kernel_shape.len();
        spatial_input("AveragePool", &x, spatial_rank)?;

        let shape = x.shape();
        let geometry = self.config.resolve(&shape[2..])?;
        let in_spatial = &shape[2..];
        let in_strides = contiguous_strides(in_spatial);
        let in_plane = numel(in_spatial);
        let kernel_volume = numel(&self.config.kernel_shape);
        let x_data = x.as_slice();

        let mut out_shape = shape[..2].to_vec();
        out_shape.extend_from_slice(&geometry.output_shape);
        let mut output = Vec::with_capacity(numel(&out_shape));
        let mut coord = vec![0usize; spatial_rank];

        for idx in IndexIter::new(&out_shape) {
            let base = (idx[0] * shape[1] + idx[1]) * in_plane;
            let mut sum = 0.0f32;
            let mut count = 0usize;

            for k in IndexIter::new(&self.config.kernel_shape) {
                if tap(&idx[2..], &k, &self.config, &geometry.pads_begin, in_spatial, &mut coord) {
                    let v = x_data[base + linear_index(&coord, &in_strides)];
                    if !v.is_nan() {
                        sum += v;
                        count += 1;
                    }
                }
            }

            let divisor = if self.count_include_pad {
                kernel_volume
            } else {
                count
            };
            output.push(if divisor > 0 {
                sum / divisor as f32
            } else {
                f32::NAN
            });
        }

        Ok(vec![Tensor::from_vec(output, &out_shape)?.into()])
    }

    fn name(&self) -> &str {
        "AveragePool"
    }
}

// =============================================================================
// Tests
// =============================================================================
