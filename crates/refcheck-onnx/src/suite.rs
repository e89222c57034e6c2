//! Suite - Built-In Conformance Cases
//!
//! Every case is one ONNX node, its inputs and the outputs a conforming
//! backend must produce. Small cases, including every Concat and Sum case,
//! carry hand-computed literals. Random pooling and convolution cases derive
//! their expectations from the reference engine ([`pool`], [`conv`]); random
//! Add cases from a flat elementwise loop. All randomness is seeded so a run
//! is reproducible.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use rayon::prelude::*;
use tracing::{info, warn};

use refcheck_tensor::{arange, randn_seeded, Tensor};

use crate::backend::Backend;
use crate::config::HarnessConfig;
use crate::conv::conv;
use crate::error::{OnnxError, OnnxResult};
use crate::harness::expect;
use crate::padding::PaddedTensor;
use crate::pool::{pool, pool_with_argmax, PoolMode, StorageOrder};
use crate::proto::NodeProto;
use crate::shape_inference::SpatialConfig;
use crate::value::TensorValue;

// =============================================================================
// Cases
// =============================================================================

/// One node with its inputs and expected outputs.
#[derive(Debug, Clone)]
pub struct ConformanceCase {
    /// Unique case name.
    pub name: String,
    /// The node under test.
    pub node: NodeProto,
    /// Inputs in `node.input` order.
    pub inputs: Vec<TensorValue>,
    /// Expected outputs in `node.output` order.
    pub expected: Vec<TensorValue>,
}

impl ConformanceCase {
    fn new(
        name: impl Into<String>,
        node: NodeProto,
        inputs: Vec<TensorValue>,
        expected: Vec<TensorValue>,
    ) -> Self {
        Self {
            name: name.into(),
            node,
            inputs,
            expected,
        }
    }

    /// Runs the case on `backend`.
    pub fn run(&self, backend: &dyn Backend, decimal: u32) -> OnnxResult<()> {
        expect(
            backend,
            &self.node,
            &self.inputs,
            &self.expected,
            &self.name,
            decimal,
        )
    }
}

// =============================================================================
// Reference Helpers
// =============================================================================

fn f32_tensor(data: &[f32], shape: &[usize]) -> OnnxResult<Tensor<f32>> {
    Ok(Tensor::from_slice(data, shape)?)
}

/// The 1x1x5x5 ramp `1..=25` most precomputed pooling cases share.
fn ramp_5x5() -> OnnxResult<Tensor<f32>> {
    Ok(arange(1.0f32, 26.0, 1.0)?.reshape(&[1, 1, 5, 5])?)
}

/// Pools `x` the way the node describes, through the masked reference.
fn reference_pool(
    node: &NodeProto,
    x: &Tensor<f32>,
    mode: PoolMode,
) -> OnnxResult<Tensor<f32>> {
    let config = SpatialConfig::from_node(node, x.ndim().saturating_sub(2))?;
    let geometry = config.resolve(&x.shape()[2..])?;
    let padded = PaddedTensor::new(x, &geometry.pads_begin, &geometry.pads_end)?;
    let count_include_pad = node.get_int("count_include_pad").unwrap_or(0) != 0;
    pool(
        &padded,
        x.shape(),
        &config.kernel_shape,
        &config.strides,
        &geometry.output_shape,
        &geometry.pad_totals(),
        mode,
        count_include_pad,
    )
}

fn reference_argmax(node: &NodeProto, x: &Tensor<f32>) -> OnnxResult<(Tensor<f32>, Tensor<i64>)> {
    let config = SpatialConfig::from_node(node, x.ndim().saturating_sub(2))?;
    let geometry = config.resolve(&x.shape()[2..])?;
    let padded = PaddedTensor::new(x, &geometry.pads_begin, &geometry.pads_end)?;
    let order = StorageOrder::try_from(node.get_int("storage_order").unwrap_or(0))?;
    pool_with_argmax(
        &padded,
        x.shape(),
        &config.kernel_shape,
        &config.strides,
        &geometry.output_shape,
        &geometry.pad_totals(),
        order,
    )
}

fn pool_node(op: &str, kernel: &[i64]) -> NodeProto {
    NodeProto::new(op, &["x"], &["y"]).with_ints("kernel_shape", kernel)
}

/// Derives an independent seed for the `k`-th random tensor of a suite.
fn derive(seed: u64, k: u64) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(k)
}

// =============================================================================
// Suite Construction
// =============================================================================

/// Builds the complete conformance suite.
pub fn conformance_suite(seed: u64) -> OnnxResult<Vec<ConformanceCase>> {
    let mut cases = Vec::new();
    conv_cases(&mut cases, seed)?;
    average_pool_cases(&mut cases, seed)?;
    max_pool_cases(&mut cases, seed)?;
    concat_cases(&mut cases)?;
    add_cases(&mut cases, seed)?;
    sum_cases(&mut cases)?;
    Ok(cases)
}

fn conv_cases(cases: &mut Vec<ConformanceCase>, seed: u64) -> OnnxResult<()> {
    let ones = Tensor::full(&[1, 1, 3, 3], 1.0f32);
    let conv_node = |pads: &[i64], strides: Option<&[i64]>| {
        let node = NodeProto::new("Conv", &["x", "W"], &["y"])
            .with_ints("kernel_shape", &[3, 3])
            .with_ints("pads", pads);
        match strides {
            Some(s) => node.with_ints("strides", s),
            None => node,
        }
    };

    let x = arange(0.0f32, 25.0, 1.0)?.reshape(&[1, 1, 5, 5])?;
    #[rustfmt::skip]
    let with_padding = f32_tensor(&[
        12.0, 21.0, 27.0, 33.0, 24.0,
        33.0, 54.0, 63.0, 72.0, 51.0,
        63.0, 99.0, 108.0, 117.0, 81.0,
        93.0, 144.0, 153.0, 162.0, 111.0,
        72.0, 111.0, 117.0, 123.0, 84.0,
    ], &[1, 1, 5, 5])?;
    cases.push(ConformanceCase::new(
        "basic_conv_with_padding",
        conv_node(&[1, 1, 1, 1], None),
        vec![x.clone().into(), ones.clone().into()],
        vec![with_padding.into()],
    ));

    #[rustfmt::skip]
    let without_padding = f32_tensor(&[
        54.0, 63.0, 72.0,
        99.0, 108.0, 117.0,
        144.0, 153.0, 162.0,
    ], &[1, 1, 3, 3])?;
    cases.push(ConformanceCase::new(
        "basic_conv_without_padding",
        conv_node(&[0, 0, 0, 0], None),
        vec![x.into(), ones.clone().into()],
        vec![without_padding.into()],
    ));

    let x = arange(0.0f32, 35.0, 1.0)?.reshape(&[1, 1, 7, 5])?;
    let strided: [(&str, [i64; 4], Vec<f32>, [usize; 4]); 3] = [
        (
            "conv_with_strides_padding",
            [1, 1, 1, 1],
            vec![12.0, 27.0, 24.0, 63.0, 108.0, 81.0, 123.0, 198.0, 141.0, 112.0, 177.0, 124.0],
            [1, 1, 4, 3],
        ),
        (
            "conv_with_strides_no_padding",
            [0, 0, 0, 0],
            vec![54.0, 72.0, 144.0, 162.0, 234.0, 252.0],
            [1, 1, 3, 2],
        ),
        (
            "conv_with_strides_and_asymmetric_padding",
            [1, 0, 1, 0],
            vec![21.0, 33.0, 99.0, 117.0, 189.0, 207.0, 171.0, 183.0],
            [1, 1, 4, 2],
        ),
    ];
    for (name, pads, expected, shape) in strided {
        cases.push(ConformanceCase::new(
            name,
            conv_node(&pads[..], Some(&[2, 2][..])),
            vec![x.clone().into(), ones.clone().into()],
            vec![f32_tensor(&expected, &shape)?.into()],
        ));
    }

    // Grouped convolution with bias on random data
    let node = NodeProto::new("Conv", &["x", "W", "B"], &["y"])
        .with_ints("kernel_shape", &[3, 3])
        .with_ints("pads", &[1, 1, 1, 1])
        .with_ints("strides", &[2, 2])
        .with_int("group", 2);
    let x = randn_seeded(&[1, 4, 6, 6], derive(seed, 1))?;
    let w = randn_seeded(&[2, 2, 3, 3], derive(seed, 2))?;
    let b = randn_seeded(&[2], derive(seed, 3))?;
    let config = SpatialConfig::from_node_with_kernel(&node, &[3, 3])?;
    let y = conv(&x, &w, Some(&b), &config, 2)?;
    cases.push(ConformanceCase::new(
        "conv_2d_grouped_with_bias",
        node,
        vec![x.into(), w.into(), b.into()],
        vec![y.into()],
    ));

    // Dilated 1-d convolution under SAME_LOWER
    let node = NodeProto::new("Conv", &["x", "W"], &["y"])
        .with_ints("dilations", &[2])
        .with_string("auto_pad", "SAME_LOWER");
    let x = randn_seeded(&[2, 3, 9], derive(seed, 4))?;
    let w = randn_seeded(&[4, 3, 2], derive(seed, 5))?;
    let config = SpatialConfig::from_node_with_kernel(&node, &[2])?;
    let y = conv(&x, &w, None, &config, 1)?;
    cases.push(ConformanceCase::new(
        "conv_1d_dilated_same_lower",
        node,
        vec![x.into(), w.into()],
        vec![y.into()],
    ));

    Ok(())
}

fn average_pool_cases(cases: &mut Vec<ConformanceCase>, seed: u64) -> OnnxResult<()> {
    let x = ramp_5x5()?;

    #[rustfmt::skip]
    let precomputed: [(&str, NodeProto, Vec<f32>, [usize; 4]); 3] = [
        (
            "averagepool_2d_precomputed_pads",
            pool_node("AveragePool", &[5, 5]).with_ints("pads", &[2, 2, 2, 2]),
            vec![
                7.0, 7.5, 8.0, 8.5, 9.0,
                9.5, 10.0, 10.5, 11.0, 11.5,
                12.0, 12.5, 13.0, 13.5, 14.0,
                14.5, 15.0, 15.5, 16.0, 16.5,
                17.0, 17.5, 18.0, 18.5, 19.0,
            ],
            [1, 1, 5, 5],
        ),
        (
            "averagepool_2d_precomputed_strides",
            pool_node("AveragePool", &[2, 2]).with_ints("strides", &[2, 2]),
            vec![4.0, 6.0, 14.0, 16.0],
            [1, 1, 2, 2],
        ),
        (
            "averagepool_2d_precomputed_same_upper",
            pool_node("AveragePool", &[3, 3])
                .with_ints("strides", &[2, 2])
                .with_string("auto_pad", "SAME_UPPER"),
            vec![4.0, 5.5, 7.0, 11.5, 13.0, 14.5, 19.0, 20.5, 22.0],
            [1, 1, 3, 3],
        ),
    ];
    for (name, node, expected, shape) in precomputed {
        cases.push(ConformanceCase::new(
            name,
            node,
            vec![x.clone().into()],
            vec![f32_tensor(&expected, &shape)?.into()],
        ));
    }

    let random = [
        ("averagepool_2d_default", pool_node("AveragePool", &[2, 2]), vec![1, 3, 32, 32]),
        (
            "averagepool_2d_pads",
            pool_node("AveragePool", &[3, 3]).with_ints("pads", &[2, 2, 2, 2]),
            vec![1, 3, 28, 28],
        ),
        (
            "averagepool_2d_strides",
            pool_node("AveragePool", &[5, 5]).with_ints("strides", &[3, 3]),
            vec![1, 3, 32, 32],
        ),
        ("averagepool_1d_default", pool_node("AveragePool", &[2]), vec![1, 3, 32]),
        ("averagepool_3d_default", pool_node("AveragePool", &[2, 2, 2]), vec![1, 3, 8, 8, 8]),
        (
            "averagepool_2d_same_upper",
            pool_node("AveragePool", &[2, 2]).with_string("auto_pad", "SAME_UPPER"),
            vec![1, 3, 32, 32],
        ),
        (
            "averagepool_2d_same_lower",
            pool_node("AveragePool", &[2, 2]).with_string("auto_pad", "SAME_LOWER"),
            vec![1, 3, 32, 32],
        ),
        (
            "averagepool_2d_pads_count_include_pad",
            pool_node("AveragePool", &[3, 3])
                .with_ints("pads", &[2, 2, 2, 2])
                .with_int("count_include_pad", 1),
            vec![1, 3, 28, 28],
        ),
    ];
    for (k, (name, node, shape)) in random.into_iter().enumerate() {
        let x = randn_seeded(&shape, derive(seed, 100 + k as u64))?;
        let y = reference_pool(&node, &x, PoolMode::Avg)?;
        cases.push(ConformanceCase::new(name, node, vec![x.into()], vec![y.into()]));
    }

    // count_include_pad on the ramp divides every window by 25
    let node = pool_node("AveragePool", &[5, 5])
        .with_ints("pads", &[2, 2, 2, 2])
        .with_int("count_include_pad", 1);
    let y = reference_pool(&node, &x, PoolMode::Avg)?;
    cases.push(ConformanceCase::new(
        "averagepool_2d_precomputed_pads_count_include_pad",
        node,
        vec![x.into()],
        vec![y.into()],
    ));

    Ok(())
}

fn max_pool_cases(cases: &mut Vec<ConformanceCase>, seed: u64) -> OnnxResult<()> {
    let x = ramp_5x5()?;

    #[rustfmt::skip]
    let padded_max = f32_tensor(&[
        13.0, 14.0, 15.0, 15.0, 15.0,
        18.0, 19.0, 20.0, 20.0, 20.0,
        23.0, 24.0, 25.0, 25.0, 25.0,
        23.0, 24.0, 25.0, 25.0, 25.0,
        23.0, 24.0, 25.0, 25.0, 25.0,
    ], &[1, 1, 5, 5])?;
    #[rustfmt::skip]
    let padded_argmax = Tensor::from_slice(&[
        12i64, 13, 14, 14, 14,
        17, 18, 19, 19, 19,
        22, 23, 24, 24, 24,
        22, 23, 24, 24, 24,
        22, 23, 24, 24, 24,
    ], &[1, 1, 5, 5])?;
    let strided_max = f32_tensor(&[7.0, 9.0, 17.0, 19.0], &[1, 1, 2, 2])?;

    let pads_node = pool_node("MaxPool", &[5, 5]).with_ints("pads", &[2, 2, 2, 2]);
    cases.push(ConformanceCase::new(
        "maxpool_2d_precomputed_pads",
        pads_node.clone(),
        vec![x.clone().into()],
        vec![padded_max.clone().into()],
    ));

    let mut argmax_node = pads_node;
    argmax_node.output = vec!["y".to_string(), "z".to_string()];
    cases.push(ConformanceCase::new(
        "maxpool_with_argmax_2d_precomputed_pads",
        argmax_node,
        vec![x.clone().into()],
        vec![padded_max.into(), padded_argmax.into()],
    ));

    let strides_node = pool_node("MaxPool", &[2, 2]).with_ints("strides", &[2, 2]);
    cases.push(ConformanceCase::new(
        "maxpool_2d_precomputed_strides",
        strides_node.clone(),
        vec![x.clone().into()],
        vec![strided_max.clone().into()],
    ));

    let mut argmax_node = strides_node.with_int("storage_order", 1);
    argmax_node.output = vec!["y".to_string(), "z".to_string()];
    cases.push(ConformanceCase::new(
        "maxpool_with_argmax_2d_precomputed_strides",
        argmax_node,
        vec![x.clone().into()],
        vec![
            strided_max.into(),
            Tensor::from_slice(&[6i64, 16, 8, 18], &[1, 1, 2, 2])?.into(),
        ],
    ));

    cases.push(ConformanceCase::new(
        "maxpool_2d_precomputed_same_upper",
        pool_node("MaxPool", &[3, 3])
            .with_ints("strides", &[2, 2])
            .with_string("auto_pad", "SAME_UPPER"),
        vec![x.into()],
        vec![f32_tensor(
            &[7.0, 9.0, 10.0, 17.0, 19.0, 20.0, 22.0, 24.0, 25.0],
            &[1, 1, 3, 3],
        )?
        .into()],
    ));

    let random = [
        ("maxpool_2d_default", pool_node("MaxPool", &[2, 2]), vec![1, 3, 32, 32]),
        (
            "maxpool_2d_pads",
            pool_node("MaxPool", &[3, 3]).with_ints("pads", &[2, 2, 2, 2]),
            vec![1, 3, 28, 28],
        ),
        (
            "maxpool_2d_strides",
            pool_node("MaxPool", &[5, 5]).with_ints("strides", &[3, 3]),
            vec![1, 3, 32, 32],
        ),
        ("maxpool_1d_default", pool_node("MaxPool", &[2]), vec![1, 3, 32]),
        ("maxpool_3d_default", pool_node("MaxPool", &[2, 2, 2]), vec![1, 3, 8, 8, 8]),
        (
            "maxpool_2d_same_upper",
            pool_node("MaxPool", &[2, 2]).with_string("auto_pad", "SAME_UPPER"),
            vec![1, 3, 32, 32],
        ),
        (
            "maxpool_2d_same_lower",
            pool_node("MaxPool", &[2, 2]).with_string("auto_pad", "SAME_LOWER"),
            vec![1, 3, 32, 32],
        ),
    ];
    for (k, (name, node, shape)) in random.into_iter().enumerate() {
        let x = randn_seeded(&shape, derive(seed, 200 + k as u64))?;
        let y = reference_pool(&node, &x, PoolMode::Max)?;
        cases.push(ConformanceCase::new(name, node, vec![x.into()], vec![y.into()]));
    }

    // Indices over a padded, batched, multi-channel input in both orders
    for order in [0, 1] {
        let mut node = pool_node("MaxPool", &[3, 3])
            .with_ints("pads", &[1, 1, 1, 1])
            .with_ints("strides", &[2, 2])
            .with_int("storage_order", order);
        node.output = vec!["y".to_string(), "z".to_string()];
        let x = randn_seeded(&[2, 3, 9, 7], derive(seed, 300 + order as u64))?;
        let (y, z) = reference_argmax(&node, &x)?;
        cases.push(ConformanceCase::new(
            format!("maxpool_with_argmax_2d_pads_storage_order_{order}"),
            node,
            vec![x.into()],
            vec![y.into(), z.into()],
        ));
    }

    Ok(())
}

fn concat_cases(cases: &mut Vec<ConformanceCase>) -> OnnxResult<()> {
    let a2 = f32_tensor(&[1.0, 2.0, 3.0, 4.0], &[2, 2])?;
    let b2 = f32_tensor(&[5.0, 6.0, 7.0, 8.0], &[2, 2])?;
    let a3 = f32_tensor(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], &[2, 2, 2])?;
    let b3 = f32_tensor(&[9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], &[2, 2, 2])?;

    #[rustfmt::skip]
    let test_cases: [(&str, &Tensor<f32>, &Tensor<f32>, Vec<(Vec<f32>, Vec<usize>)>); 2] = [
        ("2d", &a2, &b2, vec![
            (vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], vec![4, 2]),
            (vec![1.0, 2.0, 5.0, 6.0, 3.0, 4.0, 7.0, 8.0], vec![2, 4]),
        ]),
        ("3d", &a3, &b3, vec![
            (
                vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0,
                     9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0],
                vec![4, 2, 2],
            ),
            (
                vec![1.0, 2.0, 3.0, 4.0, 9.0, 10.0, 11.0, 12.0,
                     5.0, 6.0, 7.0, 8.0, 13.0, 14.0, 15.0, 16.0],
                vec![2, 4, 2],
            ),
            (
                vec![1.0, 2.0, 9.0, 10.0, 3.0, 4.0, 11.0, 12.0,
                     5.0, 6.0, 13.0, 14.0, 7.0, 8.0, 15.0, 16.0],
                vec![2, 2, 4],
            ),
        ]),
    ];

    for (label, a, b, per_axis) in test_cases {
        let rank = per_axis.len() as i64;
        let node = |axis: i64| {
            NodeProto::new("Concat", &["value0", "value1"], &["output"]).with_int("axis", axis)
        };

        for (axis, (data, shape)) in per_axis.iter().enumerate() {
            let expected = f32_tensor(data, shape)?;
            // Negative axes must give the same result as their positive equivalent
            for (suffix, attr) in [
                (format!("axis_{axis}"), axis as i64),
                (format!("axis_negative_{}", rank - axis as i64), axis as i64 - rank),
            ] {
                cases.push(ConformanceCase::new(
                    format!("concat_{label}_{suffix}"),
                    node(attr),
                    vec![a.clone().into(), b.clone().into()],
                    vec![expected.clone().into()],
                ));
            }
        }
    }
    Ok(())
}

fn add_cases(cases: &mut Vec<ConformanceCase>, seed: u64) -> OnnxResult<()> {
    let x = randn_seeded(&[3, 4, 5], derive(seed, 400))?;
    let y = randn_seeded(&[3, 4, 5], derive(seed, 401))?;
    let expected: Vec<f32> = x.as_slice().iter().zip(y.as_slice()).map(|(a, b)| a + b).collect();
    cases.push(ConformanceCase::new(
        "add",
        NodeProto::new("Add", &["x", "y"], &["sum"]),
        vec![x.clone().into(), y.into()],
        vec![f32_tensor(&expected, x.shape())?.into()],
    ));

    // A trailing-axis operand repeats every 5 elements of x
    let y = randn_seeded(&[5], derive(seed, 402))?;
    let expected: Vec<f32> = x
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, a)| a + y.as_slice()[i % 5])
        .collect();
    cases.push(ConformanceCase::new(
        "add_bcast",
        NodeProto::new("Add", &["x", "y"], &["sum"]),
        vec![x.clone().into(), y.into()],
        vec![f32_tensor(&expected, x.shape())?.into()],
    ));
    Ok(())
}

fn sum_cases(cases: &mut Vec<ConformanceCase>) -> OnnxResult<()> {
    let data = [
        f32_tensor(&[3.0, 0.0, 2.0], &[3])?,
        f32_tensor(&[1.0, 3.0, 4.0], &[3])?,
        f32_tensor(&[2.0, 6.0, 6.0], &[3])?,
    ];
    let names = ["data_0", "data_1", "data_2"];

    let test_cases: [(&str, usize, [f32; 3]); 3] = [
        ("sum_example", 3, [6.0, 9.0, 12.0]),
        ("sum_one_input", 1, [3.0, 0.0, 2.0]),
        ("sum_two_inputs", 2, [4.0, 3.0, 6.0]),
    ];
    for (name, n, result) in test_cases {
        cases.push(ConformanceCase::new(
            name,
            NodeProto::new("Sum", &names[..n], &["result"]),
            data[..n].iter().cloned().map(TensorValue::from).collect(),
            vec![f32_tensor(&result, &[3])?.into()],
        ));
    }
    Ok(())
}

// =============================================================================
// Suite Execution
// =============================================================================

/// A case that did not pass.
#[derive(Debug)]
pub struct CaseFailure {
    /// Case name.
    pub name: String,
    /// Why it failed.
    pub error: OnnxError,
}

/// Outcome of running the suite against one backend.
#[derive(Debug, Default)]
pub struct SuiteReport {
    /// Backend the suite ran on.
    pub backend: String,
    /// Names of passing cases.
    pub passed: Vec<String>,
    /// Failing cases with their errors.
    pub failures: Vec<CaseFailure>,
}

impl SuiteReport {
    /// Number of cases run.
    pub fn total(&self) -> usize {
        self.passed.len() + self.failures.len()
    }

    /// Returns true if every case passed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs every selected case of the suite on `backend`.
pub fn run_suite(backend: &dyn Backend, config: &HarnessConfig) -> OnnxResult<SuiteReport> {
    let cases: Vec<ConformanceCase> = conformance_suite(config.seed)?
        .into_iter()
        .filter(|case| config.selects(&case.name))
        .collect();

    let outcomes: Vec<(String, OnnxResult<()>)> = if config.parallel {
        cases
            .par_iter()
            .map(|case| (case.name.clone(), case.run(backend, config.decimal)))
            .collect()
    } else {
        cases
            .iter()
            .map(|case| (case.name.clone(), case.run(backend, config.decimal)))
            .collect()
    };

    let mut report = SuiteReport {
        backend: backend.name().to_string(),
        ..SuiteReport::default()
    };
    for (name, outcome) in outcomes {
        match outcome {
            Ok(()) => report.passed.push(name),
            Err(error) => {
                warn!(case = %name, %error, "case failed");
                report.failures.push(CaseFailure { name, error });
            }
        }
    }

    info!(
        backend = %report.backend,
        passed = report.passed.len(),
        failed = report.failures.len(),
        "suite finished"
    );
    Ok(report)
}

// =============================================================================
// Tests
// =============================================================================
