//! Tests for pooling operators (MaxPool, AveragePool) and the reference reducer

use refcheck_onnx::{
    create_operator, output_shape, pad_shape, pool, AutoPad, NodeProto, PaddedTensor, PoolMode,
    TensorValue,
};
use refcheck_tensor::Tensor;

fn grid_4x4() -> Tensor<f32> {
    let input_data: Vec<f32> = vec![
        1.0, 2.0, 3.0, 4.0,
        5.0, 6.0, 7.0, 8.0,
        9.0, 10.0, 11.0, 12.0,
        13.0, 14.0, 15.0, 16.0,
    ];
    Tensor::from_vec(input_data, &[1, 1, 4, 4]).expect("Failed to create tensor")
}

fn run(node: &NodeProto, input: Tensor<f32>) -> Vec<TensorValue> {
    let op = create_operator(node).expect("Failed to create operator");
    let x = TensorValue::from(input);
    op.execute(&[Some(&x)]).expect("Operator failed")
}

#[test]
fn test_maxpool_basic_2x2() {
    let node = NodeProto::new("MaxPool", &["x"], &["y"])
        .with_ints("kernel_shape", &[2, 2])
        .with_ints("strides", &[2, 2]);

    // max(1,2,5,6) = 6, max(3,4,7,8) = 8
    // max(9,10,13,14) = 14, max(11,12,15,16) = 16
    let outputs = run(&node, grid_4x4());
    let y = outputs[0].as_f32().unwrap();
    assert_eq!(y.shape(), &[1, 1, 2, 2]);
    assert_eq!(y.to_vec(), vec![6.0, 8.0, 14.0, 16.0]);
}

#[test]
fn test_maxpool_with_padding() {
    let input = Tensor::from_vec(
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        &[1, 1, 3, 3],
    )
    .unwrap();
    let node = NodeProto::new("MaxPool", &["x"], &["y"])
        .with_ints("kernel_shape", &[2, 2])
        .with_ints("pads", &[1, 1, 1, 1]);

    let outputs = run(&node, input);
    let y = outputs[0].as_f32().unwrap();
    assert_eq!(y.shape(), &[1, 1, 4, 4]);
    assert_eq!(
        y.to_vec(),
        vec![1.0, 2.0, 3.0, 3.0, 4.0, 5.0, 6.0, 6.0, 7.0, 8.0, 9.0, 9.0, 7.0, 8.0, 9.0, 9.0]
    );
}

#[test]
fn test_avgpool_basic_2x2() {
    let node = NodeProto::new("AveragePool", &["x"], &["y"])
        .with_ints("kernel_shape", &[2, 2])
        .with_ints("strides", &[2, 2]);

    // avg(1,2,5,6) = 3.5, avg(3,4,7,8) = 5.5
    // avg(9,10,13,14) = 11.5, avg(11,12,15,16) = 13.5
    let outputs = run(&node, grid_4x4());
    assert_eq!(outputs[0].as_f32().unwrap().to_vec(), vec![3.5, 5.5, 11.5, 13.5]);
}

#[test]
fn test_avgpool_padding_excluded_and_included() {
    let node = NodeProto::new("AveragePool", &["x"], &["y"])
        .with_ints("kernel_shape", &[3, 3])
        .with_ints("pads", &[1, 1, 1, 1]);

    // Corner window sees 1, 2, 5, 6
    let outputs = run(&node, grid_4x4());
    assert_eq!(outputs[0].as_f32().unwrap().get(&[0, 0, 0, 0]).unwrap(), 3.5);

    let node = node.with_int("count_include_pad", 1);
    let outputs = run(&node, grid_4x4());
    assert_eq!(outputs[0].as_f32().unwrap().get(&[0, 0, 0, 0]).unwrap(), 14.0 / 9.0);
}

#[test]
fn test_operator_agrees_with_reference_reducer() {
    let input = grid_4x4();
    let kernel = [3, 3];
    let strides = [2, 2];
    let out = output_shape(AutoPad::SameLower, &[4, 4], &kernel, &strides);
    let pads = pad_shape(AutoPad::SameLower, &[4, 4], &kernel, &strides, &out);
    assert_eq!(out, vec![2, 2]);
    assert_eq!(pads, vec![1, 1]);

    // SAME_LOWER puts the odd unit before the data
    let padded = PaddedTensor::new(&input, &[1, 1], &[0, 0]).unwrap();
    let reference = pool(
        &padded,
        input.shape(),
        &kernel,
        &strides,
        &out,
        &pads,
        PoolMode::Max,
        false,
    )
    .unwrap();

    let node = NodeProto::new("MaxPool", &["x"], &["y"])
        .with_ints("kernel_shape", &[3, 3])
        .with_ints("strides", &[2, 2])
        .with_string("auto_pad", "SAME_LOWER");
    let outputs = run(&node, input);
    assert_eq!(outputs[0].as_f32().unwrap(), &reference);
    assert_eq!(reference.to_vec(), vec![6.0, 8.0, 14.0, 16.0]);
}

#[test]
fn test_unsupported_mode_is_reported() {
    let err = "LP".parse::<PoolMode>().unwrap_err();
    assert!(err.to_string().contains("LP"));
}

#[test]
fn test_integer_input_promoted() {
    let node = NodeProto::new("MaxPool", &["x"], &["y"]).with_ints("kernel_shape", &[2, 2]);
    let op = create_operator(&node).unwrap();
    let x = TensorValue::from(Tensor::from_vec(vec![1i64, 5, 3, 2], &[1, 1, 2, 2]).unwrap());
    let outputs = op.execute(&[Some(&x)]).unwrap();
    assert_eq!(outputs[0].as_f32().unwrap().to_vec(), vec![5.0]);
}
