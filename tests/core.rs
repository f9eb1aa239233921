use gru_unit::activations::{Activation, GruUnitAttrs};
use gru_unit::backend::{get_backend, set_backend, Backend};
use gru_unit::ops::cpu::gemm;
use gru_unit::paramio::{load_params, save_params, GruUnitParams};
use gru_unit::tensors::Tensor;

#[test]
fn test_tensor_shape_mismatch_panics() {
    let result = std::panic::catch_unwind(|| {
        Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0]);
    });
    assert!(result.is_err());
}

#[test]
fn test_backend_codes() {
    assert_eq!(Backend::try_from(0), Ok(Backend::Cpu));
    assert_eq!(Backend::try_from(1), Ok(Backend::Wgpu));
    assert_eq!(Backend::try_from(2), Ok(Backend::Cuda));
    assert!(Backend::try_from(3).is_err());

    set_backend(Backend::Cpu);
    assert_eq!(get_backend(), Backend::Cpu);
}

#[test]
fn test_activation_codes_round_trip() {
    for code in 0u8..4 {
        let activation = Activation::try_from(code).unwrap();
        assert_eq!(activation as u8, code);
    }
    let err = Activation::try_from(9).unwrap_err();
    assert_eq!(err.to_string(), "unsupported activation type: 9");
}

#[test]
fn test_activation_apply_values() {
    let mut xs = [-1.0, 0.0, 2.0];
    Activation::Relu.apply(&mut xs);
    assert_eq!(xs, [0.0, 0.0, 2.0]);

    let mut xs = [0.0];
    Activation::Sigmoid.apply(&mut xs);
    assert_eq!(xs, [0.5]);

    let mut xs = [0.7];
    Activation::Tanh.apply(&mut xs);
    assert_eq!(xs, [0.7f64.tanh()]);

    let mut xs = [-0.5, 0.5];
    Activation::Identity.apply(&mut xs);
    assert_eq!(xs, [-0.5, 0.5]);
}

#[test]
fn test_activation_apply_grad_values() {
    // sigmoid scales by y (1 - y)
    let mut d = [2.0];
    Activation::Sigmoid.apply_grad(&[0.5], &mut d);
    assert_eq!(d, [0.5]);

    // tanh scales by 1 - y^2
    let mut d = [1.0];
    Activation::Tanh.apply_grad(&[0.6], &mut d);
    assert!((d[0] - 0.64).abs() < 1e-15);

    // relu passes the gradient only where the output was positive
    let mut d = [1.0, 1.0, 1.0];
    Activation::Relu.apply_grad(&[0.0, -1.0, 3.0], &mut d);
    assert_eq!(d, [0.0, 0.0, 1.0]);

    // identity leaves the gradient untouched
    let mut d = [1.25];
    Activation::Identity.apply_grad(&[42.0], &mut d);
    assert_eq!(d, [1.25]);
}

#[test]
fn test_gemm_identity() {
    let a = [1.0, 2.0, 3.0, 4.0];
    let identity = [1.0, 0.0, 0.0, 1.0];
    let mut c = [0.0; 4];
    gemm(false, false, 2, 2, 2, 1.0, &a, 2, &identity, 2, 0.0, &mut c, 2);
    assert_eq!(c, a);
}

#[test]
fn test_gemm_transpose_a() {
    // A is [2x3], C = A^T B is [3x3]
    let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let b = [1.0, 0.0, 2.0, 0.0, 1.0, 0.0];
    let mut c = [0.0; 9];
    gemm(true, false, 3, 3, 2, 1.0, &a, 3, &b, 3, 0.0, &mut c, 3);
    assert_eq!(c, [1.0, 4.0, 2.0, 2.0, 5.0, 4.0, 3.0, 6.0, 6.0]);
}

#[test]
fn test_gemm_transpose_b() {
    // A is [2x3], B is [2x3], C = A B^T is [2x2]
    let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let b = [1.0, 0.0, 2.0, 0.0, 1.0, 0.0];
    let mut c = [0.0; 4];
    gemm(false, true, 2, 2, 3, 1.0, &a, 3, &b, 3, 0.0, &mut c, 2);
    assert_eq!(c, [7.0, 2.0, 16.0, 5.0]);
}

#[test]
fn test_gemm_alpha_beta_accumulate() {
    let a = [1.0, 1.0];
    let b = [3.0, 5.0];
    let mut c = [10.0];
    gemm(false, false, 1, 1, 2, 2.0, &a, 2, &b, 1, 1.0, &mut c, 1);
    assert_eq!(c, [26.0]);
}

#[test]
fn test_gemm_beta_zero_ignores_stale_output() {
    let a = [1.0];
    let b = [2.0];
    let mut c = [f64::NAN];
    gemm(false, false, 1, 1, 1, 1.0, &a, 1, &b, 1, 0.0, &mut c, 1);
    assert_eq!(c, [2.0]);
}

#[test]
fn test_gemm_strided_output_block() {
    // write a [2x2] product into the right half of a [2x4] buffer
    let a = [1.0, 0.0, 0.0, 1.0];
    let b = [5.0, 6.0, 7.0, 8.0];
    let mut c = [0.0; 8];
    gemm(false, false, 2, 2, 2, 1.0, &a, 2, &b, 2, 0.0, &mut c[2..], 4);
    assert_eq!(c, [0.0, 0.0, 5.0, 6.0, 0.0, 0.0, 7.0, 8.0]);
}

#[test]
fn test_grup_save_and_load() {
    let params = GruUnitParams {
        weight: Tensor::new(vec![2, 6], (0..12).map(|i| i as f64 * 0.25).collect()),
        bias: Tensor::new(vec![1, 6], vec![0.5, -0.5, 1.5, 0.0, 2.0, -1.0]),
        attrs: GruUnitAttrs {
            gate_activation: Activation::Relu,
            state_activation: Activation::Identity,
        },
    };

    save_params("test_cell.grup", &params).unwrap();
    let loaded = load_params("test_cell.grup").unwrap();
    std::fs::remove_file("test_cell.grup").unwrap();

    assert_eq!(loaded.weight, params.weight);
    assert_eq!(loaded.bias, params.bias);
    assert_eq!(loaded.attrs, params.attrs);
}

#[test]
fn test_grup_rejects_bad_magic() {
    std::fs::write("test_bad_magic.grup", b"nope\x01\x00\x00\x00\x01\x02").unwrap();
    let result = load_params("test_bad_magic.grup");
    std::fs::remove_file("test_bad_magic.grup").unwrap();
    assert!(result.is_err());
}

#[test]
fn test_grup_rejects_truncated_file() {
    // header promises frame size 2 but carries no parameter data
    std::fs::write("test_truncated.grup", b"grup\x02\x00\x00\x00\x01\x02").unwrap();
    let result = load_params("test_truncated.grup");
    std::fs::remove_file("test_truncated.grup").unwrap();
    assert!(result.is_err());
}

#[test]
fn test_grup_rejects_unknown_activation_code() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"grup");
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.push(9);
    bytes.push(2);
    for _ in 0..6 {
        bytes.extend_from_slice(&0.0f64.to_le_bytes());
    }

    std::fs::write("test_bad_code.grup", &bytes).unwrap();
    let result = load_params("test_bad_code.grup");
    std::fs::remove_file("test_bad_code.grup").unwrap();
    assert!(result.is_err());
}

#[test]
fn test_grup_rejects_zero_frame_size() {
    std::fs::write("test_zero_frame.grup", b"grup\x00\x00\x00\x00\x01\x02").unwrap();
    let result = load_params("test_zero_frame.grup");
    std::fs::remove_file("test_zero_frame.grup").unwrap();
    assert!(result.is_err());
}
