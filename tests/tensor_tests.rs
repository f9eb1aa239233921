use gru_unit::backprop::{mse_loss, sgd};
use gru_unit::tensor;
use gru_unit::tensors::{Ten64, Tensor, WithGrad};

#[test]
fn test_tensor_creation() {
    let t = Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(t.shape, vec![2, 2]);
    assert_eq!(t.data, vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_tensor_macro() {
    let t = tensor!([[1.0, 2.0], [3.0, 4.0]]);
    assert_eq!(t.shape, vec![2, 2]);
    assert_eq!(t.data, vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_tensor_macro_three_dims() {
    let t = tensor!([[[1.0, 2.0], [3.0, 4.0]], [[5.0, 6.0], [7.0, 8.0]]]);
    assert_eq!(t.shape, vec![2, 2, 2]);
    assert_eq!(t.data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
}

#[test]
fn test_tensor_zeros() {
    let t = Ten64::zeros(vec![2, 3]);
    assert_eq!(t.shape, vec![2, 3]);
    assert_eq!(t.data, vec![0.0; 6]);
}

#[test]
fn test_with_grad_starts_at_zero() {
    let w = WithGrad::new(tensor!([[1.0, 2.0], [3.0, 4.0]]));
    assert_eq!(w.value.data, vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(w.grad.shape, vec![2, 2]);
    assert_eq!(w.grad.data, vec![0.0; 4]);
}

#[test]
fn test_mse_loss() {
    let pred = WithGrad {
        value: Tensor::new(vec![2], vec![1.0, 2.0]),
        grad: Tensor::new(vec![2], vec![0.0; 2]),
    };
    let target = Tensor::new(vec![2], vec![1.5, 2.5]);
    let (loss, backward) = mse_loss(&pred, &target);
    let grad = backward(1.0);
    assert_eq!(loss, 0.25);
    assert_eq!(grad.data, vec![-0.5, -0.5]);
}

#[test]
fn test_sgd() {
    let mut w = WithGrad {
        value: Tensor::new(vec![2], vec![1.0, 2.0]),
        grad: Tensor::new(vec![2], vec![0.1, 0.2]),
    };
    sgd(&mut w, 0.5);
    assert_eq!(w.value.data, vec![0.95, 1.9]);
    assert_eq!(w.grad.data, vec![0.0, 0.0]);
}
