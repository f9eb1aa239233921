//! Differentiable operations and autograd utilities.
//!
//! # Backpropagation and Optimization Primitives
//!
//! Provides the recurrent cell with built-in autograd support for training, plus
//! the loss and optimizer needed to drive it.
//!
//! **Key Features:**
//! - **GRU Cell (`gru_unit`):** One fused time step with gradient closures for
//!   all four inputs.
//! - **Loss (`mse_loss`):** Mean squared error returning the scalar and its
//!   gradient generator.
//! - **Optimizer (`sgd`):** In-place parameter update that also resets the
//!   gradient.
//!
//! ## Autograd Pattern
//!
//! Every op here has the same shape:
//! 1. Take `WithGrad<Ten64>` references as inputs.
//! 2. Run the forward kernel to produce an output `Ten64`.
//! 3. Hand back a closure holding the retained intermediates; calling it with
//!    an upstream gradient yields the input gradients.
//! 4. The caller folds those into the `grad` fields and steps the optimizer.
//!
//! ## Usage Guidelines
//!
//! - Shape mismatches panic; the kernels document their layout contracts.
//! - The backward closures implement `Fn`, so they can run more than once.
//! - Gradients come back as plain tensors; accumulate them into the `grad` field
//!   yourself before calling [`sgd`].

use crate::activations::GruUnitAttrs;
use crate::tensors::{Ten64, WithGrad};

pub use crate::ops::dispatch::{GruUnitBackFn, GruUnitGrads};

/// Runs one GRU time step: `(input, hidden_prev) -> hidden`.
///
/// The three gate projections for the whole batch are fused into two matrix
/// multiplies against the packed `weight` tensor, so
///
/// $h = u \odot (h_{prev} - c) + c$
///
/// comes out of a single kernel call. See [`crate::ops::cpu::gru_unit`] for the
/// exact layout contract.
///
/// # Returns
/// - `hidden`: Next hidden state (batch×frame).
/// - `back`: Closure that given `dL/d(hidden)` returns a [`GruUnitGrads`] with
///   gradients for `input`, `hidden_prev`, `weight` and `bias`.
///
/// # Panics
/// Panics if any shape deviates from the kernel's layout contract
/// (`input` batch×3·frame, `hidden_prev` batch×frame, `weight` frame×3·frame,
/// `bias` 1×3·frame).
///
/// # Example
/// ```rust
/// use gru_unit::activations::GruUnitAttrs;
/// use gru_unit::tensor;
/// use gru_unit::tensors::WithGrad;
///
/// let input = WithGrad::new(tensor!([[0.0, 0.0, 0.0]]));
/// let hidden_prev = WithGrad::new(tensor!([[1.0]]));
/// let weight = WithGrad::new(tensor!([[0.0, 0.0, 0.0]]));
/// let bias = WithGrad::new(tensor!([[0.0, 0.0, 0.0]]));
///
/// let (hidden, back) = gru_unit::backprop::gru_unit(
///     &input, &hidden_prev, &weight, &bias, GruUnitAttrs::default(),
/// );
/// let grads = back(&tensor!([[1.0]]));
/// assert_eq!(grads.weight.shape, vec![1, 3]);
/// ```
///
/// # Performance
/// The GEMM inner loop uses AVX2 under the `simd` feature; output rows
/// parallelize through rayon either way.
///
/// When compiled with `wgpu` feature and the GPU backend is selected, the gate
/// projections of both passes run on the GPU.
pub fn gru_unit(
    input: &WithGrad<Ten64>,
    hidden_prev: &WithGrad<Ten64>,
    weight: &WithGrad<Ten64>,
    bias: &WithGrad<Ten64>,
    attrs: GruUnitAttrs,
) -> (Ten64, impl Fn(&Ten64) -> GruUnitGrads) {
    crate::ops::dispatch::gru_unit(input, hidden_prev, weight, bias, attrs)
}

/// Mean squared error `mean((prediction - target)^2)` over all elements.
///
/// # Returns
/// - The scalar loss
/// - A closure turning `dL/dloss` into a gradient tensor for `prediction`
///
/// # Panics
/// Panics if `prediction` and `target` shapes differ.
pub fn mse_loss<'a>(
    prediction: &'a WithGrad<Ten64>,
    target: &'a Ten64,
) -> (f64, impl Fn(f64) -> Ten64 + 'a) {
    assert_eq!(prediction.value.shape, target.shape);
    crate::ops::cpu::mse_loss(prediction, target)
}

/// In-place stochastic gradient descent step.
///
/// Applies `value -= lr * grad` elementwise, then zeroes `grad` so the next
/// accumulation starts clean.
pub fn sgd(w: &mut WithGrad<Ten64>, lr: f64) {
    crate::ops::cpu::sgd(w, lr)
}
