//! Operation Dispatch Layer
//!
//! This module selects the correct backend (CPU, WGPU, CUDA, etc.) at runtime
//! for the GRU kernels, based on the global `Backend`.
//!
//! Each invocation attempts backend-specific implementations in priority order:
//! 1. `Cuda` (if enabled)
//! 2. `Wgpu` (if enabled)
//! 3. Falls back to `Cpu`
//!
//! The forward pass routes when it is called; the returned backward closure
//! routes again when *it* is called, so a backend switch between forward and
//! backward is honored.
//!
//! # Design Highlights
//! - **Pluggable**: Backends are optional and modular
//! - **Minimal overhead**: Function returns immediately upon match
//! - **Fallback logic**: Safe and deterministic fallback to CPU
//!
//! # Example
//! ```rust
//! use gru_unit::{tensor, tensors::WithGrad};
//! use gru_unit::activations::GruUnitAttrs;
//! use gru_unit::backprop::gru_unit;
//!
//! let input = WithGrad::new(tensor!([[0.0, 0.0, 0.0]]));
//! let hidden_prev = WithGrad::new(tensor!([[1.0]]));
//! let weight = WithGrad::new(tensor!([[0.0, 0.0, 0.0]]));
//! let bias = WithGrad::new(tensor!([[0.0, 0.0, 0.0]]));
//!
//! let (hidden, back) = gru_unit(&input, &hidden_prev, &weight, &bias, GruUnitAttrs::default());
//! let grads = back(&tensor!([[1.0]])); // uses GPU if available
//! assert_eq!(grads.weight.shape, vec![1, 3]);
//! ```

use crate::activations::GruUnitAttrs;
use crate::backend::{get_backend, Backend};
use crate::tensors::{Ten64, WithGrad};

pub type FnF64Ten64<'a> = dyn Fn(f64) -> Ten64 + 'a;
pub type GruUnitBackFn = dyn Fn(&Ten64) -> GruUnitGrads;

/// Gradients produced by the GRU backward pass, one per differentiable input.
///
/// Each tensor mirrors the shape of the input it differentiates.
#[derive(Debug, Clone)]
pub struct GruUnitGrads {
    pub input: Ten64,
    pub hidden_prev: Ten64,
    pub weight: Ten64,
    pub bias: Ten64,
}

/// Dispatches one GRU time step to the selected backend (CPU, WGPU, or CUDA).
///
/// Allocates the gate and reset-product intermediates, runs the forward
/// kernel, and moves the intermediates into the returned backward closure;
/// they are exactly what the backward kernel needs, so nothing is
/// recomputed when the closure runs.
///
/// # Returns
/// - `Tensor`: The new hidden state (batch x frame)
/// - `Fn`: Closure mapping `dL/dhidden` to a [`GruUnitGrads`]
///
/// # Behavior
/// Attempts CUDA → WGPU → CPU, depending on availability and features.
///
/// # Panics
/// Panics if the tensors violate the kernel shape contract (see
/// [`crate::ops::cpu::gru_unit`]).
pub fn gru_unit(
    input: &WithGrad<Ten64>,
    hidden_prev: &WithGrad<Ten64>,
    weight: &WithGrad<Ten64>,
    bias: &WithGrad<Ten64>,
    attrs: GruUnitAttrs,
) -> (Ten64, Box<GruUnitBackFn>) {
    let batch_size = input.value.shape[0];
    let frame_size = hidden_prev.value.shape[1];

    let mut gate = Ten64::zeros(vec![batch_size, 3 * frame_size]);
    let mut reset_hidden_prev = Ten64::zeros(vec![batch_size, frame_size]);
    let mut hidden = Ten64::zeros(vec![batch_size, frame_size]);

    run_forward(
        &input.value,
        &hidden_prev.value,
        &weight.value,
        &bias.value,
        &mut gate,
        &mut reset_hidden_prev,
        &mut hidden,
        attrs,
    );

    let hidden_prev_val = hidden_prev.value.clone();
    let weight_val = weight.value.clone();

    let back = move |hidden_grad: &Ten64| {
        let mut input_grad = Ten64::zeros(vec![batch_size, 3 * frame_size]);
        let mut hidden_prev_grad = Ten64::zeros(vec![batch_size, frame_size]);
        let mut weight_grad = Ten64::zeros(vec![frame_size, 3 * frame_size]);
        let mut bias_grad = Ten64::zeros(vec![1, 3 * frame_size]);

        run_backward(
            &hidden_prev_val,
            &weight_val,
            &gate,
            &reset_hidden_prev,
            hidden_grad,
            &mut input_grad,
            &mut hidden_prev_grad,
            &mut weight_grad,
            &mut bias_grad,
            attrs,
        );

        GruUnitGrads {
            input: input_grad,
            hidden_prev: hidden_prev_grad,
            weight: weight_grad,
            bias: bias_grad,
        }
    };

    (hidden, Box::new(back))
}

/// Routes the forward kernel, falling back to CPU when the selected GPU
/// backend is unavailable or fails to initialize.
#[allow(clippy::too_many_arguments)]
fn run_forward(
    input: &Ten64,
    hidden_prev: &Ten64,
    weight: &Ten64,
    bias: &Ten64,
    gate: &mut Ten64,
    reset_hidden_prev: &mut Ten64,
    hidden: &mut Ten64,
    attrs: GruUnitAttrs,
) {
    match get_backend() {
        Backend::Cuda => {
            #[cfg(feature = "cuda")]
            {
                if super::cuda::cuda_gru_unit(
                    input,
                    hidden_prev,
                    weight,
                    bias,
                    gate,
                    reset_hidden_prev,
                    hidden,
                    attrs,
                ) {
                    return;
                }
            }
        }
        Backend::Wgpu => {
            #[cfg(feature = "wgpu")]
            {
                if super::wgpu::wgpu_gru_unit(
                    input,
                    hidden_prev,
                    weight,
                    bias,
                    gate,
                    reset_hidden_prev,
                    hidden,
                    attrs,
                ) {
                    return;
                }
            }
        }
        _ => {}
    }

    super::cpu::gru_unit(
        input,
        hidden_prev,
        weight,
        bias,
        gate,
        reset_hidden_prev,
        hidden,
        attrs,
    )
}

/// Routes the backward kernel with the same fallback behavior as
/// [`run_forward`].
#[allow(clippy::too_many_arguments)]
fn run_backward(
    hidden_prev: &Ten64,
    weight: &Ten64,
    gate: &Ten64,
    reset_hidden_prev: &Ten64,
    hidden_grad: &Ten64,
    input_grad: &mut Ten64,
    hidden_prev_grad: &mut Ten64,
    weight_grad: &mut Ten64,
    bias_grad: &mut Ten64,
    attrs: GruUnitAttrs,
) {
    match get_backend() {
        Backend::Cuda => {
            #[cfg(feature = "cuda")]
            {
                if super::cuda::cuda_gru_unit_grad(
                    hidden_prev,
                    weight,
                    gate,
                    reset_hidden_prev,
                    hidden_grad,
                    input_grad,
                    hidden_prev_grad,
                    weight_grad,
                    bias_grad,
                    attrs,
                ) {
                    return;
                }
            }
        }
        Backend::Wgpu => {
            #[cfg(feature = "wgpu")]
            {
                if super::wgpu::wgpu_gru_unit_grad(
                    hidden_prev,
                    weight,
                    gate,
                    reset_hidden_prev,
                    hidden_grad,
                    input_grad,
                    hidden_prev_grad,
                    weight_grad,
                    bias_grad,
                    attrs,
                ) {
                    return;
                }
            }
        }
        _ => {}
    }

    super::cpu::gru_unit_grad(
        hidden_prev,
        weight,
        gate,
        reset_hidden_prev,
        hidden_grad,
        input_grad,
        hidden_prev_grad,
        weight_grad,
        bias_grad,
        attrs,
    )
}
