//! Parallel CPU backend for the GRU kernels.
//!
//! # CPU Backend
//!
//! This module provides the reference implementations of the crate's
//! numerical kernels: a dense GEMM primitive, the fused GRU forward and
//! backward kernels built on top of it, and the small training utilities
//! (`mse_loss`, `sgd`) used to optimize the cell's parameters.
//!
//! These CPU functions are the default when calling `backprop::xyz`; the
//! dispatcher only leaves this module when the `wgpu` or `cuda` backends are
//! enabled and selected.
//!
//! ## Features
//!
//! - Parallel execution using [`rayon`](https://docs.rs/rayon)
//! - Optional SIMD acceleration using AVX2 (enabled via `simd` feature flag)
//! - Pure Rust fallback path when SIMD is disabled or unavailable
//!
//! ## Implemented Ops
//!
//! - `gemm`: General matrix multiply `C <- alpha * op(A) * op(B) + beta * C`
//!   with transpose flags and explicit leading dimensions
//! - `gru_unit`: Single time-step GRU forward kernel
//! - `gru_unit_grad`: Exact adjoint of `gru_unit`
//! - `mse_loss`: Mean squared error loss with autograd
//! - `sgd`: In-place stochastic gradient descent step
//!
//! ## Design Goals
//!
//! - Deterministic results (given deterministic input and scheduling)
//! - Zero dependencies beyond `rayon`
//! - Modular: CPU functions are separate from backend dispatching
//!
//! ## Safety
//!
//! - SIMD paths use `unsafe` blocks and assume 64-bit AVX2-capable CPUs
//! - Shape contracts are enforced with asserts at kernel entry

use rayon::prelude::*;
use crate::{
    activations::GruUnitAttrs,
    ops::dispatch::FnF64Ten64,
    tensors::{Ten64, Tensor, WithGrad},
};

#[cfg(all(feature = "simd", target_arch = "x86_64", target_feature = "avx2"))]
use std::arch::x86_64::*;

/// Computes `C <- alpha * op(A) * op(B) + beta * C` over row-major slices,
/// where `op` optionally transposes an operand.
///
/// `op(A)` is `m x k`, `op(B)` is `k x n`, `C` is `m x n`. The leading
/// dimensions `lda`, `ldb`, `ldc` give the row stride of each slice, which
/// lets callers address sub-blocks of larger contiguous buffers without
/// copying. Following BLAS convention, `C` is not read when `beta` is zero.
///
/// # Requirements
/// - Untransposed operands store `op(X)` directly; a transposed operand
///   stores its mathematical transpose (`trans_a` means `A` is `k x m`).
/// - Each slice must cover the access pattern implied by the dimensions and
///   its leading dimension.
///
/// # Optimizations
/// - Uses `rayon` to compute output rows in parallel
/// - Uses AVX2 fused multiply-adds for the untransposed case
///   (if enabled via `--features=simd`)
///
/// # Panics
/// - If `ldc < n`, or any slice is too short for its access pattern.
///
/// # Example
/// ```rust
/// use gru_unit::ops::cpu::gemm;
///
/// let a = [1.0, 2.0, 3.0, 4.0]; // 2x2, row-major
/// let b = [1.0, 0.0, 0.0, 1.0]; // identity
/// let mut c = [0.0; 4];
/// gemm(false, false, 2, 2, 2, 1.0, &a, 2, &b, 2, 0.0, &mut c, 2);
/// assert_eq!(c, [1.0, 2.0, 3.0, 4.0]);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn gemm(
    trans_a: bool,
    trans_b: bool,
    m: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    beta: f64,
    c: &mut [f64],
    ldc: usize,
) {
    if m == 0 || n == 0 {
        return;
    }
    assert!(ldc >= n, "gemm: ldc must cover a full output row");
    assert!(
        c.len() >= (m - 1) * ldc + n,
        "gemm: output slice too short"
    );
    if k > 0 {
        assert!(
            a.len() >= if trans_a { (k - 1) * lda + m } else { (m - 1) * lda + k },
            "gemm: lhs slice too short"
        );
        assert!(
            b.len() >= if trans_b { (n - 1) * ldb + k } else { (k - 1) * ldb + n },
            "gemm: rhs slice too short"
        );
    }

    c.par_chunks_mut(ldc)
        .take(m)
        .enumerate()
        .for_each(|(i, row)| {
            for j in 0..n {
                let sum = {
                    #[cfg(all(feature = "simd", target_arch = "x86_64", target_feature = "avx2"))]
                    {
                        if trans_a || trans_b {
                            let mut sum = 0.0;
                            for l in 0..k {
                                let lhs = if trans_a { a[l * lda + i] } else { a[i * lda + l] };
                                let rhs = if trans_b { b[j * ldb + l] } else { b[l * ldb + j] };
                                sum += lhs * rhs;
                            }
                            sum
                        } else {
                            let mut acc = unsafe { _mm256_setzero_pd() };
                            let mut idx = 0;
                            while idx + 4 <= k {
                                unsafe {
                                    let a_chunk = _mm256_loadu_pd(&a[i * lda + idx]);
                                    let b_chunk = _mm256_set_pd(
                                        b[(idx + 3) * ldb + j],
                                        b[(idx + 2) * ldb + j],
                                        b[(idx + 1) * ldb + j],
                                        b[(idx) * ldb + j],
                                    );
                                    acc = _mm256_fmadd_pd(a_chunk, b_chunk, acc);
                                }
                                idx += 4;
                            }

                            let mut temp = [0.0; 4];
                            unsafe { _mm256_storeu_pd(temp.as_mut_ptr(), acc) };
                            let mut sum: f64 = temp.iter().sum();

                            for l in idx..k {
                                sum += a[i * lda + l] * b[l * ldb + j];
                            }

                            sum
                        }
                    }

                    #[cfg(not(all(feature = "simd", target_arch = "x86_64", target_feature = "avx2")))]
                    {
                        let mut sum = 0.0;
                        for l in 0..k {
                            let lhs = if trans_a { a[l * lda + i] } else { a[i * lda + l] };
                            let rhs = if trans_b { b[j * ldb + l] } else { b[l * ldb + j] };
                            sum += lhs * rhs;
                        }
                        sum
                    }
                };

                row[j] = if beta == 0.0 {
                    alpha * sum
                } else {
                    alpha * sum + beta * row[j]
                };
            }
        });
}

/// Runs one GRU time step, filling the caller-allocated outputs in place.
///
/// The gate buffer is computed as `input + broadcast(bias)`, accumulated
/// with the hidden-state projections through two GEMMs, then activated
/// block by block: the first two `frame_size`-wide blocks (update and reset
/// gates) with `attrs.gate_activation`, the last block (candidate) with
/// `attrs.state_activation`. `reset_hidden_prev` receives the elementwise
/// product of the activated reset gate and `hidden_prev`; `hidden` receives
/// the blend `u * (hidden_prev - c) + c`.
///
/// The weight tensor is one flat `[frame, 3 * frame]`-sized arena holding
/// two sub-matrices: the `[frame, 2 * frame]` update/reset projection at
/// offset 0 and the `[frame, frame]` candidate projection at offset
/// `2 * frame * frame`. Both GEMMs address it through offsets and leading
/// dimensions, so it is never split or copied.
///
/// `gate` and `reset_hidden_prev` are not scratch: the backward kernel
/// needs their exact post-activation values, so callers keep them alive
/// until gradients have been computed.
///
/// # Panics
/// Panics if any tensor violates the shape contract: `input` and `gate`
/// `[batch, 3 * frame]`, `hidden_prev`, `reset_hidden_prev` and `hidden`
/// `[batch, frame]`, `weight` `[frame, 3 * frame]`, `bias`
/// `[1, 3 * frame]`, with `batch` and `frame` both positive.
///
/// # Example
/// ```rust
/// use gru_unit::activations::GruUnitAttrs;
/// use gru_unit::ops::cpu::gru_unit;
/// use gru_unit::tensor;
/// use gru_unit::tensors::Ten64;
///
/// let input = tensor!([[0.0, 0.0, 0.0]]);
/// let hidden_prev = tensor!([[1.0]]);
/// let weight = tensor!([[0.0, 0.0, 0.0]]);
/// let bias = tensor!([[0.0, 0.0, 0.0]]);
/// let mut gate = Ten64::zeros(vec![1, 3]);
/// let mut reset_hidden_prev = Ten64::zeros(vec![1, 1]);
/// let mut hidden = Ten64::zeros(vec![1, 1]);
/// gru_unit(
///     &input, &hidden_prev, &weight, &bias,
///     &mut gate, &mut reset_hidden_prev, &mut hidden,
///     GruUnitAttrs::default(),
/// );
/// // sigmoid(0) = 0.5 update gate blends a zero candidate with hidden_prev
/// assert!((hidden.data[0] - 0.5).abs() < 1e-12);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn gru_unit(
    input: &Ten64,
    hidden_prev: &Ten64,
    weight: &Ten64,
    bias: &Ten64,
    gate: &mut Ten64,
    reset_hidden_prev: &mut Ten64,
    hidden: &mut Ten64,
    attrs: GruUnitAttrs,
) {
    let batch_size = input.shape[0];
    let frame_size = hidden_prev.shape[1];
    assert!(
        batch_size > 0 && frame_size > 0,
        "gru_unit: batch and frame sizes must be positive"
    );
    assert_eq!(
        input.shape,
        vec![batch_size, 3 * frame_size],
        "gru_unit: input must be [batch, 3 * frame]"
    );
    assert_eq!(
        hidden_prev.shape,
        vec![batch_size, frame_size],
        "gru_unit: hidden_prev must be [batch, frame]"
    );
    assert_eq!(
        weight.shape,
        vec![frame_size, 3 * frame_size],
        "gru_unit: weight must be [frame, 3 * frame]"
    );
    assert_eq!(
        bias.shape,
        vec![1, 3 * frame_size],
        "gru_unit: bias must be [1, 3 * frame]"
    );
    assert_eq!(
        gate.shape,
        vec![batch_size, 3 * frame_size],
        "gru_unit: gate must be [batch, 3 * frame]"
    );
    assert_eq!(
        reset_hidden_prev.shape,
        vec![batch_size, frame_size],
        "gru_unit: reset_hidden_prev must be [batch, frame]"
    );
    assert_eq!(
        hidden.shape,
        vec![batch_size, frame_size],
        "gru_unit: hidden must be [batch, frame]"
    );

    let stride = 3 * frame_size;

    // gate <- input + broadcast(bias)
    gate.data
        .par_chunks_mut(stride)
        .zip(input.data.par_chunks(stride))
        .for_each(|(gate_row, input_row)| {
            for j in 0..stride {
                gate_row[j] = input_row[j] + bias.data[j];
            }
        });

    // gate[:, 0..2F] += hidden_prev * W_ur
    gemm(
        false,
        false,
        batch_size,
        2 * frame_size,
        frame_size,
        1.0,
        &hidden_prev.data,
        frame_size,
        &weight.data[..2 * frame_size * frame_size],
        2 * frame_size,
        1.0,
        &mut gate.data,
        stride,
    );

    // activate update/reset gates, then scale hidden_prev by the reset gate
    gate.data
        .par_chunks_mut(stride)
        .zip(reset_hidden_prev.data.par_chunks_mut(frame_size))
        .zip(hidden_prev.data.par_chunks(frame_size))
        .for_each(|((gate_row, reset_row), prev_row)| {
            let (update, rest) = gate_row.split_at_mut(frame_size);
            let reset_gate = &mut rest[..frame_size];
            attrs.gate_activation.apply(update);
            attrs.gate_activation.apply(reset_gate);
            for j in 0..frame_size {
                reset_row[j] = reset_gate[j] * prev_row[j];
            }
        });

    // gate[:, 2F..3F] += reset_hidden_prev * W_c
    gemm(
        false,
        false,
        batch_size,
        frame_size,
        frame_size,
        1.0,
        &reset_hidden_prev.data,
        frame_size,
        &weight.data[2 * frame_size * frame_size..],
        frame_size,
        1.0,
        &mut gate.data[2 * frame_size..],
        stride,
    );

    // activate the candidate, then blend: hidden <- u * (hidden_prev - c) + c
    gate.data
        .par_chunks_mut(stride)
        .zip(hidden.data.par_chunks_mut(frame_size))
        .zip(hidden_prev.data.par_chunks(frame_size))
        .for_each(|((gate_row, hidden_row), prev_row)| {
            let (update, rest) = gate_row.split_at_mut(frame_size);
            let cand = &mut rest[frame_size..];
            attrs.state_activation.apply(cand);
            for j in 0..frame_size {
                hidden_row[j] = update[j] * (prev_row[j] - cand[j]) + cand[j];
            }
        });
}

/// Exact adjoint of [`gru_unit`]: given the gradient of the new hidden
/// state, fills the gradients of the input projection, the previous hidden
/// state, the weight arena and the bias.
///
/// `gate` and `reset_hidden_prev` must be the unmodified outputs of the
/// forward call being differentiated; the kernel reads their post-activation
/// values instead of recomputing anything.
///
/// The pass works through two kernel-local scratch buffers (the gate
/// gradient and the reset-product gradient) in a fixed statement order:
/// the update and candidate blocks of the gate gradient are finalized
/// first, each subsequent GEMM consumes only blocks finalized before it
/// runs, and the hidden-state GEMM reads the original weights, never the
/// weight gradient.
///
/// Weight gradients are written (not accumulated) into `weight_grad`, with
/// the update/reset block at offset 0 and the candidate block at offset
/// `2 * frame * frame`, mirroring the forward weight arena. `input_grad`
/// receives the gate gradient unchanged, and `bias_grad` its columnwise
/// sum over the batch.
///
/// # Panics
/// Panics under the same shape contract as [`gru_unit`], extended to the
/// gradient tensors (each must mirror the shape it differentiates).
///
/// # Example
/// ```rust
/// use gru_unit::activations::{Activation, GruUnitAttrs};
/// use gru_unit::ops::cpu::{gru_unit, gru_unit_grad};
/// use gru_unit::tensor;
/// use gru_unit::tensors::Ten64;
///
/// let attrs = GruUnitAttrs {
///     gate_activation: Activation::Identity,
///     state_activation: Activation::Identity,
/// };
/// let input = tensor!([[0.1, 0.2, 0.3]]);
/// let hidden_prev = tensor!([[0.5]]);
/// let weight = tensor!([[0.2, 0.4, 0.6]]);
/// let bias = tensor!([[0.0, 0.0, 0.0]]);
/// let mut gate = Ten64::zeros(vec![1, 3]);
/// let mut reset_hidden_prev = Ten64::zeros(vec![1, 1]);
/// let mut hidden = Ten64::zeros(vec![1, 1]);
/// gru_unit(
///     &input, &hidden_prev, &weight, &bias,
///     &mut gate, &mut reset_hidden_prev, &mut hidden, attrs,
/// );
///
/// let hidden_grad = tensor!([[1.0]]);
/// let mut input_grad = Ten64::zeros(vec![1, 3]);
/// let mut hidden_prev_grad = Ten64::zeros(vec![1, 1]);
/// let mut weight_grad = Ten64::zeros(vec![1, 3]);
/// let mut bias_grad = Ten64::zeros(vec![1, 3]);
/// gru_unit_grad(
///     &hidden_prev, &weight, &gate, &reset_hidden_prev, &hidden_grad,
///     &mut input_grad, &mut hidden_prev_grad, &mut weight_grad,
///     &mut bias_grad, attrs,
/// );
/// // with a single batch row the bias gradient equals the input gradient
/// assert_eq!(input_grad.data, bias_grad.data);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn gru_unit_grad(
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
    let batch_size = hidden_prev.shape[0];
    let frame_size = hidden_prev.shape[1];
    assert!(
        batch_size > 0 && frame_size > 0,
        "gru_unit_grad: batch and frame sizes must be positive"
    );
    assert_eq!(
        hidden_prev.shape,
        vec![batch_size, frame_size],
        "gru_unit_grad: hidden_prev must be [batch, frame]"
    );
    assert_eq!(
        weight.shape,
        vec![frame_size, 3 * frame_size],
        "gru_unit_grad: weight must be [frame, 3 * frame]"
    );
    assert_eq!(
        gate.shape,
        vec![batch_size, 3 * frame_size],
        "gru_unit_grad: gate must be [batch, 3 * frame]"
    );
    assert_eq!(
        reset_hidden_prev.shape,
        vec![batch_size, frame_size],
        "gru_unit_grad: reset_hidden_prev must be [batch, frame]"
    );
    assert_eq!(
        hidden_grad.shape,
        vec![batch_size, frame_size],
        "gru_unit_grad: hidden_grad must be [batch, frame]"
    );
    assert_eq!(
        input_grad.shape,
        vec![batch_size, 3 * frame_size],
        "gru_unit_grad: input_grad must be [batch, 3 * frame]"
    );
    assert_eq!(
        hidden_prev_grad.shape,
        vec![batch_size, frame_size],
        "gru_unit_grad: hidden_prev_grad must be [batch, frame]"
    );
    assert_eq!(
        weight_grad.shape,
        vec![frame_size, 3 * frame_size],
        "gru_unit_grad: weight_grad must be [frame, 3 * frame]"
    );
    assert_eq!(
        bias_grad.shape,
        vec![1, 3 * frame_size],
        "gru_unit_grad: bias_grad must be [1, 3 * frame]"
    );

    let stride = 3 * frame_size;
    let mut gate_grad = vec![0.0; batch_size * stride];
    let mut reset_hidden_prev_grad = vec![0.0; batch_size * frame_size];

    // unactivated update gate and candidate
    gate_grad
        .par_chunks_mut(stride)
        .zip(gate.data.par_chunks(stride))
        .zip(hidden_grad.data.par_chunks(frame_size))
        .zip(hidden_prev.data.par_chunks(frame_size))
        .for_each(|(((dg_row, g_row), dh_row), prev_row)| {
            let update = &g_row[..frame_size];
            let cand = &g_row[2 * frame_size..];
            for j in 0..frame_size {
                dg_row[j] = dh_row[j] * (prev_row[j] - cand[j]);
            }
            attrs.gate_activation.apply_grad(update, &mut dg_row[..frame_size]);
            for j in 0..frame_size {
                dg_row[2 * frame_size + j] = dh_row[j] * (1.0 - update[j]);
            }
            attrs.state_activation.apply_grad(cand, &mut dg_row[2 * frame_size..]);
        });

    // reset_hidden_prev
    gemm(
        false,
        true,
        batch_size,
        frame_size,
        frame_size,
        1.0,
        &gate_grad[2 * frame_size..],
        stride,
        &weight.data[2 * frame_size * frame_size..],
        frame_size,
        0.0,
        &mut reset_hidden_prev_grad,
        frame_size,
    );

    // candidate weight block
    gemm(
        true,
        false,
        frame_size,
        frame_size,
        batch_size,
        1.0,
        &reset_hidden_prev.data,
        frame_size,
        &gate_grad[2 * frame_size..],
        stride,
        0.0,
        &mut weight_grad.data[2 * frame_size * frame_size..],
        frame_size,
    );

    // unactivated reset gate
    gate_grad
        .par_chunks_mut(stride)
        .zip(gate.data.par_chunks(stride))
        .zip(reset_hidden_prev_grad.par_chunks(frame_size))
        .zip(hidden_prev.data.par_chunks(frame_size))
        .for_each(|(((dg_row, g_row), drhp_row), prev_row)| {
            let reset_gate = &g_row[frame_size..2 * frame_size];
            for j in 0..frame_size {
                dg_row[frame_size + j] = drhp_row[j] * prev_row[j];
            }
            attrs
                .gate_activation
                .apply_grad(reset_gate, &mut dg_row[frame_size..2 * frame_size]);
        });

    // update/reset weight block
    gemm(
        true,
        false,
        frame_size,
        2 * frame_size,
        batch_size,
        1.0,
        &hidden_prev.data,
        frame_size,
        &gate_grad,
        stride,
        0.0,
        &mut weight_grad.data[..2 * frame_size * frame_size],
        2 * frame_size,
    );

    // hidden_prev: direct paths through the reset product and the carry
    hidden_prev_grad
        .data
        .par_chunks_mut(frame_size)
        .zip(gate.data.par_chunks(stride))
        .zip(reset_hidden_prev_grad.par_chunks(frame_size))
        .zip(hidden_grad.data.par_chunks(frame_size))
        .for_each(|(((dhp_row, g_row), drhp_row), dh_row)| {
            for j in 0..frame_size {
                dhp_row[j] = drhp_row[j] * g_row[frame_size + j] + dh_row[j] * g_row[j];
            }
        });

    // hidden_prev: indirect path through the gate projection
    gemm(
        false,
        true,
        batch_size,
        frame_size,
        2 * frame_size,
        1.0,
        &gate_grad,
        stride,
        &weight.data[..2 * frame_size * frame_size],
        2 * frame_size,
        1.0,
        &mut hidden_prev_grad.data,
        frame_size,
    );

    // input projection passes the gate gradient through unchanged
    input_grad.data.copy_from_slice(&gate_grad);

    // broadcast's adjoint is a columnwise reduction
    bias_grad
        .data
        .par_iter_mut()
        .enumerate()
        .for_each(|(j, db)| {
            *db = gate_grad[j..].iter().step_by(stride).sum();
        });
}

/// Computes the mean squared error (MSE) between predictions and targets,
/// returning both the scalar loss and a gradient function.
///
/// # Formula
/// $$ L = \\frac{1}{n} \\sum_i (y_i - t_i)^2 $$
///
/// # Returns
/// - Scalar loss `f64`
/// - Backward function mapping upstream scalar gradient `dL` to a tensor of shape `prediction`
///
/// # Panics
/// - If `prediction` and `target` shapes differ.
///
/// # Notes
/// - Forward and backward passes are fully parallelized with `rayon`
/// - Suitable for batch or scalar regression losses
///
/// # Example
/// ```rust
/// use gru_unit::backprop::mse_loss;
/// use gru_unit::tensors::WithGrad;
/// use gru_unit::tensor;
///
/// let y_pred = WithGrad::new(tensor!([1.0, 2.0, 3.0]));
/// let y_true = tensor!([1.0, 3.0, 2.0]);
/// let (loss, back) = mse_loss(&y_pred, &y_true);
/// let grad_tensor = back(1.0); // dL/dy_pred
/// ```
pub fn mse_loss<'a>(
    prediction: &'a WithGrad<Ten64>,
    target: &'a Ten64,
) -> (f64, Box<FnF64Ten64<'a>>) {
    assert_eq!(
        prediction.value.shape, target.shape,
        "mse_loss shape mismatch"
    );
    let n = prediction.value.data.len() as f64;

    // parallel forward pass
    let loss = prediction
        .value
        .data
        .par_iter()
        .zip(&target.data)
        .map(|(&y, &t)| (y - t).powi(2))
        .sum::<f64>()
        / n;

    let shape = prediction.value.shape.clone();
    let pred_data = prediction.value.data.clone();
    let target_data = target.data.clone();

    // parallel backward pass
    let back = move |grad_output: f64| {
        let grad: Vec<f64> = pred_data
            .par_iter()
            .zip(&target_data)
            .map(|(&y, &t)| 2.0 * (y - t) * grad_output / n)
            .collect();

        Tensor::new(shape.clone(), grad)
    };

    (loss, Box::new(back))
}

/// Performs one step of stochastic gradient descent (SGD) on the given parameter tensor.
///
/// # Formula
/// $$ w := w - \\text{lr} \\cdot \\frac{\\partial L}{\\partial w} $$
///
/// # Behavior
/// - Updates `w.value` in-place
/// - Zeros out `w.grad` after update (gradient reset step)
///
/// # Arguments
/// - `w`: Tensor with gradient to be updated
/// - `lr`: Learning rate (step size)
///
/// # Example
/// ```rust
/// use gru_unit::backprop::sgd;
/// use gru_unit::tensor;
/// use gru_unit::tensors::WithGrad;
///
/// let mut weights = WithGrad::new(tensor!([3.0, 5.0, 4.0]));
/// sgd(&mut weights, 0.01);
/// ```
pub fn sgd(w: &mut WithGrad<Ten64>, lr: f64) {
    for (param, grad) in w.value.data.iter_mut().zip(&w.grad.data) {
        *param -= lr * *grad;
    }
    for grad in &mut w.grad.data {
        *grad = 0.0;
    }
}
