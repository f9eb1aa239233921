//! gru_unit: Fused GRU cell kernels with autodiff, in Rust.
//!
//! Designed for high-performance recurrent computation: one library call runs a
//! full GRU time step for a whole batch, and one more produces every gradient
//! the step needs for training.
//!
//! # Features
//!
//! - Dense row-major tensors with paired gradient storage.
//! - Fused forward/backward GRU kernels with manual backpropagation closures.
//! - Runtime backend selection across CPU, WGPU and (planned) CUDA.
//! - Parameter serialization and deserialization with integrity checks.
//!
//! # Goals
//!
//! - Enable easy experimentation with recurrent models in Rust.
//! - Keep every pass explicit: no graph object, no hidden allocation.
//! - Stay small enough to read in one sitting and port to new backends.
//!
//! # Modules
//!
//! - [`tensors`] — Core tensor data structures.
//! - [`activations`] — Gate and candidate activation functions.
//! - [`backend`] — Global compute-backend selection.
//! - [`backprop`] — The training-facing op wrappers and their closures.
//! - [`ops`] — The kernels themselves, per backend, plus dispatch.
//! - [`paramio`] — Robust saving/loading of trained parameters with integrity checks.
//!
//! # Future Directions
//!
//! - Multi-step sequence driver with truncated backpropagation through time.
//! - Native CUDA kernels instead of the WGPU passthrough.
//! - Fused GPU gate math so only the hidden state crosses the bus.
//!
//! # Example
//!
//! ```rust
//! use gru_unit::activations::GruUnitAttrs;
//! use gru_unit::backprop::{gru_unit, mse_loss, sgd};
//! use gru_unit::tensor;
//! use gru_unit::tensors::WithGrad;
//!
//! let input = WithGrad::new(tensor!([[0.1, 0.2, 0.3]]));
//! let hidden_prev = WithGrad::new(tensor!([[0.5]]));
//! let mut weight = WithGrad::new(tensor!([[0.2, 0.4, 0.6]]));
//! let bias = WithGrad::new(tensor!([[0.0, 0.0, 0.0]]));
//!
//! let (hidden, back) = gru_unit(&input, &hidden_prev, &weight, &bias, GruUnitAttrs::default());
//! let pred = WithGrad::new(hidden);
//! let target = tensor!([[1.0]]);
//!
//! let (loss, dloss) = mse_loss(&pred, &target);
//! let grads = back(&dloss(1.0));
//! for (w, g) in weight.grad.data.iter_mut().zip(&grads.weight.data) {
//!     *w += g;
//! }
//! sgd(&mut weight, 0.1);
//! assert!(loss > 0.0);
//! ```
//!
pub mod activations;
pub mod backend;
pub mod backprop;
pub mod ops;
pub mod paramio;
pub mod tensors;
