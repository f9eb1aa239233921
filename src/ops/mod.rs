//! # Operation Dispatch Layer
//!
//! The forward and backward GRU kernels live here, once per compute backend,
//! together with the routing that picks a backend at call time.
//!
//! ## Submodules
//!
//! - [`cpu`] — Rayon-parallel kernels with an optional AVX2 GEMM inner loop;
//!   every dispatch can land here
//! - [`wgpu`] *(opt-in)* — Runs the kernels' GEMMs as GPU compute passes
//! - [`cuda`] *(planned)* — CUDA stubs, currently routed through [`wgpu`]
//! - [`dispatch`] — Reads the global [`crate::backend::Backend`] and calls
//!   the right kernel pair
//!
//! ## Backend Selection
//!
//! Callers never name a backend at the call site. [`dispatch`] samples the
//! process-wide selector once per invocation; a GPU path that cannot run
//! (no adapter, bad shapes, shader failure) makes that invocation fall
//! back to the CPU kernels, which accept everything.
//!
//! Example:
//! ```rust
//! use gru_unit::activations::GruUnitAttrs;
//! use gru_unit::backend::Backend;
//! use gru_unit::backprop::gru_unit;
//! use gru_unit::tensors::WithGrad;
//! use gru_unit::tensor;
//!
//! let input = WithGrad::new(tensor!([[0.0, 0.0, 0.0]]));
//! let hidden_prev = WithGrad::new(tensor!([[1.0]]));
//! let weight = WithGrad::new(tensor!([[0.0, 0.0, 0.0]]));
//! let bias = WithGrad::new(tensor!([[0.0, 0.0, 0.0]]));
//! let backend = Backend::default(); // defaults to CPU
//! let (hidden, _back) = gru_unit(&input, &hidden_prev, &weight, &bias, GruUnitAttrs::default());
//! assert_eq!(hidden.data[0], 0.5); // sigmoid(0) = 0.5 blends halfway to tanh(0) = 0
//! ```
//!
//! ## Extending the Backend
//!
//! A new backend slots in the same way the GPU one does:
//!
//! 1. Implement the kernel pair against the same buffers and attributes
//! 2. Return `bool` so [`dispatch`] can fall through to the CPU on failure
//! 3. Gate the module and its dispatch arm behind a feature flag
//!
//! ## Notes
//!
//! - The AVX2 and GPU paths only compile under their feature flags; the
//!   default build is portable CPU code
//! - The GPU backends compute in `f32`, so results differ from the CPU's
//!   `f64` at roughly single-precision accuracy
//! - The dispatched forward pass returns both the new hidden state and a
//!   backward closure
//!
//! ## Goals
//!
//! - One kernel contract shared by every backend
//! - Fall back, never fail, when a device is missing
//! - Keep the hot loops free of dispatch overhead
//!
//! ## Feature Flags
//!
//! - `simd` — Enables AVX2-accelerated CPU paths
//! - `wgpu` — Enables `wgpu` (WebGPU) backend
//! - `cuda` — Enables placeholder CUDA module (dispatches to WGPU)

pub mod dispatch;
pub mod cpu;
#[cfg(feature = "cuda")]
pub mod cuda;
#[cfg(any(feature = "wgpu", feature = "cuda"))]
pub mod wgpu;
