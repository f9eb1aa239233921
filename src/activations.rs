//! Elementwise activation functions for the GRU gate and candidate blocks.
//!
//! # Activation Family
//!
//! The GRU kernels are parameterized over two activation selectors: one for
//! the update/reset gates and one for the candidate state. Each selector is
//! one of four interchangeable unary functions, dispatched through a plain
//! enum rather than trait objects.
//!
//! ## Design Highlights
//! - `apply` works in place on a mutable slice, so the kernels can activate
//!   a gate block inside a larger buffer without copying. Reading and
//!   writing the same region is safe because every function is elementwise.
//! - `apply_grad` takes the saved forward *output* `y` instead of the
//!   pre-activation input. For sigmoid and tanh the derivative is cheaper
//!   to express in terms of `y`, and for relu the sign of `y` decides the
//!   non-smooth point, so the input is never needed at all.
//! - Selectors cross serialization boundaries as `u8` codes. Decoding an
//!   out-of-range code is a construction-time configuration error, reported
//!   through [`UnknownActivation`] and never deferred to kernel time.
//!
//! ## Example
//!
//! ```rust
//! use gru_unit::activations::Activation;
//!
//! let mut xs = [0.0, 1.0];
//! Activation::Sigmoid.apply(&mut xs);
//! assert!((xs[0] - 0.5).abs() < 1e-12);
//! ```

use std::error::Error;
use std::fmt;

/// One of the four activation functions the GRU kernels accept.
///
/// The discriminants are the wire codes used by [`crate::paramio`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Activation {
    /// `y = x`; gradient passes through unchanged.
    Identity = 0,
    /// `y = 1 / (1 + e^-x)`; gradient `y * (1 - y)`.
    Sigmoid = 1,
    /// `y = tanh(x)`; gradient `1 - y^2`.
    Tanh = 2,
    /// `y = max(x, 0)`; gradient is `dy` where `y > 0`, else `0`.
    Relu = 3,
}

impl Activation {
    /// Applies the activation elementwise, in place.
    ///
    /// The slice serves as both input and output; this is how the forward
    /// kernel overwrites gate pre-activations with their activated values.
    pub fn apply(self, xs: &mut [f64]) {
        match self {
            Self::Identity => {}
            Self::Sigmoid => {
                for x in xs {
                    *x = 1.0 / (1.0 + (-*x).exp());
                }
            }
            Self::Tanh => {
                for x in xs {
                    *x = x.tanh();
                }
            }
            Self::Relu => {
                for x in xs {
                    *x = x.max(0.0);
                }
            }
        }
    }

    /// Scales an upstream gradient by the activation's local derivative.
    ///
    /// `y` is the activated output saved from the forward pass, and `d`
    /// holds the upstream gradient `dy` on entry and the downstream
    /// gradient `dx` on exit.
    ///
    /// # Panics
    /// Panics if `y` and `d` have different lengths.
    ///
    /// # Example
    /// ```rust
    /// use gru_unit::activations::Activation;
    ///
    /// let y = [0.5];
    /// let mut d = [2.0];
    /// Activation::Sigmoid.apply_grad(&y, &mut d);
    /// assert!((d[0] - 0.5).abs() < 1e-12);
    /// ```
    pub fn apply_grad(self, y: &[f64], d: &mut [f64]) {
        assert_eq!(y.len(), d.len(), "activation gradient length mismatch");
        match self {
            Self::Identity => {}
            Self::Sigmoid => {
                for (d_i, y_i) in d.iter_mut().zip(y) {
                    *d_i *= y_i * (1.0 - y_i);
                }
            }
            Self::Tanh => {
                for (d_i, y_i) in d.iter_mut().zip(y) {
                    *d_i *= 1.0 - y_i * y_i;
                }
            }
            Self::Relu => {
                for (d_i, y_i) in d.iter_mut().zip(y) {
                    if *y_i <= 0.0 {
                        *d_i = 0.0;
                    }
                }
            }
        }
    }
}

/// Error returned when an activation code read from external input is not
/// one of the four recognized kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownActivation(pub u8);

impl fmt::Display for UnknownActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported activation type: {}", self.0)
    }
}

impl Error for UnknownActivation {}

impl TryFrom<u8> for Activation {
    type Error = UnknownActivation;

    /// Decodes a raw selector byte.
    ///
    /// There is no silent default; a code outside the four kinds is an error.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Identity),
            1 => Ok(Self::Sigmoid),
            2 => Ok(Self::Tanh),
            3 => Ok(Self::Relu),
            other => Err(UnknownActivation(other)),
        }
    }
}

/// The two activation selectors a GRU unit is configured with.
///
/// `gate_activation` acts on the update and reset gates, `state_activation`
/// on the candidate state. The default pairing is the classic
/// sigmoid-gates/tanh-candidate GRU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GruUnitAttrs {
    pub gate_activation: Activation,
    pub state_activation: Activation,
}

impl Default for GruUnitAttrs {
    fn default() -> Self {
        Self {
            gate_activation: Activation::Sigmoid,
            state_activation: Activation::Tanh,
        }
    }
}
