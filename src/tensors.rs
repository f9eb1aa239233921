//! Core tensor data structures for the GRU kernels.
//!
//! # Core Tensor Utilities
//!
//! This module defines the representation every kernel in this crate computes
//! over: dense tensors with a runtime shape and flat row-major storage.
//!
//! It supports:
//! - N-dimensional construction with an explicit shape over flat row-major storage
//! - Zero-filled allocation for caller-provided kernel outputs
//! - Autograd-compatible `WithGrad` wrappers pairing a value with its gradient
//! - A `tensor!` literal macro for fixtures and demos
//!
//! ## Design Highlights
//! - Tensors are strongly typed: `Tensor<T>` for any element type; the kernels
//!   themselves run on `Ten64` (`Tensor<f64>`)
//! - Shape is runtime data (`Vec<usize>`), checked where tensors are built
//! - `WithGrad<T>` carries a value and its gradient side by side
//!
//! ## Limitations
//! - Row-major layout only
//! - No broadcasting, slicing, or shape inference (the kernels address
//!   sub-blocks through explicit offsets and leading dimensions instead)
//!
//! ## Example
//!
//! ```rust
//! use gru_unit::tensors::Tensor;
//! let t = Tensor::new(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! assert_eq!(t.shape, vec![2, 3]);
//! ```

/// An N-dimensional tensor: a runtime `shape` over flat row-major `data`.
///
/// - `shape` defines the structure, e.g., `[2, 3]` for a 2×3 matrix.
/// - The last axis is contiguous in `data`; `data.len()` always equals the
///   shape product.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    pub shape: Vec<usize>,
    pub data: Vec<T>,
}

/// The tensor type the GRU kernels operate on.
pub type Ten64 = Tensor<f64>;

impl<T> Tensor<T> {
    /// Builds a tensor from a shape and its flat row-major contents.
    ///
    /// # Panics
    /// Panics if `data.len()` differs from the product of `shape`.
    pub fn new(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Self {
        let shape = shape.into();
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "shape {:?} is incompatible with {} data elements",
            shape,
            data.len()
        );
        Self { shape, data }
    }
}

impl<T: Clone + Default> Tensor<T> {
    /// Creates a tensor of the given shape filled with `T::default()`.
    ///
    /// Kernel outputs are caller-allocated; this is the usual way to
    /// allocate them before a kernel fills them in place.
    ///
    /// # Example
    /// ```rust
    /// use gru_unit::tensors::Ten64;
    /// let gate = Ten64::zeros(vec![4, 6]);
    /// assert_eq!(gate.data.len(), 24);
    /// ```
    pub fn zeros(shape: impl Into<Vec<usize>>) -> Self {
        let shape = shape.into();
        let len = shape.iter().product::<usize>();
        Self {
            shape,
            data: vec![T::default(); len],
        }
    }
}

/// A value paired with the gradient accumulated for it.
///
/// Typically used as `WithGrad<Ten64>` for trainable parameters.
#[derive(Debug, Clone)]
pub struct WithGrad<T> {
    pub value: T,
    pub grad: T,
}

impl<T: Clone + Default> WithGrad<Tensor<T>> {
    /// Wraps a tensor together with a zero-filled gradient of the same shape.
    ///
    /// # Example
    /// ```rust
    /// use gru_unit::tensor;
    /// use gru_unit::tensors::WithGrad;
    /// let w = WithGrad::new(tensor!([[1.0, 2.0, 3.0]]));
    /// assert_eq!(w.grad.shape, vec![1, 3]);
    /// assert_eq!(w.grad.data, vec![0.0; 3]);
    /// ```
    pub fn new(value: Tensor<T>) -> Self {
        let grad = Tensor::zeros(value.shape.clone());
        Self { value, grad }
    }
}

/// Builds a tensor from nested array literals.
///
/// Any nesting depth works as long as sibling rows agree in shape.
///
/// # Example
/// ```
/// use gru_unit::tensor;
/// let t = tensor!([[1.0, 2.0], [3.0, 4.0]]);
/// assert_eq!(t.shape, vec![2, 2]);
/// ```
#[macro_export]
macro_rules! tensor {
    ($lit:literal) => {
        $crate::tensors::Tensor::new(Vec::<usize>::new(), vec![$lit])
    };

    ([ $( $inner:tt ),+ $(,)? ]) => {{
        let children = vec![ $( tensor!($inner) ),+ ];
        let first_shape = &children[0].shape;
        assert!(children.iter().all(|c| c.shape == *first_shape),
            "ragged tensor literal (rows have mismatched shapes)");
        let mut shape = vec![children.len()];
        shape.extend_from_slice(first_shape);
        let mut data = Vec::with_capacity(children.len() * children[0].data.len());
        for c in children { data.extend(c.data); }
        $crate::tensors::Tensor::new(shape, data)
    }};
}
