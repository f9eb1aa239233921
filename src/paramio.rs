//! Robust saving/loading of GRU parameters.
//!
//! # `.grup` Parameter Serialization Format
//!
//! Saves and reloads a GRU unit's trained parameters in a small custom binary
//! format, meant for checkpointing single cells rather than whole models.
//! Loading goes through a validation boundary, so a corrupt or hostile file
//! is rejected before any of its numbers are used.
//!
//! # Format Overview
//!
//! A `.grup` file stores one parameter set in the following layout:
//!
//! ```text
//! ┌──────────────────┬──────────────────────────────┐
//! │ Header           │ Parameters                   │
//! ├──────────────────┼──────────────────────────────┤
//! │ "grup"[4] magic  │ [f64; 3·frame²] weight       │
//! │ u32: frame size  │ [f64; 3·frame]  bias         │
//! │ u8: gate act     │                              │
//! │ u8: state act    │                              │
//! └──────────────────┴──────────────────────────────┘
//! ```
//!
//! ## Header
//! - `grup` magic (4 bytes): ensures file is recognized
//! - `u32` frame size: hidden-state width, fixes every following length
//! - two `u8` activation codes: gate and candidate selectors
//!
//! ## Parameter Encoding
//! - `weight` (`f64 * 3 * frame^2`): packed `[frame, 3 * frame]` tensor, row-major
//! - `bias` (`f64 * 3 * frame`): packed `[1, 3 * frame]` tensor
//!
//! # Design Principles
//! - One file is one complete, loadable cell
//! - Plain little-endian bytes, no compression or encryption
//! - Byte-for-byte deterministic given the same parameters
//! - Every length in the payload is derivable from the header
//!
//! # Limitations
//! - `f64` elements only
//! - One parameter set per file
//! - No optimizer state (momentum, step counts, etc.)
//!
//! # Example
//!
//! ```rust
//! use gru_unit::activations::GruUnitAttrs;
//! use gru_unit::paramio::{save_params, load_params, GruUnitParams};
//! use gru_unit::tensors::Tensor;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let params = GruUnitParams {
//!         weight: Tensor::new(vec![1, 3], vec![0.2, 0.4, 0.6]),
//!         bias: Tensor::new(vec![1, 3], vec![0.0, 0.0, 0.0]),
//!         attrs: GruUnitAttrs::default(),
//!     };
//!
//!     save_params("cell.grup", &params)?;
//!     let restored = load_params("cell.grup")?;
//!     assert_eq!(restored.weight.data, params.weight.data);
//!
//!     std::fs::remove_file("cell.grup")?;
//!     Ok(())
//! }
//! ```

use crate::activations::{Activation, GruUnitAttrs};
use crate::tensors::{Ten64, Tensor};
use briny::prelude::*;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};

const GRUP_MAGIC: &[u8; 4] = b"grup";

/// A trained GRU unit: packed weights, bias, and the activation pairing
/// the weights were trained under.
#[derive(Debug, Clone)]
pub struct GruUnitParams {
    /// Packed `[frame, 3 * frame]` weight tensor (update/reset blocks, then candidate).
    pub weight: Ten64,
    /// `[1, 3 * frame]` bias row, broadcast over the batch.
    pub bias: Ten64,
    /// Activation selectors for the gates and the candidate.
    pub attrs: GruUnitAttrs,
}

/// Internal representation of a packed parameter set.
struct PackedParams {
    frame_size: u32,
    gate_activation: u8,
    state_activation: u8,
    weight: Vec<f64>,
    bias: Vec<f64>,
}

impl Validate for PackedParams {
    fn validate(&self) -> Result<(), ValidationError> {
        let frame = self.frame_size as usize;
        if frame == 0 {
            return Err(ValidationError);
        }
        if self.weight.len() != 3 * frame * frame || self.bias.len() != 3 * frame {
            return Err(ValidationError);
        }
        if Activation::try_from(self.gate_activation).is_err()
            || Activation::try_from(self.state_activation).is_err()
        {
            return Err(ValidationError);
        }
        Ok(())
    }
}

/// Save a GRU parameter set to a `.grup` file.
///
/// - Uses a simple binary format with a magic header and a frame-size field.
/// - Weight and bias are written as flattened little-endian f64 data.
///
/// # Arguments
/// - `path`: Output file path.
/// - `params`: Parameter set to save.
///
/// # Errors
/// - Returns an error if file I/O or write fails.
///
/// # Panics
/// - Panics if the weight is not `[frame, 3 * frame]` or the bias is not
///   `[1, 3 * frame]`.
pub fn save_params(path: &str, params: &GruUnitParams) -> Result<(), Box<dyn Error>> {
    let frame = params.weight.shape[0];
    assert_eq!(
        params.weight.shape,
        vec![frame, 3 * frame],
        "weight shape/frame mismatch"
    );
    assert_eq!(
        params.bias.shape,
        vec![1, 3 * frame],
        "bias shape/frame mismatch"
    );

    let mut file = BufWriter::new(File::create(path)?);

    // write magic header, frame size, and activation codes
    file.write_all(GRUP_MAGIC)?;
    file.write_all(&(frame as u32).to_le_bytes())?;
    file.write_all(&[
        params.attrs.gate_activation as u8,
        params.attrs.state_activation as u8,
    ])?;

    for &val in &params.weight.data {
        file.write_all(&val.to_le_bytes())?;
    }
    for &val in &params.bias.data {
        file.write_all(&val.to_le_bytes())?;
    }

    Ok(())
}

/// Load a GRU parameter set from a `.grup` file.
///
/// - Validates the magic header, then reads the frame size, activation codes,
///   weight, and bias.
/// - Assumes all data is `f64`, little-endian encoded.
///
/// # Arguments
/// - `path`: File path to read.
///
/// # Returns
/// - The [`GruUnitParams`] stored in the file.
///
/// # Errors
/// - Fails if the file does not start with `grup`, is truncated, declares a
///   zero frame size, or carries an unknown activation code.
pub fn load_params(path: &str) -> Result<GruUnitParams, Box<dyn Error>> {
    let mut file = BufReader::new(File::open(path)?);
    let mut buf8 = [0u8; 8];

    // magic header
    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)?;
    if &magic != GRUP_MAGIC {
        return Err("invalid magic header".into());
    }

    // frame size, bounded so the element counts below cannot overflow
    let mut buf4 = [0u8; 4];
    file.read_exact(&mut buf4)?;
    let frame_size = u32::from_le_bytes(buf4);
    if frame_size == 0 || frame_size > 1 << 16 {
        return Err("frame size out of range".into());
    }

    // activation codes
    let mut codes = [0u8; 2];
    file.read_exact(&mut codes)?;

    let frame = frame_size as usize;
    let mut weight = Vec::with_capacity(3 * frame * frame);
    for _ in 0..3 * frame * frame {
        file.read_exact(&mut buf8)?;
        weight.push(f64::from_le_bytes(buf8));
    }

    let mut bias = Vec::with_capacity(3 * frame);
    for _ in 0..3 * frame {
        file.read_exact(&mut buf8)?;
        bias.push(f64::from_le_bytes(buf8));
    }

    let raw = PackedParams {
        frame_size,
        gate_activation: codes[0],
        state_activation: codes[1],
        weight,
        bias,
    };
    let trusted = TrustedData::new(raw)?;
    let inner = trusted.into_inner();

    Ok(GruUnitParams {
        weight: Tensor::new(vec![frame, 3 * frame], inner.weight),
        bias: Tensor::new(vec![1, 3 * frame], inner.bias),
        attrs: GruUnitAttrs {
            gate_activation: Activation::try_from(inner.gate_activation)?,
            state_activation: Activation::try_from(inner.state_activation)?,
        },
    })
}
