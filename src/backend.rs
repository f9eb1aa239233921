//! Global compute-backend selection.
//!
//! The GRU kernels are dispatched through [`crate::ops::dispatch`], which
//! reads the process-wide backend once per call and routes the matrix
//! multiplies accordingly.
//!
//! # Supported Backends
//!
//! - `Cpu` — Pure Rust backend using rayon-parallel CPU kernels (default).
//! - `Wgpu` — GPU-accelerated GEMMs using `wgpu` (behind the `wgpu` feature).
//! - `Cuda` — Placeholder that currently routes to the `wgpu` implementation.
//!
//! The selector lives in an `AtomicU8`, so switching costs one store and
//! dispatch costs one load. A kernel invocation reads the backend once when
//! dispatched; GPU backends that fail to initialize fall back to the CPU
//! path for that invocation.

use briny::traits::{InteriorImmutable, RawConvert, StableLayout, Unaligned};
use core::convert::TryFrom;
use core::sync::atomic::{AtomicU8, Ordering};

/// Where the kernels' matrix multiplies execute.
///
/// `Cpu` and `Wgpu` are real implementations; `Cuda` is a routing stub
/// kept so callers can already select it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Backend {
    /// Rayon-parallel CPU kernels (default).
    #[default]
    Cpu = 0,
    /// GEMMs as `wgpu` compute passes.
    Wgpu,
    /// Reserved; currently routed through the `wgpu` path.
    Cuda,
}

unsafe impl StableLayout for Backend {}
unsafe impl RawConvert for Backend {}
unsafe impl Unaligned for Backend {}
unsafe impl InteriorImmutable for Backend {}

impl TryFrom<u8> for Backend {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Cpu),
            1 => Ok(Self::Wgpu),
            2 => Ok(Self::Cuda),
            _ => Err(()),
        }
    }
}

/// Process-wide backend selector.
///
/// Release/Acquire ordering is enough here: the backend changes rarely and
/// never mid-kernel, since dispatch reads it once per invocation.
static GLOBAL_DEFAULT_BACKEND: AtomicU8 = AtomicU8::new(Backend::Cpu as u8);

/// Selects the backend used by subsequent kernel dispatches.
///
/// # Example
///
/// ```
/// use gru_unit::backend::{set_backend, Backend};
/// set_backend(Backend::Cpu);
/// ```
pub fn set_backend(b: Backend) {
    GLOBAL_DEFAULT_BACKEND.store(b as u8, Ordering::Release);
}

/// Reads the backend the next dispatch will use.
///
/// A stored value outside the known codes falls back to [`Backend::Cpu`].
///
/// # Example
///
/// ```
/// use gru_unit::backend::get_backend;
/// let backend = get_backend();
/// ```
pub fn get_backend() -> Backend {
    Backend::try_from(GLOBAL_DEFAULT_BACKEND.load(Ordering::Acquire)).unwrap_or_default()
}
