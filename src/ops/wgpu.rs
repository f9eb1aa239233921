//! GPU-accelerated GRU kernels using WGPU.
//!
//! This module runs the kernels' matrix multiplies on the GPU using WGPU +
//! WGSL. It handles GPU context initialization, shader precompilation (via
//! `lazy_static`), and compute dispatch for:
//!
//! - `wgpu_gemm` — the GEMM primitive both kernels are built on
//! - `wgpu_gru_unit` — GRU forward pass with device-side projections
//! - `wgpu_gru_unit_grad` — GRU backward pass with device-side projections
//!
//! The single GEMM shader is compiled and cached once at runtime. Only the
//! projections run on the device: gate activations, the reset product and
//! the blend stay on the host in f64, while GEMM operands are cast to f32
//! for the GPU and the touched output cells are cast back. The f64→f32 cast
//! costs precision, so the CPU backend remains the reference implementation.
//!
//! Both kernel entry points return `false` instead of an error when the GPU
//! is unavailable or rejects the work; the dispatcher treats that as a
//! request to fall back to the CPU path.

use crate::activations::GruUnitAttrs;
use crate::tensors::Ten64;
use briny::prelude::*;
use wgpu::util::DeviceExt;

const GEMM: &str = include_str!("shaders/gemm.wgsl");

/// Basic wrapper for common GPU errors.
#[derive(Debug)]
pub enum GpuError {
    /// An error in requesting the adapter.
    Adapter(wgpu::RequestAdapterError),
    /// An error in requesting the GPU (device).
    Device(wgpu::RequestDeviceError),
}

impl std::fmt::Display for GpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuError::Adapter(e) => write!(f, "adapter request failed: {e}"),
            GpuError::Device(e) => write!(f, "device request failed: {e}"),
        }
    }
}

/// Wrapper for a `GpuError` or `ValidationError` depending on how it fails.
#[derive(Debug)]
pub enum GpuFailureKind {
    /// An error resulting from the GPU.
    Gpu(GpuError),
    /// An error resulting from validating data.
    Validation(ValidationError),
}

impl std::fmt::Display for GpuFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuFailureKind::Gpu(err) => write!(f, "gpu: {err}"),
            GpuFailureKind::Validation(err) => write!(f, "validation: {err}"),
        }
    }
}

/// A type of error closely related to the GPU.
#[derive(Debug)]
pub struct GpuFailure {
    /// The optional type of failure that occured.
    pub kind: Option<GpuFailureKind>,
    /// The optional message explaining the failure.
    pub message: Option<String>,
}

impl From<GpuError> for GpuFailure {
    fn from(kind: GpuError) -> Self {
        Self {
            kind: Some(GpuFailureKind::Gpu(kind)),
            message: None,
        }
    }
}

impl From<ValidationError> for GpuFailure {
    fn from(kind: ValidationError) -> Self {
        Self {
            kind: Some(GpuFailureKind::Validation(kind)),
            message: None,
        }
    }
}

impl From<&str> for GpuFailure {
    fn from(msg: &str) -> Self {
        Self {
            kind: None,
            message: Some(msg.to_string()),
        }
    }
}

impl From<String> for GpuFailure {
    fn from(msg: String) -> Self {
        Self {
            kind: None,
            message: Some(msg),
        }
    }
}

impl std::fmt::Display for GpuFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(kind) = &self.kind {
            write!(f, "GPU dispatch failed: {kind}")
        } else if let Some(msg) = &self.message {
            write!(f, "GPU dispatch failed: {msg}")
        } else {
            write!(f, "GPU dispatch failed")
        }
    }
}

impl std::error::Error for GpuFailure {}

/// Holds the WGPU device and queue used for executing compute pipelines.
///
/// Initialized once globally and reused for all operations via `lazy_static`.
/// Provides the base hardware abstraction for launching compute shaders.
pub struct GpuContext {
    /// The actual GPU device.
    pub device: wgpu::Device,
    /// A queue for information related to the device.
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Initializes a new GPU context, selecting the default adapter and creating a device + queue.
    ///
    /// This function sets up the GPU backend used for all compute operations.
    /// It wraps WGPU's initialization logic and is called once via `lazy_static`.
    ///
    /// # Returns
    /// - `Ok(GpuContext)` if the GPU is successfully initialized
    /// - `Err(GpuError)` if adapter or device acquisition fails
    ///
    /// # Internals
    /// - Uses `pollster::block_on` to synchronously wait for async WGPU calls
    /// - Selects the default adapter with default options (typically the most performant)
    /// - Enables default limits and features for broad compatibility
    ///
    /// # Panics
    /// Only panics if called via `lazy_static!` and the initialization fails
    ///
    /// # Example
    /// ```no_run
    /// use gru_unit::ops::wgpu::GpuContext;
    ///
    /// let ctx = GpuContext::new().expect("no usable GPU");
    /// println!("Device: {:?}", ctx.device.limits());
    /// ```
    pub fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::default();
        // Use block_on to await the adapter
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .map_err(GpuError::Adapter)?;
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))
        .map_err(GpuError::Device)?;

        Ok(Self { device, queue })
    }
}

/// Secure wrapper for WGSL source code extracted from files.
pub struct WgslSource<'a>(pub &'a str);

impl<'a> Validate for WgslSource<'a> {
    fn validate(&self) -> Result<(), ValidationError> {
        let src = self.0;

        // Basic sanity checks
        if src.len() > 65536 {
            return Err(ValidationError);
        }

        if !src.contains("fn main") {
            return Err(ValidationError);
        }

        if src.contains("import") || src.contains("#include") {
            return Err(ValidationError); // Disallow source inclusion
        }

        // Disallow forbidden patterns
        let forbidden = ["asm", "unsafe", "ptr", "std::"];
        if forbidden.iter().any(|bad| src.contains(bad)) {
            return Err(ValidationError);
        }

        Ok(())
    }
}

/// Opens a WGSL shader and returns the validated, labeled contents.
///
/// # In Detail
/// - Opens a WGSL shader, contains it in a secure wrapper, ensures safety and validates it.
/// - Once validated, the shader is labeled and assigned to a device, unwrapped, and returned.
pub fn load_shader(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, GpuFailure> {
    WgslSource(source).validate()?; // briny-based check

    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    }))
}

lazy_static::lazy_static! {
    static ref GPU_CONTEXT: GpuContext = GpuContext::new().expect("Failed to initialize GPU context");
    static ref GEMM_SHADER: wgpu::ShaderModule = load_shader(
        &GPU_CONTEXT.device,
        "gemm",
        GEMM
    ).expect("GEMM shader failed validation or compilation");
    static ref GEMM_BIND_GROUP_LAYOUT: wgpu::BindGroupLayout = {
        GPU_CONTEXT.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gemm_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        })
    };
    static ref GEMM_PIPELINE_LAYOUT: wgpu::PipelineLayout = {
        GPU_CONTEXT.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gemm_pipeline_layout"),
            bind_group_layouts: &[&*GEMM_BIND_GROUP_LAYOUT],
            push_constant_ranges: &[],
        })
    };
    static ref GEMM_PIPELINE: wgpu::ComputePipeline = {
        GPU_CONTEXT.device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("gemm_pipeline"),
            layout: Some(&*GEMM_PIPELINE_LAYOUT),
            module: &GEMM_SHADER,
            entry_point: Some("main"),
            cache: None,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        })
    };
}

fn as_bytes<T: Copy>(data: &[T]) -> &[u8] {
    let len = std::mem::size_of_val(data);
    unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, len) }
}

fn bytes_to_f32_slice(data: &[u8]) -> Result<&[f32], &'static str> {
    use std::mem::{align_of, size_of};

    if data.as_ptr() as usize % align_of::<f32>() != 0 {
        return Err("unaligned buffer");
    }

    if data.len() % size_of::<f32>() != 0 {
        return Err("buffer length is not a multiple of f32");
    }

    let len = data.len() / size_of::<f32>();
    let ptr = data.as_ptr() as *const f32;
    unsafe { Ok(std::slice::from_raw_parts(ptr, len)) }
}

/// Computes `C <- alpha * op(A) * op(B) + beta * C` on the GPU.
///
/// Mirrors the CPU `gemm` contract (transpose flags, explicit leading
/// dimensions, sub-block addressing), so the GRU kernels can swap the two
/// implementations call for call. The full `C` slice is uploaded so `beta`
/// accumulation works, but only the `m x n` cells addressed through `ldc`
/// are written back; padding between rows keeps its exact f64 contents.
///
/// # Returns
/// - `Ok(())` on success, with the addressed cells of `c` updated
/// - `Err(GpuFailure)` if the GPU is unavailable or the work is rejected
///
/// # Notes
/// - Input data is cast from f64 → f32 for GPU
/// - Output is cast back from f32 → f64
/// - `k == 0` is rejected so the caller can run its CPU fallback instead
#[allow(clippy::too_many_arguments)]
pub fn wgpu_gemm(
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
) -> Result<(), GpuFailure> {
    if m == 0 || n == 0 {
        return Ok(());
    }
    if k == 0 {
        return Err("gemm with an empty inner dimension stays on the CPU".into());
    }

    let a_data: Vec<f32> = a.iter().map(|&v| v as f32).collect();
    let b_data: Vec<f32> = b.iter().map(|&v| v as f32).collect();
    let mut c_data: Vec<f32> = c.iter().map(|&v| v as f32).collect();

    let mut flags = 0u32;
    if trans_a {
        flags |= 1;
    }
    if trans_b {
        flags |= 2;
    }

    let dims = [
        m as u32, k as u32, n as u32, flags,
        lda as u32, ldb as u32, ldc as u32, 0u32,
    ];
    let coefs = [alpha as f32, beta as f32, 0.0, 0.0];

    pollster::block_on(run_gemm_shader(&a_data, &b_data, &mut c_data, dims, coefs))?;

    // copy back only the cells the contract lets the GPU touch
    for i in 0..m {
        for j in 0..n {
            c[i * ldc + j] = c_data[i * ldc + j] as f64;
        }
    }

    Ok(())
}

async fn run_gemm_shader(
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    dims: [u32; 8],
    coefs: [f32; 4],
) -> Result<(), GpuFailure> {
    let device = &GPU_CONTEXT.device;
    let queue = &GPU_CONTEXT.queue;

    let dims_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("gemm_dims"),
        contents: as_bytes(&dims),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let coefs_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("gemm_coefs"),
        contents: as_bytes(&coefs),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let a_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("gemm_a"),
        contents: as_bytes(a),
        usage: wgpu::BufferUsages::STORAGE,
    });

    let b_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("gemm_b"),
        contents: as_bytes(b),
        usage: wgpu::BufferUsages::STORAGE,
    });

    // uploaded with contents so beta-accumulation reads the current values
    let c_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("gemm_c"),
        contents: as_bytes(c),
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
    });

    let bind_group_layout = &*GEMM_BIND_GROUP_LAYOUT;

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("gemm_bind_group"),
        layout: bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: dims_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: coefs_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: a_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: b_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: c_buffer.as_entire_binding(),
            },
        ],
    });

    let pipeline = &*GEMM_PIPELINE;

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("gemm_encoder"),
    });

    {
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("gemm_pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(pipeline);
        compute_pass.set_bind_group(0, &bind_group, &[]);
        compute_pass.dispatch_workgroups(dims[2].div_ceil(16), dims[0].div_ceil(16), 1);
    }

    let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("gemm_staging"),
        size: (c.len() * 4) as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    encoder.copy_buffer_to_buffer(&c_buffer, 0, &staging_buffer, 0, (c.len() * 4) as u64);

    queue.submit(Some(encoder.finish()));
    let buffer_slice = staging_buffer.slice(..);
    buffer_slice.map_async(wgpu::MapMode::Read, |result| {
        assert!(result.is_ok());
    });
    device.poll(wgpu::PollType::Wait).unwrap();

    let data = buffer_slice.get_mapped_range();
    c.copy_from_slice(bytes_to_f32_slice(&data)?);
    drop(data);
    staging_buffer.unmap();

    Ok(())
}

/// Runs the GRU forward kernel with its two projections on the GPU.
///
/// Gate activations, the reset product and the hidden-state blend stay on
/// the host in f64; the two GEMMs run on the device in f32, accumulating
/// straight into the gate buffer's column blocks. Outputs and semantics
/// match `ops::cpu::gru_unit`, modulo the f32 projection precision.
///
/// # Returns
/// - `true` if the kernel completed on the GPU
/// - `false` on shape mismatch or GPU failure; the caller is expected to
///   fall back to the CPU kernel, which recomputes every output from the
///   untouched inputs (and reports shape mismatches with a panic)
#[allow(clippy::too_many_arguments)]
pub fn wgpu_gru_unit(
    input: &Ten64,
    hidden_prev: &Ten64,
    weight: &Ten64,
    bias: &Ten64,
    gate: &mut Ten64,
    reset_hidden_prev: &mut Ten64,
    hidden: &mut Ten64,
    attrs: GruUnitAttrs,
) -> bool {
    let batch_size = input.shape[0];
    let frame_size = hidden_prev.shape[1];
    if batch_size == 0
        || frame_size == 0
        || input.shape != [batch_size, 3 * frame_size]
        || hidden_prev.shape != [batch_size, frame_size]
        || weight.shape != [frame_size, 3 * frame_size]
        || bias.shape != [1, 3 * frame_size]
        || gate.shape != [batch_size, 3 * frame_size]
        || reset_hidden_prev.shape != [batch_size, frame_size]
        || hidden.shape != [batch_size, frame_size]
    {
        return false;
    }

    let stride = 3 * frame_size;

    // host: gate <- input + broadcast(bias)
    for i in 0..batch_size {
        for j in 0..stride {
            gate.data[i * stride + j] = input.data[i * stride + j] + bias.data[j];
        }
    }

    // device: gate[:, 0..2F] += hidden_prev * W_ur
    if wgpu_gemm(
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
    )
    .is_err()
    {
        return false;
    }

    // host: activate gates and scale hidden_prev by the reset gate
    for i in 0..batch_size {
        let gate_row = &mut gate.data[i * stride..(i + 1) * stride];
        let (update, rest) = gate_row.split_at_mut(frame_size);
        let reset_gate = &mut rest[..frame_size];
        attrs.gate_activation.apply(update);
        attrs.gate_activation.apply(reset_gate);
        for j in 0..frame_size {
            reset_hidden_prev.data[i * frame_size + j] =
                reset_gate[j] * hidden_prev.data[i * frame_size + j];
        }
    }

    // device: gate[:, 2F..3F] += reset_hidden_prev * W_c
    if wgpu_gemm(
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
    )
    .is_err()
    {
        return false;
    }

    // host: activate the candidate and blend
    for i in 0..batch_size {
        let gate_row = &mut gate.data[i * stride..(i + 1) * stride];
        let (update, rest) = gate_row.split_at_mut(frame_size);
        let cand = &mut rest[frame_size..];
        attrs.state_activation.apply(cand);
        for j in 0..frame_size {
            let prev = hidden_prev.data[i * frame_size + j];
            hidden.data[i * frame_size + j] = update[j] * (prev - cand[j]) + cand[j];
        }
    }

    true
}

/// Runs the GRU backward kernel with its four projections on the GPU.
///
/// Follows the same fixed stage order as `ops::cpu::gru_unit_grad`: the
/// update and candidate blocks of the gate gradient are finalized on the
/// host before any device GEMM consumes them, and the hidden-state GEMM
/// reads the original weights.
///
/// # Returns
/// - `true` if the kernel completed on the GPU
/// - `false` on shape mismatch or GPU failure; every gradient tensor is
///   fully rewritten by the CPU fallback, so a mid-kernel bailout leaves
///   no partial state behind
#[allow(clippy::too_many_arguments)]
pub fn wgpu_gru_unit_grad(
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
) -> bool {
    let batch_size = hidden_prev.shape[0];
    let frame_size = hidden_prev.shape[1];
    if batch_size == 0
        || frame_size == 0
        || hidden_prev.shape != [batch_size, frame_size]
        || weight.shape != [frame_size, 3 * frame_size]
        || gate.shape != [batch_size, 3 * frame_size]
        || reset_hidden_prev.shape != [batch_size, frame_size]
        || hidden_grad.shape != [batch_size, frame_size]
        || input_grad.shape != [batch_size, 3 * frame_size]
        || hidden_prev_grad.shape != [batch_size, frame_size]
        || weight_grad.shape != [frame_size, 3 * frame_size]
        || bias_grad.shape != [1, 3 * frame_size]
    {
        return false;
    }

    let stride = 3 * frame_size;
    let mut gate_grad = vec![0.0; batch_size * stride];
    let mut reset_hidden_prev_grad = vec![0.0; batch_size * frame_size];

    // host: unactivated update gate and candidate
    for i in 0..batch_size {
        let g_row = &gate.data[i * stride..(i + 1) * stride];
        let dg_row = &mut gate_grad[i * stride..(i + 1) * stride];
        let dh_row = &hidden_grad.data[i * frame_size..(i + 1) * frame_size];
        let prev_row = &hidden_prev.data[i * frame_size..(i + 1) * frame_size];
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
    }

    // device: reset_hidden_prev gradient
    if wgpu_gemm(
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
    )
    .is_err()
    {
        return false;
    }

    // device: candidate weight block
    if wgpu_gemm(
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
    )
    .is_err()
    {
        return false;
    }

    // host: unactivated reset gate
    for i in 0..batch_size {
        let g_row = &gate.data[i * stride..(i + 1) * stride];
        let dg_row = &mut gate_grad[i * stride..(i + 1) * stride];
        let reset_gate = &g_row[frame_size..2 * frame_size];
        for j in 0..frame_size {
            dg_row[frame_size + j] = reset_hidden_prev_grad[i * frame_size + j]
                * hidden_prev.data[i * frame_size + j];
        }
        attrs
            .gate_activation
            .apply_grad(reset_gate, &mut dg_row[frame_size..2 * frame_size]);
    }

    // device: update/reset weight block
    if wgpu_gemm(
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
    )
    .is_err()
    {
        return false;
    }

    // host: hidden_prev direct paths through the reset product and the carry
    for i in 0..batch_size {
        let g_row = &gate.data[i * stride..(i + 1) * stride];
        for j in 0..frame_size {
            hidden_prev_grad.data[i * frame_size + j] = reset_hidden_prev_grad
                [i * frame_size + j]
                * g_row[frame_size + j]
                + hidden_grad.data[i * frame_size + j] * g_row[j];
        }
    }

    // device: hidden_prev indirect path through the gate projection
    if wgpu_gemm(
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
    )
    .is_err()
    {
        return false;
    }

    // host: pass-through input gradient and the bias reduction
    input_grad.data.copy_from_slice(&gate_grad);
    for j in 0..stride {
        bias_grad.data[j] = gate_grad[j..].iter().step_by(stride).sum();
    }

    true
}
