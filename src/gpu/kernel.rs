//! GPU kernel abstraction and compilation.

use super::runtime::GpuRuntime;
use crate::error::{Error, Result};
use bytemuck::{Pod, Zeroable};
use std::time::{Duration, Instant};

/// Scalar arguments passed to every kernel through a uniform buffer.
///
/// Padded to 16 bytes to satisfy uniform layout rules.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct KernelParams {
    /// Problem size (elements, or matrix order).
    pub n: u32,
    /// Work items that carry data. For 2-D kernels, the number of output
    /// rows; `n` then bounds the columns.
    pub items: u32,
    _pad: [u32; 2],
}

impl KernelParams {
    pub fn new(n: u32, items: u32) -> Self {
        Self {
            n,
            items,
            _pad: [0; 2],
        }
    }
}

/// How a kernel argument is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Uniform,
    StorageRead,
    StorageReadWrite,
}

impl BindingKind {
    fn layout_entry(self, binding: u32) -> wgpu::BindGroupLayoutEntry {
        let ty = match self {
            BindingKind::Uniform => wgpu::BufferBindingType::Uniform,
            BindingKind::StorageRead => wgpu::BufferBindingType::Storage { read_only: true },
            BindingKind::StorageReadWrite => wgpu::BufferBindingType::Storage { read_only: false },
        };
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }
}

/// Trait for GPU kernels
#[allow(async_fn_in_trait)]
pub trait GpuKernel {
    fn name(&self) -> &'static str;

    /// WGSL source with the workgroup shape filled in.
    fn source(&self) -> String;

    /// WGSL function to launch. Defaults to the kernel name.
    fn entry_point(&self) -> &'static str {
        self.name()
    }

    /// Argument kinds in binding order.
    fn bindings(&self) -> &'static [BindingKind];

    /// Compile this kernel on `rt`.
    async fn compile(&self, rt: &GpuRuntime) -> Result<CompiledKernel>
    where
        Self: Sized,
    {
        CompiledKernel::build(rt, self).await
    }
}

/// Compiled GPU kernel ready for execution
pub struct CompiledKernel {
    name: &'static str,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    arity: usize,
}

impl CompiledKernel {
    /// Compile `kernel` into a compute pipeline.
    ///
    /// Compiler diagnostics are returned as [`Error::KernelBuild`].
    pub async fn build<K: GpuKernel + ?Sized>(rt: &GpuRuntime, kernel: &K) -> Result<Self> {
        let name = kernel.name();
        let entry_point = kernel.entry_point();
        let source = kernel.source();
        let bindings = kernel.bindings();

        let built = rt
            .scoped("create_compute_pipeline", |device| {
                let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(name),
                    source: wgpu::ShaderSource::Wgsl(source.into()),
                });

                let entries: Vec<_> = bindings
                    .iter()
                    .enumerate()
                    .map(|(i, kind)| kind.layout_entry(i as u32))
                    .collect();
                let bind_group_layout =
                    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: Some(name),
                        entries: &entries,
                    });

                let pipeline_layout =
                    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                        label: Some(name),
                        bind_group_layouts: &[&bind_group_layout],
                        push_constant_ranges: &[],
                    });

                let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some(name),
                    layout: Some(&pipeline_layout),
                    module: &shader,
                    entry_point,
                });

                (pipeline, bind_group_layout)
            })
            .await
            .map_err(|e| match e {
                Error::Gpu { message, .. } => Error::KernelBuild {
                    kernel: name,
                    log: message,
                },
                other => other,
            })?;

        log::debug!("built kernel {}", name);

        Ok(Self {
            name,
            pipeline: built.0,
            bind_group_layout: built.1,
            arity: bindings.len(),
        })
    }

    /// Bind `args` in order, dispatch `workgroups` and block until the
    /// queue drains. Returns the time spent in submit plus wait.
    pub async fn dispatch(
        &self,
        rt: &GpuRuntime,
        args: &[&wgpu::Buffer],
        workgroups: (u32, u32, u32),
    ) -> Result<Duration> {
        if args.len() != self.arity {
            return Err(Error::config(format!(
                "kernel {} takes {} arguments, got {}",
                self.name,
                self.arity,
                args.len()
            )));
        }

        let bind_group = rt
            .scoped("create_bind_group", |device| {
                let entries: Vec<_> = args
                    .iter()
                    .enumerate()
                    .map(|(i, buffer)| wgpu::BindGroupEntry {
                        binding: i as u32,
                        resource: buffer.as_entire_binding(),
                    })
                    .collect();
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(self.name),
                    layout: &self.bind_group_layout,
                    entries: &entries,
                })
            })
            .await?;

        let mut encoder = rt
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kernbench-kernel-encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(self.name),
                timestamp_writes: None,
            });

            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &bind_group, &[]);

            let (x, y, z) = workgroups;
            compute_pass.dispatch_workgroups(x, y, z);
        }

        let start = Instant::now();
        rt.scoped("dispatch_workgroups", |_| {
            rt.queue().submit(Some(encoder.finish()));
        })
        .await?;
        rt.wait_idle();
        let elapsed = start.elapsed();

        log::debug!("kernel {} ran {:?} in {:?}", self.name, workgroups, elapsed);
        Ok(elapsed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for CompiledKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledKernel")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

const PARAMS_WGSL: &str = r#"
struct Params {
    n: u32,
    items: u32,
    pad0: u32,
    pad1: u32,
}
"#;

const VECTOR_ADD_WGSL: &str = r#"
@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> a: array<f32>;
@group(0) @binding(2) var<storage, read> b: array<f32>;
@group(0) @binding(3) var<storage, read_write> c: array<f32>;

@compute @workgroup_size(WG)
fn vector_add(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>,
) {
    let id = gid.y * nwg.x * WGu + gid.x;
    if (id < params.n) {
        c[id] = a[id] + b[id];
    }
}
"#;

const VECTOR_SUM_WGSL: &str = r#"
@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> a: array<f32>;
@group(0) @binding(2) var<storage, read_write> partial: array<f32>;

@compute @workgroup_size(WG)
fn vector_sum(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>,
) {
    let id = gid.y * nwg.x * WGu + gid.x;
    if (id >= params.items) {
        return;
    }

    var sum = 0.0;
    for (var i = id; i < params.n; i = i + params.items) {
        sum = sum + a[i];
    }
    partial[id] = sum;
}
"#;

const MATMUL_WGSL: &str = r#"
@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> a: array<f32>;
@group(0) @binding(2) var<storage, read> b: array<f32>;
@group(0) @binding(3) var<storage, read_write> c: array<f32>;

@compute @workgroup_size(WG, WG)
fn matmul(@builtin(global_invocation_id) gid: vec3<u32>) {
    let n = params.n;
    let col = gid.x;
    let row = gid.y;
    if (row >= params.items || col >= n) {
        return;
    }

    var sum = 0.0;
    for (var k = 0u; k < n; k = k + 1u) {
        sum = sum + a[row * n + k] * b[k * n + col];
    }
    c[row * n + col] = sum;
}
"#;

fn with_workgroup(body: &str, wg: u32) -> String {
    format!("{}{}", PARAMS_WGSL, body.replace("WG", &wg.to_string()))
}

/// Elementwise `c = a + b`.
#[derive(Debug, Clone, Copy)]
pub struct VectorAdd {
    workgroup_size: u32,
}

impl VectorAdd {
    pub fn new(workgroup_size: u32) -> Self {
        Self { workgroup_size }
    }
}

impl GpuKernel for VectorAdd {
    fn name(&self) -> &'static str {
        "vector_add"
    }

    fn source(&self) -> String {
        with_workgroup(VECTOR_ADD_WGSL, self.workgroup_size)
    }

    fn bindings(&self) -> &'static [BindingKind] {
        &[
            BindingKind::Uniform,
            BindingKind::StorageRead,
            BindingKind::StorageRead,
            BindingKind::StorageReadWrite,
        ]
    }
}

/// Grid-stride partial sums; item `i` writes only `partial[i]`.
#[derive(Debug, Clone, Copy)]
pub struct VectorSum {
    workgroup_size: u32,
}

impl VectorSum {
    pub fn new(workgroup_size: u32) -> Self {
        Self { workgroup_size }
    }
}

impl GpuKernel for VectorSum {
    fn name(&self) -> &'static str {
        "vector_sum"
    }

    fn source(&self) -> String {
        with_workgroup(VECTOR_SUM_WGSL, self.workgroup_size)
    }

    fn bindings(&self) -> &'static [BindingKind] {
        &[
            BindingKind::Uniform,
            BindingKind::StorageRead,
            BindingKind::StorageReadWrite,
        ]
    }
}

/// Naive square matrix product, one work item per output element.
#[derive(Debug, Clone, Copy)]
pub struct MatMul {
    tile: u32,
}

impl MatMul {
    pub fn new(tile: u32) -> Self {
        Self { tile }
    }
}

impl GpuKernel for MatMul {
    fn name(&self) -> &'static str {
        "matmul"
    }

    fn source(&self) -> String {
        with_workgroup(MATMUL_WGSL, self.tile)
    }

    fn bindings(&self) -> &'static [BindingKind] {
        &[
            BindingKind::Uniform,
            BindingKind::StorageRead,
            BindingKind::StorageRead,
            BindingKind::StorageReadWrite,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_layout() {
        assert_eq!(std::mem::size_of::<KernelParams>(), 16);
        let params = KernelParams::new(1024, 256);
        let words: [u32; 4] = bytemuck::cast(params);
        assert_eq!(words, [1024, 256, 0, 0]);
    }

    #[test]
    fn test_workgroup_substitution() {
        let src = VectorAdd::new(128).source();
        assert!(src.contains("@workgroup_size(128)"));
        assert!(src.contains("nwg.x * 128u"));
        assert!(src.contains("struct Params"));
        assert!(!src.contains("WG"));

        let src = MatMul::new(16).source();
        assert!(src.contains("@workgroup_size(16, 16)"));
    }

    fn assert_well_formed<K: GpuKernel>(kernel: K) {
        let src = kernel.source();
        assert!(src.contains(&format!("fn {}(", kernel.entry_point())));
        assert_eq!(
            kernel.bindings().first(),
            Some(&BindingKind::Uniform),
            "{} must take params first",
            kernel.name()
        );
    }

    #[test]
    fn test_entry_points_present() {
        assert_well_formed(VectorAdd::new(64));
        assert_well_formed(VectorSum::new(64));
        assert_well_formed(MatMul::new(8));
    }
}
