//! The device side of each demo: upload, compile, dispatch, read back.
//!
//! Every op takes an open [`GpuRuntime`] and runs one blocking dispatch.
//! Buffers and the compiled kernel are dropped when the op returns.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gpu::partition::{reduction_items, Partition1d, Partition2d};
use crate::gpu::{GpuBuffer, GpuKernel, GpuRuntime, KernelParams, MatMul, VectorAdd, VectorSum};
use crate::host;
use std::time::Duration;

/// Result of one device run.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    /// Value read back (and, for reductions, folded on the host).
    pub value: T,
    /// Dispatch plus wait, excluding upload and readback.
    pub device_time: Duration,
    /// Work items that carried data.
    pub items: usize,
    /// Workgroup grid that was dispatched.
    pub workgroups: (u32, u32, u32),
}

fn element_count(len: usize) -> Result<u32> {
    if len == 0 {
        return Err(Error::config("input must not be empty"));
    }
    u32::try_from(len).map_err(|_| Error::Capacity {
        what: "element count",
        requested: len as u64,
        limit: u32::MAX as u64,
    })
}

fn check_workgroup(rt: &GpuRuntime, local: u32) -> Result<()> {
    let caps = rt.capabilities();
    if !caps.fits_1d(local) {
        return Err(Error::Capacity {
            what: "workgroup size",
            requested: local as u64,
            limit: caps.max_workgroup_size.min(caps.max_work_item_sizes[0]) as u64,
        });
    }
    Ok(())
}

/// `a + b` on the device.
pub async fn vector_add(
    rt: &GpuRuntime,
    config: &Config,
    a: &[f32],
    b: &[f32],
) -> Result<Outcome<Vec<f32>>> {
    if a.len() != b.len() {
        return Err(Error::config(format!(
            "input lengths differ: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    let n = element_count(a.len())?;
    check_workgroup(rt, config.workgroup_size)?;

    let partition = Partition1d::new(
        a.len(),
        config.workgroup_size,
        rt.capabilities().max_workgroups_per_dim,
    )?;

    let params = GpuBuffer::uniform(rt, "params", &KernelParams::new(n, n)).await?;
    let buf_a = GpuBuffer::from_slice(rt, "a", a).await?;
    let buf_b = GpuBuffer::from_slice(rt, "b", b).await?;
    let buf_c = GpuBuffer::<f32>::output(rt, "c", a.len()).await?;

    let kernel = VectorAdd::new(config.workgroup_size).compile(rt).await?;
    let device_time = kernel
        .dispatch(
            rt,
            &[params.buffer(), buf_a.buffer(), buf_b.buffer(), buf_c.buffer()],
            partition.workgroups(),
        )
        .await?;

    let value = buf_c.read(rt).await?;

    Ok(Outcome {
        value,
        device_time,
        items: partition.items(),
        workgroups: partition.workgroups(),
    })
}

/// Sum of `a`: strided partial sums on the device, folded on the host.
pub async fn vector_sum(rt: &GpuRuntime, config: &Config, a: &[f32]) -> Result<Outcome<f32>> {
    let n = element_count(a.len())?;
    check_workgroup(rt, config.workgroup_size)?;

    let items = reduction_items(a.len(), config.workgroup_size as usize, config.partial_sums);
    let partition = Partition1d::new(
        items,
        config.workgroup_size,
        rt.capabilities().max_workgroups_per_dim,
    )?;

    let params = GpuBuffer::uniform(rt, "params", &KernelParams::new(n, items as u32)).await?;
    let buf_a = GpuBuffer::from_slice(rt, "a", a).await?;
    let buf_partial = GpuBuffer::<f32>::output(rt, "partial", items).await?;

    let kernel = VectorSum::new(config.workgroup_size).compile(rt).await?;
    let device_time = kernel
        .dispatch(
            rt,
            &[params.buffer(), buf_a.buffer(), buf_partial.buffer()],
            partition.workgroups(),
        )
        .await?;

    let partials = buf_partial.read(rt).await?;
    let value = host::vector_sum(&partials);

    Ok(Outcome {
        value,
        device_time,
        items,
        workgroups: partition.workgroups(),
    })
}

/// Row-major `n x n` product `a * b` on the device.
pub async fn matmul(
    rt: &GpuRuntime,
    config: &Config,
    a: &[f32],
    b: &[f32],
    n: usize,
) -> Result<Outcome<Vec<f32>>> {
    let cells = n
        .checked_mul(n)
        .ok_or_else(|| Error::config(format!("matrix order {} overflows", n)))?;
    if a.len() != cells || b.len() != cells {
        return Err(Error::config(format!(
            "matrices must be {} x {} ({} elements)",
            n, n, cells
        )));
    }
    element_count(cells)?;

    let caps = rt.capabilities();
    if !caps.fits_tile(config.tile_size) {
        return Err(Error::Capacity {
            what: "tile invocations",
            requested: u64::from(config.tile_size) * u64::from(config.tile_size),
            limit: caps.max_workgroup_size as u64,
        });
    }

    let partition = Partition2d::new(n, n, config.tile_size, caps.max_workgroups_per_dim)?;

    let params = GpuBuffer::uniform(
        rt,
        "params",
        &KernelParams::new(partition.cols() as u32, partition.rows() as u32),
    )
    .await?;
    let buf_a = GpuBuffer::from_slice(rt, "a", a).await?;
    let buf_b = GpuBuffer::from_slice(rt, "b", b).await?;
    let buf_c = GpuBuffer::<f32>::output(rt, "c", cells).await?;

    let kernel = MatMul::new(config.tile_size).compile(rt).await?;
    let device_time = kernel
        .dispatch(
            rt,
            &[params.buffer(), buf_a.buffer(), buf_b.buffer(), buf_c.buffer()],
            partition.workgroups(),
        )
        .await?;

    let value = buf_c.read(rt).await?;

    Ok(Outcome {
        value,
        device_time,
        items: cells,
        workgroups: partition.workgroups(),
    })
}
