//! Device buffers mirroring host arrays.

use super::runtime::GpuRuntime;
use crate::error::{Error, Result};
use bytemuck::Pod;
use std::marker::PhantomData;
use wgpu::util::DeviceExt;

/// Device buffer holding `len` elements of `T`.
pub struct GpuBuffer<T: Pod> {
    buffer: wgpu::Buffer,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> GpuBuffer<T> {
    /// Read-only storage buffer initialised from host data.
    pub async fn from_slice(rt: &GpuRuntime, label: &str, data: &[T]) -> Result<Self> {
        let bytes = std::mem::size_of_val(data) as u64;
        rt.check_binding("input buffer", bytes)?;

        let buffer = rt
            .scoped("create_buffer_init", |device| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(data),
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                })
            })
            .await?;

        Ok(Self::wrap(buffer, data.len()))
    }

    /// Writable storage buffer of `len` elements that can be copied back.
    pub async fn output(rt: &GpuRuntime, label: &str, len: usize) -> Result<Self> {
        let bytes = (len * std::mem::size_of::<T>()) as u64;
        rt.check_binding("output buffer", bytes)?;

        let buffer = rt
            .scoped("create_buffer", |device| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(label),
                    size: bytes,
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                    mapped_at_creation: false,
                })
            })
            .await?;

        Ok(Self::wrap(buffer, len))
    }

    /// Uniform buffer holding one value, for scalar kernel arguments.
    pub async fn uniform(rt: &GpuRuntime, label: &str, value: &T) -> Result<Self> {
        let buffer = rt
            .scoped("create_buffer_init", |device| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::bytes_of(value),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                })
            })
            .await?;

        Ok(Self::wrap(buffer, 1))
    }

    fn wrap(buffer: wgpu::Buffer, len: usize) -> Self {
        Self {
            buffer,
            len,
            _marker: PhantomData,
        }
    }

    /// Copy the buffer back to the host, blocking until the copy lands.
    pub async fn read(&self, rt: &GpuRuntime) -> Result<Vec<T>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let size = self.size_bytes();

        let staging = rt
            .scoped("create_buffer", |device| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("kernbench-staging-buffer"),
                    size,
                    usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .await?;

        let mut encoder = rt
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kernbench-copy-encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, size);
        rt.queue().submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        rt.wait_idle();

        rx.await
            .map_err(|_| Error::gpu("map_async", "callback dropped"))?
            .map_err(|e| Error::gpu("map_async", e.to_string()))?;

        let data = slice.get_mapped_range();
        let out = bytemuck::cast_slice::<u8, T>(&data).to_vec();
        drop(data);
        staging.unmap();

        Ok(out)
    }

    /// Get the underlying wgpu buffer
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get buffer size in bytes
    pub fn size_bytes(&self) -> u64 {
        (self.len * std::mem::size_of::<T>()) as u64
    }
}

impl<T: Pod> std::fmt::Debug for GpuBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuBuffer")
            .field("len", &self.len)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}
