//! GPU runtime management using wgpu.

use super::device::{backend_name, default_backends, Capabilities};
use crate::config::Config;
use crate::error::{Error, Result};

/// Adapter, device and queue for one program run.
pub struct GpuRuntime {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
    limits: wgpu::Limits,
}

impl GpuRuntime {
    /// Pick an adapter according to `config` and open a device on it.
    pub async fn new(config: &Config) -> Result<Self> {
        let backends = default_backends();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .enumerate_adapters(backends)
            .into_iter()
            .filter(|adapter| config.device_kind.matches(adapter.get_info().device_type))
            .nth(config.adapter_index.unwrap_or(0))
            .ok_or_else(|| Error::NoAdapter {
                kind: config.device_kind.to_string(),
            })?;

        let adapter_info = adapter.get_info();
        log::info!(
            "using adapter {} ({:?}, {})",
            adapter_info.name,
            adapter_info.device_type,
            backend_name(adapter_info.backend)
        );

        // Ask for everything the adapter offers so large inputs fit.
        let limits = adapter.limits();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("kernbench-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: limits.clone(),
                },
                None,
            )
            .await
            .map_err(|e| Error::RequestDevice(e.to_string()))?;

        device.on_uncaptured_error(Box::new(|e: wgpu::Error| {
            log::error!("uncaptured device error: {}", e);
        }));

        Ok(Self {
            device,
            queue,
            adapter_info,
            limits,
        })
    }

    /// Run `f` inside validation and out-of-memory error scopes, reporting a
    /// captured error as a failure of `call`.
    pub async fn scoped<T, F>(&self, call: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&wgpu::Device) -> T,
    {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let value = f(&self.device);

        let validation = self.device.pop_error_scope().await;
        let oom = self.device.pop_error_scope().await;

        match validation.or(oom) {
            Some(e) => Err(Error::gpu(call, e.to_string())),
            None => Ok(value),
        }
    }

    /// Fail if a buffer of `bytes` cannot be bound as storage.
    pub fn check_binding(&self, what: &'static str, bytes: u64) -> Result<()> {
        let caps = self.capabilities();
        let limit = caps.max_storage_binding.min(caps.max_buffer_size);
        if bytes > limit {
            return Err(Error::Capacity {
                what,
                requested: bytes,
                limit,
            });
        }
        Ok(())
    }

    /// Block until all submitted work has finished.
    pub fn wait_idle(&self) {
        self.device.poll(wgpu::Maintain::Wait);
    }

    /// Get device reference
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Get queue reference
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Get adapter info
    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Limits the device was opened with
    pub fn limits(&self) -> &wgpu::Limits {
        &self.limits
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::from_limits(&self.limits)
    }

    pub fn device_name(&self) -> &str {
        &self.adapter_info.name
    }

    pub fn backend_name(&self) -> &'static str {
        backend_name(self.adapter_info.backend)
    }
}

impl std::fmt::Debug for GpuRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuRuntime")
            .field("adapter", &self.adapter_info.name)
            .field("backend", &self.backend_name())
            .finish()
    }
}
