//! Adapter enumeration and capability queries.

use crate::config::DeviceKind;
use std::collections::BTreeMap;

/// One adapter as seen through a backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub device_type: wgpu::DeviceType,
    pub vendor: u32,
    pub device: u32,
    pub driver: String,
    pub backend: wgpu::Backend,
}

impl From<wgpu::AdapterInfo> for DeviceInfo {
    fn from(info: wgpu::AdapterInfo) -> Self {
        let driver = if info.driver_info.is_empty() {
            info.driver
        } else {
            format!("{} {}", info.driver, info.driver_info)
        };
        Self {
            name: info.name,
            device_type: info.device_type,
            vendor: info.vendor,
            device: info.device,
            driver,
            backend: info.backend,
        }
    }
}

/// A backend and the devices it exposes.
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    pub backend: wgpu::Backend,
    pub devices: Vec<DeviceInfo>,
}

impl PlatformInfo {
    /// Human readable backend name.
    pub fn name(&self) -> &'static str {
        backend_name(self.backend)
    }
}

pub fn backend_name(backend: wgpu::Backend) -> &'static str {
    match backend {
        wgpu::Backend::Empty => "Empty",
        wgpu::Backend::Vulkan => "Vulkan",
        wgpu::Backend::Metal => "Metal",
        wgpu::Backend::Dx12 => "DirectX 12",
        wgpu::Backend::Gl => "OpenGL",
        wgpu::Backend::BrowserWebGpu => "WebGPU",
    }
}

impl DeviceKind {
    /// Whether an adapter of `device_type` is eligible.
    pub fn matches(&self, device_type: wgpu::DeviceType) -> bool {
        match self {
            DeviceKind::Any => true,
            DeviceKind::Gpu => matches!(
                device_type,
                wgpu::DeviceType::DiscreteGpu
                    | wgpu::DeviceType::IntegratedGpu
                    | wgpu::DeviceType::VirtualGpu
            ),
        }
    }
}

/// Group adapter descriptions by backend, keeping discovery order within
/// each backend.
pub fn group_by_backend<I>(infos: I) -> Vec<PlatformInfo>
where
    I: IntoIterator<Item = DeviceInfo>,
{
    let mut platforms: BTreeMap<u32, PlatformInfo> = BTreeMap::new();
    for info in infos {
        platforms
            .entry(info.backend as u32)
            .or_insert_with(|| PlatformInfo {
                backend: info.backend,
                devices: Vec::new(),
            })
            .devices
            .push(info);
    }
    platforms.into_values().collect()
}

/// Backends to search: `WGPU_BACKEND` if set, otherwise all of them.
pub fn default_backends() -> wgpu::Backends {
    wgpu::util::backend_bits_from_env().unwrap_or(wgpu::Backends::all())
}

/// Every adapter reachable through `backends`, grouped by backend.
pub fn enumerate(backends: wgpu::Backends) -> Vec<PlatformInfo> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends,
        ..Default::default()
    });

    let infos = instance
        .enumerate_adapters(backends)
        .into_iter()
        .map(|adapter| DeviceInfo::from(adapter.get_info()));

    let platforms = group_by_backend(infos);
    log::debug!("found {} platform(s)", platforms.len());
    platforms
}

/// Execution limits relevant to compute dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Maximum invocations in one workgroup.
    pub max_workgroup_size: u32,
    /// Maximum workgroup extent per dimension.
    pub max_work_item_sizes: [u32; 3],
    /// Maximum workgroups per dispatch dimension.
    pub max_workgroups_per_dim: u32,
    /// Largest storage buffer binding, in bytes.
    pub max_storage_binding: u64,
    /// Largest buffer, in bytes.
    pub max_buffer_size: u64,
}

impl Capabilities {
    pub fn from_limits(limits: &wgpu::Limits) -> Self {
        Self {
            max_workgroup_size: limits.max_compute_invocations_per_workgroup,
            max_work_item_sizes: [
                limits.max_compute_workgroup_size_x,
                limits.max_compute_workgroup_size_y,
                limits.max_compute_workgroup_size_z,
            ],
            max_workgroups_per_dim: limits.max_compute_workgroups_per_dimension,
            max_storage_binding: limits.max_storage_buffer_binding_size as u64,
            max_buffer_size: limits.max_buffer_size,
        }
    }

    /// Whether a 1-D workgroup of `local` invocations fits.
    pub fn fits_1d(&self, local: u32) -> bool {
        local <= self.max_workgroup_size && local <= self.max_work_item_sizes[0]
    }

    /// Whether a square `tile x tile` workgroup fits.
    pub fn fits_tile(&self, tile: u32) -> bool {
        tile.checked_mul(tile)
            .is_some_and(|invocations| invocations <= self.max_workgroup_size)
            && tile <= self.max_work_item_sizes[0]
            && tile <= self.max_work_item_sizes[1]
    }
}
