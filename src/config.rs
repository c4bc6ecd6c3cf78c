use crate::error::{Error, Result};
use std::fmt;

/// Which adapters are eligible when picking a compute device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    /// Integrated, discrete or virtual GPUs only.
    #[default]
    Gpu,
    /// Any adapter, including software/CPU implementations.
    Any,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Gpu => f.write_str("GPU"),
            DeviceKind::Any => f.write_str("compute"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub device_kind: DeviceKind,
    pub adapter_index: Option<usize>,
    pub workgroup_size: u32,
    pub tile_size: u32,
    pub partial_sums: usize,
    pub tolerance: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_kind: DeviceKind::default(),
            adapter_index: None,
            workgroup_size: 128,
            tile_size: 16,
            partial_sums: 1 << 16,
            tolerance: 1e-4,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.workgroup_size == 0 || !self.workgroup_size.is_power_of_two() {
            return Err(Error::config("workgroup_size must be a power of two > 0"));
        }
        if self.workgroup_size > 1024 {
            return Err(Error::config("workgroup_size too large (max 1024)"));
        }

        if self.tile_size == 0 {
            return Err(Error::config("tile_size must be > 0"));
        }
        if self.tile_size
            .checked_mul(self.tile_size)
            .map_or(true, |invocations| invocations > 1024)
        {
            return Err(Error::config("tile_size squared must not exceed 1024"));
        }

        if self.partial_sums == 0 {
            return Err(Error::config("partial_sums must be > 0"));
        }

        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(Error::config("tolerance must be > 0"));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn device_kind(mut self, kind: DeviceKind) -> Self {
        self.config.device_kind = kind;
        self
    }

    pub fn adapter_index(mut self, index: usize) -> Self {
        self.config.adapter_index = Some(index);
        self
    }

    pub fn workgroup_size(mut self, size: u32) -> Self {
        self.config.workgroup_size = size;
        self
    }

    pub fn tile_size(mut self, size: u32) -> Self {
        self.config.tile_size = size;
        self
    }

    pub fn partial_sums(mut self, n: usize) -> Self {
        self.config.partial_sums = n;
        self
    }

    pub fn tolerance(mut self, tol: f32) -> Self {
        self.config.tolerance = tol;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
