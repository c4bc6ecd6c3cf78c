pub use crate::config::{Config, ConfigBuilder, DeviceKind};
pub use crate::error::{Error, Result};
pub use crate::report::{BenchRecord, Timing, TimingStats};

#[cfg(feature = "gpu")]
pub use crate::gpu::{GpuBuffer, GpuKernel, GpuRuntime};

#[cfg(feature = "gpu")]
pub use crate::ops::Outcome;
