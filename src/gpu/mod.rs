pub mod buffer;
pub mod device;
pub mod kernel;
pub mod partition;
pub mod runtime;

pub use buffer::GpuBuffer;
pub use device::{Capabilities, DeviceInfo, PlatformInfo};
pub use kernel::{BindingKind, CompiledKernel, GpuKernel, KernelParams, MatMul, VectorAdd, VectorSum};
pub use partition::{Partition1d, Partition2d};
pub use runtime::GpuRuntime;
