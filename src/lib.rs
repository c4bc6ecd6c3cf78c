//! kernbench - small GPU compute demos timed against host loops
//!
//! The crate carries the one pattern every demo program shares: enumerate a
//! compute device, compile and launch a data-parallel kernel, collect the
//! result and compare it with a single-threaded host baseline.
//!
//! # Quick Start
//!
//! ```no_run
//! use kernbench::prelude::*;
//!
//! # fn main() -> kernbench::Result<()> {
//! let config = Config::default();
//! let a = kernbench::inputs::filled(1 << 20, 1.0);
//! let b = kernbench::inputs::filled(1 << 20, 2.0);
//!
//! futures::executor::block_on(async {
//!     let rt = GpuRuntime::new(&config).await?;
//!     let out = kernbench::ops::vector_add(&rt, &config, &a, &b).await?;
//!     println!("c[0] = {} in {:?}", out.value[0], out.device_time);
//!     Ok::<(), kernbench::Error>(())
//! })
//! # }
//! ```
//!
//! # Programs
//!
//! - `dev_info`: list platforms (backends) and their devices
//! - `device_caps`: workgroup limits of the first GPU
//! - `vec_add`, `vec_sum`: elementwise add and reduction over 2^24 floats
//! - `mat_mul <N>`: naive N x N matrix product
//! - `matmul_sweep`: matrix product over a range of sizes, with a report

#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod host;
pub mod inputs;
pub mod prelude;
pub mod report;
pub mod verify;

#[cfg(feature = "gpu")]
pub mod gpu;

#[cfg(feature = "gpu")]
pub mod ops;

pub use config::{Config, ConfigBuilder, DeviceKind};
pub use error::{Error, Result};

/// Print `err` the way every demo program reports failure and exit with its
/// code.
pub fn exit_with(err: &Error) -> ! {
    eprintln!("Error: {} ({})", err, err.exit_code());
    std::process::exit(err.exit_code())
}
