//! Print the workgroup limits of the first GPU.

use futures::executor::block_on;
use kernbench::gpu::GpuRuntime;
use kernbench::{Config, Result};

async fn run() -> Result<()> {
    let rt = GpuRuntime::new(&Config::default()).await?;
    let caps = rt.capabilities();

    println!("Device: {} ({})", rt.device_name(), rt.backend_name());
    println!("Maximum Work Group Size: {}", caps.max_workgroup_size);

    let sizes: Vec<String> = caps
        .max_work_item_sizes
        .iter()
        .map(|s| s.to_string())
        .collect();
    println!("Maximum Work Item Sizes: {}", sizes.join(" "));
    println!("Maximum Work Groups Per Dimension: {}", caps.max_workgroups_per_dim);
    println!("Maximum Storage Binding: {} bytes", caps.max_storage_binding);

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = block_on(run()) {
        kernbench::exit_with(&e);
    }
}
