//! Vector reduction: strided partial sums on the device, folded on the host.

use futures::executor::block_on;
use kernbench::gpu::GpuRuntime;
use kernbench::report::Timing;
use kernbench::{host, inputs, ops, verify, Config, DeviceKind, Result};

const N: usize = 1 << 24;

async fn run() -> Result<()> {
    // Any adapter will do, CPU implementations included.
    let config = Config::builder().device_kind(DeviceKind::Any).build()?;

    let a = inputs::filled(N, 1.0);

    let (cpu_sum, host_time) = host::timed(|| host::vector_sum(&a));
    println!("CPU vector summation result: {}", cpu_sum);
    println!(
        "CPU vector summation took: {:.6} seconds",
        host_time.as_secs_f64()
    );

    let rt = GpuRuntime::new(&config).await?;
    println!("Device: {} ({})", rt.device_name(), rt.backend_name());

    let out = ops::vector_sum(&rt, &config, &a).await?;
    println!("GPU vector summation result: {}", out.value);
    println!(
        "GPU vector summation took: {:.6} seconds ({} partial sums)",
        out.device_time.as_secs_f64(),
        out.items
    );

    verify::check_scalar(cpu_sum, out.value, config.tolerance)?;

    let timing = Timing {
        host: Some(host_time),
        device: out.device_time,
    };
    if let Some(speedup) = timing.speedup() {
        println!("Speedup: {:.2}x", speedup);
    }

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = block_on(run()) {
        kernbench::exit_with(&e);
    }
}
