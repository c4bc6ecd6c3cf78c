//! Elementwise vector addition on the device against a host loop.

use futures::executor::block_on;
use kernbench::gpu::GpuRuntime;
use kernbench::report::Timing;
use kernbench::{host, inputs, ops, verify, Config, DeviceKind, Result};

const N: usize = 1 << 24;

async fn run() -> Result<()> {
    // Any adapter will do, CPU implementations included.
    let config = Config::builder().device_kind(DeviceKind::Any).build()?;

    let a = inputs::filled(N, 1.0);
    let b = inputs::filled(N, 2.0);
    let mut c = vec![0.0f32; N];

    let ((), host_time) = host::timed(|| host::vector_add(&a, &b, &mut c));
    println!("CPU vector addition took: {:.6} seconds", host_time.as_secs_f64());
    println!("CPU Result: {}", c[0]);

    let rt = GpuRuntime::new(&config).await?;
    println!("Device: {} ({})", rt.device_name(), rt.backend_name());

    let out = ops::vector_add(&rt, &config, &a, &b).await?;
    println!(
        "GPU vector addition took: {:.6} seconds",
        out.device_time.as_secs_f64()
    );
    println!("GPU Result: {}", out.value[N / 2 + 100]);

    verify::check_slices(&c, &out.value, config.tolerance)?;
    println!("Results match ({} elements)", N);

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
