//! Naive N x N matrix multiplication on the device.

use clap::Parser;
use futures::executor::block_on;
use kernbench::gpu::GpuRuntime;
use kernbench::inputs::MatrixGen;
use kernbench::report::Timing;
use kernbench::{host, ops, verify, Config, Result};

#[derive(Parser, Debug)]
#[command(name = "mat_mul", version, about = "Multiply two random N x N matrices on the GPU")]
struct Args {
    /// Matrix order N
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    size: u32,

    /// Skip the host reference product
    #[arg(long)]
    no_host: bool,
}

async fn run(args: Args) -> Result<()> {
    let config = Config::default();
    let n = args.size as usize;

    let mut matrices = MatrixGen::default();
    let a = matrices.matrix(n, 100);
    let b = matrices.matrix(n, 200);

    let reference = if args.no_host {
        None
    } else {
        let mut c = vec![0.0f32; n * n];
        let ((), host_time) = host::timed(|| host::matmul(&a, &b, &mut c, n));
        println!(
            "CPU matrix multiplication took: {:.6} seconds",
            host_time.as_secs_f64()
        );
        Some((c, host_time))
    };

    let rt = GpuRuntime::new(&config).await?;
    println!("Device: {} ({})", rt.device_name(), rt.backend_name());

    let out = ops::matmul(&rt, &config, &a, &b, n).await?;
    println!(
        "GPU matrix multiplication took: {:.6} seconds",
        out.device_time.as_secs_f64()
    );

    let [first, middle, last] = verify::spot_indices(out.value.len());
    println!("FIRST ELEMENT: {}", out.value[first]);
    println!("MIDDLE ELEMENT: {}", out.value[middle]);
    println!("LAST ELEMENT: {}", out.value[last]);

    if let Some((expected, host_time)) = reference {
        verify::check_slices(&expected, &out.value, config.tolerance)?;
        let timing = Timing {
            host: Some(host_time),
            device: out.device_time,
        };
        if let Some(speedup) = timing.speedup() {
            println!("Speedup: {:.2}x", speedup);
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = block_on(run(args)) {
        kernbench::exit_with(&e);
    }
}
