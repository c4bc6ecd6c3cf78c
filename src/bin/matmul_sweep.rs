//! Matrix product over a range of sizes, written as a whitespace table that
//! plotting scripts can load directly.

use clap::Parser;
use futures::executor::block_on;
use kernbench::gpu::GpuRuntime;
use kernbench::inputs::MatrixGen;
use kernbench::report::{BenchRecord, ConsoleExporter, ReportExporter, TableExporter, TimingStats};
use kernbench::{host, ops, verify, Config, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "matmul_sweep", version, about = "Time host and GPU matrix products across sizes")]
struct Args {
    /// Matrix orders to run
    #[arg(long, value_delimiter = ',', default_value = "64,128,256,512,1024")]
    sizes: Vec<u32>,

    /// Device runs per size; the median is reported
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    repeats: u32,

    /// Largest order that still gets a host reference
    #[arg(long, default_value_t = 1024)]
    host_limit: u32,

    /// Table output path
    #[arg(long, default_value = "matmul_bench.dat")]
    output: PathBuf,

    /// Also write a JSON report
    #[cfg(feature = "telemetry")]
    #[arg(long)]
    json: Option<PathBuf>,
}

async fn run(args: Args) -> Result<()> {
    let config = Config::default();
    let rt = GpuRuntime::new(&config).await?;
    log::info!("sweeping on {} ({})", rt.device_name(), rt.backend_name());

    let mut matrices = MatrixGen::default();
    let mut records = Vec::with_capacity(args.sizes.len());

    for &size in &args.sizes {
        if size == 0 {
            log::warn!("skipping matrix order 0");
            continue;
        }
        let n = size as usize;
        let a = matrices.matrix(n, 100);
        let b = matrices.matrix(n, 200);

        let reference = (size <= args.host_limit).then(|| {
            let mut c = vec![0.0f32; n * n];
            let ((), elapsed) = host::timed(|| host::matmul(&a, &b, &mut c, n));
            (c, elapsed)
        });

        let mut stats = TimingStats::new()?;
        for repeat in 0..args.repeats {
            let out = ops::matmul(&rt, &config, &a, &b, n).await?;
            if repeat == 0 {
                if let Some((expected, _)) = &reference {
                    verify::check_slices(expected, &out.value, config.tolerance)?;
                }
            }
            stats.record(out.device_time);
        }

        log::debug!(
            "n = {}: device min {:?}, median {:?}, max {:?}",
            n,
            stats.min(),
            stats.median(),
            stats.max()
        );
        records.push(BenchRecord::new(
            n,
            reference.map(|(_, elapsed)| elapsed),
            stats.median(),
        ));
    }

    let title = format!("matmul sweep on {}", rt.device_name());
    TableExporter::new(&args.output).export(&title, &records)?;

    export_json(&args, &title, &records)?;

    ConsoleExporter.export(&title, &records)
}

#[cfg(feature = "telemetry")]
fn export_json(args: &Args, title: &str, records: &[BenchRecord]) -> Result<()> {
    match &args.json {
        Some(path) => kernbench::report::JsonExporter::new(path).export(title, records),
        None => Ok(()),
    }
}

#[cfg(not(feature = "telemetry"))]
fn export_json(_args: &Args, _title: &str, _records: &[BenchRecord]) -> Result<()> {
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = block_on(run(args)) {
        kernbench::exit_with(&e);
    }
}
