use kernbench::inputs::MatrixGen;
use kernbench::prelude::*;
use kernbench::report::render_table;
use kernbench::{host, verify};
use std::time::Duration;

#[test]
fn test_host_vector_add_constant_inputs() {
    let n = 1 << 12;
    let a = kernbench::inputs::filled(n, 1.0);
    let b = kernbench::inputs::filled(n, 2.0);
    let mut c = vec![0.0; n];

    host::vector_add(&a, &b, &mut c);

    assert!(c.iter().all(|&x| x == 3.0));
}

#[test]
fn test_host_vector_sum_of_ones() {
    let a = kernbench::inputs::filled(1000, 1.0);
    assert_eq!(host::vector_sum(&a), 1000.0);
    assert_eq!(host::vector_sum(&[]), 0.0);
}

#[test]
fn test_host_matmul_identity() {
    let n = 8;
    let mut matrices = MatrixGen::new(7);
    let a = matrices.matrix(n, 100);

    let mut identity = vec![0.0; n * n];
    for i in 0..n {
        identity[i * n + i] = 1.0;
    }

    let mut c = vec![0.0; n * n];
    host::matmul(&a, &identity, &mut c, n);
    assert_eq!(c, a);
}

#[test]
fn test_matrix_gen_is_deterministic() {
    let first = MatrixGen::new(42).matrix(16, 200);
    let second = MatrixGen::new(42).matrix(16, 200);

    assert_eq!(first, second);
    assert!(first.iter().all(|&x| (0.0..200.0).contains(&x) && x.fract() == 0.0));
}

#[test]
fn test_verify_reports_first_mismatch() {
    let expected = [1.0, 2.0, 3.0, 4.0];
    let actual = [1.0, 2.0, 30.0, 40.0];

    match verify::check_slices(&expected, &actual, 1e-4) {
        Err(Error::Verify { index, .. }) => assert_eq!(index, 2),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(verify::check_slices(&expected, &expected, 1e-4).is_ok());
}

#[test]
fn test_verify_scalar_tolerance() {
    assert!(verify::check_scalar(16_777_216.0, 16_777_217.0, 1e-4).is_ok());
    assert!(verify::check_scalar(100.0, 101.0, 1e-4).is_err());
}

#[test]
fn test_config_builder_rejects_bad_workgroup() {
    assert!(Config::builder().workgroup_size(96).build().is_err());
    assert!(Config::builder().tile_size(64).build().is_err());

    let config = Config::builder()
        .workgroup_size(256)
        .tile_size(8)
        .device_kind(DeviceKind::Any)
        .build()
        .unwrap();
    assert_eq!(config.workgroup_size, 256);
    assert_eq!(config.tile_size, 8);
}

#[test]
fn test_error_exit_codes() {
    let err = Error::NoAdapter {
        kind: "GPU".to_string(),
    };
    assert_eq!(err.to_string(), "no GPU adapter found");
    assert_ne!(err.exit_code(), 0);
    assert_ne!(err.exit_code(), Error::config("x").exit_code());
}

#[test]
fn test_table_report_layout() {
    let records = vec![
        BenchRecord::new(64, Some(Duration::from_millis(3)), Duration::from_millis(1)),
        BenchRecord::new(2048, None, Duration::from_millis(50)),
    ];
    let table = render_table("sweep", &records);
    let rows: Vec<Vec<&str>> = table
        .lines()
        .skip(2)
        .map(|line| line.split_whitespace().collect())
        .collect();

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.len() == 3));
    assert_eq!(rows[0][0], "64");
    assert_eq!(rows[1][1], "nan");
}

#[test]
fn test_timing_stats_median() {
    let mut stats = TimingStats::new().unwrap();
    for ms in [10u64, 30, 20] {
        stats.record(Duration::from_millis(ms));
    }
    let median = stats.median().as_secs_f64();
    assert!((median - 0.020).abs() < 0.0001);
}

#[cfg(feature = "gpu")]
mod partition {
    use kernbench::gpu::partition::{reduction_items, Partition1d, Partition2d};

    #[test]
    fn test_large_launch_is_folded() {
        let partition = Partition1d::new(1 << 24, 128, 65_535).unwrap();

        assert!(partition.is_folded());
        assert!(partition.launched() >= 1 << 24);
        assert_eq!(partition.global(), 1 << 24);
    }

    #[test]
    fn test_reduction_items_capped() {
        assert_eq!(reduction_items(1 << 24, 128, 1 << 16), 1 << 16);
        assert_eq!(reduction_items(100, 128, 1 << 16), 128);
    }

    #[test]
    fn test_matmul_grid_covers_output() {
        let partition = Partition2d::new(1000, 1000, 16, 65_535).unwrap();
        let (x, y, _) = partition.workgroups();

        assert!(x as usize * 16 >= 1000);
        assert!(y as usize * 16 >= 1000);
        assert_eq!(x, 63);
    }
}
