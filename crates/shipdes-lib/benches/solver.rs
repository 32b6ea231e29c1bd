use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use shipdes_lib::{
    run_sweep, solve, DesignMode, DesignRequest, EconomicParameters, SweepParameter,
};
use std::hint::black_box;

static TANKER: Lazy<DesignRequest> = Lazy::new(DesignRequest::default);
static TANKER_ECONOMICS: Lazy<DesignRequest> = Lazy::new(|| DesignRequest {
    economics: Some(EconomicParameters::default()),
    ..DesignRequest::default()
});
static FIXED_HULL: Lazy<DesignRequest> = Lazy::new(|| DesignRequest {
    design_mode: DesignMode::Dimensions,
    ..DesignRequest::default()
});
static CONTAINER: Lazy<DesignRequest> = Lazy::new(|| DesignRequest {
    design_mode: DesignMode::Teu,
    ship_type: "Container ship".to_string(),
    speed_kn: 18.0,
    engine_rpm: 100.0,
    propeller_rpm: 100.0,
    ..DesignRequest::default()
});

fn benchmark_solver(c: &mut Criterion) {
    c.bench_function("tanker_deadweight_search", |b| {
        let request = &*TANKER;
        b.iter(|| {
            let result = solve(request).expect("valid request");
            black_box(result.iterations)
        });
    });

    c.bench_function("tanker_with_economics", |b| {
        let request = &*TANKER_ECONOMICS;
        b.iter(|| {
            let result = solve(request).expect("valid request");
            black_box(result.required_freight_rate())
        });
    });

    c.bench_function("fixed_hull_evaluation", |b| {
        let request = &*FIXED_HULL;
        b.iter(|| {
            let result = solve(request).expect("valid request");
            black_box(result.installed_power_kw())
        });
    });

    c.bench_function("container_volume_expansion", |b| {
        let request = &*CONTAINER;
        b.iter(|| {
            let result = solve(request).expect("valid request");
            black_box(result.volume)
        });
    });

    c.bench_function("speed_sweep_5_points", |b| {
        let request = &*TANKER;
        b.iter(|| {
            let run = run_sweep(request, SweepParameter::Speed, 15.0, 17.0, 5).expect("valid sweep");
            black_box(run.points.len())
        });
    });
}

criterion_group!(benches, benchmark_solver);
criterion_main!(benches);
