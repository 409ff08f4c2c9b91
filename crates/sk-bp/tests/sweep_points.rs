use sk_bp::{sweep, BetaGrid, RunConfig};

#[test]
fn sweep_is_ordered_and_independent_of_job_count() {
    let mut base = RunConfig::new(0.0);
    base.spins_number = 40;
    let grid = BetaGrid {
        start: 0.0,
        stop: 0.6,
        step: 0.2,
    };
    let serial = sweep(&base, &grid, 1).unwrap();
    let parallel = sweep(&base, &grid, 3).unwrap();
    assert_eq!(serial, parallel);

    let betas: Vec<f64> = serial.iter().map(|point| point.beta).collect();
    assert_eq!(betas.len(), 4);
    assert!(betas.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(serial.iter().all(|point| point.summary.is_converged));
    let seeds: std::collections::BTreeSet<u64> = serial.iter().map(|point| point.seed).collect();
    assert_eq!(seeds.len(), serial.len());
}

#[test]
fn invalid_base_config_aborts_the_sweep() {
    let mut base = RunConfig::new(0.0);
    base.decay = 1.5;
    let err = sweep(&base, &BetaGrid::default(), 2).unwrap_err();
    assert!(err.is_parameter());
}
