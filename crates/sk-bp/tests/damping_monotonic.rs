use sk_bp::kernel::sweep;
use sk_bp::{determinism, propagate, Couplings, MessageStore, RunConfig};
use sk_core::RngHandle;

fn setup(config: &RunConfig) -> (Couplings, MessageStore) {
    let mut rng = RngHandle::from_seed(determinism::couplings_seed(config.seed));
    let couplings = Couplings::sample(config.spins_number, &mut rng).unwrap();
    let mut rng = RngHandle::from_seed(determinism::messages_seed(config.seed));
    let store = MessageStore::new(config.spins_number, &config.init, &mut rng);
    (couplings, store)
}

fn config_with_decay(decay: f64) -> RunConfig {
    let mut config = RunConfig::new(0.4);
    config.spins_number = 200;
    config.decay = decay;
    config
}

#[test]
fn stronger_damping_needs_more_sweeps() {
    let mut sweeps = Vec::new();
    for decay in [0.0, 0.3, 0.6, 0.85] {
        let config = config_with_decay(decay);
        let (couplings, mut store) = setup(&config);
        let outcome = propagate(&couplings, &config.bp(), &mut store).unwrap();
        assert!(outcome.is_converged, "decay {decay}");
        sweeps.push(outcome.iterations_number);
    }
    assert!(sweeps.windows(2).all(|pair| pair[0] < pair[1]), "{sweeps:?}");
}

#[test]
fn stronger_damping_shrinks_discrepancy_more_slowly() {
    let reduction = |decay: f64| {
        let config = config_with_decay(decay);
        let (couplings, mut store) = setup(&config);
        let bp = config.bp();
        let discrepancies: Vec<f64> = (0..20)
            .map(|_| sweep(&couplings, &bp, &mut store).unwrap())
            .collect();
        discrepancies[19] / discrepancies[9]
    };
    let light = reduction(0.2);
    let heavy = reduction(0.8);
    assert!(light < heavy, "light {light} heavy {heavy}");
    assert!(heavy < 1.0);
}
