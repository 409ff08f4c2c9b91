use std::f64::consts::LN_2;

use sk_bp::{bethe, determinism, propagate, run, Couplings, MessageStore, RunConfig};
use sk_core::RngHandle;

#[test]
fn beta_zero_gives_ln_two_on_both_sides() {
    let mut config = RunConfig::new(0.0);
    config.spins_number = 50;
    let summary = run(&config).unwrap();
    assert!(summary.is_converged);
    assert!((summary.bethe_free_entropy - LN_2).abs() < 1e-12);
    assert!((summary.replica_symmetric_free_entropy - LN_2).abs() < 1e-12);
}

#[test]
fn beta_zero_drives_every_field_to_zero() {
    let mut config = RunConfig::new(0.0);
    config.spins_number = 20;
    config.decay = 0.0;
    let mut rng = RngHandle::from_seed(determinism::couplings_seed(config.seed));
    let couplings = Couplings::sample(config.spins_number, &mut rng).unwrap();
    let mut rng = RngHandle::from_seed(determinism::messages_seed(config.seed));
    let mut store = MessageStore::new(config.spins_number, &config.init, &mut rng);

    let outcome = propagate(&couplings, &config.bp(), &mut store).unwrap();
    assert!(outcome.is_converged);
    assert_eq!(outcome.iterations_number, 2);
    assert!(store.current().iter().all(|h| *h == 0.0));
    assert!(bethe::local_fields(&couplings, &store, 0.0, config.cavity_rule)
        .iter()
        .all(|h| *h == 0.0));
}
