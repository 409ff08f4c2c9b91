use sk_core::{stream_seed, Stream};

/// Derives the seed used to sample the coupling matrix of a run.
pub fn couplings_seed(master_seed: u64) -> u64 {
    stream_seed(master_seed, Stream::Couplings)
}

/// Derives the seed used to draw the initial messages of a run.
pub fn messages_seed(master_seed: u64) -> u64 {
    stream_seed(master_seed, Stream::Messages)
}

/// Derives the master seed of the `index`-th run of a parameter sweep.
pub fn sweep_seed(master_seed: u64, index: usize) -> u64 {
    stream_seed(master_seed, Stream::SweepPoint(index as u64))
}
