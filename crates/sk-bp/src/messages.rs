use rand_distr::{Distribution, Uniform};
use sk_core::RngHandle;

use crate::config::MessageInit;

/// Double-buffered cavity fields `h[i -> j]` for every ordered pair `i != j`.
///
/// Fields are packed row by row: row `i` holds the `N - 1` messages leaving
/// spin `i`, with the diagonal slot skipped. `current` is the newest complete
/// generation and `previous` the one it was computed from. A sweep reads
/// `current` and overwrites `previous`, after which [`MessageStore::commit`]
/// swaps the two, so no sweep ever reads a value it wrote itself.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageStore {
    spins: usize,
    current: Vec<f64>,
    previous: Vec<f64>,
}

impl MessageStore {
    /// Allocates and initialises both generations.
    ///
    /// `MessageInit::Uniform` draws one value per ordered pair in packed order
    /// from `rng`; `MessageInit::Zero` consumes no randomness.
    pub fn new(spins: usize, init: &MessageInit, rng: &mut RngHandle) -> Self {
        let len = spins * spins.saturating_sub(1);
        let current = match *init {
            MessageInit::Zero => vec![0.0; len],
            MessageInit::Uniform { amplitude } if amplitude > 0.0 => {
                let distr = Uniform::new(-amplitude, amplitude);
                (0..len).map(|_| distr.sample(rng)).collect()
            }
            MessageInit::Uniform { .. } => vec![0.0; len],
        };
        Self {
            spins,
            previous: current.clone(),
            current,
        }
    }

    /// Number of spins.
    pub fn spins(&self) -> usize {
        self.spins
    }

    /// Total number of directed messages, `N (N - 1)`.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// True when the store holds no messages.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Packed position of the message `i -> j`.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i != j && i < self.spins && j < self.spins);
        i * (self.spins - 1) + slot_of(i, j)
    }

    /// Latest value of the message `i -> j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.current[self.index(i, j)]
    }

    /// Latest generation in packed order.
    pub fn current(&self) -> &[f64] {
        &self.current
    }

    /// Generation the latest one was computed from.
    pub fn previous(&self) -> &[f64] {
        &self.previous
    }

    /// Splits the store into the generation to read and the buffer to overwrite.
    pub fn sweep_buffers(&mut self) -> (&[f64], &mut [f64]) {
        (&self.current, &mut self.previous)
    }

    /// Publishes the freshly written buffer as the latest generation.
    pub fn commit(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
    }

    /// Maximum absolute difference between the two generations.
    pub fn discrepancy(&self) -> f64 {
        self.current
            .iter()
            .zip(&self.previous)
            .map(|(new, old)| (new - old).abs())
            .fold(0.0, f64::max)
    }
}

/// Position of the message `i -> j` within row `i`.
#[inline]
pub(crate) fn slot_of(i: usize, j: usize) -> usize {
    if j < i {
        j
    } else {
        j - 1
    }
}

/// Spin index addressed by the `slot`-th message leaving spin `i`.
#[inline]
pub(crate) fn target_of(i: usize, slot: usize) -> usize {
    if slot < i {
        slot
    } else {
        slot + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_covers_every_ordered_pair_once() {
        let store = MessageStore::new(5, &MessageInit::Zero, &mut RngHandle::from_seed(0));
        let mut seen = vec![false; store.len()];
        for i in 0..5 {
            for j in (0..5).filter(|&j| j != i) {
                let idx = store.index(i, j);
                assert!(!seen[idx]);
                seen[idx] = true;
                assert_eq!(target_of(i, idx - i * 4), j);
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn uniform_init_is_bounded_and_generations_agree() {
        let init = MessageInit::Uniform { amplitude: 0.25 };
        let store = MessageStore::new(6, &init, &mut RngHandle::from_seed(9));
        assert_eq!(store.len(), 30);
        assert!(store.current().iter().all(|h| (-0.25..0.25).contains(h)));
        assert_eq!(store.current(), store.previous());
        assert_eq!(store.discrepancy(), 0.0);
    }

    #[test]
    fn commit_swaps_generations() {
        let mut store = MessageStore::new(3, &MessageInit::Zero, &mut RngHandle::from_seed(0));
        {
            let (src, dst) = store.sweep_buffers();
            assert!(src.iter().all(|h| *h == 0.0));
            dst.iter_mut().for_each(|h| *h = -2.0);
        }
        store.commit();
        assert!(store.current().iter().all(|h| *h == -2.0));
        assert_eq!(store.discrepancy(), 2.0);
        assert_eq!(store.get(2, 0), -2.0);
    }
}
