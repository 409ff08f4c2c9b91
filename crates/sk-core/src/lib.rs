#![deny(missing_docs)]
#![doc = "Shared error taxonomy and deterministic randomness for the SK belief-propagation solver."]

pub mod errors;
pub mod rng;

pub use errors::{ErrorInfo, SkError};
pub use rng::{stream_seed, RngHandle, Stream};
