//! Category taxonomy: turn noisy subject labels into canonical tokens and count them.

mod normalize;
mod tally;

pub use normalize::normalize;
pub use tally::{CategoryTally, tally};
