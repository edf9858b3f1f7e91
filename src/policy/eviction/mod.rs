//! Eviction policies
//!
//! - `BernoulliSampling`: independent sampling at a fixed probability
//! - `ClassicReservoir`: per-edge reservoir sampling at `k/t`
//! - `RoundBatched`: batch eviction with a fixed or adaptive discard rate
//! - `WaitingRoomSampling`: FIFO staging in front of a reservoir

pub mod bernoulli;
pub mod classic;
pub mod round_batched;
pub mod schedule;
pub mod waiting_room;

pub use bernoulli::BernoulliSampling;
pub use classic::ClassicReservoir;
pub use round_batched::{AdmissionRate, RoundBatched, RoundReport};
pub use schedule::{AdaptiveRate, DiscardSchedule, FixedRate, RoundStats, MAX_DISCARD_RATE};
pub use waiting_room::WaitingRoomSampling;
