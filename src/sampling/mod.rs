//! Sampling primitives shared by the eviction policies

pub mod subset;
pub mod survival;
pub mod waiting_room;

pub use subset::{choose_random_subset, SubsetStrategy};
pub use survival::SurvivalCache;
pub use waiting_room::WaitingRoom;
