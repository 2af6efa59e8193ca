#![forbid(unsafe_code)]

pub mod catalog;
pub mod model;
pub mod progression;
pub mod rewards;

pub use catalog::{CatalogError, LevelCatalog};
pub use rewards::{Reward, RewardEngine, SessionOutcome};
