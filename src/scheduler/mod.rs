//! Dependency-aware concurrent execution of one round's tasks.

mod board;
mod executor;
mod observation;
pub mod resolve;

pub use executor::TaskScheduler;
pub use observation::Observation;
