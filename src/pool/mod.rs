//! Pool module - bounded-concurrency pipeline stages.

mod consistency;
mod generator;
mod judge;
mod refine;

pub use consistency::*;
pub use generator::*;
pub use judge::*;
pub use refine::*;
