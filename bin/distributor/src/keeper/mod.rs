mod cycle;

pub use cycle::{CycleConfig, CycleController, CycleReport};
