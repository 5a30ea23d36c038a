pub mod logger;
pub mod timer;

pub use logger::{init_logging, init_logging_with};
pub use timer::Stopwatch;
