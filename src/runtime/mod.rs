pub mod machine;
pub mod runtime_error;
pub mod tape;

pub use machine::{Machine, MachineConfig, RunSummary, execute};
pub use runtime_error::RuntimeError;
pub use tape::BoundsPolicy;
