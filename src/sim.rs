pub mod job;
pub mod task;
pub mod simulator;

pub mod prelude {
    pub use super::simulator::prelude::*;
    pub use super::job::{Job, ExecutionSpan, JobOutcome};
    pub use super::task::Task;
}
