pub mod common;
pub mod error;
pub mod platform;
pub mod task_model;
pub mod utils;

pub mod engine;
pub mod resource;
pub mod sim;
pub mod analysis;
pub mod generator;
pub mod analyzer;
pub mod executor;

pub mod prelude {
    pub use super::common::prelude::*;
    pub use super::error::EngineError;
    pub use super::platform::prelude::*;
    pub use super::task_model::prelude::*;
    pub use super::engine::{Engine, ProcessId};
    pub use super::resource::{ProcessorPlatform, Notification};
    pub use super::sim::prelude::*;
    pub use super::analysis::prelude::*;
    pub use super::generator::prelude::*;
    pub use super::analyzer::prelude::*;
    pub use super::executor::prelude::*;
}
