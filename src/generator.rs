pub mod utilization;
pub mod factory;
pub mod config;

pub mod prelude {
    pub use super::utilization::UtilizationAlgorithm;
    pub use super::factory::{PeriodicTaskFactory, TasksetFactory, TaskSubsetFactory};
    pub use super::config::HGConfig;
}
