//! Error kinds (§7).
//!
//! Grounded on the teacher's `utils/sched_error.rs` shape: a plain enum
//! with a hand-written [`std::fmt::Display`] and [`std::error::Error`]
//! impl, `anyhow::Error` carrying the contextual reason. The content is
//! different from the teacher's (`NonSchedulable`/`Precondition`): §7
//! only asks for validation, configuration and programming-invariant
//! errors at this boundary — a deadline miss is recovered internally by
//! [`crate::sim::simulator::Simulator::run`] and never surfaces here.

#[derive(Debug)]
pub enum EngineError {
    /// Invalid platform or task construction, an out-of-range system
    /// utilization, an unknown test-factory name, or a sufficient test
    /// invoked on a single-core platform.
    Validation(anyhow::Error),
    /// An analyzer with no configured test, or an executor missing a
    /// required attribute.
    Configuration(anyhow::Error),
    /// An internal invariant was violated (e.g. a request found in
    /// neither `holders` nor `waiters`). Always fatal.
    Programming(anyhow::Error),
}

impl EngineError {
    pub fn validation(reason: impl std::fmt::Display) -> Self {
        Self::Validation(anyhow::format_err!("{reason}"))
    }

    pub fn configuration(reason: impl std::fmt::Display) -> Self {
        Self::Configuration(anyhow::format_err!("{reason}"))
    }

    pub fn programming(reason: impl std::fmt::Display) -> Self {
        Self::Programming(anyhow::format_err!("{reason}"))
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(error) => write!(f, "validation error: {error}"),
            Self::Configuration(error) => write!(f, "configuration error: {error}"),
            Self::Programming(error) => write!(f, "programming error (invariant violated): {error}"),
        }
    }
}

impl std::error::Error for EngineError {}
