//! Platform model (C1): an immutable description of the processor set a
//! taskset is scheduled on.

use crate::prelude::*;
use crate::error::EngineError;

pub mod prelude {
    pub use super::PlatformInfo;
}

pub type Speed = f64;

/// A platform's speed vector, always stored non-increasing.
///
/// Grounded on `original_source/simRT/core/processor.py`'s
/// `PlatformInfo` dataclass: the speed list is sorted descending on
/// construction and never mutated afterward.
#[derive(Clone, Debug)]
#[derive(PartialEq)]
pub struct PlatformInfo {
    speed_list: Vec<Speed>,
}

impl PlatformInfo {
    /// Builds a platform from an arbitrary-order, non-empty list of
    /// strictly-positive speeds. Rejects an empty list or a
    /// non-positive speed with a [`EngineError::Validation`].
    pub fn new(mut speed_list: Vec<Speed>) -> Result<Self, EngineError> {
        if speed_list.is_empty() {
            return Err(EngineError::validation("platform speed list must not be empty"));
        }

        if speed_list.iter().any(|&speed| !(speed > 0.0)) {
            return Err(EngineError::validation("all processor speeds must be strictly positive"));
        }

        speed_list.sort_by(|a, b| b.partial_cmp(a).expect("speeds are never NaN"));
        Ok(Self { speed_list })
    }

    /// A single processor of speed 1, the default used when no platform
    /// is specified.
    pub fn uniprocessor() -> Self {
        Self { speed_list: vec![1.0] }
    }

    pub fn speed_list(&self) -> &[Speed] {
        &self.speed_list
    }

    pub fn capacity(&self) -> usize {
        self.speed_list.len()
    }

    /// Total platform speed, `S_m` in spec notation.
    pub fn total_speed(&self) -> Speed {
        self.speed_list.iter().sum()
    }

    pub fn fastest(&self) -> Speed {
        self.speed_list[0]
    }

    pub fn is_homogeneous(&self) -> bool {
        self.speed_list.first() == self.speed_list.last()
    }

    pub fn is_multicore(&self) -> bool {
        self.capacity() >= 2
    }
}

/// Wire shape `{ "speed_list": [<number>, ...] }`, matching spec.md §6's
/// `platform_info` object (as nested in `HGConfig`).
#[derive(serde::Serialize, serde::Deserialize)]
struct PlatformInfoWire {
    speed_list: Vec<Speed>,
}

impl serde::Serialize for PlatformInfo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        PlatformInfoWire { speed_list: self.speed_list.clone() }.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for PlatformInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = PlatformInfoWire::deserialize(deserializer)?;
        PlatformInfo::new(wire.speed_list).map_err(serde::de::Error::custom)
    }
}
