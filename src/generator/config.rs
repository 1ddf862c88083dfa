//! JSON configuration schema for generator runs (spec.md §6).
//!
//! Grounded on `original_source/simRT/generator/task_factory.py`'s
//! config-driven batch scripts, which read a platform description, a
//! node (taskset) count and a period bound out of a JSON file before
//! calling into the generators. `HGConfig` is the wire shape the
//! external CLI collaborator serializes/deserializes; this crate only
//! needs it to round-trip exactly, field order and all.

use crate::error::EngineError;
use crate::platform::PlatformInfo;

/// `{ "platform_info": { "speed_list": [...] }, "num_node": <int>,
/// "period_bound": [<int>, <int>] }`. `speed_list` serializes in the
/// same non-increasing order `PlatformInfo` always stores it in;
/// `(u64, u64)` already serializes as a 2-element JSON array.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct HGConfig {
    pub platform_info: PlatformInfo,
    pub num_node: u64,
    pub period_bound: (u64, u64),
}

impl HGConfig {
    pub fn new(platform_info: PlatformInfo, num_node: u64, period_bound: (u64, u64)) -> Result<Self, EngineError> {
        if num_node == 0 {
            return Err(EngineError::validation("num_node must be > 0"));
        }
        if period_bound.0 == 0 || period_bound.0 > period_bound.1 {
            return Err(EngineError::validation("period_bound must be a non-empty range of positive periods"));
        }
        Ok(Self { platform_info, num_node, period_bound })
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self).map_err(|error| EngineError::validation(format!("failed to serialize HGConfig: {error}")))
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|error| EngineError::validation(format!("failed to parse HGConfig: {error}")))
    }
}
