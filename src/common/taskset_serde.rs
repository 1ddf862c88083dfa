//! Taskset file parsing, kept from the teacher almost verbatim and
//! retargeted at [`TaskInfo`] instead of `RTTask`: JSON (a flat array of
//! `{wcet, deadline, period}` records) or a plain whitespace-separated
//! `wcet deadline period` line format, one task per line. `id`/`type`
//! are assigned by the parser rather than read from the file.

use crate::prelude::*;
use crate::error::EngineError;
use crate::platform::PlatformInfo;
use crate::task_model::TaskKind;

pub mod prelude {
    pub use super::{
        TasksetFileType,
        TasksetParseError,
        parse_taskset,
    };
}

#[derive(Debug)]
#[derive(Clone, Copy)]
#[derive(PartialEq, Eq)]
pub enum TasksetFileType {
    Auto,
    Json,
    Plain,
}

#[derive(Debug)]
pub enum TasksetParseError {
    IOError(std::io::Error),
    JSONError(serde_json::Error),
    PlainParseError(String),
    Validation(EngineError),
}

#[derive(serde::Deserialize)]
struct RawTask {
    wcet: f64,
    deadline: f64,
    period: f64,
}

pub fn parse_taskset(
    taskset: &str,
    typ: TasksetFileType,
    platform: &PlatformInfo,
) -> Result<Vec<TaskInfo>, TasksetParseError> {
    use TasksetFileType::*;

    let path = std::path::Path::new(taskset);
    let resolved =
        if typ == TasksetFileType::Auto {
            if path.extension().is_some_and(|ext| ext == "json") {
                Json
            } else {
                Plain
            }
        } else { typ };

    let taskset_data = std::fs::read_to_string(path)?;

    match resolved {
        Auto => unreachable!("Auto is resolved above"),
        Json => {
            let raw: Vec<RawTask> = serde_json::from_str(&taskset_data)?;
            raw.into_iter()
                .enumerate()
                .map(|(id, raw)| build_task(id as u64, raw.wcet, raw.deadline, raw.period, platform))
                .collect()
        }
        Plain => plain_deserialize_taskset(&taskset_data, platform),
    }
}

fn plain_deserialize_taskset(data: &str, platform: &PlatformInfo) -> Result<Vec<TaskInfo>, TasksetParseError> {
    data.trim_ascii()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(id, line)| plain_deserialize_task(id as u64, line, platform))
        .collect()
}

fn plain_deserialize_task(id: u64, data: &str, platform: &PlatformInfo) -> Result<TaskInfo, TasksetParseError> {
    let fields: Vec<&str> = data
        .trim_ascii()
        .split_ascii_whitespace()
        .collect();

    if fields.len() != 3 {
        return Err(TasksetParseError::PlainParseError("task parsing requires three numeric fields (wcet, deadline and period)".to_owned()));
    }

    let wcet: f64 = fields[0].parse()
        .map_err(|err| TasksetParseError::PlainParseError(format!("Failed to parse field 'wcet': {err}")))?;
    let deadline: f64 = fields[1].parse()
        .map_err(|err| TasksetParseError::PlainParseError(format!("Failed to parse field 'deadline': {err}")))?;
    let period: f64 = fields[2].parse()
        .map_err(|err| TasksetParseError::PlainParseError(format!("Failed to parse field 'period': {err}")))?;

    build_task(id, wcet, deadline, period, platform)
}

fn build_task(id: u64, wcet: f64, deadline: f64, period: f64, platform: &PlatformInfo) -> Result<TaskInfo, TasksetParseError> {
    TaskInfo::new(id, TaskKind::Periodic, Time::new(wcet), Time::new(deadline), Time::new(period), platform)
        .map_err(TasksetParseError::Validation)
}

// =============================================================================

impl std::fmt::Display for TasksetParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Taskset Parse Error, ")?;
        match self {
            TasksetParseError::IOError(error) => write!(f, "IO: {error}")?,
            TasksetParseError::JSONError(error) => write!(f, "JSON: {error}")?,
            TasksetParseError::PlainParseError(error) => write!(f, "Plain: {error}")?,
            TasksetParseError::Validation(error) => write!(f, "{error}")?,
        };

        Ok(())
    }
}

impl std::error::Error for TasksetParseError {}

impl From<std::io::Error> for TasksetParseError {
    fn from(value: std::io::Error) -> Self {
        Self::IOError(value)
    }
}

impl From<serde_json::Error> for TasksetParseError {
    fn from(value: serde_json::Error) -> Self {
        Self::JSONError(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> PlatformInfo {
        PlatformInfo::new(vec![1.0]).unwrap()
    }

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_plain_format() {
        let path = write_temp("simrt_taskset_plain_test.txt", "25 50 50\n30 75 75\n");
        let taskset = parse_taskset(path.to_str().unwrap(), TasksetFileType::Plain, &platform()).unwrap();
        assert_eq!(taskset.len(), 2);
        assert_eq!(taskset[0].wcet.value(), 25.0);
    }

    #[test]
    fn parses_json_format() {
        let path = write_temp("simrt_taskset_json_test.json", r#"[{"wcet":25,"deadline":50,"period":50}]"#);
        let taskset = parse_taskset(path.to_str().unwrap(), TasksetFileType::Auto, &platform()).unwrap();
        assert_eq!(taskset.len(), 1);
    }

    #[test]
    fn rejects_malformed_line() {
        let path = write_temp("simrt_taskset_bad_test.txt", "25 50\n");
        assert!(parse_taskset(path.to_str().unwrap(), TasksetFileType::Plain, &platform()).is_err());
    }
}