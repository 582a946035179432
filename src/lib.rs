mod bank;
pub mod check;
mod chunks;
mod font;
mod genmod;
pub mod inspect;
mod reader;
mod records;
mod resolve;

pub use bank::*;
pub use chunks::*;
pub use records::*;

use std::fmt;

/// Everything that can stop a bank from loading.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    #[error("expected `{expected}` chunk, found `{found}`")]
    BadTag { expected: Tag, found: Tag },
    #[error("unexpected end of file in {0}")]
    Truncated(&'static str),
    #[error("unsupported bank format version {major}.{minor:02}")]
    UnsupportedVersion { major: u16, minor: u16 },
    #[error("invalid `{chunk}` chunk size {size}")]
    BadChunkSize { chunk: Tag, size: u32 },
    #[error("{array} record {index} has {field} start {value}, table holds {limit}")]
    BadIndex {
        array: &'static str,
        field: &'static str,
        index: usize,
        value: u16,
        limit: usize,
    },
    #[error("{array} record {index} has {field} start {value}, before previous {prev}")]
    Unordered {
        array: &'static str,
        field: &'static str,
        index: usize,
        value: u16,
        prev: u16,
    },
}

/// Coarse failure class. Structural means the stream is not a readable SF2
/// container; consistency means the container parsed but its record arrays
/// disagree with each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Structural,
    Consistency,
}

impl LoadError {
    pub fn severity(&self) -> Severity {
        match self {
            LoadError::BadIndex { .. } | LoadError::Unordered { .. } => Severity::Consistency,
            _ => Severity::Structural,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Structural => write!(f, "structural"),
            Severity::Consistency => write!(f, "consistency"),
        }
    }
}

#[derive(Debug, Default)]
pub struct FileFilters {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

impl FileFilters {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
    pub fn matches(&self, s: &str) -> bool {
        if !self.includes.is_empty() && !self.includes.iter().any(|f| glob_match::glob_match(f, s))
        {
            return false;
        }
        !self.excludes.iter().any(|f| glob_match::glob_match(f, s))
    }
}

#[inline]
fn invalid_data(args: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, args.to_string())
}

#[inline]
fn is_log_level(lvl: log::LevelFilter) -> bool {
    lvl <= log::STATIC_MAX_LEVEL && lvl <= log::max_level()
}
