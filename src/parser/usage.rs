//! Stack usage records produced by GCC's `-fstack-usage`.
//!
//! Each line describes one function's own frame:
//!
//! ```text
//! msmpdbg.c:330:6:StartTransmit   16      static
//! ```
//!
//! The source locator is discarded; only the name, the frame size and the
//! frame kind are kept. The resulting [`UsageTable`] is the function registry
//! that the call graph builder and the estimator extend afterwards.

use crate::utils::error::ParseError;
use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static USAGE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^:]+:\d+:\d+:(?P<name>\S+)\s+(?P<size>\d+)\s+(?P<kind>[\w,]+)")
        .expect("usage line pattern is valid")
});

/// Frame classification emitted by GCC next to the size
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// Fixed-size frame
    Static,
    /// Frame grows at runtime (alloca, VLAs); size is a lower bound
    Dynamic,
    /// Frame grows at runtime but GCC proved an upper bound
    DynamicBounded,
    /// Anything else, kept verbatim
    Other(String),
}

impl FrameKind {
    /// Whether the recorded size may underestimate the real frame
    pub fn is_dynamic(&self) -> bool {
        matches!(self, FrameKind::Dynamic | FrameKind::DynamicBounded)
    }
}

impl From<&str> for FrameKind {
    fn from(token: &str) -> Self {
        match token {
            "static" => FrameKind::Static,
            "dynamic" => FrameKind::Dynamic,
            "dynamic,bounded" => FrameKind::DynamicBounded,
            other => FrameKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Static => write!(f, "static"),
            FrameKind::Dynamic => write!(f, "dynamic"),
            FrameKind::DynamicBounded => write!(f, "dynamic,bounded"),
            FrameKind::Other(token) => write!(f, "{}", token),
        }
    }
}

/// One function known to the analysis
///
/// Created either from a usage record (`own_usage` known, no callees yet) or
/// from the call listing (`own_usage` unknown). Only the call graph builder
/// adds callees and only the estimator sets `total_usage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    pub name: String,

    /// Own frame size in bytes; `None` when no usage record exists
    pub own_usage: Option<u64>,

    /// Frame kind from the usage record
    pub kind: Option<FrameKind>,

    /// Direct callees, deduplicated, in first-seen order
    pub callees: IndexSet<String>,

    /// Worst-case bytes from this function down to the deepest leaf
    pub total_usage: Option<u64>,
}

impl FunctionRecord {
    pub fn new(name: impl Into<String>, own_usage: u64, kind: FrameKind) -> Self {
        Self {
            name: name.into(),
            own_usage: Some(own_usage),
            kind: Some(kind),
            callees: IndexSet::new(),
            total_usage: None,
        }
    }

    /// Record for a function seen only in the call listing
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            own_usage: None,
            kind: None,
            callees: IndexSet::new(),
            total_usage: None,
        }
    }

    /// Own usage with unknown treated as 0
    pub fn effective_usage(&self) -> u64 {
        self.own_usage.unwrap_or(0)
    }

    pub fn is_leaf(&self) -> bool {
        self.callees.is_empty()
    }

    pub fn has_dynamic_frame(&self) -> bool {
        self.kind.as_ref().is_some_and(FrameKind::is_dynamic)
    }
}

/// Name-keyed function registry shared by all analysis phases
#[derive(Debug, Clone, Default)]
pub struct UsageTable {
    records: IndexMap<String, FunctionRecord>,
}

impl UsageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionRecord> {
        self.records.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FunctionRecord> {
        self.records.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionRecord> {
        self.records.values()
    }

    /// Insert a record from a usage line
    ///
    /// Names are a flat namespace. When the same name shows up twice (static
    /// functions in different translation units), the larger frame wins so the
    /// estimate stays an upper bound.
    pub fn insert(&mut self, record: FunctionRecord) {
        match self.records.get_mut(&record.name) {
            Some(existing) if existing.own_usage.is_none() => {
                existing.own_usage = record.own_usage;
                existing.kind = record.kind;
            }
            Some(existing) => {
                warn!(
                    "Duplicate stack usage for {}: {:?} vs {:?}, keeping the larger",
                    record.name, existing.own_usage, record.own_usage
                );
                if record.own_usage > existing.own_usage {
                    existing.own_usage = record.own_usage;
                    existing.kind = record.kind;
                }
            }
            None => {
                self.records.insert(record.name.clone(), record);
            }
        }
    }

    /// Insert an unknown-usage record if `name` is absent
    ///
    /// Returns true when a new record was created.
    pub fn ensure(&mut self, name: &str) -> bool {
        if self.records.contains_key(name) {
            return false;
        }
        self.records
            .insert(name.to_string(), FunctionRecord::unknown(name));
        true
    }

    /// Add a caller -> callee edge; returns false if the edge already existed
    ///
    /// Both ends are created with unknown usage when missing.
    pub fn add_call(&mut self, caller: &str, callee: &str) -> bool {
        self.ensure(callee);
        self.ensure(caller);
        match self.records.get_mut(caller) {
            Some(record) => record.callees.insert(callee.to_string()),
            None => false,
        }
    }

    /// Number of distinct caller -> callee edges
    pub fn edge_count(&self) -> usize {
        self.records.values().map(|r| r.callees.len()).sum()
    }

    /// Names of functions whose recorded frame may underestimate the real one
    pub fn dynamic_frames(&self) -> Vec<String> {
        self.records
            .values()
            .filter(|r| r.has_dynamic_frame())
            .map(|r| r.name.clone())
            .collect()
    }
}

/// Parse a single `.su` line into a record
///
/// Returns `None` if the line does not have the
/// `<path>:<line>:<col>:<name> <size> <kind>` shape.
pub fn parse_usage_line(line: &str) -> Option<FunctionRecord> {
    let caps = USAGE_LINE.captures(line)?;
    let size = caps["size"].parse::<u64>().ok()?;
    Some(FunctionRecord::new(
        &caps["name"],
        size,
        FrameKind::from(&caps["kind"]),
    ))
}

/// Parse all lines of a `.su` file into a [`UsageTable`]
///
/// Whitespace-only lines are skipped. Any other line that does not match
/// aborts the whole parse.
///
/// # Errors
/// * `ParseError::MalformedUsageLine` - first offending line, 1-based
pub fn parse_usage_lines<S: AsRef<str>>(lines: &[S]) -> Result<UsageTable, ParseError> {
    let mut table = UsageTable::new();

    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }

        let record = parse_usage_line(line).ok_or_else(|| ParseError::MalformedUsageLine {
            line_no: idx + 1,
            line: line.to_string(),
        })?;
        table.insert(record);
    }

    debug!("Parsed stack usage for {} functions", table.len());

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_usage_line() {
        let record = parse_usage_line("msmpdbg.c:330:6:StartTransmit\t16\tstatic").unwrap();
        assert_eq!(record.name, "StartTransmit");
        assert_eq!(record.own_usage, Some(16));
        assert_eq!(record.kind, Some(FrameKind::Static));
        assert!(record.callees.is_empty());
        assert_eq!(record.total_usage, None);
    }

    #[test]
    fn test_parse_usage_line_bounded_kind() {
        let record = parse_usage_line("a.c:1:1:buf 32 dynamic,bounded").unwrap();
        assert_eq!(record.kind, Some(FrameKind::DynamicBounded));
        assert!(record.has_dynamic_frame());
    }

    #[test]
    fn test_parse_usage_line_rejects_missing_size() {
        assert!(parse_usage_line("a.c:1:1:foo static").is_none());
        assert!(parse_usage_line("foo 4 static").is_none());
        assert!(parse_usage_line("a.c:1:1:foo -4 static").is_none());
    }

    #[test]
    fn test_duplicate_name_keeps_larger_frame() {
        let table = parse_usage_lines(&["a.c:1:1:init 8 static", "b.c:9:1:init 24 static"]).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("init").unwrap().own_usage, Some(24));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table = parse_usage_lines(&["a.c:1:1:foo 4 static", "", "   "]).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_add_call_dedups() {
        let mut table = UsageTable::new();
        assert!(table.add_call("foo", "bar"));
        assert!(!table.add_call("foo", "bar"));
        assert_eq!(table.edge_count(), 1);
        assert_eq!(table.get("bar").unwrap().own_usage, None);
    }

    #[test]
    fn test_unknown_effective_usage_is_zero() {
        assert_eq!(FunctionRecord::unknown("baz").effective_usage(), 0);
    }
}
