//! Derive a resource's current state from its operation history.
//!
//! The most recent completed start/stop/promote, or the most recent completed
//! monitor, decides. A monitor that did not report "running" means the
//! resource is down even though no stop ran.

use crate::model::Operation;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Start,
    Stop,
    Promote,
    Unknown,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Start => "start",
            Status::Stop => "stop",
            Status::Promote => "promote",
            Status::Unknown => "unknown",
        }
    }

    /// Health-check view: running or promoted.
    pub fn is_healthy(self) -> bool {
        matches!(self, Status::Start | Status::Promote)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monitor rc-codes that mean the resource is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningCodes(BTreeSet<String>);

impl RunningCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(codes.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, rc_code: &str) -> bool {
        self.0.contains(rc_code)
    }
}

impl Default for RunningCodes {
    /// OCF: 0 = success, 8 = running as master.
    fn default() -> Self {
        Self::new(["0", "8"])
    }
}

const STATUS_OPERATIONS: &[&str] = &["start", "stop", "monitor", "promote"];

fn is_candidate(op: &Operation) -> bool {
    if op.op_status() != Some("0") {
        return false;
    }
    let Some(kind) = op.operation() else {
        return false;
    };
    if !STATUS_OPERATIONS.contains(&kind) {
        return false;
    }
    op.rc_code() == Some("0") || kind == "monitor"
}

/// The last qualifying operation in `ops` (already ordered by call-id).
pub fn winning_op(ops: &[Operation]) -> Option<&Operation> {
    ops.iter().rev().find(|op| is_candidate(op))
}

pub fn infer_status(ops: &[Operation], codes: &RunningCodes) -> Status {
    let Some(last) = winning_op(ops) else {
        return Status::Unknown;
    };

    match last.operation() {
        Some("promote") => Status::Promote,
        Some("start") => Status::Start,
        Some("stop") => Status::Stop,
        _ => match last.rc_code() {
            Some(rc) if codes.contains(rc) => Status::Start,
            _ => Status::Stop,
        },
    }
}

/// Meaning of an OCF resource-agent return code.
pub fn ocf_rc_description(rc_code: &str) -> &'static str {
    match rc_code {
        "0" => "Success",
        "1" => "Error: Generic",
        "2" => "Error: Arguments",
        "3" => "Error: Unimplemented",
        "4" => "Error: Permissions",
        "5" => "Error: Installation",
        "6" => "Error: Configuration",
        "7" => "Not Running",
        "8" => "Master Running",
        "9" => "Master Failed",
        _ => "Unknown",
    }
}
