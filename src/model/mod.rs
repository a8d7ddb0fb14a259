//! Decoded cluster model: nodes own resources, resources own their ordered
//! operation history and a cached status.

pub mod status;

pub use status::{RunningCodes, Status, infer_status, ocf_rc_description};

use serde::Serialize;
use std::collections::BTreeMap;

/// One `lrm_rsc_op` record, attributes kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Operation(pub BTreeMap<String, String>);

impl Operation {
    pub fn new(attributes: BTreeMap<String, String>) -> Self {
        Self(attributes)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    pub fn operation(&self) -> Option<&str> {
        self.get("operation")
    }

    pub fn op_status(&self) -> Option<&str> {
        self.get("op-status")
    }

    pub fn rc_code(&self) -> Option<&str> {
        self.get("rc-code")
    }

    /// Ordering key. Missing or non-integer `call-id` counts as 0.
    pub fn call_id(&self) -> i64 {
        self.get("call-id")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Recurrence interval in milliseconds; `None` when absent or unparseable.
    pub fn interval_ms(&self) -> Option<u64> {
        self.get("interval").and_then(|v| v.trim().parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// Also present in `attributes`; kept apart for lookups.
    #[serde(skip)]
    pub id: String,

    /// Verbatim `lrm_resource` attributes (class, provider, type, ...).
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,

    /// Ascending by call-id.
    pub ops: Vec<Operation>,

    pub status: Status,
}

impl Resource {
    /// Build a resource, ordering `ops` and computing its status once.
    pub fn new(
        id: String,
        attributes: BTreeMap<String, String>,
        mut ops: Vec<Operation>,
        codes: &RunningCodes,
    ) -> Self {
        // sort_by_key is stable: equal call-ids keep document order.
        ops.sort_by_key(Operation::call_id);
        let status = infer_status(&ops, codes);
        Self {
            id,
            attributes,
            ops,
            status,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// `class::provider::type`, with `?` for missing parts.
    pub fn agent(&self) -> String {
        format!(
            "{}::{}::{}",
            self.attr("class").unwrap_or("?"),
            self.attr("provider").unwrap_or("?"),
            self.attr("type").unwrap_or("?")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub resources: BTreeMap<String, Resource>,
}

/// Decoded nodes keyed by node id.
pub type NodeMap = BTreeMap<String, Node>;

#[cfg(test)]
pub(crate) fn op(pairs: &[(&str, &str)]) -> Operation {
    Operation::new(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}
