//! Walk the `lrm` sections of a CIB and build the node/resource/op index.
//!
//! Elements without an `id` are skipped silently at every level; a CIB in
//! transition must still produce a report.

use crate::cib::document::{Document, Element};
use crate::model::{Node, NodeMap, Operation, Resource, RunningCodes, status};
use crate::observe::Observer;
use std::collections::BTreeMap;

const LRM: &str = "lrm";
const LRM_RESOURCE: &str = "lrm_resource";
const LRM_RSC_OP: &str = "lrm_rsc_op";

/// Per-call settings for one decode pass.
pub struct DecodeContext<'a> {
    pub observer: &'a dyn Observer,
    pub running_codes: RunningCodes,
}

impl<'a> DecodeContext<'a> {
    pub fn new(observer: &'a dyn Observer) -> Self {
        Self {
            observer,
            running_codes: RunningCodes::default(),
        }
    }

    pub fn with_running_codes(mut self, codes: RunningCodes) -> Self {
        self.running_codes = codes;
        self
    }
}

/// Decode every `lrm` section. No sections gives an empty map.
pub fn decode(doc: &Document, ctx: &DecodeContext) -> NodeMap {
    let mut nodes = NodeMap::new();

    for lrm in doc.elements_named(LRM) {
        let Some(node_id) = lrm.attr("id") else {
            continue;
        };
        let node = decode_node(node_id, lrm, ctx);
        ctx.observer.debug(1, &format!("Node: {}", node_id));
        nodes.insert(node_id.to_string(), node);
    }

    nodes
}

fn decode_node(node_id: &str, lrm: &Element, ctx: &DecodeContext) -> Node {
    let mut resources = BTreeMap::new();

    for el in lrm.descendants_named(LRM_RESOURCE) {
        let Some(resource_id) = el.attr("id") else {
            continue;
        };
        let resource = decode_resource(resource_id, el, ctx);
        ctx.observer.debug(2, &format!("Resource: {}", resource_id));
        resources.insert(resource_id.to_string(), resource);
    }

    Node {
        id: node_id.to_string(),
        resources,
    }
}

fn decode_resource(resource_id: &str, el: &Element, ctx: &DecodeContext) -> Resource {
    let mut ops = Vec::new();
    for op_el in el.descendants_named(LRM_RSC_OP) {
        let Some(op_id) = op_el.attr("id") else {
            continue;
        };
        ctx.observer.debug(3, &format!("Op: {}", op_id));
        ops.push(Operation::new(op_el.attributes.clone()));
    }

    let resource = Resource::new(
        resource_id.to_string(),
        el.attributes.clone(),
        ops,
        &ctx.running_codes,
    );

    let winner = status::winning_op(&resource.ops)
        .and_then(Operation::id)
        .unwrap_or("-");
    ctx.observer.debug(
        3,
        &format!("Status: {} (decided by {})", resource.status, winner),
    );

    resource
}
