//! Lookups against a decoded node map. Statuses are read from the cache,
//! never recomputed here.

use crate::cib::CibError;
use crate::model::{NodeMap, Resource, Status};

pub fn resource_of<'a>(
    nodes: &'a NodeMap,
    node_id: &str,
    resource_id: &str,
) -> Result<&'a Resource, CibError> {
    let node = nodes.get(node_id).ok_or_else(|| CibError::NodeNotFound {
        node: node_id.to_string(),
    })?;
    node.resources
        .get(resource_id)
        .ok_or_else(|| CibError::ResourceNotFound {
            node: node_id.to_string(),
            resource: resource_id.to_string(),
        })
}

pub fn status_of(nodes: &NodeMap, node_id: &str, resource_id: &str) -> Result<Status, CibError> {
    resource_of(nodes, node_id, resource_id).map(|r| r.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, RunningCodes, op};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn nodes() -> NodeMap {
        let started = Resource::new(
            "p_haproxy".into(),
            BTreeMap::new(),
            vec![op(&[("operation", "start"), ("op-status", "0"), ("rc-code", "0")])],
            &RunningCodes::default(),
        );
        let mut resources = BTreeMap::new();
        resources.insert(started.id.clone(), started);

        let mut nodes = NodeMap::new();
        nodes.insert(
            "node-1".into(),
            Node {
                id: "node-1".into(),
                resources,
            },
        );
        nodes
    }

    #[test]
    fn returns_cached_status() {
        let mut nodes = nodes();
        assert_eq!(status_of(&nodes, "node-1", "p_haproxy").unwrap(), Status::Start);

        // Overwriting the cache shows no recomputation happens at query time.
        if let Some(node) = nodes.get_mut("node-1") {
            if let Some(res) = node.resources.get_mut("p_haproxy") {
                res.status = Status::Promote;
            }
        }
        assert_eq!(status_of(&nodes, "node-1", "p_haproxy").unwrap(), Status::Promote);
    }

    #[test]
    fn unknown_node() {
        let err = status_of(&nodes(), "node-9", "p_haproxy").unwrap_err();
        assert!(matches!(err, CibError::NodeNotFound { ref node } if node == "node-9"));
        assert!(err.is_not_found());
    }

    #[test]
    fn unknown_resource() {
        let err = status_of(&nodes(), "node-1", "p_vip").unwrap_err();
        assert!(matches!(err, CibError::ResourceNotFound { ref resource, .. } if resource == "p_vip"));
        assert_eq!(
            err.to_string(),
            "resource \"p_vip\" was not found on node \"node-1\""
        );
    }

    #[test]
    fn resource_of_returns_details() {
        let nodes = nodes();
        let res = resource_of(&nodes, "node-1", "p_haproxy").unwrap();
        assert_eq!(res.ops.len(), 1);
    }
}
