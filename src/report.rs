//! Shaping decoded data for the `dump` and `rc-codes` commands.

use crate::model::{NodeMap, ocf_rc_description};
use regex::Regex;

/// Keep nodes whose id matches `node_re` and, inside them, resources whose id
/// matches `resource_re`. A missing pattern matches everything. Nodes left
/// without resources by the resource filter are dropped.
pub fn filter_nodes(
    nodes: &NodeMap,
    node_re: Option<&Regex>,
    resource_re: Option<&Regex>,
) -> NodeMap {
    nodes
        .iter()
        .filter(|(id, _)| node_re.is_none_or(|re| re.is_match(id)))
        .filter_map(|(id, node)| {
            let mut node = node.clone();
            if let Some(re) = resource_re {
                node.resources.retain(|rid, _| re.is_match(rid));
                if node.resources.is_empty() {
                    return None;
                }
            }
            Some((id.clone(), node))
        })
        .collect()
}

/// `(code, meaning)` rows for the OCF return codes 0 to 9.
pub fn rc_table() -> Vec<(String, &'static str)> {
    (0..=9)
        .map(|code| {
            let code = code.to_string();
            let meaning = ocf_rc_description(&code);
            (code, meaning)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cib::{DecodeContext, Document, decode};
    use crate::observe::NullObserver;
    use pretty_assertions::assert_eq;

    fn sample() -> NodeMap {
        let doc = Document::parse(
            r#"<cib><status>
                <lrm id="node-1"><lrm_resource id="p_vip"/><lrm_resource id="p_haproxy"/></lrm>
                <lrm id="node-2"><lrm_resource id="p_haproxy"/></lrm>
                <lrm id="ctl-1"><lrm_resource id="p_mysql"/></lrm>
            </status></cib>"#,
        )
        .unwrap();
        decode(&doc, &DecodeContext::new(&NullObserver))
    }

    #[test]
    fn no_filters_keep_everything() {
        let nodes = sample();
        assert_eq!(filter_nodes(&nodes, None, None), nodes);
    }

    #[test]
    fn filters_by_node_pattern() {
        let re = Regex::new("^node-").unwrap();
        let out = filter_nodes(&sample(), Some(&re), None);
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["node-1", "node-2"]);
    }

    #[test]
    fn resource_filter_drops_empty_nodes() {
        let re = Regex::new("haproxy").unwrap();
        let out = filter_nodes(&sample(), None, Some(&re));
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["node-1", "node-2"]);
        assert_eq!(
            out["node-1"].resources.keys().collect::<Vec<_>>(),
            vec!["p_haproxy"]
        );
    }

    #[test]
    fn rc_table_covers_ocf_codes() {
        let table = rc_table();
        assert_eq!(table.len(), 10);
        assert_eq!(table[7], ("7".to_string(), "Not Running"));
    }
}
