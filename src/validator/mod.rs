use crate::error::ReferenceError;
use crate::flow::{FlowNode, Param, ParamKind};
use crate::token::{producer_of, split_index};
use ahash::AHashMap;
use serde_json::Value as JsonValue;
use tracing::trace;

pub mod catalog;
mod report;

pub use catalog::{Variable, VariableCatalog, exposed_variables};
pub use report::{FlowValidator, ValidationIssue, ValidationReport};

/// Resolves reference tokens against a snapshot of a flow's nodes.
///
/// Lookup is by node id through an index built once at construction, so a single
/// validator can check every token of a flow cheaply.
pub struct ReferenceValidator<'a> {
    nodes: &'a [FlowNode],
    index: AHashMap<&'a str, usize>,
}

impl<'a> ReferenceValidator<'a> {
    pub fn new(nodes: &'a [FlowNode]) -> Self {
        let mut index = AHashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            // First node wins for duplicate ids, matching a linear search.
            index.entry(node.id.as_str()).or_insert(i);
        }
        Self { nodes, index }
    }

    pub fn node(&self, id: &str) -> Option<&'a FlowNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Checks that `token` still resolves.
    ///
    /// `origin_id` is the node whose text holds the token and only shapes the error
    /// message, as does `label` (the raw token is shown when it is `None`).
    pub fn validate(
        &self,
        origin_id: &str,
        token: &str,
        label: Option<&str>,
    ) -> Result<(), ReferenceError> {
        let producer_id = producer_of(token);
        let error_fields = || {
            let origin = self
                .node(origin_id)
                .map_or(origin_id, |n| n.display_name())
                .to_string();
            (origin, label.unwrap_or(token).to_string(), producer_id.to_string())
        };

        let Some(producer) = self.node(producer_id) else {
            trace!(token, "producer node not found");
            let (origin, label, producer) = error_fields();
            return Err(ReferenceError::NodeNotFound {
                origin,
                label,
                producer,
            });
        };

        if producer.params().any(|param| param_resolves(producer_id, param, token)) {
            return Ok(());
        }

        trace!(token, producer = producer_id, "no parameter matches the reference");
        let (origin, label, producer) = error_fields();
        Err(ReferenceError::FieldNotFound {
            origin,
            label,
            producer,
        })
    }
}

/// Checks a token against one parameter of its producer node.
fn param_resolves(producer_id: &str, param: &Param, token: &str) -> bool {
    let (base, index) = split_index(token);

    if let (ParamKind::InputList, Some(index)) = (&param.kind, index) {
        return namespaced(producer_id, &param.key) == base
            && param
                .value
                .as_array()
                .and_then(|items| items.get(index))
                .and_then(JsonValue::as_str)
                .is_some_and(|item| !item.is_empty());
    }

    if let Some(records) = record_array(param) {
        return records
            .iter()
            .filter_map(record_key)
            .any(|key| namespaced(producer_id, key) == token);
    }

    namespaced(producer_id, &param.key) == token
}

/// The record array of a form-like parameter, if it has one.
///
/// Forms and code outputs are always record arrays; a plain variable becomes one once
/// it holds at least one entry.
pub(crate) fn record_array(param: &Param) -> Option<&Vec<JsonValue>> {
    let items = param.value.as_array();
    match param.kind {
        ParamKind::Form | ParamKind::CodeOutput => Some(items.map_or(&EMPTY, |v| v)),
        ParamKind::Var => items.filter(|v| !v.is_empty()),
        _ => None,
    }
}

static EMPTY: Vec<JsonValue> = Vec::new();

pub(crate) fn record_key(record: &JsonValue) -> Option<&str> {
    record.get("key").and_then(JsonValue::as_str)
}

pub(crate) fn namespaced(producer_id: &str, key: &str) -> String {
    format!("{}.{}", producer_id, key)
}

/// Checks a single reference against `nodes`.
///
/// Convenience wrapper over `ReferenceValidator` for one-off checks.
pub fn validate_reference(
    origin_id: &str,
    nodes: &[FlowNode],
    token: &str,
    label: Option<&str>,
) -> Result<(), ReferenceError> {
    ReferenceValidator::new(nodes).validate(origin_id, token, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::ParamGroup;
    use serde_json::json;

    fn node(id: &str, params: Vec<Param>) -> FlowNode {
        FlowNode {
            id: id.to_string(),
            name: id.to_uppercase(),
            group_params: vec![ParamGroup { name: None, params }],
            ..Default::default()
        }
    }

    fn param(key: &str, kind: ParamKind, value: JsonValue) -> Param {
        Param {
            key: key.to_string(),
            label: None,
            kind,
            value,
            global: true,
        }
    }

    #[test]
    fn test_scalar_with_index_does_not_match() {
        let nodes = vec![node("a", vec![param("out", ParamKind::Var, json!("x"))])];
        assert!(validate_reference("a", &nodes, "a.out", None).is_ok());
        assert!(validate_reference("a", &nodes, "a.out#0", None).is_err());
    }

    #[test]
    fn test_input_list_key_must_match() {
        let nodes = vec![node(
            "s",
            vec![param("questions", ParamKind::InputList, json!(["q0", ""]))],
        )];
        assert!(validate_reference("s", &nodes, "s.questions#0", None).is_ok());
        assert!(validate_reference("s", &nodes, "s.questions#1", None).is_err());
        assert!(validate_reference("s", &nodes, "s.other#0", None).is_err());
    }

    #[test]
    fn test_empty_var_array_falls_back_to_key() {
        let nodes = vec![node("v", vec![param("vars", ParamKind::Var, json!([]))])];
        assert!(validate_reference("v", &nodes, "v.vars", None).is_ok());
    }

    #[test]
    fn test_var_array_matches_entry_keys_only() {
        let nodes = vec![node(
            "v",
            vec![param("vars", ParamKind::Var, json!([{"key": "city"}]))],
        )];
        assert!(validate_reference("v", &nodes, "v.city", None).is_ok());
        assert!(validate_reference("v", &nodes, "v.vars", None).is_err());
    }

    #[test]
    fn test_missing_origin_uses_id_in_message() {
        let nodes = vec![];
        let err = validate_reference("ghost", &nodes, "x.y", Some("X/y")).unwrap_err();
        assert_eq!(err.to_string(), "ghost error: X/y does not exist");
        assert_eq!(err.producer(), "x");
    }

    #[test]
    fn test_duplicate_ids_resolve_to_first() {
        let nodes = vec![
            node("d", vec![param("first", ParamKind::Var, json!(""))]),
            node("d", vec![param("second", ParamKind::Var, json!(""))]),
        ];
        let validator = ReferenceValidator::new(&nodes);
        assert!(validator.validate("d", "d.first", None).is_ok());
        assert!(validator.validate("d", "d.second", None).is_err());
    }
}
