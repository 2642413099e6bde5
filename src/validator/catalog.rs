use super::{namespaced, record_array, record_key};
use crate::flow::{FlowDefinition, FlowNode, ParamKind};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// A reference target offered by the "insert variable" picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    /// The node exposing the variable.
    pub node_id: String,
    /// Raw token, without marker delimiters.
    pub token: String,
    /// Human-readable label stored in the referencing node's label table.
    pub label: String,
}

/// Lists the variables a node exposes through its global parameters.
///
/// Tokens follow the validator's shape rules, so every entry validates for as long
/// as the node is unchanged.
pub fn exposed_variables(node: &FlowNode) -> Vec<Variable> {
    let mut variables = Vec::new();
    let mut push = |token: String, label: String| {
        variables.push(Variable {
            node_id: node.id.clone(),
            token,
            label,
        })
    };

    for param in node.params().filter(|p| p.global) {
        let base_label = format!(
            "{}/{}",
            node.display_name(),
            param.label.as_deref().unwrap_or(&param.key)
        );

        if param.kind == ParamKind::InputList {
            let items = param.value.as_array().map(Vec::as_slice).unwrap_or_default();
            for (i, item) in items.iter().enumerate() {
                if item.as_str().is_some_and(|s| !s.is_empty()) {
                    push(
                        format!("{}#{}", namespaced(&node.id, &param.key), i),
                        format!("{}[{}]", base_label, i),
                    );
                }
            }
        } else if let Some(records) = record_array(param) {
            for record in records {
                if let Some(key) = record_key(record) {
                    let label = record
                        .get("label")
                        .and_then(JsonValue::as_str)
                        .unwrap_or(key);
                    push(
                        namespaced(&node.id, key),
                        format!("{}/{}", node.display_name(), label),
                    );
                }
            }
        } else {
            push(namespaced(&node.id, &param.key), base_label);
        }
    }

    variables
}

/// Variable lookup across a flow.
pub struct VariableCatalog;

impl VariableCatalog {
    /// Variables a node may reference: those of every node upstream of it,
    /// nearest node first.
    pub fn available_to(flow: &FlowDefinition, node_id: &str) -> Vec<Variable> {
        flow.upstream_of(node_id)
            .into_iter()
            .flat_map(exposed_variables)
            .collect()
    }
}
