use super::ReferenceValidator;
use crate::error::ReferenceError;
use crate::flow::{FlowDefinition, FlowNode};
use crate::token::extract_tokens;
use serde_json::Value as JsonValue;
use tracing::debug;

/// A broken reference found while scanning a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The node whose parameter holds the reference.
    pub node_id: String,
    pub param_key: String,
    pub token: String,
    pub error: ReferenceError,
}

/// The outcome of validating every reference in a flow.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    /// Total number of references inspected.
    pub checked: usize,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.error.to_string()).collect()
    }

    pub fn for_node<'r>(&'r self, node_id: &'r str) -> impl Iterator<Item = &'r ValidationIssue> {
        self.issues.iter().filter(move |i| i.node_id == node_id)
    }
}

/// Scans every parameter of every node for reference markers and validates them.
pub struct FlowValidator<'a> {
    flow: &'a FlowDefinition,
    validator: ReferenceValidator<'a>,
}

impl<'a> FlowValidator<'a> {
    pub fn new(flow: &'a FlowDefinition) -> Self {
        Self {
            flow,
            validator: ReferenceValidator::new(&flow.nodes),
        }
    }

    /// Validates the whole flow. Never stops at the first issue.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        for node in &self.flow.nodes {
            self.check_node(node, &mut report);
        }
        debug!(
            checked = report.checked,
            issues = report.issues.len(),
            "flow validation finished"
        );
        report
    }

    /// Validates the references held by a single node.
    pub fn validate_node(&self, node: &FlowNode) -> ValidationReport {
        let mut report = ValidationReport::default();
        self.check_node(node, &mut report);
        report
    }

    fn check_node(&self, node: &FlowNode, report: &mut ValidationReport) {
        for param in node.params() {
            let mut texts = Vec::new();
            collect_strings(&param.value, &mut texts);

            for token in texts.into_iter().flat_map(extract_tokens) {
                report.checked += 1;
                let label = node.labels.get(token);
                if let Err(error) = self.validator.validate(&node.id, token, label) {
                    report.issues.push(ValidationIssue {
                        node_id: node.id.clone(),
                        param_key: param.key.clone(),
                        token: token.to_string(),
                        error,
                    });
                }
            }
        }
    }
}

/// Collects every string inside a parameter value, depth first.
fn collect_strings<'v>(value: &'v JsonValue, out: &mut Vec<&'v str>) {
    match value {
        JsonValue::String(s) => out.push(s),
        JsonValue::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        JsonValue::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}
