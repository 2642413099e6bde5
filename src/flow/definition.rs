use crate::naming;
use crate::token::Reference;
use crate::validator::{ReferenceValidator, Variable};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// The complete, canonical definition of an editor flow.
/// This is the target structure for any editor format conversion.
#[derive(Debug, Clone, Default)]
pub struct FlowDefinition {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// A single node on the editor canvas.
#[derive(Debug, Clone, Default)]
pub struct FlowNode {
    pub id: String,
    /// Display name, unique within a flow when created through `unique_node_name`.
    pub name: String,
    /// Template type the node was created from (e.g. `llm`, `start`, `code`).
    pub node_type: String,
    pub group_params: Vec<ParamGroup>,
    /// Display labels for the references this node's text parameters contain.
    pub labels: LabelTable,
}

/// A named group of parameters, as laid out in the node's settings panel.
#[derive(Debug, Clone, Default)]
pub struct ParamGroup {
    pub name: Option<String>,
    pub params: Vec<Param>,
}

/// A single node parameter. The shape of `value` depends on `kind`.
#[derive(Debug, Clone)]
pub struct Param {
    pub key: String,
    pub label: Option<String>,
    pub kind: ParamKind,
    pub value: serde_json::Value,
    /// Whether downstream nodes may reference this parameter.
    pub global: bool,
}

/// The type tag of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamKind {
    /// A plain variable. Becomes a record array when its value is a non-empty array.
    Var,
    /// A list of strings addressable by index (`key#n`).
    InputList,
    /// Form fields; an array of records carrying a `key`.
    Form,
    /// Declared code outputs; an array of records carrying a `key`.
    CodeOutput,
    /// Free text that may embed reference markers.
    VarTextarea,
    Other(String),
}

impl ParamKind {
    pub fn as_str(&self) -> &str {
        match self {
            ParamKind::Var => "var",
            ParamKind::InputList => "input_list",
            ParamKind::Form => "form",
            ParamKind::CodeOutput => "code_output",
            ParamKind::VarTextarea => "var_textarea",
            ParamKind::Other(tag) => tag,
        }
    }
}

impl From<String> for ParamKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "var" => ParamKind::Var,
            "input_list" => ParamKind::InputList,
            "form" => ParamKind::Form,
            "code_output" => ParamKind::CodeOutput,
            "var_textarea" => ParamKind::VarTextarea,
            _ => ParamKind::Other(tag),
        }
    }
}

impl From<&str> for ParamKind {
    fn from(tag: &str) -> Self {
        ParamKind::from(tag.to_string())
    }
}

impl From<ParamKind> for String {
    fn from(kind: ParamKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connection between two nodes on the canvas.
#[derive(Debug, Clone)]
pub struct FlowEdge {
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

/// Per-node side table mapping a raw token to its human-readable label.
///
/// Entries are advisory. They are never consulted during validation and may
/// outlive the node they point at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable {
    entries: AHashMap<String, String>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn insert(&mut self, token: impl Into<String>, label: impl Into<String>) -> Option<String> {
        self.entries.insert(token.into(), label.into())
    }

    pub fn remove(&mut self, token: &str) -> Option<String> {
        self.entries.remove(token)
    }

    /// Finds the token displayed as `label`.
    ///
    /// Several tokens may share one label; the lexicographically smallest wins so the
    /// answer does not depend on map iteration order.
    pub fn token_for_label(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .filter(|(_, l)| l.as_str() == label)
            .map(|(token, _)| token.as_str())
            .min()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl FlowNode {
    /// Display name, falling back to the id for unnamed nodes.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.group_params.iter().flat_map(|group| group.params.iter())
    }

    pub fn param(&self, key: &str) -> Option<&Param> {
        self.params().find(|p| p.key == key)
    }

    pub fn param_mut(&mut self, key: &str) -> Option<&mut Param> {
        self.group_params
            .iter_mut()
            .flat_map(|group| group.params.iter_mut())
            .find(|p| p.key == key)
    }

    /// Records the label of `variable` and returns the marker to splice into text.
    pub fn insert_reference(&mut self, variable: &Variable) -> String {
        self.labels
            .insert(variable.token.clone(), variable.label.clone());
        Reference::wrap(&variable.token)
    }
}

impl FlowDefinition {
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut FlowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Nodes with a path to `node_id`, nearest first. The node itself is excluded.
    pub fn upstream_of(&self, node_id: &str) -> Vec<&FlowNode> {
        let mut incoming: AHashMap<&str, Vec<&str>> = AHashMap::new();
        for edge in &self.edges {
            incoming
                .entry(edge.target.as_str())
                .or_default()
                .push(edge.source.as_str());
        }

        let mut visited: AHashSet<&str> = AHashSet::new();
        visited.insert(node_id);
        let mut queue = VecDeque::from([node_id]);
        let mut order = Vec::new();

        while let Some(current) = queue.pop_front() {
            for &source in incoming.get(current).into_iter().flatten() {
                if visited.insert(source) {
                    order.push(source);
                    queue.push_back(source);
                }
            }
        }

        order.into_iter().filter_map(|id| self.node(id)).collect()
    }

    /// A display name for a new node that no existing node already uses.
    pub fn unique_node_name(&self, proposed: &str) -> String {
        naming::auto_name(self.nodes.iter().map(|n| n.name.as_str()), proposed)
    }

    /// Removes every label entry whose token no longer resolves.
    ///
    /// Returns the number of entries removed.
    pub fn prune_stale_labels(&mut self) -> usize {
        let stale: Vec<(usize, String)> = {
            let validator = ReferenceValidator::new(&self.nodes);
            self.nodes
                .iter()
                .enumerate()
                .flat_map(|(index, node)| {
                    let validator = &validator;
                    node.labels
                        .tokens()
                        .filter(move |token| {
                            validator.validate(&node.id, token, None).is_err()
                        })
                        .map(move |token| (index, token.to_string()))
                })
                .collect()
        };

        for (index, token) in &stale {
            self.nodes[*index].labels.remove(token);
        }
        debug!(removed = stale.len(), "pruned stale reference labels");
        stale.len()
    }
}
