use super::definition::{FlowDefinition, FlowEdge, FlowNode, LabelTable, Param, ParamGroup, ParamKind};
use crate::error::FlowConversionError;
use ahash::AHashSet;
use serde::Deserialize;

/// A trait for editor data models that can be converted into a `FlowDefinition`.
///
/// This is the extension point that keeps the engine independent of any one editor
/// format. Implement it on your own structs to feed them to the codec, validator and
/// variable catalog.
///
/// # Example
///
/// ```rust,no_run
/// use nagare::prelude::*;
/// use nagare::error::FlowConversionError;
///
/// struct MyNode { id: String, title: String }
/// struct MyCanvas { nodes: Vec<MyNode> }
///
/// impl IntoFlow for MyCanvas {
///     fn into_flow(self) -> Result<FlowDefinition, FlowConversionError> {
///         let nodes = self
///             .nodes
///             .into_iter()
///             .map(|n| FlowNode { id: n.id, name: n.title, ..Default::default() })
///             .collect();
///         Ok(FlowDefinition { nodes, edges: vec![] })
///     }
/// }
/// ```
pub trait IntoFlow {
    /// Consumes the object and converts it into a flow the engine can analyse.
    fn into_flow(self) -> Result<FlowDefinition, FlowConversionError>;
}

// --- Editor JSON (React Flow canvas export) ---

/// Complete canvas export as saved by the flow editor.
#[derive(Debug, Deserialize)]
pub struct RawFlow {
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

/// Canvas node wrapper with ID and data.
#[derive(Debug, Deserialize)]
pub struct RawNode {
    pub id: String,
    pub data: RawNodeData,
}

/// Node data carrying the template type, parameters and label table.
#[derive(Debug, Deserialize)]
pub struct RawNodeData {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub group_params: Vec<RawParamGroup>,
    #[serde(default, alias = "varZh")]
    pub var_zh: Option<LabelTable>,
}

#[derive(Debug, Deserialize)]
pub struct RawParamGroup {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub params: Vec<RawParam>,
}

#[derive(Debug, Deserialize)]
pub struct RawParam {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: ParamKind,
    #[serde(default)]
    pub value: serde_json::Value,
    /// The editor stores either a boolean or a non-empty marker string here.
    #[serde(default)]
    pub global: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct RawEdge {
    pub source: String,
    pub target: String,
    #[serde(default, alias = "sourceHandle")]
    pub source_handle: Option<String>,
    #[serde(default, alias = "targetHandle")]
    pub target_handle: Option<String>,
}

fn default_kind() -> ParamKind {
    ParamKind::Other(String::new())
}

fn is_exposed(global: &serde_json::Value) -> bool {
    match global {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => !s.is_empty(),
        _ => false,
    }
}

impl IntoFlow for RawFlow {
    fn into_flow(self) -> Result<FlowDefinition, FlowConversionError> {
        let mut seen = AHashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(FlowConversionError::DuplicateNodeId(node.id.clone()));
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !seen.contains(endpoint.as_str()) {
                    return Err(FlowConversionError::EdgeEndpointNotFound {
                        source_node_id: edge.source.clone(),
                        target_node_id: edge.target.clone(),
                        missing_node_id: endpoint.clone(),
                    });
                }
            }
        }

        let nodes = self
            .nodes
            .into_iter()
            .map(|raw_node| FlowNode {
                id: raw_node.id,
                name: raw_node.data.name,
                node_type: raw_node.data.node_type,
                group_params: raw_node
                    .data
                    .group_params
                    .into_iter()
                    .map(|group| ParamGroup {
                        name: group.name,
                        params: group
                            .params
                            .into_iter()
                            .map(|p| Param {
                                global: is_exposed(&p.global),
                                key: p.key,
                                label: p.label,
                                kind: p.kind,
                                value: p.value,
                            })
                            .collect(),
                    })
                    .collect(),
                labels: raw_node.data.var_zh.unwrap_or_default(),
            })
            .collect();

        let edges = self
            .edges
            .into_iter()
            .map(|raw_edge| FlowEdge {
                source: raw_edge.source,
                target: raw_edge.target,
                source_handle: raw_edge.source_handle,
                target_handle: raw_edge.target_handle,
            })
            .collect();

        Ok(FlowDefinition { nodes, edges })
    }
}

impl FlowDefinition {
    /// Parses an editor canvas export and converts it into a flow.
    pub fn from_json(json: &str) -> Result<Self, FlowConversionError> {
        let raw: RawFlow = serde_json::from_str(json)
            .map_err(|e| FlowConversionError::JsonParseError(e.to_string()))?;
        raw.into_flow()
    }
}
