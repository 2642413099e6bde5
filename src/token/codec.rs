use super::markup::{self, RENDERED_PATTERN};
use super::{MARKER_PATTERN, Reference};
use crate::error::ReferenceError;
use crate::flow::{FlowDefinition, FlowNode};
use crate::validator::ReferenceValidator;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Which error `decode` reports when a text holds several broken references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Report the last broken reference in the text.
    #[default]
    LastWins,
    /// Report the first broken reference in the text.
    FirstWins,
}

/// Presentation and error-reporting settings for `TemplateCodec`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub error_policy: ErrorPolicy,
    /// CSS class of a badge for a resolvable reference.
    pub reference_class: String,
    /// CSS class of a badge for a broken reference.
    pub error_class: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::default(),
            reference_class: "badge".to_string(),
            error_class: "badge-error".to_string(),
        }
    }
}

/// The renderable form of a stored text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    /// The reported error, chosen by the codec's `ErrorPolicy`.
    pub error: Option<ReferenceError>,
    /// Number of references that failed validation.
    pub broken: usize,
}

impl Decoded {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// The reported error's message, or an empty string.
    pub fn error_message(&self) -> String {
        self.error.as_ref().map(|e| e.to_string()).unwrap_or_default()
    }
}

/// Converts parameter text between its stored form and the editor's markup.
///
/// A codec borrows the flow it validates against and can be reused for every node
/// of that flow.
pub struct TemplateCodec<'a> {
    validator: ReferenceValidator<'a>,
    config: CodecConfig,
}

pub struct CodecBuilder<'a> {
    flow: &'a FlowDefinition,
    config: CodecConfig,
}

impl<'a> CodecBuilder<'a> {
    pub fn new(flow: &'a FlowDefinition) -> Self {
        Self {
            flow,
            config: CodecConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.config.error_policy = policy;
        self
    }

    pub fn with_classes(mut self, reference_class: &str, error_class: &str) -> Self {
        self.config.reference_class = reference_class.to_string();
        self.config.error_class = error_class.to_string();
        self
    }

    pub fn build(self) -> TemplateCodec<'a> {
        TemplateCodec {
            validator: ReferenceValidator::new(&self.flow.nodes),
            config: self.config,
        }
    }
}

impl<'a> TemplateCodec<'a> {
    pub fn new(flow: &'a FlowDefinition) -> Self {
        CodecBuilder::new(flow).build()
    }

    pub fn builder(flow: &'a FlowDefinition) -> CodecBuilder<'a> {
        CodecBuilder::new(flow)
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Converts editor markup into stored text.
    ///
    /// Each badge whose text matches an entry of the node's label table becomes that
    /// entry's marker. Badges without a matching entry keep their text. Line breaks
    /// are stored as `\n`.
    pub fn encode(&self, renderable: &str, node: &FlowNode) -> String {
        let mut stored = String::with_capacity(renderable.len());
        let mut last = 0;

        for caps in RENDERED_PATTERN.captures_iter(renderable) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            stored.push_str(&markup::unescape(&renderable[last..whole.start()]));
            last = whole.end();

            match (caps.get(1), caps.get(2)) {
                (Some(class), Some(inner)) => {
                    let text = markup::unescape(inner.as_str());
                    let is_badge = class.as_str() == self.config.reference_class
                        || class.as_str() == self.config.error_class;
                    match node.labels.token_for_label(&text) {
                        Some(token) if is_badge => stored.push_str(&Reference::wrap(token)),
                        _ => {
                            trace!(node = %node.id, label = %text, "badge without a label entry kept as text");
                            stored.push_str(&text);
                        }
                    }
                }
                _ => stored.push('\n'),
            }
        }

        stored.push_str(&markup::unescape(&renderable[last..]));
        stored
    }

    /// Converts stored text into editor markup.
    ///
    /// Every marker is rendered, broken or not; with `validate` set, broken ones get
    /// the error class and are counted in the result.
    pub fn decode(&self, stored: &str, node: &FlowNode, validate: bool) -> Decoded {
        let mut text = String::with_capacity(stored.len());
        let mut error = None;
        let mut broken = 0;
        let mut last = 0;

        for caps in MARKER_PATTERN.captures_iter(stored) {
            let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let token = token.as_str();
            text.push_str(&markup::render_text(&stored[last..whole.start()]));
            last = whole.end();

            let label = node.labels.get(token).unwrap_or(token);
            let mut class = &self.config.reference_class;

            if validate {
                if let Err(e) = self.validator.validate(&node.id, token, Some(label)) {
                    trace!(node = %node.id, token, "broken reference");
                    broken += 1;
                    class = &self.config.error_class;
                    match self.config.error_policy {
                        ErrorPolicy::LastWins => error = Some(e),
                        ErrorPolicy::FirstWins => {
                            error.get_or_insert(e);
                        }
                    }
                }
            }

            text.push_str(&markup::badge(class, label));
        }

        text.push_str(&markup::render_text(&stored[last..]));

        if broken > 0 {
            debug!(node = %node.id, broken, "decoded text with broken references");
        }
        Decoded {
            text,
            error,
            broken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{LabelTable, Param, ParamGroup, ParamKind};
    use serde_json::json;

    fn flow() -> FlowDefinition {
        FlowDefinition {
            nodes: vec![
                FlowNode {
                    id: "start_1".to_string(),
                    name: "Start".to_string(),
                    node_type: "start".to_string(),
                    group_params: vec![ParamGroup {
                        name: None,
                        params: vec![Param {
                            key: "query".to_string(),
                            label: None,
                            kind: ParamKind::Var,
                            value: json!(""),
                            global: true,
                        }],
                    }],
                    labels: LabelTable::new(),
                },
                FlowNode {
                    id: "llm_1".to_string(),
                    name: "LLM".to_string(),
                    node_type: "llm".to_string(),
                    group_params: vec![],
                    labels: [("start_1.query", "Start/query"), ("gone_1.x", "Gone/x")]
                        .into_iter()
                        .collect(),
                },
            ],
            edges: vec![],
        }
    }

    #[test]
    fn test_decode_marks_broken_badge() {
        let flow = flow();
        let codec = TemplateCodec::new(&flow);
        let node = flow.node("llm_1").unwrap();

        let decoded = codec.decode("{{#gone_1.x#}}", node, true);
        assert_eq!(
            decoded.text,
            r#"<span class="badge-error" contenteditable="false">Gone/x</span>"#
        );
        assert_eq!(decoded.broken, 1);
        assert_eq!(decoded.error_message(), "LLM error: Gone/x does not exist");
    }

    #[test]
    fn test_decode_without_validation_never_errors() {
        let flow = flow();
        let codec = TemplateCodec::new(&flow);
        let node = flow.node("llm_1").unwrap();

        let decoded = codec.decode("{{#gone_1.x#}}", node, false);
        assert!(decoded.is_valid());
        assert!(decoded.text.contains(r#"class="badge""#));
    }

    #[test]
    fn test_encode_keeps_unknown_badge_text() {
        let flow = flow();
        let codec = TemplateCodec::new(&flow);
        let node = flow.node("llm_1").unwrap();

        let stored = codec.encode(
            r#"a<span class="badge" contenteditable="false">Unknown</span>b"#,
            node,
        );
        assert_eq!(stored, "aUnknownb");
    }

    #[test]
    fn test_encode_normalizes_line_breaks() {
        let flow = flow();
        let codec = TemplateCodec::new(&flow);
        let node = flow.node("llm_1").unwrap();

        assert_eq!(codec.encode("a<br/>b\r\nc<br />d\re", node), "a\nb\nc\nd\ne");
    }

    #[test]
    fn test_custom_classes() {
        let flow = flow();
        let codec = TemplateCodec::builder(&flow)
            .with_classes("ref", "ref-bad")
            .build();
        let node = flow.node("llm_1").unwrap();

        let decoded = codec.decode("{{#start_1.query#}}", node, true);
        assert!(decoded.text.contains(r#"class="ref""#));
        let stored = codec.encode(&decoded.text, node);
        assert_eq!(stored, "{{#start_1.query#}}");
    }
}
