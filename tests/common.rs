//! Common test utilities for building flows and branch records.
use nagare::prelude::*;
use serde_json::json;

/// Builds a parameter in a single place so tests only state what they care about.
#[allow(dead_code)]
pub fn param(key: &str, kind: &str, value: serde_json::Value, global: bool) -> Param {
    Param {
        key: key.to_string(),
        label: None,
        kind: ParamKind::from(kind),
        value,
        global,
    }
}

/// Builds a node with one parameter group.
#[allow(dead_code)]
pub fn node(id: &str, name: &str, params: Vec<Param>) -> FlowNode {
    FlowNode {
        id: id.to_string(),
        name: name.to_string(),
        node_type: id.split('_').next().unwrap_or_default().to_string(),
        group_params: vec![ParamGroup { name: None, params }],
        labels: LabelTable::new(),
    }
}

/// Creates a three-node flow: `start_1 -> llm_1 -> code_1`.
///
/// - `start_1` exposes `query`, the list `preset_question` and the form field `city`.
/// - `llm_1` exposes `output` and references `start_1.query` in its prompt.
/// - `code_1` declares the code output `result` and references `llm_1.output`.
#[allow(dead_code)]
pub fn create_sample_flow() -> FlowDefinition {
    let start = node(
        "start_1",
        "Start",
        vec![
            param("query", "var", json!(""), true),
            param("preset_question", "input_list", json!(["a", "b"]), true),
            param(
                "user_form",
                "form",
                json!([{"key": "city", "label": "City", "type": "text"}]),
                true,
            ),
        ],
    );

    let mut llm = node(
        "llm_1",
        "LLM",
        vec![
            param("system_prompt", "var_textarea", json!("Answer {{#start_1.query#}}"), false),
            param("output", "var", json!("x"), true),
        ],
    );
    llm.labels.insert("start_1.query", "Start/query");

    let mut code = node(
        "code_1",
        "Code",
        vec![
            param(
                "code_input",
                "var",
                json!([{"key": "arg", "value": "{{#llm_1.output#}}"}]),
                false,
            ),
            param("code_output", "code_output", json!([{"key": "result"}]), true),
        ],
    );
    code.labels.insert("start_1.query", "Start/query");
    code.labels.insert("llm_1.output", "LLM/output");

    FlowDefinition {
        nodes: vec![start, llm, code],
        edges: vec![
            edge("start_1", "llm_1"),
            edge("llm_1", "code_1"),
        ],
    }
}

#[allow(dead_code)]
pub fn edge(source: &str, target: &str) -> FlowEdge {
    FlowEdge {
        source: source.to_string(),
        target: target.to_string(),
        source_handle: None,
        target_handle: None,
    }
}

/// Shorthand for a list of branch records.
#[allow(dead_code)]
pub fn records(entries: &[(&str, &str)]) -> Vec<BranchRecord> {
    entries
        .iter()
        .map(|(branch, node_id)| BranchRecord::new(*branch, *node_id))
        .collect()
}

/// The renderable badge the codec emits for a resolvable reference.
#[allow(dead_code)]
pub fn badge(label: &str) -> String {
    format!(r#"<span class="badge" contenteditable="false">{}</span>"#, label)
}

/// An editor canvas export with a broken reference in `llm_1`'s prompt.
#[allow(dead_code)]
pub const SAMPLE_FLOW_JSON: &str = r#"{
  "nodes": [
    {
      "id": "start_1",
      "type": "flowNode",
      "position": { "x": 0, "y": 0 },
      "data": {
        "id": "start_1",
        "name": "Start",
        "type": "start",
        "group_params": [
          {
            "name": "Global variables",
            "params": [
              { "key": "query", "label": "User question", "type": "var", "value": "", "global": "key" },
              { "key": "preset_question", "type": "input_list", "value": ["hello", ""], "global": "index" }
            ]
          }
        ]
      }
    },
    {
      "id": "llm_1",
      "type": "flowNode",
      "data": {
        "id": "llm_1",
        "name": "LLM",
        "type": "llm",
        "group_params": [
          {
            "params": [
              {
                "key": "user_prompt",
                "type": "var_textarea",
                "value": "Q: {{#start_1.query#}}\nHint: {{#start_1.preset_question#0#}} {{#deleted_9.text#}}"
              },
              { "key": "output", "type": "var", "value": "", "global": true }
            ]
          }
        ],
        "varZh": {
          "start_1.query": "Start/User question",
          "start_1.preset_question#0": "Start/preset_question[0]",
          "deleted_9.text": "Old/text"
        }
      }
    },
    {
      "id": "end_1",
      "data": { "id": "end_1", "name": "End", "type": "end" }
    }
  ],
  "edges": [
    { "source": "start_1", "sourceHandle": "right_handle", "target": "llm_1", "targetHandle": "left_handle" },
    { "source": "llm_1", "target": "end_1" }
  ]
}"#;
