//! # Nagare - Flow Editor Reference Engine
//!
//! **Nagare** is the analysis core behind a visual workflow editor. Nodes on the
//! canvas expose parameters, and the free-text parameters of other nodes refer to
//! them through inline tokens of the form `{{#<producer-id>.<field>[#<index>]#}}`.
//! Nagare keeps those references honest and answers the scheduling questions the
//! editor asks about branching flows.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Flow**: Parse the editor's canvas export with
//!     `FlowDefinition::from_json`, or implement `IntoFlow` for your own format.
//! 2.  **Render and Store Text**: Use a `TemplateCodec` to turn stored parameter text
//!     into badge markup for the editor (`decode`) and back (`encode`).
//! 3.  **Validate**: Check a single token with `validate_reference`, or a whole flow
//!     with `FlowValidator`.
//! 4.  **Analyse Branches**: Ask a `BranchClassifier` which fan-out nodes may run
//!     concurrently, and name new nodes with `auto_name`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nagare::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let json = std::fs::read_to_string("path/to/flow.json")?;
//!     let mut flow = FlowDefinition::from_json(&json)?;
//!
//!     // Offer the LLM node the variables of everything upstream of it.
//!     let variables = VariableCatalog::available_to(&flow, "llm_1");
//!     if let (Some(variable), Some(node)) = (variables.first(), flow.node_mut("llm_1")) {
//!         let marker = node.insert_reference(variable);
//!         println!("Insert {} into the prompt", marker);
//!     }
//!
//!     // Render a stored prompt for the editor, flagging broken references.
//!     let codec = TemplateCodec::new(&flow);
//!     if let Some(node) = flow.node("llm_1") {
//!         let decoded = codec.decode("Answer {{#start_1.query#}}", node, true);
//!         println!("{}", decoded.text);
//!         if let Some(error) = decoded.error {
//!             println!("-> {}", error);
//!         }
//!     }
//!
//!     // Which branch targets may run side by side?
//!     let fan_out = vec![BranchRecord::new("0_0", "A"), BranchRecord::new("0_1", "B")];
//!     let concurrent = classify_concurrent_branches(&fan_out, &[]);
//!     println!("Concurrent: {:?}", concurrent);
//!
//!     println!("New node name: {}", flow.unique_node_name("Code"));
//!     Ok(())
//! }
//! ```

pub mod branch;
pub mod config;
pub mod error;
pub mod flow;
pub mod naming;
pub mod prelude;
pub mod token;
pub mod validator;
