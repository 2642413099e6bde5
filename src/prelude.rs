//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the nagare
//! crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use nagare::prelude::*;
//!
//! # fn run_example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let json = std::fs::read_to_string("path/to/flow.json")?;
//! let flow = FlowDefinition::from_json(&json)?;
//!
//! let report = FlowValidator::new(&flow).validate();
//! for message in report.messages() {
//!     println!("{}", message);
//! }
//! # Ok(())
//! # }
//! ```

// Flow model
pub use crate::flow::{
    FlowDefinition, FlowEdge, FlowNode, IntoFlow, LabelTable, Param, ParamGroup, ParamKind,
};

// Tokens and the codec
pub use crate::token::{
    CodecBuilder, CodecConfig, Decoded, ErrorPolicy, Reference, TemplateCodec, extract_references,
    extract_tokens,
};

// Validation and the variable catalog
pub use crate::validator::{
    FlowValidator, ReferenceValidator, ValidationIssue, ValidationReport, Variable,
    VariableCatalog, exposed_variables, validate_reference,
};

// Branch analysis
pub use crate::branch::{
    BranchClassifier, BranchRecord, ClassifierBuilder, ClassifierConfig, PathMatching,
    classify_concurrent_branches,
};

// Naming and configuration
pub use crate::config::EngineConfig;
pub use crate::naming::auto_name;

// Error types
pub use crate::error::{ConfigError, FlowConversionError, ReferenceError, TokenError};
