use thiserror::Error;

/// A reference that no longer resolves against the current node graph.
///
/// Every variant renders the same user-facing message; the variant only tells the
/// caller which step of the lookup failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("{origin} error: {label} does not exist")]
    NodeNotFound {
        origin: String,
        label: String,
        producer: String,
    },

    #[error("{origin} error: {label} does not exist")]
    FieldNotFound {
        origin: String,
        label: String,
        producer: String,
    },
}

impl ReferenceError {
    /// The display label the failed reference was shown with.
    pub fn label(&self) -> &str {
        match self {
            ReferenceError::NodeNotFound { label, .. }
            | ReferenceError::FieldNotFound { label, .. } => label,
        }
    }

    /// The node id the reference points at.
    pub fn producer(&self) -> &str {
        match self {
            ReferenceError::NodeNotFound { producer, .. }
            | ReferenceError::FieldNotFound { producer, .. } => producer,
        }
    }
}

/// Errors raised by the strict token parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is empty")]
    Empty,

    #[error("Token '{0}' has no producer node id before the first '.'")]
    MissingProducer(String),

    #[error("Token '{0}' has no field after the producer node id")]
    MissingField(String),

    #[error("Token '{0}' contains a nested marker delimiter")]
    NestedDelimiter(String),
}

/// Errors that can occur when converting an editor format into a `FlowDefinition`.
#[derive(Error, Debug, Clone)]
pub enum FlowConversionError {
    #[error("Failed to parse flow JSON: {0}")]
    JsonParseError(String),

    #[error("Node id '{0}' is used by more than one node")]
    DuplicateNodeId(String),

    #[error("Edge '{source_node_id}' -> '{target_node_id}' references node '{missing_node_id}', which is not in the flow")]
    EdgeEndpointNotFound {
        source_node_id: String,
        target_node_id: String,
        missing_node_id: String,
    },

    /// For custom `IntoFlow` sources that reject their own input.
    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}

/// Errors raised while loading an `EngineConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
