//! Inline references between node parameters.
//!
//! A reference is stored inside free text as `{{#<producer-id>.<field>[#<index>]#}}`.
//! The producer id runs up to the first `.`; a trailing `#<digits>` addresses one
//! element of a list-valued parameter. Markers do not nest.

use crate::error::TokenError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Statically compiled patterns; a failure here is a bug in this crate.
macro_rules! static_regex {
    ($pattern:expr, $name:expr) => {
        Regex::new($pattern)
            .unwrap_or_else(|_| panic!("Static regex '{}' failed to compile", $name))
    };
}

pub mod codec;
mod markup;

pub use codec::{CodecBuilder, CodecConfig, Decoded, ErrorPolicy, TemplateCodec};

/// Matches a stored marker and captures the raw token inside it.
pub(crate) static MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| static_regex!(r"\{\{#([^{}]+?)#\}\}", "MARKER_PATTERN"));

pub const MARKER_OPEN: &str = "{{#";
pub const MARKER_CLOSE: &str = "#}}";

/// A parsed reference token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Id of the node that produces the value.
    pub producer: String,
    /// Field path after the producer id. May itself contain dots.
    pub field: String,
    /// Element index for list-valued parameters.
    pub index: Option<usize>,
}

impl Reference {
    /// Parses a raw token (without the marker delimiters).
    pub fn parse(token: &str) -> Result<Self, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        if token.contains(['{', '}']) {
            return Err(TokenError::NestedDelimiter(token.to_string()));
        }

        let (base, index) = split_index(token);
        let (producer, field) = match base.split_once('.') {
            Some((producer, field)) => (producer, field),
            None if base.is_empty() => return Err(TokenError::MissingProducer(token.to_string())),
            None => return Err(TokenError::MissingField(token.to_string())),
        };
        if producer.is_empty() {
            return Err(TokenError::MissingProducer(token.to_string()));
        }
        if field.is_empty() {
            return Err(TokenError::MissingField(token.to_string()));
        }

        Ok(Self {
            producer: producer.to_string(),
            field: field.to_string(),
            index,
        })
    }

    /// `producer.field`, without any index suffix.
    pub fn path(&self) -> String {
        format!("{}.{}", self.producer, self.field)
    }

    /// The token wrapped in marker delimiters, ready to store in text.
    pub fn marker(&self) -> String {
        Self::wrap(&self.to_string())
    }

    /// Wraps a raw token in marker delimiters.
    pub fn wrap(token: &str) -> String {
        format!("{}{}{}", MARKER_OPEN, token, MARKER_CLOSE)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.producer, self.field)?;
        if let Some(index) = self.index {
            write!(f, "#{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for Reference {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Reference::parse(s)
    }
}

/// Splits a trailing `#<digits>` index off a token.
///
/// A `#` followed by anything other than digits is left in place.
pub(crate) fn split_index(token: &str) -> (&str, Option<usize>) {
    if let Some((base, suffix)) = token.rsplit_once('#') {
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = suffix.parse() {
                return (base, Some(index));
            }
        }
    }
    (token, None)
}

/// The producer id of a raw token: everything up to the first `.`.
pub(crate) fn producer_of(token: &str) -> &str {
    token.split_once('.').map_or(token, |(producer, _)| producer)
}

/// Raw tokens of every marker in `text`, in order of appearance.
pub fn extract_tokens(text: &str) -> impl Iterator<Item = &str> {
    MARKER_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Parses every marker in `text`. Malformed tokens are reported in place.
pub fn extract_references(text: &str) -> Vec<Result<Reference, TokenError>> {
    extract_tokens(text).map(Reference::parse).collect()
}
