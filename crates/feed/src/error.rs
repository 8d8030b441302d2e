// ABOUTME: Error types for feed decoding, merging, and encoding.
// ABOUTME: Provides FeedError with structural, schema, value, and model failure classes.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while reading, merging, or writing feeds.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The input bytes are not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(String),

    /// The document does not have the expected rss/channel skeleton.
    #[error("structural error: {0}")]
    Structural(String),

    /// An element or attribute violates the closed RSS schema.
    #[error("schema error: {0}")]
    Schema(String),

    /// A numeric, enumerated, or date value could not be interpreted.
    #[error("invalid value: {0}")]
    Value(String),

    /// A decoded entity ended up empty per its own invariant.
    #[error("invalid entity: {0}")]
    Model(String),

    /// Merge was asked to combine zero channels.
    #[error("nothing to merge: no channels given")]
    NoChannels,

    /// Reading or writing the destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Structural,
    Schema,
    Value,
    Model,
}

impl FeedError {
    /// Creates an Xml error from an underlying reader error.
    pub fn xml(err: impl fmt::Display) -> Self {
        FeedError::Xml(err.to_string())
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        FeedError::Structural(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        FeedError::Schema(msg.into())
    }

    pub fn value(msg: impl Into<String>) -> Self {
        FeedError::Value(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        FeedError::Model(msg.into())
    }

    /// A child element the schema does not allow under `parent`.
    pub fn unknown_element(parent: &str, tag: &str) -> Self {
        FeedError::Schema(format!("unexpected <{}> inside <{}>", tag, parent))
    }

    /// A second occurrence of an at-most-once element.
    pub fn duplicate(parent: &str, tag: &str) -> Self {
        FeedError::Schema(format!("<{}> appears more than once inside <{}>", tag, parent))
    }

    /// A required child element that never appeared.
    pub fn missing_element(parent: &str, tag: &str) -> Self {
        FeedError::Schema(format!("<{}> is missing required <{}>", parent, tag))
    }

    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        FeedError::Schema(format!(
            "<{}> is missing required attribute \"{}\"",
            element, attribute
        ))
    }

    pub fn unexpected_attribute(element: &str, attribute: &str) -> Self {
        FeedError::Schema(format!(
            "<{}> does not allow attribute \"{}\"",
            element, attribute
        ))
    }

    /// Returns the decode failure class, or None for I/O and merge errors.
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            FeedError::Xml(_) | FeedError::Structural(_) => Some(ErrorClass::Structural),
            FeedError::Schema(_) => Some(ErrorClass::Schema),
            FeedError::Value(_) => Some(ErrorClass::Value),
            FeedError::Model(_) => Some(ErrorClass::Model),
            FeedError::NoChannels | FeedError::Io(_) => None,
        }
    }
}
