//! XML documents exchanged with the administrative API.
//!
//! Request bodies are built from configuration with all text escaped.
//! Response documents are read as `quick-xml` event streams, never by
//! string matching.

mod documents;
mod listing;
mod settings;

pub use documents::{
    datastore_xml, feature_type_xml, layer_group_xml, style_xml, workspace_xml,
};
pub use listing::parse_feature_type_names;
pub use settings::set_element_text;

use thiserror::Error;

/// Errors raised while reading or rewriting XML documents.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Element <{0}> not found")]
    MissingElement(String),

    #[error("Failed to write XML: {0}")]
    Write(String),
}
