use crate::assembler::Assembler;
use crate::error::TomlError;
use crate::parser::Parser;
use crate::value::Document;
use log::debug;
use serde::{Serialize, Serializer};
use std::io::Read;

/// The name used in diagnostics when the caller does not supply one.
pub const DEFAULT_SOURCE_NAME: &str = "input.toml";

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_plain().serialize(serializer)
    }
}

impl Document {
    /// Renders the plain form of the document as a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Renders the plain form of the document as a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }
}

/// Parses a document from a string.
///
/// This is the primary entry point. The whole input must match the grammar;
/// the statements are then folded into a [`Document`].
///
/// # Errors
///
/// Returns a `TomlError` on a syntax error, a heterogeneous array or a
/// duplicate key. No partial document is ever returned.
pub fn parse(source: &str) -> Result<Document, TomlError> {
    parse_named(source, DEFAULT_SOURCE_NAME)
}

/// Like [`parse`], with `file_name` shown in diagnostics.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_named(source: &str, file_name: &str) -> Result<Document, TomlError> {
    debug!("parsing {file_name} ({} bytes)", source.len());
    let mut parser = Parser::new_with_name(source, file_name);
    let statements = parser.parse_document()?;
    debug!("{file_name}: {} statements", statements.len());

    let root = Assembler::new(parser.source()).assemble(statements)?;
    debug!("{file_name}: {} top-level keys", root.len());
    Ok(Document::new(root))
}

/// Reads all of `reader` as UTF-8 and parses it.
///
/// # Errors
///
/// Returns `TomlError::Io` if reading fails or the input is not UTF-8,
/// otherwise see [`parse`].
pub fn parse_reader<R: Read>(mut reader: R, file_name: &str) -> Result<Document, TomlError> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    parse_named(&source, file_name)
}
