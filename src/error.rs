use miette::{Diagnostic, NamedSource, SourceSpan};
use crate::utils::get_line_and_column;
use std::sync::Arc;
use thiserror::Error;

/// The input shared by every diagnostic raised while parsing it.
pub type SharedSource = Arc<NamedSource<String>>;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum TomlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Assembler(#[from] AssemblerError),

    #[error("Failed to read input: {0}")]
    #[diagnostic(code(io::read))]
    Io(#[source] Arc<std::io::Error>),
}

impl From<std::io::Error> for TomlError {
    fn from(err: std::io::Error) -> Self {
        TomlError::Io(Arc::new(err))
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("Unexpected token: expected {expected}, found `{found}`")]
    #[diagnostic(
        code(parser::unexpected_token),
        help("The parser found a token it did not expect in this position.")
    )]
    UnexpectedToken {
        #[source_code]
        src: SharedSource,
        #[label("Expected {expected}, but found this")]
        span: SourceSpan,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of file: expected {expected}")]
    #[diagnostic(
        code(parser::unexpected_eof),
        help("The file ended unexpectedly. The parser expected more tokens.")
    )]
    UnexpectedEof {
        #[source_code]
        src: SharedSource,
        #[label("File ended unexpectedly here")]
        span: SourceSpan,
        expected: String,
    },

    #[error("Invalid literal `{literal}`: {reason}")]
    #[diagnostic(
        code(parser::invalid_literal),
        help("Values are integers, floats, booleans, quoted strings, `YYYY-MM-DDTHH:MM:SSZ` datetimes or arrays.")
    )]
    InvalidLiteral {
        #[source_code]
        src: SharedSource,
        #[label("{reason}")]
        span: SourceSpan,
        literal: String,
        reason: String,
    },

    #[error("Heterogeneous array: expected {expected} element, found {found} `{value}`")]
    #[diagnostic(
        code(parser::heterogeneous_array),
        help("All elements of an array must have the same type.")
    )]
    HeterogeneousArray {
        #[source_code]
        src: SharedSource,
        #[label("This {found} does not match the first element")]
        span: SourceSpan,
        expected: String,
        found: String,
        value: String,
    },

    #[error("Arrays nested too deeply: the limit is {limit} levels")]
    #[diagnostic(
        code(parser::nesting_too_deep),
        help("Flatten the value or split it across several keys.")
    )]
    NestingTooDeep {
        #[source_code]
        src: SharedSource,
        #[label("This array exceeds the nesting limit")]
        span: SourceSpan,
        limit: usize,
    },
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum AssemblerError {
    #[error("Duplicate key: `{key}` is already defined")]
    #[diagnostic(
        code(assembler::duplicate_key),
        help("A key can only be assigned once. Key groups may be reopened to add new keys.")
    )]
    DuplicateKey {
        #[source_code]
        src: SharedSource,
        #[label("`{key}` assigned again here")]
        span: SourceSpan,
        key: String,
    },
}

impl TomlError {
    /// The 1-based line and column the error points at, if it has a location.
    pub fn line_and_column(&self) -> Option<(usize, usize)> {
        let (src, span) = match self {
            TomlError::Parser(
                ParserError::UnexpectedToken { src, span, .. }
                | ParserError::UnexpectedEof { src, span, .. }
                | ParserError::InvalidLiteral { src, span, .. }
                | ParserError::HeterogeneousArray { src, span, .. }
                | ParserError::NestingTooDeep { src, span, .. },
            ) => (src, span),
            TomlError::Assembler(AssemblerError::DuplicateKey { src, span, .. }) => (src, span),
            TomlError::Io(_) => return None,
        };
        Some(get_line_and_column(src.inner(), span.offset()))
    }
}
