pub mod api;
mod assembler;
pub mod error;
pub mod lexer;
mod parser;
pub mod serialization;
pub mod utils;
pub mod value;

pub use api::{parse, parse_named, parse_reader};
pub use error::TomlError;
pub use parser::MAX_NESTING;
pub use serialization::Plain;
pub use value::{Dictionary, Document, FromValue, KeyPath, Value};
