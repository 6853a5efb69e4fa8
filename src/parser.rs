use crate::error::{ParserError, SharedSource, TomlError};
use crate::lexer::{Lexer, Token, TokenType};
use crate::value::Value;
use miette::{NamedSource, SourceSpan};
use std::sync::Arc;

/// How deeply arrays may nest before parsing gives up.
pub const MAX_NESTING: usize = 128;

/// One top-level statement of a document. Statements only live long enough
/// for the assembler to fold them into a [`crate::value::Document`].
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum Statement {
    /// `[a.b.c]`: every later assignment is written below this absolute path.
    KeyGroup { path: Vec<String>, span: SourceSpan },
    /// `key = value`
    Assignment {
        key: String,
        value: Value,
        span: SourceSpan,
    },
}

/// A recursive descent parser over the token stream.
#[derive(Debug)]
pub(crate) struct Parser<'a> {
    source: SharedSource,
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
    source_text: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new_with_name(source_text: &'a str, name: &str) -> Self {
        let source = Arc::new(NamedSource::new(name, source_text.to_string()));
        let mut lexer = Lexer::new(source_text);
        let tokens: Vec<Token> = lexer
            .lex()
            .into_iter()
            .filter(|t| !matches!(t.ttype, TokenType::Whitespace | TokenType::Comment(_)))
            .collect();

        Self {
            source,
            tokens,
            position: 0,
            depth: 0,
            source_text,
        }
    }

    pub fn source(&self) -> SharedSource {
        Arc::clone(&self.source)
    }

    // === Main Parsing Methods ===

    /// Document ::= { KeyGroup | Assignment } EOF
    pub fn parse_document(&mut self) -> Result<Vec<Statement>, TomlError> {
        let mut statements = Vec::new();
        loop {
            let statement = match self.current_token()?.clone().ttype {
                TokenType::Eof => break,
                TokenType::LBracket => self.parse_key_group()?,
                TokenType::Identifier(_) | TokenType::True | TokenType::False => {
                    self.parse_assignment()?
                }
                _ => return self.err_unexpected("a key or a `[key.group]` header"),
            };
            statements.push(statement);
        }
        Ok(statements)
    }

    /// KeyGroup ::= "[" Key { "." Key } "]"
    fn parse_key_group(&mut self) -> Result<Statement, TomlError> {
        let start = self.current_token()?.pos_start;
        self.expect(TokenType::LBracket, "`[`")?;
        let mut path = vec![self.parse_key()?];
        while self.match_token(TokenType::Dot) {
            path.push(self.parse_key()?);
        }
        let end = self.current_token()?.pos_end;
        self.expect(TokenType::RBracket, "`.` or `]`")?;
        Ok(Statement::KeyGroup {
            path,
            span: (start, end - start).into(),
        })
    }

    /// Assignment ::= Key "=" Value
    fn parse_assignment(&mut self) -> Result<Statement, TomlError> {
        let key_token = self.current_token()?.clone();
        let key = self.parse_key()?;
        self.expect(TokenType::Equals, "`=`")?;
        let value = self.parse_value()?;
        Ok(Statement::Assignment {
            key,
            value,
            span: span_of(&key_token),
        })
    }

    /// Key ::= Identifier | "true" | "false"
    fn parse_key(&mut self) -> Result<String, TomlError> {
        let token = self.current_token()?.clone();
        let key = match token.ttype {
            TokenType::Identifier(name) => name,
            TokenType::True => "true".to_string(),
            TokenType::False => "false".to_string(),
            _ => return self.err_unexpected("a key"),
        };
        self.advance();
        Ok(key)
    }

    /// Value ::= DateTime | Float | Integer | Boolean | String | Array
    ///
    /// The lexer has already told the literal kinds apart, so the alternation
    /// is a single lookahead.
    fn parse_value(&mut self) -> Result<Value, TomlError> {
        let token = self.current_token()?.clone();
        let value = match token.ttype {
            TokenType::DateTime(dt) => Value::DateTime(dt),
            TokenType::Float(f) => Value::Float(f),
            TokenType::Integer(n) => Value::Integer(n),
            TokenType::True => Value::Boolean(true),
            TokenType::False => Value::Boolean(false),
            TokenType::String(s) => Value::String(s),
            TokenType::LBracket => return self.parse_array(),
            _ => return self.err_unexpected("a value"),
        };
        self.advance();
        Ok(value)
    }

    /// Array ::= "[" [ Value { "," Value } [ "," ] ] "]"
    ///
    /// Every element must be the same variant as the first one, and arrays
    /// may nest at most [`MAX_NESTING`] levels.
    fn parse_array(&mut self) -> Result<Value, TomlError> {
        if self.depth >= MAX_NESTING {
            let open = self.current_token()?;
            return Err(ParserError::NestingTooDeep {
                src: Arc::clone(&self.source),
                span: span_of(open),
                limit: MAX_NESTING,
            }
            .into());
        }
        self.depth += 1;
        let array = self.parse_array_elements();
        self.depth -= 1;
        array
    }

    fn parse_array_elements(&mut self) -> Result<Value, TomlError> {
        self.expect(TokenType::LBracket, "`[`")?;
        let mut values: Vec<Value> = Vec::new();
        while !self.check(TokenType::RBracket) {
            let element_start = self.current_token()?.pos_start;
            let value = self.parse_value()?;
            if let Some(first) = values.first() {
                if !first.same_type(&value) {
                    let element_end = self.previous_token().map_or(element_start, |t| t.pos_end);
                    return Err(ParserError::HeterogeneousArray {
                        src: Arc::clone(&self.source),
                        span: (element_start, element_end - element_start).into(),
                        expected: first.type_name().to_string(),
                        found: value.type_name().to_string(),
                        value: value.to_string(),
                    }
                    .into());
                }
            }
            values.push(value);

            if !self.match_token(TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::RBracket, "`,` or `]`")?;
        Ok(Value::Array(values))
    }

    // === Tokenizer Helper Methods ===

    fn current_token(&self) -> Result<&Token, TomlError> {
        self.tokens.get(self.position).ok_or_else(|| {
            let pos = self.source_text.len();
            ParserError::UnexpectedEof {
                src: Arc::clone(&self.source),
                span: (pos, 0).into(),
                expected: "more input".to_string(),
            }
            .into()
        })
    }

    fn previous_token(&self) -> Option<&Token> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: TokenType, description: &str) -> Result<(), TomlError> {
        if self.check(expected) {
            self.advance();
            Ok(())
        } else {
            self.err_unexpected(description)
        }
    }

    fn match_token(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, ttype: TokenType) -> bool {
        if let Ok(token) = self.current_token() {
            std::mem::discriminant(&token.ttype) == std::mem::discriminant(&ttype)
        } else {
            false
        }
    }

    /// Builds the error for the current token: a bad literal reports its own
    /// reason, end of input and anything else report what was expected.
    fn err_unexpected<T>(&self, expected: &str) -> Result<T, TomlError> {
        let token = self.current_token()?;
        let found = &self.source_text[token.pos_start..token.pos_end];
        let error = match &token.ttype {
            TokenType::Invalid(reason) => ParserError::InvalidLiteral {
                src: Arc::clone(&self.source),
                span: span_of(token),
                literal: found.to_string(),
                reason: reason.clone(),
            },
            TokenType::Eof => ParserError::UnexpectedEof {
                src: Arc::clone(&self.source),
                span: span_of(token),
                expected: expected.to_string(),
            },
            _ => ParserError::UnexpectedToken {
                src: Arc::clone(&self.source),
                span: span_of(token),
                expected: expected.to_string(),
                found: found.to_string(),
            },
        };
        Err(error.into())
    }
}

fn span_of(token: &Token) -> SourceSpan {
    (token.pos_start, token.pos_end - token.pos_start).into()
}
