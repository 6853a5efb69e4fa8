use chrono::{DateTime, NaiveDateTime, Utc};

/// Represents the different kinds of tokens that the lexer can produce.
#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    // == Special Tokens ==
    /// Represents the end of the input.
    Eof,
    /// A run of one or more whitespace characters (spaces, tabs, newlines).
    Whitespace,
    /// A comment, starting with `#` and continuing to the end of the line.
    /// The associated `String` contains the trimmed comment text.
    Comment(String),
    /// A character that starts no token at all.
    Unknown,
    /// A literal that was recognized lexically but could not be decoded,
    /// e.g. `012`, an unterminated string or an out-of-range integer.
    /// The associated `String` is the reason.
    Invalid(String),

    // == Literals ==
    /// A bare key: a Unicode letter or `_`, then letters, digits and `_`.
    Identifier(String),
    /// A double-quoted string, escapes already decoded.
    String(String),
    Integer(i64),
    Float(f64),
    /// A UTC instant written as `YYYY-MM-DDTHH:MM:SSZ`.
    DateTime(DateTime<Utc>),

    // == Keywords ==
    True,
    False,

    // == Punctuation ==
    /// Left Bracket: `[`
    LBracket,
    /// Right Bracket: `]`
    RBracket,
    /// Comma: `,`
    Comma,
    /// Dot: `.` (separates the parts of a key group header)
    Dot,
    /// Equals: `=`
    Equals,
}

/// A token with its type and byte position in the source.
#[derive(Debug, Clone)]
pub struct Token {
    pub ttype: TokenType,
    pub pos_start: usize,
    pub pos_end: usize,
}

impl Token {
    pub fn new(ttype: TokenType, pos_start: usize, pos_end: usize) -> Token {
        Token {
            ttype,
            pos_start,
            pos_end,
        }
    }
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    pub fn lex(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if token.ttype == TokenType::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    pub fn next_token(&mut self) -> Token {
        let start_pos = self.position;

        let ttype = if let Some(char) = self.advance() {
            match char {
                '[' => TokenType::LBracket,
                ']' => TokenType::RBracket,
                ',' => TokenType::Comma,
                '.' => TokenType::Dot,
                '=' => TokenType::Equals,
                '#' => self.read_comment(),
                '"' => self.read_string(),
                c if c.is_whitespace() => self.read_whitespace(),
                c if c.is_alphabetic() || c == '_' => self.read_identifier(c),
                c if c.is_ascii_digit()
                    || (c == '-' && self.peek().is_some_and(|c| c.is_ascii_digit())) =>
                {
                    self.read_literal_word(c)
                }
                _ => TokenType::Unknown,
            }
        } else {
            TokenType::Eof
        };

        Token::new(ttype, start_pos, self.position)
    }

    fn advance(&mut self) -> Option<char> {
        let char = self.chars.next();
        if let Some(c) = char {
            self.position += c.len_utf8();
        }
        char
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Consumes the next character if `pred` accepts it.
    fn advance_if(&mut self, pred: impl Fn(char) -> bool) -> Option<char> {
        match self.peek() {
            Some(&c) if pred(c) => self.advance(),
            _ => None,
        }
    }

    fn read_whitespace(&mut self) -> TokenType {
        while self.advance_if(char::is_whitespace).is_some() {}
        TokenType::Whitespace
    }

    fn read_comment(&mut self) -> TokenType {
        let mut comment_text = String::new();
        while let Some(c) = self.advance_if(|c| c != '\n') {
            comment_text.push(c);
        }
        TokenType::Comment(comment_text.trim().to_string())
    }

    /// Reads a string body after the opening quote, decoding escapes in a
    /// single left-to-right pass.
    fn read_string(&mut self) -> TokenType {
        let mut value = String::new();
        let mut problem: Option<String> = None;

        loop {
            let Some(&c) = self.peek() else {
                return TokenType::Invalid("unterminated string".to_string());
            };
            match c {
                '"' => {
                    self.advance();
                    return match problem {
                        Some(reason) => TokenType::Invalid(reason),
                        None => TokenType::String(value),
                    };
                }
                '\n' | '\r' => {
                    return TokenType::Invalid("unterminated string".to_string());
                }
                '\\' => {
                    self.advance();
                    match self.read_escape() {
                        Ok(decoded) => value.push(decoded),
                        Err(reason) => {
                            problem.get_or_insert(reason);
                        }
                    }
                }
                c if c.is_control() && c != '\t' => {
                    self.advance();
                    problem.get_or_insert(format!(
                        "control character U+{:04X} must be escaped",
                        c as u32
                    ));
                }
                _ => {
                    self.advance();
                    value.push(c);
                }
            }
        }
    }

    fn read_escape(&mut self) -> Result<char, String> {
        let Some(escaped) = self.advance_if(|c| c != '\n' && c != '\r') else {
            return Err("unterminated escape sequence".to_string());
        };
        match escaped {
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            '\\' => Ok('\\'),
            't' => Ok('\t'),
            '"' => Ok('"'),
            '0' => Ok('\0'),
            'b' => Ok('\u{0008}'),
            'f' => Ok('\u{000C}'),
            'u' => {
                let mut hex = String::new();
                for _ in 0..4 {
                    match self.advance_if(|c| c.is_ascii_hexdigit()) {
                        Some(h) => hex.push(h),
                        None => return Err("\\u must be followed by four hex digits".to_string()),
                    }
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("\\u{hex} is not a Unicode scalar value"))
            }
            other => Err(format!("unknown escape sequence `\\{other}`")),
        }
    }

    fn read_identifier(&mut self, first_char: char) -> TokenType {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(c) = self.advance_if(|c| c.is_alphabetic() || c.is_ascii_digit() || c == '_') {
            ident.push(c);
        }

        match ident.as_str() {
            "true" => TokenType::True,
            "false" => TokenType::False,
            _ => TokenType::Identifier(ident),
        }
    }

    /// Reads the maximal run of characters that may belong to a numeric or
    /// datetime literal, then decides which one it is.
    fn read_literal_word(&mut self, first_char: char) -> TokenType {
        let mut word = String::new();
        word.push(first_char);
        while let Some(c) =
            self.advance_if(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | ':' | '.' | '+' | '_'))
        {
            word.push(c);
        }
        classify_literal(&word)
    }
}

/// Tries the literal recognizers in order: datetime, float, integer.
fn classify_literal(word: &str) -> TokenType {
    if let Some(instant) = recognize_datetime(word) {
        return TokenType::DateTime(instant);
    }
    if let Some(f) = recognize_float(word) {
        return TokenType::Float(f);
    }
    if let Some(n) = recognize_integer(word) {
        return TokenType::Integer(n);
    }
    TokenType::Invalid(describe_bad_literal(word))
}

/// Byte index just past the integer part: optional `-`, then `0` or a
/// nonzero digit followed by digits.
fn integer_part_end(word: &str) -> Option<usize> {
    let bytes = word.as_bytes();
    let start = usize::from(bytes.first() == Some(&b'-'));
    match bytes.get(start)? {
        b'0' => Some(start + 1),
        b'1'..=b'9' => Some(
            start
                + 1
                + bytes[start + 1..]
                    .iter()
                    .take_while(|b| b.is_ascii_digit())
                    .count(),
        ),
        _ => None,
    }
}

fn recognize_integer(word: &str) -> Option<i64> {
    if integer_part_end(word)? != word.len() {
        return None;
    }
    word.parse::<i64>().ok()
}

fn recognize_float(word: &str) -> Option<f64> {
    let end = integer_part_end(word)?;
    let fraction = word[end..].strip_prefix('.')?;
    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    word.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn recognize_datetime(word: &str) -> Option<DateTime<Utc>> {
    const SHAPE: &[u8; 20] = b"dddd-dd-ddTdd:dd:ddZ";
    let bytes = word.as_bytes();
    if bytes.len() != SHAPE.len() {
        return None;
    }
    let shaped = bytes.iter().zip(SHAPE).all(|(b, s)| match s {
        b'd' => b.is_ascii_digit(),
        _ => b == s,
    });
    if !shaped {
        return None;
    }
    NaiveDateTime::parse_from_str(&word[..19], "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn describe_bad_literal(word: &str) -> String {
    let digits = word.strip_prefix('-').unwrap_or(word);
    if digits.len() > 1 && digits.starts_with('0') && digits.as_bytes()[1].is_ascii_digit() {
        "leading zeros are not allowed".to_string()
    } else if integer_part_end(word) == Some(word.len()) {
        "integer does not fit in 64 bits".to_string()
    } else if word.contains('T') || word.matches('-').count() >= 2 {
        "datetime must be written as YYYY-MM-DDTHH:MM:SSZ".to_string()
    } else if word.contains('.') {
        "float must have digits on both sides of a single `.`".to_string()
    } else {
        "not an integer, float or datetime".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn assert_tokens(input: &str, expected: Vec<TokenType>) {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.lex();

        // Filter out whitespace and comments for most tests
        let filtered_tokens: Vec<TokenType> = tokens
            .into_iter()
            .map(|t| t.ttype)
            .filter(|t| !matches!(t, TokenType::Whitespace | TokenType::Comment(_)))
            .collect();

        assert_eq!(filtered_tokens, expected);
    }

    fn single(input: &str) -> TokenType {
        let mut lexer = Lexer::new(input);
        lexer.next_token().ttype
    }

    #[test]
    fn test_eof() {
        assert_tokens("", vec![TokenType::Eof]);
    }

    #[test]
    fn test_single_char_tokens() {
        assert_tokens(
            "[],.=",
            vec![
                TokenType::LBracket,
                TokenType::RBracket,
                TokenType::Comma,
                TokenType::Dot,
                TokenType::Equals,
                TokenType::Eof,
            ],
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_tokens(
            "true false truthy _under naïve ключ key_2",
            vec![
                TokenType::True,
                TokenType::False,
                TokenType::Identifier("truthy".to_string()),
                TokenType::Identifier("_under".to_string()),
                TokenType::Identifier("naïve".to_string()),
                TokenType::Identifier("ключ".to_string()),
                TokenType::Identifier("key_2".to_string()),
                TokenType::Eof,
            ],
        );
    }

    #[test]
    fn test_identifiers_stop_at_non_decimal_numerals() {
        assert_tokens(
            "x² v1",
            vec![
                TokenType::Identifier("x".to_string()),
                TokenType::Unknown,
                TokenType::Identifier("v1".to_string()),
                TokenType::Eof,
            ],
        );
    }

    #[test]
    fn test_numbers() {
        assert_tokens(
            "0 -0 42 -17 2.75 -0.5 9223372036854775807 -9223372036854775808",
            vec![
                TokenType::Integer(0),
                TokenType::Integer(0),
                TokenType::Integer(42),
                TokenType::Integer(-17),
                TokenType::Float(2.75),
                TokenType::Float(-0.5),
                TokenType::Integer(i64::MAX),
                TokenType::Integer(i64::MIN),
                TokenType::Eof,
            ],
        );
    }

    #[test]
    fn test_rejected_numbers() {
        assert_eq!(
            single("012"),
            TokenType::Invalid("leading zeros are not allowed".to_string())
        );
        assert_eq!(
            single("-007"),
            TokenType::Invalid("leading zeros are not allowed".to_string())
        );
        assert_eq!(
            single("9223372036854775808"),
            TokenType::Invalid("integer does not fit in 64 bits".to_string())
        );
        assert!(matches!(single("1."), TokenType::Invalid(_)));
        assert!(matches!(single("1.2.3"), TokenType::Invalid(_)));
        assert!(matches!(single("1e10"), TokenType::Invalid(_)));
        assert!(matches!(single("01.5"), TokenType::Invalid(_)));
    }

    #[test]
    fn test_datetime() {
        let expected = Utc.with_ymd_and_hms(1979, 5, 27, 7, 32, 0).unwrap();
        assert_eq!(single("1979-05-27T07:32:00Z"), TokenType::DateTime(expected));
    }

    #[test]
    fn test_malformed_datetimes() {
        for input in [
            "1979-05-27T07:32:00",
            "1979-05-27T07:32:00.5Z",
            "1979-05-27T07:32:00+01:00",
            "1979-13-27T07:32:00Z",
            "1979-5-27T07:32:00Z",
            "1979-05-27",
        ] {
            assert!(
                matches!(single(input), TokenType::Invalid(_)),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_strings() {
        assert_tokens(
            r#""hello world" "" "ünïcödé""#,
            vec![
                TokenType::String("hello world".to_string()),
                TokenType::String(String::new()),
                TokenType::String("ünïcödé".to_string()),
                TokenType::Eof,
            ],
        );
    }

    #[test]
    fn test_strings_with_escapes() {
        assert_eq!(
            single(r#""a\nb\rc\\d\te\"f\0g""#),
            TokenType::String("a\nb\rc\\d\te\"f\0g".to_string())
        );
        assert_eq!(
            single(r#""é\b\f""#),
            TokenType::String("é\u{8}\u{c}".to_string())
        );
    }

    #[test]
    fn test_escaped_backslash_is_not_reinterpreted() {
        // `\\n` is a backslash followed by the letter n, never a newline.
        assert_eq!(single(r#""\\n""#), TokenType::String("\\n".to_string()));
        assert_eq!(single(r#""\\\"""#), TokenType::String("\\\"".to_string()));
    }

    #[test]
    fn test_bad_strings() {
        assert_eq!(
            single("\"open"),
            TokenType::Invalid("unterminated string".to_string())
        );
        assert_eq!(
            single("\"line\nbreak\""),
            TokenType::Invalid("unterminated string".to_string())
        );
        assert_eq!(
            single(r#""\q""#),
            TokenType::Invalid("unknown escape sequence `\\q`".to_string())
        );
        assert!(matches!(single(r#""\u12""#), TokenType::Invalid(_)));
        assert!(matches!(single(r#""\uD800""#), TokenType::Invalid(_)));
    }

    #[test]
    fn test_comments_and_whitespace() {
        let input = "# leading comment\nkey = 1 # trailing\n";
        let mut lexer = Lexer::new(input);
        let token_types: Vec<TokenType> = lexer.lex().into_iter().map(|t| t.ttype).collect();

        assert_eq!(
            token_types,
            vec![
                TokenType::Comment("leading comment".to_string()),
                TokenType::Whitespace,
                TokenType::Identifier("key".to_string()),
                TokenType::Whitespace,
                TokenType::Equals,
                TokenType::Whitespace,
                TokenType::Integer(1),
                TokenType::Whitespace,
                TokenType::Comment("trailing".to_string()),
                TokenType::Whitespace,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let mut lexer = Lexer::new("é = \"x\"");
        let tokens = lexer.lex();
        assert_eq!((tokens[0].pos_start, tokens[0].pos_end), (0, 2));
        assert_eq!((tokens[4].pos_start, tokens[4].pos_end), (5, 8));
    }

    #[test]
    fn test_key_group_document() {
        let input = r#"
# Config settings
title = "demo"

[servers.alpha]
ip = "10.0.0.1"
ports = [8001, 8002,]
"#;
        assert_tokens(
            input,
            vec![
                TokenType::Identifier("title".to_string()),
                TokenType::Equals,
                TokenType::String("demo".to_string()),
                TokenType::LBracket,
                TokenType::Identifier("servers".to_string()),
                TokenType::Dot,
                TokenType::Identifier("alpha".to_string()),
                TokenType::RBracket,
                TokenType::Identifier("ip".to_string()),
                TokenType::Equals,
                TokenType::String("10.0.0.1".to_string()),
                TokenType::Identifier("ports".to_string()),
                TokenType::Equals,
                TokenType::LBracket,
                TokenType::Integer(8001),
                TokenType::Comma,
                TokenType::Integer(8002),
                TokenType::Comma,
                TokenType::RBracket,
                TokenType::Eof,
            ],
        );
    }
}
