//! Lexical analysis: turns an expression string into a flat token list.
//!
//! Multi-character operators are matched before single-character ones so
//! `>=` never lexes as `>` followed by `=`.

use crate::error::{DgeError, DgeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Identifier,
    Operator,
    Punctuation,
    Eof,
}

/// A lexeme borrowed from the source, with its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub position: usize,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, text: &'a str, position: usize) -> Self {
        Self {
            kind,
            text,
            position,
        }
    }

    /// Whether this token is the operator or punctuation `s`.
    pub fn is(&self, s: &str) -> bool {
        matches!(self.kind, TokenKind::Operator | TokenKind::Punctuation) && self.text == s
    }
}

const TWO_CHAR_OPERATORS: [&str; 4] = ["==", "!=", ">=", "<="];

/// Lex `input` into tokens terminated by an `Eof` marker.
pub fn tokenize(input: &str) -> DgeResult<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let end = scan_number(bytes, i);
            tokens.push(Token::new(TokenKind::Number, &input[i..end], i));
            i = end;
            continue;
        }

        if c.is_ascii_alphabetic() {
            let start = i;
            i += 1;
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
            {
                i += 1;
            }
            tokens.push(Token::new(TokenKind::Identifier, &input[start..i], start));
            continue;
        }

        if let Some(op) = TWO_CHAR_OPERATORS
            .into_iter()
            .find(|op| input[i..].starts_with(op))
        {
            tokens.push(Token::new(TokenKind::Operator, &input[i..i + op.len()], i));
            i += op.len();
            continue;
        }

        if matches!(
            c,
            b'+' | b'-' | b'*' | b'/' | b'^' | b'<' | b'>' | b'?' | b':' | b'='
        ) {
            tokens.push(Token::new(TokenKind::Operator, &input[i..i + 1], i));
            i += 1;
            continue;
        }

        if matches!(c, b'(' | b')' | b',') {
            tokens.push(Token::new(TokenKind::Punctuation, &input[i..i + 1], i));
            i += 1;
            continue;
        }

        let invalid = input[i..].chars().next().unwrap_or('\0');
        return Err(DgeError::parse_at(
            input,
            i,
            format!("unexpected character '{invalid}'"),
        ));
    }

    tokens.push(Token::new(TokenKind::Eof, "", input.len()));
    Ok(tokens)
}

/// digits [ '.' digits* ] [ ('e'|'E') ['+'|'-'] digits+ ]
fn scan_number(bytes: &[u8], start: usize) -> usize {
    let digits = |mut j: usize| {
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        j
    };
    let mut i = digits(start);
    if i < bytes.len() && bytes[i] == b'.' {
        i = digits(i + 1);
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let end = digits(j);
        // Only an exponent when digits follow; otherwise `e` starts the next token.
        if end > j {
            i = end;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<&str> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn lexes_operators_and_operands() {
        assert_eq!(
            texts("x>=1.5?y_2:-3"),
            vec!["x", ">=", "1.5", "?", "y_2", ":", "-", "3", ""]
        );
    }

    #[test]
    fn lexes_number_forms() {
        assert_eq!(texts("1 2. 3.25 4e2 5E-3 6.5e+1"), vec!["1", "2.", "3.25", "4e2", "5E-3", "6.5e+1", ""]);
        // A dangling exponent marker is not part of the number.
        assert_eq!(texts("2e"), vec!["2", "e", ""]);
    }

    #[test]
    fn identifiers_allow_underscore_and_dollar() {
        let tokens = tokenize("soft_Ik$1").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "soft_Ik$1");
    }

    #[test]
    fn equality_is_not_assignment() {
        let tokens = tokenize("y = x == 1").unwrap();
        assert!(tokens[1].is("="));
        assert!(tokens[3].is("=="));
    }

    #[test]
    fn records_positions() {
        let tokens = tokenize("  ab + 1").unwrap();
        assert_eq!(tokens[0].position, 2);
        assert_eq!(tokens[1].position, 5);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn rejects_unknown_characters() {
        let err = tokenize("x + #").unwrap_err();
        assert!(matches!(err, DgeError::Parse { position: 4, .. }));
        assert!(tokenize("x ! y").is_err());
        assert!(tokenize(".5").is_err());
    }
}
