use crate::Real;
use crate::types::TokenKind;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<Real>,
    pub text: String,
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, value: Option<Real>, text: &str, position: usize) -> Self {
        Self {
            kind,
            value,
            text: String::from(text),
            position,
        }
    }
}

/// The lexer struct, which produces tokens from an input string.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Peek at the current character.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Peek at the character after the current one.
    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advance the position by one character.
    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Get the original input string
    pub fn get_original_input(&self) -> &'a str {
        self.input
    }

    /// Skip whitespace.
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Scan a numeric literal: digits and dots, then an optional exponent.
    ///
    /// The whole run is consumed before validation so `1.2.3` is reported as one
    /// malformed literal rather than two adjacent numbers.
    fn scan_number(&mut self, start_pos: usize) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                self.advance();
            } else {
                break;
            }
        }

        if let Some('e' | 'E') = self.peek() {
            self.advance();
            if let Some('+' | '-') = self.peek() {
                self.advance();
            }
            let mut has_exp_digits = false;
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    has_exp_digits = true;
                    self.advance();
                } else {
                    break;
                }
            }
            if !has_exp_digits {
                // Swallow trailing identifier characters so `2ex` is one bad token.
                self.skip_identifier_chars();
                return Token::new(
                    TokenKind::Error,
                    None,
                    &self.input[start_pos..self.pos],
                    start_pos,
                );
            }
        }

        let text = &self.input[start_pos..self.pos];
        match text.parse::<Real>() {
            Ok(val) if val.is_finite() => Token::new(TokenKind::Number, Some(val), text, start_pos),
            _ => Token::new(TokenKind::Error, None, text, start_pos),
        }
    }

    fn skip_identifier_chars(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Get the next token from the input.
    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let start_pos = self.pos;
        let c = self.peek()?;

        // Number (integer or float, possibly scientific notation or a leading dot)
        if c.is_ascii_digit() || (c == '.' && self.peek_second().is_some_and(|d| d.is_ascii_digit()))
        {
            return Some(self.scan_number(start_pos));
        }

        // Operators, with `**` as the only multi-character one
        if "+-*/^".contains(c) {
            self.advance();
            if c == '*' && self.peek() == Some('*') {
                self.advance();
            }
            return Some(Token::new(
                TokenKind::Operator,
                None,
                &self.input[start_pos..self.pos],
                start_pos,
            ));
        }

        // Identifier (variable, constant, function)
        if c.is_ascii_alphabetic() || c == '_' {
            self.skip_identifier_chars();
            return Some(Token::new(
                TokenKind::Identifier,
                None,
                &self.input[start_pos..self.pos],
                start_pos,
            ));
        }

        // Other punctuation
        let kind = match c {
            '(' => TokenKind::Open,
            ')' => TokenKind::Close,
            ',' => TokenKind::Separator,
            _ => TokenKind::Error,
        };
        self.advance();
        Some(Token::new(kind, None, &self.input[start_pos..self.pos], start_pos))
    }
}
