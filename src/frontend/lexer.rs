//! Lexer for the Dijkstra language
//!
//! Converts source code into a stream of tokens.
#![allow(dead_code)]

use crate::frontend::token::{Token, TokenKind};
use crate::utils::Span;

/// The lexer state
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// Current line (1-based)
    line: u32,
    /// Line on which the current token starts
    start_line: u32,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            line: 1,
            start_line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c == Some('\n') {
            self.line += 1;
        }
        self.pos += 1;
        c
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Create a span from start to current position
    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos, self.start_line)
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    /// Skip whitespace and `#` comments
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '?' {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.source[self.start..self.pos].iter().collect();
        let kind = TokenKind::keyword_from_str(&text).unwrap_or(TokenKind::Ident(text));

        self.make_token(kind)
    }

    /// Read a number literal (integer or float)
    fn read_number(&mut self) -> Token {
        let mut is_float = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        if self.peek() == Some('.') && self.peek_next().map_or(false, |c| c.is_ascii_digit()) {
            is_float = true;
            self.advance(); // consume '.'

            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let text: String = self.source[self.start..self.pos].iter().collect();

        // Out-of-range literals are reported by the parser, which knows the target width
        if is_float {
            let value = text.parse().unwrap_or(f64::INFINITY);
            self.make_token(TokenKind::FloatLit(value))
        } else {
            let value = text.parse().unwrap_or(i64::MAX);
            self.make_token(TokenKind::IntLit(value))
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.pos;
        self.start_line = self.line;

        let c = match self.advance() {
            Some(c) => c,
            None => return Token::eof(self.make_span()),
        };

        if c.is_alphabetic() || c == '_' {
            self.pos -= 1; // back up
            return self.read_identifier();
        }

        if c.is_ascii_digit() {
            self.pos -= 1; // back up
            return self.read_number();
        }

        let kind = match c {
            '<' => {
                if self.peek() == Some('-') {
                    self.advance();
                    TokenKind::Assign
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '~' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Ne
                } else {
                    TokenKind::Tilde
                }
            }
            ':' => {
                if self.peek() == Some(':') {
                    self.advance();
                    TokenKind::Guard
                } else {
                    TokenKind::Colon
                }
            }
            '=' => TokenKind::Eq,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '&' => TokenKind::And,
            '|' => TokenKind::Or,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Period,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            _ => TokenKind::Unknown(c),
        };

        self.make_token(kind)
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords() {
        let tokens = kinds("boolean false fi if input int float print program proc fun true do od div mod return");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Boolean,
                TokenKind::False,
                TokenKind::Fi,
                TokenKind::If,
                TokenKind::Input,
                TokenKind::Int,
                TokenKind::Float,
                TokenKind::Print,
                TokenKind::Program,
                TokenKind::Proc,
                TokenKind::Fun,
                TokenKind::True,
                TokenKind::Do,
                TokenKind::Od,
                TokenKind::Div,
                TokenKind::Mod,
                TokenKind::Return,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_separators() {
        let tokens = kinds(";():::[]{},.");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Semicolon,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Guard,
                TokenKind::Colon,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::Period,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("<- = ~= < > >= <= + - * / & | ~");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Assign,
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Ge,
                TokenKind::Le,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Tilde,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers_and_identifiers() {
        let tokens = kinds("42 3.14 a_b? x1");
        assert!(matches!(tokens[0], TokenKind::IntLit(42)));
        assert!(matches!(tokens[1], TokenKind::FloatLit(f) if (f - 3.14).abs() < 1e-9));
        assert!(matches!(tokens[2], TokenKind::Ident(ref s) if s == "a_b?"));
        assert!(matches!(tokens[3], TokenKind::Ident(ref s) if s == "x1"));
    }

    #[test]
    fn test_comments_and_lines() {
        let tokens = Lexer::new("a # comment <- 1\n  b").tokenize();
        assert!(matches!(tokens[0].kind, TokenKind::Ident(ref s) if s == "a"));
        assert_eq!(tokens[0].span.line, 1);
        assert!(matches!(tokens[1].kind, TokenKind::Ident(ref s) if s == "b"));
        assert_eq!(tokens[1].span.line, 2);
    }

    #[test]
    fn test_unknown_char() {
        let tokens = kinds("a $ b");
        assert_eq!(tokens[1], TokenKind::Unknown('$'));
    }
}
