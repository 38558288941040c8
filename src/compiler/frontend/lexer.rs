//! Lexical analysis for Nota source code

use crate::error::{CompilerError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Item,
    Export,
    Import,
    As,
    Package,
    Struct,
    Property,
    If,
    Else,
    For,
    In,
    Delegate,

    // Literals
    Identifier,
    Number,
    String,
    Color,
    Boolean,

    // Punctuation
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Colon,        // :
    Semicolon,    // ;
    Comma,        // ,
    Dot,          // .
    Percent,      // %

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Equals,
    EqualEquals,
    NotEquals,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AndAnd,
    OrOr,
    Bang,

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Item => "Item",
            TokenKind::Export => "export",
            TokenKind::Import => "import",
            TokenKind::As => "as",
            TokenKind::Package => "package",
            TokenKind::Struct => "struct",
            TokenKind::Property => "property",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::In => "in",
            TokenKind::Delegate => "delegate",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Color => "color",
            TokenKind::Boolean => "boolean",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Percent => "'%'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Equals => "'='",
            TokenKind::EqualEquals => "'=='",
            TokenKind::NotEquals => "'!='",
            TokenKind::Less => "'<'",
            TokenKind::LessEqual => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Eof => "end of file",
        };
        f.write_str(text)
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    filename: String,
}

impl Lexer {
    pub fn new(input: &str, filename: impl Into<String>) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            filename: filename.into(),
        }
    }

    fn error_at(&self, line: usize, column: usize, message: impl Into<String>) -> CompilerError {
        CompilerError::parse(self.filename.clone(), line, column, message)
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia()?;
            if self.is_at_end() {
                break;
            }
            tokens.push(self.next_token()?);
        }

        tokens.push(Token::new(TokenKind::Eof, "", self.line, self.column));
        log::trace!("Lexed {} tokens from {}", tokens.len(), self.filename);
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token> {
        let line = self.line;
        let column = self.column;
        let ch = self.advance();

        let simple = |kind: TokenKind, lexeme: &str| Ok(Token::new(kind, lexeme, line, column));

        match ch {
            '{' => simple(TokenKind::LeftBrace, "{"),
            '}' => simple(TokenKind::RightBrace, "}"),
            '(' => simple(TokenKind::LeftParen, "("),
            ')' => simple(TokenKind::RightParen, ")"),
            '[' => simple(TokenKind::LeftBracket, "["),
            ']' => simple(TokenKind::RightBracket, "]"),
            ':' => simple(TokenKind::Colon, ":"),
            ';' => simple(TokenKind::Semicolon, ";"),
            ',' => simple(TokenKind::Comma, ","),
            '.' => simple(TokenKind::Dot, "."),
            '%' => simple(TokenKind::Percent, "%"),
            '+' => simple(TokenKind::Plus, "+"),
            '-' => simple(TokenKind::Minus, "-"),
            '*' => simple(TokenKind::Star, "*"),
            '/' => simple(TokenKind::Slash, "/"),
            '=' => {
                if self.match_char('=') {
                    simple(TokenKind::EqualEquals, "==")
                } else {
                    simple(TokenKind::Equals, "=")
                }
            }
            '!' => {
                if self.match_char('=') {
                    simple(TokenKind::NotEquals, "!=")
                } else {
                    simple(TokenKind::Bang, "!")
                }
            }
            '<' => {
                if self.match_char('=') {
                    simple(TokenKind::LessEqual, "<=")
                } else {
                    simple(TokenKind::Less, "<")
                }
            }
            '>' => {
                if self.match_char('=') {
                    simple(TokenKind::GreaterEqual, ">=")
                } else {
                    simple(TokenKind::Greater, ">")
                }
            }
            '&' => {
                if self.match_char('&') {
                    simple(TokenKind::AndAnd, "&&")
                } else {
                    Err(self.error_at(line, column, "Unexpected character: '&'"))
                }
            }
            '|' => {
                if self.match_char('|') {
                    simple(TokenKind::OrOr, "||")
                } else {
                    Err(self.error_at(line, column, "Unexpected character: '|'"))
                }
            }
            '"' | '\'' => {
                let value = self.read_string(ch, line, column)?;
                Ok(Token::new(TokenKind::String, value, line, column))
            }
            '#' => {
                let color = self.read_color(line, column)?;
                Ok(Token::new(TokenKind::Color, color, line, column))
            }
            c if c.is_ascii_digit() => {
                let number = self.read_number(c);
                Ok(Token::new(TokenKind::Number, number, line, column))
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let text = self.read_identifier(c);
                let kind = Self::keyword_kind(&text);
                Ok(Token::new(kind, text, line, column))
            }
            other => Err(self.error_at(
                line,
                column,
                format!("Unexpected character: '{}'", other),
            )),
        }
    }

    fn keyword_kind(text: &str) -> TokenKind {
        match text {
            "Item" => TokenKind::Item,
            "export" => TokenKind::Export,
            "import" => TokenKind::Import,
            "as" => TokenKind::As,
            "package" => TokenKind::Package,
            "struct" => TokenKind::Struct,
            "property" => TokenKind::Property,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "delegate" => TokenKind::Delegate,
            "true" | "false" => TokenKind::Boolean,
            _ => TokenKind::Identifier,
        }
    }

    /// Skip whitespace, `//` line comments and `/* */` block comments
    fn skip_trivia(&mut self) -> Result<()> {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek_next() == Some('/') {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else if ch == '/' && self.peek_next() == Some('*') {
                let (line, column) = (self.line, self.column);
                self.advance();
                self.advance();
                loop {
                    match self.peek() {
                        None => return Err(self.error_at(line, column, "Unterminated block comment")),
                        Some('*') if self.peek_next() == Some('/') => {
                            self.advance();
                            self.advance();
                            break;
                        }
                        Some(_) => {
                            self.advance();
                        }
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn advance(&mut self) -> char {
        match self.input.get(self.position).copied() {
            Some(ch) => {
                self.position += 1;
                if ch == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
                ch
            }
            None => '\0',
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn read_string(&mut self, quote: char, line: usize, column: usize) -> Result<String> {
        let mut value = String::new();

        while let Some(ch) = self.peek() {
            self.advance();
            match ch {
                '\\' => {
                    let escaped = self.advance();
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        '"' => value.push('"'),
                        '\'' => value.push('\''),
                        '\\' => value.push('\\'),
                        '\0' => break,
                        other => {
                            value.push('\\');
                            value.push(other);
                        }
                    }
                }
                c if c == quote => return Ok(value),
                '\n' => break,
                c => value.push(c),
            }
        }

        Err(self.error_at(line, column, "Unterminated string literal"))
    }

    fn read_color(&mut self, line: usize, column: usize) -> Result<String> {
        let mut color = String::from("#");
        while let Some(ch) = self.peek() {
            if ch.is_ascii_hexdigit() {
                color.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if color.len() == 1 {
            return Err(self.error_at(line, column, "Expected hex digits after '#'"));
        }
        Ok(color)
    }

    fn read_number(&mut self, first: char) -> String {
        let mut number = String::new();
        number.push(first);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Fractional part only when a digit follows the dot, so `1.foo` stays three tokens
        if self.peek() == Some('.') && self.peek_next().map_or(false, |c| c.is_ascii_digit()) {
            number.push(self.advance());
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    number.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        number
    }

    fn read_identifier(&mut self, first: char) -> String {
        let mut identifier = String::new();
        identifier.push(first);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else if ch == '-' && self.peek_next().map_or(false, |c| c.is_ascii_alphabetic()) {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, "test.nota")
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds("{ } ( ) [ ] : ; , . %"),
            vec![
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Colon,
                TokenKind::Semicolon,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Percent,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+ - * / == != < <= > >= && || ! ="),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::EqualEquals,
                TokenKind::NotEquals,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Bang,
                TokenKind::Equals,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escaping() {
        let tokens = Lexer::new(r#""hello\n\"world\"" 'it\'s'"#, "test.nota")
            .tokenize()
            .unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "hello\n\"world\"");
        assert_eq!(tokens[1].lexeme, "it's");
    }

    #[test]
    fn test_numbers_and_units_are_separate() {
        let tokens = Lexer::new("10px 2.5 50%", "test.nota").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "10");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme, "px");
        assert_eq!(tokens[2].lexeme, "2.5");
        assert_eq!(tokens[3].lexeme, "50");
        assert_eq!(tokens[4].kind, TokenKind::Percent);
    }

    #[test]
    fn test_hyphenated_identifier() {
        let tokens = Lexer::new("space-between a - b", "test.nota").tokenize().unwrap();
        assert_eq!(tokens[0].lexeme, "space-between");
        assert_eq!(tokens[1].lexeme, "a");
        assert_eq!(tokens[2].kind, TokenKind::Minus);
    }

    #[test]
    fn test_keywords_and_booleans() {
        assert_eq!(
            kinds("export Item import as package struct property if else for in delegate true"),
            vec![
                TokenKind::Export,
                TokenKind::Item,
                TokenKind::Import,
                TokenKind::As,
                TokenKind::Package,
                TokenKind::Struct,
                TokenKind::Property,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::For,
                TokenKind::In,
                TokenKind::Delegate,
                TokenKind::Boolean,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_colors() {
        let tokens = Lexer::new("#fff #1A2b3C", "test.nota").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Color);
        assert_eq!(tokens[0].lexeme, "#fff");
        assert_eq!(tokens[1].lexeme, "#1A2b3C");
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("App // trailing\n/* block\n comment */ {"),
            vec![TokenKind::Identifier, TokenKind::LeftBrace, TokenKind::Eof]
        );
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = Lexer::new("App {\n  width: 10\n}", "test.nota").tokenize().unwrap();
        let width = &tokens[2];
        assert_eq!(width.lexeme, "width");
        assert_eq!((width.line, width.column), (2, 3));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("text: \"oops", "test.nota").tokenize().unwrap_err();
        assert_eq!(err.location(), Some((1, 7)));
        assert!(err.to_string().contains("Unterminated string"));
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("App { @ }", "test.nota").tokenize().unwrap_err();
        assert!(err.to_string().contains("Unexpected character: '@'"));
    }
}
