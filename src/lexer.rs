// File: src/lexer.rs
//
// Lexical analyzer (tokenizer) for DCL.
// Converts source code text into a pull-based stream of tokens for parsing.
//
// Supports:
// - Keywords (case-insensitive): LOOP, REPEAT, BREAK, READ, PRINT, IF, THEN, ELSE, END
// - Identifiers and numbers
// - Operators: = == != < <= > >= + - * /
// - Punctuation: , : ; ( )
// - Comments starting with # (folded into whitespace)
//
// Whitespace is a first-class token (Space): the parser skips it explicitly.

use crate::errors::{LangError, SourceLocation};
use crate::lookahead::Lookahead;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCode {
    Space,
    Id,
    Number,
    Comma,
    Colon,
    Semicolon,
    LParen,
    RParen,
    Assign,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Loop,
    Repeat,
    Break,
    Read,
    Print,
    If,
    Then,
    Else,
    End,
    Eof,
}

impl TokenCode {
    fn keyword(word: &str) -> Option<TokenCode> {
        let code = match word.to_ascii_uppercase().as_str() {
            "LOOP" => TokenCode::Loop,
            "REPEAT" => TokenCode::Repeat,
            "BREAK" => TokenCode::Break,
            "READ" => TokenCode::Read,
            "PRINT" => TokenCode::Print,
            "IF" => TokenCode::If,
            "THEN" => TokenCode::Then,
            "ELSE" => TokenCode::Else,
            "END" => TokenCode::End,
            _ => return None,
        };
        Some(code)
    }
}

impl fmt::Display for TokenCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            TokenCode::Space => "whitespace",
            TokenCode::Id => "identifier",
            TokenCode::Number => "number",
            TokenCode::Comma => "','",
            TokenCode::Colon => "':'",
            TokenCode::Semicolon => "';'",
            TokenCode::LParen => "'('",
            TokenCode::RParen => "')'",
            TokenCode::Assign => "'='",
            TokenCode::Eq => "'=='",
            TokenCode::Ne => "'!='",
            TokenCode::Lt => "'<'",
            TokenCode::Le => "'<='",
            TokenCode::Gt => "'>'",
            TokenCode::Ge => "'>='",
            TokenCode::Plus => "'+'",
            TokenCode::Minus => "'-'",
            TokenCode::Star => "'*'",
            TokenCode::Slash => "'/'",
            TokenCode::Loop => "'LOOP'",
            TokenCode::Repeat => "'REPEAT'",
            TokenCode::Break => "'BREAK'",
            TokenCode::Read => "'READ'",
            TokenCode::Print => "'PRINT'",
            TokenCode::If => "'IF'",
            TokenCode::Then => "'THEN'",
            TokenCode::Else => "'ELSE'",
            TokenCode::End => "'END'",
            TokenCode::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// A lexical unit. `text` is only set for identifiers and numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub code: TokenCode,
    pub text: Option<String>,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(code: TokenCode, location: SourceLocation) -> Self {
        Token { code, text: None, location }
    }

    pub fn with_text(code: TokenCode, text: String, location: SourceLocation) -> Self {
        Token { code, text: Some(text), location }
    }

    pub fn is(&self, code: TokenCode) -> bool {
        self.code == code
    }
}

/// Pull-based token source with unbounded LIFO pushback.
///
/// Unreading tokens in the reverse order they were read restores the stream
/// exactly; the parser's backtracking relies on this.
pub trait TokenReader {
    fn get_token(&mut self) -> Result<Token, LangError>;

    fn unread(&mut self, token: Token);

    /// Consume tokens up to and including the first non-space one and return it
    fn skip_spaces(&mut self) -> Result<Token, LangError> {
        loop {
            let token = self.get_token()?;
            if !token.is(TokenCode::Space) {
                return Ok(token);
            }
        }
    }

    /// Open a speculative scan that restores every token it reads when dropped
    fn lookahead(&mut self) -> Lookahead<'_, Self>
    where
        Self: Sized,
    {
        Lookahead::new(self)
    }
}

/// Lazy tokenizer over DCL source text
pub struct Lexer<'src> {
    chars: Peekable<Chars<'src>>,
    line: usize,
    column: usize,
    pushback: Vec<Token>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            pushback: Vec::new(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn bump_if(&mut self, expected: char) -> bool {
        if self.chars.peek() == Some(&expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, first: char, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            text.push(c);
            self.bump();
        }
        text
    }

    fn scan(&mut self) -> Result<Token, LangError> {
        let location = SourceLocation::new(self.line, self.column);
        let Some(c) = self.bump() else {
            return Ok(Token::new(TokenCode::Eof, location));
        };

        let code = match c {
            c if c.is_whitespace() || c == '#' => {
                self.skip_blank(c);
                TokenCode::Space
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let word = self.take_while(c, |ch| ch.is_ascii_alphanumeric() || ch == '_');
                return Ok(match TokenCode::keyword(&word) {
                    Some(keyword) => Token::new(keyword, location),
                    None => Token::with_text(TokenCode::Id, word, location),
                });
            }
            '0'..='9' => {
                let mut number = self.take_while(c, |ch| ch.is_ascii_digit());
                // Only take the dot when a digit follows it
                let mut ahead = self.chars.clone();
                if ahead.next() == Some('.') && ahead.next().is_some_and(|ch| ch.is_ascii_digit()) {
                    self.bump();
                    let fraction = self.take_while('.', |ch| ch.is_ascii_digit());
                    number.push_str(&fraction);
                }
                return Ok(Token::with_text(TokenCode::Number, number, location));
            }
            ',' => TokenCode::Comma,
            ':' => TokenCode::Colon,
            ';' => TokenCode::Semicolon,
            '(' => TokenCode::LParen,
            ')' => TokenCode::RParen,
            '+' => TokenCode::Plus,
            '-' => TokenCode::Minus,
            '*' => TokenCode::Star,
            '/' => TokenCode::Slash,
            '=' if self.bump_if('=') => TokenCode::Eq,
            '=' => TokenCode::Assign,
            '!' if self.bump_if('=') => TokenCode::Ne,
            '<' if self.bump_if('=') => TokenCode::Le,
            '<' => TokenCode::Lt,
            '>' if self.bump_if('=') => TokenCode::Ge,
            '>' => TokenCode::Gt,
            other => {
                return Err(LangError::lex_error(
                    format!("Unexpected character '{}'", other),
                    location,
                ))
            }
        };

        Ok(Token::new(code, location))
    }

    /// Swallow a run of whitespace and comments
    fn skip_blank(&mut self, first: char) {
        let mut in_comment = first == '#';
        while let Some(&c) = self.chars.peek() {
            if in_comment {
                if c == '\n' {
                    in_comment = false;
                }
            } else if c == '#' {
                in_comment = true;
            } else if !c.is_whitespace() {
                break;
            }
            self.bump();
        }
    }
}

impl TokenReader for Lexer<'_> {
    fn get_token(&mut self) -> Result<Token, LangError> {
        match self.pushback.pop() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    fn unread(&mut self, token: Token) {
        self.pushback.push(token);
    }
}

/// Tokenizes DCL source code into a vector of tokens, ending with Eof.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LangError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.get_token()?;
        let done = token.is(TokenCode::Eof);
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
