// File: src/lookahead.rs
//
// Speculative multi-token lookahead for the parser.
//
// A Lookahead borrows a TokenReader, records every token it pulls and, when
// dropped, unreads them all in reverse order. The reader is then positioned
// exactly where it was before the scan, whatever the scan concluded and even
// if it stopped on a lexical error. Every `detect_*` predicate in the parser
// is written on top of this type.

use crate::errors::LangError;
use crate::lexer::{Token, TokenCode, TokenReader};
use tracing::trace;

pub struct Lookahead<'r, R: TokenReader> {
    reader: &'r mut R,
    taken: Vec<Token>,
}

impl<'r, R: TokenReader> Lookahead<'r, R> {
    pub fn new(reader: &'r mut R) -> Self {
        Lookahead { reader, taken: Vec::new() }
    }

    /// Pull one token, including spaces
    pub fn next_token(&mut self) -> Result<&Token, LangError> {
        let token = self.reader.get_token()?;
        self.taken.push(token);
        Ok(&self.taken[self.taken.len() - 1])
    }

    /// Pull past any spaces and return the code of the first other token
    pub fn next_significant(&mut self) -> Result<TokenCode, LangError> {
        loop {
            let code = self.next_token()?.code;
            if code != TokenCode::Space {
                return Ok(code);
            }
        }
    }

    /// True when the upcoming significant tokens carry exactly these codes.
    /// Stops reading at the first mismatch.
    pub fn matches(&mut self, codes: &[TokenCode]) -> Result<bool, LangError> {
        for &expected in codes {
            let found = self.next_significant()?;
            if found != expected {
                trace!(?codes, %found, depth = self.depth(), "lookahead rejected");
                return Ok(false);
            }
        }
        trace!(?codes, depth = self.depth(), "lookahead matched");
        Ok(true)
    }

    /// Number of tokens that will be restored
    pub fn depth(&self) -> usize {
        self.taken.len()
    }
}

impl<R: TokenReader> Drop for Lookahead<'_, R> {
    fn drop(&mut self) {
        while let Some(token) = self.taken.pop() {
            self.reader.unread(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{tokenize, Lexer};

    fn drain(lexer: &mut Lexer) -> Vec<Token> {
        let mut out = Vec::new();
        loop {
            let token = lexer.get_token().unwrap();
            let done = token.is(TokenCode::Eof);
            out.push(token);
            if done {
                return out;
            }
        }
    }

    #[test]
    fn test_failed_match_restores_stream() {
        let source = "  , 42 ;";
        let mut lexer = Lexer::new(source);
        {
            let mut scan = lexer.lookahead();
            assert!(!scan.matches(&[TokenCode::Comma, TokenCode::Id]).unwrap());
            assert_eq!(scan.depth(), 4);
        }
        assert_eq!(drain(&mut lexer), tokenize(source).unwrap());
    }

    #[test]
    fn test_successful_match_restores_stream() {
        let source = "\n, total; PRINT total;";
        let mut lexer = Lexer::new(source);
        assert!(lexer.lookahead().matches(&[TokenCode::Comma, TokenCode::Id]).unwrap());
        assert_eq!(drain(&mut lexer), tokenize(source).unwrap());
    }

    #[test]
    fn test_nested_scans_restore_in_order() {
        let source = "LOOP a : REPEAT";
        let mut lexer = Lexer::new(source);
        let first = lexer.get_token().unwrap();
        {
            let mut outer = lexer.lookahead();
            assert_eq!(outer.next_significant().unwrap(), TokenCode::Id);
        }
        assert!(lexer.lookahead().matches(&[TokenCode::Id, TokenCode::Colon, TokenCode::Repeat]).unwrap());
        lexer.unread(first);
        assert_eq!(drain(&mut lexer), tokenize(source).unwrap());
    }

    #[test]
    fn test_lex_error_still_restores_read_tokens() {
        let mut lexer = Lexer::new("x ?");
        assert!(lexer.lookahead().matches(&[TokenCode::Id, TokenCode::Id]).is_err());
        let x = lexer.get_token().unwrap();
        assert_eq!(x.text.as_deref(), Some("x"));
        assert!(lexer.get_token().unwrap().is(TokenCode::Space));
    }
}
