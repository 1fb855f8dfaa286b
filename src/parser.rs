// File: src/parser.rs
//
// Recursive descent parser for DCL.
// Transforms a stream of tokens into an Abstract Syntax Tree (AST).
//
// Grammar alternatives are chosen with `detect_*` predicates that peek at the
// upcoming tokens through a Lookahead and put everything back; the matching
// `parse_*` method then consumes the same tokens for real. Whitespace is a
// token of its own, so every peek and every parse step skips Space tokens
// explicitly before looking at a significant token.
//
//   program      : stmt-list EOF
//   stmt-list    : ( stmt ';' )*
//   loop-stmt    : LOOP ID ':' stmt-list REPEAT
//   break-stmt   : BREAK id-option
//   id-option    : ID | <empty>
//   read-stmt    : READ id-list
//   print-stmt   : PRINT id-list
//   id-list      : ID id-list-tail
//   id-list-tail : ',' ID id-list-tail | <empty>
//   if-stmt      : IF expr THEN stmt-list [ ELSE stmt-list ] END
//   assign-stmt  : ID '=' expr

use crate::ast::{
    AssignStmt, BinaryOp, BreakStmt, Expr, IdList, IdOption, IfStmt, LoopStmt, Program, Stmt, StmtList,
};
use crate::errors::LangError;
use crate::lexer::{Lexer, Token, TokenCode, TokenReader};
use tracing::{debug, trace};

/// Parse a complete program from source text
pub fn parse_source(source: &str) -> Result<Program, LangError> {
    Parser::new(Lexer::new(source)).parse_program()
}

/// Parser pulls tokens from a TokenReader and builds statements and expressions
pub struct Parser<R: TokenReader> {
    reader: R,
}

impl<R: TokenReader> Parser<R> {
    pub fn new(reader: R) -> Self {
        Parser { reader }
    }

    /// Give the reader back, positioned after whatever was parsed
    pub fn into_reader(self) -> R {
        self.reader
    }

    /// Consume the next significant token, failing with `message` unless it has `code`
    fn expect(&mut self, code: TokenCode, message: &str) -> Result<Token, LangError> {
        let token = self.reader.skip_spaces()?;
        if token.is(code) {
            Ok(token)
        } else {
            Err(LangError::syntax_error(message, token.location)
                .with_help(format!("found {}", token.code)))
        }
    }

    fn peek_code(&mut self) -> Result<TokenCode, LangError> {
        self.reader.lookahead().next_significant()
    }

    pub fn parse_program(&mut self) -> Result<Program, LangError> {
        let body = self.parse_stmt_list()?;
        let token = self.reader.skip_spaces()?;
        if !token.is(TokenCode::Eof) {
            return Err(LangError::syntax_error("Expected a statement", token.location)
                .with_help(format!("found {}", token.code)));
        }
        Ok(Program { body })
    }

    /// Parse statements for as long as one is detected. Stops without
    /// consuming the token that ended the list.
    pub fn parse_stmt_list(&mut self) -> Result<StmtList, LangError> {
        let mut stmts = Vec::new();
        while let Some(stmt) = self.parse_stmt()? {
            self.expect(TokenCode::Semicolon, "Expected ';' after statement")?;
            stmts.push(stmt);
        }
        Ok(StmtList::new(stmts))
    }

    fn parse_stmt(&mut self) -> Result<Option<Stmt>, LangError> {
        let stmt = if self.detect_loop_stmt()? {
            Stmt::Loop(self.parse_loop_stmt()?)
        } else if self.detect_break_stmt()? {
            Stmt::Break(self.parse_break_stmt()?)
        } else if self.detect_read_stmt()? {
            Stmt::Read(self.parse_read_stmt()?)
        } else if self.detect_print_stmt()? {
            Stmt::Print(self.parse_print_stmt()?)
        } else if self.detect_if_stmt()? {
            Stmt::If(self.parse_if_stmt()?)
        } else if self.detect_assign_stmt()? {
            Stmt::Assign(self.parse_assign_stmt()?)
        } else {
            trace!("no statement detected, ending statement list");
            return Ok(None);
        };
        Ok(Some(stmt))
    }

    // --- LOOP / BREAK ---

    pub fn detect_loop_stmt(&mut self) -> Result<bool, LangError> {
        self.reader.lookahead().matches(&[TokenCode::Loop])
    }

    pub fn parse_loop_stmt(&mut self) -> Result<LoopStmt, LangError> {
        let keyword = self.expect(TokenCode::Loop, "Expected 'LOOP'")?;
        let id = self.expect(TokenCode::Id, "Expected loop identifier")?;
        self.expect(TokenCode::Colon, "Expected ':' after loop identifier")?;
        let body = self.parse_stmt_list()?;
        self.expect(TokenCode::Repeat, "Expected 'REPEAT' after loop body")?;

        debug!(label = ?id.text, statements = body.stmts.len(), "parsed loop");
        Ok(LoopStmt { id: id.text, body, location: keyword.location })
    }

    /// `ID | <empty>`: the one rule that backtracks a single token
    pub fn parse_id_option(&mut self) -> Result<IdOption, LangError> {
        let token = self.reader.skip_spaces()?;
        if token.is(TokenCode::Id) {
            Ok(IdOption { id: token.text })
        } else {
            self.reader.unread(token);
            Ok(IdOption { id: None })
        }
    }

    pub fn detect_break_stmt(&mut self) -> Result<bool, LangError> {
        self.reader.lookahead().matches(&[TokenCode::Break])
    }

    pub fn parse_break_stmt(&mut self) -> Result<BreakStmt, LangError> {
        let keyword = self.expect(TokenCode::Break, "Expected 'BREAK'")?;
        let target = self.parse_id_option()?;
        Ok(BreakStmt { target, location: keyword.location })
    }

    // --- READ / PRINT ---

    pub fn detect_read_stmt(&mut self) -> Result<bool, LangError> {
        self.reader.lookahead().matches(&[TokenCode::Read])
    }

    pub fn parse_read_stmt(&mut self) -> Result<IdList, LangError> {
        self.expect(TokenCode::Read, "Expected 'READ'")?;
        self.parse_id_list()
    }

    pub fn detect_print_stmt(&mut self) -> Result<bool, LangError> {
        self.reader.lookahead().matches(&[TokenCode::Print])
    }

    pub fn parse_print_stmt(&mut self) -> Result<IdList, LangError> {
        self.expect(TokenCode::Print, "Expected 'PRINT'")?;
        self.parse_id_list()
    }

    pub fn parse_id_list(&mut self) -> Result<IdList, LangError> {
        let first = self.expect(TokenCode::Id, "Expected identifier")?;
        let mut ids: Vec<String> = first.text.into_iter().collect();
        ids.extend(self.parse_id_list_tail()?);
        Ok(IdList { ids, location: first.location })
    }

    /// True when the next significant tokens are `,` then an identifier
    pub fn detect_id_list_tail(&mut self) -> Result<bool, LangError> {
        self.reader.lookahead().matches(&[TokenCode::Comma, TokenCode::Id])
    }

    /// `(',' ID)*`. Consumes nothing when the tail is empty.
    pub fn parse_id_list_tail(&mut self) -> Result<Vec<String>, LangError> {
        let mut ids = Vec::new();
        while self.detect_id_list_tail()? {
            self.expect(TokenCode::Comma, "Expected ','")?;
            let id = self.expect(TokenCode::Id, "Expected identifier after ','")?;
            ids.extend(id.text);
        }
        Ok(ids)
    }

    // --- IF / assignment ---

    pub fn detect_if_stmt(&mut self) -> Result<bool, LangError> {
        self.reader.lookahead().matches(&[TokenCode::If])
    }

    pub fn parse_if_stmt(&mut self) -> Result<IfStmt, LangError> {
        self.expect(TokenCode::If, "Expected 'IF'")?;
        let condition = self.parse_expr()?;
        self.expect(TokenCode::Then, "Expected 'THEN' after IF condition")?;
        let then_branch = self.parse_stmt_list()?;

        let else_branch = if self.reader.lookahead().matches(&[TokenCode::Else])? {
            self.expect(TokenCode::Else, "Expected 'ELSE'")?;
            Some(self.parse_stmt_list()?)
        } else {
            None
        };

        self.expect(TokenCode::End, "Expected 'END' to close IF")?;
        Ok(IfStmt { condition, then_branch, else_branch })
    }

    pub fn detect_assign_stmt(&mut self) -> Result<bool, LangError> {
        self.reader.lookahead().matches(&[TokenCode::Id])
    }

    pub fn parse_assign_stmt(&mut self) -> Result<AssignStmt, LangError> {
        let name = self.expect(TokenCode::Id, "Expected identifier")?;
        self.expect(TokenCode::Assign, "Expected '=' in assignment")?;
        let value = self.parse_expr()?;
        Ok(AssignStmt {
            name: name.text.unwrap_or_default(),
            value,
            location: name.location,
        })
    }

    // --- Expressions ---

    pub fn parse_expr(&mut self) -> Result<Expr, LangError> {
        self.parse_comparison()
    }

    /// One precedence level: `next (op next)*` over the given operator table
    fn parse_binary_level(
        &mut self,
        table: &[(TokenCode, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, LangError>,
    ) -> Result<Expr, LangError> {
        let mut left = next(self)?;
        loop {
            let code = self.peek_code()?;
            let Some(&(_, op)) = table.iter().find(|(c, _)| *c == code) else {
                return Ok(left);
            };
            let token = self.reader.skip_spaces()?;
            let right = next(self)?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                location: token.location,
            };
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, LangError> {
        self.parse_binary_level(
            &[
                (TokenCode::Eq, BinaryOp::Eq),
                (TokenCode::Ne, BinaryOp::Ne),
                (TokenCode::Lt, BinaryOp::Lt),
                (TokenCode::Le, BinaryOp::Le),
                (TokenCode::Gt, BinaryOp::Gt),
                (TokenCode::Ge, BinaryOp::Ge),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<Expr, LangError> {
        self.parse_binary_level(
            &[(TokenCode::Plus, BinaryOp::Add), (TokenCode::Minus, BinaryOp::Sub)],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, LangError> {
        self.parse_binary_level(
            &[(TokenCode::Star, BinaryOp::Mul), (TokenCode::Slash, BinaryOp::Div)],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expr, LangError> {
        if self.peek_code()? == TokenCode::Minus {
            self.reader.skip_spaces()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::Neg { operand: Box::new(operand) });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, LangError> {
        let token = self.reader.skip_spaces()?;
        match token.code {
            TokenCode::Number => {
                let text = token.text.unwrap_or_default();
                let value = text.parse::<f64>().map_err(|_| {
                    LangError::syntax_error(format!("Invalid number '{}'", text), token.location.clone())
                })?;
                Ok(Expr::number(value))
            }
            TokenCode::Id => Ok(Expr::Var {
                name: token.text.unwrap_or_default(),
                location: token.location,
            }),
            TokenCode::LParen => {
                let inner = self.parse_expr()?;
                self.expect(TokenCode::RParen, "Expected ')'")?;
                Ok(inner)
            }
            other => Err(LangError::syntax_error("Expected an expression", token.location)
                .with_help(format!("found {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, SourceLocation};
    use crate::lexer::tokenize;

    fn parser(source: &str) -> Parser<Lexer<'_>> {
        Parser::new(Lexer::new(source))
    }

    fn remaining(parser: Parser<Lexer<'_>>) -> Vec<TokenCode> {
        let mut reader = parser.into_reader();
        let mut codes = Vec::new();
        loop {
            let token = reader.get_token().unwrap();
            codes.push(token.code);
            if token.is(TokenCode::Eof) {
                return codes;
            }
        }
    }

    #[test]
    fn test_detect_loop_then_parse() {
        let mut p = parser("  LOOP outer: REPEAT");
        assert!(p.detect_loop_stmt().unwrap());
        assert!(p.detect_loop_stmt().unwrap());
        let stmt = p.parse_loop_stmt().unwrap();
        assert_eq!(stmt.id.as_deref(), Some("outer"));
        assert!(stmt.body.is_empty());
        assert_eq!(stmt.location, SourceLocation::new(1, 3));
    }

    #[test]
    fn test_failed_detect_leaves_alternative_intact() {
        let source = "  x = 1";
        let mut p = parser(source);
        assert!(!p.detect_loop_stmt().unwrap());
        assert!(p.detect_assign_stmt().unwrap());
        assert_eq!(remaining(p), tokenize(source).unwrap().into_iter().map(|t| t.code).collect::<Vec<_>>());
    }

    #[test]
    fn test_loop_requires_identifier() {
        let err = parser("LOOP : REPEAT").parse_loop_stmt().unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
        assert_eq!(err.message, "Expected loop identifier");
        assert_eq!(err.location, SourceLocation::new(1, 6));
    }

    #[test]
    fn test_loop_requires_colon() {
        let err = parser("LOOP a REPEAT").parse_loop_stmt().unwrap_err();
        assert_eq!(err.message, "Expected ':' after loop identifier");
    }

    #[test]
    fn test_missing_repeat_is_reported_after_body() {
        let err = parse_source("LOOP a:\n  x = 1;\n  PRINT x;\n").unwrap_err();
        assert_eq!(err.message, "Expected 'REPEAT' after loop body");
        assert_eq!(err.location, SourceLocation::new(4, 1));
    }

    #[test]
    fn test_body_errors_win_over_missing_repeat() {
        let err = parse_source("LOOP a: x = ;").unwrap_err();
        assert_eq!(err.message, "Expected an expression");
    }

    #[test]
    fn test_id_option_backtracks_one_token() {
        let mut p = parser("BREAK ;");
        assert_eq!(p.parse_break_stmt().unwrap().target.id, None);
        assert_eq!(remaining(p), vec![TokenCode::Semicolon, TokenCode::Eof]);

        let mut p = parser("BREAK outer;");
        assert_eq!(p.parse_break_stmt().unwrap().target.id.as_deref(), Some("outer"));
        assert_eq!(remaining(p), vec![TokenCode::Semicolon, TokenCode::Eof]);
    }

    #[test]
    fn test_id_list_tail_stops_before_semicolon() {
        let mut p = parser("a , b,c ;");
        let list = p.parse_id_list().unwrap();
        assert_eq!(list.ids, vec!["a", "b", "c"]);
        assert_eq!(remaining(p), vec![TokenCode::Space, TokenCode::Semicolon, TokenCode::Eof]);
    }

    #[test]
    fn test_id_list_tail_needs_comma_and_id() {
        let mut p = parser(", 5");
        assert!(!p.detect_id_list_tail().unwrap());
        assert!(p.parse_id_list_tail().unwrap().is_empty());
        assert_eq!(remaining(p), vec![TokenCode::Comma, TokenCode::Space, TokenCode::Number, TokenCode::Eof]);
    }

    #[test]
    fn test_statement_needs_semicolon() {
        let err = parse_source("x = 1\nPRINT x;").unwrap_err();
        assert_eq!(err.message, "Expected ';' after statement");
        assert_eq!(err.location, SourceLocation::new(2, 1));
    }

    #[test]
    fn test_stray_token_at_top_level() {
        let err = parse_source("x = 1; REPEAT;").unwrap_err();
        assert_eq!(err.message, "Expected a statement");
    }

    #[test]
    fn test_nested_loops_and_if() {
        let program = parse_source(
            "LOOP a:\n  LOOP b:\n    IF x > 1 THEN BREAK a; ELSE BREAK; END;\n  REPEAT;\nREPEAT;",
        )
        .unwrap();
        let Stmt::Loop(outer) = &program.body.stmts[0] else { panic!("expected loop") };
        let Stmt::Loop(inner) = &outer.body.stmts[0] else { panic!("expected inner loop") };
        let Stmt::If(cond) = &inner.body.stmts[0] else { panic!("expected IF") };
        assert!(cond.else_branch.is_some());
        assert_eq!(inner.id.as_deref(), Some("b"));
    }

    #[test]
    fn test_expression_precedence() {
        let stmt = parser("x = 1 + 2 * 3 < 10").parse_assign_stmt().unwrap();
        let Expr::Binary { op: BinaryOp::Lt, left, .. } = stmt.value else { panic!("expected comparison") };
        let Expr::Binary { op: BinaryOp::Add, right, .. } = *left else { panic!("expected addition") };
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_unary_minus_and_parens() {
        let stmt = parser("y = -(2 - 3)").parse_assign_stmt().unwrap();
        assert!(matches!(stmt.value, Expr::Neg { .. }));
    }
}
