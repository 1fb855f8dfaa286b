// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for DCL.
// Defines the structure of parsed DCL programs.
//
// Statements (Stmt) are grouped into statement lists; loops own their body
// list. Expressions (Expr) only ever produce numbers. Every node serializes
// to JSON for the `dcl ast` command.

use crate::errors::SourceLocation;
use serde::Serialize;

/// A whole program: the top-level statement list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub body: StmtList,
}

/// Statements executed in order until one of them breaks out
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StmtList {
    pub stmts: Vec<Stmt>,
}

impl StmtList {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        StmtList { stmts }
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Stmt {
    Loop(LoopStmt),
    Break(BreakStmt),
    Read(IdList),
    Print(IdList),
    If(IfStmt),
    Assign(AssignStmt),
}

/// `LOOP id : body REPEAT`. Loops built from source are always named;
/// `id: None` is an anonymous loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopStmt {
    pub id: Option<String>,
    pub body: StmtList,
    pub location: SourceLocation,
}

impl LoopStmt {
    pub fn named(id: impl Into<String>, body: StmtList) -> Self {
        LoopStmt { id: Some(id.into()), body, location: SourceLocation::unknown() }
    }

    pub fn anonymous(body: StmtList) -> Self {
        LoopStmt { id: None, body, location: SourceLocation::unknown() }
    }
}

/// Optional identifier after BREAK: the loop to leave, or the innermost one
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IdOption {
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakStmt {
    pub target: IdOption,
    pub location: SourceLocation,
}

impl BreakStmt {
    pub fn new(target: Option<&str>) -> Self {
        BreakStmt {
            target: IdOption { id: target.map(str::to_string) },
            location: SourceLocation::unknown(),
        }
    }
}

/// Identifiers of a READ or PRINT statement, in source order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdList {
    pub ids: Vec<String>,
    pub location: SourceLocation,
}

impl IdList {
    pub fn new(ids: &[&str]) -> Self {
        IdList {
            ids: ids.iter().map(|id| id.to_string()).collect(),
            location: SourceLocation::unknown(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: StmtList,
    pub else_branch: Option<StmtList>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignStmt {
    pub name: String,
    pub value: Expr,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Expr {
    Number { value: f64 },
    Var { name: String, location: SourceLocation },
    Neg { operand: Box<Expr> },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        location: SourceLocation,
    },
}

impl Expr {
    pub fn number(value: f64) -> Self {
        Expr::Number { value }
    }
}
