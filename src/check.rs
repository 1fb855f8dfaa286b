// File: src/check.rs
//
// Static BREAK target validation, run on the AST before interpretation.
//
// Walks every statement list with a stack of the enclosing loop labels and
// collects (rather than stops at) each BREAK that would fail at runtime:
// one outside any loop, or one naming a label no enclosing loop carries.

use crate::ast::{Program, Stmt, StmtList};
use crate::errors::LangError;
use tracing::warn;

pub struct LabelChecker {
    /// Enclosing loops, innermost last; None for anonymous loops
    labels: Vec<Option<String>>,
    errors: Vec<LangError>,
}

impl LabelChecker {
    pub fn new() -> Self {
        LabelChecker { labels: Vec::new(), errors: Vec::new() }
    }

    pub fn check(mut self, program: &Program) -> Result<(), Vec<LangError>> {
        self.check_list(&program.body);
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn check_list(&mut self, list: &StmtList) {
        for stmt in &list.stmts {
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Loop(loop_stmt) => {
                if let Some(ref id) = loop_stmt.id {
                    if self.labels.iter().flatten().any(|l| l == id) {
                        warn!(label = %id, location = %loop_stmt.location, "loop label shadows an enclosing loop");
                    }
                }
                self.labels.push(loop_stmt.id.clone());
                self.check_list(&loop_stmt.body);
                self.labels.pop();
            }
            Stmt::Break(brk) => {
                if self.labels.is_empty() {
                    self.errors.push(LangError::break_outside_loop(brk.location.clone()));
                } else if let Some(ref target) = brk.target.id {
                    if !self.labels.iter().flatten().any(|l| l == target) {
                        let named: Vec<String> = self.labels.iter().flatten().cloned().collect();
                        self.errors.push(LangError::undefined_label(target, &named, brk.location.clone()));
                    }
                }
            }
            Stmt::If(if_stmt) => {
                self.check_list(&if_stmt.then_branch);
                if let Some(ref else_branch) = if_stmt.else_branch {
                    self.check_list(else_branch);
                }
            }
            Stmt::Read(_) | Stmt::Print(_) | Stmt::Assign(_) => {}
        }
    }
}

impl Default for LabelChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate every BREAK in the program
pub fn check_labels(program: &Program) -> Result<(), Vec<LangError>> {
    LabelChecker::new().check(program)
}
