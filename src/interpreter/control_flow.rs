// File: src/interpreter/control_flow.rs
//
// Control flow signals for loop statements.
//
// Every `execute` returns a ControlFlow. A BREAK produces Break(label) naming
// the loop at which unwinding stops; each enclosing statement list returns it
// unchanged without running further statements, and each enclosing loop
// either consumes it (its own label) or passes it outward.

use serde::Serialize;
use std::fmt;

/// Identity of an active loop on the loop-label stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum LoopLabel {
    Named(String),
    /// Fresh for every entry into an anonymous loop
    Anonymous(u64),
}

impl LoopLabel {
    pub fn is_named(&self, name: &str) -> bool {
        matches!(self, LoopLabel::Named(n) if n == name)
    }
}

impl fmt::Display for LoopLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoopLabel::Named(name) => f.write_str(name),
            LoopLabel::Anonymous(n) => write!(f, "<anonymous #{}>", n),
        }
    }
}

/// Result of executing a statement or statement list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlFlow {
    /// Normal execution, continue to next statement
    Completed,
    /// A break is unwinding toward the loop with this label
    Break(LoopLabel),
}

impl ControlFlow {
    pub fn is_break(&self) -> bool {
        matches!(self, ControlFlow::Break(_))
    }
}
