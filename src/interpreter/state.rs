// File: src/interpreter/state.rs
//
// ProgState: the execution context threaded through every `execute` call.
//
// It owns the loop-label stack, the symbol table and the numeric I/O
// endpoints. The loop-label stack always holds exactly one entry per loop
// that is currently executing, innermost last.

use super::control_flow::LoopLabel;
use super::environment::SymbolTable;
use super::io::{NumberInput, Output};
use crate::errors::{LangError, SourceLocation};
use tracing::debug;

pub struct ProgState {
    loop_stack: Vec<LoopLabel>,
    next_anonymous: u64,
    pub symbols: SymbolTable,
    pub input: NumberInput,
    pub output: Output,
    pub max_loop_iterations: Option<u64>,
}

impl ProgState {
    pub fn new() -> Self {
        ProgState {
            loop_stack: Vec::new(),
            next_anonymous: 0,
            symbols: SymbolTable::new(),
            input: NumberInput::stdin(),
            output: Output::Stdout,
            max_loop_iterations: None,
        }
    }

    /// Label for one entry into a loop; anonymous loops get a new id each time
    pub fn loop_label(&mut self, id: Option<&str>) -> LoopLabel {
        match id {
            Some(name) => LoopLabel::Named(name.to_string()),
            None => {
                self.next_anonymous += 1;
                LoopLabel::Anonymous(self.next_anonymous)
            }
        }
    }

    pub fn push_loop(&mut self, label: LoopLabel) {
        self.loop_stack.push(label);
    }

    pub fn loop_depth(&self) -> usize {
        self.loop_stack.len()
    }

    /// Drop every loop entered at or below `depth`
    pub fn truncate_loops(&mut self, depth: usize) {
        self.loop_stack.truncate(depth);
    }

    /// Unwind the loop-label stack for a BREAK and return the label of the
    /// loop the break terminates.
    ///
    /// Without a target exactly one entry is popped. With a target, entries
    /// are popped up to and including the innermost loop with that name. When
    /// the target cannot be found the stack is left untouched.
    pub fn pop_loop_id(
        &mut self,
        target: Option<&str>,
        location: &SourceLocation,
    ) -> Result<LoopLabel, LangError> {
        if self.loop_stack.is_empty() {
            return Err(LangError::break_outside_loop(location.clone()));
        }

        let keep = match target {
            None => self.loop_stack.len() - 1,
            Some(name) => match self.loop_stack.iter().rposition(|l| l.is_named(name)) {
                Some(index) => index,
                None => {
                    let active: Vec<String> = self
                        .loop_stack
                        .iter()
                        .filter_map(|l| match l {
                            LoopLabel::Named(n) => Some(n.clone()),
                            LoopLabel::Anonymous(_) => None,
                        })
                        .collect();
                    return Err(LangError::undefined_label(name, &active, location.clone()));
                }
            },
        };

        let mut popped = self.loop_stack.split_off(keep);
        debug!(levels = popped.len(), "break unwinding loop stack");
        // split_off leaves at least one element since keep < len
        Ok(popped.swap_remove(0))
    }
}

impl Default for ProgState {
    fn default() -> Self {
        Self::new()
    }
}
