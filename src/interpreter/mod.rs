// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for DCL.
// Executes DCL programs by traversing the Abstract Syntax Tree (AST).
//
// All mutable execution state lives in one ProgState that is passed by
// reference into every `execute` call:
// - the loop-label stack used to resolve BREAK targets
// - the flat symbol table mapping identifiers to numbers
// - the numeric input read by READ and the output written by PRINT
//
// Non-local exits use the ControlFlow value returned by each `execute`
// rather than unwinding or a shared flag.

mod control_flow;
mod environment;
mod exec;
mod io;
mod state;

pub use control_flow::{ControlFlow, LoopLabel};
pub use environment::SymbolTable;
pub use io::{format_number, NumberInput, Output};
pub use state::ProgState;

use crate::ast::Program;
use crate::check::check_labels;
use crate::config::RunConfig;
use crate::errors::LangError;
use crate::parser::parse_source;
use std::io::BufRead;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Main interpreter that parses and executes DCL programs
pub struct Interpreter {
    state: ProgState,
    check_labels: bool,
    source_file: Option<String>,
}

impl Interpreter {
    /// Creates a new interpreter reading stdin and writing stdout
    pub fn new() -> Self {
        Self::with_config(&RunConfig::default())
    }

    pub fn with_config(config: &RunConfig) -> Self {
        let mut state = ProgState::new();
        state.max_loop_iterations = config.max_loop_iterations;
        Interpreter { state, check_labels: config.check_labels, source_file: None }
    }

    /// Sets the output sink for PRINT statements (used for testing)
    pub fn set_output(&mut self, output: Arc<Mutex<Vec<u8>>>) {
        self.state.output = Output::Buffer(output);
    }

    /// Sets the source of numbers for READ statements
    pub fn set_input(&mut self, input: impl BufRead + 'static) {
        self.state.input = NumberInput::from_reader(input);
    }

    /// File name used when rendering diagnostics
    pub fn set_source_file(&mut self, file: impl Into<String>) {
        self.source_file = Some(file.into());
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.state.symbols
    }

    pub fn state(&self) -> &ProgState {
        &self.state
    }

    /// Parse, label-check and run `source`. Errors carry the offending line.
    pub fn run_source(&mut self, source: &str) -> Result<(), LangError> {
        let file = self.source_file.clone();
        let attach = |err: LangError| err.attach_source(file.as_deref(), source);

        let program = parse_source(source).map_err(attach)?;
        if self.check_labels {
            if let Err(errors) = check_labels(&program) {
                // Report the first; `dcl check` lists them all
                if let Some(first) = errors.into_iter().next() {
                    return Err(attach(first));
                }
            }
        }
        self.execute(&program).map_err(attach)
    }

    /// Run an already parsed program against the current state
    pub fn execute(&mut self, program: &Program) -> Result<(), LangError> {
        info!(statements = program.body.stmts.len(), "executing program");
        let flow = program.body.execute(&mut self.state);
        // Stale loop entries must not leak into the next REPL input
        self.state.truncate_loops(0);
        match flow? {
            ControlFlow::Completed => {}
            ControlFlow::Break(label) => {
                debug!(%label, "break escaped the top-level statement list");
            }
        }
        info!(symbols = self.state.symbols.len(), "program finished");
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
