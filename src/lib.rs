// File: src/lib.rs
//
// Library interface for the DCL interpreter.
// Exposes modules for integration testing and external use.

pub mod ast;
pub mod check;
pub mod config;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod lookahead;
pub mod parser;
pub mod repl;
