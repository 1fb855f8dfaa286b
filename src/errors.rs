// File: src/errors.rs
//
// Error handling and reporting for DCL.
// Provides one structured error type with source location information
// and a pretty-printed, compiler-style rendering.

use colored::Colorize;
use serde::Serialize;
use std::fmt;

/// Source location information for tracking where code appears in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column, file: None }
    }

    pub fn unknown() -> Self {
        Self { line: 0, column: 0, file: None }
    }

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Types of errors that can occur while lexing, parsing or executing DCL
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("Lex Error")]
    LexError,
    #[error("Syntax Error")]
    SyntaxError,
    #[error("Break Outside Loop")]
    BreakOutsideLoop,
    #[error("Undefined Loop Label")]
    UndefinedLabel,
    #[error("Unbound Identifier")]
    UnboundIdentifier,
    #[error("Input Error")]
    InputError,
    #[error("Division By Zero")]
    DivisionByZero,
    #[error("Iteration Limit")]
    IterationLimit,
    #[error("I/O Error")]
    IoError,
}

/// A structured error with location information
#[derive(Debug, Clone)]
pub struct LangError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
    pub source_line: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
}

impl LangError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
            source_line: None,
            suggestion: None,
            help: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Fill in the offending source line and file name from the program text
    pub fn attach_source(mut self, file: Option<&str>, source: &str) -> Self {
        if self.location.is_known() {
            if let Some(line) = source.lines().nth(self.location.line - 1) {
                self.source_line = Some(line.to_string());
            }
            if self.location.file.is_none() {
                self.location.file = file.map(str::to_string);
            }
        }
        self
    }

    pub fn lex_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::LexError, message, location)
    }

    pub fn syntax_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::SyntaxError, message, location)
    }

    pub fn break_outside_loop(location: SourceLocation) -> Self {
        Self::new(ErrorKind::BreakOutsideLoop, "BREAK used outside of any loop", location)
    }

    /// A named break whose label is not an enclosing loop
    pub fn undefined_label(name: &str, active: &[String], location: SourceLocation) -> Self {
        let err = Self::new(
            ErrorKind::UndefinedLabel,
            format!("No enclosing loop is labeled '{}'", name),
            location,
        );
        match find_closest_match(name, active) {
            Some(close) => err.with_suggestion(close.to_string()),
            None => err,
        }
    }

    pub fn unbound_identifier(name: &str, known: &[String], location: SourceLocation) -> Self {
        let err = Self::new(
            ErrorKind::UnboundIdentifier,
            format!("Identifier '{}' is not bound", name),
            location,
        );
        match find_closest_match(name, known) {
            Some(close) => err.with_suggestion(close.to_string()),
            None => err.with_help("assign it or READ it before use"),
        }
    }

    pub fn input_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::InputError, message, location)
    }
}

impl fmt::Display for LangError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Error header with kind and message
        let kind_str = format!("{}", self.kind);
        writeln!(f, "{}: {}", kind_str.red().bold(), self.message.bold())?;

        if self.location.is_known() {
            let location_str = format!("  --> {}", self.location);
            writeln!(f, "{}", location_str.bright_blue())?;
        }

        // Source code context
        if let Some(ref source) = self.source_line {
            let line_num = self.location.line;
            let col_num = self.location.column;

            writeln!(f, "   {}", "|".bright_blue())?;
            writeln!(
                f,
                "{} {} {}",
                format!("{:3}", line_num).bright_blue(),
                "|".bright_blue(),
                source
            )?;
            writeln!(
                f,
                "   {} {}{}",
                "|".bright_blue(),
                " ".repeat(col_num.saturating_sub(1)),
                "^".red().bold()
            )?;
            writeln!(f, "   {}", "|".bright_blue())?;
        }

        if let Some(ref help) = self.help {
            writeln!(
                f,
                "   {} {}",
                "=".bright_yellow(),
                format!("help: {}", help).bright_yellow()
            )?;
        }

        if let Some(ref suggestion) = self.suggestion {
            writeln!(
                f,
                "   {} {}",
                "=".bright_green(),
                format!("Did you mean '{}'?", suggestion).bright_green()
            )?;
        }

        Ok(())
    }
}

impl std::error::Error for LangError {}

/// Computes the Levenshtein distance between two strings
/// Used for "Did you mean?" suggestions
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single rolling row
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut diagonal = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            let next = (row[j] + 1).min(row[j - 1] + 1).min(diagonal + cost);
            diagonal = row[j];
            row[j] = next;
        }
    }

    row[b.len()]
}

/// Find the closest match from a list of candidates using Levenshtein distance
/// Returns None if no good match is found (distance > 2)
pub fn find_closest_match<'a>(target: &str, candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (levenshtein_distance(target, c), c))
        .filter(|(distance, c)| *distance <= 2 && c.as_str() != target)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, c)| c.as_str())
}
