// File: src/repl.rs
//
// Interactive REPL (Read-Eval-Print Loop) for DCL.
// Provides an interactive shell for executing DCL code with features like:
// - Multi-line input while a LOOP or IF is still open
// - Command history with up/down arrow navigation
// - Special commands (:help, :quit, :vars, :reset)
// - A symbol table that persists across inputs

use crate::config::RunConfig;
use crate::interpreter::{format_number, Interpreter};
use crate::lexer::{tokenize, TokenCode};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// REPL session that maintains interpreter state and handles user interaction
pub struct Repl {
    interpreter: Interpreter,
    config: RunConfig,
    editor: DefaultEditor,
}

impl Repl {
    /// Creates a new REPL session with a fresh interpreter
    pub fn new(config: &RunConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let editor = DefaultEditor::new()?;
        Ok(Repl {
            interpreter: Interpreter::with_config(config),
            config: config.clone(),
            editor,
        })
    }

    fn show_banner(&self) {
        println!("{}", format!("DCL REPL v{}", env!("CARGO_PKG_VERSION")).bright_cyan().bold());
        println!(
            "  Type {} for commands or {} to exit. Statements end with ';'.",
            ":help".bright_yellow(),
            ":quit".bright_yellow()
        );
        println!();
    }

    /// Starts the REPL loop
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.show_banner();

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() {
                "dcl> ".bright_green().to_string()
            } else {
                "...> ".bright_blue().to_string()
            };

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());

                    if buffer.is_empty() && line.trim().starts_with(':') {
                        if self.handle_command(line.trim()) {
                            continue;
                        } else {
                            break;
                        }
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    if is_input_complete(&buffer) {
                        self.eval_input(&buffer);
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C (input discarded, :quit to exit)".bright_yellow());
                    buffer.clear();
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }

    /// Handles special REPL commands starting with ':'
    /// Returns true to continue REPL, false to quit
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":help" | ":h" => {
                self.show_help();
                true
            }
            ":quit" | ":q" | ":exit" => {
                println!("{}", "Goodbye!".bright_cyan());
                false
            }
            ":vars" | ":v" => {
                self.show_variables();
                true
            }
            ":reset" | ":r" => {
                self.interpreter = Interpreter::with_config(&self.config);
                println!("{}", "✓ Symbol table cleared".bright_green());
                true
            }
            _ => {
                println!(
                    "{} Unknown command: {}. Type {} for available commands.",
                    "Error:".bright_red(),
                    cmd.bright_yellow(),
                    ":help".bright_yellow()
                );
                true
            }
        }
    }

    fn show_help(&self) {
        println!();
        println!("{}", "REPL Commands:".bright_cyan().bold());
        println!("  {}  Display this help message", ":help  :h".bright_yellow());
        println!("  {}  Exit the REPL", ":quit  :q".bright_yellow());
        println!("  {}  Show bound identifiers", ":vars  :v".bright_yellow());
        println!("  {}  Clear all identifiers", ":reset :r".bright_yellow());
        println!();
        println!("{}", "Example:".bright_cyan().bold());
        println!("  {}", "dcl> n = 3;".dimmed());
        println!("  {}", "dcl> LOOP count:".dimmed());
        println!("  {}", "...>   PRINT n; n = n - 1;".dimmed());
        println!("  {}", "...>   IF n == 0 THEN BREAK count; END;".dimmed());
        println!("  {}", "...> REPEAT;".dimmed());
        println!();
    }

    fn show_variables(&self) {
        let symbols = self.interpreter.symbols();
        if symbols.is_empty() {
            println!("  {}", "(no identifiers bound)".dimmed());
            return;
        }
        for name in symbols.names() {
            if let Some(value) = symbols.get(&name) {
                println!("  {} = {}", name.bright_yellow(), format_number(value));
            }
        }
    }

    fn eval_input(&mut self, input: &str) {
        if input.trim().is_empty() {
            return;
        }
        if let Err(err) = self.interpreter.run_source(input) {
            eprint!("{}", err);
        }
    }
}

/// Input is complete once every LOOP has its REPEAT and every IF its END.
/// Input that does not even tokenize is complete so the error gets shown.
pub fn is_input_complete(input: &str) -> bool {
    let Ok(tokens) = tokenize(input) else {
        return true;
    };

    let mut open: i64 = 0;
    for token in &tokens {
        match token.code {
            TokenCode::Loop | TokenCode::If => open += 1,
            TokenCode::Repeat | TokenCode::End => open -= 1,
            _ => {}
        }
    }
    open <= 0
}
