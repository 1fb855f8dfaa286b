// File: src/interpreter/exec.rs
//
// Tree-walking execution of DCL statements and evaluation of expressions.
//
// Every statement executes against an explicit ProgState and reports how it
// finished through ControlFlow. A statement list stops at the first Break and
// returns it; a loop repeats its body until a Break arrives, consumes the
// Break if it names the loop, and passes it outward otherwise.

use super::control_flow::{ControlFlow, LoopLabel};
use super::io::format_number;
use super::state::ProgState;
use crate::ast::{
    AssignStmt, BinaryOp, BreakStmt, Expr, IdList, IdOption, IfStmt, LoopStmt, Stmt, StmtList,
};
use crate::errors::{ErrorKind, LangError, SourceLocation};
use tracing::debug;

impl StmtList {
    pub fn execute(&self, state: &mut ProgState) -> Result<ControlFlow, LangError> {
        for stmt in &self.stmts {
            let flow = stmt.execute(state)?;
            if flow.is_break() {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Completed)
    }
}

impl Stmt {
    pub fn execute(&self, state: &mut ProgState) -> Result<ControlFlow, LangError> {
        match self {
            Stmt::Loop(stmt) => stmt.execute(state),
            Stmt::Break(stmt) => stmt.execute(state),
            Stmt::Read(ids) => {
                ids.read(state)?;
                Ok(ControlFlow::Completed)
            }
            Stmt::Print(ids) => {
                ids.print(state)?;
                Ok(ControlFlow::Completed)
            }
            Stmt::If(stmt) => stmt.execute(state),
            Stmt::Assign(stmt) => {
                stmt.execute(state)?;
                Ok(ControlFlow::Completed)
            }
        }
    }
}

impl LoopStmt {
    pub fn execute(&self, state: &mut ProgState) -> Result<ControlFlow, LangError> {
        let label = state.loop_label(self.id.as_deref());
        let depth = state.loop_depth();
        state.push_loop(label.clone());
        debug!(%label, depth, "entering loop");

        let outcome = self.repeat_body(&label, state);
        if outcome.is_err() {
            // Leave the stack as it was before this loop started
            state.truncate_loops(depth);
        }
        let flow = outcome?;

        debug_assert!(state.loop_depth() <= depth);
        debug!(%label, "leaving loop");
        Ok(flow)
    }

    fn repeat_body(&self, label: &LoopLabel, state: &mut ProgState) -> Result<ControlFlow, LangError> {
        let mut iterations: u64 = 0;
        loop {
            match self.body.execute(state)? {
                ControlFlow::Completed => {
                    iterations += 1;
                    if let Some(limit) = state.max_loop_iterations {
                        if iterations > limit {
                            return Err(LangError::new(
                                ErrorKind::IterationLimit,
                                format!("Loop '{}' reached its limit of {} iterations", label, limit),
                                self.location.clone(),
                            )
                            .with_help("add a BREAK or raise run.max_loop_iterations"));
                        }
                    }
                }
                ControlFlow::Break(target) if &target == label => {
                    return Ok(ControlFlow::Completed);
                }
                flow @ ControlFlow::Break(_) => return Ok(flow),
            }
        }
    }
}

impl IdOption {
    /// Unwind the loop stack for this break target; see `ProgState::pop_loop_id`
    pub fn pop_loop_id(&self, state: &mut ProgState, location: &SourceLocation) -> Result<LoopLabel, LangError> {
        state.pop_loop_id(self.id.as_deref(), location)
    }
}

impl BreakStmt {
    pub fn execute(&self, state: &mut ProgState) -> Result<ControlFlow, LangError> {
        let label = self.target.pop_loop_id(state, &self.location)?;
        Ok(ControlFlow::Break(label))
    }
}

impl IdList {
    /// Bind one number from input to each identifier, in order
    pub fn read(&self, state: &mut ProgState) -> Result<(), LangError> {
        for id in &self.ids {
            let value = state.input.next_number(&self.location)?;
            state.symbols.set(id, value);
        }
        Ok(())
    }

    /// Write each identifier's value on its own line, in order
    pub fn print(&self, state: &mut ProgState) -> Result<(), LangError> {
        for id in &self.ids {
            let value = state.symbols.lookup(id, &self.location)?;
            state.output.write_line(&format_number(value)).map_err(|e| {
                LangError::new(ErrorKind::IoError, format!("Failed to write output: {}", e), self.location.clone())
            })?;
        }
        Ok(())
    }
}

impl IfStmt {
    pub fn execute(&self, state: &mut ProgState) -> Result<ControlFlow, LangError> {
        if self.condition.eval(state)? != 0.0 {
            self.then_branch.execute(state)
        } else if let Some(ref else_branch) = self.else_branch {
            else_branch.execute(state)
        } else {
            Ok(ControlFlow::Completed)
        }
    }
}

impl AssignStmt {
    pub fn execute(&self, state: &mut ProgState) -> Result<(), LangError> {
        let value = self.value.eval(state)?;
        state.symbols.set(&self.name, value);
        Ok(())
    }
}

impl Expr {
    pub fn eval(&self, state: &ProgState) -> Result<f64, LangError> {
        match self {
            Expr::Number { value } => Ok(*value),
            Expr::Var { name, location } => state.symbols.lookup(name, location),
            Expr::Neg { operand } => Ok(-operand.eval(state)?),
            Expr::Binary { left, op, right, location } => {
                let l = left.eval(state)?;
                let r = right.eval(state)?;
                let truth = |b: bool| if b { 1.0 } else { 0.0 };
                Ok(match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => {
                        if r == 0.0 {
                            return Err(LangError::new(
                                ErrorKind::DivisionByZero,
                                "Division by zero",
                                location.clone(),
                            ));
                        }
                        l / r
                    }
                    BinaryOp::Eq => truth(l == r),
                    BinaryOp::Ne => truth(l != r),
                    BinaryOp::Lt => truth(l < r),
                    BinaryOp::Le => truth(l <= r),
                    BinaryOp::Gt => truth(l > r),
                    BinaryOp::Ge => truth(l >= r),
                })
            }
        }
    }
}
