use crate::assignment::Assignment;
use crate::ast::Expr;
use crate::error::{Error, Result};

/// Evaluates `expr` under `assignment`.
///
/// Both operands of `&&` and `||` are always evaluated. Leaves are plain
/// lookups, so skipping the right-hand side would only save time, and
/// evaluating it means a missing variable is reported no matter what the
/// left-hand side evaluates to.
///
/// # Errors
///
/// Returns [`Error::UndefinedVariable`] for the first identifier (in
/// left-to-right order) that has no value in `assignment`.
pub fn evaluate(expr: &Expr, assignment: &Assignment) -> Result<bool> {
    match expr {
        Expr::Var(name) => assignment
            .get(name)
            .ok_or_else(|| Error::UndefinedVariable(name.clone())),
        Expr::Not(e) => Ok(!evaluate(e, assignment)?),
        Expr::And(l, r) => {
            let l = evaluate(l, assignment)?;
            let r = evaluate(r, assignment)?;
            Ok(l & r)
        }
        Expr::Or(l, r) => {
            let l = evaluate(l, assignment)?;
            let r = evaluate(r, assignment)?;
            Ok(l | r)
        }
        Expr::Group(e) => evaluate(e, assignment),
    }
}

impl Expr {
    pub fn eval(&self, assignment: &Assignment) -> Result<bool> {
        evaluate(self, assignment)
    }
}
