//! Boolean expression trees.
//!
//! An [`Expr`] is built once per formula and never mutated afterwards, so a single
//! tree can be shared by reference between all concurrent evaluations of a search.

use std::collections::HashSet;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// Deepest tree the parser builds and a search accepts.
///
/// Evaluation, display and drop all recurse over the tree, so this keeps them
/// well within the stack of a worker thread.
pub const MAX_DEPTH: usize = 512;

/// A boolean formula over named variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Reference to a variable.
    Var(String),
    /// Negation
    Not(Box<Expr>),
    /// Conjunction
    And(Box<Expr>, Box<Expr>),
    /// Disjunction
    Or(Box<Expr>, Box<Expr>),
    /// Explicit parentheses. Semantically transparent.
    Group(Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(value: Self) -> Self {
        Expr::Not(Box::new(value))
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Expr::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Expr::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn group(value: Self) -> Self {
        Expr::Group(Box::new(value))
    }
}

impl Expr {
    /// Depth of the expression tree (0 for leaves).
    ///
    /// Walks the tree with an explicit stack, so it is safe on trees of any depth.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 0)];
        while let Some((expr, depth)) = stack.pop() {
            max = max.max(depth);
            match expr {
                Expr::Var(_) => {}
                Expr::Not(e) | Expr::Group(e) => stack.push((&**e, depth + 1)),
                Expr::And(l, r) | Expr::Or(l, r) => {
                    stack.push((&**l, depth + 1));
                    stack.push((&**r, depth + 1));
                }
            }
        }
        max
    }

    /// Size of the expression tree (number of nodes).
    pub fn size(&self) -> usize {
        match self {
            Expr::Var(_) => 1,
            Expr::Not(e) | Expr::Group(e) => 1 + e.size(),
            Expr::And(l, r) | Expr::Or(l, r) => 1 + l.size() + r.size(),
        }
    }

    /// Variable names in order of first appearance, without duplicates.
    pub fn variables(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        self.collect_variables(&mut seen, &mut names);
        names
    }

    fn collect_variables<'a>(&'a self, seen: &mut HashSet<&'a str>, names: &mut Vec<&'a str>) {
        match self {
            Expr::Var(name) => {
                if seen.insert(name.as_str()) {
                    names.push(name.as_str());
                }
            }
            Expr::Not(e) | Expr::Group(e) => e.collect_variables(seen, names),
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.collect_variables(seen, names);
                r.collect_variables(seen, names);
            }
        }
    }

    /// Binding strength used when printing; higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Or(..) => 1,
            Expr::And(..) => 2,
            Expr::Not(_) | Expr::Var(_) | Expr::Group(_) => 3,
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Self::Output {
        Expr::not(self)
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Self) -> Self::Output {
        Expr::and(self, rhs)
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Self) -> Self::Output {
        Expr::or(self, rhs)
    }
}

/// Writes `child`, adding parentheses when it binds looser than `min`.
fn write_operand(f: &mut fmt::Formatter<'_>, child: &Expr, min: u8) -> fmt::Result {
    if child.precedence() < min {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Group(e) => write!(f, "({})", e),
            Expr::Not(e) => {
                write!(f, "!")?;
                write_operand(f, e, 3)
            }
            Expr::And(l, r) | Expr::Or(l, r) => {
                let prec = self.precedence();
                let op = if matches!(self, Expr::And(..)) { "&&" } else { "||" };
                write_operand(f, l, prec)?;
                write!(f, " {} ", op)?;
                // Operators are left-associative, so a right operand of equal
                // precedence needs parentheses to keep its shape.
                write_operand(f, r, prec + 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_operators_build_tree() {
        let a = Expr::var("a");
        let b = Expr::var("b");
        let c = Expr::var("c");
        let f = (a.clone() & b.clone()) | !c.clone();
        assert_eq!(f, Expr::or(Expr::and(a, b), Expr::not(c)));
    }

    #[test]
    fn test_depth_and_size() {
        assert_eq!(Expr::var("x").depth(), 0);
        assert_eq!(Expr::var("x").size(), 1);

        let f = Expr::group(Expr::var("x") & !Expr::var("y"));
        assert_eq!(f.depth(), 3);
        assert_eq!(f.size(), 5);
    }

    #[test]
    fn test_depth_of_long_chain() {
        let mut f = Expr::var("x");
        for _ in 0..2 * MAX_DEPTH {
            f = !f;
        }
        assert_eq!(f.depth(), 2 * MAX_DEPTH);
    }

    #[test]
    fn test_variables_first_appearance() {
        let f = (Expr::var("b") & Expr::var("a")) | (!Expr::var("b") & Expr::var("c"));
        assert_eq!(f.variables(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_display() {
        let a = Expr::var("a");
        let b = Expr::var("b");
        let c = Expr::var("c");

        let f = (a.clone() & b.clone()) | !c.clone();
        assert_eq!(f.to_string(), "a && b || !c");

        let g = (a.clone() | b.clone()) & c.clone();
        assert_eq!(g.to_string(), "(a || b) && c");

        let h = !(a.clone() & b.clone());
        assert_eq!(h.to_string(), "!(a && b)");

        let k = a.clone() & (b.clone() & c.clone());
        assert_eq!(k.to_string(), "a && (b && c)");

        let grouped = Expr::group(a | b) & c;
        assert_eq!(grouped.to_string(), "(a || b) && c");
    }
}
