//! Truth assignments and their enumeration.
//!
//! A [`VariableSet`] fixes an order over variable names. Candidate `i` of the
//! hypercube assigns to the variable at position `j` the value of bit `j` of `i`:
//!
//! ```text
//! variables = [a, b, c]
//! i = 0b000 -> {a: false, b: false, c: false}
//! i = 0b001 -> {a: true,  b: false, c: false}
//! i = 0b110 -> {a: false, b: true,  c: true}
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;

use crate::ast::Expr;
use crate::error::{Error, Result};

/// Largest variable set whose hypercube can be indexed with `u64`.
pub const MAX_VARIABLES: usize = 63;

/// A mapping from variable names to truth values.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    values: BTreeMap<String, bool>,
    // Display order. Empty when built directly from pairs.
    order: Vec<String>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: bool) -> Option<bool> {
        self.values.insert(name.into(), value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(name, value)` pairs, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.values.iter().map(|(name, &value)| (name.as_str(), value))
    }
}

// Equality ignores the display order.
impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for Assignment {}

impl Hash for Assignment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        let mut assignment = Assignment::new();
        for (name, value) in iter {
            assignment.insert(name, value);
        }
        assignment
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        let mut entry = |f: &mut fmt::Formatter<'_>, name: &str, value: bool| {
            let sep = if first { "" } else { ", " };
            first = false;
            write!(f, "{}{}: {}", sep, name, value)
        };
        if self.order.len() == self.values.len() {
            for name in self.order.iter() {
                entry(f, name, self.values[name])?;
            }
        } else {
            for (name, value) in self.iter() {
                entry(f, name, value)?;
            }
        }
        write!(f, "}}")
    }
}

/// Ordered, deduplicated list of the variables a search ranges over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableSet {
    names: Vec<String>,
}

impl VariableSet {
    /// Creates a variable set, keeping the first occurrence of each name.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| seen.insert(name.clone()))
            .collect();
        VariableSet { names }
    }

    /// Variables of `expr`, in order of first appearance.
    pub fn from_expr(expr: &Expr) -> Self {
        VariableSet::new(expr.variables())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Number of candidate assignments, `2^n`.
    pub fn space_size(&self) -> Result<u64> {
        if self.names.len() > MAX_VARIABLES {
            return Err(Error::TooManyVariables {
                count: self.names.len(),
                max: MAX_VARIABLES,
            });
        }
        Ok(1u64 << self.names.len())
    }

    /// Builds candidate `index` of the hypercube.
    ///
    /// Bits of `index` above position `n` are ignored.
    pub fn assignment(&self, index: u64) -> Assignment {
        let values = self
            .names
            .iter()
            .enumerate()
            .map(|(j, name)| (name.clone(), (index >> j) & 1 == 1))
            .collect();
        Assignment {
            values,
            order: self.names.clone(),
        }
    }

    /// Lazily enumerates all `2^n` assignments.
    ///
    /// Each call starts a fresh enumeration.
    pub fn assignments(&self) -> Result<Assignments<'_>> {
        let end = self.space_size()?;
        Ok(Assignments {
            variables: self,
            next: 0,
            end,
        })
    }
}

impl<S: Into<String>> FromIterator<S> for VariableSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        VariableSet::new(iter)
    }
}

/// Iterator over the boolean hypercube of a [`VariableSet`].
#[derive(Debug, Clone)]
pub struct Assignments<'a> {
    variables: &'a VariableSet,
    next: u64,
    end: u64,
}

impl Iterator for Assignments<'_> {
    type Item = Assignment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let assignment = self.variables.assignment(self.next);
        self.next += 1;
        Some(assignment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Assignments<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_variable_set_dedup() {
        let vars = VariableSet::new(["b", "a", "b", "c", "a"]);
        assert_eq!(vars.names(), &["b", "a", "c"]);
        assert_eq!(vars.position("c"), Some(2));
        assert_eq!(vars.position("z"), None);
    }

    #[test]
    fn test_assignment_bits() {
        let vars = VariableSet::new(["a", "b", "c"]);
        let x = vars.assignment(0b110);
        assert_eq!(x.get("a"), Some(false));
        assert_eq!(x.get("b"), Some(true));
        assert_eq!(x.get("c"), Some(true));
        assert_eq!(x.get("d"), None);
    }

    #[test]
    fn test_hypercube_coverage() {
        for n in 0..=8 {
            let names: Vec<String> = (0..n).map(|i| format!("x{}", i)).collect();
            let vars = VariableSet::new(names);
            let all: Vec<Assignment> = vars.assignments().unwrap().collect();
            assert_eq!(all.len(), 1 << n);

            let distinct: HashSet<Vec<bool>> = all
                .iter()
                .map(|a| vars.names().iter().map(|name| a.get(name).unwrap()).collect())
                .collect();
            assert_eq!(distinct.len(), 1 << n, "duplicates for n = {}", n);
            assert!(all.iter().all(|a| a.len() == n));
        }
    }

    #[test]
    fn test_assignments_restartable() {
        let vars = VariableSet::new(["p", "q"]);
        let first: Vec<_> = vars.assignments().unwrap().collect();
        let second: Vec<_> = vars.assignments().unwrap().collect();
        assert_eq!(first, second);

        let mut iter = vars.assignments().unwrap();
        assert_eq!(iter.size_hint(), (4, Some(4)));
        iter.next();
        assert_eq!(iter.size_hint(), (3, Some(3)));
        assert_eq!(iter.count(), 3);
    }

    #[test]
    fn test_too_many_variables() {
        let vars = VariableSet::new((0..64).map(|i| format!("v{}", i)));
        assert!(matches!(
            vars.space_size(),
            Err(Error::TooManyVariables { count: 64, max: MAX_VARIABLES })
        ));

        let vars = VariableSet::new((0..63).map(|i| format!("v{}", i)));
        assert_eq!(vars.space_size().unwrap(), 1 << 63);
    }

    #[test]
    fn test_display_follows_variable_order() {
        let vars = VariableSet::new(["c", "a", "b"]);
        assert_eq!(vars.assignment(0b001).to_string(), "{c: true, a: false, b: false}");

        let x: Assignment = [("b", true), ("a", false)].into_iter().collect();
        assert_eq!(x.to_string(), "{a: false, b: true}");
    }

    #[test]
    fn test_build_by_insert() {
        let mut x = Assignment::new();
        assert!(x.is_empty());
        assert_eq!(x.insert("a", true), None);
        assert_eq!(x.insert("b", false), None);
        assert_eq!(x.insert("a", false), Some(true));
        assert_eq!(x.len(), 2);
        assert_eq!(x.get("a"), Some(false));
        assert_eq!(x.get("c"), None);

        // Equal to the same candidate from a variable set, whatever the display order.
        let vars = VariableSet::new(["b", "a"]);
        assert_eq!(x, vars.assignment(0b00));
    }
}
