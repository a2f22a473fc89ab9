//! # brute-sat: brute-force satisfiability search for boolean formulas
//!
//! **`brute-sat`** decides whether a boolean formula over named variables can be made true.
//! It does so the honest way: every one of the `2^n` truth assignments is tried,
//! spread over a pool of worker threads, and the first satisfying one wins.
//!
//! ## Formulas
//!
//! Formulas use C-style syntax: identifiers, `!`, `&&`, `||` and parentheses.
//! `&&` binds tighter than `||`.
//!
//! ```rust
//! use brute_sat::parser::parse;
//!
//! let f = parse("a && b || !c").unwrap();
//! assert_eq!(f.variables(), vec!["a", "b", "c"]);
//! ```
//!
//! Other operators (`+`, `==`, ...) are understood by the grammar but rejected
//! when the syntax is lowered into an [`Expr`][crate::ast::Expr].
//!
//! ## Searching
//!
//! ```rust
//! use brute_sat::assignment::VariableSet;
//! use brute_sat::search::{solve, SearchResult};
//!
//! let vars = VariableSet::new(["a", "b", "c"]);
//!
//! // 1. A contradiction has no witness.
//! assert_eq!(solve("a && !a", &vars).unwrap(), SearchResult::Unsatisfiable);
//!
//! // 2. Anything else yields some witness. Which one depends on scheduling.
//! let result = solve("a && b || !c", &vars).unwrap();
//! assert!(result.is_satisfied());
//! ```
//!
//! A [`Searcher`][crate::search::Searcher] keeps its thread pool between searches
//! and can report how many candidates were looked at:
//!
//! ```rust
//! use brute_sat::assignment::VariableSet;
//! use brute_sat::parser::parse;
//! use brute_sat::search::{SearchConfig, Searcher};
//!
//! let searcher = Searcher::new(SearchConfig::default().with_num_threads(2)).unwrap();
//! let expr = parse("x && !x").unwrap();
//! let report = searcher.run(&expr, &VariableSet::new(["x", "y"])).unwrap();
//! assert_eq!(report.stats.observed, 4);
//! ```
//!
//! ## Core Components
//!
//! - **[`ast`]**: The [`Expr`][crate::ast::Expr] tree.
//! - **[`parser`]**: Text to tree.
//! - **[`eval`]**: Evaluation of a tree under an [`Assignment`][crate::assignment::Assignment].
//! - **[`assignment`]**: Variable sets and hypercube enumeration.
//! - **[`search`]**: The concurrent search coordinator.

pub mod assignment;
pub mod ast;
pub mod error;
pub mod eval;
pub mod parser;
pub mod search;

pub use error::{Error, Result};
