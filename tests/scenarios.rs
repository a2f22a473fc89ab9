//! End-to-end scenarios: text in, verdict out.

use brute_sat::assignment::{Assignment, VariableSet};
use brute_sat::ast::Expr;
use brute_sat::parser::parse;
use brute_sat::search::{search, SearchConfig, SearchResult, Searcher};
use brute_sat::Error;

fn abc() -> VariableSet {
    VariableSet::new(["a", "b", "c"])
}

fn assignment(pairs: &[(&str, bool)]) -> Assignment {
    pairs.iter().copied().collect()
}

// ─── Verdicts ──────────────────────────────────────────────────────────────────

#[test]
fn contradiction() {
    let expr = parse("a && !a").unwrap();
    let result = search(&expr, &VariableSet::new(["a"])).unwrap();
    assert_eq!(result, SearchResult::Unsatisfiable);
}

#[test]
fn tautology() {
    let expr = parse("a || !a").unwrap();
    let result = search(&expr, &VariableSet::new(["a"])).unwrap();
    let witness = result.witness().expect("satisfiable");
    assert!(*witness == assignment(&[("a", true)]) || *witness == assignment(&[("a", false)]));
}

#[test]
fn mixed_formula() {
    let expr = parse("a && b || !c").unwrap();
    let result = search(&expr, &abc()).unwrap();
    let witness = result.witness().expect("satisfiable");
    assert_eq!(witness.len(), 3);
    assert!(expr.eval(witness).unwrap());
}

#[test]
fn default_demo_batch() {
    let cases = [
        ("a && !a", false),
        ("a || !a", true),
        ("a && b || !c", true),
        ("a && !b", true),
        ("a && a", true),
    ];
    let searcher = Searcher::new(SearchConfig::default()).unwrap();
    for (text, satisfiable) in cases {
        let expr = parse(text).unwrap();
        let result = searcher.search(&expr, &abc()).unwrap();
        assert_eq!(result.is_satisfied(), satisfiable, "{}", text);
        if let Some(witness) = result.witness() {
            assert!(expr.eval(witness).unwrap(), "{} under {}", text, witness);
        }
    }
}

#[test]
fn witness_is_always_valid() {
    // Many witnesses exist; whichever wins must satisfy the formula.
    let expr = parse("(x0 || x1) && (!x2 || x3) && (x4 || !x5)").unwrap();
    let vars = VariableSet::from_expr(&expr);
    let searcher = Searcher::new(SearchConfig::default().with_num_threads(4)).unwrap();
    for _ in 0..20 {
        let result = searcher.search(&expr, &vars).unwrap();
        assert!(expr.eval(result.witness().unwrap()).unwrap());
    }
}

#[test]
fn agrees_with_exhaustive_evaluation() {
    let formulas = [
        "a && (b || c) && !(a && c)",
        "!(a || b) && !c && a",
        "(a || b) && (!a || c) && (!b || !c) && (!a || !c)",
        "((a))",
    ];
    let vars = abc();
    for text in formulas {
        let expr = parse(text).unwrap();
        let expected = vars.assignments().unwrap().any(|a| expr.eval(&a).unwrap());
        let result = search(&expr, &vars).unwrap();
        assert_eq!(result.is_satisfied(), expected, "{}", text);
    }
}

// ─── Errors ────────────────────────────────────────────────────────────────────

#[test]
fn undeclared_variable() {
    let expr = parse("a && b || d").unwrap();
    let err = search(&expr, &abc()).unwrap_err();
    assert!(matches!(err, Error::UndefinedVariable(ref name) if name == "d"), "{:?}", err);
}

#[test]
fn unsupported_operator() {
    let err = parse("a + b").unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperator(ref op) if op == "+"), "{:?}", err);
    assert_eq!(err.to_string(), "unsupported operator `+`");
}

#[test]
fn malformed_text() {
    let err = parse("a && (b").unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "{:?}", err);
}

#[test]
fn deeply_nested_text() {
    let text = format!("{}a", "!".repeat(100_000));
    let err = parse(&text).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "{:?}", err);
}

// ─── Trees built in code ───────────────────────────────────────────────────────

#[test]
fn tree_without_parser() {
    let a = Expr::var("a");
    let b = Expr::var("b");
    let expr = (a.clone() | b.clone()) & !a & Expr::group(b);
    let vars = VariableSet::from_expr(&expr);
    assert_eq!(vars.names(), &["a", "b"]);

    let result = search(&expr, &vars).unwrap();
    assert_eq!(result, SearchResult::Satisfied(assignment(&[("a", false), ("b", true)])));
}
