//! Concurrent brute-force satisfiability search.
//!
//! The [`Searcher`] owns a fixed-size `rayon` thread pool. A search spawns one
//! worker per pool thread; workers claim candidate indices from a shared atomic
//! cursor, so every candidate of the hypercube is evaluated by exactly one
//! worker and no per-candidate task is allocated.
//!
//! Every evaluated candidate is reported back to the coordinator (the calling
//! thread) through an unbounded channel, so workers never block on reporting:
//!
//! ```text
//!            cursor (AtomicU64)          cancel (AtomicBool)
//!              |        |                   ^        |
//!           worker 0 ... worker k           |        | checked before
//!              |        |                   |        | each claim
//!              +--------+--> channel --> coordinator
//! ```
//!
//! The coordinator stops at the first satisfying assignment or at the first
//! evaluation error, raising the cancellation flag on its way out. A panic
//! while evaluating a candidate is caught in the worker and reported as an
//! error like any other. It only
//! concludes [`SearchResult::Unsatisfiable`] after it has seen an outcome for
//! every one of the `2^n` candidates.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, trace};

use crate::assignment::{Assignment, VariableSet};
use crate::ast::{Expr, MAX_DEPTH};
use crate::error::{Error, Result};
use crate::eval::evaluate;
use crate::parser::parse;

/// Verdict of a satisfiability search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    /// The formula holds under the contained witness.
    Satisfied(Assignment),
    /// No assignment of the variable set satisfies the formula.
    Unsatisfiable,
}

impl SearchResult {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, SearchResult::Satisfied(_))
    }

    pub fn witness(&self) -> Option<&Assignment> {
        match self {
            SearchResult::Satisfied(assignment) => Some(assignment),
            SearchResult::Unsatisfiable => None,
        }
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchResult::Satisfied(assignment) => write!(f, "satisfied by {}", assignment),
            SearchResult::Unsatisfiable => write!(f, "unsatisfiable"),
        }
    }
}

/// Configuration for a [`Searcher`].
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    /// Number of worker threads. `0` means rayon's default, which is the
    /// available parallelism unless `RAYON_NUM_THREADS` says otherwise.
    pub num_threads: usize,
}

impl SearchConfig {
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }
}

/// Counters collected by the coordinator during one search.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SearchStats {
    /// Size of the hypercube, `2^n`.
    pub total: u64,
    /// Outcomes received before the search finished.
    pub observed: u64,
    /// Candidates the workers actually evaluated. Can exceed `observed` by the
    /// evaluations in flight when the search was decided, and stays below
    /// `total` when cancellation cut the search short.
    pub evaluated: u64,
    /// Workers started for this search.
    pub workers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub result: SearchResult,
    pub stats: SearchStats,
}

enum Outcome {
    Satisfied(Assignment),
    Falsified,
    Failed(Error),
}

struct UnitReport {
    index: u64,
    outcome: Outcome,
}

pub struct Searcher {
    pool: rayon::ThreadPool,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .thread_name(|i| format!("brute-sat-{}", i))
            .build()?;
        debug!("Searcher: {} threads", pool.current_num_threads());
        Ok(Self { pool })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Searches for an assignment of `variables` satisfying `expr`.
    pub fn search(&self, expr: &Expr, variables: &VariableSet) -> Result<SearchResult> {
        self.run(expr, variables).map(|report| report.result)
    }

    /// Same as [`search`][Searcher::search], also returning [`SearchStats`].
    pub fn run(&self, expr: &Expr, variables: &VariableSet) -> Result<SearchReport> {
        let depth = expr.depth();
        if depth > MAX_DEPTH {
            return Err(Error::TooDeep { depth, max: MAX_DEPTH });
        }
        debug!("search: `{}` over {} variables", expr, variables.len());
        self.run_with(variables, |assignment| evaluate(expr, assignment))
    }

    /// Runs the search with `eval` deciding each candidate.
    pub(crate) fn run_with<F>(&self, variables: &VariableSet, eval: F) -> Result<SearchReport>
    where
        F: Fn(&Assignment) -> Result<bool> + Sync,
    {
        let total = variables.space_size()?;
        let threads = self.pool.current_num_threads().max(1);
        let workers = usize::try_from(total).map_or(threads, |total| threads.min(total));
        debug!("search: {} candidates, {} workers", total, workers);

        let shared = Shared::default();
        let (tx, rx) = mpsc::channel();

        let collected = self.pool.in_place_scope(|scope| {
            for id in 0..workers {
                let tx = tx.clone();
                let shared = &shared;
                let eval = &eval;
                scope.spawn(move |_| worker_loop(id, variables, total, eval, shared, tx));
            }
            // Only the workers hold senders now, so the channel closes once they are all done.
            drop(tx);
            collect(rx, total, &shared.cancel)
        });

        // The scope has joined every worker, so the count is final.
        let evaluated = shared.evaluated.load(Ordering::Relaxed);
        let (result, observed) = collected?;
        debug!(
            "search: {} after {} of {} candidates ({} evaluated)",
            result, observed, total, evaluated
        );
        Ok(SearchReport {
            result,
            stats: SearchStats {
                total,
                observed,
                evaluated,
                workers,
            },
        })
    }
}

/// State shared by the workers of one search.
#[derive(Default)]
struct Shared {
    /// Next unclaimed candidate index.
    cursor: AtomicU64,
    /// Raised by the coordinator once the search is decided.
    cancel: AtomicBool,
    /// Evaluations performed, summed as workers finish.
    evaluated: AtomicU64,
}

fn worker_loop<F>(
    id: usize,
    variables: &VariableSet,
    total: u64,
    eval: &F,
    shared: &Shared,
    tx: Sender<UnitReport>,
) where
    F: Fn(&Assignment) -> Result<bool>,
{
    let mut evaluated = 0u64;
    loop {
        if shared.cancel.load(Ordering::Acquire) {
            trace!("worker {}: cancelled", id);
            break;
        }
        let index = shared.cursor.fetch_add(1, Ordering::Relaxed);
        if index >= total {
            break;
        }

        let assignment = variables.assignment(index);
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| eval(&assignment))) {
            Ok(Ok(true)) => Outcome::Satisfied(assignment),
            Ok(Ok(false)) => Outcome::Falsified,
            Ok(Err(e)) => Outcome::Failed(e),
            Err(payload) => Outcome::Failed(Error::EvaluationPanicked(panic_message(&*payload))),
        };
        evaluated += 1;

        // A closed channel means the coordinator has already decided.
        if tx.send(UnitReport { index, outcome }).is_err() {
            break;
        }
    }
    shared.evaluated.fetch_add(evaluated, Ordering::Relaxed);
    trace!("worker {}: finished after {} evaluations", id, evaluated);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Receives unit outcomes until the search is decided.
///
/// Returns the verdict together with the number of outcomes observed.
fn collect(rx: Receiver<UnitReport>, total: u64, cancel: &AtomicBool) -> Result<(SearchResult, u64)> {
    let mut observed = 0u64;
    for UnitReport { index, outcome } in rx.iter() {
        observed += 1;
        match outcome {
            Outcome::Satisfied(assignment) => {
                trace!("candidate {}: satisfied", index);
                cancel.store(true, Ordering::Release);
                return Ok((SearchResult::Satisfied(assignment), observed));
            }
            Outcome::Falsified => {
                trace!("candidate {}: falsified", index);
            }
            Outcome::Failed(e) => {
                debug!("candidate {}: {}", index, e);
                cancel.store(true, Ordering::Release);
                return Err(e);
            }
        }
        if observed == total {
            break;
        }
    }

    if observed == total {
        Ok((SearchResult::Unsatisfiable, observed))
    } else {
        Err(Error::IncompleteSearch { observed, total })
    }
}

/// Searches `expr` over `variables` with a default [`Searcher`].
pub fn search(expr: &Expr, variables: &VariableSet) -> Result<SearchResult> {
    Searcher::new(SearchConfig::default())?.search(expr, variables)
}

/// Parses `text` and searches it over `variables`.
pub fn solve(text: &str, variables: &VariableSet) -> Result<SearchResult> {
    let expr = parse(text)?;
    search(&expr, variables)
}
