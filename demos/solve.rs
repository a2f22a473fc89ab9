use clap::Parser;

use brute_sat::assignment::VariableSet;
use brute_sat::parser::parse;
use brute_sat::search::{SearchConfig, Searcher};

const DEFAULT_FORMULAS: [&str; 5] = ["a && !a", "a || !a", "a && b || !c", "a && !b", "a && a"];
const DEFAULT_VARIABLES: [&str; 3] = ["a", "b", "c"];

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Formulas to check. Runs a small built-in batch when omitted.
    #[arg(value_name = "FORMULA")]
    formulas: Vec<String>,

    /// Comma-separated variables to search over (defaults to the variables of each formula).
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    vars: Vec<String>,

    /// Number of worker threads (0 = available parallelism).
    #[arg(long, value_name = "INT", default_value = "0")]
    threads: usize,

    /// Log debug output.
    #[arg(long)]
    verbose: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let (formulas, vars) = if args.formulas.is_empty() {
        let formulas: Vec<String> = DEFAULT_FORMULAS.iter().map(|s| s.to_string()).collect();
        let vars: Vec<String> = if args.vars.is_empty() {
            DEFAULT_VARIABLES.iter().map(|s| s.to_string()).collect()
        } else {
            args.vars.clone()
        };
        (formulas, vars)
    } else {
        (args.formulas.clone(), args.vars.clone())
    };

    let searcher = Searcher::new(SearchConfig::default().with_num_threads(args.threads))?;
    log::info!("Using {} worker threads", searcher.num_threads());

    for text in formulas.iter() {
        let time_search = std::time::Instant::now();
        let expr = parse(text)?;
        let variables = if vars.is_empty() {
            VariableSet::from_expr(&expr)
        } else {
            VariableSet::new(vars.iter().cloned())
        };
        let report = searcher.run(&expr, &variables)?;
        println!("{}:", text);
        println!(
            "  └─ {} ({} of {} candidates, {} evaluated, in {:.3}s)",
            report.result,
            report.stats.observed,
            report.stats.total,
            report.stats.evaluated,
            time_search.elapsed().as_secs_f64()
        );
    }

    Ok(())
}
