//! RouteTrace command-line driver.
//!
//! Runs the instrumented demo pipeline over an input file and checks that
//! it called its phases in order. Can also verify or display a trace that
//! was saved earlier.
//!
//! # Usage
//!
//! ```bash
//! # Run the pipeline, print the trace, verify the expected order
//! routetrace-cli run input.txt
//!
//! # ...and save the trace for later
//! routetrace-cli run input.txt --output trace.json
//!
//! # Verify a saved trace against an expected route
//! routetrace-cli verify --trace trace.json --route load_file --route do_some_stuff
//!
//! # Show a saved trace
//! routetrace-cli show --trace trace.json
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use routetrace::config::Config;
use routetrace::context::RouteTrace;
use routetrace::sink::{ConsoleSink, LogSink};
use routetrace::trace_log::{MatchRule, TraceLog};
use routetrace_cli::app::{self, Outcome};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "routetrace-cli")]
#[command(about = "Call-order tracing and verification demo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the instrumented pipeline over a file and verify its call order.
    Run {
        /// Input file handed to the pipeline.
        file: PathBuf,

        /// Save the recorded trace to a JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON config (limits, match rule, log forwarding).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Don't echo trace lines to stdout (they still reach the log).
        #[arg(short, long)]
        quiet: bool,
    },

    /// Verify a saved trace against an expected route order.
    Verify {
        /// Path to the trace file (JSON).
        #[arg(short, long)]
        trace: PathBuf,

        /// Expected routine, in order. Repeat for each route.
        #[arg(short, long = "route", required = true)]
        routes: Vec<String>,

        /// Match routes against whole entries instead of substrings.
        #[arg(long)]
        exact: bool,
    },

    /// Display a saved trace.
    Show {
        /// Path to the trace file (JSON).
        #[arg(short, long)]
        trace: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            file,
            output,
            config,
            quiet,
        }) => cmd_run(file, output, config, quiet),
        Some(Commands::Verify {
            trace,
            routes,
            exact,
        }) => cmd_verify(trace, routes, exact),
        Some(Commands::Show { trace }) => cmd_show(trace),
        None => {
            let _ = Cli::command().print_help();
        }
    }
}

fn cmd_run(file: PathBuf, output: Option<PathBuf>, config: Option<PathBuf>, quiet: bool) {
    let config = match config {
        Some(path) => match Config::load(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    let mut rt = if quiet {
        RouteTrace::with_sink(config, LogSink)
    } else {
        RouteTrace::new(config)
    };
    rt.set_up();

    let outcome = match app::run(&mut rt, &file) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Run failed: {}", e);
            rt.display_traces();
            rt.tear_down();
            std::process::exit(1);
        }
    };

    rt.display_traces();

    if let Some(path) = output {
        if let Err(e) = rt.log().save(&path) {
            eprintln!("Failed to save trace: {}", e);
            std::process::exit(1);
        }
        eprintln!("Saved {} entries to {}", rt.log().len(), path.display());
    }

    if outcome == Outcome::NoAction {
        eprintln!("Nothing to do for {}", file.display());
        rt.tear_down();
        return;
    }

    let (run_subject, workhorse_subject) = match app::declare_expected_subjects(&mut rt) {
        Ok(ids) => ids,
        Err(e) => {
            eprintln!("Failed to declare subjects: {}", e);
            std::process::exit(1);
        }
    };

    let mut passed = true;
    for subject in [run_subject, workhorse_subject] {
        let report = rt.verify_subject_report(subject);
        passed &= rt.verify_subject(subject);
        println!("{}", report);
    }

    rt.tear_down();
    if !passed {
        std::process::exit(1);
    }
}

fn cmd_verify(trace: PathBuf, routes: Vec<String>, exact: bool) {
    let log = match TraceLog::load(&trace) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to load {}: {}", trace.display(), e);
            std::process::exit(1);
        }
    };
    eprintln!("Trace: {} entries", log.len());

    let rule = if exact { MatchRule::Exact } else { MatchRule::Substring };
    let config = Config::default().with_match_rule(rule);
    let mut rt = RouteTrace::with_sink(config, ConsoleSink);
    rt.import_log(log);

    let subject = match rt.create_subject("cli", "verify") {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Failed to declare subject: {}", e);
            std::process::exit(1);
        }
    };
    for route in &routes {
        if let Err(e) = rt.add_route(subject, route) {
            eprintln!("Route {:?} ignored: {}", route, e);
        }
    }

    let report = rt.verify_subject_report(subject);
    let passed = rt.verify_subject(subject);
    println!("{}", report);

    if !passed {
        std::process::exit(1);
    }
}

fn cmd_show(trace: PathBuf) {
    let log = match TraceLog::load(&trace) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to load {}: {}", trace.display(), e);
            std::process::exit(1);
        }
    };

    println!("Trace: {}", trace.display());
    println!("Entries: {}", log.len());
    println!();

    log.display_all(&mut ConsoleSink);

    let summary = log.summary();
    let mut sorted: Vec<_> = summary.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    println!();
    println!("{:>8} {:>8}  Entry", "Count", "First");
    println!("{}", "-".repeat(45));
    for (text, count) in &sorted {
        let first = log
            .find_first_index_with(text, MatchRule::Exact)
            .map_or_else(|| "-".to_string(), |i| i.to_string());
        println!("{:>8} {:>8}  {}", count, first, text);
    }
    println!("{}", "-".repeat(45));
    println!("{:>8} distinct of {}", sorted.len(), log.len());
}
