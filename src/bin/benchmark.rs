//! benchmark: time intsort over a range of corpus sizes and save the averages

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::env;
use std::path::PathBuf;
use std::process;

use intsort::{
    config::Algorithm,
    error::SortResult,
    harness::{run_benchmark, write_csv, BenchmarkPlan, SubprocessRunner, DEFAULT_ATTEMPTS},
    logging, EXIT_SUCCESS,
};

fn main() {
    let matches = build_cli().get_matches();
    let verbose = matches.get_count("verbose");

    let result = logging::dispatch(verbose, "benchmark")
        .and_then(|dispatch| logging::with_logging(dispatch.as_ref(), || run(&matches)));

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("benchmark: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn build_cli() -> Command {
    Command::new("benchmark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Benchmark intsort over a range of array sizes")
        .arg(Arg::new("min")
            .long("min")
            .help("Minimum array size")
            .value_name("SIZE")
            .value_parser(value_parser!(usize))
            .default_value("1000"))
        .arg(Arg::new("max")
            .long("max")
            .help("Maximum array size")
            .value_name("SIZE")
            .value_parser(value_parser!(usize))
            .default_value("100000"))
        .arg(Arg::new("step")
            .long("step")
            .help("Step size between benchmarks")
            .value_name("SIZE")
            .value_parser(value_parser!(usize))
            .default_value("10000"))
        .arg(Arg::new("repeats")
            .long("repeats")
            .help("Number of repetitions per size")
            .value_name("N")
            .value_parser(value_parser!(usize))
            .default_value("3"))
        .arg(Arg::new("attempts")
            .long("attempts")
            .help("Attempts per trial before giving up")
            .value_name("N")
            .value_parser(value_parser!(u32))
            .default_value("3"))
        .arg(Arg::new("algorithm")
            .short('a')
            .long("algorithm")
            .help("Sort engine to benchmark")
            .value_name("ALGORITHM")
            .value_parser(["heap", "heapsort", "quick", "quicksort"])
            .default_value("heap"))
        .arg(Arg::new("block-sort")
            .long("block-sort")
            .help("Benchmark the cache-blocked heap sort")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("sorter")
            .long("sorter")
            .help("intsort executable to run (default: next to this program)")
            .value_name("PATH"))
        .arg(Arg::new("results-dir")
            .long("results-dir")
            .help("Directory for the CSV results")
            .value_name("DIR")
            .default_value("benchmark_results"))
        .arg(Arg::new("work-dir")
            .long("work-dir")
            .help("Directory for generated corpora (default: a temporary directory)")
            .value_name("DIR"))
        .arg(Arg::new("seed")
            .long("seed")
            .help("Seed for reproducible corpora")
            .value_name("SEED")
            .value_parser(value_parser!(u64)))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("Log progress to stderr (repeat for more detail)")
            .action(ArgAction::Count))
}

/// The intsort binary built alongside this one
fn sibling_sorter() -> SortResult<PathBuf> {
    let exe = env::current_exe()?;
    Ok(exe.with_file_name(format!("intsort{}", env::consts::EXE_SUFFIX)))
}

fn plan_from_matches(matches: &ArgMatches) -> SortResult<BenchmarkPlan> {
    let defaults = BenchmarkPlan::default();
    let algorithm = matches
        .get_one::<String>("algorithm")
        .map(|s| s.parse::<Algorithm>())
        .transpose()?
        .unwrap_or_default();
    let sorter = match matches.get_one::<String>("sorter") {
        Some(path) => PathBuf::from(path),
        None => sibling_sorter()?,
    };

    let plan = BenchmarkPlan {
        sorter,
        algorithm,
        block_sort: matches.get_flag("block-sort"),
        min_size: matches.get_one::<usize>("min").copied().unwrap_or(defaults.min_size),
        max_size: matches.get_one::<usize>("max").copied().unwrap_or(defaults.max_size),
        step: matches.get_one::<usize>("step").copied().unwrap_or(defaults.step),
        repeats: matches.get_one::<usize>("repeats").copied().unwrap_or(defaults.repeats),
        max_attempts: matches
            .get_one::<u32>("attempts")
            .copied()
            .unwrap_or(defaults.max_attempts),
        work_dir: matches.get_one::<String>("work-dir").map(PathBuf::from),
        results_dir: matches
            .get_one::<String>("results-dir")
            .map(PathBuf::from)
            .unwrap_or(defaults.results_dir),
        seed: matches.get_one::<u64>("seed").copied(),
    };
    plan.validate()?;
    Ok(plan)
}

fn run(matches: &ArgMatches) -> SortResult<i32> {
    let plan = plan_from_matches(matches)?;
    let results_path = plan.results_path();

    println!(
        "Running {} benchmarks from size {} to {} (step {}, {} repeats)...",
        plan.label(),
        plan.min_size,
        plan.max_size,
        plan.step,
        plan.repeats
    );

    let mut runner = SubprocessRunner::new(&plan.sorter);
    let rows = run_benchmark(&plan, &mut runner)?;
    for row in &rows {
        println!("Size {}: average time {}", row.size, row.elapsed);
    }

    write_csv(&rows, &results_path)?;
    println!("Benchmark complete. Results saved to {}", results_path.display());
    Ok(EXIT_SUCCESS)
}
