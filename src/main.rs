//! intsort: sort integers with a hybrid heap sort or quicksort and time it

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::process;

use intsort::{
    config::{Algorithm, SortConfig, SortConfigBuilder},
    error::SortResult,
    logging, sort,
};

fn main() {
    let matches = build_cli().get_matches();
    let verbose = matches.get_count("verbose");

    let result = logging::dispatch(verbose, "intsort").and_then(|dispatch| {
        logging::with_logging(dispatch.as_ref(), || {
            parse_config_from_matches(&matches).and_then(|config| sort(&config))
        })
    });

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("intsort: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn build_cli() -> Command {
    Command::new("intsort")
        .version(env!("CARGO_PKG_VERSION"))
        .override_usage("intsort [OPTIONS] (-f FILE | INTEGER...)")
        .about("Sort integers and report how long the sort took")
        .long_about("Sort integers read from a file or given as arguments with a hybrid heap sort \
            (optionally cache-blocked) or a median-of-three quicksort.\n\n\
            Integers may be separated by spaces, tabs, newlines, commas or semicolons; \
            anything that is not an integer is skipped.\n\n\
            By default a full report with the original and sorted arrays is written to \
            the -o file, to output/<input name> for file input, or to stdout.")

        // Input
        .arg(Arg::new("values")
            .help("Integers to sort when no input file is given")
            .num_args(0..)
            .allow_negative_numbers(true)
            .value_name("INTEGER"))
        .arg(Arg::new("file")
            .short('f')
            .long("file")
            .help("Read integers from FILE")
            .value_name("FILE")
            .conflicts_with("values"))
        .arg(Arg::new("streaming")
            .long("streaming")
            .help("Read the input file in a single buffered pass instead of mapping it")
            .action(ArgAction::SetTrue))

        // Engine
        .arg(Arg::new("algorithm")
            .short('a')
            .long("algorithm")
            .help("Sort engine to use")
            .value_name("ALGORITHM")
            .value_parser(["heap", "heapsort", "quick", "quicksort"])
            .default_value("heap"))
        .arg(Arg::new("block-sort")
            .long("block-sort")
            .help("Extract heap maxima in cache-line sized groups (heap only)")
            .action(ArgAction::SetTrue))

        // Output
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .help("Write the full report to FILE")
            .value_name("FILE"))
        .arg(Arg::new("time-only")
            .long("time-only")
            .help("Print only the formatted sort time")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("bench-time")
            .long("bench-time")
            .help("Print only the sort time in seconds with nine decimals (overrides --time-only)")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("cpu-time")
            .long("cpu-time")
            .help("Time the sort with the process CPU clock instead of the wall clock")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("Log progress to stderr (repeat for more detail)")
            .action(ArgAction::Count))
}

/// Parse configuration from command line matches
fn parse_config_from_matches(matches: &ArgMatches) -> SortResult<SortConfig> {
    let algorithm: Algorithm = matches
        .get_one::<String>("algorithm")
        .map(|s| s.parse::<Algorithm>())
        .transpose()?
        .unwrap_or_default();

    let mut builder = SortConfigBuilder::new()
        .algorithm(algorithm)
        .timing_flags(matches.get_flag("bench-time"), matches.get_flag("time-only"));

    builder = match matches.get_one::<String>("file") {
        Some(file) => builder.input_file(file),
        None => builder.values(
            matches
                .get_many::<String>("values")
                .unwrap_or_default()
                .cloned()
                .collect(),
        ),
    };

    if let Some(output) = matches.get_one::<String>("output") {
        builder = builder.output_file(output);
    }
    if matches.get_flag("block-sort") {
        builder = builder.block_sort();
    }
    if matches.get_flag("cpu-time") {
        builder = builder.cpu_clock();
    }
    if matches.get_flag("streaming") {
        builder = builder.streaming();
    }

    builder.build()
}
