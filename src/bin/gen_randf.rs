//! gen_randf: write random integer corpora for intsort

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process;

use intsort::{
    error::{SortError, SortResult},
    generate::{generate_size_series, generate_values, write_corpus},
    logging, EXIT_SUCCESS,
};

fn main() {
    let matches = build_cli().get_matches();
    let verbose = matches.get_count("verbose");

    let result = logging::dispatch(verbose, "gen_randf")
        .and_then(|dispatch| logging::with_logging(dispatch.as_ref(), || run(&matches)));

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("gen_randf: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn build_cli() -> Command {
    Command::new("gen_randf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate files of random integers")
        .arg(Arg::new("count")
            .short('c')
            .long("count")
            .help("Number of random numbers to generate")
            .value_name("COUNT")
            .value_parser(value_parser!(usize))
            .default_value("100"))
        .arg(Arg::new("min")
            .long("min")
            .help("Minimum value")
            .value_name("MIN")
            .value_parser(value_parser!(i32))
            .allow_negative_numbers(true)
            .default_value("1"))
        .arg(Arg::new("max")
            .long("max")
            .help("Maximum value")
            .value_name("MAX")
            .value_parser(value_parser!(i32))
            .allow_negative_numbers(true)
            .default_value("1000"))
        .arg(Arg::new("dir")
            .long("dir")
            .help("Directory the files are written to")
            .value_name("DIR")
            .default_value("input"))
        .arg(Arg::new("seed")
            .long("seed")
            .help("Seed for reproducible output")
            .value_name("SEED")
            .value_parser(value_parser!(u64)))
        .arg(Arg::new("series")
            .long("series")
            .help("Write one test_<size>.txt per size instead of a single file")
            .value_name("MIN:MAX:STEP")
            .conflicts_with_all(["count", "min", "max"]))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("Log progress to stderr (repeat for more detail)")
            .action(ArgAction::Count))
}

fn run(matches: &ArgMatches) -> SortResult<i32> {
    let dir = PathBuf::from(
        matches
            .get_one::<String>("dir")
            .map(String::as_str)
            .unwrap_or("input"),
    );
    let mut rng = match matches.get_one::<u64>("seed") {
        Some(&seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if let Some(series) = matches.get_one::<String>("series") {
        let (min, max, step) = parse_series(series)?;
        let paths = generate_size_series(&dir, min, max, step, &mut rng)?;
        println!(
            "Generated {} test files in {} (sizes {} to {}, step {})",
            paths.len(),
            dir.display(),
            min,
            max,
            step
        );
        return Ok(EXIT_SUCCESS);
    }

    let count = matches.get_one::<usize>("count").copied().unwrap_or(100);
    let min = matches.get_one::<i32>("min").copied().unwrap_or(1);
    let max = matches.get_one::<i32>("max").copied().unwrap_or(1000);

    let values = generate_values(count, min, max, &mut rng)?;
    let path = write_corpus(&dir, &values)?;
    println!("Generated {} random numbers between {} and {}", count, min, max);
    println!("Saved to file: {}", path.display());
    Ok(EXIT_SUCCESS)
}

/// Parse `MIN:MAX:STEP`
fn parse_series(spec: &str) -> SortResult<(usize, usize, usize)> {
    let invalid = || SortError::invalid_argument(&format!("--series expects MIN:MAX:STEP, got '{spec}'"));
    let parts = spec
        .split(':')
        .map(|part| part.trim().parse::<usize>().map_err(|_| invalid()))
        .collect::<SortResult<Vec<usize>>>()?;
    match parts.as_slice() {
        &[min, max, step] => Ok((min, max, step)),
        _ => Err(invalid()),
    }
}
