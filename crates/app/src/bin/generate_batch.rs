//! Write a random, connected dispatch batch in the text format to stdout.

use std::process::ExitCode;

use dispatch::generator::{generate_batch, NetworkShape};
use dispatch::input::render_text;
use dispatch::TypeCodeTable;

const USAGE: &str = "Usage: generate_batch SEED LOCATIONS EXTRA_ROADS";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if matches!(args.first().map(|s| s.as_str()), Some("--help") | Some("-h")) {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let [seed, locations, extra_roads] = args.as_slice() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let (Ok(seed), Ok(locations), Ok(extra_roads)) = (
        seed.parse::<u64>(),
        locations.parse::<u32>(),
        extra_roads.parse::<usize>(),
    ) else {
        eprintln!("SEED, LOCATIONS and EXTRA_ROADS must be non-negative integers");
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    if locations == 0 {
        eprintln!("LOCATIONS must be at least 1");
        return ExitCode::from(2);
    }

    let batch = generate_batch(seed, &NetworkShape::new(locations, extra_roads));
    print!("{}", render_text(&batch, &TypeCodeTable::default()));
    ExitCode::SUCCESS
}
