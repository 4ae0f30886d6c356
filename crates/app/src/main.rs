//! `dispatcher`: resolve a dispatch batch from a file or stdin.
//!
//! Runs a headless Bevy App (no window, no renderer) with `DispatchPlugin`,
//! installs the batch, runs one update and prints the outcomes. Logs go to
//! stderr so stdout carries nothing but results.

use std::io::{Read, Write};
use std::process::ExitCode;

use bevy::log::LogPlugin;
use bevy::prelude::*;

use dispatch::plugin::{load_batch, DispatchLog, PendingRequests};
use dispatch::{
    parse_batch, DispatchError, DispatchParams, DispatchPlugin, DispatchReport, BUNDLED_EXAMPLE,
};

const USAGE: &str =
    "Usage: dispatcher [--params FILE] [--preview] [--metrics] [--json] [--example] [INPUT]";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    params: Option<String>,
    preview: bool,
    metrics: bool,
    json: bool,
    example: bool,
    /// `None` or `-` reads stdin.
    input: Option<String>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--params" => {
                let path = iter.next().ok_or("--params needs a file argument")?;
                cli.params = Some(path.clone());
            }
            "--preview" => cli.preview = true,
            "--metrics" => cli.metrics = true,
            "--json" => cli.json = true,
            "--example" => cli.example = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown flag: {flag}")),
            path => {
                if cli.input.is_some() {
                    return Err(format!("Unexpected extra argument: {path}"));
                }
                cli.input = Some(path.to_string());
            }
        }
    }
    if cli.example && cli.input.is_some() {
        return Err("--example cannot be combined with an input file".to_string());
    }
    Ok(cli)
}

fn read_input(cli: &CliArgs) -> Result<String, DispatchError> {
    if cli.example {
        return Ok(BUNDLED_EXAMPLE.to_string());
    }
    match cli.input.as_deref() {
        Some(path) if path != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn run(cli: &CliArgs) -> Result<ExitCode, DispatchError> {
    // -- Headless App: ECS + scheduling + logging, nothing else --------------
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()));
    app.add_plugins(DispatchPlugin);

    if let Some(path) = &cli.params {
        app.insert_resource(DispatchParams::load(path)?);
    }

    let text = read_input(cli)?;
    let batch = {
        let params = app.world().resource::<DispatchParams>();
        parse_batch(&text, &params.type_codes)?
    };
    for resource in batch.unstocked_types() {
        warn!("No {resource} units are stocked anywhere; those requests cannot be served");
    }

    load_batch(app.world_mut(), &batch)?;
    app.world_mut().resource_mut::<PendingRequests>().preview = cli.preview;
    app.update();

    // -- Output ----------------------------------------------------------------
    let log = app.world().resource::<DispatchLog>();
    if let Some(err) = &log.last_error {
        eprintln!("dispatcher: {err}");
        return Ok(ExitCode::FAILURE);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        let report = DispatchReport {
            outcomes: log.outcomes.clone(),
            metrics: log.metrics.clone(),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        for outcome in &log.outcomes {
            writeln!(out, "{outcome}")?;
        }
    }
    out.flush()?;

    if cli.metrics {
        for (resource, m) in log.metrics.iter() {
            eprintln!(
                "{resource:>9}: {} dispatched, {} unavailable, avg distance {:.2}",
                m.dispatches,
                m.failed,
                m.avg_distance()
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if matches!(args.first().map(|s| s.as_str()), Some("--help") | Some("-h")) {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("dispatcher: {e}");
            ExitCode::FAILURE
        }
    }
}
