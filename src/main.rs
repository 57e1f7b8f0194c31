//! # BASIC
//!
//! Runs a line-numbered BASIC program from a file.
//!

use basic::mach::{Config, Options, DEFAULT_TIME_SLICE};
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use std::process::ExitCode;

mod term;

#[derive(Parser)]
#[command(name = "basic", version, about = "Run a line-numbered BASIC program")]
struct Cli {
    /// Program source
    file: PathBuf,

    /// Instructions executed between host turns
    #[arg(long, default_value_t = DEFAULT_TIME_SLICE)]
    slice: usize,

    /// Stop before the first statement in the line debugger
    #[arg(long)]
    debug: bool,

    /// Print the compiled instructions instead of running
    #[arg(long)]
    listing: bool,

    /// More logging; repeat for per-instruction tracing
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logger = match cli.verbose {
        0 => SimpleLogger::new().with_level(LevelFilter::Warn).env(),
        1 => SimpleLogger::new().with_level(LevelFilter::Debug),
        _ => SimpleLogger::new().with_level(LevelFilter::Trace),
    };
    if let Err(error) = logger.init() {
        eprintln!("{}", error);
    }

    let source = match std::fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("{}: {}", cli.file.display(), error);
            return ExitCode::FAILURE;
        }
    };
    let options = Options {
        instrument: cli.debug,
    };
    let program = match basic::compile(&source, &options) {
        Ok(program) => program,
        Err(error) => {
            term::report(&error);
            return ExitCode::FAILURE;
        }
    };
    if cli.listing {
        print!("{}", program);
        return ExitCode::SUCCESS;
    }

    let config = Config {
        time_slice: cli.slice,
    };
    match term::run(program, config, cli.debug) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}
