//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::io;
use std::process::ExitCode;

use huffpack::compression::{compress, compress_file, decompress, decompress_file, test_file};
use huffpack::error::Result;
use huffpack::tools::cli::huf_opts_init;
use huffpack::tools::options::{HufOpts, Mode};
use huffpack::tools::report::Report;

use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn main() -> ExitCode {
    // Available log levels are Error, Warn, Info, Debug, Trace. Stdout may carry data, so log
    // to stderr. The level is narrowed once the command line has been read.
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not start the logger: {}", e);
    }

    let options = huf_opts_init();

    //----- Figure how what we need to do and go do it
    if options.files.is_empty() {
        return match run_stdio(&options) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    let mut failed = 0;
    for path in &options.files {
        let result = match options.op_mode {
            Mode::Zip => compress_file(&options, path),
            Mode::Unzip => decompress_file(&options, path),
            Mode::Test => test_file(path),
        };
        match result {
            Ok(report) => info!("{}: {}", path, report),
            Err(e) => {
                error!("{}: {}", path, e);
                failed += 1;
            }
        }
    }

    info!("Done.");
    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// No file names given: stdin to stdout.
fn run_stdio(options: &HufOpts) -> Result<Report> {
    let stdin = io::stdin().lock();
    match options.op_mode {
        Mode::Zip => compress(stdin, io::stdout().lock()),
        Mode::Unzip => decompress(stdin, io::stdout().lock()),
        Mode::Test => decompress(stdin, io::sink()),
    }
}
