use clap::Parser;
use log::{info, warn};

use super::options::{HufOpts, Mode, Output, Verbosity};

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "A static Huffman file compressor",
    long_about = "
    Compresses each byte of the input with a Huffman code built from that input's own byte
    frequencies. The code tree travels in the header of the compressed file, so no other
    information is needed to decompress it.

    If no file names are given, huffpack compresses or decompresses from standard input to
    standard output."
)]
pub struct Args {
    /// Files to process
    #[clap()]
    files: Vec<String>,

    /// Perform compression on the input files (default)
    #[clap(short = 'z', long = "compress")]
    compress: bool,

    /// Perform decompression on the input files
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Test compressed file integrity
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Keep input files
    #[clap(short = 'k', long = "keep")]
    keep: bool,

    /// Force overwriting output files
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Send output to the terminal
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Suppress all messages, errors included
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,

    /// Be verbose (repeat for more: -vvvv is trace level)
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Parse the process arguments into HufOpts.
pub fn huf_opts_init() -> HufOpts {
    init_huf_opts(Args::parse())
}

/// Put command line information from CLAP into our internal structure and set the log level.
pub fn init_huf_opts(args: Args) -> HufOpts {
    let mut opts = HufOpts::new();
    opts.files = args.files;

    // Test wins over decompress, which wins over compress
    opts.op_mode = if args.test {
        Mode::Test
    } else if args.decompress {
        Mode::Unzip
    } else {
        Mode::Zip
    };
    opts.force_overwrite = args.force;
    opts.keep_input_files = args.keep;
    if args.stdout || opts.files.is_empty() {
        opts.output = Output::Stdout
    };
    opts.verbose = if args.quiet {
        Verbosity::Quiet
    } else {
        Verbosity::from_count(args.verbose)
    };

    // Set the log level
    log::set_max_level(opts.verbose.level());

    // Below we report initialization status to the user
    info!("---- Huffpack Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    if opts.files.is_empty() {
        warn!("No files given, reading stdin and writing stdout");
    } else {
        info!("Input files: {}", opts.files.join(", "));
    }
    info!("Output goes to {}", opts.output);
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    if opts.keep_input_files {
        info!("Keeping input files")
    };
    info!("---- Huffpack Initialization End ----");
    opts
}

#[cfg(test)]
mod test {
    use super::{init_huf_opts, Args};
    use crate::tools::options::{Mode, Output, Verbosity};
    use clap::Parser;

    fn opts(argv: &[&str]) -> crate::tools::options::HufOpts {
        init_huf_opts(Args::parse_from(argv))
    }

    #[test]
    fn default_mode_test() {
        let o = opts(&["huffpack", "a.txt", "b.txt"]);
        assert_eq!(o.op_mode, Mode::Zip);
        assert_eq!(o.files, vec!["a.txt".to_string(), "b.txt".to_string()]);
        assert_eq!(o.output, Output::File);
        assert!(!o.keep_input_files);
        assert!(!o.force_overwrite);
    }

    #[test]
    fn combined_flags_test() {
        let o = opts(&["huffpack", "-dkf", "a.txt.huf"]);
        assert_eq!(o.op_mode, Mode::Unzip);
        assert!(o.keep_input_files);
        assert!(o.force_overwrite);
    }

    #[test]
    fn test_mode_wins_test() {
        let o = opts(&["huffpack", "-d", "--test", "a.huf"]);
        assert_eq!(o.op_mode, Mode::Test);
    }

    #[test]
    fn stdin_goes_to_stdout_test() {
        let o = opts(&["huffpack", "-d"]);
        assert!(o.files.is_empty());
        assert_eq!(o.output, Output::Stdout);
        let o = opts(&["huffpack", "-c", "a.txt"]);
        assert_eq!(o.output, Output::Stdout);
    }

    #[test]
    fn verbosity_test() {
        assert_eq!(opts(&["huffpack", "a"]).verbose, Verbosity::Errors);
        assert_eq!(opts(&["huffpack", "-vv", "a"]).verbose, Verbosity::Info);
        assert_eq!(opts(&["huffpack", "-vvvvv", "a"]).verbose, Verbosity::Trace);
        assert_eq!(opts(&["huffpack", "-q", "-vv", "a"]).verbose, Verbosity::Quiet);
    }
}
