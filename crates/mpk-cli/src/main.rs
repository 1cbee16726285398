/// mpk command-line tool: decode, validate and encode MessagePack data,
/// chaining any number of input files into one value stream.
///
/// # Command overview
///
/// ```text
/// mpk <COMMAND> [OPTIONS]
///
/// Commands:
///   decode     Print every value in the chained inputs
///   validate   Check that the chained inputs hold only complete values
///   encode     Pack a JSON document as MessagePack
///   help       Print help information
///
/// Global options:
///   -v, --verbose         Log source switches and decoded values to stderr
///   --max-length <N>      Largest declared length or element count accepted
///   -h, --help            Print help
///   -V, --version         Print version
/// ```
///
/// `RUST_LOG` overrides the log filter set by `--verbose`.
///
/// # Exit codes
///
/// | Code | Meaning                                      |
/// |------|----------------------------------------------|
/// | 0    | Success                                      |
/// | 1    | Error (I/O failure, corrupt input, etc.)     |
///
/// All error details are written to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use mpk_decoder::{UnpackerConfig, DEFAULT_MAX_LENGTH};
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_encode;
mod cmd_validate;
mod input;
mod json;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The mpk MessagePack tool.
#[derive(Parser)]
#[command(name = "mpk", version, about = "Chained-source MessagePack CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log source switches and decoded values to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Largest declared str/bin/ext length or array/map count accepted.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_LENGTH)]
    max_length: usize,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print every value in the chained inputs.
    Decode(DecodeArgs),
    /// Check that the chained inputs hold only complete values.
    Validate(ValidateArgs),
    /// Pack a JSON document as MessagePack.
    Encode(EncodeArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Output rendering for `mpk decode`.
///
/// ```text
/// ┌─────────┬──────────────────────────────────────────────────────────┐
/// │ Format  │ Rendering                                                │
/// ├─────────┼──────────────────────────────────────────────────────────┤
/// │ json    │ one JSON document per line; bin/ext as tagged hex        │
/// │ text    │ compact display form: [1, "a", bin(dead), ext(1, 00)]    │
/// │ debug   │ Rust debug form of the decoded value                     │
/// └─────────┴──────────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
    Debug,
}

/// Arguments for `mpk decode`.
///
/// Files are chained in the order given, so a value split across two
/// files decodes as one. `-` reads stdin, which is never closed by the
/// tool.
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Input files, chained in order. `-` reads stdin.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Text encoding of str payloads (utf-8, utf-16le, utf-16be, latin1, ascii).
    #[arg(long, default_value = "utf-8")]
    pub encoding: String,
}

/// Arguments for `mpk validate`.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Input files, chained in order. `-` reads stdin.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for `mpk encode`.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────────┐
/// │ Flag         │ Effect                                               │
/// ├──────────────┼──────────────────────────────────────────────────────┤
/// │ -o, --output │ file to write (required)                             │
/// │ --each       │ top-level array packed as consecutive values         │
/// └──────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct EncodeArgs {
    /// JSON document to pack.
    pub input: PathBuf,

    /// Output file path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Pack each element of a top-level array as its own value.
    #[arg(long)]
    pub each: bool,
}

/// Options shared by every command.
pub struct Settings {
    pub config: UnpackerConfig,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings {
        config: UnpackerConfig {
            max_length: cli.max_length,
            ..UnpackerConfig::default()
        },
    };

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode::run(&args, &settings),
        Commands::Validate(args) => cmd_validate::run(&args, &settings),
        Commands::Encode(args) => cmd_encode::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
