use crate::cli::Verbosity;
use crate::fixture::CellType;
use crate::runtime::ScriptGroupType;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ckb-debug-invoke")]
#[command(version, about = "Run CKB scripts from mock transactions through a debugger engine", long_about = None)]
pub struct Cli {
    /// Increase log output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (defaults to <config dir>/ckb-debug-invoke/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute one script group of a mock transaction
    Run(RunArgs),

    /// Check that a mock transaction's mock info matches the transaction
    Check(CheckArgs),

    /// Print the hash of a cell's lock or type script
    ScriptHash(ScriptHashArgs),

    /// Print a fixture with its template markers expanded
    Expand(ExpandArgs),

    /// Generate a shell completion script
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Mock transaction fixture (JSON, templates allowed)
    #[arg(short = 'f', long, value_name = "FILE")]
    pub tx_file: PathBuf,

    /// Script group to run
    #[arg(short = 's', long, value_enum, default_value_t = ScriptGroupType::Lock)]
    pub script_group_type: ScriptGroupType,

    /// Script hash of the group, 0x followed by 64 hex digits
    #[arg(long, conflicts_with_all = ["cell_type", "cell_index"])]
    pub script_hash: Option<String>,

    /// Locate the script by cell instead of by hash
    #[arg(short = 't', long, value_enum)]
    pub cell_type: Option<CellType>,

    /// Index of the cell among the inputs or outputs
    #[arg(short = 'i', long)]
    pub cell_index: Option<usize>,

    /// Cycle budget passed to the engine
    #[arg(long, env = "CKB_DEBUG_MAX_CYCLES")]
    pub max_cycles: Option<String>,

    /// Debugger module: process:<path>, library:<path> or a bare path
    #[arg(long, env = "CKB_DEBUGGER_MODULE")]
    pub module: Option<String>,

    /// Stream script debug messages while the script runs
    #[arg(long)]
    pub with_printer: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Skip the fixture consistency check
    #[arg(long)]
    pub no_pre_check: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Mock transaction fixture
    #[arg(short = 'f', long, value_name = "FILE")]
    pub tx_file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ScriptHashArgs {
    /// Mock transaction fixture
    #[arg(short = 'f', long, value_name = "FILE")]
    pub tx_file: PathBuf,

    #[arg(short = 's', long, value_enum, default_value_t = ScriptGroupType::Lock)]
    pub script_group_type: ScriptGroupType,

    #[arg(short = 't', long, value_enum, default_value_t = CellType::Input)]
    pub cell_type: CellType,

    #[arg(short = 'i', long, default_value_t = 0)]
    pub cell_index: usize,
}

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Fixture containing template markers
    #[arg(short = 'f', long, value_name = "FILE")]
    pub tx_file: PathBuf,

    /// Write the expansion here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}
