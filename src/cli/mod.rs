//! Command-line surface of `ckb-debug-invoke`.

pub mod args;
pub mod commands;
pub mod output;

pub use args::{
    CheckArgs, Cli, Commands, CompletionsArgs, ExpandArgs, OutputFormat, RunArgs, ScriptHashArgs,
};

/// How chatty the binary should be, derived from `-v`/`-q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Verbosity::Quiet;
        }
        match verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub fn to_log_level(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::Debug => "debug",
        }
    }

    pub fn is_quiet(self) -> bool {
        self == Verbosity::Quiet
    }
}
