use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat, Verbosity};
pub use root_commands::Commands;

/// `grc`: plan ISO 27001 audits, work the generated workpapers, raise
/// findings, and keep the risk register.
#[derive(Debug, Parser)]
#[command(name = "grc", version, about = "ISO 27001 audit workbench")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Cap on listed rows (defaults to `general.default_limit`).
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log debug detail to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory, or its `.grc` directory. Discovered from the
    /// working directory when omitted.
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            verbosity: Verbosity::from_flags(self.quiet, self.verbose),
            project: self.project.clone(),
        }
    }
}
