use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    FindingCommands, PlanCommands, RiskCommands, TemplateCommands, WorkpaperCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Initialize grc for a project.
    Init(InitArgs),
    /// Browse workpaper templates and their categories.
    Template {
        #[command(subcommand)]
        action: TemplateCommands,
    },
    /// Audit plans.
    Plan {
        #[command(subcommand)]
        action: PlanCommands,
    },
    /// Workpapers generated from submitted plans.
    Workpaper {
        #[command(subcommand)]
        action: WorkpaperCommands,
    },
    /// Audit findings.
    Finding {
        #[command(subcommand)]
        action: FindingCommands,
    },
    /// Risk register and key risk indicators.
    Risk {
        #[command(subcommand)]
        action: RiskCommands,
    },
    /// View audit trail.
    Audit(AuditArgs),
}

/// Arguments for `grc init`.
#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory).
    #[arg(default_value = ".")]
    pub path: String,
}

/// Arguments for `grc audit`.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub entity_id: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    #[arg(long)]
    pub actor: Option<String>,
}
