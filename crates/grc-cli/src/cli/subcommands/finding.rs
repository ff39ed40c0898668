use clap::Subcommand;

/// Finding commands.
#[derive(Clone, Debug, Subcommand)]
pub enum FindingCommands {
    /// Raise a finding.
    Create {
        /// Clause number, e.g. 4.3 or A.5.18.
        #[arg(long)]
        clause: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        severity: Option<String>,
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        workpaper: Option<String>,
        /// Due date (YYYY-MM-DD).
        #[arg(long)]
        due: Option<String>,
    },
    /// Update a finding.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        clause: Option<String>,
        #[arg(long)]
        severity: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        workpaper: Option<String>,
    },
    /// List findings.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        severity: Option<String>,
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Get a finding by ID or reference code.
    Get { id: String },
    /// Move a finding to another status.
    Transition { id: String, status: String },
    /// Delete an open finding.
    Delete { id: String },
}
