use clap::Subcommand;

/// Workpaper commands.
#[derive(Clone, Debug, Subcommand)]
pub enum WorkpaperCommands {
    /// List workpapers.
    List {
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Get a workpaper by ID.
    Get { id: String },
    /// Edit workpaper text.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        objectives: Option<String>,
        #[arg(long)]
        scope: Option<String>,
        #[arg(long)]
        procedures: Option<String>,
    },
    /// Record the test result.
    Record {
        id: String,
        /// conformity, partial-conformity, or non-conformity.
        #[arg(long)]
        result: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Add a tick mark.
    Tick {
        id: String,
        #[arg(long)]
        code: char,
        #[arg(long)]
        description: String,
    },
    /// Move a workpaper to another status.
    Transition { id: String, status: String },
}
