use clap::Subcommand;

/// Audit plan commands.
#[derive(Clone, Debug, Subcommand)]
pub enum PlanCommands {
    /// Create a draft audit plan.
    Create {
        #[arg(long)]
        title: String,
        /// Template ID (defaults to `general.default_template`).
        #[arg(long)]
        template: Option<String>,
        #[arg(long)]
        lead: Option<String>,
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,
    },
    /// Update plan details.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        lead: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Get a plan by ID.
    Get { id: String },
    /// List plans.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        template: Option<String>,
    },
    /// Replace the plan's category selection.
    Select { id: String, categories: Vec<String> },
    /// Toggle one category.
    Toggle { id: String, category: String },
    /// Select every category, or collapse to required ones.
    #[command(name = "select-all")]
    SelectAll { id: String },
    /// Reset the selection to the template's recommendation.
    Recommend { id: String },
    /// Validate the selection and generate workpapers.
    Submit { id: String },
    /// Move a plan to another status.
    Transition { id: String, status: String },
    /// Delete a draft plan.
    Delete { id: String },
}
