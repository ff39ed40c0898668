use clap::Subcommand;

/// Template catalog commands. Read-only.
#[derive(Clone, Debug, Subcommand)]
pub enum TemplateCommands {
    /// List available templates.
    List,
    /// Get a template with all its categories.
    Get { id: String },
    /// List a template's categories.
    Categories {
        id: String,
        /// Split into main clauses and Annex A controls.
        #[arg(long)]
        grouped: bool,
    },
    /// Recommended default selection for a template.
    Recommended { id: String },
    /// Category counts per group.
    Counts { id: String },
    /// Search a template's categories by name, description, or clause.
    Search { id: String, term: String },
    /// Validate a category selection against a template.
    Validate { id: String, categories: Vec<String> },
}
